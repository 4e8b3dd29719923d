use log::debug;

use crate::model::{Race, ResultVersion, StatewideOffice};

/// `numerator / denominator` rounded to two decimals, or 0 when either side is 0.
///
/// Rounding is on the exact value of the quotient, ties to even: 1/8 gives 0.12.
pub fn guarded_ratio(numerator: u64, denominator: u64) -> f64 {
    if numerator == 0 || denominator == 0 {
        0.0
    } else {
        round2(numerator as f64 / denominator as f64)
    }
}

fn round2(x: f64) -> f64 {
    let doubled = (x * 200.0).round();
    if doubled % 2.0 == 0.0 {
        return (x * 100.0).round() / 100.0;
    }
    // Close to a half hundredth: the exact residual decides.
    let below = (doubled - 1.0) / 2.0;
    let residual = x.mul_add(200.0, -doubled);
    let hundredths = if residual > 0.0 || (residual == 0.0 && below % 2.0 != 0.0) {
        below + 1.0
    } else {
        below
    };
    hundredths / 100.0
}

/// Computes all the derived fields of the graph.
///
/// Every derived field is recomputed from the reported figures, so calling
/// this several times gives the same graph.
pub fn compute(version: &mut ResultVersion) {
    for race in version.races.iter_mut() {
        compute_race(race);
    }
    for office in version.statewide.iter_mut() {
        select_winner(office);
    }
    debug!(
        "metrics: version {}: {} races, {} statewide offices",
        version.version_id,
        version.races.len(),
        version.statewide.len()
    );
}

pub fn compute_race(race: &mut Race) {
    for detail in race.counties.iter_mut() {
        detail.county_turnout_pct = guarded_ratio(detail.total_votes, detail.registered_voters);
        detail.county_precinct_pct =
            guarded_ratio(detail.precincts_reporting, detail.total_precincts);
    }
    race.precincts_reporting = race.counties.iter().map(|d| d.precincts_reporting).sum();
    race.registered_voters = race.counties.iter().map(|d| d.registered_voters).sum();
    race.total_precincts = race.counties.iter().map(|d| d.total_precincts).sum();
    race.total_votes = race.counties.iter().map(|d| d.total_votes).sum();
    race.turnout_pct = guarded_ratio(race.total_votes, race.registered_voters);
    race.precinct_reporting_pct = guarded_ratio(race.precincts_reporting, race.total_precincts);
}

/// Fills in the winner of a statewide office.
///
/// Ties go to the candidate listed first. The margin is the gap to the best
/// total below the winner's, or 0 when everybody is tied. A lone candidate
/// wins with a margin of 0 and a percent of 100. When several candidates all
/// have zero votes, the winner fields are left unset.
pub fn select_winner(office: &mut StatewideOffice) {
    office.winner = None;
    office.winner_party = None;
    office.winner_margin = None;
    office.winner_percent = None;

    let mut totals: Vec<u64> = office.candidates.iter().map(|c| c.total_votes).collect();
    totals.sort_unstable();
    let (winner, margin, percent) = match (office.candidates.as_slice(), totals.as_slice()) {
        ([], _) => return,
        ([only], _) => (only, 0, 100.0),
        (cands, [.., top]) => {
            let sum: u64 = totals.iter().sum();
            if sum == 0 {
                debug!(
                    "select_winner: office {}: no votes yet",
                    office.office_id
                );
                return;
            }
            let runner_up = totals.iter().rev().find(|t| *t < top).unwrap_or(top);
            match cands.iter().find(|c| c.total_votes == *top) {
                Some(w) => (w, top - runner_up, *top as f64 / sum as f64),
                None => return,
            }
        }
        _ => return,
    };
    let winner_name = winner.name.clone();
    let winner_party = winner.party.clone();
    office.winner = Some(winner_name);
    office.winner_party = Some(winner_party);
    office.winner_margin = Some(margin);
    office.winner_percent = Some(percent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CountyRaceDetail, StatewideCandidate};

    fn office(totals: &[u64]) -> StatewideOffice {
        StatewideOffice {
            office_id: 1,
            name: "GOVERNOR".to_string(),
            office_type: "GOVERNOR".to_string(),
            office_district: None,
            winner: None,
            winner_party: None,
            winner_margin: None,
            winner_percent: None,
            candidates: totals
                .iter()
                .enumerate()
                .map(|(idx, t)| StatewideCandidate {
                    name: format!("CANDIDATE {}", idx),
                    first_name: None,
                    last_name: None,
                    incumbent: false,
                    party: format!("PARTY {}", idx),
                    color: None,
                    total_votes: *t,
                    ballot_order: idx as u64 + 1,
                    office_id: 1,
                    candidate_id: None,
                    county_results: vec![],
                    endorsement: None,
                })
                .collect(),
            version_id: 1,
        }
    }

    fn detail(county: &str, votes: u64, voters: u64, reporting: u64, precincts: u64) -> CountyRaceDetail {
        CountyRaceDetail {
            county: county.to_string(),
            race_id: 1,
            total_votes: votes,
            ballot_order: 1,
            precincts_reporting: reporting,
            registered_voters: voters,
            total_precincts: precincts,
            county_turnout_pct: 0.0,
            county_precinct_pct: 0.0,
        }
    }

    #[test]
    fn ratios() {
        assert_eq!(guarded_ratio(0, 10), 0.0);
        assert_eq!(guarded_ratio(10, 0), 0.0);
        assert_eq!(guarded_ratio(1, 3), 0.33);
        assert_eq!(guarded_ratio(2, 3), 0.67);
        assert_eq!(guarded_ratio(5, 5), 1.0);
    }

    #[test]
    fn ratios_round_half_to_even() {
        assert_eq!(guarded_ratio(1, 8), 0.12);
        assert_eq!(guarded_ratio(3, 8), 0.38);
        assert_eq!(guarded_ratio(5, 8), 0.62);
        assert_eq!(guarded_ratio(7, 8), 0.88);
        // 1/200 is stored a little above 0.005.
        assert_eq!(guarded_ratio(1, 200), 0.01);
        assert_eq!(guarded_ratio(1, 6), 0.17);
    }

    #[test]
    fn ties_go_to_the_first_listed() {
        let mut o = office(&[100, 300, 300]);
        select_winner(&mut o);
        assert_eq!(o.winner.as_deref(), Some("CANDIDATE 1"));
        assert_eq!(o.winner_party.as_deref(), Some("PARTY 1"));
        assert_eq!(o.winner_margin, Some(200));
        assert_eq!(o.winner_percent, Some(300.0 / 700.0));
    }

    #[test]
    fn everybody_tied() {
        let mut o = office(&[300, 300, 300]);
        select_winner(&mut o);
        assert_eq!(o.winner.as_deref(), Some("CANDIDATE 0"));
        assert_eq!(o.winner_margin, Some(0));
        assert_eq!(o.winner_percent, Some(300.0 / 900.0));
    }

    #[test]
    fn clear_winner() {
        let mut o = office(&[10, 50, 40]);
        select_winner(&mut o);
        assert_eq!(o.winner.as_deref(), Some("CANDIDATE 1"));
        assert_eq!(o.winner_margin, Some(10));
        assert_eq!(o.winner_percent, Some(0.5));
    }

    #[test]
    fn lone_candidate() {
        let mut o = office(&[1234]);
        select_winner(&mut o);
        assert_eq!(o.winner.as_deref(), Some("CANDIDATE 0"));
        assert_eq!(o.winner_margin, Some(0));
        assert_eq!(o.winner_percent, Some(100.0));
    }

    #[test]
    fn no_votes_no_winner() {
        let mut o = office(&[0, 0]);
        select_winner(&mut o);
        assert_eq!(o.winner, None);
        assert_eq!(o.winner_margin, None);
        assert_eq!(o.winner_percent, None);

        let mut empty = office(&[]);
        select_winner(&mut empty);
        assert_eq!(empty.winner, None);
    }

    #[test]
    fn race_totals() {
        let mut race = Race {
            race_id: 1,
            office: "GOVERNOR".to_string(),
            office_type: "GOVERNOR".to_string(),
            office_district: None,
            total_votes: 0,
            precincts_reporting: 0,
            registered_voters: 0,
            total_precincts: 0,
            turnout_pct: 0.0,
            precinct_reporting_pct: 0.0,
            counties: vec![detail("A", 30, 100, 1, 2), detail("B", 0, 0, 0, 4)],
            candidates: vec![],
        };
        compute_race(&mut race);
        assert_eq!(race.total_votes, 30);
        assert_eq!(race.registered_voters, 100);
        assert_eq!(race.precincts_reporting, 1);
        assert_eq!(race.total_precincts, 6);
        assert_eq!(race.turnout_pct, 0.3);
        assert_eq!(race.precinct_reporting_pct, 0.17);
        assert_eq!(race.counties[0].county_precinct_pct, 0.5);
        assert_eq!(race.counties[1].county_turnout_pct, 0.0);
        assert_eq!(race.counties[1].county_precinct_pct, 0.0);

        let before = race.clone();
        compute_race(&mut race);
        assert_eq!(race, before);
    }

    #[test]
    fn winner_is_recomputed() {
        let mut o = office(&[5, 10]);
        select_winner(&mut o);
        let first = o.clone();
        select_winner(&mut o);
        assert_eq!(o, first);
        o.candidates[0].total_votes = 20;
        select_winner(&mut o);
        assert_eq!(o.winner.as_deref(), Some("CANDIDATE 0"));
    }
}
