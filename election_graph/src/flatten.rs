/*!
Tabular views of a finished result graph.

Nothing here mutates the graph. Rows come out in graph order: races, then
candidates, then counties, as they were reconciled.
*/

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::ResultVersion;

/// One candidate in one county, for one race.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RaceRow {
    pub office: String,
    pub office_type: String,
    pub office_district: Option<String>,
    pub candidate: String,
    pub party: String,
    pub county: String,
    pub early_votes: u64,
    pub election_day_votes: u64,
    pub total_votes: u64,
    pub percent_votes: f64,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CountyRow {
    pub county: String,
    pub registered_voters: u64,
    pub color: Option<String>,
    pub precincts_reporting: Option<u64>,
    pub total_precincts: Option<u64>,
    pub percent_reporting: Option<f64>,
    pub votes_counted: Option<u64>,
    pub turnout_percent: Option<f64>,
    pub poll_locations: Option<u64>,
    pub poll_locations_reporting: Option<u64>,
    pub poll_locations_percent: Option<f64>,
}

/// One statewide candidate in one county, with the office-level outcome.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct StatewideRow {
    pub version_id: u64,
    pub office_id: u64,
    pub office: String,
    pub office_type: String,
    pub office_district: Option<String>,
    pub winner: Option<String>,
    pub winner_party: Option<String>,
    pub winner_margin: Option<u64>,
    pub winner_percent: Option<f64>,
    pub candidate: String,
    pub party: String,
    pub county: String,
    pub early_votes: u64,
    pub election_day_votes: u64,
    pub total_votes: u64,
    pub percent: f64,
}

/// Every field of a statewide row, floats by bit pattern.
type StatewideRowKey = (
    (u64, u64, String, String, Option<String>),
    (Option<String>, Option<String>, Option<u64>, Option<u64>),
    (String, String, String),
    (u64, u64, u64, u64),
);

impl StatewideRow {
    fn dedup_key(&self) -> StatewideRowKey {
        (
            (
                self.version_id,
                self.office_id,
                self.office.clone(),
                self.office_type.clone(),
                self.office_district.clone(),
            ),
            (
                self.winner.clone(),
                self.winner_party.clone(),
                self.winner_margin,
                self.winner_percent.map(f64::to_bits),
            ),
            (self.candidate.clone(), self.party.clone(), self.county.clone()),
            (
                self.early_votes,
                self.election_day_votes,
                self.total_votes,
                self.percent.to_bits(),
            ),
        )
    }
}

/// A statewide candidate, summed over the counties.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct StatewideRollup {
    pub office: String,
    pub candidate: String,
    pub party: String,
    pub counties: usize,
    pub early_votes: u64,
    pub election_day_votes: u64,
    pub total_votes: u64,
    /// Mean of the county percents.
    pub percent: f64,
    pub winner_margin: Option<u64>,
}

pub fn race_rows(version: &ResultVersion) -> Vec<RaceRow> {
    let mut rows: Vec<RaceRow> = Vec::new();
    for race in version.races.iter() {
        for cand in race.candidates.iter() {
            for res in cand.county_results.iter() {
                rows.push(RaceRow {
                    office: race.office.clone(),
                    office_type: race.office_type.clone(),
                    office_district: race.office_district.clone(),
                    candidate: cand.full_name.clone(),
                    party: cand.party.clone(),
                    county: res.county.clone(),
                    early_votes: res.early_votes,
                    election_day_votes: res.election_day_votes,
                    total_votes: res.total_votes,
                    percent_votes: res.percent,
                });
            }
        }
    }
    rows
}

pub fn county_rows(version: &ResultVersion) -> Vec<CountyRow> {
    version
        .counties
        .iter()
        .map(|c| CountyRow {
            county: c.name.clone(),
            registered_voters: c.registered_voters,
            color: c.color.clone(),
            precincts_reporting: c.summary.precincts_reporting,
            total_precincts: c.summary.total_precincts,
            percent_reporting: c.summary.percent_reporting,
            votes_counted: c.summary.votes_counted,
            turnout_percent: c.summary.turnout_percent,
            poll_locations: c.summary.poll_locations,
            poll_locations_reporting: c.summary.poll_locations_reporting,
            poll_locations_percent: c.summary.poll_locations_percent,
        })
        .collect()
}

/// The statewide rows, with identical rows collapsed into their first occurrence.
pub fn statewide_rows(version: &ResultVersion) -> Vec<StatewideRow> {
    let mut seen: HashSet<StatewideRowKey> = HashSet::new();
    let mut rows: Vec<StatewideRow> = Vec::new();
    for office in version.statewide.iter() {
        for cand in office.candidates.iter() {
            for res in cand.county_results.iter() {
                let row = StatewideRow {
                    version_id: office.version_id,
                    office_id: office.office_id,
                    office: office.name.clone(),
                    office_type: office.office_type.clone(),
                    office_district: office.office_district.clone(),
                    winner: office.winner.clone(),
                    winner_party: office.winner_party.clone(),
                    winner_margin: office.winner_margin,
                    winner_percent: office.winner_percent,
                    candidate: cand.name.clone(),
                    party: cand.party.clone(),
                    county: res.county.clone(),
                    early_votes: res.early_votes,
                    election_day_votes: res.election_day_votes,
                    total_votes: res.total_votes,
                    percent: res.percent,
                };
                if seen.insert(row.dedup_key()) {
                    rows.push(row);
                }
            }
        }
    }
    rows
}

/// Groups statewide rows by (office, candidate, party), in order of first appearance.
pub fn statewide_rollup(rows: &[StatewideRow]) -> Vec<StatewideRollup> {
    let mut index: BTreeMap<(String, String, String), usize> = BTreeMap::new();
    let mut groups: Vec<StatewideRollup> = Vec::new();
    let mut percent_sums: Vec<f64> = Vec::new();
    for row in rows.iter() {
        let key = (row.office.clone(), row.candidate.clone(), row.party.clone());
        let idx = *index.entry(key).or_insert_with(|| {
            groups.push(StatewideRollup {
                office: row.office.clone(),
                candidate: row.candidate.clone(),
                party: row.party.clone(),
                counties: 0,
                early_votes: 0,
                election_day_votes: 0,
                total_votes: 0,
                percent: 0.0,
                winner_margin: row.winner_margin,
            });
            percent_sums.push(0.0);
            groups.len() - 1
        });
        let group = &mut groups[idx];
        group.counties += 1;
        group.early_votes += row.early_votes;
        group.election_day_votes += row.election_day_votes;
        group.total_votes += row.total_votes;
        percent_sums[idx] += row.percent;
    }
    for (group, sum) in groups.iter_mut().zip(percent_sums.iter()) {
        group.percent = sum / group.counties as f64;
    }
    groups
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CrossTabRow {
    pub office_type: String,
    pub office: String,
    pub candidate: String,
    pub party: String,
    /// One cell per county column; 0 where the candidate has no result.
    pub cells: Vec<u64>,
    pub total: u64,
}

/// Total votes by (office type, office, candidate, party) and county.
///
/// Rows and county columns are sorted. The margins are the `All` row and column.
#[derive(PartialEq, Debug, Clone)]
pub struct CrossTab {
    pub counties: Vec<String>,
    pub rows: Vec<CrossTabRow>,
}

pub const MARGIN_LABEL: &str = "All";

impl CrossTab {
    pub fn from_rows(rows: &[StatewideRow]) -> CrossTab {
        let counties: Vec<String> = rows
            .iter()
            .map(|r| r.county.clone())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();
        let mut cells: BTreeMap<(String, String, String, String), BTreeMap<&str, u64>> =
            BTreeMap::new();
        for row in rows.iter() {
            let key = (
                row.office_type.clone(),
                row.office.clone(),
                row.candidate.clone(),
                row.party.clone(),
            );
            *cells
                .entry(key)
                .or_default()
                .entry(row.county.as_str())
                .or_insert(0) += row.total_votes;
        }
        let rows = cells
            .into_iter()
            .map(|((office_type, office, candidate, party), by_county)| {
                let cells: Vec<u64> = counties
                    .iter()
                    .map(|c| by_county.get(c.as_str()).cloned().unwrap_or(0))
                    .collect();
                CrossTabRow {
                    office_type,
                    office,
                    candidate,
                    party,
                    total: cells.iter().sum(),
                    cells,
                }
            })
            .collect();
        CrossTab { counties, rows }
    }

    /// The column totals, and the grand total.
    pub fn margin_row(&self) -> CrossTabRow {
        let cells: Vec<u64> = (0..self.counties.len())
            .map(|i| self.rows.iter().map(|r| r.cells[i]).sum())
            .collect();
        CrossTabRow {
            office_type: MARGIN_LABEL.to_string(),
            office: String::new(),
            candidate: String::new(),
            party: String::new(),
            total: cells.iter().sum(),
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use chrono::NaiveDate;

    fn result(county: &str, total: u64, early: u64) -> CandidateCountyResult {
        CandidateCountyResult {
            county: county.to_string(),
            early_votes: early,
            election_day_votes: total - early,
            total_votes: total,
            percent: total as f64,
            ballot_order: None,
            color: None,
        }
    }

    fn statewide_candidate(name: &str, party: &str, results: Vec<CandidateCountyResult>) -> StatewideCandidate {
        StatewideCandidate {
            name: name.to_string(),
            first_name: None,
            last_name: None,
            incumbent: false,
            party: party.to_string(),
            color: None,
            total_votes: results.iter().map(|r| r.total_votes).sum(),
            ballot_order: 1,
            office_id: 1,
            candidate_id: None,
            county_results: results,
            endorsement: None,
        }
    }

    fn version() -> ResultVersion {
        let counties = ["A", "B", "C"];
        let cand = |id: u64, name: &str, scale: u64| Candidate {
            candidate_id: id,
            full_name: name.to_string(),
            first_name: None,
            last_name: None,
            incumbent: false,
            party: "Republican".to_string(),
            county_results: counties
                .iter()
                .enumerate()
                .map(|(i, c)| result(c, scale * (i as u64 + 1), 1))
                .collect(),
        };
        let governor = StatewideOffice {
            office_id: 1,
            name: "GOVERNOR".to_string(),
            office_type: "GOVERNOR".to_string(),
            office_district: None,
            winner: Some("JANE DOE".to_string()),
            winner_party: Some("Republican".to_string()),
            winner_margin: Some(5),
            winner_percent: Some(0.6),
            candidates: vec![
                statewide_candidate("JANE DOE", "Republican", vec![result("B", 10, 2), result("A", 20, 4), result("A", 20, 4)]),
                statewide_candidate("JOHN ROE", "Democrat", vec![result("A", 7, 0)]),
            ],
            version_id: 3,
        };
        ResultVersion {
            version_id: 3,
            election_id: 9,
            election_date: NaiveDate::from_ymd_opt(2022, 11, 8).unwrap(),
            statewide: vec![governor],
            counties: vec![],
            races: vec![Race {
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
                counties: vec![],
                candidates: vec![cand(10, "JANE DOE", 10), cand(11, "JOHN ROE", 1)],
            }],
        }
    }

    #[test]
    fn one_row_per_candidate_and_county() {
        let rows = race_rows(&version());
        assert_eq!(rows.len(), 6);
        let pairs: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.candidate.as_str(), r.county.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("JANE DOE", "A"),
                ("JANE DOE", "B"),
                ("JANE DOE", "C"),
                ("JOHN ROE", "A"),
                ("JOHN ROE", "B"),
                ("JOHN ROE", "C"),
            ]
        );
        assert_eq!(rows[2].total_votes, 30);
        assert_eq!(rows[2].election_day_votes, 29);
    }

    #[test]
    fn identical_statewide_rows_collapse() {
        let rows = statewide_rows(&version());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].county, "B");
        assert_eq!(rows[1].county, "A");
        assert_eq!(rows[2].candidate, "JOHN ROE");
        assert_eq!(rows[0].winner_margin, Some(5));
    }

    #[test]
    fn rows_differing_in_one_field_are_kept() {
        let mut v = version();
        let mut other = result("A", 20, 4);
        other.percent = 20.5;
        v.statewide[0].candidates[0].county_results.push(other);
        let rows = statewide_rows(&v);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2].percent, 20.5);
    }

    #[test]
    fn rollup_by_candidate() {
        let rollup = statewide_rollup(&statewide_rows(&version()));
        assert_eq!(rollup.len(), 2);
        assert_eq!(rollup[0].candidate, "JANE DOE");
        assert_eq!(rollup[0].counties, 2);
        assert_eq!(rollup[0].total_votes, 30);
        assert_eq!(rollup[0].early_votes, 6);
        assert_eq!(rollup[0].election_day_votes, 24);
        assert_eq!(rollup[0].percent, 15.0);
        assert_eq!(rollup[0].winner_margin, Some(5));
        assert_eq!(rollup[1].total_votes, 7);
    }

    #[test]
    fn cross_tab() {
        let tab = CrossTab::from_rows(&statewide_rows(&version()));
        assert_eq!(tab.counties, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(tab.rows.len(), 2);
        assert_eq!(tab.rows[0].candidate, "JANE DOE");
        assert_eq!(tab.rows[0].cells, vec![20, 10]);
        assert_eq!(tab.rows[0].total, 30);
        assert_eq!(tab.rows[1].cells, vec![7, 0]);
        let margin = tab.margin_row();
        assert_eq!(margin.office_type, MARGIN_LABEL);
        assert_eq!(margin.cells, vec![27, 10]);
        assert_eq!(margin.total, 37);
    }

    #[test]
    fn county_projection() {
        let mut v = version();
        v.counties.push(County {
            name: "A".to_string(),
            registered_voters: 10,
            color: None,
            summary: CountySummary {
                county_name: "A".to_string(),
                total_precincts: Some(4),
                ..Default::default()
            },
            version_id: 3,
        });
        let rows = county_rows(&v);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_precincts, Some(4));
        assert_eq!(rows[0].votes_counted, None);
    }
}
