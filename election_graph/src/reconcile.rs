/*!
Reconciliation of county and statewide payloads into one result graph.

The same race and the same candidate show up again in every county that
reports them. The [`Reconciler`] keeps one canonical instance per race id and
per candidate id, and accumulates the per-county figures on it.

A reconciler is built for one snapshot and consumed by [`Reconciler::finish`]:
its caches never outlive the version they were built for.

```
use election_graph::payload::{county_fragments_from_str, VersionInfo};
use election_graph::reconcile::Reconciler;
# use election_graph::ReconcileError;

let header = VersionInfo {
    version_id: 3,
    election_id: 47009,
    election_date: chrono::NaiveDate::from_ymd_opt(2022, 11, 8).unwrap(),
};
let counties = county_fragments_from_str(
    r#"[{"N": "LOVING", "TV": 64, "Summary": {}, "Races": [{"OID": 1, "ON": "GOVERNOR",
         "T": 50, "O": 1, "PR": 1, "OTRV": 64, "TPR": 1,
         "C": [{"id": 10, "N": "JANE DOE", "P": "REP", "V": 50}]}]}]"#,
)?;
let mut reconciler = Reconciler::new(&header);
for county in counties.iter() {
    reconciler.add_county(county)?;
}
let (version, report) = reconciler.finish();
assert_eq!(version.races.len(), 1);
assert_eq!(report.candidates, 1);
# Ok::<(), ReconcileError>(())
```
*/

use std::collections::HashMap;

use log::{debug, info, warn};
use snafu::prelude::*;

use crate::classifier::{classify_office, OfficeClass};
use crate::error::*;
use crate::model::*;
use crate::names::{is_incumbent, name_key, normalize_party, parse_person_name};
use crate::payload::*;

/// A statewide candidate whose name matched several race candidates.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AmbiguousMatch {
    pub office_id: u64,
    pub name: String,
    /// All the matching candidates, in race order. The first one was used.
    pub candidate_ids: Vec<u64>,
}

/// What happened during reconciliation, beyond the graph itself.
///
/// None of these conditions stop a run.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ReconcileReport {
    pub counties: usize,
    pub races: usize,
    pub candidates: usize,
    pub statewide_offices: usize,
    /// Office names that no classification rule recognized.
    pub classification_fallbacks: Vec<String>,
    pub ambiguous_matches: Vec<AmbiguousMatch>,
    /// Names of the statewide candidates with no race candidate of the same name.
    pub unmatched_statewide_candidates: Vec<String>,
    /// Repeated (race, county) or (candidate, county) entries that were skipped.
    pub duplicate_county_entries: usize,
    pub duplicate_statewide_offices: usize,
    pub unmatched_endorsements: Vec<u64>,
}

struct RaceSlot {
    race: Race,
    // Indices into the candidate arena, in order of first appearance.
    candidate_slots: Vec<usize>,
}

/// The reconciliation context for one snapshot.
///
/// All the counties must be added before the statewide offices.
pub struct Reconciler {
    header: VersionInfo,
    races_by_id: HashMap<u64, usize>,
    candidates_by_id: HashMap<u64, usize>,
    races: Vec<RaceSlot>,
    candidates: Vec<Candidate>,
    counties: Vec<County>,
    statewide: Vec<StatewideOffice>,
    report: ReconcileReport,
}

impl Reconciler {
    pub fn new(header: &VersionInfo) -> Reconciler {
        Reconciler {
            header: header.clone(),
            races_by_id: HashMap::new(),
            candidates_by_id: HashMap::new(),
            races: Vec::new(),
            candidates: Vec::new(),
            counties: Vec::new(),
            statewide: Vec::new(),
            report: ReconcileReport::default(),
        }
    }

    /// Merges one county payload into the graph.
    ///
    /// The whole fragment is validated first: on error, the graph is left untouched.
    pub fn add_county(&mut self, fragment: &CountyFragment) -> ReconcileResult<()> {
        let parsed = fragment.parse()?;
        ensure!(
            self.statewide.is_empty(),
            CountyAfterStatewideSnafu {
                name: parsed.name.as_str()
            }
        );
        ensure!(
            !self.counties.iter().any(|c| c.name == parsed.name),
            DuplicateCountySnafu {
                name: parsed.name.as_str()
            }
        );
        debug!(
            "add_county: {}: {} races",
            parsed.name,
            parsed.races.len()
        );

        for race in parsed.races.iter() {
            self.add_county_race(&parsed.name, race);
        }
        self.counties.push(County {
            name: parsed.name,
            registered_voters: parsed.registered_voters,
            color: parsed.color,
            summary: parsed.summary,
            version_id: self.header.version_id,
        });
        Ok(())
    }

    fn add_county_race(&mut self, county: &str, race: &ParsedRace) {
        let race_idx = self.race_slot(race);
        let slot = &mut self.races[race_idx];
        if slot.race.counties.iter().any(|d| d.county == county) {
            warn!(
                "add_county: {}: race {} reported twice, skipping the repeat",
                county, race.race_id
            );
            self.report.duplicate_county_entries += 1;
            return;
        }
        slot.race.counties.push(CountyRaceDetail {
            county: county.to_string(),
            race_id: race.race_id,
            total_votes: race.total_votes,
            ballot_order: race.ballot_order,
            precincts_reporting: race.precincts_reporting,
            registered_voters: race.registered_voters,
            total_precincts: race.total_precincts,
            county_turnout_pct: 0.0,
            county_precinct_pct: 0.0,
        });

        for cand in race.candidates.iter() {
            let cand_idx = self.candidate_slot(cand);
            let candidate = &mut self.candidates[cand_idx];
            if candidate.county_results.iter().any(|r| r.county == county) {
                warn!(
                    "add_county: {}: candidate {} reported twice, skipping the repeat",
                    county, cand.candidate_id
                );
                self.report.duplicate_county_entries += 1;
            } else {
                if cand.early_votes > cand.total_votes {
                    warn!(
                        "add_county: {}: candidate {} has more early votes ({}) than votes ({})",
                        county, cand.candidate_id, cand.early_votes, cand.total_votes
                    );
                }
                candidate.county_results.push(CandidateCountyResult {
                    county: county.to_string(),
                    early_votes: cand.early_votes,
                    election_day_votes: cand.total_votes.saturating_sub(cand.early_votes),
                    total_votes: cand.total_votes,
                    percent: cand.percent,
                    ballot_order: cand.ballot_order,
                    color: cand.color.clone(),
                });
            }
            let slot = &mut self.races[race_idx];
            if !slot.candidate_slots.contains(&cand_idx) {
                slot.candidate_slots.push(cand_idx);
            }
        }
    }

    fn race_slot(&mut self, race: &ParsedRace) -> usize {
        if let Some(idx) = self.races_by_id.get(&race.race_id) {
            return *idx;
        }
        let class = self.classify(&race.office);
        let idx = self.races.len();
        self.races.push(RaceSlot {
            race: Race {
                race_id: race.race_id,
                office: race.office.clone(),
                office_type: class.office_type,
                office_district: class.office_district,
                total_votes: 0,
                precincts_reporting: 0,
                registered_voters: 0,
                total_precincts: 0,
                turnout_pct: 0.0,
                precinct_reporting_pct: 0.0,
                counties: Vec::new(),
                candidates: Vec::new(),
            },
            candidate_slots: Vec::new(),
        });
        self.races_by_id.insert(race.race_id, idx);
        idx
    }

    fn candidate_slot(&mut self, cand: &ParsedCandidate) -> usize {
        if let Some(idx) = self.candidates_by_id.get(&cand.candidate_id) {
            return *idx;
        }
        let name = parse_person_name(&cand.full_name);
        let idx = self.candidates.len();
        self.candidates.push(Candidate {
            candidate_id: cand.candidate_id,
            full_name: cand.full_name.clone(),
            first_name: name.first,
            last_name: name.last,
            incumbent: is_incumbent(&cand.full_name),
            party: normalize_party(&cand.party_code),
            county_results: Vec::new(),
        });
        self.candidates_by_id.insert(cand.candidate_id, idx);
        idx
    }

    fn classify(&mut self, office: &str) -> OfficeClass {
        let class = classify_office(office);
        if class.is_fallback() {
            debug!("classify: no rule for office {:?}", office);
            self.report.classification_fallbacks.push(office.to_string());
        }
        class
    }

    /// Adds one statewide office, linking its candidates to the race candidates.
    pub fn add_statewide_office(&mut self, fragment: &OfficeFragment) -> ReconcileResult<()> {
        let parsed = fragment.parse()?;
        if self.statewide.iter().any(|o| o.office_id == parsed.office_id) {
            warn!(
                "add_statewide_office: office {} listed twice, keeping the first",
                parsed.office_id
            );
            self.report.duplicate_statewide_offices += 1;
            return Ok(());
        }
        let class = self.classify(&parsed.name);
        let candidates: Vec<StatewideCandidate> = parsed
            .candidates
            .iter()
            .map(|c| self.statewide_candidate(parsed.office_id, c))
            .collect();
        debug!(
            "add_statewide_office: {} {:?}: {} candidates",
            parsed.office_id,
            parsed.name,
            candidates.len()
        );
        self.statewide.push(StatewideOffice {
            office_id: parsed.office_id,
            name: parsed.name,
            office_type: class.office_type,
            office_district: class.office_district,
            winner: None,
            winner_party: None,
            winner_margin: None,
            winner_percent: None,
            candidates,
            version_id: self.header.version_id,
        });
        Ok(())
    }

    fn statewide_candidate(
        &mut self,
        office_id: u64,
        cand: &ParsedStatewideCandidate,
    ) -> StatewideCandidate {
        let matches = self.candidates_named(&cand.name);
        match matches.len() {
            0 => {
                debug!(
                    "add_statewide_office: {}: no race candidate named {:?}",
                    office_id, cand.name
                );
                self.report
                    .unmatched_statewide_candidates
                    .push(cand.name.clone());
            }
            1 => {}
            _ => {
                let candidate_ids: Vec<u64> = matches
                    .iter()
                    .map(|idx| self.candidates[*idx].candidate_id)
                    .collect();
                warn!(
                    "add_statewide_office: {}: {:?} matches several candidates {:?}, using the first",
                    office_id, cand.name, candidate_ids
                );
                self.report.ambiguous_matches.push(AmbiguousMatch {
                    office_id,
                    name: cand.name.clone(),
                    candidate_ids,
                });
            }
        }
        let linked = matches.first().map(|idx| &self.candidates[*idx]);
        let name = parse_person_name(&cand.name);
        StatewideCandidate {
            name: cand.name.clone(),
            first_name: name.first,
            last_name: name.last,
            incumbent: is_incumbent(&cand.name),
            party: normalize_party(&cand.party_code),
            color: cand.color.clone(),
            total_votes: cand.total_votes,
            ballot_order: cand.ballot_order,
            office_id,
            candidate_id: linked.map(|c| c.candidate_id),
            county_results: linked.map(|c| c.county_results.clone()).unwrap_or_default(),
            endorsement: None,
        }
    }

    // Distinct candidates with this name, in race order then candidate order.
    fn candidates_named(&self, name: &str) -> Vec<usize> {
        let key = name_key(name);
        let mut res: Vec<usize> = Vec::new();
        for slot in self.races.iter() {
            for idx in slot.candidate_slots.iter() {
                if name_key(&self.candidates[*idx].full_name) == key && !res.contains(idx) {
                    res.push(*idx);
                }
            }
        }
        res
    }

    /// Assembles the graph. Derived metrics are not computed here.
    pub fn finish(self) -> (ResultVersion, ReconcileReport) {
        let Reconciler {
            header,
            races,
            candidates,
            counties,
            statewide,
            mut report,
            ..
        } = self;
        let races: Vec<Race> = races
            .into_iter()
            .map(|slot| {
                let mut race = slot.race;
                race.candidates = slot
                    .candidate_slots
                    .iter()
                    .map(|idx| candidates[*idx].clone())
                    .collect();
                race
            })
            .collect();
        report.counties = counties.len();
        report.races = races.len();
        report.candidates = candidates.len();
        report.statewide_offices = statewide.len();
        info!(
            "reconcile: version {}: {} counties, {} races, {} candidates, {} statewide offices ({} unclassified offices)",
            header.version_id,
            report.counties,
            report.races,
            report.candidates,
            report.statewide_offices,
            report.classification_fallbacks.len()
        );
        let version = ResultVersion {
            version_id: header.version_id,
            election_id: header.election_id,
            election_date: header.election_date,
            statewide,
            counties,
            races,
        };
        (version, report)
    }
}
