// ********* The reconciled result graph **********
//
// One canonical type per concept. These are both the in-memory graph and the
// shape of the JSON artifact: unset fields are left out of the output, and
// parsing the artifact back gives an equal graph.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::endorsements::CandidateEndorsement;
use crate::keyed::Keyed;

/// One snapshot of the results of an election.
///
/// Owns all the counties, races and statewide offices of the snapshot.
/// Counties and statewide offices are kept in processing order.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ResultVersion {
    pub version_id: u64,
    pub election_id: u64,
    pub election_date: NaiveDate,
    #[serde(with = "crate::keyed")]
    pub statewide: Vec<StatewideOffice>,
    #[serde(with = "crate::keyed")]
    pub counties: Vec<County>,
    pub races: Vec<Race>,
}

impl ResultVersion {
    pub fn county(&self, name: &str) -> Option<&County> {
        self.counties.iter().find(|c| c.name == name)
    }

    pub fn statewide_office(&self, office_id: u64) -> Option<&StatewideOffice> {
        self.statewide.iter().find(|o| o.office_id == office_id)
    }

    pub fn race(&self, race_id: u64) -> Option<&Race> {
        self.races.iter().find(|r| r.race_id == race_id)
    }
}

/// A contest for one office, across all the counties reporting it.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Race {
    pub race_id: u64,
    pub office: String,
    pub office_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office_district: Option<String>,
    pub total_votes: u64,
    pub precincts_reporting: u64,
    pub registered_voters: u64,
    pub total_precincts: u64,
    pub turnout_pct: f64,
    pub precinct_reporting_pct: f64,
    pub counties: Vec<CountyRaceDetail>,
    pub candidates: Vec<Candidate>,
}

impl Race {
    pub fn candidate(&self, candidate_id: u64) -> Option<&Candidate> {
        self.candidates
            .iter()
            .find(|c| c.candidate_id == candidate_id)
    }
}

/// The figures of one race in one county.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CountyRaceDetail {
    pub county: String,
    pub race_id: u64,
    pub total_votes: u64,
    pub ballot_order: u64,
    pub precincts_reporting: u64,
    pub registered_voters: u64,
    pub total_precincts: u64,
    pub county_turnout_pct: f64,
    pub county_precinct_pct: f64,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub candidate_id: u64,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub incumbent: bool,
    pub party: String,
    pub county_results: Vec<CandidateCountyResult>,
}

impl Candidate {
    pub fn total_votes(&self) -> u64 {
        self.county_results.iter().map(|r| r.total_votes).sum()
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CandidateCountyResult {
    pub county: String,
    pub early_votes: u64,
    pub election_day_votes: u64,
    pub total_votes: u64,
    pub percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ballot_order: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct County {
    pub name: String,
    pub registered_voters: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub summary: CountySummary,
    pub version_id: u64,
}

impl Keyed for County {
    fn key(&self) -> String {
        self.name.clone()
    }
}

/// The county-wide figures, as the county published them.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountySummary {
    pub county_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precincts_reporting: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_precincts: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_reporting: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_voters: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes_counted: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turnout_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_locations: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_locations_reporting: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_locations_percent: Option<f64>,
}

/// A race seen at the level of the whole state.
///
/// The winner fields stay unset until the metrics have been computed, and
/// also when every candidate has zero votes.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct StatewideOffice {
    pub office_id: u64,
    pub name: String,
    pub office_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office_district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_party: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_margin: Option<u64>,
    /// A ratio in [0, 1] when several candidates ran, 100 for a lone candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_percent: Option<f64>,
    pub candidates: Vec<StatewideCandidate>,
    pub version_id: u64,
}

impl Keyed for StatewideOffice {
    fn key(&self) -> String {
        self.office_id.to_string()
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct StatewideCandidate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub incumbent: bool,
    pub party: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub total_votes: u64,
    pub ballot_order: u64,
    pub office_id: u64,
    /// The race candidate whose county results were copied here, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<u64>,
    pub county_results: Vec<CandidateCountyResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endorsement: Option<CandidateEndorsement>,
}
