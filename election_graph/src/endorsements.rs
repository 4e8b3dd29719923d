use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::model::{ResultVersion, StatewideCandidate};
use crate::names::normalize_text;

const ENDORSEMENT_ID_MODULUS: u64 = 100_000_000;

/// Whether one organization endorsed the candidate. Unset when the source left it blank.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Endorser {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endorsed: Option<bool>,
}

#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEndorsement {
    pub endorsement_id: u64,
    pub district_type: String,
    pub district_number: String,
    pub first_name: String,
    pub last_name: String,
    pub endorsers: Vec<Endorser>,
}

impl CandidateEndorsement {
    pub fn new(
        district_type: &str,
        district_number: &str,
        first_name: &str,
        last_name: &str,
        endorsers: Vec<Endorser>,
    ) -> CandidateEndorsement {
        CandidateEndorsement {
            endorsement_id: endorsement_id(first_name, last_name, district_type, district_number),
            district_type: district_type.trim().to_string(),
            district_number: district_number.trim().to_string(),
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            endorsers,
        }
    }

    fn matches(
        &self,
        office_type: &str,
        office_district: Option<&str>,
        cand: &StatewideCandidate,
    ) -> bool {
        let same_office = normalize_text(&self.district_type) == office_type
            && normalize_text(&self.district_number) == office_district.unwrap_or("");
        let same_name = |ours: &str, theirs: &Option<String>| {
            theirs
                .as_deref()
                .map(|t| normalize_text(t) == normalize_text(ours))
                .unwrap_or(false)
        };
        same_office
            && same_name(&self.first_name, &cand.first_name)
            && same_name(&self.last_name, &cand.last_name)
    }
}

/// A stable identifier for an endorsement record.
///
/// The SHA-256 digest of first name, last name, district type and district
/// number, read as a hexadecimal integer, modulo 10^8.
pub fn endorsement_id(
    first_name: &str,
    last_name: &str,
    district_type: &str,
    district_number: &str,
) -> u64 {
    let key = format!(
        "{}{}{}{}",
        first_name.trim(),
        last_name.trim(),
        district_type.trim(),
        district_number.trim()
    );
    sha256::digest(key.as_str())
        .chars()
        .filter_map(|c| c.to_digit(16))
        .fold(0u64, |acc, d| (acc * 16 + d as u64) % ENDORSEMENT_ID_MODULUS)
}

/// Attaches each endorsement to the first statewide candidate it describes.
///
/// Returns the ids of the endorsements that matched nobody.
pub fn attach_endorsements(
    version: &mut ResultVersion,
    endorsements: &[CandidateEndorsement],
) -> Vec<u64> {
    let mut unmatched: Vec<u64> = Vec::new();
    for endorsement in endorsements.iter() {
        let target = version.statewide.iter_mut().find_map(|office| {
            let office_type = office.office_type.clone();
            let office_district = office.office_district.clone();
            office
                .candidates
                .iter_mut()
                .find(|c| endorsement.matches(&office_type, office_district.as_deref(), c))
        });
        match target {
            Some(cand) => {
                debug!(
                    "attach_endorsements: endorsement {} -> {} (office {})",
                    endorsement.endorsement_id, cand.name, cand.office_id
                );
                cand.endorsement = Some(endorsement.clone());
            }
            None => {
                warn!(
                    "attach_endorsements: no candidate for endorsement {} ({} {}, {} {})",
                    endorsement.endorsement_id,
                    endorsement.first_name,
                    endorsement.last_name,
                    endorsement.district_type,
                    endorsement.district_number
                );
                unmatched.push(endorsement.endorsement_id);
            }
        }
    }
    unmatched
}
