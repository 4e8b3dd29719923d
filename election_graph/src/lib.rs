/*!
Reconciliation of election results published county by county.

A results snapshot comes as one payload per county plus a statewide payload.
The same race and candidates are repeated in every county that reports them.
This crate merges them into one [`ResultVersion`] graph, computes the derived
metrics (turnout, precincts reporting, winners and margins) and flattens the
graph into rows for export.

The crate does no I/O: it takes the payloads as strings or parsed fragments.
See the [`manual`] for the input formats.
*/

pub mod classifier;
pub mod endorsements;
mod error;
pub mod flatten;
pub mod keyed;
pub mod manual;
pub mod metrics;
pub mod model;
pub mod names;
pub mod payload;
pub mod reconcile;

use log::info;

pub use crate::classifier::{classify_office, OfficeClass};
pub use crate::endorsements::{CandidateEndorsement, Endorser};
pub use crate::error::{ReconcileError, ReconcileResult};
pub use crate::model::*;
pub use crate::payload::{CountyFragment, OfficeFragment, VersionHeader};
pub use crate::reconcile::{AmbiguousMatch, ReconcileReport, Reconciler};

/// All the payloads of one snapshot.
#[derive(PartialEq, Debug, Clone)]
pub struct Snapshot {
    pub header: VersionHeader,
    pub counties: Vec<CountyFragment>,
    pub offices: Vec<OfficeFragment>,
    pub endorsements: Vec<CandidateEndorsement>,
}

/// Builds the complete result graph of a snapshot.
///
/// Counties are merged first, then statewide offices, then endorsements are
/// attached and the metrics computed. Any malformed fragment fails the whole
/// snapshot.
pub fn build_result_version(
    snapshot: &Snapshot,
) -> ReconcileResult<(ResultVersion, ReconcileReport)> {
    let header = snapshot.header.parse()?;
    info!(
        "build_result_version: election {} version {} ({}): {} counties, {} statewide offices",
        header.election_id,
        header.version_id,
        header.election_date,
        snapshot.counties.len(),
        snapshot.offices.len()
    );
    let mut reconciler = Reconciler::new(&header);
    for county in snapshot.counties.iter() {
        reconciler.add_county(county)?;
    }
    for office in snapshot.offices.iter() {
        reconciler.add_statewide_office(office)?;
    }
    let (mut version, mut report) = reconciler.finish();
    report.unmatched_endorsements =
        endorsements::attach_endorsements(&mut version, &snapshot.endorsements);
    metrics::compute(&mut version);
    Ok((version, report))
}
