// Reading the payloads of a snapshot from disk.

use crate::results::io_endorsements::read_endorsements;
use crate::results::*;

use election_graph::payload::{
    county_fragments_from_str, office_fragments_from_str, version_header_from_str,
};

fn read_payload<T>(
    path: &Path,
    parse: fn(&str) -> Result<T, ReconcileError>,
) -> RunResult<T> {
    let p = path.display().to_string();
    info!("Attempting to read payload file {:?}", p);
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path: p.as_str() })?;
    parse(contents.as_str()).context(ReadingPayloadSnafu { path: p.as_str() })
}

pub fn read_snapshot(settings: &RunSettings) -> RunResult<Snapshot> {
    let header = read_payload(&settings.version_file, version_header_from_str)?;
    let counties = read_payload(&settings.county_file, county_fragments_from_str)?;
    let offices = read_payload(&settings.office_file, office_fragments_from_str)?;
    let endorsements = match &settings.endorsements_file {
        Some(p) => read_endorsements(p)?,
        None => Vec::new(),
    };
    debug!(
        "read_snapshot: {} county fragments, {} office fragments, {} endorsements",
        counties.len(),
        offices.len(),
        endorsements.len()
    );
    Ok(Snapshot {
        header,
        counties,
        offices,
        endorsements,
    })
}
