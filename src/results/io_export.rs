// Writing the JSON and CSV artifacts of a result version.

use serde::Serialize;

use election_graph::flatten::*;

use crate::results::io_common::artifact_path;
use crate::results::*;

pub const RACE_SUFFIX: &str = "-race-results";
pub const COUNTY_SUFFIX: &str = "-county-results";
pub const STATEWIDE_SUFFIX: &str = "-statewide-results";
pub const ROLLUP_SUFFIX: &str = "-statewide-rollup";
pub const CROSSTAB_SUFFIX: &str = "-crosstab";

/// The pretty-printed JSON form of the graph. Unset fields are left out.
pub fn result_json(version: &ResultVersion) -> RunResult<String> {
    serde_json::to_string_pretty(version).context(SerializingJsonSnafu {})
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> RunResult<()> {
    let p = path.display().to_string();
    let mut wtr = csv::Writer::from_path(path).context(WritingCsvSnafu { path: p.as_str() })?;
    for row in rows.iter() {
        wtr.serialize(row)
            .context(WritingCsvSnafu { path: p.as_str() })?;
    }
    wtr.flush()
        .map_err(csv::Error::from)
        .context(WritingCsvSnafu { path: p.as_str() })?;
    debug!("write_rows: {}: {} rows", p, rows.len());
    Ok(())
}

fn write_crosstab(path: &Path, tab: &CrossTab) -> RunResult<()> {
    let p = path.display().to_string();
    let mut wtr = csv::Writer::from_path(path).context(WritingCsvSnafu { path: p.as_str() })?;
    let mut header: Vec<String> = ["office_type", "office", "candidate", "party"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(tab.counties.iter().cloned());
    header.push(MARGIN_LABEL.to_string());
    wtr.write_record(&header)
        .context(WritingCsvSnafu { path: p.as_str() })?;
    for row in tab.rows.iter().chain(std::iter::once(&tab.margin_row())) {
        let mut record: Vec<String> = vec![
            row.office_type.clone(),
            row.office.clone(),
            row.candidate.clone(),
            row.party.clone(),
        ];
        record.extend(row.cells.iter().map(|c| c.to_string()));
        record.push(row.total.to_string());
        wtr.write_record(&record)
            .context(WritingCsvSnafu { path: p.as_str() })?;
    }
    wtr.flush()
        .map_err(csv::Error::from)
        .context(WritingCsvSnafu { path: p.as_str() })?;
    Ok(())
}

/// Writes the JSON artifact and the CSV exports into `dir`, creating it if needed.
///
/// The CSV exports are the race, county and statewide rows, the statewide
/// rollup and, on request, the cross-tab.
///
/// Returns the paths written, JSON first.
pub fn write_artifacts(
    version: &ResultVersion,
    dir: &Path,
    with_crosstab: bool,
) -> RunResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).context(CreatingDirSnafu {
        path: dir.display().to_string(),
    })?;
    let mut written: Vec<PathBuf> = Vec::new();

    let json_path = artifact_path(dir, version, "", "json");
    let js = result_json(version)?;
    fs::write(&json_path, js).context(WritingJsonSnafu {
        path: json_path.display().to_string(),
    })?;
    written.push(json_path);

    let race_path = artifact_path(dir, version, RACE_SUFFIX, "csv");
    write_rows(&race_path, &race_rows(version))?;
    written.push(race_path);

    let county_path = artifact_path(dir, version, COUNTY_SUFFIX, "csv");
    write_rows(&county_path, &county_rows(version))?;
    written.push(county_path);

    let statewide = statewide_rows(version);
    let statewide_path = artifact_path(dir, version, STATEWIDE_SUFFIX, "csv");
    write_rows(&statewide_path, &statewide)?;
    written.push(statewide_path);

    let rollup_path = artifact_path(dir, version, ROLLUP_SUFFIX, "csv");
    write_rows(&rollup_path, &statewide_rollup(&statewide))?;
    written.push(rollup_path);

    if with_crosstab {
        let crosstab_path = artifact_path(dir, version, CROSSTAB_SUFFIX, "csv");
        write_crosstab(&crosstab_path, &CrossTab::from_rows(&statewide))?;
        written.push(crosstab_path);
    }
    Ok(written)
}
