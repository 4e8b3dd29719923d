use log::{debug, info, warn};

use election_graph::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::results::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_endorsements;
mod io_export;
mod io_snapshot;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RunError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error reading {path}"))]
    ReadingPayload {
        source: ReconcileError,
        path: String,
    },
    #[snafu(display("Error opening CSV file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV file {path}, line {lineno}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("CSV file {path} has no column {column:?}"))]
    MissingColumn { path: String, column: String },
    #[snafu(display("Error writing {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Error writing {path}"))]
    WritingJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error serializing the result graph"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error creating the output directory {path}"))]
    CreatingDir {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Could not find the parent directory of {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("No {what} given: pass it as a flag or in the configuration"))]
    MissingSource { what: String },
    #[snafu(display("The snapshot could not be reconciled"))]
    Reconcile { source: ReconcileError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type RunResult<T> = Result<T, RunError>;

/// Everything a run needs, once flags and configuration have been merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub version_file: PathBuf,
    pub county_file: PathBuf,
    pub office_file: PathBuf,
    pub endorsements_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub write_crosstab: bool,
    pub reference: Option<PathBuf>,
    pub election_id: Option<String>,
    pub urls: Option<UrlTemplates>,
}

impl RunSettings {
    /// Flags take precedence over the configuration file.
    /// Paths from the configuration file are relative to its directory.
    pub fn resolve(args: &Args) -> RunResult<RunSettings> {
        let config = match &args.config {
            Some(p) => Some((read_config(p)?, config_root(p)?)),
            None => None,
        };
        let from_config = |pick: fn(&SnapshotSources) -> &Option<String>| -> Option<PathBuf> {
            config.as_ref().and_then(|(c, root)| {
                pick(&c.sources)
                    .as_deref()
                    .map(|p| io_common::resolve_relative(root, p))
            })
        };
        let pick_file = |flag: &Option<String>,
                         pick: fn(&SnapshotSources) -> &Option<String>,
                         what: &str|
         -> RunResult<PathBuf> {
            flag.as_deref()
                .map(PathBuf::from)
                .or_else(|| from_config(pick))
                .context(MissingSourceSnafu { what })
        };

        let output_dir = match (&args.out, &config) {
            (Some(out), _) => PathBuf::from(out),
            (None, Some((c, root))) => c
                .output_directory
                .as_deref()
                .map(|p| io_common::resolve_relative(root, p))
                .unwrap_or_else(|| root.clone()),
            (None, None) => PathBuf::from("."),
        };

        Ok(RunSettings {
            version_file: pick_file(&args.version_file, |s| &s.version_file, "version file")?,
            county_file: pick_file(&args.county_file, |s| &s.county_file, "county file")?,
            office_file: pick_file(&args.office_file, |s| &s.office_file, "office file")?,
            endorsements_file: args
                .endorsements
                .as_deref()
                .map(PathBuf::from)
                .or_else(|| from_config(|s| &s.endorsements_file)),
            output_dir,
            write_crosstab: args.crosstab
                || config
                    .as_ref()
                    .and_then(|(c, _)| c.write_crosstab)
                    .unwrap_or(false),
            reference: args.reference.as_deref().map(PathBuf::from),
            election_id: match &config {
                Some((c, _)) => c.election_id()?,
                None => None,
            },
            urls: config.as_ref().and_then(|(c, _)| c.urls.clone()),
        })
    }
}

fn config_root(config_path: &str) -> RunResult<PathBuf> {
    Path::new(config_path)
        .parent()
        .map(|p| p.to_path_buf())
        .context(MissingParentDirSnafu { path: config_path })
}

/// The outcome of a run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub version: ResultVersion,
    pub report: ReconcileReport,
    pub written: Vec<PathBuf>,
}

pub fn run(args: &Args) -> RunResult<()> {
    let settings = RunSettings::resolve(args)?;
    debug!("run: settings: {:?}", settings);
    let output = run_snapshot(&settings)?;
    for p in output.written.iter() {
        info!("run: wrote {}", p.display());
    }
    Ok(())
}

/// Reads one snapshot from disk, reconciles it and writes the artifacts.
pub fn run_snapshot(settings: &RunSettings) -> RunResult<RunOutput> {
    let snapshot = io_snapshot::read_snapshot(settings)?;
    let header = snapshot.header.parse().context(ReconcileSnafu {})?;

    if let Some(expected) = &settings.election_id {
        if *expected != header.election_id.to_string() {
            warn!(
                "run_snapshot: configuration is for election {} but the snapshot is for election {}",
                expected, header.election_id
            );
        }
    }
    if let Some(urls) = &settings.urls {
        for (what, url) in urls.resolve(header.election_id, header.version_id) {
            info!("run_snapshot: {} source: {}", what, url);
        }
    }

    let (version, report) = build_result_version(&snapshot).context(ReconcileSnafu {})?;
    log_report(&report);

    let written = io_export::write_artifacts(&version, &settings.output_dir, settings.write_crosstab)?;

    if let Some(reference) = &settings.reference {
        check_reference(&version, reference)?;
    }

    Ok(RunOutput {
        version,
        report,
        written,
    })
}

fn log_report(report: &ReconcileReport) {
    info!(
        "reconciled {} counties, {} races, {} candidates, {} statewide offices",
        report.counties, report.races, report.candidates, report.statewide_offices
    );
    if !report.classification_fallbacks.is_empty() {
        info!(
            "{} offices could not be classified",
            report.classification_fallbacks.len()
        );
        debug!(
            "unclassified offices: {:?}",
            report.classification_fallbacks
        );
    }
    if !report.ambiguous_matches.is_empty() {
        warn!(
            "{} statewide candidates matched several race candidates",
            report.ambiguous_matches.len()
        );
    }
    if !report.unmatched_statewide_candidates.is_empty() {
        warn!(
            "statewide candidates with no county results: {:?}",
            report.unmatched_statewide_candidates
        );
    }
    if report.duplicate_county_entries > 0 || report.duplicate_statewide_offices > 0 {
        warn!(
            "skipped {} repeated county entries and {} repeated statewide offices",
            report.duplicate_county_entries, report.duplicate_statewide_offices
        );
    }
    if !report.unmatched_endorsements.is_empty() {
        warn!(
            "endorsements matching no candidate: {:?}",
            report.unmatched_endorsements
        );
    }
}

/// Compares the result graph with a previously written JSON artifact.
fn check_reference(version: &ResultVersion, reference: &Path) -> RunResult<()> {
    let path = reference.display().to_string();
    let contents = fs::read_to_string(reference).context(OpeningJsonSnafu { path: path.as_str() })?;
    let reference_js: JSValue =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path: path.as_str() })?;
    let pretty_reference =
        serde_json::to_string_pretty(&reference_js).context(SerializingJsonSnafu {})?;
    let pretty_version = io_export::result_json(version)?;
    if pretty_reference != pretty_version {
        warn!("Found differences with the reference file {}", path);
        print_diff(pretty_reference.as_str(), pretty_version.as_str(), "\n");
        whatever!(
            "Difference detected between the result graph and the reference {}",
            path
        )
    }
    info!("check_reference: result matches {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_dir(name: &str) -> PathBuf {
        [env!("CARGO_MANIFEST_DIR"), "tests", "snapshots", name]
            .iter()
            .collect()
    }

    fn settings(name: &str, out: &Path) -> RunSettings {
        let dir = fixture_dir(name);
        RunSettings {
            version_file: dir.join("version.json"),
            county_file: dir.join("counties.json"),
            office_file: dir.join("offices.json"),
            endorsements_file: Some(dir.join("endorsements.csv")),
            output_dir: out.to_path_buf(),
            write_crosstab: true,
            reference: None,
            election_id: None,
            urls: None,
        }
    }

    fn test_wrapper(name: &str) -> RunOutput {
        let _ = env_logger::builder().is_test(true).try_init();
        let out = tempfile::tempdir().unwrap();
        let res = run_snapshot(&settings(name, out.path()));
        match res {
            Ok(output) => {
                for p in output.written.iter() {
                    assert!(p.exists(), "missing output {}", p.display());
                }
                output
            }
            Err(e) => panic!("run failed: {}", e),
        }
    }

    #[test]
    fn basic_snapshot() {
        let output = test_wrapper("basic");
        let v = &output.version;
        assert_eq!(v.election_id, 47009);
        assert_eq!(v.version_id, 12);
        assert_eq!(v.counties.len(), 3);
        assert_eq!(output.written.len(), 6);

        let governor = v.race(2001).unwrap();
        assert_eq!(governor.counties.len(), 3);
        assert_eq!(governor.candidates.len(), 2);
        assert_eq!(governor.total_votes, 1650);

        let office = v.statewide_office(2001).unwrap();
        assert_eq!(office.winner.as_deref(), Some("GREG ABBOTT (I)"));
        assert_eq!(office.winner_margin, Some(250));

        let da = v.race(3001).unwrap();
        assert_eq!(da.office_type, "DISTRICT ATTORNEY");
        assert_eq!(da.office_district.as_deref(), Some("123RD JUDICIAL DISTRICT"));

        let sd = v.statewide_office(4001).unwrap();
        assert!(sd.candidates[0].endorsement.is_some());
        assert_eq!(output.report.unmatched_endorsements.len(), 1);
        assert_eq!(output.report.classification_fallbacks, vec!["PROPOSITION A".to_string()]);
    }

    #[test]
    fn statewide_rollup_is_written() {
        let _ = env_logger::builder().is_test(true).try_init();
        let out = tempfile::tempdir().unwrap();
        let output = run_snapshot(&settings("basic", out.path())).unwrap();
        let rollup = out.path().join("tx-47009-12-statewide-rollup.csv");
        assert!(output.written.contains(&rollup));
        let contents = fs::read_to_string(&rollup).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("office,candidate,party,counties,early_votes,election_day_votes,total_votes,percent,winner_margin")
        );
        assert!(contents
            .lines()
            .any(|l| l.starts_with("GOVERNOR,GREG ABBOTT (I),Republican,3,450,500,950,")
                && l.ends_with(",250")));
    }

    #[test]
    fn reference_round_trip() {
        let _ = env_logger::builder().is_test(true).try_init();
        let out = tempfile::tempdir().unwrap();
        let first = run_snapshot(&settings("basic", out.path())).unwrap();
        let artifact = first
            .written
            .iter()
            .find(|p| p.extension().map(|e| e == "json").unwrap_or(false))
            .unwrap()
            .clone();
        assert_eq!(artifact.file_name().unwrap(), "tx-47009-12.json");

        let contents = fs::read_to_string(&artifact).unwrap();
        let parsed: ResultVersion = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed, first.version);

        let second_out = tempfile::tempdir().unwrap();
        let mut s = settings("basic", second_out.path());
        s.reference = Some(artifact);
        assert!(run_snapshot(&s).is_ok());
    }

    #[test]
    fn reference_mismatch_fails() {
        let out = tempfile::tempdir().unwrap();
        let reference = out.path().join("reference.json");
        fs::write(&reference, "{\"version_id\": 1}").unwrap();
        let mut s = settings("basic", out.path());
        s.reference = Some(reference);
        assert!(matches!(run_snapshot(&s), Err(RunError::Whatever { .. })));
    }

    #[test]
    fn malformed_snapshot_fails() {
        let out = tempfile::tempdir().unwrap();
        let mut s = settings("basic", out.path());
        s.county_file = fixture_dir("malformed").join("counties.json");
        assert!(matches!(
            run_snapshot(&s),
            Err(RunError::Reconcile {
                source: ReconcileError::MalformedFragment { .. }
            })
        ));
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn settings_from_config() {
        let dir = fixture_dir("basic");
        let args = Args {
            config: Some(dir.join("config.json").display().to_string()),
            crosstab: false,
            out: Some("elsewhere".to_string()),
            ..Default::default()
        };
        let s = RunSettings::resolve(&args).unwrap();
        assert_eq!(s.version_file, dir.join("version.json"));
        assert_eq!(s.endorsements_file, Some(dir.join("endorsements.csv")));
        assert_eq!(s.output_dir, PathBuf::from("elsewhere"));
        assert!(s.write_crosstab);
        assert_eq!(s.election_id.as_deref(), Some("47009"));
        assert!(s.urls.is_some());
    }

    #[test]
    fn flags_without_config() {
        let args = Args {
            version_file: Some("v.json".to_string()),
            county_file: Some("c.json".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            RunSettings::resolve(&args),
            Err(RunError::MissingSource { .. })
        ));
    }
}
