use std::path::{Path, PathBuf};

use election_graph::ResultVersion;

/// `tx-{election}-{version}`, shared by all the artifacts of a version.
pub fn artifact_stem(version: &ResultVersion) -> String {
    format!("tx-{}-{}", version.election_id, version.version_id)
}

/// The path of an artifact: `{stem}{suffix}.{extension}` in `dir`.
pub fn artifact_path(dir: &Path, version: &ResultVersion, suffix: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}{}.{}", artifact_stem(version), suffix, extension))
}

/// Absolute paths are kept, relative ones are taken from `root`.
pub fn resolve_relative(root: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}
