use crate::results::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSources {
    #[serde(rename = "versionFile")]
    pub version_file: Option<String>,
    #[serde(rename = "countyFile")]
    pub county_file: Option<String>,
    #[serde(rename = "officeFile")]
    pub office_file: Option<String>,
    #[serde(rename = "endorsementsFile")]
    pub endorsements_file: Option<String>,
}

/// Where the feed publishes each payload. `{electionId}` and `{versionNo}` are substituted.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct UrlTemplates {
    #[serde(rename = "resultVersionUrl")]
    pub result_version_url: Option<String>,
    #[serde(rename = "countyUrl")]
    pub county_url: Option<String>,
    #[serde(rename = "officeUrl")]
    pub office_url: Option<String>,
}

impl UrlTemplates {
    pub fn resolve(&self, election_id: u64, version_no: u64) -> Vec<(&'static str, String)> {
        [
            ("version", &self.result_version_url),
            ("county", &self.county_url),
            ("office", &self.office_url),
        ]
        .iter()
        .filter_map(|(what, template)| {
            template
                .as_deref()
                .map(|t| (*what, fill_template(t, election_id, version_no)))
        })
        .collect()
    }
}

fn fill_template(template: &str, election_id: u64, version_no: u64) -> String {
    template
        .replace("{electionId}", &election_id.to_string())
        .replace("{versionNo}", &version_no.to_string())
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ResultsConfig {
    #[serde(rename = "electionId")]
    _election_id: Option<JSValue>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "writeCrosstab")]
    pub write_crosstab: Option<bool>,
    pub sources: SnapshotSources,
    pub urls: Option<UrlTemplates>,
}

impl ResultsConfig {
    /// The election id, which may be written as a number or a string.
    pub fn election_id(&self) -> RunResult<Option<String>> {
        match &self._election_id {
            None | Some(JSValue::Null) => Ok(None),
            Some(JSValue::Number(n)) => Ok(Some(n.to_string())),
            Some(JSValue::String(s)) => Ok(Some(s.trim().to_string())),
            Some(x) => whatever!("electionId: expected a number or a string, got {}", x),
        }
    }
}

pub fn read_config(path: &str) -> RunResult<ResultsConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ResultsConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}
