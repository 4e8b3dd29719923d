/*!
The raw snapshot payloads, as delivered by the results feed.

The feed uses terse field names (`OID`, `ON`, `T`, ...) and mixes numbers with
numeric strings. The fragment structures below mirror the JSON as-is, with every
field optional. The `parse` methods then validate a fragment and return a typed
structure, or a [`ReconcileError`] naming the fragment and the offending field.
Nothing is inserted into the result graph before its fragment has been parsed.
*/

use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::error::*;
use crate::model::CountySummary;
use crate::names::{normalize_color, normalize_text};

// ********* Raw fragments **********

/// The header of a snapshot, naming the version and the election.
#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct VersionHeader {
    #[serde(rename = "___versionNo")]
    pub version_no: Option<JSValue>,
    #[serde(rename = "___electionId")]
    pub election_id: Option<JSValue>,
    #[serde(rename = "elecDate")]
    pub election_date: Option<JSValue>,
}

/// The results of one county, as published by the feed.
#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct CountyFragment {
    #[serde(rename = "N")]
    pub name: Option<String>,
    #[serde(rename = "C")]
    pub color: Option<String>,
    #[serde(rename = "TV")]
    pub registered_voters: Option<JSValue>,
    #[serde(
        rename = "Races",
        default,
        deserialize_with = "crate::keyed::ordered_values"
    )]
    pub races: Vec<RaceFragment>,
    #[serde(rename = "Summary")]
    pub summary: Option<SummaryFragment>,
}

#[derive(PartialEq, Debug, Clone, Default, Deserialize)]
pub struct SummaryFragment {
    #[serde(rename = "PRR")]
    pub precincts_reporting: Option<JSValue>,
    #[serde(rename = "PRP")]
    pub total_precincts: Option<JSValue>,
    #[serde(rename = "P")]
    pub percent_reporting: Option<JSValue>,
    #[serde(rename = "RV")]
    pub registered_voters: Option<JSValue>,
    #[serde(rename = "VC")]
    pub votes_counted: Option<JSValue>,
    #[serde(rename = "VT")]
    pub turnout_percent: Option<JSValue>,
    #[serde(rename = "NPL")]
    pub poll_locations: Option<JSValue>,
    #[serde(rename = "PLR")]
    pub poll_locations_reporting: Option<JSValue>,
    #[serde(rename = "PLP")]
    pub poll_locations_percent: Option<JSValue>,
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct RaceFragment {
    #[serde(rename = "OID")]
    pub race_id: Option<JSValue>,
    #[serde(rename = "ON")]
    pub office_name: Option<String>,
    /// Some feeds carry the office name under `N` instead of `ON`.
    #[serde(rename = "N")]
    pub name: Option<String>,
    #[serde(rename = "T")]
    pub total_votes: Option<JSValue>,
    #[serde(rename = "O")]
    pub ballot_order: Option<JSValue>,
    #[serde(rename = "PR")]
    pub precincts_reporting: Option<JSValue>,
    #[serde(rename = "OTRV")]
    pub registered_voters: Option<JSValue>,
    #[serde(rename = "TPR")]
    pub total_precincts: Option<JSValue>,
    #[serde(rename = "C", default, deserialize_with = "crate::keyed::ordered_values")]
    pub candidates: Vec<CandidateFragment>,
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct CandidateFragment {
    pub id: Option<JSValue>,
    #[serde(rename = "N")]
    pub name: Option<String>,
    #[serde(rename = "P")]
    pub party: Option<String>,
    #[serde(rename = "V")]
    pub total_votes: Option<JSValue>,
    #[serde(rename = "EV")]
    pub early_votes: Option<JSValue>,
    #[serde(rename = "PE")]
    pub percent: Option<JSValue>,
    #[serde(rename = "O")]
    pub ballot_order: Option<JSValue>,
    #[serde(rename = "C")]
    pub color: Option<String>,
}

/// One statewide office, as published by the statewide feed.
#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct OfficeFragment {
    #[serde(rename = "OID")]
    pub office_id: Option<JSValue>,
    #[serde(rename = "ON")]
    pub name: Option<String>,
    #[serde(rename = "C", default, deserialize_with = "crate::keyed::ordered_values")]
    pub candidates: Vec<StatewideCandidateFragment>,
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct StatewideCandidateFragment {
    #[serde(rename = "N")]
    pub name: Option<String>,
    #[serde(rename = "P")]
    pub party: Option<String>,
    #[serde(rename = "T")]
    pub total_votes: Option<JSValue>,
    #[serde(rename = "O")]
    pub ballot_order: Option<JSValue>,
    #[serde(rename = "C")]
    pub color: Option<String>,
}

#[derive(Deserialize)]
struct StatewidePayload {
    #[serde(rename = "OS", default, deserialize_with = "crate::keyed::ordered_values")]
    offices: Vec<OfficeFragment>,
}

// ********* Validated fragments **********

#[derive(PartialEq, Debug, Clone)]
pub struct VersionInfo {
    pub version_id: u64,
    pub election_id: u64,
    pub election_date: NaiveDate,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ParsedCounty {
    pub name: String,
    pub color: Option<String>,
    pub registered_voters: u64,
    pub summary: CountySummary,
    pub races: Vec<ParsedRace>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ParsedRace {
    pub race_id: u64,
    pub office: String,
    pub total_votes: u64,
    pub ballot_order: u64,
    pub precincts_reporting: u64,
    pub registered_voters: u64,
    pub total_precincts: u64,
    pub candidates: Vec<ParsedCandidate>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ParsedCandidate {
    pub candidate_id: u64,
    pub full_name: String,
    pub party_code: String,
    pub total_votes: u64,
    pub early_votes: u64,
    pub percent: f64,
    pub ballot_order: Option<u64>,
    pub color: Option<String>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ParsedOffice {
    pub office_id: u64,
    pub name: String,
    pub candidates: Vec<ParsedStatewideCandidate>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ParsedStatewideCandidate {
    pub name: String,
    pub party_code: String,
    pub total_votes: u64,
    pub ballot_order: u64,
    pub color: Option<String>,
}

impl VersionHeader {
    pub fn parse(&self) -> ReconcileResult<VersionInfo> {
        let scope = "version header";
        let raw_date = match required(&self.election_date, scope, "elecDate")? {
            JSValue::String(s) => s.clone(),
            JSValue::Number(n) => format!("{:08}", n.as_u64().unwrap_or_default()),
            other => other.to_string(),
        };
        Ok(VersionInfo {
            version_id: read_u64(&self.version_no, scope, "___versionNo")?,
            election_id: read_u64(&self.election_id, scope, "___electionId")?,
            election_date: parse_election_date(&raw_date)?,
        })
    }
}

impl CountyFragment {
    /// Validates the county and everything it contains.
    pub fn parse(&self) -> ReconcileResult<ParsedCounty> {
        let name = read_text(&self.name, "county", "N")?;
        let scope = format!("county {}", name);
        let summary = self
            .summary
            .as_ref()
            .context(MalformedFragmentSnafu {
                scope: scope.as_str(),
                field: "Summary",
            })?
            .parse(&name)?;
        let registered_voters = match read_opt_u64(&self.registered_voters, &scope, "TV")? {
            Some(x) => x,
            None => summary.registered_voters.context(MalformedFragmentSnafu {
                scope: scope.as_str(),
                field: "TV",
            })?,
        };
        let races = self
            .races
            .iter()
            .enumerate()
            .map(|(idx, race)| race.parse(&scope, idx))
            .collect::<ReconcileResult<Vec<ParsedRace>>>()?;
        debug!("parse: {}: {} races", scope, races.len());
        Ok(ParsedCounty {
            name,
            color: self.color.as_deref().and_then(normalize_color),
            registered_voters,
            summary,
            races,
        })
    }
}

impl SummaryFragment {
    pub fn parse(&self, county_name: &str) -> ReconcileResult<CountySummary> {
        let scope = format!("county {}, summary", county_name);
        Ok(CountySummary {
            county_name: county_name.to_string(),
            precincts_reporting: read_opt_u64(&self.precincts_reporting, &scope, "PRR")?,
            total_precincts: read_opt_u64(&self.total_precincts, &scope, "PRP")?,
            percent_reporting: read_opt_f64(&self.percent_reporting, &scope, "P")?,
            registered_voters: read_opt_u64(&self.registered_voters, &scope, "RV")?,
            votes_counted: read_opt_u64(&self.votes_counted, &scope, "VC")?,
            turnout_percent: read_opt_f64(&self.turnout_percent, &scope, "VT")?,
            poll_locations: read_opt_u64(&self.poll_locations, &scope, "NPL")?,
            poll_locations_reporting: read_opt_u64(&self.poll_locations_reporting, &scope, "PLR")?,
            poll_locations_percent: read_opt_f64(&self.poll_locations_percent, &scope, "PLP")?,
        })
    }
}

impl RaceFragment {
    fn parse(&self, county_scope: &str, idx: usize) -> ReconcileResult<ParsedRace> {
        let race_id = read_u64(
            &self.race_id,
            &format!("{}, race #{}", county_scope, idx + 1),
            "OID",
        )?;
        let scope = format!("{}, race {}", county_scope, race_id);
        let office_name = if self.office_name.is_some() {
            &self.office_name
        } else {
            &self.name
        };
        let candidates = self
            .candidates
            .iter()
            .enumerate()
            .map(|(cidx, c)| c.parse(&scope, cidx))
            .collect::<ReconcileResult<Vec<ParsedCandidate>>>()?;
        Ok(ParsedRace {
            race_id,
            office: read_text(office_name, &scope, "ON")?,
            total_votes: read_u64(&self.total_votes, &scope, "T")?,
            ballot_order: read_u64(&self.ballot_order, &scope, "O")?,
            precincts_reporting: read_u64(&self.precincts_reporting, &scope, "PR")?,
            registered_voters: read_u64(&self.registered_voters, &scope, "OTRV")?,
            total_precincts: read_u64(&self.total_precincts, &scope, "TPR")?,
            candidates,
        })
    }
}

impl CandidateFragment {
    fn parse(&self, race_scope: &str, idx: usize) -> ReconcileResult<ParsedCandidate> {
        let candidate_id = read_u64(
            &self.id,
            &format!("{}, candidate #{}", race_scope, idx + 1),
            "id",
        )?;
        let scope = format!("{}, candidate {}", race_scope, candidate_id);
        Ok(ParsedCandidate {
            candidate_id,
            full_name: read_text(&self.name, &scope, "N")?,
            party_code: read_text(&self.party, &scope, "P")?,
            total_votes: read_u64(&self.total_votes, &scope, "V")?,
            early_votes: read_opt_u64(&self.early_votes, &scope, "EV")?.unwrap_or(0),
            percent: read_opt_f64(&self.percent, &scope, "PE")?.unwrap_or(0.0),
            ballot_order: read_opt_u64(&self.ballot_order, &scope, "O")?,
            color: self.color.as_deref().and_then(normalize_color),
        })
    }
}

impl OfficeFragment {
    pub fn parse(&self) -> ReconcileResult<ParsedOffice> {
        let office_id = read_u64(&self.office_id, "statewide office", "OID")?;
        let scope = format!("statewide office {}", office_id);
        let name = read_text(&self.name, &scope, "ON")?;
        let candidates = self
            .candidates
            .iter()
            .enumerate()
            .map(|(idx, c)| c.parse(&scope, idx))
            .collect::<ReconcileResult<Vec<ParsedStatewideCandidate>>>()?;
        Ok(ParsedOffice {
            office_id,
            name,
            candidates,
        })
    }
}

impl StatewideCandidateFragment {
    fn parse(&self, office_scope: &str, idx: usize) -> ReconcileResult<ParsedStatewideCandidate> {
        let scope = format!("{}, candidate #{}", office_scope, idx + 1);
        Ok(ParsedStatewideCandidate {
            name: read_text(&self.name, &scope, "N")?,
            party_code: read_text(&self.party, &scope, "P")?,
            total_votes: read_u64(&self.total_votes, &scope, "T")?,
            ballot_order: read_u64(&self.ballot_order, &scope, "O")?,
            color: self.color.as_deref().and_then(normalize_color),
        })
    }
}

// ********* Entry points **********

pub fn version_header_from_str(s: &str) -> ReconcileResult<VersionHeader> {
    serde_json::from_str(s).context(PayloadSyntaxSnafu {
        payload: "version header",
    })
}

/// Reads a county payload: either an object of county fragments or an array.
/// Document order is kept.
pub fn county_fragments_from_str(s: &str) -> ReconcileResult<Vec<CountyFragment>> {
    let mut de = serde_json::Deserializer::from_str(s);
    let res: Vec<CountyFragment> = crate::keyed::ordered_values(&mut de).context(
        PayloadSyntaxSnafu {
            payload: "county results",
        },
    )?;
    de.end().context(PayloadSyntaxSnafu {
        payload: "county results",
    })?;
    Ok(res)
}

/// Reads a statewide payload: `{"OS": [...]}` or a bare array of offices.
pub fn office_fragments_from_str(s: &str) -> ReconcileResult<Vec<OfficeFragment>> {
    let js: JSValue = serde_json::from_str(s).context(PayloadSyntaxSnafu {
        payload: "statewide offices",
    })?;
    let res = if js.is_array() {
        serde_json::from_value::<Vec<OfficeFragment>>(js)
    } else {
        serde_json::from_value::<StatewidePayload>(js).map(|p| p.offices)
    };
    res.context(PayloadSyntaxSnafu {
        payload: "statewide offices",
    })
}

/// Accepts `MMDDYYYY` and `YYYY-MM-DD`.
pub fn parse_election_date(raw: &str) -> ReconcileResult<NaiveDate> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%m%d%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
        .context(InvalidElectionDateSnafu { value: s })
}

// ********* Field readers **********

fn required<'a>(x: &'a Option<JSValue>, scope: &str, field: &str) -> ReconcileResult<&'a JSValue> {
    match x {
        None | Some(JSValue::Null) => MalformedFragmentSnafu { scope, field }.fail(),
        Some(v) => Ok(v),
    }
}

fn is_blank(x: &Option<JSValue>) -> bool {
    match x {
        None | Some(JSValue::Null) => true,
        Some(JSValue::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

fn js_u64(v: &JSValue, scope: &str, field: &str) -> ReconcileResult<u64> {
    let parsed = match v {
        JSValue::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        JSValue::String(s) => s.trim().replace(',', "").parse::<u64>().ok(),
        _ => None,
    };
    parsed.context(InvalidNumberSnafu {
        scope,
        field,
        value: v.to_string(),
    })
}

fn js_f64(v: &JSValue, scope: &str, field: &str) -> ReconcileResult<f64> {
    let parsed = match v {
        JSValue::Number(n) => n.as_f64(),
        JSValue::String(s) => s
            .trim()
            .trim_end_matches('%')
            .replace(',', "")
            .parse::<f64>()
            .ok(),
        _ => None,
    };
    parsed
        .filter(|f| f.is_finite())
        .context(InvalidNumberSnafu {
            scope,
            field,
            value: v.to_string(),
        })
}

fn read_u64(x: &Option<JSValue>, scope: &str, field: &str) -> ReconcileResult<u64> {
    let v = required(x, scope, field)?;
    js_u64(v, scope, field)
}

fn read_opt_u64(x: &Option<JSValue>, scope: &str, field: &str) -> ReconcileResult<Option<u64>> {
    match x {
        Some(v) if !is_blank(x) => js_u64(v, scope, field).map(Some),
        _ => Ok(None),
    }
}

fn read_opt_f64(x: &Option<JSValue>, scope: &str, field: &str) -> ReconcileResult<Option<f64>> {
    match x {
        Some(v) if !is_blank(x) => js_f64(v, scope, field).map(Some),
        _ => Ok(None),
    }
}

/// A required, non-blank text field, normalized.
fn read_text(x: &Option<String>, scope: &str, field: &str) -> ReconcileResult<String> {
    let s = x.as_deref().map(normalize_text).unwrap_or_default();
    ensure!(!s.is_empty(), MalformedFragmentSnafu { scope, field });
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_numbers_and_strings() {
        let js = r##"[{"N": " harris ", "C": "#00FF00", "Summary": {"RV": "2,500,000", "PRR": 10, "PRP": "12", "P": "83.3"},
            "Races": {"100": {"OID": "100", "ON": "governor", "T": 900, "O": 1, "PR": "10", "OTRV": 2500000, "TPR": 12,
                "C": [{"id": 7, "N": "JANE DOE (I)", "P": "REP", "V": "600", "EV": 200, "PE": 66.67},
                      {"id": "8", "N": "JOHN ROE", "P": "DEM", "V": 300}]}}}]"##;
        let fragments = county_fragments_from_str(js).unwrap();
        assert_eq!(fragments.len(), 1);
        let county = fragments[0].parse().unwrap();
        assert_eq!(county.name, "HARRIS");
        assert_eq!(county.color.as_deref(), Some("#00ff00"));
        assert_eq!(county.registered_voters, 2_500_000);
        assert_eq!(county.summary.total_precincts, Some(12));
        assert_eq!(county.summary.percent_reporting, Some(83.3));
        assert_eq!(county.summary.votes_counted, None);
        let race = &county.races[0];
        assert_eq!(race.race_id, 100);
        assert_eq!(race.office, "GOVERNOR");
        assert_eq!(race.precincts_reporting, 10);
        assert_eq!(race.candidates.len(), 2);
        assert_eq!(race.candidates[0].total_votes, 600);
        assert_eq!(race.candidates[1].candidate_id, 8);
        assert_eq!(race.candidates[1].early_votes, 0);
        assert_eq!(race.candidates[1].percent, 0.0);
    }

    #[test]
    fn county_object_keeps_document_order() {
        let js = r#"{"Z": {"N": "ZAVALA", "TV": 1, "Summary": {}},
                     "A": {"N": "ANDERSON", "TV": 2, "Summary": {}},
                     "M": {"N": "MILAM", "TV": 3, "Summary": {}}}"#;
        let names: Vec<String> = county_fragments_from_str(js)
            .unwrap()
            .iter()
            .map(|c| c.parse().unwrap().name)
            .collect();
        assert_eq!(names, vec!["ZAVALA", "ANDERSON", "MILAM"]);
    }

    #[test]
    fn missing_race_id_is_malformed() {
        let js = r#"[{"N": "HARRIS", "TV": 10, "Summary": {},
            "Races": [{"ON": "GOVERNOR", "T": 1, "O": 1, "PR": 1, "OTRV": 1, "TPR": 1}]}]"#;
        let fragments = county_fragments_from_str(js).unwrap();
        match fragments[0].parse() {
            Err(ReconcileError::MalformedFragment { scope, field }) => {
                assert_eq!(field, "OID");
                assert!(scope.contains("HARRIS"), "{}", scope);
            }
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn missing_numeric_field_is_malformed() {
        let js = r#"[{"N": "HARRIS", "TV": 10, "Summary": {},
            "Races": [{"OID": 5, "ON": "GOVERNOR", "T": 1, "O": 1, "PR": null, "OTRV": 1, "TPR": 1}]}]"#;
        let fragments = county_fragments_from_str(js).unwrap();
        assert!(matches!(
            fragments[0].parse(),
            Err(ReconcileError::MalformedFragment { ref field, .. }) if field == "PR"
        ));
    }

    #[test]
    fn garbage_number_is_rejected() {
        let js = r#"[{"N": "HARRIS", "TV": "lots", "Summary": {}}]"#;
        let fragments = county_fragments_from_str(js).unwrap();
        assert!(matches!(
            fragments[0].parse(),
            Err(ReconcileError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn registered_voters_default_to_summary() {
        let js = r#"[{"N": "LOVING", "Summary": {"RV": 64}}]"#;
        let county = county_fragments_from_str(js).unwrap()[0].parse().unwrap();
        assert_eq!(county.registered_voters, 64);

        let js = r#"[{"N": "LOVING", "Summary": {}}]"#;
        assert!(county_fragments_from_str(js).unwrap()[0].parse().is_err());
    }

    #[test]
    fn race_name_fallback() {
        let js = r#"[{"N": "HARRIS", "TV": 10, "Summary": {},
            "Races": [{"OID": 5, "N": "attorney general", "T": 1, "O": 1, "PR": 1, "OTRV": 1, "TPR": 1}]}]"#;
        let county = county_fragments_from_str(js).unwrap()[0].parse().unwrap();
        assert_eq!(county.races[0].office, "ATTORNEY GENERAL");
    }

    #[test]
    fn statewide_payload_shapes() {
        let wrapped = r#"{"OS": [{"OID": 1, "ON": "GOVERNOR", "C": [{"N": "JANE DOE", "P": "REP", "T": 10, "O": 1}]}]}"#;
        let bare = r#"[{"OID": 1, "ON": "GOVERNOR", "C": [{"N": "JANE DOE", "P": "REP", "T": 10, "O": 1}]}]"#;
        let a: Vec<ParsedOffice> = office_fragments_from_str(wrapped)
            .unwrap()
            .iter()
            .map(|o| o.parse().unwrap())
            .collect();
        let b: Vec<ParsedOffice> = office_fragments_from_str(bare)
            .unwrap()
            .iter()
            .map(|o| o.parse().unwrap())
            .collect();
        assert_eq!(a, b);
        assert_eq!(a[0].candidates[0].total_votes, 10);
    }

    #[test]
    fn version_header() {
        let header = version_header_from_str(
            r#"{"___versionNo": "42", "___electionId": 47009, "elecDate": "11082022"}"#,
        )
        .unwrap()
        .parse()
        .unwrap();
        assert_eq!(header.version_id, 42);
        assert_eq!(header.election_id, 47009);
        assert_eq!(
            header.election_date,
            NaiveDate::from_ymd_opt(2022, 11, 8).unwrap()
        );
    }

    #[test]
    fn election_dates() {
        let expected = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        assert_eq!(parse_election_date("03012022").unwrap(), expected);
        assert_eq!(parse_election_date("2022-03-01").unwrap(), expected);
        assert!(matches!(
            parse_election_date("March 1st"),
            Err(ReconcileError::InvalidElectionDate { .. })
        ));
    }

    #[test]
    fn syntax_errors() {
        assert!(matches!(
            county_fragments_from_str("[{"),
            Err(ReconcileError::PayloadSyntax { .. })
        ));
        assert!(matches!(
            office_fragments_from_str("[] trailing"),
            Err(ReconcileError::PayloadSyntax { .. })
        ));
    }
}
