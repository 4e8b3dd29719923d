// Primitives for reading the endorsements CSV file.

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::results::*;

const DISTRICT_TYPE: &str = "District Type";
const DISTRICT_NUMBER: &str = "District Number";
const FIRST_NAME: &str = "Candidate First Name";
const LAST_NAME: &str = "Candidate Last Name";
const ENDORSED_SUFFIX: &str = " Endorsed";

fn parse_flag(cell: &str) -> Option<bool> {
    match cell.trim().to_uppercase().as_str() {
        "TRUE" | "YES" | "Y" | "1" => Some(true),
        "FALSE" | "NO" | "N" | "0" => Some(false),
        _ => None,
    }
}

fn column(headers: &StringRecord, path: &str, name: &str) -> RunResult<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .context(MissingColumnSnafu { path, column: name })
}

pub fn read_endorsements(path: &Path) -> RunResult<Vec<CandidateEndorsement>> {
    let p = path.display().to_string();
    info!("Attempting to read endorsements file {:?}", p);
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path: p.as_str() })?;
    let headers = rdr
        .headers()
        .context(OpeningCsvSnafu { path: p.as_str() })?
        .clone();
    let type_idx = column(&headers, &p, DISTRICT_TYPE)?;
    let number_idx = column(&headers, &p, DISTRICT_NUMBER)?;
    let first_idx = column(&headers, &p, FIRST_NAME)?;
    let last_idx = column(&headers, &p, LAST_NAME)?;
    let endorser_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| {
            h.strip_suffix(ENDORSED_SUFFIX)
                .map(|name| (idx, name.trim().to_string()))
        })
        .collect();
    debug!("read_endorsements: endorsers: {:?}", endorser_cols);

    let mut res: Vec<CandidateEndorsement> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu {
            path: p.as_str(),
            lineno,
        })?;
        let cell = |i: usize| line.get(i).unwrap_or("").trim();
        let (district_type, district_number) = (cell(type_idx), cell(number_idx));
        let (first_name, last_name) = (cell(first_idx), cell(last_idx));
        if district_type.is_empty() || first_name.is_empty() || last_name.is_empty() {
            warn!(
                "read_endorsements: {}: line {}: incomplete record, skipping",
                p, lineno
            );
            continue;
        }
        let endorsers: Vec<Endorser> = endorser_cols
            .iter()
            .map(|(col, name)| Endorser {
                name: name.clone(),
                endorsed: parse_flag(cell(*col)),
            })
            .collect();
        res.push(CandidateEndorsement::new(
            district_type,
            district_number,
            first_name,
            last_name,
            endorsers,
        ));
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn reads_records() {
        let f = write_csv(
            "District Type,District Number,Candidate First Name,Candidate Last Name,Teachers Endorsed,Firefighters Endorsed\n\
             SD,3,Pat,Lee,TRUE,\n\
             GOVERNOR,,Jane,Doe,false,TRUE\n\
             HD,7,,Nobody,TRUE,TRUE\n",
        );
        let res = read_endorsements(f.path()).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].district_type, "SD");
        assert_eq!(res[0].district_number, "3");
        assert_eq!(
            res[0].endorsers,
            vec![
                Endorser {
                    name: "Teachers".to_string(),
                    endorsed: Some(true)
                },
                Endorser {
                    name: "Firefighters".to_string(),
                    endorsed: None
                },
            ]
        );
        assert_eq!(res[1].district_number, "");
        assert_eq!(res[1].endorsers[0].endorsed, Some(false));
        assert_eq!(
            res[0].endorsement_id,
            election_graph::endorsements::endorsement_id("Pat", "Lee", "SD", "3")
        );
    }

    #[test]
    fn missing_column() {
        let f = write_csv("District Type,Candidate First Name,Candidate Last Name\nSD,Pat,Lee\n");
        match read_endorsements(f.path()) {
            Err(RunError::MissingColumn { column, .. }) => assert_eq!(column, DISTRICT_NUMBER),
            x => panic!("unexpected {:?}", x),
        }
    }
}
