/*!
Classification of raw office names into a normalized office taxonomy.

The classifier is an ordered table of rules. Rules are tried from top to bottom
and the first rule whose predicate holds produces the classification; later
rules are never consulted. The order matters: "CRIMINAL DISTRICT ATTORNEY" must
be tried before "DISTRICT ATTORNEY", which must be tried before the generic
"JUDICIAL DISTRICT" rule, and so on.

When no rule applies, the office is classified as [`FALLBACK_OFFICE_TYPE`]
with no district.
*/

use crate::names::normalize_text;

/// Office type given to offices that no rule recognizes.
pub const FALLBACK_OFFICE_TYPE: &str = "Other";

/// The normalized classification of an office name.
///
/// Districts are free text: some are numbers ("12"), others are named
/// ("PLACE 3", "123RD JUDICIAL DISTRICT", "WALLER COUNTY").
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct OfficeClass {
    pub office_type: String,
    pub office_district: Option<String>,
}

impl OfficeClass {
    fn new(office_type: &str, office_district: Option<String>) -> OfficeClass {
        OfficeClass {
            office_type: office_type.to_string(),
            office_district,
        }
    }

    pub fn fallback() -> OfficeClass {
        OfficeClass::new(FALLBACK_OFFICE_TYPE, None)
    }

    /// True when no rule matched the office name.
    pub fn is_fallback(&self) -> bool {
        self.office_type == FALLBACK_OFFICE_TYPE && self.office_district.is_none()
    }
}

struct Rule {
    applies: fn(&str) -> bool,
    classify: fn(&str) -> OfficeClass,
}

const UNEXPIRED_TERM: &str = "UNEXPIRED TERM";

static RULES: &[Rule] = &[
    Rule {
        applies: |s| s.contains("PRESIDENT"),
        classify: |_| OfficeClass::new("POTUS", None),
    },
    Rule {
        applies: |s| contains_any(s, &["U. S. SENATOR", "U.S. SENATOR", "UNITED STATES SENATOR"]),
        classify: |_| OfficeClass::new("US SENATE", None),
    },
    Rule {
        applies: |s| {
            contains_any(
                s,
                &[
                    "U. S. REPRESENTATIVE",
                    "U.S. REPRESENTATIVE",
                    "UNITED STATES REPRESENTATIVE",
                ],
            )
        },
        classify: |s| OfficeClass::new("CD", token_after(s, "DISTRICT")),
    },
    Rule {
        applies: |s| s.contains("LIEUTENANT GOVERNOR"),
        classify: |_| OfficeClass::new("LT GOVERNOR", None),
    },
    Rule {
        applies: |s| s.contains("GOVERNOR"),
        classify: |_| OfficeClass::new("GOVERNOR", None),
    },
    Rule {
        applies: |s| s.contains("ATTORNEY GENERAL"),
        classify: |_| OfficeClass::new("ATTORNEY GENERAL", None),
    },
    Rule {
        applies: |s| s.contains("COMPTROLLER"),
        classify: |_| OfficeClass::new("COMPTROLLER", None),
    },
    Rule {
        applies: |s| s.contains("GENERAL LAND OFFICE"),
        classify: |_| OfficeClass::new("LAND COMMISSIONER", None),
    },
    Rule {
        applies: |s| s.contains("COMMISSIONER OF AGRICULTURE"),
        classify: |_| OfficeClass::new("AGRICULTURE COMMISSIONER", None),
    },
    Rule {
        applies: |s| s.contains("RAILROAD COMMISSIONER"),
        classify: |_| OfficeClass::new("RRC", None),
    },
    Rule {
        applies: |s| s.contains("STATE SENATOR"),
        classify: |s| OfficeClass::new("SD", token_after(s, "DISTRICT")),
    },
    Rule {
        applies: |s| s.contains("STATE REPRESENTATIVE"),
        classify: |s| OfficeClass::new("HD", token_after(s, "DISTRICT")),
    },
    Rule {
        applies: |s| s.contains("STATE BOARD OF EDUCATION"),
        classify: |s| OfficeClass::new("SBOE", after_last_comma(s)),
    },
    Rule {
        applies: |s| s.contains("COURT OF CRIMINAL APPEALS") && s.contains("PRESIDING"),
        classify: |_| OfficeClass::new("PRESIDING JUDGE CCA", None),
    },
    Rule {
        applies: |s| s.contains("COURT OF CRIMINAL APPEALS"),
        classify: |s| OfficeClass::new("CCA", place(s)),
    },
    Rule {
        applies: |s| s.contains("SUPREME COURT") && s.contains("CHIEF JUSTICE"),
        classify: |_| OfficeClass::new("SCOTX CHIEF JUSTICE", None),
    },
    Rule {
        applies: |s| s.contains("SUPREME COURT"),
        classify: |s| OfficeClass::new("SCOTX", place(s)),
    },
    Rule {
        applies: |s| s.contains("COURT OF APPEALS") && s.contains("CHIEF JUSTICE"),
        classify: |s| OfficeClass::new("COA CHIEF JUSTICE", appeals_district(s)),
    },
    Rule {
        applies: |s| s.contains("COURT OF APPEALS"),
        classify: |s| OfficeClass::new("COA", appeals_district(s)),
    },
    Rule {
        applies: |s| s.contains("CRIMINAL DISTRICT ATTORNEY"),
        classify: |s| {
            OfficeClass::new(
                "CRIMINAL DISTRICT ATTORNEY",
                attorney_district(s, "CRIMINAL DISTRICT ATTORNEY"),
            )
        },
    },
    Rule {
        applies: |s| s.contains("DISTRICT ATTORNEY"),
        classify: |s| {
            OfficeClass::new("DISTRICT ATTORNEY", attorney_district(s, "DISTRICT ATTORNEY"))
        },
    },
    Rule {
        applies: |s| s.starts_with("CRIMINAL DISTRICT JUDGE"),
        classify: |s| OfficeClass::new("CRIMINAL DISTRICT JUDGE", after_last_comma(s)),
    },
    Rule {
        applies: |s| s.starts_with("DISTRICT JUDGE"),
        classify: |s| OfficeClass::new("DISTRICT JUDGE", after_last_comma(s)),
    },
    Rule {
        applies: |s| s.contains("JUDICIAL DISTRICT"),
        classify: |s| OfficeClass::new("DISTRICT JUDGE", segment_with(s, "JUDICIAL DISTRICT")),
    },
    Rule {
        applies: |s| s.contains("MULTICOUNTY COURT AT LAW"),
        classify: |s| {
            OfficeClass::new(
                "MULTICOUNTY COURT AT LAW",
                s.split_once("MULTICOUNTY").and_then(|(head, _)| non_empty(head)),
            )
        },
    },
];

/// Classifies a raw office name.
///
/// The name is normalized (trimmed, whitespace collapsed, uppercased) before
/// the rules are applied. This never fails: unknown offices get the fallback
/// classification.
///
/// ```
/// use election_graph::classifier::classify_office;
///
/// let class = classify_office("DISTRICT ATTORNEY, 123RD JUDICIAL DISTRICT");
/// assert_eq!(class.office_type, "DISTRICT ATTORNEY");
/// assert_eq!(class.office_district.as_deref(), Some("123RD JUDICIAL DISTRICT"));
/// ```
pub fn classify_office(raw_office: &str) -> OfficeClass {
    let office = normalize_text(raw_office);
    RULES
        .iter()
        .find(|rule| (rule.applies)(&office))
        .map(|rule| (rule.classify)(&office))
        .unwrap_or_else(OfficeClass::fallback)
}

fn contains_any(s: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| s.contains(p))
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim().trim_matches(',').trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

fn tokens(s: &str) -> Vec<&str> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect()
}

/// The token that follows the last occurrence of `marker`.
fn token_after(s: &str, marker: &str) -> Option<String> {
    tokens(s)
        .windows(2)
        .rev()
        .find(|w| w[0] == marker)
        .map(|w| w[1].to_string())
}

fn after_last_comma(s: &str) -> Option<String> {
    s.rsplit_once(',').and_then(|(_, tail)| non_empty(tail))
}

/// "PLACE n", if present.
fn place(s: &str) -> Option<String> {
    token_after(s, "PLACE").map(|n| format!("PLACE {}", n))
}

/// The comma-delimited segment containing `pattern`.
fn segment_with(s: &str, pattern: &str) -> Option<String> {
    s.split(',')
        .find(|seg| seg.contains(pattern))
        .and_then(non_empty)
}

/// "5TH" or "5TH, PLACE 2" for the courts of appeals.
fn appeals_district(s: &str) -> Option<String> {
    let ordinal: Option<String> = segment_with(s, "COURT OF APPEALS")
        .and_then(|seg| seg.split(' ').next().map(|t| t.to_string()))
        .filter(|t| t.starts_with(|c: char| c.is_ascii_digit()));
    match (ordinal, place(s)) {
        (Some(o), Some(p)) => Some(format!("{}, {}", o, p)),
        (Some(o), None) => Some(o),
        (None, p) => p,
    }
}

/// Where an attorney's office sits: "DA, 123RD JUDICIAL DISTRICT",
/// "DA FOR KLEBERG AND KENEDY COUNTIES", "WALLER COUNTY CDA", "CDA WALLER COUNTY".
fn attorney_district(s: &str, title: &str) -> Option<String> {
    let s = strip_unexpired(s);
    if s.contains(',') {
        return after_last_comma(s);
    }
    let (head, tail) = s.split_once(title)?;
    let tail = tail.trim();
    let tail = tail.strip_prefix("FOR ").unwrap_or(tail);
    non_empty(tail).or_else(|| non_empty(head))
}

fn strip_unexpired(s: &str) -> &str {
    match s.split_once(UNEXPIRED_TERM) {
        Some((head, _)) => head.trim().trim_end_matches('-').trim(),
        None => s,
    }
}
