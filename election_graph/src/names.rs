// Text normalization for the names, parties and colors found in the feed.

/// Marker appended by the feed to the names of incumbents.
pub const INCUMBENT_MARKER: &str = "(I)";

const HONORIFICS: [&str; 4] = ["DR", "MR", "MRS", "MS"];
const SUFFIXES: [&str; 5] = ["JR", "SR", "II", "III", "IV"];
const PARTICLES: [&str; 8] = ["VAN", "VON", "DE", "DEL", "DELA", "LA", "LE", "ST."];

/// Trims, collapses inner whitespace and uppercases.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_uppercase()
}

pub fn is_incumbent(full_name: &str) -> bool {
    full_name.contains(INCUMBENT_MARKER)
}

/// First and last name, as far as they can be told apart.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PersonName {
    pub first: Option<String>,
    pub last: Option<String>,
}

/// Splits a candidate name into first and last name.
///
/// The incumbent marker, honorifics, generational suffixes and quoted
/// nicknames are ignored. Joint tickets ("A / B") are left unparsed.
pub fn parse_person_name(full_name: &str) -> PersonName {
    let cleaned = normalize_text(&full_name.replace(INCUMBENT_MARKER, " "));
    if cleaned.contains('/') {
        return PersonName::default();
    }

    let mut tokens: Vec<String> = cleaned
        .split(' ')
        .map(|t| t.trim_matches(',').to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| !(t.starts_with('"') || t.starts_with('(') || t.starts_with('\'')))
        .collect();

    let has_honorific = tokens.len() > 1
        && tokens
            .first()
            .map(|t| HONORIFICS.contains(&t.trim_end_matches('.')))
            .unwrap_or(false);
    if has_honorific {
        tokens.remove(0);
    }
    while tokens.len() > 2
        && tokens
            .last()
            .map(|t| SUFFIXES.contains(&t.trim_end_matches('.')))
            .unwrap_or(false)
    {
        tokens.pop();
    }

    match tokens.as_slice() {
        [] => PersonName::default(),
        [only] => PersonName {
            first: Some(only.clone()),
            last: None,
        },
        [first, middle @ .., last] => {
            let last = match middle.last() {
                Some(p) if PARTICLES.contains(&p.as_str()) => format!("{} {}", p, last),
                _ => last.clone(),
            };
            PersonName {
                first: Some(first.clone()),
                last: Some(last),
            }
        }
    }
}

/// Expands the feed's party codes. Unknown codes pass through unchanged.
pub fn normalize_party(code: &str) -> String {
    let code = normalize_text(code);
    match code.as_str() {
        "REP" => "Republican".to_string(),
        "DEM" => "Democrat".to_string(),
        "LIB" => "Libertarian".to_string(),
        "GRE" => "Green".to_string(),
        "IND" => "Independent".to_string(),
        "W" => "Write-In".to_string(),
        _ => code,
    }
}

/// Hex colors come out as lowercase `#rrggbb`; anything else is kept trimmed.
pub fn normalize_color(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.chars().all(|c| c.is_ascii_hexdigit()) {
        match hex.len() {
            6 => return Some(format!("#{}", hex.to_lowercase())),
            3 => {
                let expanded: String = hex
                    .to_lowercase()
                    .chars()
                    .flat_map(|c| [c, c])
                    .collect();
                return Some(format!("#{}", expanded));
            }
            _ => {}
        }
    }
    Some(s.to_string())
}

/// The key used to match statewide candidates against race candidates.
pub fn name_key(full_name: &str) -> String {
    normalize_text(full_name)
}
