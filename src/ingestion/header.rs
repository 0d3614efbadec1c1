//! Header reconciliation: maps human-authored column headers onto the canonical vocabulary.

/// Canonical columns every sheet must provide.
pub const REQUIRED_COLUMNS: [&str; 3] = ["date", "series", "value"];

/// Canonical name -> accepted (already cleaned) synonyms.
pub const HEADER_SYNONYMS: &[(&str, &[&str])] = &[
    ("date", &["date", "period", "time"]),
    ("series", &["series", "indicator", "variable", "ticker"]),
    ("value", &["value", "observation", "val"]),
    ("vintage_date", &["vintage", "as_of", "asof", "revision_date"]),
];

/// Normalize one raw header.
///
/// The header is lower-cased, trimmed and has spaces replaced by underscores. If the result is a
/// known synonym the canonical name is returned, otherwise the cleaned header passes through.
pub fn normalize_header(raw: &str) -> String {
    let cleaned = raw.trim().to_lowercase().replace(' ', "_");
    HEADER_SYNONYMS
        .iter()
        .find(|(_, synonyms)| synonyms.contains(&cleaned.as_str()))
        .map(|(canonical, _)| (*canonical).to_string())
        .unwrap_or(cleaned)
}

/// Required canonical columns absent from `columns`, in canonical order.
pub fn missing_required(columns: &[String]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|req| !columns.iter().any(|c| c == *req))
        .map(|req| (*req).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_synonyms_case_and_space_insensitively() {
        assert_eq!(normalize_header("Period"), "date");
        assert_eq!(normalize_header("  INDICATOR "), "series");
        assert_eq!(normalize_header("Val"), "value");
        assert_eq!(normalize_header("As Of"), "vintage_date");
        assert_eq!(normalize_header("revision date"), "vintage_date");
        assert_eq!(normalize_header("Ticker"), "series");
    }

    #[test]
    fn unknown_headers_pass_through_cleaned() {
        assert_eq!(normalize_header("Units"), "units");
        assert_eq!(normalize_header("Data Source"), "data_source");
        assert_eq!(normalize_header("region"), "region");
    }

    #[test]
    fn every_synonym_round_trips_to_its_canonical_name() {
        for (canonical, synonyms) in HEADER_SYNONYMS {
            for s in *synonyms {
                assert_eq!(normalize_header(&s.to_uppercase()), *canonical);
            }
        }
    }

    #[test]
    fn reports_missing_required_in_canonical_order() {
        let cols = vec!["series".to_string(), "units".to_string()];
        assert_eq!(missing_required(&cols), vec!["date", "value"]);
        let full = vec!["value".to_string(), "date".to_string(), "series".to_string()];
        assert!(missing_required(&full).is_empty());
    }
}
