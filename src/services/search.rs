use clap::ValueEnum;

use super::ServiceRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SearchMode {
    /// Field contains the query
    #[default]
    Substring,
    /// Query characters appear in the field in order, not necessarily adjacent
    Fuzzy,
}

impl SearchMode {
    fn matches(&self, query: &str, field: &str) -> bool {
        match self {
            SearchMode::Substring => field.trim().contains(query),
            SearchMode::Fuzzy => is_subsequence(query, field),
        }
    }
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut remaining = haystack.chars();
    needle
        .chars()
        .all(|wanted| remaining.by_ref().any(|c| c == wanted))
}

/// Records with at least one field matching `query`, in file order.
/// The query is trimmed and compared case-insensitively.
pub fn search<'a>(
    records: &'a [ServiceRecord],
    query: &str,
    mode: SearchMode,
) -> Vec<&'a ServiceRecord> {
    let query = query.trim().to_lowercase();
    records
        .iter()
        .filter(|record| {
            record
                .search_fields()
                .iter()
                .any(|field| mode.matches(&query, field))
        })
        .collect()
}
