use itertools::Itertools;

/// Strips leading and trailing whitespace from every line of a query.
///
/// Editors hand us indented multi-line queries; the trim normalizes the
/// incidental formatting without touching the query's meaning.
pub fn clean_query_text(raw: &str) -> String {
    raw.split('\n').map(str::trim).join("\n")
}
