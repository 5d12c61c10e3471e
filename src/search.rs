/// Narrows `entries` to the names containing `query` as a case-sensitive
/// substring, keeping their original order.
///
/// An empty query matches nothing: the search box starts out with an empty
/// result list and returns to it whenever the query is cleared.
pub fn filter_entries(entries: &[String], query: &str) -> Vec<String> {
    if query.is_empty() {
        return Vec::new();
    }

    entries
        .iter()
        .filter(|name| name.contains(query))
        .cloned()
        .collect()
}
