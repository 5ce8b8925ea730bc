//! Statement text normalization.

/// Collapses every whitespace run (newlines and tabs included) to a single
/// space and trims both ends.
///
/// Purely textual: the full normalized text is the cache key, so statements
/// that differ in anything but whitespace never share an entry.
pub fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}
