use uuid::Uuid;

/// Strips everything but ASCII alphanumerics, `-` and `_` from an externally
/// supplied identifier, so operator syntax such as `$ne` or `a.b` never reaches
/// a storage lookup.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Sanitizes `raw` and reads it as a record id. `None` when nothing that
/// could name a stored record is left.
pub fn parse_identifier(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(&sanitize(raw)).ok()
}
