//! Database ID type definition.

use uuid::Uuid;

use crate::Error;

/// Alias for the UUID type used for database IDs.
pub type DatabaseId = Uuid;

/// Parse a raw ID taken from a URL path or request body.
///
/// An empty or malformed ID cannot refer to any row, so it is reported as
/// `not_found`.
pub fn parse_id(raw_id: &str, not_found: Error) -> Result<DatabaseId, Error> {
    let raw_id = raw_id.trim();

    if raw_id.is_empty() {
        return Err(not_found);
    }

    Uuid::parse_str(raw_id).map_err(|_| not_found)
}

/// Create a new random database ID.
pub fn new_id() -> DatabaseId {
    Uuid::new_v4()
}
