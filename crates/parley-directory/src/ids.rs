use uuid::Uuid;

use crate::error::{DirectoryError, DirectoryResult};

/// Parse a textual identifier. Blank or malformed input is an invalid
/// argument, never "not found".
pub fn parse_id(field: &str, raw: &str) -> DirectoryResult<Uuid> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DirectoryError::InvalidArgument(format!(
            "{} cannot be empty",
            field
        )));
    }

    Uuid::parse_str(raw).map_err(|e| {
        DirectoryError::InvalidArgument(format!(
            "{} '{}' is not a valid identifier: {}",
            field, raw, e
        ))
    })
}

pub fn require_non_empty<'a>(field: &str, value: &'a str) -> DirectoryResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DirectoryError::InvalidArgument(format!(
            "{} cannot be empty",
            field
        )));
    }
    Ok(value)
}
