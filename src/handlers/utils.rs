use uuid::Uuid;

use crate::config;
use crate::error::ApiError;
use crate::filter::{Collection, ListQuery, RawParams};

/// Path identifiers must be UUIDs; anything else is a 400, not a 404
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::malformed_identifier(raw))
}

/// Build the list query for `collection` from the raw query string
pub fn list_query(collection: &'static Collection, raw_query: Option<&str>) -> Result<ListQuery, ApiError> {
    let params = RawParams::parse(raw_query);
    Ok(ListQuery::from_params(collection, &params, &config::config().list)?)
}
