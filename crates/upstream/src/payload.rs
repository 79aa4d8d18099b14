//! Upstream payload decoding

use crate::FetchError;
use storage::Municipality;

/// Parse an upstream body into municipality records.
///
/// The body must be a JSON array of objects; each object needs an integer
/// `id` and a string `nome`/`name` (any letter case). Other fields are ignored.
pub fn parse_municipalities(body: &str) -> Result<Vec<Municipality>, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::MalformedPayload(e.to_string()))
}
