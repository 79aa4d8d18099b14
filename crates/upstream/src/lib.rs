//! Upstream Municipality Source
//!
//! Fetches the municipality listing from the IBGE localities API.
//! Each fetch is a single GET with no caching and no retry.

mod client;
mod error;
mod mock;
mod payload;

pub use client::IbgeClient;
pub use error::FetchError;
pub use mock::MockSource;
pub use payload::parse_municipalities;

use async_trait::async_trait;
use storage::Municipality;

/// IBGE endpoint listing the municipalities of Minas Gerais
pub const IBGE_MUNICIPALITIES_URL: &str =
    "https://servicodados.ibge.gov.br/api/v1/localidades/estados/MG/municipios";

/// Default timeout for the upstream request
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A source of municipality records
#[async_trait]
pub trait MunicipalitySource: Send + Sync {
    /// Fetch the full listing
    async fn fetch(&self) -> Result<Vec<Municipality>, FetchError>;
}
