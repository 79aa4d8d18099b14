//! Mock municipality source (no network required)

use crate::{FetchError, MunicipalitySource};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use storage::Municipality;
use tracing::debug;

/// Source returning a fixed result on every fetch
#[derive(Debug)]
pub struct MockSource {
    result: Result<Vec<Municipality>, FetchError>,
    calls: AtomicUsize,
}

impl MockSource {
    /// Mock source that always returns `records`
    pub fn with_records(records: Vec<Municipality>) -> Self {
        Self {
            result: Ok(records),
            calls: AtomicUsize::new(0),
        }
    }

    /// Mock source that always fails with `error`
    pub fn failing(error: FetchError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of fetches served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MunicipalitySource for MockSource {
    async fn fetch(&self) -> Result<Vec<Municipality>, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(call, "Mock mode: serving fixed municipality result");
        self.result.clone()
    }
}
