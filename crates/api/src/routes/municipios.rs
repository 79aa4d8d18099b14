//! Municipality Routes
//!
//! Each handler settles into an [`Outcome`]: data (200), done (204),
//! nothing there (404) or failure (400 with the raw error text).

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::outcome::Outcome;
use crate::AppState;
use storage::{Municipality, MunicipalityFields};

/// Record id from the path; a rejection is settled like any other failure
type IdParam = Result<Path<i64>, PathRejection>;

/// Raw request body; a rejection (e.g. over the size limit) is a failure too
type BodyParam = Result<Bytes, BytesRejection>;

fn path_id(id: IdParam) -> Result<i64, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|rejection| ApiError::InvalidPath(rejection.body_text()))
}

/// Fetch from upstream and store every new record (POST /municipios)
pub async fn ingest(State(state): State<Arc<AppState>>) -> Outcome<()> {
    Outcome::settle("ingest", ingest_records(&state).await)
}

async fn ingest_records(state: &AppState) -> Result<Outcome<()>, ApiError> {
    let records = state.source.fetch().await?;
    if records.is_empty() {
        info!("No municipalities returned by upstream");
        return Ok(Outcome::Empty);
    }

    let fetched = records.len();
    let summary = state.repository.insert_many(records)?;
    info!(
        fetched,
        inserted = summary.inserted,
        skipped = summary.skipped,
        "Ingested municipalities"
    );
    Ok(Outcome::Done)
}

/// List every stored record (GET /municipios)
pub async fn list(State(state): State<Arc<AppState>>) -> Outcome<Vec<Municipality>> {
    Outcome::settle("list", list_records(&state))
}

fn list_records(state: &AppState) -> Result<Outcome<Vec<Municipality>>, ApiError> {
    let records = state.repository.list_all()?;
    if records.is_empty() {
        debug!("Store is empty");
        return Ok(Outcome::Empty);
    }
    debug!(count = records.len(), "Listing municipalities");
    Ok(Outcome::Found(records))
}

/// Get one record (GET /municipios/{id})
pub async fn get_by_id(State(state): State<Arc<AppState>>, id: IdParam) -> Outcome<Municipality> {
    let result = path_id(id).and_then(|id| {
        let found = state.repository.find_by_id(id)?;
        Ok(found.map_or(Outcome::Empty, Outcome::Found))
    });
    Outcome::settle("get_by_id", result)
}

/// Replace the fields of a record, keeping its id (PUT /municipios/{id})
///
/// The id is looked up before the body is decoded, so an unknown id is
/// always 404 whatever the payload.
pub async fn update(
    State(state): State<Arc<AppState>>,
    id: IdParam,
    body: BodyParam,
) -> Outcome<Municipality> {
    Outcome::settle("update", update_record(&state, id, body))
}

fn update_record(
    state: &AppState,
    id: IdParam,
    body: BodyParam,
) -> Result<Outcome<Municipality>, ApiError> {
    let id = path_id(id)?;
    if state.repository.find_by_id(id)?.is_none() {
        debug!(id, "Municipality not found for update");
        return Ok(Outcome::Empty);
    }

    let body = body.map_err(|rejection| ApiError::InvalidPayload(rejection.body_text()))?;
    let fields: MunicipalityFields =
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidPayload(e.to_string()))?;

    // Deleted between lookup and replace
    let Some(updated) = state.repository.replace(id, fields)? else {
        return Ok(Outcome::Empty);
    };
    info!(id, "Updated municipality");
    Ok(Outcome::Found(updated))
}

/// Remove every record (DELETE /municipios)
pub async fn delete_all(State(state): State<Arc<AppState>>) -> Outcome<()> {
    let result = state
        .repository
        .delete_all()
        .map(|had_records| {
            if had_records {
                info!("Deleted all municipalities");
                Outcome::Done
            } else {
                Outcome::Empty
            }
        })
        .map_err(ApiError::from);
    Outcome::settle("delete_all", result)
}

/// Remove one record (DELETE /municipios/{id})
pub async fn delete_by_id(State(state): State<Arc<AppState>>, id: IdParam) -> Outcome<()> {
    let result = path_id(id).and_then(|id| {
        if !state.repository.delete_by_id(id)? {
            return Ok(Outcome::Empty);
        }
        info!(id, "Deleted municipality");
        Ok(Outcome::Done)
    });
    Outcome::settle("delete_by_id", result)
}
