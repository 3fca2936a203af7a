//! Route handlers for the relay.
//!
//! All handlers receive `SharedState` via Axum state extraction. JSON
//! endpoints answer `{ok: true, ...}` on success and `{ok: false, error}`
//! through [`RelayError`] otherwise.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::shape;
use crate::error::RelayError;
use crate::store::{self, Firm};
use crate::SharedState;

const DEFAULT_SEARCH_LIMIT: i64 = 5;

pub fn relay_router(state: SharedState) -> Router {
    Router::new()
        // ── Health ───────────────────────────────────────────────────────
        .route("/", get(home))
        .route("/oauth/xero/callback", get(xero_callback))
        // ── Firms ────────────────────────────────────────────────────────
        .route("/firms/connect", post(firms_connect))
        // ── Clients ──────────────────────────────────────────────────────
        .route("/clients/search", post(clients_search))
        .route("/clients/resolve", post(clients_resolve))
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

async fn home() -> impl IntoResponse {
    (StatusCode::OK, "API OK")
}

/// GET /oauth/xero/callback: Landing page for the redirect registered with Xero.
async fn xero_callback() -> impl IntoResponse {
    (StatusCode::OK, "Xero callback received")
}

// =============================================================================
// Helpers
// =============================================================================

/// Unwrap a required string field; blank counts as missing.
fn required(value: Option<String>, field: &str) -> Result<String, RelayError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| RelayError::Validation(format!("{field} is required")))
}

async fn ensure_connected(state: &SharedState, firm_id: &str) -> Result<Firm, RelayError> {
    state
        .store
        .get(firm_id)
        .await
        .ok_or_else(|| RelayError::NotConnected(firm_id.to_string()))
}

// =============================================================================
// Firms
// =============================================================================

#[derive(Deserialize)]
struct ConnectRequest {
    firm_id: Option<String>,
    tenant_id: Option<String>,
    refresh_token: Option<String>,
}

/// POST /firms/connect: Register (or re-register) a firm's Xero connection.
async fn firms_connect(
    State(state): State<SharedState>,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<Json<Value>, RelayError> {
    let Json(body) = payload?;
    let firm_id = required(body.firm_id, "firm_id")?;
    let tenant_id = required(body.tenant_id, "tenant_id")?;
    let refresh_token = required(body.refresh_token, "refresh_token")?;

    state
        .store
        .connect(Firm {
            firm_id: firm_id.clone(),
            tenant_id: tenant_id.clone(),
            refresh_token,
        })
        .await;
    info!(firm_id = %firm_id, tenant_id = %tenant_id, "Firm connected");

    Ok(Json(json!({ "ok": true, "firm_id": firm_id })))
}

// =============================================================================
// Clients
// =============================================================================

#[derive(Deserialize)]
struct SearchRequest {
    firm_id: Option<String>,
    query: Option<String>,
    limit: Option<i64>,
}

/// POST /clients/search: Name search over the firm's Xero contacts.
async fn clients_search(
    State(state): State<SharedState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Value>, RelayError> {
    let Json(body) = payload?;
    let firm_id = required(body.firm_id, "firm_id")?;
    let query = required(body.query, "query")?.trim().to_string();
    let limit = usize::try_from(body.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)).unwrap_or(0);

    let firm = ensure_connected(&state, &firm_id).await?;
    if limit == 0 {
        return Ok(Json(json!({ "ok": true, "options": [] })));
    }

    let token = store::access_token(&state.store, state.identity.as_ref(), &firm_id).await?;
    let contacts = state
        .accounting
        .search_contacts(&token, &firm.tenant_id, &query)
        .await?;

    let options = shape::options(contacts, limit);
    Ok(Json(json!({ "ok": true, "options": options })))
}

#[derive(Deserialize)]
struct ResolveRequest {
    firm_id: Option<String>,
    client_id: Option<String>,
}

/// POST /clients/resolve: Fetch one contact and flatten it.
async fn clients_resolve(
    State(state): State<SharedState>,
    payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<Json<Value>, RelayError> {
    let Json(body) = payload?;
    let firm_id = required(body.firm_id, "firm_id")?;
    let client_id = required(body.client_id, "client_id")?;

    let firm = ensure_connected(&state, &firm_id).await?;
    let token = store::access_token(&state.store, state.identity.as_ref(), &firm_id).await?;

    let contact = state
        .accounting
        .get_contact(&token, &firm.tenant_id, &client_id)
        .await?
        .ok_or_else(|| RelayError::NotFound(format!("client {client_id}")))?;

    let mut response = serde_json::to_value(shape::resolve(contact, &client_id))
        .map_err(|e| RelayError::Internal(e.to_string()))?;
    if let Value::Object(ref mut fields) = response {
        fields.insert("ok".into(), Value::Bool(true));
    }

    Ok(Json(response))
}
