use crate::core::handler::{ExpenseReceipt, ExpenseSubmissionHandler};
use crate::core::{ConfigProvider, ExpenseService, IncomingMessage};
use crate::utils::error::RelayError;
use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ExpenseCreatedBody {
    pub success: bool,
    #[serde(flatten)]
    pub receipt: ExpenseReceipt,
}

/// Build the router for the webhook endpoints.
pub fn router<S, C>(handler: Arc<ExpenseSubmissionHandler<S, C>>) -> Router
where
    S: ExpenseService + 'static,
    C: ConfigProvider + 'static,
{
    Router::new()
        .route("/add_expense", post(add_expense::<S, C>))
        .route("/health", get(health))
        .with_state(handler)
}

/// The body is read raw so that a missing or non-JSON payload is handled as
/// an empty message instead of being rejected by the extractor.
async fn add_expense<S, C>(
    State(handler): State<Arc<ExpenseSubmissionHandler<S, C>>>,
    body: Bytes,
) -> Result<Json<ExpenseCreatedBody>, RelayError>
where
    S: ExpenseService + 'static,
    C: ConfigProvider + 'static,
{
    let incoming = IncomingMessage::from_body(&body);
    let receipt = handler.submit(&incoming).await?;

    Ok(Json(ExpenseCreatedBody {
        success: true,
        receipt,
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
