use crate::core::{ConfigProvider, CreatedExpense, ExpenseOutcome, ExpenseRecord, ExpenseService};
use crate::domain::model::SplitMode;
use crate::utils::error::{RelayError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const MAX_LOGGED_BODY: usize = 512;

#[derive(Debug, Serialize)]
struct CreateExpenseRequest<'a> {
    cost: &'a str,
    description: &'a str,
    group_id: i64,
    currency_code: &'a str,
    split_equally: bool,
}

impl<'a> From<&'a ExpenseRecord> for CreateExpenseRequest<'a> {
    fn from(record: &'a ExpenseRecord) -> Self {
        Self {
            cost: record.cost(),
            description: record.description(),
            group_id: record.group_id(),
            currency_code: record.currency_code(),
            split_equally: record.split_mode() == SplitMode::Equal,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateExpenseResponse {
    #[serde(default)]
    expenses: Vec<WireExpense>,
    #[serde(default)]
    errors: Value,
}

#[derive(Debug, Deserialize)]
struct WireExpense {
    id: u64,
    cost: Option<String>,
    description: Option<String>,
}

/// `ExpenseService` backed by the Splitwise v3 REST API.
#[derive(Debug, Clone)]
pub struct SplitwiseClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SplitwiseClient {
    pub fn new<C: ConfigProvider>(config: &C, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds()))
            .build()?;
        Ok(Self::with_client(client, config.api_base_url(), api_key))
    }

    pub fn with_client(client: Client, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl ExpenseService for SplitwiseClient {
    async fn create_expense(&self, expense: &ExpenseRecord) -> Result<ExpenseOutcome> {
        let url = self.endpoint("create_expense");
        tracing::debug!("Making API request to: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&CreateExpenseRequest::from(expense))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RelayError::ExpenseServiceUnauthorized {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<CreateExpenseResponse>(&body);

        // 5xx bodies may carry `errors` too; those are service faults, not rejections
        if status.is_success() || status.is_client_error() {
            if let Ok(parsed) = &parsed {
                let errors = flatten_errors(&parsed.errors);
                if !errors.is_empty() {
                    return Ok(ExpenseOutcome::Rejected(errors));
                }
            }
        }

        if !status.is_success() {
            return Err(RelayError::ExpenseServiceStatus {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        let parsed = parsed.map_err(|e| RelayError::MalformedResponse {
            message: format!("{} in body {}", e, truncate(&body)),
        })?;

        let created = parsed
            .expenses
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::MalformedResponse {
                message: "response contained no expense".to_string(),
            })?;

        Ok(ExpenseOutcome::Created(CreatedExpense {
            id: created.id,
            cost: created.cost.unwrap_or_else(|| expense.cost().to_string()),
            description: created
                .description
                .unwrap_or_else(|| expense.description().to_string()),
        }))
    }
}

/// Splitwise reports errors as `{"base": [..], "<field>": [..]}`, occasionally
/// as a bare list or string.
fn flatten_errors(errors: &Value) -> Vec<String> {
    match errors {
        Value::Null => Vec::new(),
        Value::String(s) if s.trim().is_empty() => Vec::new(),
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(flatten_errors).collect(),
        Value::Object(map) => map
            .iter()
            .flat_map(|(field, value)| {
                flatten_errors(value).into_iter().map(move |msg| {
                    if field == "base" {
                        msg
                    } else {
                        format!("{}: {}", field, msg)
                    }
                })
            })
            .collect(),
        other => vec![other.to_string()],
    }
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_LOGGED_BODY {
        return body.to_string();
    }
    let mut end = MAX_LOGGED_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn record() -> ExpenseRecord {
        ExpenseRecord::new(Decimal::from(450), "Groceries", 42).unwrap()
    }

    fn client(server: &MockServer) -> SplitwiseClient {
        SplitwiseClient::with_client(Client::new(), &server.url("/api/v3.0/"), "test-key")
    }

    #[tokio::test]
    async fn test_create_expense_success() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v3.0/create_expense")
                .header("Authorization", "Bearer test-key")
                .json_body(json!({
                    "cost": "450.00",
                    "description": "Groceries",
                    "group_id": 42,
                    "currency_code": "INR",
                    "split_equally": true
                }));
            then.status(200).json_body(json!({
                "expenses": [{"id": 3141, "cost": "450.0", "description": "Groceries", "group_id": 42}],
                "errors": {}
            }));
        });

        let outcome = client(&server).create_expense(&record()).await.unwrap();

        api_mock.assert();
        assert_eq!(
            outcome,
            ExpenseOutcome::Created(CreatedExpense {
                id: 3141,
                cost: "450.0".to_string(),
                description: "Groceries".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_create_expense_validation_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v3.0/create_expense");
            then.status(200).json_body(json!({
                "expenses": [],
                "errors": {"base": ["You are not a member of this group"], "cost": ["must be positive"]}
            }));
        });

        let outcome = client(&server).create_expense(&record()).await.unwrap();
        match outcome {
            ExpenseOutcome::Rejected(errors) => {
                assert!(errors.contains(&"You are not a member of this group".to_string()));
                assert!(errors.contains(&"cost: must be positive".to_string()));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_expense_bad_request_with_errors_is_rejection() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v3.0/create_expense");
            then.status(400).json_body(json!({"errors": {"base": ["Invalid group_id"]}}));
        });

        let outcome = client(&server).create_expense(&record()).await.unwrap();
        assert_eq!(outcome, ExpenseOutcome::Rejected(vec!["Invalid group_id".to_string()]));
    }

    #[tokio::test]
    async fn test_create_expense_unauthorized() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v3.0/create_expense");
            then.status(401).json_body(json!({"error": "Invalid API Request: you are not logged in"}));
        });

        let err = client(&server).create_expense(&record()).await.unwrap_err();
        assert!(matches!(err, RelayError::ExpenseServiceUnauthorized { status: 401 }));
    }

    #[tokio::test]
    async fn test_create_expense_server_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v3.0/create_expense");
            then.status(503).body("maintenance");
        });

        let err = client(&server).create_expense(&record()).await.unwrap_err();
        assert!(matches!(err, RelayError::ExpenseServiceStatus { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_server_error_with_errors_body_is_not_rejection() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v3.0/create_expense");
            then.status(503)
                .json_body(json!({"errors": {"base": ["Service temporarily unavailable"]}}));
        });

        let err = client(&server).create_expense(&record()).await.unwrap_err();
        match err {
            RelayError::ExpenseServiceStatus { status, body } => {
                assert_eq!(status, 503);
                assert!(body.contains("Service temporarily unavailable"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_expense_malformed_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v3.0/create_expense");
            then.status(200).body("<html>oops</html>");
        });

        let err = client(&server).create_expense(&record()).await.unwrap_err();
        assert!(matches!(err, RelayError::MalformedResponse { .. }));

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v3.0/create_expense");
            then.status(200).json_body(json!({"expenses": [], "errors": {}}));
        });

        let err = client(&server).create_expense(&record()).await.unwrap_err();
        assert!(matches!(err, RelayError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        // Nothing listens on port 9 (discard) on test hosts.
        let client = SplitwiseClient::with_client(Client::new(), "http://127.0.0.1:9", "k");
        let err = client.create_expense(&record()).await.unwrap_err();
        assert!(matches!(err, RelayError::ExpenseServiceTransport(_)));
    }

    #[test]
    fn test_flatten_errors_shapes() {
        assert!(flatten_errors(&Value::Null).is_empty());
        assert!(flatten_errors(&json!({})).is_empty());
        assert!(flatten_errors(&json!([])).is_empty());
        assert_eq!(flatten_errors(&json!("boom")), vec!["boom"]);
        assert_eq!(flatten_errors(&json!(["a", "b"])), vec!["a", "b"]);
        assert_eq!(
            flatten_errors(&json!({"group_id": "is invalid"})),
            vec!["group_id: is invalid"]
        );
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let long = "₹".repeat(400);
        let out = truncate(&long);
        assert!(out.ends_with("..."));
        assert!(out.len() <= MAX_LOGGED_BODY + 3);
    }
}
