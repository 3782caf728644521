use crate::utils::error::{RelayError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

pub const DEFAULT_DESCRIPTION: &str = "Auto expense from bank SMS";
pub const CURRENCY_CODE: &str = "INR";

/// Webhook payload forwarded by the SMS gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

impl IncomingMessage {
    /// Bodies that are missing, not JSON, or not an object of strings all
    /// collapse to an empty message.
    pub fn from_body(body: &[u8]) -> Self {
        if body.is_empty() {
            return Self::default();
        }
        match serde_json::from_slice::<Self>(body) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!("Ignoring unparseable webhook body: {}", e);
                Self::default()
            }
        }
    }

    pub fn description(&self) -> String {
        match self.comments.as_deref().map(str::trim) {
            Some(comments) if !comments.is_empty() => comments.to_string(),
            _ => DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    Equal,
}

/// Expense to be created in the configured group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRecord {
    cost: String,
    description: String,
    group_id: i64,
    currency_code: &'static str,
    split_mode: SplitMode,
}

impl ExpenseRecord {
    pub fn new(amount: Decimal, description: impl Into<String>, group_id: i64) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(RelayError::AmountNotFound);
        }

        let mut cost = amount;
        cost.rescale(2);
        // rescale keeps a smaller scale when 28 digits are already taken by the integer part
        if cost.scale() != 2 {
            return Err(RelayError::ValidationError {
                message: format!("Amount {} is too large", amount),
            });
        }

        Ok(Self {
            cost: cost.to_string(),
            description: description.into(),
            group_id,
            currency_code: CURRENCY_CODE,
            split_mode: SplitMode::Equal,
        })
    }

    pub fn cost(&self) -> &str {
        &self.cost
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn group_id(&self) -> i64 {
        self.group_id
    }

    pub fn currency_code(&self) -> &str {
        self.currency_code
    }

    pub fn split_mode(&self) -> SplitMode {
        self.split_mode
    }
}

/// Expense as stored by the expense service, which may normalise the values
/// it was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedExpense {
    pub id: u64,
    pub cost: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseOutcome {
    Created(CreatedExpense),
    Rejected(Vec<String>),
}
