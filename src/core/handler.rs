use crate::core::extractor::extract_amount;
use crate::domain::model::{ExpenseOutcome, ExpenseRecord, IncomingMessage};
use crate::domain::ports::{ConfigProvider, ExpenseService};
use crate::utils::error::{RelayError, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;

/// What the expense service reports back for a created expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseReceipt {
    pub expense_id: u64,
    pub amount: String,
    pub description: String,
}

/// Turns one webhook message into at most one expense.
pub struct ExpenseSubmissionHandler<S: ExpenseService, C: ConfigProvider> {
    service: S,
    config: Arc<C>,
}

impl<S: ExpenseService, C: ConfigProvider> ExpenseSubmissionHandler<S, C> {
    pub fn new(service: S, config: Arc<C>) -> Self {
        Self { service, config }
    }

    /// Builds the expense for `incoming` without contacting the service.
    pub fn prepare(&self, incoming: &IncomingMessage) -> Result<ExpenseRecord> {
        let amount = extract_amount(incoming.message.as_deref())
            .filter(|amount| *amount > Decimal::ZERO)
            .ok_or(RelayError::AmountNotFound)?;

        ExpenseRecord::new(amount, incoming.description(), self.config.default_group_id())
    }

    pub async fn submit(&self, incoming: &IncomingMessage) -> Result<ExpenseReceipt> {
        let expense = match self.prepare(incoming) {
            Ok(expense) => expense,
            Err(e) => {
                tracing::info!("Skipping message: {}", e);
                return Err(e);
            }
        };

        tracing::info!(
            "Adding expense: {} - {} (group {})",
            expense.cost(),
            expense.description(),
            expense.group_id()
        );

        match self.service.create_expense(&expense).await? {
            ExpenseOutcome::Created(created) => {
                tracing::info!("Expense {} created for {}", created.id, created.cost);
                Ok(ExpenseReceipt {
                    expense_id: created.id,
                    amount: created.cost,
                    description: created.description,
                })
            }
            ExpenseOutcome::Rejected(errors) => {
                tracing::warn!("Expense service rejected expense: {:?}", errors);
                Err(RelayError::ExpenseRejected { errors })
            }
        }
    }
}
