use crate::domain::model::{ExpenseOutcome, ExpenseRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Downstream expense-splitting service.
///
/// `Ok(ExpenseOutcome::Rejected(_))` means the service answered and refused
/// the expense; `Err` means it could not be reached or did not answer sensibly.
#[async_trait]
pub trait ExpenseService: Send + Sync {
    async fn create_expense(&self, expense: &ExpenseRecord) -> Result<ExpenseOutcome>;
}

pub trait ConfigProvider: Send + Sync {
    fn default_group_id(&self) -> i64;
    fn api_base_url(&self) -> &str;
    fn request_timeout_seconds(&self) -> u64;
}
