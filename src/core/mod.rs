pub mod extractor;
pub mod handler;

pub use crate::domain::model::{CreatedExpense, ExpenseOutcome, ExpenseRecord, IncomingMessage};
pub use crate::domain::ports::{ConfigProvider, ExpenseService};
pub use crate::utils::error::Result;
