pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

pub use crate::adapters::SplitwiseClient;
pub use crate::config::{cli::CliArgs, AppConfig};
pub use crate::core::{extractor::extract_amount, handler::ExpenseSubmissionHandler};
pub use crate::utils::error::{RelayError, Result};
