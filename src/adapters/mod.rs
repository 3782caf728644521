// Adapters layer: concrete implementations of the domain ports.

pub mod splitwise;

pub use splitwise::SplitwiseClient;
