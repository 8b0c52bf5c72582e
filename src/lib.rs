pub mod core;
pub mod error;
pub mod parsing;
pub mod primary;
pub mod submission;
pub mod xbrl;

// Re-exports
pub use crate::core::config::ExtractConfig;
pub use crate::error::{enforce_ceiling, ExtractError};
