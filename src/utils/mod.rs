pub mod caip;

// Re-export commonly used functions
pub use caip::{is_scope_equal, is_scope_equal_to_any, CaipScopeMatcher, ScopeMatcher};
