pub mod multichain_account_service;

pub use multichain_account_service::{AccountContext, MultichainAccountService};
