//! Domain 模块
//!
//! 账户拓扑：钱包 → 分组 → 账户

pub mod account;
pub mod account_wallet;
pub mod chain_family;
pub mod group;
pub mod identifiers;
pub mod selector;
pub mod single_account;
pub mod wallet;

// 重新导出常用类型
pub use account::{
    entropy_options, is_bip44_account, Bip44Account, EntropyOptions, EntropyType, KeyringAccount,
    KeyringAccountType,
};
pub use account_wallet::{AccountGroupRef, AccountWallet, AccountWalletObject, WalletStatus};
pub use chain_family::ChainFamily;
pub use group::MultichainAccountGroup;
pub use identifiers::{
    AccountGroupId, AccountWalletCategory, AccountWalletId, MultichainAccountGroupId,
    MultichainAccountWalletId, DEFAULT_ACCOUNT_GROUP_UNIQUE_ID,
};
pub use selector::{select, select_one, select_one_with, select_with, AccountSelector};
pub use single_account::{SingleAccountGroup, SingleAccountWallet};
pub use wallet::{MultichainAccountWallet, BIP44_MAX_GROUP_INDEX};
