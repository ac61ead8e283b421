//! 多链账户拓扑层
//!
//! 钱包 → 分组 → 账户：按熵源与 BIP-44 分组索引，把各链服务商的账户
//! 聚合成多链账户，并负责同步、创建与账户发现

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod provider;
pub mod service;
pub mod utils;

// 重新导出常用类型
pub use error::{AccountError, ProviderOperation, Result};

// 统一模块导出
pub mod prelude {
    pub use crate::{
        config::{Config, DiscoveryConfig, LoggingConfig},
        domain::{
            AccountGroupId, AccountSelector, AccountWallet, AccountWalletId, AccountWalletObject,
            Bip44Account, ChainFamily, KeyringAccount, MultichainAccountGroup,
            MultichainAccountGroupId, MultichainAccountWallet, MultichainAccountWalletId,
        },
        error::{AccountError, Result},
        provider::{AccountProvider, AccountsFilter, CreateAccountsOptions, SharedAccountProvider},
        service::MultichainAccountService,
    };
}
