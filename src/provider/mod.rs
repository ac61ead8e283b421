//! 账户服务商接口
//!
//! 每个链家族一个服务商，负责在给定熵源与分组索引下列出、创建、发现账户。
//! 服务商由调用方注入并共享，核心不拥有其生命周期与状态

pub mod in_memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::account::Bip44Account;

pub use in_memory::{InMemoryAccountProvider, ProviderCall};

/// BIP-44 能力描述
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bip44Capabilities {
    pub derive_index: bool,
    pub discover: bool,
}

/// 服务商能力（本层只透传，不解释）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCapabilities {
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bip44: Option<Bip44Capabilities>,
}

/// 创建/发现账户参数
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountsOptions {
    pub entropy_source: String,
    pub group_index: u32,
}

impl CreateAccountsOptions {
    pub fn new(entropy_source: impl Into<String>, group_index: u32) -> Self {
        Self {
            entropy_source: entropy_source.into(),
            group_index,
        }
    }
}

/// 账户列表过滤条件，由服务商负责应用
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountsFilter {
    pub entropy_source: Option<String>,
    pub group_index: Option<u32>,
}

impl AccountsFilter {
    /// 不过滤
    pub fn all() -> Self {
        Self::default()
    }

    pub fn entropy_source(entropy_source: impl Into<String>) -> Self {
        Self {
            entropy_source: Some(entropy_source.into()),
            group_index: None,
        }
    }

    pub fn group(entropy_source: impl Into<String>, group_index: u32) -> Self {
        Self {
            entropy_source: Some(entropy_source.into()),
            group_index: Some(group_index),
        }
    }

    pub fn matches(&self, account: &Bip44Account) -> bool {
        if let Some(entropy_source) = &self.entropy_source {
            if account.entropy_source() != entropy_source {
                return false;
            }
        }
        if let Some(group_index) = self.group_index {
            if account.group_index() != group_index {
                return false;
            }
        }
        true
    }
}

/// 账户服务商 trait
///
/// 读操作查询服务商自身的账户存储；写操作可能挂起等待网络或数据库 I/O，
/// 超时与重试策略由服务商实现自行负责
#[async_trait]
pub trait AccountProvider: Send + Sync {
    /// 服务商名称（用于日志与错误归因）
    fn name(&self) -> &str;

    fn capabilities(&self) -> ProviderCapabilities;

    fn get_account(&self, id: &str) -> Option<Bip44Account>;

    /// 返回服务商当前持有的、满足过滤条件的账户，保持服务商自身顺序
    fn get_accounts(&self, filter: &AccountsFilter) -> Vec<Bip44Account>;

    /// 创建账户
    ///
    /// 必须幂等：同一 `{entropy_source, group_index}` 已有账户时返回已有账户
    async fn create_accounts(
        &self,
        options: &CreateAccountsOptions,
    ) -> anyhow::Result<Vec<Bip44Account>>;

    /// 探测链上历史并持久化发现的账户，未发现任何账户时返回空列表
    async fn discover_and_create_accounts(
        &self,
        options: &CreateAccountsOptions,
    ) -> anyhow::Result<Vec<Bip44Account>>;
}

pub type SharedAccountProvider = Arc<dyn AccountProvider>;
