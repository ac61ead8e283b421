//! 内存账户服务商
//!
//! 进程内存储实现的服务商，用于集成测试与本地开发：
//! - `create_accounts` 幂等
//! - `discover_and_create_accounts` 只对标记为“有链上活动”的索引返回账户
//! - 支持按操作注入失败，并记录调用日志
//!
//! 注意：地址为占位值，不经过任何密钥派生

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::account::{Bip44Account, EntropyOptions};
use crate::domain::chain_family::ChainFamily;
use crate::error::ProviderOperation;
use crate::provider::{
    AccountProvider, AccountsFilter, Bip44Capabilities, CreateAccountsOptions,
    ProviderCapabilities,
};

/// 一次写操作调用记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCall {
    pub operation: ProviderOperation,
    pub entropy_source: String,
    pub group_index: u32,
}

#[derive(Default)]
struct ProviderState {
    accounts: Vec<Bip44Account>,
    active: HashSet<(String, u32)>,
    /// None: 任意索引都失败；Some(i): 只在索引 i 失败
    failures: HashMap<ProviderOperation, Option<u32>>,
    journal: Vec<ProviderCall>,
}

pub struct InMemoryAccountProvider {
    family: ChainFamily,
    name: String,
    state: RwLock<ProviderState>,
}

impl InMemoryAccountProvider {
    pub fn new(family: ChainFamily) -> Self {
        Self {
            family,
            name: family.provider_name().to_string(),
            state: RwLock::new(ProviderState::default()),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn family(&self) -> ChainFamily {
        self.family
    }

    /// 标记某些索引存在链上活动（发现时会返回账户）
    pub fn with_activity(self, entropy_source: &str, group_indices: &[u32]) -> Self {
        for index in group_indices {
            self.mark_active(entropy_source, *index);
        }
        self
    }

    pub fn mark_active(&self, entropy_source: &str, group_index: u32) {
        self.state
            .write()
            .active
            .insert((entropy_source.to_string(), group_index));
    }

    /// 注入失败
    pub fn fail_on(&self, operation: ProviderOperation, group_index: Option<u32>) {
        self.state.write().failures.insert(operation, group_index);
    }

    pub fn clear_failures(&self) {
        self.state.write().failures.clear();
    }

    /// 直接写入账户（模拟服务商外部同步进来的状态）
    pub fn insert_account(&self, account: Bip44Account) {
        self.state.write().accounts.push(account);
    }

    /// 删除某个分组下的账户，返回删除数量
    pub fn remove_accounts(&self, entropy_source: &str, group_index: u32) -> usize {
        let mut state = self.state.write();
        let before = state.accounts.len();
        state
            .accounts
            .retain(|account| !account.belongs_to(entropy_source, group_index));
        before - state.accounts.len()
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.read().journal.clone()
    }

    pub fn calls_for(&self, operation: ProviderOperation) -> Vec<ProviderCall> {
        self.state
            .read()
            .journal
            .iter()
            .filter(|call| call.operation == operation)
            .cloned()
            .collect()
    }

    pub fn account_count(&self) -> usize {
        self.state.read().accounts.len()
    }

    fn record(&self, operation: ProviderOperation, options: &CreateAccountsOptions) -> Result<()> {
        let mut state = self.state.write();
        state.journal.push(ProviderCall {
            operation,
            entropy_source: options.entropy_source.clone(),
            group_index: options.group_index,
        });

        match state.failures.get(&operation) {
            Some(None) => anyhow::bail!("{} provider: {} unavailable", self.name, operation),
            Some(Some(index)) if *index == options.group_index => anyhow::bail!(
                "{} provider: {} unavailable at group index {}",
                self.name,
                operation,
                index
            ),
            _ => Ok(()),
        }
    }

    /// 已有账户直接返回，否则创建一个
    fn ensure_account(&self, options: &CreateAccountsOptions) -> Vec<Bip44Account> {
        let mut state = self.state.write();

        let existing: Vec<Bip44Account> = state
            .accounts
            .iter()
            .filter(|account| account.belongs_to(&options.entropy_source, options.group_index))
            .cloned()
            .collect();
        if !existing.is_empty() {
            return existing;
        }

        let account = self.new_account(options);
        tracing::debug!(
            provider = %self.name,
            account_id = %account.id,
            entropy_source = %options.entropy_source,
            group_index = options.group_index,
            "Created account"
        );
        state.accounts.push(account.clone());
        vec![account]
    }

    fn new_account(&self, options: &CreateAccountsOptions) -> Bip44Account {
        let id = Uuid::new_v4();
        let suffix = id.simple().to_string();
        let address = match self.family {
            ChainFamily::Evm => format!("0x{:08x}{}", options.group_index, suffix),
            ChainFamily::Bitcoin => format!("bc1q{}", suffix),
            ChainFamily::Solana => suffix,
            ChainFamily::Tron => format!("T{}", suffix),
        };

        Bip44Account::new(
            id.to_string(),
            address,
            self.family.account_type(),
            self.family.default_methods(),
            self.family.default_scopes(),
            EntropyOptions::mnemonic(
                options.entropy_source.clone(),
                options.group_index,
                self.family.derivation_path(options.group_index),
            ),
        )
    }
}

#[async_trait]
impl AccountProvider for InMemoryAccountProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            scopes: self.family.default_scopes(),
            bip44: Some(Bip44Capabilities {
                derive_index: true,
                discover: true,
            }),
        }
    }

    fn get_account(&self, id: &str) -> Option<Bip44Account> {
        self.state
            .read()
            .accounts
            .iter()
            .find(|account| account.id == id)
            .cloned()
    }

    fn get_accounts(&self, filter: &AccountsFilter) -> Vec<Bip44Account> {
        self.state
            .read()
            .accounts
            .iter()
            .filter(|account| filter.matches(account))
            .cloned()
            .collect()
    }

    async fn create_accounts(&self, options: &CreateAccountsOptions) -> Result<Vec<Bip44Account>> {
        self.record(ProviderOperation::CreateAccounts, options)?;
        Ok(self.ensure_account(options))
    }

    async fn discover_and_create_accounts(
        &self,
        options: &CreateAccountsOptions,
    ) -> Result<Vec<Bip44Account>> {
        self.record(ProviderOperation::DiscoverAndCreateAccounts, options)?;

        let active = self
            .state
            .read()
            .active
            .contains(&(options.entropy_source.clone(), options.group_index));
        if !active {
            return Ok(Vec::new());
        }

        Ok(self.ensure_account(options))
    }
}
