//! 多链账户钱包
//!
//! 一个熵源对应一个钱包，钱包按分组索引持有多链账户分组。
//! 分组表始终以服务商的实际账户为准：`sync` 从服务商重建，
//! 创建与发现在调用服务商之后重新构建对应分组

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

use crate::domain::account::Bip44Account;
use crate::domain::group::MultichainAccountGroup;
use crate::domain::identifiers::{
    to_multichain_account_wallet_id, AccountGroupId, MultichainAccountGroupId,
    MultichainAccountWalletId, DEFAULT_ACCOUNT_GROUP_UNIQUE_ID,
};
use crate::error::{AccountError, ProviderOperation, Result};
use crate::provider::{AccountsFilter, CreateAccountsOptions, SharedAccountProvider};
use crate::utils::caip::{CaipScopeMatcher, ScopeMatcher};

/// BIP-44 最大的 hardened 账户索引
pub const BIP44_MAX_GROUP_INDEX: u32 = 0x7FFF_FFFF;

#[derive(Clone)]
pub struct MultichainAccountWallet {
    id: MultichainAccountWalletId,
    providers: Vec<SharedAccountProvider>,
    groups: BTreeMap<u32, MultichainAccountGroup>,
    matcher: Arc<dyn ScopeMatcher>,
    max_group_index: u32,
}

impl MultichainAccountWallet {
    /// 创建钱包并立即同步
    pub fn new(entropy_source: &str, providers: Vec<SharedAccountProvider>) -> Self {
        Self::with_matcher(entropy_source, providers, Arc::new(CaipScopeMatcher))
    }

    pub fn with_matcher(
        entropy_source: &str,
        providers: Vec<SharedAccountProvider>,
        matcher: Arc<dyn ScopeMatcher>,
    ) -> Self {
        let mut wallet = Self {
            id: to_multichain_account_wallet_id(entropy_source),
            providers,
            groups: BTreeMap::new(),
            matcher,
            max_group_index: BIP44_MAX_GROUP_INDEX,
        };
        wallet.sync();
        wallet
    }

    /// 限制可创建/探测的最大分组索引
    pub fn with_max_group_index(mut self, max_group_index: u32) -> Self {
        self.max_group_index = max_group_index;
        self
    }

    pub fn id(&self) -> &MultichainAccountWalletId {
        &self.id
    }

    pub fn entropy_source(&self) -> &str {
        self.id.entropy_source()
    }

    pub fn providers(&self) -> &[SharedAccountProvider] {
        &self.providers
    }

    pub fn max_group_index(&self) -> u32 {
        self.max_group_index
    }

    /// 以服务商当前状态重建分组表
    ///
    /// 新出现的索引建组，没有账户的索引删除，重复调用结果不变
    pub fn sync(&mut self) {
        let filter = AccountsFilter::entropy_source(self.entropy_source());

        let discovered: BTreeSet<u32> = self
            .providers
            .iter()
            .flat_map(|provider| provider.get_accounts(&filter))
            .map(|account| account.group_index())
            .collect();

        for group_index in discovered {
            if !self.groups.contains_key(&group_index) {
                let group = self.build_group(group_index);
                self.groups.insert(group_index, group);
            }
        }

        let wallet_id = self.id.to_string();
        self.groups.retain(|group_index, group| {
            group.refresh();
            let keep = group.has_accounts();
            if !keep {
                tracing::info!(
                    wallet_id = %wallet_id,
                    group_index = *group_index,
                    "Pruned multichain account group without accounts"
                );
            }
            keep
        });

        if !self.is_contiguous() {
            tracing::warn!(
                wallet_id = %wallet_id,
                group_indices = ?self.groups.keys().collect::<Vec<_>>(),
                "Multichain account groups are not contiguous"
            );
        }
    }

    /// 分组索引是否恰好为 0..N
    pub fn is_contiguous(&self) -> bool {
        self.groups
            .keys()
            .enumerate()
            .all(|(position, group_index)| position as u32 == *group_index)
    }

    pub fn get_next_group_index(&self) -> u32 {
        self.groups.len() as u32
    }

    pub fn get_multichain_account(&self, group_index: u32) -> Option<&MultichainAccountGroup> {
        self.groups.get(&group_index)
    }

    /// 按分组索引升序
    pub fn get_multichain_accounts(&self) -> Vec<&MultichainAccountGroup> {
        self.groups.values().collect()
    }

    pub fn get_multichain_account_by_id(
        &self,
        id: &MultichainAccountGroupId,
    ) -> Option<&MultichainAccountGroup> {
        if id.wallet_id() != &self.id {
            return None;
        }
        self.get_multichain_account(id.group_index())
    }

    /// 通用分组ID查找，`<walletId>/default` 指向索引 0
    pub fn get_account_group_by_id(&self, id: &AccountGroupId) -> Option<&MultichainAccountGroup> {
        let (wallet_part, sub_id) = id.as_str().rsplit_once('/')?;
        if wallet_part != self.id.to_string() {
            return None;
        }

        if sub_id == DEFAULT_ACCOUNT_GROUP_UNIQUE_ID {
            return self.get_multichain_account(0);
        }

        let group_index = sub_id.parse::<u32>().ok()?;
        let group = self.get_multichain_account(group_index)?;
        // 只接受规范形式（拒绝 "007" 这类前导零）
        (group.id().to_string() == id.as_str()).then_some(group)
    }

    /// 钱包内所有账户，分组索引升序
    pub fn get_accounts(&self) -> Vec<Bip44Account> {
        self.groups
            .values()
            .flat_map(|group| group.get_accounts())
            .collect()
    }

    /// 在指定索引创建分组
    ///
    /// 依次调用每个服务商的 `create_accounts`；某个服务商失败时立即返回，
    /// 之前的服务商保留已创建的账户，调用 `sync` 恢复一致
    pub async fn create_multichain_account(
        &mut self,
        group_index: u32,
    ) -> Result<&MultichainAccountGroup> {
        let next_group_index = self.get_next_group_index();
        if group_index > next_group_index {
            return Err(AccountError::GroupIndexTooHigh {
                requested: group_index,
                max_allowed: next_group_index,
            });
        }
        if group_index > self.max_group_index {
            return Err(AccountError::GroupIndexTooHigh {
                requested: group_index,
                max_allowed: self.max_group_index,
            });
        }

        let options = CreateAccountsOptions::new(self.entropy_source(), group_index);
        for provider in &self.providers {
            Self::call_provider(provider, ProviderOperation::CreateAccounts, &options).await?;
        }

        let group = self.build_group(group_index);
        if !group.has_accounts() {
            return Err(AccountError::EmptyGroup(group.id().to_string()));
        }

        tracing::info!(
            wallet_id = %self.id,
            group_index,
            accounts = group.account_ids().len(),
            "Created multichain account group"
        );
        self.groups.insert(group_index, group);
        self.groups
            .get(&group_index)
            .ok_or_else(|| AccountError::EmptyGroup(format!("{}/{}", self.id, group_index)))
    }

    pub async fn create_next_multichain_account(&mut self) -> Result<&MultichainAccountGroup> {
        let group_index = self.get_next_group_index();
        self.create_multichain_account(group_index).await
    }

    /// 从索引 0 开始逐个探测，直到没有任何服务商发现账户
    ///
    /// 某个索引上只要有一个服务商发现了账户，其余服务商在该索引补建账户
    pub async fn discover_and_create_multichain_accounts(
        &mut self,
    ) -> Result<Vec<&MultichainAccountGroup>> {
        let mut group_index: u32 = 0;
        let mut discovered_indices = Vec::new();

        loop {
            if group_index > self.max_group_index {
                tracing::info!(
                    wallet_id = %self.id,
                    max_group_index = self.max_group_index,
                    "Discovery reached the maximum group index"
                );
                break;
            }

            let options = CreateAccountsOptions::new(self.entropy_source(), group_index);
            let mut discovered_any = false;
            let mut missing = Vec::new();

            for provider in &self.providers {
                let found = Self::call_provider(
                    provider,
                    ProviderOperation::DiscoverAndCreateAccounts,
                    &options,
                )
                .await?;

                if found.is_empty() {
                    missing.push(Arc::clone(provider));
                } else {
                    discovered_any = true;
                }
            }

            if !discovered_any {
                tracing::info!(
                    wallet_id = %self.id,
                    group_index,
                    "No provider discovered accounts, stopping discovery"
                );
                break;
            }

            for provider in &missing {
                Self::call_provider(provider, ProviderOperation::CreateAccounts, &options).await?;
            }

            self.refresh_group(group_index);
            discovered_indices.push(group_index);

            group_index = match group_index.checked_add(1) {
                Some(next) => next,
                None => break,
            };
        }

        Ok(discovered_indices
            .into_iter()
            .filter_map(|group_index| self.groups.get(&group_index))
            .collect())
    }

    /// 为指定分组中没有账户的服务商补建账户，完成后重新同步
    pub async fn align_group(&mut self, group_index: u32) -> Result<()> {
        let missing = match self.groups.get(&group_index) {
            Some(group) => group.missing_providers(),
            None => return Ok(()),
        };

        let options = CreateAccountsOptions::new(self.entropy_source(), group_index);
        for provider in &missing {
            Self::call_provider(provider, ProviderOperation::CreateAccounts, &options).await?;
        }

        self.sync();
        Ok(())
    }

    /// 对齐所有分组
    pub async fn align_groups(&mut self) -> Result<()> {
        let pending: Vec<(u32, Vec<SharedAccountProvider>)> = self
            .groups
            .iter()
            .map(|(group_index, group)| (*group_index, group.missing_providers()))
            .filter(|(_, missing)| !missing.is_empty())
            .collect();

        for (group_index, missing) in pending {
            let options = CreateAccountsOptions::new(self.entropy_source(), group_index);
            for provider in &missing {
                Self::call_provider(provider, ProviderOperation::CreateAccounts, &options).await?;
            }
        }

        self.sync();
        Ok(())
    }

    fn build_group(&self, group_index: u32) -> MultichainAccountGroup {
        MultichainAccountGroup::new(
            &self.id,
            group_index,
            self.providers.clone(),
            Arc::clone(&self.matcher),
        )
    }

    /// 已有分组刷新，没有则新建；没有账户的分组不登记
    fn refresh_group(&mut self, group_index: u32) {
        let has_accounts = match self.groups.get_mut(&group_index) {
            Some(group) => {
                group.refresh();
                group.has_accounts()
            }
            None => {
                let group = self.build_group(group_index);
                let has_accounts = group.has_accounts();
                if has_accounts {
                    self.groups.insert(group_index, group);
                }
                has_accounts
            }
        };

        if !has_accounts {
            self.groups.remove(&group_index);
            tracing::warn!(
                wallet_id = %self.id,
                group_index,
                "Providers reported accounts but none are visible in the group"
            );
        }
    }

    async fn call_provider(
        provider: &SharedAccountProvider,
        operation: ProviderOperation,
        options: &CreateAccountsOptions,
    ) -> Result<Vec<Bip44Account>> {
        tracing::debug!(
            provider = provider.name(),
            operation = %operation,
            entropy_source = %options.entropy_source,
            group_index = options.group_index,
            "Calling account provider"
        );

        let result = match operation {
            ProviderOperation::CreateAccounts => provider.create_accounts(options).await,
            ProviderOperation::DiscoverAndCreateAccounts => {
                provider.discover_and_create_accounts(options).await
            }
        };

        result.map_err(|e| {
            tracing::warn!(
                provider = provider.name(),
                operation = %operation,
                group_index = options.group_index,
                error = %e,
                "Account provider call failed"
            );
            AccountError::provider(provider.name(), operation, options.group_index, e)
        })
    }
}

impl fmt::Debug for MultichainAccountWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultichainAccountWallet")
            .field("id", &self.id.to_string())
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("groups", &self.groups.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain_family::ChainFamily;
    use crate::domain::identifiers::{to_account_group_id, AccountWalletId};
    use crate::provider::{AccountProvider, InMemoryAccountProvider};

    const ENTROPY: &str = "entropy-1";

    fn providers() -> (Arc<InMemoryAccountProvider>, Arc<InMemoryAccountProvider>) {
        (
            Arc::new(InMemoryAccountProvider::new(ChainFamily::Evm)),
            Arc::new(InMemoryAccountProvider::new(ChainFamily::Solana)),
        )
    }

    fn wallet(
        evm: &Arc<InMemoryAccountProvider>,
        sol: &Arc<InMemoryAccountProvider>,
    ) -> MultichainAccountWallet {
        MultichainAccountWallet::new(ENTROPY, vec![evm.clone(), sol.clone()])
    }

    #[tokio::test]
    async fn test_new_wallet_is_empty() {
        let (evm, sol) = providers();
        let wallet = wallet(&evm, &sol);

        assert_eq!(wallet.id().to_string(), "entropy:entropy-1");
        assert_eq!(wallet.get_next_group_index(), 0);
        assert!(wallet.get_multichain_accounts().is_empty());
        assert!(wallet.is_contiguous());
    }

    #[tokio::test]
    async fn test_create_is_contiguous() {
        let (evm, sol) = providers();
        let mut wallet = wallet(&evm, &sol);

        let group = wallet.create_multichain_account(0).await.unwrap();
        assert_eq!(group.group_index(), 0);
        assert!(group.is_aligned());

        wallet.create_next_multichain_account().await.unwrap();
        assert_eq!(wallet.get_next_group_index(), 2);

        let err = wallet.create_multichain_account(5).await.unwrap_err();
        assert!(matches!(
            err,
            AccountError::GroupIndexTooHigh {
                requested: 5,
                max_allowed: 2
            }
        ));
        // 校验失败时不调用服务商
        assert_eq!(evm.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_create_twice_is_idempotent() {
        let (evm, sol) = providers();
        let mut wallet = wallet(&evm, &sol);

        let first: Vec<String> = wallet
            .create_multichain_account(0)
            .await
            .unwrap()
            .account_ids()
            .into_iter()
            .map(String::from)
            .collect();
        let second: Vec<String> = wallet
            .create_multichain_account(0)
            .await
            .unwrap()
            .account_ids()
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(first, second);
        assert_eq!(wallet.get_next_group_index(), 1);
    }

    #[tokio::test]
    async fn test_max_group_index_is_enforced() {
        let (evm, sol) = providers();
        let mut wallet = wallet(&evm, &sol).with_max_group_index(0);

        wallet.create_multichain_account(0).await.unwrap();
        let err = wallet.create_next_multichain_account().await.unwrap_err();
        assert!(matches!(
            err,
            AccountError::GroupIndexTooHigh {
                requested: 1,
                max_allowed: 0
            }
        ));
    }

    #[tokio::test]
    async fn test_discovery_respects_max_group_index() {
        let evm = Arc::new(InMemoryAccountProvider::new(ChainFamily::Evm).with_activity(
            ENTROPY,
            &[0, 1, 2, 3],
        ));
        let mut wallet =
            MultichainAccountWallet::new(ENTROPY, vec![evm.clone()]).with_max_group_index(1);

        let groups = wallet.discover_and_create_multichain_accounts().await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(
            evm.calls_for(ProviderOperation::DiscoverAndCreateAccounts).len(),
            2
        );
    }

    #[tokio::test]
    async fn test_wallet_without_providers_creates_nothing() {
        let mut wallet = MultichainAccountWallet::new(ENTROPY, Vec::new());

        let err = wallet.create_multichain_account(0).await.unwrap_err();
        assert!(matches!(err, AccountError::EmptyGroup(_)));
        assert_eq!(wallet.get_next_group_index(), 0);

        let groups = wallet.discover_and_create_multichain_accounts().await.unwrap();
        assert!(groups.is_empty());
    }

    #[tokio::test]
    async fn test_sync_picks_up_external_accounts_and_prunes() {
        let (evm, sol) = providers();
        let mut wallet = wallet(&evm, &sol);

        evm.create_accounts(&CreateAccountsOptions::new(ENTROPY, 0))
            .await
            .unwrap();
        evm.create_accounts(&CreateAccountsOptions::new("another", 0))
            .await
            .unwrap();
        assert_eq!(wallet.get_next_group_index(), 0);

        wallet.sync();
        assert_eq!(wallet.get_next_group_index(), 1);
        assert_eq!(wallet.get_accounts().len(), 1);

        evm.remove_accounts(ENTROPY, 0);
        wallet.sync();
        assert_eq!(wallet.get_next_group_index(), 0);
    }

    #[tokio::test]
    async fn test_align_group_backfills_missing_provider() {
        let (evm, sol) = providers();
        evm.create_accounts(&CreateAccountsOptions::new(ENTROPY, 0))
            .await
            .unwrap();
        let mut wallet = wallet(&evm, &sol);

        assert!(!wallet.get_multichain_account(0).unwrap().is_aligned());

        wallet.align_groups().await.unwrap();
        let group = wallet.get_multichain_account(0).unwrap();
        assert!(group.is_aligned());
        assert_eq!(sol.calls_for(ProviderOperation::CreateAccounts).len(), 1);
        // 已对齐的服务商不会被再次调用
        assert_eq!(evm.calls().len(), 1);

        wallet.align_group(7).await.unwrap();
        assert_eq!(sol.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_by_generic_group_id() {
        let (evm, sol) = providers();
        let mut wallet = wallet(&evm, &sol);
        wallet.create_multichain_account(0).await.unwrap();
        wallet.create_multichain_account(1).await.unwrap();

        let wallet_id = AccountWalletId::from(wallet.id());
        let default_id = to_account_group_id(&wallet_id, DEFAULT_ACCOUNT_GROUP_UNIQUE_ID);
        assert_eq!(
            wallet.get_account_group_by_id(&default_id).unwrap().group_index(),
            0
        );

        let by_index = to_account_group_id(&wallet_id, "1");
        assert_eq!(
            wallet.get_account_group_by_id(&by_index).unwrap().group_index(),
            1
        );

        assert!(wallet
            .get_account_group_by_id(&to_account_group_id(&wallet_id, "01"))
            .is_none());
        assert!(wallet
            .get_account_group_by_id(&to_account_group_id(&wallet_id, "9"))
            .is_none());

        let other: AccountWalletId = "entropy:other".parse().unwrap();
        assert!(wallet
            .get_account_group_by_id(&to_account_group_id(&other, "0"))
            .is_none());
    }
}
