//! 多链账户分组
//!
//! 同一 (熵源, 分组索引) 下所有服务商账户的聚合。分组只记录账户ID，
//! 读取账户时通过反向索引找到所属服务商再解引用

use std::{collections::HashMap, fmt, sync::Arc};

use crate::domain::account::Bip44Account;
use crate::domain::identifiers::{
    to_multichain_account_group_id, MultichainAccountGroupId, MultichainAccountWalletId,
};
use crate::domain::selector::{select_one_with, select_with, AccountSelector};
use crate::error::Result;
use crate::provider::{AccountsFilter, SharedAccountProvider};
use crate::utils::caip::ScopeMatcher;

#[derive(Clone)]
pub struct MultichainAccountGroup {
    id: MultichainAccountGroupId,
    providers: Vec<SharedAccountProvider>,
    /// 与 providers 同序：每个服务商认领的账户ID
    accounts: Vec<Vec<String>>,
    /// accountId -> 服务商下标
    reverse: HashMap<String, usize>,
    matcher: Arc<dyn ScopeMatcher>,
}

impl MultichainAccountGroup {
    /// 按配置顺序向每个服务商查询该分组的账户
    pub fn new(
        wallet_id: &MultichainAccountWalletId,
        group_index: u32,
        providers: Vec<SharedAccountProvider>,
        matcher: Arc<dyn ScopeMatcher>,
    ) -> Self {
        let mut group = Self {
            id: to_multichain_account_group_id(wallet_id, group_index),
            providers,
            accounts: Vec::new(),
            reverse: HashMap::new(),
            matcher,
        };
        group.refresh();
        group
    }

    /// 重新从服务商获取分组成员
    pub fn refresh(&mut self) {
        let filter = AccountsFilter::group(self.entropy_source(), self.group_index());

        self.accounts.clear();
        self.reverse.clear();

        for (position, provider) in self.providers.iter().enumerate() {
            let ids: Vec<String> = provider
                .get_accounts(&filter)
                .into_iter()
                .map(|account| account.id.clone())
                .collect();

            for id in &ids {
                self.reverse.insert(id.clone(), position);
            }
            self.accounts.push(ids);
        }
    }

    pub fn id(&self) -> &MultichainAccountGroupId {
        &self.id
    }

    pub fn wallet_id(&self) -> &MultichainAccountWalletId {
        self.id.wallet_id()
    }

    pub fn entropy_source(&self) -> &str {
        self.id.wallet_id().entropy_source()
    }

    pub fn group_index(&self) -> u32 {
        self.id.group_index()
    }

    pub fn has_accounts(&self) -> bool {
        !self.reverse.is_empty()
    }

    /// 账户ID，按服务商配置顺序
    pub fn account_ids(&self) -> Vec<&str> {
        self.accounts.iter().flatten().map(String::as_str).collect()
    }

    /// (服务商名称, 账户ID) 列表，按服务商配置顺序
    pub fn provider_accounts(&self) -> Vec<(&str, &str)> {
        self.providers
            .iter()
            .zip(&self.accounts)
            .flat_map(|(provider, ids)| ids.iter().map(move |id| (provider.name(), id.as_str())))
            .collect()
    }

    /// 所有服务商的账户，服务商配置顺序，每个服务商内部保持其返回顺序
    pub fn get_accounts(&self) -> Vec<Bip44Account> {
        self.providers
            .iter()
            .zip(&self.accounts)
            .flat_map(|(provider, ids)| ids.iter().filter_map(move |id| provider.get_account(id)))
            .collect()
    }

    /// 不属于本分组的ID返回 None
    pub fn get_account(&self, id: &str) -> Option<Bip44Account> {
        let position = *self.reverse.get(id)?;
        self.providers.get(position)?.get_account(id)
    }

    pub fn provider_of(&self, account_id: &str) -> Option<&str> {
        let position = *self.reverse.get(account_id)?;
        self.providers.get(position).map(|provider| provider.name())
    }

    /// 某个服务商在本分组下的账户
    pub fn accounts_of(&self, provider_name: &str) -> Vec<Bip44Account> {
        self.providers
            .iter()
            .zip(&self.accounts)
            .filter(|(provider, _)| provider.name() == provider_name)
            .flat_map(|(provider, ids)| ids.iter().filter_map(move |id| provider.get_account(id)))
            .collect()
    }

    /// 在本分组下没有任何账户的服务商
    pub fn missing_providers(&self) -> Vec<SharedAccountProvider> {
        self.providers
            .iter()
            .zip(&self.accounts)
            .filter(|(_, ids)| ids.is_empty())
            .map(|(provider, _)| Arc::clone(provider))
            .collect()
    }

    /// 每个服务商都至少有一个账户
    pub fn is_aligned(&self) -> bool {
        self.accounts.iter().all(|ids| !ids.is_empty())
    }

    /// 选中恰好一个账户，多于一个返回 `TooManyCandidates`
    pub fn get(&self, selector: &AccountSelector) -> Result<Option<Bip44Account>> {
        let accounts = self.get_accounts();
        select_one_with(&accounts, selector, self.matcher.as_ref()).map(|found| found.cloned())
    }

    pub fn select(&self, selector: &AccountSelector) -> Vec<Bip44Account> {
        let accounts = self.get_accounts();
        select_with(&accounts, selector, self.matcher.as_ref())
            .into_iter()
            .cloned()
            .collect()
    }
}

impl fmt::Debug for MultichainAccountGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultichainAccountGroup")
            .field("id", &self.id.to_string())
            .field("accounts", &self.provider_accounts())
            .finish()
    }
}
