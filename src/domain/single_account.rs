//! 单账户钱包（keyring / snap）
//!
//! 每个分组恰好一个账户，分组ID为 `<walletId>/<accountId>`

use std::collections::BTreeMap;

use crate::domain::account::KeyringAccount;
use crate::domain::account_wallet::WalletStatus;
use crate::domain::identifiers::{
    to_account_group_id, to_account_wallet_id, AccountGroupId, AccountWalletCategory,
    AccountWalletId,
};
use crate::domain::selector::{select_one, AccountSelector};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleAccountGroup {
    id: AccountGroupId,
    account: KeyringAccount,
}

impl SingleAccountGroup {
    pub fn new(wallet_id: &AccountWalletId, account: KeyringAccount) -> Self {
        Self {
            id: to_account_group_id(wallet_id, &account.id),
            account,
        }
    }

    pub fn id(&self) -> &AccountGroupId {
        &self.id
    }

    pub fn account(&self) -> &KeyringAccount {
        &self.account
    }

    pub fn get_accounts(&self) -> Vec<&KeyringAccount> {
        vec![&self.account]
    }

    pub fn get_account(&self, id: &str) -> Option<&KeyringAccount> {
        (self.account.id == id).then_some(&self.account)
    }

    pub fn get(&self, selector: &AccountSelector) -> Result<Option<&KeyringAccount>> {
        select_one(std::slice::from_ref(&self.account), selector)
    }
}

#[derive(Debug, Clone)]
pub struct SingleAccountWallet {
    id: AccountWalletId,
    category: AccountWalletCategory,
    /// accountId -> 分组
    groups: BTreeMap<String, SingleAccountGroup>,
}

impl SingleAccountWallet {
    /// `keyring:<keyringType>`
    pub fn keyring(keyring_type: &str) -> Self {
        Self::new(AccountWalletCategory::Keyring, keyring_type)
    }

    /// `snap:<snapId>`
    pub fn snap(snap_id: &str) -> Self {
        Self::new(AccountWalletCategory::Snap, snap_id)
    }

    fn new(category: AccountWalletCategory, sub_id: &str) -> Self {
        Self {
            id: to_account_wallet_id(category, sub_id),
            category,
            groups: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &AccountWalletId {
        &self.id
    }

    pub fn category(&self) -> AccountWalletCategory {
        self.category
    }

    /// 没有任何账户时为 Uninitialized
    pub fn status(&self) -> WalletStatus {
        if self.groups.is_empty() {
            WalletStatus::Uninitialized
        } else {
            WalletStatus::Ready
        }
    }

    /// 同一账户重复添加时替换原有分组
    pub fn add_account(&mut self, account: KeyringAccount) -> &SingleAccountGroup {
        let account_id = account.id.clone();
        let group = SingleAccountGroup::new(&self.id, account);
        self.groups.insert(account_id.clone(), group);
        &self.groups[&account_id]
    }

    pub fn remove_account(&mut self, account_id: &str) -> Option<SingleAccountGroup> {
        self.groups.remove(account_id)
    }

    pub fn get_account_group(&self, id: &AccountGroupId) -> Option<&SingleAccountGroup> {
        self.groups.values().find(|group| group.id() == id)
    }

    pub fn get_account_groups(&self) -> Vec<&SingleAccountGroup> {
        self.groups.values().collect()
    }
}
