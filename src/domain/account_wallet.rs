//! 通用钱包模型
//!
//! 三类钱包（entropy / keyring / snap）共享 `id`、分组查询接口，
//! 状态语义不同：多链钱包按分组索引演进，单账户钱包暴露 uninitialized/ready

use serde::{Deserialize, Serialize};

use crate::domain::account::KeyringAccount;
use crate::domain::group::MultichainAccountGroup;
use crate::domain::identifiers::{AccountGroupId, AccountWalletCategory, AccountWalletId};
use crate::domain::single_account::{SingleAccountGroup, SingleAccountWallet};
use crate::domain::wallet::MultichainAccountWallet;

/// 单账户钱包状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    Uninitialized,
    Ready,
}

/// 分组的借用视图
#[derive(Debug, Clone, Copy)]
pub enum AccountGroupRef<'a> {
    Multichain(&'a MultichainAccountGroup),
    Single(&'a SingleAccountGroup),
}

impl AccountGroupRef<'_> {
    pub fn id(&self) -> AccountGroupId {
        match self {
            AccountGroupRef::Multichain(group) => AccountGroupId::from(group.id()),
            AccountGroupRef::Single(group) => group.id().clone(),
        }
    }

    /// 分组内账户（多链分组按服务商顺序）
    pub fn accounts(&self) -> Vec<KeyringAccount> {
        match self {
            AccountGroupRef::Multichain(group) => group
                .get_accounts()
                .into_iter()
                .map(KeyringAccount::from)
                .collect(),
            AccountGroupRef::Single(group) => vec![group.account().clone()],
        }
    }
}

/// 所有钱包类别共有的查询接口
pub trait AccountWalletObject {
    fn id(&self) -> AccountWalletId;

    fn category(&self) -> AccountWalletCategory;

    fn get_account_group(&self, id: &AccountGroupId) -> Option<AccountGroupRef<'_>>;

    fn get_account_groups(&self) -> Vec<AccountGroupRef<'_>>;
}

impl AccountWalletObject for MultichainAccountWallet {
    fn id(&self) -> AccountWalletId {
        AccountWalletId::from(MultichainAccountWallet::id(self))
    }

    fn category(&self) -> AccountWalletCategory {
        AccountWalletCategory::Entropy
    }

    fn get_account_group(&self, id: &AccountGroupId) -> Option<AccountGroupRef<'_>> {
        self.get_account_group_by_id(id)
            .map(AccountGroupRef::Multichain)
    }

    fn get_account_groups(&self) -> Vec<AccountGroupRef<'_>> {
        self.get_multichain_accounts()
            .into_iter()
            .map(AccountGroupRef::Multichain)
            .collect()
    }
}

impl AccountWalletObject for SingleAccountWallet {
    fn id(&self) -> AccountWalletId {
        SingleAccountWallet::id(self).clone()
    }

    fn category(&self) -> AccountWalletCategory {
        SingleAccountWallet::category(self)
    }

    fn get_account_group(&self, id: &AccountGroupId) -> Option<AccountGroupRef<'_>> {
        SingleAccountWallet::get_account_group(self, id).map(AccountGroupRef::Single)
    }

    fn get_account_groups(&self) -> Vec<AccountGroupRef<'_>> {
        SingleAccountWallet::get_account_groups(self)
            .into_iter()
            .map(AccountGroupRef::Single)
            .collect()
    }
}

/// 钱包和类型
#[derive(Debug, Clone)]
pub enum AccountWallet {
    Entropy(MultichainAccountWallet),
    Keyring(SingleAccountWallet),
    Snap(SingleAccountWallet),
}

impl AccountWallet {
    /// 多链钱包没有 uninitialized/ready 状态
    pub fn status(&self) -> Option<WalletStatus> {
        match self {
            AccountWallet::Entropy(_) => None,
            AccountWallet::Keyring(wallet) | AccountWallet::Snap(wallet) => Some(wallet.status()),
        }
    }

    pub fn as_entropy(&self) -> Option<&MultichainAccountWallet> {
        match self {
            AccountWallet::Entropy(wallet) => Some(wallet),
            _ => None,
        }
    }

    pub fn as_entropy_mut(&mut self) -> Option<&mut MultichainAccountWallet> {
        match self {
            AccountWallet::Entropy(wallet) => Some(wallet),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn AccountWalletObject {
        match self {
            AccountWallet::Entropy(wallet) => wallet,
            AccountWallet::Keyring(wallet) | AccountWallet::Snap(wallet) => wallet,
        }
    }
}

impl AccountWalletObject for AccountWallet {
    fn id(&self) -> AccountWalletId {
        self.inner().id()
    }

    fn category(&self) -> AccountWalletCategory {
        self.inner().category()
    }

    fn get_account_group(&self, id: &AccountGroupId) -> Option<AccountGroupRef<'_>> {
        self.inner().get_account_group(id)
    }

    fn get_account_groups(&self) -> Vec<AccountGroupRef<'_>> {
        self.inner().get_account_groups()
    }
}

impl From<MultichainAccountWallet> for AccountWallet {
    fn from(wallet: MultichainAccountWallet) -> Self {
        AccountWallet::Entropy(wallet)
    }
}

impl From<SingleAccountWallet> for AccountWallet {
    fn from(wallet: SingleAccountWallet) -> Self {
        match wallet.category() {
            AccountWalletCategory::Snap => AccountWallet::Snap(wallet),
            _ => AccountWallet::Keyring(wallet),
        }
    }
}
