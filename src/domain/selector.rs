//! 账户选择器
//!
//! 多字段查询，字段之间为 AND 关系，未设置的字段不做约束

use serde::{Deserialize, Serialize};

use crate::domain::account::{KeyringAccount, KeyringAccountType};
use crate::error::{AccountError, Result};
use crate::utils::caip::{CaipScopeMatcher, ScopeMatcher};

/// 账户查询条件
///
/// `methods`/`scopes` 为 `Some(vec![])` 时只匹配同样为空列表的账户，
/// 与 `None`（不约束）含义不同
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<KeyringAccountType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
}

impl AccountSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_type(mut self, account_type: KeyringAccountType) -> Self {
        self.account_type = Some(account_type);
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    fn matches(&self, account: &KeyringAccount, matcher: &dyn ScopeMatcher) -> bool {
        if let Some(id) = &self.id {
            if &account.id != id {
                return false;
            }
        }

        if let Some(address) = &self.address {
            if &account.address != address {
                return false;
            }
        }

        if let Some(account_type) = &self.account_type {
            if &account.account_type != account_type {
                return false;
            }
        }

        if let Some(methods) = &self.methods {
            let both_empty = methods.is_empty() && account.methods.is_empty();
            if !both_empty && !methods.iter().any(|m| account.methods.contains(m)) {
                return false;
            }
        }

        if let Some(scopes) = &self.scopes {
            let both_empty = scopes.is_empty() && account.scopes.is_empty();
            if !both_empty
                && !scopes
                    .iter()
                    .any(|scope| matcher.scope_matches(scope, &account.scopes))
            {
                return false;
            }
        }

        true
    }
}

/// 按选择器过滤账户（自定义作用域判断）
pub fn select_with<'a, A>(
    accounts: &'a [A],
    selector: &AccountSelector,
    matcher: &dyn ScopeMatcher,
) -> Vec<&'a A>
where
    A: AsRef<KeyringAccount>,
{
    accounts
        .iter()
        .filter(|account| selector.matches(account.as_ref(), matcher))
        .collect()
}

pub fn select<'a, A>(accounts: &'a [A], selector: &AccountSelector) -> Vec<&'a A>
where
    A: AsRef<KeyringAccount>,
{
    select_with(accounts, selector, &CaipScopeMatcher)
}

/// 至多选中一个账户，多于一个返回 `TooManyCandidates`
pub fn select_one_with<'a, A>(
    accounts: &'a [A],
    selector: &AccountSelector,
    matcher: &dyn ScopeMatcher,
) -> Result<Option<&'a A>>
where
    A: AsRef<KeyringAccount>,
{
    let mut selected = select_with(accounts, selector, matcher);
    if selected.len() > 1 {
        return Err(AccountError::TooManyCandidates(selected.len()));
    }
    Ok(selected.pop())
}

pub fn select_one<'a, A>(accounts: &'a [A], selector: &AccountSelector) -> Result<Option<&'a A>>
where
    A: AsRef<KeyringAccount>,
{
    select_one_with(accounts, selector, &CaipScopeMatcher)
}
