//! 账户标识符编解码
//!
//! 钱包ID `<category>:<subId>`，分组ID `<walletId>/<groupSubId>`，
//! 多链分组ID `entropy:<entropySource>/<groupIndex>`

use std::{fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AccountError, Result};

/// 保留的分组子ID，对熵钱包约定映射到索引 0
pub const DEFAULT_ACCOUNT_GROUP_UNIQUE_ID: &str = "default";

static ACCOUNT_WALLET_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<category>entropy|keyring|snap):(?P<sub_id>.+)$")
        .expect("wallet id pattern is valid")
});

static ACCOUNT_GROUP_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<wallet_id>(?:entropy|keyring|snap):.+)/(?P<sub_id>[^/]+)$")
        .expect("group id pattern is valid")
});

static MULTICHAIN_ACCOUNT_GROUP_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^entropy:.*/(?P<group_index>[0-9]+)$").expect("multichain group id pattern is valid")
});

/// 钱包类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountWalletCategory {
    /// 基于熵源（助记词），按 BIP-44 索引分组
    Entropy,
    /// 基于 keyring（硬件钱包、导入私钥等）
    Keyring,
    /// 基于 Snap 的远程 keyring
    Snap,
}

impl AccountWalletCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountWalletCategory::Entropy => "entropy",
            AccountWalletCategory::Keyring => "keyring",
            AccountWalletCategory::Snap => "snap",
        }
    }
}

impl fmt::Display for AccountWalletCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountWalletCategory {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "entropy" => Ok(AccountWalletCategory::Entropy),
            "keyring" => Ok(AccountWalletCategory::Keyring),
            "snap" => Ok(AccountWalletCategory::Snap),
            _ => Err(AccountError::InvalidFormat {
                value: s.to_string(),
                expected: "entropy | keyring | snap",
            }),
        }
    }
}

/// 钱包ID：`<category>:<subId>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountWalletId(String);

impl AccountWalletId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountWalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccountWalletId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountWalletId {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self> {
        parse_account_wallet_id(s)?;
        Ok(Self(s.to_string()))
    }
}

/// 分组ID：`<walletId>/<groupSubId>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountGroupId(String);

impl AccountGroupId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccountGroupId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountGroupId {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self> {
        parse_account_group_id(s)?;
        Ok(Self(s.to_string()))
    }
}

/// 多链钱包ID：`entropy:<entropySource>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MultichainAccountWalletId {
    entropy_source: String,
}

impl MultichainAccountWalletId {
    pub fn entropy_source(&self) -> &str {
        &self.entropy_source
    }
}

impl fmt::Display for MultichainAccountWalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", AccountWalletCategory::Entropy, self.entropy_source)
    }
}

impl TryFrom<String> for MultichainAccountWalletId {
    type Error = AccountError;

    fn try_from(value: String) -> Result<Self> {
        let parsed = parse_account_wallet_id(&value)?;
        if parsed.category != AccountWalletCategory::Entropy {
            return Err(AccountError::InvalidFormat {
                value,
                expected: "entropy:<entropySource>",
            });
        }
        Ok(Self {
            entropy_source: parsed.sub_id,
        })
    }
}

impl From<MultichainAccountWalletId> for String {
    fn from(id: MultichainAccountWalletId) -> Self {
        id.to_string()
    }
}

impl From<&MultichainAccountWalletId> for AccountWalletId {
    fn from(id: &MultichainAccountWalletId) -> Self {
        AccountWalletId(id.to_string())
    }
}

/// 多链分组ID：`<multichainWalletId>/<groupIndex>`
///
/// 派生的 `Ord` 先按钱包、再按索引排序
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MultichainAccountGroupId {
    wallet_id: MultichainAccountWalletId,
    group_index: u32,
}

impl MultichainAccountGroupId {
    pub fn wallet_id(&self) -> &MultichainAccountWalletId {
        &self.wallet_id
    }

    pub fn group_index(&self) -> u32 {
        self.group_index
    }
}

impl fmt::Display for MultichainAccountGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.wallet_id, self.group_index)
    }
}

impl TryFrom<String> for MultichainAccountGroupId {
    type Error = AccountError;

    fn try_from(value: String) -> Result<Self> {
        let group_index = get_group_index_from_multichain_account_group_id(&value)?;
        let (wallet_part, index_part) = value
            .rsplit_once('/')
            .ok_or_else(|| AccountError::IndexNotExtractable(value.clone()))?;
        // 索引部分必须是规范十进制形式
        if index_part != group_index.to_string() {
            return Err(AccountError::InvalidFormat {
                value: value.clone(),
                expected: "entropy:<entropySource>/<groupIndex> without leading zeros",
            });
        }
        let wallet_id = MultichainAccountWalletId::try_from(wallet_part.to_string())?;
        Ok(Self {
            wallet_id,
            group_index,
        })
    }
}

impl FromStr for MultichainAccountGroupId {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_from(s.to_string())
    }
}

impl From<MultichainAccountGroupId> for String {
    fn from(id: MultichainAccountGroupId) -> Self {
        id.to_string()
    }
}

impl From<&MultichainAccountGroupId> for AccountGroupId {
    fn from(id: &MultichainAccountGroupId) -> Self {
        AccountGroupId(id.to_string())
    }
}

/// 解析后的钱包ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAccountWalletId {
    pub category: AccountWalletCategory,
    pub sub_id: String,
}

/// 解析后的分组ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAccountGroupId {
    pub wallet_id: AccountWalletId,
    pub wallet: ParsedAccountWalletId,
    pub sub_id: String,
}

pub fn to_account_wallet_id(category: AccountWalletCategory, sub_id: &str) -> AccountWalletId {
    AccountWalletId(format!("{}:{}", category, sub_id))
}

pub fn parse_account_wallet_id(value: &str) -> Result<ParsedAccountWalletId> {
    let caps = ACCOUNT_WALLET_ID_REGEX
        .captures(value)
        .ok_or_else(|| AccountError::InvalidFormat {
            value: value.to_string(),
            expected: "<entropy|keyring|snap>:<subId>",
        })?;

    Ok(ParsedAccountWalletId {
        category: caps["category"].parse()?,
        sub_id: caps["sub_id"].to_string(),
    })
}

pub fn to_account_group_id(wallet_id: &AccountWalletId, sub_id: &str) -> AccountGroupId {
    AccountGroupId(format!("{}/{}", wallet_id, sub_id))
}

pub fn to_default_account_group_id(wallet_id: &AccountWalletId) -> AccountGroupId {
    to_account_group_id(wallet_id, DEFAULT_ACCOUNT_GROUP_UNIQUE_ID)
}

pub fn parse_account_group_id(value: &str) -> Result<ParsedAccountGroupId> {
    let caps = ACCOUNT_GROUP_ID_REGEX
        .captures(value)
        .ok_or_else(|| AccountError::InvalidFormat {
            value: value.to_string(),
            expected: "<walletId>/<groupSubId>",
        })?;

    let wallet_id = &caps["wallet_id"];
    Ok(ParsedAccountGroupId {
        wallet: parse_account_wallet_id(wallet_id)?,
        wallet_id: AccountWalletId(wallet_id.to_string()),
        sub_id: caps["sub_id"].to_string(),
    })
}

pub fn to_multichain_account_wallet_id(entropy_source: &str) -> MultichainAccountWalletId {
    MultichainAccountWalletId {
        entropy_source: entropy_source.to_string(),
    }
}

pub fn to_multichain_account_group_id(
    wallet_id: &MultichainAccountWalletId,
    group_index: u32,
) -> MultichainAccountGroupId {
    MultichainAccountGroupId {
        wallet_id: wallet_id.clone(),
        group_index,
    }
}

pub fn is_multichain_account_group_id(value: &str) -> bool {
    MULTICHAIN_ACCOUNT_GROUP_ID_REGEX.is_match(value)
}

/// 从多链分组ID中提取分组索引
///
/// 超出 `u32` 范围的索引同样视为无法提取
pub fn get_group_index_from_multichain_account_group_id(value: &str) -> Result<u32> {
    MULTICHAIN_ACCOUNT_GROUP_ID_REGEX
        .captures(value)
        .and_then(|caps| caps["group_index"].parse::<u32>().ok())
        .ok_or_else(|| AccountError::IndexNotExtractable(value.to_string()))
}
