//! 账户模型
//!
//! 核心只读取账户的 id/address/type/methods/scopes 与 `options.entropy`，
//! 其余字段对本层不透明

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AccountError;

/// `options.entropy.type` 唯一受支持的取值
pub const ENTROPY_TYPE_MNEMONIC: &str = "mnemonic";

const ENTROPY_OPTIONS_KEY: &str = "entropy";

/// 账户类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyringAccountType {
    #[serde(rename = "eip155:eoa")]
    Eip155Eoa,
    #[serde(rename = "eip155:erc4337")]
    Eip155Erc4337,
    #[serde(rename = "bip122:p2pkh")]
    Bip122P2pkh,
    #[serde(rename = "bip122:p2sh")]
    Bip122P2sh,
    #[serde(rename = "bip122:p2wpkh")]
    Bip122P2wpkh,
    #[serde(rename = "bip122:p2tr")]
    Bip122P2tr,
    #[serde(rename = "solana:data-account")]
    SolanaDataAccount,
    #[serde(rename = "tron:eoa")]
    TronEoa,
    #[serde(rename = "any:account")]
    AnyAccount,
}

impl KeyringAccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyringAccountType::Eip155Eoa => "eip155:eoa",
            KeyringAccountType::Eip155Erc4337 => "eip155:erc4337",
            KeyringAccountType::Bip122P2pkh => "bip122:p2pkh",
            KeyringAccountType::Bip122P2sh => "bip122:p2sh",
            KeyringAccountType::Bip122P2wpkh => "bip122:p2wpkh",
            KeyringAccountType::Bip122P2tr => "bip122:p2tr",
            KeyringAccountType::SolanaDataAccount => "solana:data-account",
            KeyringAccountType::TronEoa => "tron:eoa",
            KeyringAccountType::AnyAccount => "any:account",
        }
    }
}

/// 区块链账户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyringAccount {
    pub id: String,
    pub address: String,
    #[serde(rename = "type")]
    pub account_type: KeyringAccountType,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl AsRef<KeyringAccount> for KeyringAccount {
    fn as_ref(&self) -> &KeyringAccount {
        self
    }
}

/// 熵源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntropyType {
    Mnemonic,
}

/// `options.entropy` 子对象
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntropyOptions {
    #[serde(rename = "type")]
    pub entropy_type: EntropyType,
    /// 熵源ID
    pub id: String,
    /// BIP-44 分组索引
    pub group_index: u32,
    pub derivation_path: String,
}

impl EntropyOptions {
    pub fn mnemonic(
        entropy_source: impl Into<String>,
        group_index: u32,
        derivation_path: impl Into<String>,
    ) -> Self {
        Self {
            entropy_type: EntropyType::Mnemonic,
            id: entropy_source.into(),
            group_index,
            derivation_path: derivation_path.into(),
        }
    }

    fn to_value(&self) -> Value {
        let mut entropy = Map::new();
        entropy.insert("type".into(), Value::from(ENTROPY_TYPE_MNEMONIC));
        entropy.insert("id".into(), Value::from(self.id.clone()));
        entropy.insert("groupIndex".into(), Value::from(self.group_index));
        entropy.insert(
            "derivationPath".into(),
            Value::from(self.derivation_path.clone()),
        );
        Value::Object(entropy)
    }
}

/// 结构化读取 `options.entropy`，任一字段缺失或类型不符即返回 None
pub fn entropy_options(account: &KeyringAccount) -> Option<EntropyOptions> {
    let entropy = account.options.get(ENTROPY_OPTIONS_KEY)?.as_object()?;

    if entropy.get("type")?.as_str()? != ENTROPY_TYPE_MNEMONIC {
        return None;
    }
    let id = entropy.get("id")?.as_str()?;
    let group_index = u32::try_from(entropy.get("groupIndex")?.as_u64()?).ok()?;
    let derivation_path = entropy.get("derivationPath")?.as_str()?;

    Some(EntropyOptions::mnemonic(id, group_index, derivation_path))
}

/// BIP-44 兼容性判断（纯结构判断，不依赖额外标记）
pub fn is_bip44_account(account: &KeyringAccount) -> bool {
    entropy_options(account).is_some()
}

/// BIP-44 兼容账户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "KeyringAccount", into = "KeyringAccount")]
pub struct Bip44Account {
    account: KeyringAccount,
    entropy: EntropyOptions,
}

impl Bip44Account {
    /// 构造账户并写入 `options.entropy`
    pub fn new(
        id: impl Into<String>,
        address: impl Into<String>,
        account_type: KeyringAccountType,
        methods: Vec<String>,
        scopes: Vec<String>,
        entropy: EntropyOptions,
    ) -> Self {
        let mut options = Map::new();
        options.insert(ENTROPY_OPTIONS_KEY.into(), entropy.to_value());

        Self {
            account: KeyringAccount {
                id: id.into(),
                address: address.into(),
                account_type,
                methods,
                scopes,
                options,
            },
            entropy,
        }
    }

    pub fn entropy(&self) -> &EntropyOptions {
        &self.entropy
    }

    pub fn entropy_source(&self) -> &str {
        &self.entropy.id
    }

    pub fn group_index(&self) -> u32 {
        self.entropy.group_index
    }

    pub fn belongs_to(&self, entropy_source: &str, group_index: u32) -> bool {
        self.entropy.id == entropy_source && self.entropy.group_index == group_index
    }

    pub fn into_inner(self) -> KeyringAccount {
        self.account
    }
}

impl TryFrom<KeyringAccount> for Bip44Account {
    type Error = AccountError;

    fn try_from(account: KeyringAccount) -> Result<Self, Self::Error> {
        match entropy_options(&account) {
            Some(entropy) => Ok(Self { account, entropy }),
            None => Err(AccountError::NotBip44Account(account.id)),
        }
    }
}

impl From<Bip44Account> for KeyringAccount {
    fn from(account: Bip44Account) -> Self {
        account.account
    }
}

impl Deref for Bip44Account {
    type Target = KeyringAccount;

    fn deref(&self) -> &KeyringAccount {
        &self.account
    }
}

impl AsRef<KeyringAccount> for Bip44Account {
    fn as_ref(&self) -> &KeyringAccount {
        &self.account
    }
}
