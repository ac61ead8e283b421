//! 链家族配置模块
//!
//! 每个服务商对应一个链家族，定义其 CAIP 命名空间、账户类型、
//! 默认方法与作用域，以及按分组索引生成的 BIP-44 派生路径

use serde::{Deserialize, Serialize};

use crate::domain::account::KeyringAccountType;
use crate::utils::caip;

/// 链家族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// Ethereum 及所有 EVM 兼容链
    Evm,
    /// Bitcoin (BIP84 native segwit)
    Bitcoin,
    /// Solana (SLIP-0010)
    Solana,
    Tron,
}

impl ChainFamily {
    pub fn all() -> [ChainFamily; 4] {
        [
            ChainFamily::Evm,
            ChainFamily::Bitcoin,
            ChainFamily::Solana,
            ChainFamily::Tron,
        ]
    }

    /// 服务商显示名称
    pub fn provider_name(&self) -> &'static str {
        match self {
            ChainFamily::Evm => "EVM",
            ChainFamily::Bitcoin => "Bitcoin",
            ChainFamily::Solana => "Solana",
            ChainFamily::Tron => "Tron",
        }
    }

    pub fn namespace(&self) -> &'static str {
        match self {
            ChainFamily::Evm => caip::EVM_NAMESPACE,
            ChainFamily::Bitcoin => caip::BTC_NAMESPACE,
            ChainFamily::Solana => caip::SOLANA_NAMESPACE,
            ChainFamily::Tron => caip::TRON_NAMESPACE,
        }
    }

    /// BIP44 coin type
    pub fn coin_type(&self) -> u32 {
        match self {
            ChainFamily::Evm => 60,
            ChainFamily::Bitcoin => 0,
            ChainFamily::Solana => 501,
            ChainFamily::Tron => 195,
        }
    }

    pub fn account_type(&self) -> KeyringAccountType {
        match self {
            ChainFamily::Evm => KeyringAccountType::Eip155Eoa,
            ChainFamily::Bitcoin => KeyringAccountType::Bip122P2wpkh,
            ChainFamily::Solana => KeyringAccountType::SolanaDataAccount,
            ChainFamily::Tron => KeyringAccountType::TronEoa,
        }
    }

    pub fn default_methods(&self) -> Vec<String> {
        let methods: &[&str] = match self {
            ChainFamily::Evm => &[
                "personal_sign",
                "eth_sign",
                "eth_signTransaction",
                "eth_signTypedData_v1",
                "eth_signTypedData_v3",
                "eth_signTypedData_v4",
            ],
            ChainFamily::Bitcoin => &["sendBitcoin"],
            ChainFamily::Solana => &[
                "signAndSendTransaction",
                "signTransaction",
                "signMessage",
                "signIn",
            ],
            ChainFamily::Tron => &["signMessageV2", "signTransaction"],
        };
        methods.iter().map(|m| m.to_string()).collect()
    }

    pub fn default_scopes(&self) -> Vec<String> {
        let scopes: &[&str] = match self {
            // EVM 账户使用通用作用域，匹配任意 EVM 链
            ChainFamily::Evm => &[caip::EVM_ANY_SCOPE],
            ChainFamily::Bitcoin => &[caip::BTC_MAINNET_SCOPE],
            ChainFamily::Solana => &[
                caip::SOLANA_MAINNET_SCOPE,
                caip::SOLANA_DEVNET_SCOPE,
                caip::SOLANA_TESTNET_SCOPE,
            ],
            ChainFamily::Tron => &[caip::TRON_MAINNET_SCOPE],
        };
        scopes.iter().map(|s| s.to_string()).collect()
    }

    /// 生成分组索引对应的派生路径
    pub fn derivation_path(&self, group_index: u32) -> String {
        match self {
            ChainFamily::Evm => format!("m/44'/{}'/0'/0/{}", self.coin_type(), group_index),
            ChainFamily::Bitcoin => format!("m/84'/{}'/{}'/0/0", self.coin_type(), group_index),
            // Solana/ed25519: m/44'/501'/account'/0'
            ChainFamily::Solana => format!("m/44'/{}'/{}'/0'", self.coin_type(), group_index),
            ChainFamily::Tron => format!("m/44'/{}'/0'/0/{}", self.coin_type(), group_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_paths() {
        assert_eq!(ChainFamily::Evm.derivation_path(0), "m/44'/60'/0'/0/0");
        assert_eq!(ChainFamily::Evm.derivation_path(7), "m/44'/60'/0'/0/7");
        assert_eq!(ChainFamily::Bitcoin.derivation_path(2), "m/84'/0'/2'/0/0");
        assert_eq!(ChainFamily::Solana.derivation_path(1), "m/44'/501'/1'/0'");
        assert_eq!(ChainFamily::Tron.derivation_path(3), "m/44'/195'/0'/0/3");
    }

    #[test]
    fn test_scopes_belong_to_namespace() {
        for family in ChainFamily::all() {
            let scopes = family.default_scopes();
            assert!(!scopes.is_empty());
            for scope in scopes {
                let parsed = caip::CaipChainId::parse(&scope).unwrap();
                assert_eq!(parsed.namespace, family.namespace());
            }
            assert!(family.account_type().as_str().starts_with(family.namespace()));
        }
    }
}
