//! CAIP-2 作用域模块
//!
//! 解析链作用域并判断两个作用域是否等价（通用 EVM 作用域匹配任意 EVM 链）

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// CAIP-2: `<namespace>:<reference>`
static CAIP_CHAIN_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<namespace>[-a-z0-9]{3,8}):(?P<reference>[-_a-zA-Z0-9]{1,32})$")
        .expect("CAIP-2 pattern is valid")
});

pub const EVM_NAMESPACE: &str = "eip155";
pub const BTC_NAMESPACE: &str = "bip122";
pub const SOLANA_NAMESPACE: &str = "solana";
pub const TRON_NAMESPACE: &str = "tron";

/// 所有 EVM 链
pub const EVM_ANY_SCOPE: &str = "eip155:0";
pub const EVM_MAINNET_SCOPE: &str = "eip155:1";
pub const EVM_SEPOLIA_SCOPE: &str = "eip155:11155111";
pub const BTC_MAINNET_SCOPE: &str = "bip122:000000000019d6689c085ae165831e93";
pub const BTC_TESTNET_SCOPE: &str = "bip122:000000000933ea01ad0ee984209779ba";
pub const SOLANA_MAINNET_SCOPE: &str = "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp";
pub const SOLANA_DEVNET_SCOPE: &str = "solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1";
pub const SOLANA_TESTNET_SCOPE: &str = "solana:4uhcVJyU9pJkvQyS88uRDiswHXSCkY3z";
pub const TRON_MAINNET_SCOPE: &str = "tron:728126428";

/// 解析后的 CAIP-2 链ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaipChainId<'a> {
    pub namespace: &'a str,
    pub reference: &'a str,
}

impl<'a> CaipChainId<'a> {
    pub fn parse(value: &'a str) -> Option<Self> {
        let caps = CAIP_CHAIN_ID_REGEX.captures(value)?;
        Some(Self {
            namespace: caps.name("namespace")?.as_str(),
            reference: caps.name("reference")?.as_str(),
        })
    }

    pub fn is_evm(&self) -> bool {
        self.namespace == EVM_NAMESPACE
    }
}

impl fmt::Display for CaipChainId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

/// 判断两个作用域是否等价
///
/// - 字符串完全相同
/// - 都属于 EVM 命名空间，且其中一个是 `eip155:0`
pub fn is_scope_equal(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }

    match (CaipChainId::parse(a), CaipChainId::parse(b)) {
        (Some(left), Some(right)) if left.is_evm() && right.is_evm() => {
            a == EVM_ANY_SCOPE || b == EVM_ANY_SCOPE
        }
        _ => false,
    }
}

pub fn is_scope_equal_to_any(scope: &str, scopes: &[String]) -> bool {
    scopes.iter().any(|other| is_scope_equal(scope, other))
}

/// 作用域等价判断（选择器引擎的外部协作者）
pub trait ScopeMatcher: Send + Sync {
    fn scope_matches(&self, query_scope: &str, account_scopes: &[String]) -> bool;
}

/// 默认实现：CAIP-2 等价规则
#[derive(Debug, Clone, Copy, Default)]
pub struct CaipScopeMatcher;

impl ScopeMatcher for CaipScopeMatcher {
    fn scope_matches(&self, query_scope: &str, account_scopes: &[String]) -> bool {
        is_scope_equal_to_any(query_scope, account_scopes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_caip_chain_id() {
        let id = CaipChainId::parse(BTC_MAINNET_SCOPE).unwrap();
        assert_eq!(id.namespace, BTC_NAMESPACE);
        assert_eq!(id.reference, "000000000019d6689c085ae165831e93");
        assert_eq!(id.to_string(), BTC_MAINNET_SCOPE);

        assert!(CaipChainId::parse("eip155").is_none());
        assert!(CaipChainId::parse("EIP155:1").is_none());
        assert!(CaipChainId::parse("ab:1").is_none());
    }

    #[test]
    fn test_generic_evm_scope_matches_specific_chain() {
        assert!(is_scope_equal(EVM_ANY_SCOPE, EVM_MAINNET_SCOPE));
        assert!(is_scope_equal(EVM_SEPOLIA_SCOPE, EVM_ANY_SCOPE));
        assert!(is_scope_equal(EVM_MAINNET_SCOPE, EVM_MAINNET_SCOPE));
        assert!(!is_scope_equal(EVM_MAINNET_SCOPE, EVM_SEPOLIA_SCOPE));
    }

    #[test]
    fn test_non_evm_scopes_require_exact_match() {
        assert!(is_scope_equal(SOLANA_MAINNET_SCOPE, SOLANA_MAINNET_SCOPE));
        assert!(!is_scope_equal(SOLANA_MAINNET_SCOPE, SOLANA_DEVNET_SCOPE));
        assert!(!is_scope_equal(EVM_ANY_SCOPE, BTC_MAINNET_SCOPE));
        assert!(!is_scope_equal("bip122:0", BTC_MAINNET_SCOPE));
    }

    #[test]
    fn test_scope_matcher() {
        let scopes = vec![
            BTC_MAINNET_SCOPE.to_string(),
            BTC_TESTNET_SCOPE.to_string(),
        ];
        let matcher = CaipScopeMatcher;
        assert!(matcher.scope_matches(BTC_TESTNET_SCOPE, &scopes));
        assert!(!matcher.scope_matches(EVM_ANY_SCOPE, &scopes));
        assert!(!matcher.scope_matches(BTC_MAINNET_SCOPE, &[]));
    }
}
