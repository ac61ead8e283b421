//! 错误类型模块
//!
//! 账户拓扑层的统一错误：标识符格式、选择器基数、前置条件、服务商失败

use std::fmt;

use thiserror::Error;

/// 服务商操作类型（用于错误归因）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderOperation {
    CreateAccounts,
    DiscoverAndCreateAccounts,
}

impl ProviderOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderOperation::CreateAccounts => "create_accounts",
            ProviderOperation::DiscoverAndCreateAccounts => "discover_and_create_accounts",
        }
    }
}

impl fmt::Display for ProviderOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AccountError {
    /// 标识符字符串不符合预期格式
    #[error("Invalid identifier format: {value:?} (expected {expected})")]
    InvalidFormat { value: String, expected: &'static str },

    /// 无法从分组ID中提取分组索引
    ///
    /// 类型化构造器保证不会出现，出现即为调用方绕过了构造器
    #[error("Unable to extract group index from {0:?}")]
    IndexNotExtractable(String),

    /// 选择器命中多个账户
    #[error("Too many account candidates, expected 1, got: {0}")]
    TooManyCandidates(usize),

    /// 请求的分组索引超过下一个连续槽位
    #[error("You cannot use a group index that is higher than the next available one: expected <= {max_allowed}, got {requested}")]
    GroupIndexTooHigh { requested: u32, max_allowed: u32 },

    #[error("Unknown entropy source: {0}")]
    UnknownEntropySource(String),

    /// 账户缺少合法的 options.entropy 结构
    #[error("Account is not BIP-44 compatible: {0}")]
    NotBip44Account(String),

    /// 单个服务商调用失败（可归因到具体服务商与操作）
    #[error("Provider {provider} failed during {operation} at group index {group_index}: {source}")]
    Provider {
        provider: String,
        operation: ProviderOperation,
        group_index: u32,
        #[source]
        source: anyhow::Error,
    },

    /// 所有服务商都没有为该分组提供账户
    #[error("No provider holds an account for group {0}")]
    EmptyGroup(String),
}

impl AccountError {
    /// 稳定的错误码（snake_case）
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::InvalidFormat { .. } => "invalid_format",
            AccountError::IndexNotExtractable(_) => "index_not_extractable",
            AccountError::TooManyCandidates(_) => "too_many_candidates",
            AccountError::GroupIndexTooHigh { .. } => "group_index_too_high",
            AccountError::UnknownEntropySource(_) => "unknown_entropy_source",
            AccountError::NotBip44Account(_) => "not_bip44_account",
            AccountError::Provider { .. } => "provider_error",
            AccountError::EmptyGroup(_) => "empty_group",
        }
    }

    /// 是否为编程错误（而非调用方可恢复的错误）
    pub fn is_programming_error(&self) -> bool {
        matches!(self, AccountError::IndexNotExtractable(_))
    }

    /// 失败的服务商名称（仅 Provider 错误）
    pub fn provider_name(&self) -> Option<&str> {
        match self {
            AccountError::Provider { provider, .. } => Some(provider),
            _ => None,
        }
    }

    pub(crate) fn provider(
        provider: &str,
        operation: ProviderOperation,
        group_index: u32,
        source: anyhow::Error,
    ) -> Self {
        AccountError::Provider {
            provider: provider.to_string(),
            operation,
            group_index,
            source,
        }
    }
}

pub type Result<T, E = AccountError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AccountError::TooManyCandidates(2).code(), "too_many_candidates");
        assert_eq!(
            AccountError::GroupIndexTooHigh {
                requested: 3,
                max_allowed: 1
            }
            .code(),
            "group_index_too_high"
        );
        assert!(AccountError::IndexNotExtractable("x".into()).is_programming_error());
        assert!(!AccountError::TooManyCandidates(2).is_programming_error());
    }

    #[test]
    fn test_provider_error_attribution() {
        let err = AccountError::provider(
            "Solana",
            ProviderOperation::CreateAccounts,
            4,
            anyhow::anyhow!("rpc unavailable"),
        );
        assert_eq!(err.provider_name(), Some("Solana"));
        let msg = err.to_string();
        assert!(msg.contains("Solana"));
        assert!(msg.contains("create_accounts"));
        assert!(msg.contains("rpc unavailable"));
    }

    #[test]
    fn test_too_many_candidates_message() {
        assert_eq!(
            AccountError::TooManyCandidates(2).to_string(),
            "Too many account candidates, expected 1, got: 2"
        );
    }
}
