//! 测试辅助模块
//! 提供服务商与钱包构造工具

#![allow(dead_code)]

use std::sync::Arc;

use multichain_accounts::domain::{ChainFamily, MultichainAccountWallet};
use multichain_accounts::provider::{InMemoryAccountProvider, SharedAccountProvider};

pub const ENTROPY: &str = "01JKAF3DSGM3AB87EM9N0K41AJ";

/// 创建指定链家族的内存服务商
pub fn provider(family: ChainFamily) -> Arc<InMemoryAccountProvider> {
    Arc::new(InMemoryAccountProvider::new(family))
}

/// 创建在给定索引上有链上活动的内存服务商
pub fn active_provider(family: ChainFamily, indices: &[u32]) -> Arc<InMemoryAccountProvider> {
    Arc::new(InMemoryAccountProvider::new(family).with_activity(ENTROPY, indices))
}

pub fn shared(providers: &[&Arc<InMemoryAccountProvider>]) -> Vec<SharedAccountProvider> {
    providers
        .iter()
        .map(|p| Arc::clone(*p) as SharedAccountProvider)
        .collect()
}

pub fn wallet(providers: &[&Arc<InMemoryAccountProvider>]) -> MultichainAccountWallet {
    MultichainAccountWallet::new(ENTROPY, shared(providers))
}

/// 钱包内所有分组索引
pub fn group_indices(wallet: &MultichainAccountWallet) -> Vec<u32> {
    wallet
        .get_multichain_accounts()
        .iter()
        .map(|group| group.group_index())
        .collect()
}
