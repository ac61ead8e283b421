//! 多链账户服务
//! 按熵源管理多链钱包，并维护 accountId -> 所属钱包/分组/服务商 的反向索引

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::config::DiscoveryConfig;
use crate::domain::group::MultichainAccountGroup;
use crate::domain::identifiers::{MultichainAccountGroupId, MultichainAccountWalletId};
use crate::domain::wallet::MultichainAccountWallet;
use crate::error::{AccountError, Result};
use crate::provider::SharedAccountProvider;
use crate::utils::caip::{CaipScopeMatcher, ScopeMatcher};

/// 账户所属位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountContext {
    pub wallet_id: MultichainAccountWalletId,
    pub group_id: MultichainAccountGroupId,
    pub group_index: u32,
    pub provider: String,
}

pub struct MultichainAccountService {
    providers: Vec<SharedAccountProvider>,
    matcher: Arc<dyn ScopeMatcher>,
    config: DiscoveryConfig,
    /// entropySource -> 钱包
    wallets: BTreeMap<String, MultichainAccountWallet>,
    /// accountId -> 上下文
    contexts: HashMap<String, AccountContext>,
}

impl MultichainAccountService {
    pub fn new(providers: Vec<SharedAccountProvider>, config: DiscoveryConfig) -> Self {
        Self::with_matcher(providers, config, Arc::new(CaipScopeMatcher))
    }

    pub fn with_matcher(
        providers: Vec<SharedAccountProvider>,
        config: DiscoveryConfig,
        matcher: Arc<dyn ScopeMatcher>,
    ) -> Self {
        Self {
            providers,
            matcher,
            config,
            wallets: BTreeMap::new(),
            contexts: HashMap::new(),
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// 按熵源列表重建所有钱包
    ///
    /// 开启 `discover_on_init` 时对每个钱包执行一次发现
    pub async fn init<I, S>(&mut self, entropy_sources: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.wallets.clear();

        for entropy_source in entropy_sources {
            self.insert_wallet(entropy_source.as_ref());
        }

        let mut outcome: Result<()> = Ok(());
        if self.config.discover_on_init {
            for wallet in self.wallets.values_mut() {
                let discovered = wallet
                    .discover_and_create_multichain_accounts()
                    .await
                    .map(|groups| groups.len());
                match discovered {
                    Ok(discovered) => tracing::info!(
                        wallet_id = %wallet.id(),
                        discovered,
                        "Discovery on init finished"
                    ),
                    Err(err) => {
                        outcome = Err(err);
                        break;
                    }
                }
            }
        }

        // 发现中途失败时已安装的分组同样需要上下文
        self.rebuild_contexts();
        outcome?;
        tracing::info!(wallets = self.wallets.len(), "Multichain account service initialized");
        Ok(())
    }

    /// 已存在时直接返回已有钱包
    pub fn add_entropy_source(&mut self, entropy_source: &str) -> &MultichainAccountWallet {
        if !self.wallets.contains_key(entropy_source) {
            self.insert_wallet(entropy_source);
            self.rebuild_contexts();
        }
        &self.wallets[entropy_source]
    }

    pub fn remove_entropy_source(&mut self, entropy_source: &str) -> Option<MultichainAccountWallet> {
        let removed = self.wallets.remove(entropy_source);
        if removed.is_some() {
            self.rebuild_contexts();
        }
        removed
    }

    pub fn get_multichain_account_wallet(
        &self,
        entropy_source: &str,
    ) -> Result<&MultichainAccountWallet> {
        self.wallets
            .get(entropy_source)
            .ok_or_else(|| AccountError::UnknownEntropySource(entropy_source.to_string()))
    }

    pub fn get_multichain_account_wallets(&self) -> Vec<&MultichainAccountWallet> {
        self.wallets.values().collect()
    }

    /// 钱包不存在时报错，分组不存在时返回 None
    pub fn get_multichain_account_group(
        &self,
        entropy_source: &str,
        group_index: u32,
    ) -> Result<Option<&MultichainAccountGroup>> {
        Ok(self
            .get_multichain_account_wallet(entropy_source)?
            .get_multichain_account(group_index))
    }

    pub fn get_multichain_account_groups(
        &self,
        entropy_source: &str,
    ) -> Result<Vec<&MultichainAccountGroup>> {
        Ok(self
            .get_multichain_account_wallet(entropy_source)?
            .get_multichain_accounts())
    }

    pub async fn create_multichain_account_group(
        &mut self,
        entropy_source: &str,
        group_index: u32,
    ) -> Result<&MultichainAccountGroup> {
        let created = self
            .get_multichain_account_wallet_mut(entropy_source)?
            .create_multichain_account(group_index)
            .await
            .map(|_| ());
        self.rebuild_contexts();
        created?;
        self.installed_group(entropy_source, group_index)
    }

    pub async fn create_next_multichain_account_group(
        &mut self,
        entropy_source: &str,
    ) -> Result<&MultichainAccountGroup> {
        let created = self
            .get_multichain_account_wallet_mut(entropy_source)?
            .create_next_multichain_account()
            .await
            .map(|group| group.group_index());
        self.rebuild_contexts();
        let group_index = created?;
        self.installed_group(entropy_source, group_index)
    }

    pub async fn discover_and_create_multichain_account_groups(
        &mut self,
        entropy_source: &str,
    ) -> Result<Vec<&MultichainAccountGroup>> {
        let discovered = self
            .get_multichain_account_wallet_mut(entropy_source)?
            .discover_and_create_multichain_accounts()
            .await
            .map(|groups| {
                groups
                    .into_iter()
                    .map(MultichainAccountGroup::group_index)
                    .collect::<Vec<u32>>()
            });
        // 失败前的索引已逐个安装
        self.rebuild_contexts();
        let indices = discovered?;

        let wallet = self.get_multichain_account_wallet(entropy_source)?;
        Ok(indices
            .into_iter()
            .filter_map(|group_index| wallet.get_multichain_account(group_index))
            .collect())
    }

    /// 为所有分组补齐缺失的服务商账户
    pub async fn align_wallet(&mut self, entropy_source: &str) -> Result<()> {
        let aligned = self
            .get_multichain_account_wallet_mut(entropy_source)?
            .align_groups()
            .await;
        self.rebuild_contexts();
        aligned
    }

    /// 服务商状态变化后（包括写操作失败后）重新同步
    pub fn sync_wallet(&mut self, entropy_source: &str) -> Result<()> {
        self.get_multichain_account_wallet_mut(entropy_source)?.sync();
        self.rebuild_contexts();
        Ok(())
    }

    pub fn get_account_context(&self, account_id: &str) -> Option<&AccountContext> {
        self.contexts.get(account_id)
    }

    fn insert_wallet(&mut self, entropy_source: &str) {
        let wallet = MultichainAccountWallet::with_matcher(
            entropy_source,
            self.providers.clone(),
            Arc::clone(&self.matcher),
        )
        .with_max_group_index(self.config.max_group_index);

        tracing::info!(
            wallet_id = %wallet.id(),
            groups = wallet.get_next_group_index(),
            "Registered multichain account wallet"
        );
        self.wallets.insert(entropy_source.to_string(), wallet);
    }

    /// 直接修改后调用 `sync_wallet` 刷新账户上下文
    pub fn get_multichain_account_wallet_mut(
        &mut self,
        entropy_source: &str,
    ) -> Result<&mut MultichainAccountWallet> {
        self.wallets
            .get_mut(entropy_source)
            .ok_or_else(|| AccountError::UnknownEntropySource(entropy_source.to_string()))
    }

    fn installed_group(
        &self,
        entropy_source: &str,
        group_index: u32,
    ) -> Result<&MultichainAccountGroup> {
        let wallet = self.get_multichain_account_wallet(entropy_source)?;
        wallet
            .get_multichain_account(group_index)
            .ok_or_else(|| AccountError::EmptyGroup(format!("{}/{}", wallet.id(), group_index)))
    }

    fn rebuild_contexts(&mut self) {
        self.contexts.clear();

        for wallet in self.wallets.values() {
            for group in wallet.get_multichain_accounts() {
                for (provider, account_id) in group.provider_accounts() {
                    self.contexts.insert(
                        account_id.to_string(),
                        AccountContext {
                            wallet_id: wallet.id().clone(),
                            group_id: group.id().clone(),
                            group_index: group.group_index(),
                            provider: provider.to_string(),
                        },
                    );
                }
            }
        }
    }
}
