//! 多链账户服务集成测试
//!
//! 测试覆盖：配置驱动初始化、账户上下文、多熵源隔离、发现失败后的上下文

mod common;

use std::io::Write;

use common::{active_provider, provider, shared, ENTROPY};
use multichain_accounts::config::{Config, DiscoveryConfig};
use multichain_accounts::domain::ChainFamily;
use multichain_accounts::error::{AccountError, ProviderOperation};
use multichain_accounts::service::MultichainAccountService;

const OTHER_ENTROPY: &str = "01JKAF3PJ247KAM6C03G5Q0NP8";

fn discovery(discover_on_init: bool) -> DiscoveryConfig {
    DiscoveryConfig {
        discover_on_init,
        max_group_index: 50,
    }
}

#[tokio::test]
async fn test_init_from_config_file_runs_discovery() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[logging]\nlevel = \"info\"\nformat = \"text\"\n\n[discovery]\ndiscover_on_init = true\nmax_group_index = 10"
    )
    .unwrap();
    let config = Config::from_file(file.path()).unwrap();
    config.validate().unwrap();

    let evm = active_provider(ChainFamily::Evm, &[0, 1]);
    let sol = active_provider(ChainFamily::Solana, &[0]);
    let mut service = MultichainAccountService::new(shared(&[&evm, &sol]), config.discovery);
    service.init([ENTROPY]).await.unwrap();

    let groups = service.get_multichain_account_groups(ENTROPY).unwrap();
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|group| group.is_aligned()));

    for group in groups {
        for (provider_name, account_id) in group.provider_accounts() {
            let context = service.get_account_context(account_id).unwrap();
            assert_eq!(context.provider, provider_name);
            assert_eq!(&context.group_id, group.id());
            assert_eq!(context.wallet_id.entropy_source(), ENTROPY);
        }
    }
}

#[tokio::test]
async fn test_init_without_discovery_only_syncs() {
    let evm = active_provider(ChainFamily::Evm, &[0, 1]);
    let mut service = MultichainAccountService::new(shared(&[&evm]), discovery(false));
    service.init([ENTROPY, OTHER_ENTROPY]).await.unwrap();

    assert_eq!(service.get_multichain_account_wallets().len(), 2);
    assert!(evm.calls().is_empty());
    assert!(service
        .get_multichain_account_group(ENTROPY, 0)
        .unwrap()
        .is_none());

    let groups = service
        .discover_and_create_multichain_account_groups(ENTROPY)
        .await
        .unwrap();
    assert_eq!(groups.len(), 2);
}

#[tokio::test]
async fn test_wallets_are_isolated_per_entropy_source() {
    let evm = provider(ChainFamily::Evm);
    let btc = provider(ChainFamily::Bitcoin);
    let mut service = MultichainAccountService::new(shared(&[&evm, &btc]), discovery(false));
    service.init([ENTROPY, OTHER_ENTROPY]).await.unwrap();

    service
        .create_next_multichain_account_group(ENTROPY)
        .await
        .unwrap();
    service
        .create_next_multichain_account_group(ENTROPY)
        .await
        .unwrap();
    let other = service
        .create_next_multichain_account_group(OTHER_ENTROPY)
        .await
        .unwrap();
    assert_eq!(other.group_index(), 0);

    let first = service.get_multichain_account_wallet(ENTROPY).unwrap();
    let second = service.get_multichain_account_wallet(OTHER_ENTROPY).unwrap();
    assert_eq!(first.get_next_group_index(), 2);
    assert_eq!(second.get_next_group_index(), 1);
    assert_eq!(evm.account_count(), 3);
    assert_eq!(btc.account_count(), 3);
}

#[tokio::test]
async fn test_service_enforces_max_group_index() {
    let evm = provider(ChainFamily::Evm);
    let mut service = MultichainAccountService::new(
        shared(&[&evm]),
        DiscoveryConfig {
            discover_on_init: false,
            max_group_index: 0,
        },
    );
    service.add_entropy_source(ENTROPY);

    service
        .create_multichain_account_group(ENTROPY, 0)
        .await
        .unwrap();
    let err = service
        .create_next_multichain_account_group(ENTROPY)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AccountError::GroupIndexTooHigh {
            requested: 1,
            max_allowed: 0
        }
    ));
}

#[tokio::test]
async fn test_failed_creation_keeps_contexts_until_sync() {
    let evm = provider(ChainFamily::Evm);
    let sol = provider(ChainFamily::Solana);
    sol.fail_on(ProviderOperation::CreateAccounts, None);
    let mut service = MultichainAccountService::new(shared(&[&evm, &sol]), discovery(false));
    service.add_entropy_source(ENTROPY);

    let err = service
        .create_multichain_account_group(ENTROPY, 0)
        .await
        .unwrap_err();
    assert_eq!(err.provider_name(), Some("Solana"));
    assert!(service
        .get_multichain_account_groups(ENTROPY)
        .unwrap()
        .is_empty());

    service.sync_wallet(ENTROPY).unwrap();
    let group = service
        .get_multichain_account_group(ENTROPY, 0)
        .unwrap()
        .unwrap();
    let evm_account = group.accounts_of("EVM")[0].id.clone();
    assert_eq!(
        service.get_account_context(&evm_account).unwrap().provider,
        "EVM"
    );

    sol.clear_failures();
    service.align_wallet(ENTROPY).await.unwrap();
    let group = service
        .get_multichain_account_group(ENTROPY, 0)
        .unwrap()
        .unwrap();
    assert!(group.is_aligned());
    let sol_account = group.accounts_of("Solana")[0].id.clone();
    assert_eq!(
        service.get_account_context(&sol_account).unwrap().provider,
        "Solana"
    );
}

#[tokio::test]
async fn test_removed_entropy_source_clears_contexts() {
    let evm = provider(ChainFamily::Evm);
    let mut service = MultichainAccountService::new(shared(&[&evm]), discovery(false));
    service.add_entropy_source(ENTROPY);

    let account_id = service
        .create_next_multichain_account_group(ENTROPY)
        .await
        .unwrap()
        .account_ids()[0]
        .to_string();
    assert!(service.get_account_context(&account_id).is_some());

    service.remove_entropy_source(ENTROPY);
    assert!(service.get_account_context(&account_id).is_none());
    assert!(matches!(
        service.get_multichain_account_groups(ENTROPY),
        Err(AccountError::UnknownEntropySource(_))
    ));
}

/// 上下文索引与当前已安装分组逐一对应
fn assert_contexts_match_groups(service: &MultichainAccountService, entropy_source: &str) {
    for group in service.get_multichain_account_groups(entropy_source).unwrap() {
        for (provider_name, account_id) in group.provider_accounts() {
            let context = service.get_account_context(account_id).unwrap();
            assert_eq!(context.provider, provider_name);
            assert_eq!(&context.group_id, group.id());
        }
    }
}

#[tokio::test]
async fn test_partial_discovery_failure_indexes_installed_groups() {
    let evm = active_provider(ChainFamily::Evm, &[0, 1]);
    let sol = active_provider(ChainFamily::Solana, &[0, 1]);
    sol.fail_on(ProviderOperation::DiscoverAndCreateAccounts, Some(1));
    let mut service = MultichainAccountService::new(shared(&[&evm, &sol]), discovery(false));
    service.add_entropy_source(ENTROPY);

    let err = service
        .discover_and_create_multichain_account_groups(ENTROPY)
        .await
        .unwrap_err();
    assert_eq!(err.provider_name(), Some("Solana"));

    let groups = service.get_multichain_account_groups(ENTROPY).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].account_ids().len(), 2);
    assert_contexts_match_groups(&service, ENTROPY);

    sol.clear_failures();
    let groups = service
        .discover_and_create_multichain_account_groups(ENTROPY)
        .await
        .unwrap();
    assert_eq!(groups.len(), 2);
    assert_contexts_match_groups(&service, ENTROPY);
    let sol_account = service
        .get_multichain_account_group(ENTROPY, 1)
        .unwrap()
        .unwrap()
        .accounts_of("Solana")[0]
        .id
        .clone();
    assert_eq!(service.get_account_context(&sol_account).unwrap().group_index, 1);
}

#[tokio::test]
async fn test_failed_init_discovery_replaces_stale_contexts() {
    let evm = active_provider(ChainFamily::Evm, &[0, 1]);
    let sol = active_provider(ChainFamily::Solana, &[0, 1]);
    sol.fail_on(ProviderOperation::DiscoverAndCreateAccounts, Some(1));
    let mut service = MultichainAccountService::new(shared(&[&evm, &sol]), discovery(true));
    service.add_entropy_source(OTHER_ENTROPY);
    let old_account = service
        .create_next_multichain_account_group(OTHER_ENTROPY)
        .await
        .unwrap()
        .account_ids()[0]
        .to_string();
    assert!(service.get_account_context(&old_account).is_some());

    assert!(service.init([ENTROPY]).await.is_err());
    assert!(service.get_account_context(&old_account).is_none());
    assert_eq!(service.get_multichain_account_groups(ENTROPY).unwrap().len(), 1);
    assert_contexts_match_groups(&service, ENTROPY);
}
