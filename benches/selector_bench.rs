//! 账户选择器基准测试
//!
//! 测试场景:
//! 1. 按作用域选择（CAIP 等价判断）
//! 2. 按类型 + 方法组合条件选择
//! 3. select_one 基数检查

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use multichain_accounts::domain::{
    select, select_one, AccountSelector, Bip44Account, ChainFamily, EntropyOptions,
    KeyringAccountType,
};
use multichain_accounts::utils::caip::{EVM_MAINNET_SCOPE, SOLANA_MAINNET_SCOPE};

const ENTROPY: &str = "01JKAF3DSGM3AB87EM9N0K41AJ";

fn accounts(groups: u32) -> Vec<Bip44Account> {
    (0..groups)
        .flat_map(|group_index| {
            ChainFamily::all().into_iter().map(move |family| {
                Bip44Account::new(
                    format!("{}-{}", family.provider_name(), group_index),
                    format!("addr-{}-{}", family.namespace(), group_index),
                    family.account_type(),
                    family.default_methods(),
                    family.default_scopes(),
                    EntropyOptions::mnemonic(
                        ENTROPY,
                        group_index,
                        family.derivation_path(group_index),
                    ),
                )
            })
        })
        .collect()
}

fn bench_select_by_scope(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_by_scope");
    let selector = AccountSelector::new().with_scopes([EVM_MAINNET_SCOPE]);

    for groups in [1u32, 10, 100] {
        let accounts = accounts(groups);
        group.throughput(Throughput::Elements(accounts.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(groups), &accounts, |b, accounts| {
            b.iter(|| select(black_box(accounts), black_box(&selector)).len())
        });
    }

    group.finish();
}

fn bench_select_combined(c: &mut Criterion) {
    let accounts = accounts(100);
    let selector = AccountSelector::new()
        .with_type(KeyringAccountType::SolanaDataAccount)
        .with_methods(["signMessage"])
        .with_scopes([SOLANA_MAINNET_SCOPE]);

    c.bench_function("select_combined_100_groups", |b| {
        b.iter(|| select(black_box(&accounts), black_box(&selector)).len())
    });
}

fn bench_select_one(c: &mut Criterion) {
    let accounts = accounts(100);
    let selector = AccountSelector::new().with_id("EVM-42");

    c.bench_function("select_one_by_id", |b| {
        b.iter(|| select_one(black_box(&accounts), black_box(&selector)).is_ok())
    });
}

criterion_group!(
    benches,
    bench_select_by_scope,
    bench_select_combined,
    bench_select_one
);
criterion_main!(benches);
