use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use drip_accrual::{AccrualEngine, LedgerContext, Role, RoleTable, TransferCoordinator};
use drip_store::MemoryLedger;
use drip_types::{AccountId, Rate, Timestamp, TransferAmount, PRECISION};

fn funded_ledger(
    accounts: usize,
) -> (LedgerContext<MemoryLedger>, TransferCoordinator<RoleTable>) {
    let minter = AccountId::new("minter");
    let mut roles = RoleTable::new(AccountId::new("owner"));
    roles
        .grant_role(&AccountId::new("owner"), Role::MintBurn, minter.clone())
        .unwrap();
    let coordinator = TransferCoordinator::new(roles);
    let mut ctx = LedgerContext::new(
        MemoryLedger::new(),
        Rate::from_raw(PRECISION / 1_000_000_000_000),
        Timestamp::new(0),
    );
    for i in 0..accounts {
        let rate = Rate::from_raw(PRECISION / 1_000_000_000_000 / (i as u128 + 1));
        coordinator
            .mint(
                &mut ctx,
                &minter,
                &AccountId::new(format!("acct-{i}")),
                1_000 * PRECISION,
                rate,
                Timestamp::new(0),
            )
            .unwrap();
    }
    (ctx, coordinator)
}

fn bench_effective_balance(c: &mut Criterion) {
    let mut group = c.benchmark_group("effective_balance");

    for accounts in [1, 100, 10_000] {
        let (ctx, _) = funded_ledger(accounts);
        let target = AccountId::new(format!("acct-{}", accounts / 2));
        let now = Timestamp::new(86_400);

        group.bench_with_input(BenchmarkId::new("read", accounts), &accounts, |b, _| {
            b.iter(|| {
                black_box(
                    AccrualEngine
                        .effective_balance(black_box(&ctx), black_box(&target), black_box(now))
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_settle(c: &mut Criterion) {
    let (mut ctx, coordinator) = funded_ledger(100);
    let target = AccountId::new("acct-7");
    let mut secs = 0u64;

    c.bench_function("settle_advancing_clock", |b| {
        b.iter(|| {
            secs += 1;
            black_box(
                coordinator
                    .settle(&mut ctx, black_box(&target), Timestamp::new(secs))
                    .unwrap(),
            )
        });
    });
}

fn bench_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("transfer");
    let (mut ctx, coordinator) = funded_ledger(2);
    let a = AccountId::new("acct-0");
    let b = AccountId::new("acct-1");
    let mut secs = 0u64;

    group.bench_function("ping_pong", |bench| {
        bench.iter(|| {
            secs += 1;
            let now = Timestamp::new(secs);
            coordinator
                .transfer(&mut ctx, &a, &b, TransferAmount::Exact(1), now)
                .unwrap();
            coordinator
                .transfer(&mut ctx, &b, &a, TransferAmount::Exact(1), now)
                .unwrap();
        });
    });

    let empty = AccountId::new("fresh");
    group.bench_function("transfer_all_round_trip", |bench| {
        bench.iter(|| {
            secs += 1;
            let now = Timestamp::new(secs);
            coordinator
                .transfer(&mut ctx, &a, &empty, TransferAmount::All, now)
                .unwrap();
            coordinator
                .transfer(&mut ctx, &empty, &a, TransferAmount::All, now)
                .unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_effective_balance, bench_settle, bench_transfer);
criterion_main!(benches);
