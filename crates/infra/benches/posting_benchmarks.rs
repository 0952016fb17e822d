//! Benchmarks for posting throughput and balance recalculation.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use openbooks_accounting::{AccountKind, Ledger, LineInput, NewAccount, NewJournalEntry};
use openbooks_core::{AccountId, TenantId, UserId};
use openbooks_infra::InMemoryLedgerStore;

fn setup_books() -> (Ledger<InMemoryLedgerStore>, TenantId, UserId, AccountId, AccountId) {
    let ledger = Ledger::new(InMemoryLedgerStore::new());
    let tenant = TenantId::new();
    let user = UserId::new();
    let cash = ledger
        .create_account(
            tenant,
            NewAccount {
                code: "1000".to_string(),
                name: "Cash".to_string(),
                kind: AccountKind::Asset,
                parent_id: None,
                opening_balance: None,
                description: None,
            },
        )
        .unwrap()
        .id;
    let sales = ledger
        .create_account(
            tenant,
            NewAccount {
                code: "4000".to_string(),
                name: "Sales Revenue".to_string(),
                kind: AccountKind::Revenue,
                parent_id: None,
                opening_balance: None,
                description: None,
            },
        )
        .unwrap()
        .id;
    (ledger, tenant, user, cash, sales)
}

fn post_one(
    ledger: &Ledger<InMemoryLedgerStore>,
    tenant: TenantId,
    user: UserId,
    cash: AccountId,
    sales: AccountId,
    day: u32,
) {
    let entry = ledger
        .create_entry(
            tenant,
            NewJournalEntry {
                entry_date: NaiveDate::from_ymd_opt(2026, 1 + day / 28, 1 + day % 28).unwrap(),
                description: "bench entry".to_string(),
                lines: vec![
                    LineInput::debit(cash, Decimal::new(1250, 2)),
                    LineInput::credit(sales, Decimal::new(1250, 2)),
                ],
                reference: None,
                created_by: user,
            },
        )
        .unwrap();
    ledger.post_entry(tenant, entry.id, user).unwrap();
}

fn bench_posting(c: &mut Criterion) {
    let mut group = c.benchmark_group("posting");
    for entries in [10u32, 100] {
        group.throughput(Throughput::Elements(entries as u64));
        group.bench_with_input(
            BenchmarkId::new("create_and_post", entries),
            &entries,
            |b, &entries| {
                b.iter(|| {
                    let (ledger, tenant, user, cash, sales) = setup_books();
                    for i in 0..entries {
                        post_one(&ledger, tenant, user, cash, sales, i % 300);
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_recalculation(c: &mut Criterion) {
    let mut group = c.benchmark_group("recalculation");
    for entries in [100u32] {
        group.throughput(Throughput::Elements(entries as u64));
        group.bench_with_input(
            BenchmarkId::new("replay_all_accounts", entries),
            &entries,
            |b, &entries| {
                let (ledger, tenant, user, cash, sales) = setup_books();
                for i in 0..entries {
                    post_one(&ledger, tenant, user, cash, sales, i % 300);
                }
                b.iter(|| ledger.recalculate_balances(tenant, None).unwrap());
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_posting, bench_recalculation);
criterion_main!(benches);
