use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use matching_engine::{BalanceLedger, MatchingEngine};
use types::ids::{Address, Ticker};
use types::numeric::Amount;
use types::order::{OrderRequest, Side};

const RESTING_ORDERS: u64 = 1_000;

fn seeded() -> (MatchingEngine, BalanceLedger, Address, Ticker) {
    let quote = Ticker::new("DAI").unwrap();
    let token = Ticker::new("BAT").unwrap();
    let maker = Address::from("maker");
    let taker = Address::from("taker");

    let mut ledger = BalanceLedger::new();
    ledger.credit(&maker, &token, Amount::from(RESTING_ORDERS * 100)).unwrap();
    ledger.credit(&taker, &quote, Amount::from(u64::MAX)).unwrap();

    let mut engine = MatchingEngine::new(quote, 0);
    for i in 0..RESTING_ORDERS {
        let price = Amount::from(1_000 + (i % 50));
        engine
            .create_limit_order(
                &mut ledger,
                &OrderRequest::new(maker.clone(), token, Side::Sell, Amount::from(100), 0),
                price,
            )
            .unwrap();
    }
    (engine, ledger, taker, token)
}

fn bench_limit_insert(c: &mut Criterion) {
    c.bench_function("limit_order_rest", |b| {
        b.iter_batched(
            seeded,
            |(mut engine, mut ledger, taker, token)| {
                for i in 0..100u64 {
                    let price = Amount::from(900 - (i % 50));
                    let request = OrderRequest::new(taker.clone(), token, Side::Buy, Amount::from(10), 0);
                    engine.create_limit_order(&mut ledger, &request, price).unwrap();
                }
                black_box(engine.next_order_id())
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_market_sweep(c: &mut Criterion) {
    c.bench_function("market_buy_sweep", |b| {
        b.iter_batched(
            seeded,
            |(mut engine, mut ledger, taker, token)| {
                let request = OrderRequest::new(taker, token, Side::Buy, Amount::from(50_000), 0);
                let result = engine.create_market_order(&mut ledger, &request).unwrap();
                black_box(result.trades().len())
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_cancel(c: &mut Criterion) {
    c.bench_function("cancel_resting", |b| {
        b.iter_batched(
            seeded,
            |(mut engine, mut ledger, _, token)| {
                let maker = Address::from("maker");
                let ids: Vec<_> = engine.orders(&token, Side::Sell).iter().map(|o| o.id).collect();
                for id in ids.into_iter().take(100) {
                    engine
                        .cancel_order(&mut ledger, &maker, token, Side::Sell, id)
                        .unwrap();
                }
                black_box(engine.orders(&token, Side::Sell).len())
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_limit_insert, bench_market_sweep, bench_cancel);
criterion_main!(benches);
