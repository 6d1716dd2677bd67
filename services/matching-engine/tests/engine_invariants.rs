//! Engine Invariant Tests
//!
//! Random order flow against a fixed set of funded traders:
//! - Value conservation per asset
//! - Sorted, uncrossed books
//! - Locked balances back exactly the resting collateral
//! - Rejected operations leave no trace

use matching_engine::{BalanceLedger, MatchingEngine};
use proptest::prelude::*;
use types::ids::{Address, Ticker};
use types::numeric::Amount;
use types::order::{OrderRequest, OrderStatus, Side};

const TRADERS: [&str; 3] = ["alice", "bob", "carol"];
const QUOTE_FUNDING: u64 = 1_000_000;
const TOKEN_FUNDING: u64 = 10_000;

#[derive(Debug, Clone)]
enum Action {
    Limit { trader: usize, side: Side, amount: u64, price: u64 },
    Market { trader: usize, side: Side, amount: u64 },
    CancelBest { side: Side },
}

fn dai() -> Ticker {
    Ticker::new("DAI").unwrap()
}

fn bat() -> Ticker {
    Ticker::new("BAT").unwrap()
}

fn funded() -> (MatchingEngine, BalanceLedger) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let mut ledger = BalanceLedger::new();
    for name in TRADERS {
        let trader = Address::from(name);
        ledger.credit(&trader, &dai(), Amount::from(QUOTE_FUNDING)).unwrap();
        ledger.credit(&trader, &bat(), Amount::from(TOKEN_FUNDING)).unwrap();
    }
    (MatchingEngine::new(dai(), 0), ledger)
}

fn request(trader: &Address, side: Side, amount: Amount, timestamp: i64) -> OrderRequest {
    OrderRequest::new(trader.clone(), bat(), side, amount, timestamp)
}

fn side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Buy), Just(Side::Sell)]
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (0..TRADERS.len(), side(), 1u64..500, 1u64..20)
            .prop_map(|(trader, side, amount, price)| Action::Limit { trader, side, amount, price }),
        2 => (0..TRADERS.len(), side(), 1u64..500)
            .prop_map(|(trader, side, amount)| Action::Market { trader, side, amount }),
        1 => side().prop_map(|side| Action::CancelBest { side }),
    ]
}

fn apply(engine: &mut MatchingEngine, ledger: &mut BalanceLedger, action: &Action) {
    match action {
        Action::Limit { trader, side, amount, price } => {
            let request = OrderRequest::new(Address::from(TRADERS[*trader]), bat(), *side, Amount::from(*amount), 0);
            let _ = engine.create_limit_order(ledger, &request, Amount::from(*price));
        }
        Action::Market { trader, side, amount } => {
            let request = OrderRequest::new(Address::from(TRADERS[*trader]), bat(), *side, Amount::from(*amount), 0);
            let _ = engine.create_market_order(ledger, &request);
        }
        Action::CancelBest { side } => {
            if let Some(best) = engine.best_order(&bat(), *side).cloned() {
                engine
                    .cancel_order(ledger, &best.trader, bat(), *side, best.id)
                    .unwrap();
            }
        }
    }
}

proptest! {
    /// Fills only move value between traders.
    #[test]
    fn fuzz_value_conservation(actions in prop::collection::vec(action(), 1..60)) {
        let (mut engine, mut ledger) = funded();
        for action in &actions {
            apply(&mut engine, &mut ledger, action);
        }

        let traders = TRADERS.len() as u64;
        prop_assert_eq!(ledger.total_held(&dai()), Some(Amount::from(QUOTE_FUNDING * traders)));
        prop_assert_eq!(ledger.total_held(&bat()), Some(Amount::from(TOKEN_FUNDING * traders)));
    }

    /// Books stay in priority order and never cross after matching.
    #[test]
    fn fuzz_books_sorted_and_uncrossed(actions in prop::collection::vec(action(), 1..60)) {
        let (mut engine, mut ledger) = funded();
        for action in &actions {
            apply(&mut engine, &mut ledger, action);
        }

        let bids = engine.orders(&bat(), Side::Buy);
        let asks = engine.orders(&bat(), Side::Sell);
        for pair in bids.windows(2) {
            prop_assert!(pair[0].price >= pair[1].price);
        }
        for pair in asks.windows(2) {
            prop_assert!(pair[0].price <= pair[1].price);
        }
        if let (Some(bid), Some(ask)) = (bids.first(), asks.first()) {
            prop_assert!(bid.price < ask.price);
        }
        for order in bids.iter().chain(asks.iter()) {
            prop_assert!(!order.remaining().is_zero());
            prop_assert!(order.filled() <= order.amount);
        }
    }

    /// Each trader's locked balance equals the collateral of its resting orders.
    #[test]
    fn fuzz_locked_matches_resting_collateral(actions in prop::collection::vec(action(), 1..60)) {
        let (mut engine, mut ledger) = funded();
        for action in &actions {
            apply(&mut engine, &mut ledger, action);
        }

        for name in TRADERS {
            let trader = Address::from(name);
            let mut quote_locked = Amount::ZERO;
            let mut token_locked = Amount::ZERO;
            for order in engine.orders(&bat(), Side::Buy).iter().filter(|o| o.trader == trader) {
                let collateral = order.remaining().checked_mul(order.price).unwrap();
                quote_locked = quote_locked.checked_add(collateral).unwrap();
            }
            for order in engine.orders(&bat(), Side::Sell).iter().filter(|o| o.trader == trader) {
                token_locked = token_locked.checked_add(order.remaining()).unwrap();
            }
            prop_assert_eq!(ledger.balance(&trader, &dai()).locked, quote_locked);
            prop_assert_eq!(ledger.balance(&trader, &bat()).locked, token_locked);
        }
    }

    /// Archived orders are terminal and never reappear in the book.
    #[test]
    fn fuzz_history_is_terminal(actions in prop::collection::vec(action(), 1..60)) {
        let (mut engine, mut ledger) = funded();
        for action in &actions {
            apply(&mut engine, &mut ledger, action);
        }

        for side in [Side::Buy, Side::Sell] {
            let resting: Vec<_> = engine.orders(&bat(), side).iter().map(|o| o.id).collect();
            for order in engine.historical_orders(&bat(), side) {
                prop_assert!(order.status.is_terminal());
                prop_assert!(!resting.contains(&order.id));
                if order.status == OrderStatus::Filled {
                    prop_assert_eq!(order.filled(), order.amount);
                }
            }
        }
    }

    /// A limit order that cannot be collateralised changes nothing.
    #[test]
    fn fuzz_rejected_limit_is_noop(
        actions in prop::collection::vec(action(), 0..30),
        price in 1u64..20,
    ) {
        let (mut engine, mut ledger) = funded();
        for action in &actions {
            apply(&mut engine, &mut ledger, action);
        }

        let alice = Address::from("alice");
        let before_quote = ledger.balance(&alice, &dai());
        let before_token = ledger.balance(&alice, &bat());
        let before_bids = engine.orders(&bat(), Side::Buy);
        let before_asks = engine.orders(&bat(), Side::Sell);
        let before_id = engine.next_order_id();

        let too_much = Amount::from(QUOTE_FUNDING * TRADERS.len() as u64 + 1);
        let request = OrderRequest::new(alice.clone(), bat(), Side::Buy, too_much, 0);
        let result = engine.create_limit_order(&mut ledger, &request, Amount::from(price));

        prop_assert!(result.is_err());
        prop_assert_eq!(ledger.balance(&alice, &dai()), before_quote);
        prop_assert_eq!(ledger.balance(&alice, &bat()), before_token);
        prop_assert_eq!(engine.orders(&bat(), Side::Buy), before_bids);
        prop_assert_eq!(engine.orders(&bat(), Side::Sell), before_asks);
        prop_assert_eq!(engine.next_order_id(), before_id);
    }
}

#[test]
fn test_price_time_priority_within_level() {
    let (mut engine, mut ledger) = funded();
    let alice = Address::from("alice");
    let bob = Address::from("bob");
    let carol = Address::from("carol");

    let first = engine
        .create_limit_order(&mut ledger, &request(&alice, Side::Sell, Amount::from(10), 0), Amount::from(5))
        .unwrap();
    engine
        .create_limit_order(&mut ledger, &request(&bob, Side::Sell, Amount::from(10), 1), Amount::from(5))
        .unwrap();

    let result = engine
        .create_limit_order(&mut ledger, &request(&carol, Side::Buy, Amount::from(10), 2), Amount::from(5))
        .unwrap();

    assert_eq!(result.trades().len(), 1);
    assert_eq!(result.trades()[0].maker_order_id, first.order().id);
    assert_eq!(result.trades()[0].maker, alice);
    assert_eq!(engine.orders(&bat(), Side::Sell)[0].trader, bob);
}

#[test]
fn test_market_remainder_is_closed() {
    let (mut engine, mut ledger) = funded();
    let alice = Address::from("alice");
    let bob = Address::from("bob");

    engine
        .create_limit_order(&mut ledger, &request(&alice, Side::Sell, Amount::from(10), 0), Amount::from(5))
        .unwrap();
    let result = engine
        .create_market_order(&mut ledger, &request(&bob, Side::Buy, Amount::from(25), 1))
        .unwrap();

    assert_eq!(result.order().status, OrderStatus::Closed);
    assert_eq!(result.order().filled(), Amount::from(10));
    assert!(engine.orders(&bat(), Side::Sell).is_empty());
    let history = engine.historical_orders(&bat(), Side::Buy);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, result.order().id);
}
