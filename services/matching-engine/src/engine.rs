//! Matching engine core
//!
//! Main coordinator for order books, matching, settlement and
//! cancellation. Every entry point follows the same shape:
//!
//! 1. validate, reserve the order id and plan against the current book
//!    (read-only)
//! 2. stage all balance movements in a ledger transaction
//! 3. commit, then advance the id counter and apply fills and book
//!    mutations, none of which can fail
//!
//! A failure in steps 1-2 returns before anything is written.

use std::collections::HashMap;
use tracing::info;
use types::errors::ExchangeError;
use types::ids::{Address, OrderId, Ticker};
use types::numeric::{Amount, Price};
use types::order::{Order, OrderRequest, OrderStatus, Side};
use types::trade::Trade;

use crate::book::{DepthLevel, OrderBook};
use crate::ledger::BalanceLedger;
use crate::matching::crossing::PriceLimit;
use crate::matching::executor::{
    plan_fills, settle_fill, shortfall, MatchExecutor, PlannedFill, Taker, TakerFunding,
};

/// Main matching engine
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    /// Settlement asset; never traded itself
    quote: Ticker,
    /// Order books per ticker
    books: HashMap<Ticker, OrderBook>,
    /// Next order id to hand out
    next_order_id: u64,
    /// Trade executor with sequence generation
    executor: MatchExecutor,
    /// Terminal orders per (ticker, side), in order of completion
    history: HashMap<(Ticker, Side), Vec<Order>>,
}

/// Result of submitting an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    /// Limit order was added to book (no match)
    Resting { order: Order },
    /// Limit order was partially filled and the remainder rests
    PartiallyResting { order: Order, trades: Vec<Trade> },
    /// Order was completely filled
    Filled { order: Order, trades: Vec<Trade> },
    /// Market order ran out of liquidity; the remainder was dropped
    Exhausted { order: Order, trades: Vec<Trade> },
}

impl SubmitResult {
    pub fn order(&self) -> &Order {
        match self {
            SubmitResult::Resting { order }
            | SubmitResult::PartiallyResting { order, .. }
            | SubmitResult::Filled { order, .. }
            | SubmitResult::Exhausted { order, .. } => order,
        }
    }

    pub fn trades(&self) -> &[Trade] {
        match self {
            SubmitResult::Resting { .. } => &[],
            SubmitResult::PartiallyResting { trades, .. }
            | SubmitResult::Filled { trades, .. }
            | SubmitResult::Exhausted { trades, .. } => trades,
        }
    }
}

impl MatchingEngine {
    /// Create a new matching engine
    pub fn new(quote: Ticker, first_order_id: u64) -> Self {
        Self {
            quote,
            books: HashMap::new(),
            next_order_id: first_order_id,
            executor: MatchExecutor::new(1),
            history: HashMap::new(),
        }
    }

    pub fn quote(&self) -> &Ticker {
        &self.quote
    }

    /// Id the next accepted order will receive
    pub fn next_order_id(&self) -> u64 {
        self.next_order_id
    }

    /// Place a limit order
    ///
    /// Locks the order's collateral (`amount` of `ticker` for a sell,
    /// `amount * price` of quote for a buy), matches against every crossing
    /// resting order, and rests whatever remains.
    pub fn create_limit_order(
        &mut self,
        ledger: &mut BalanceLedger,
        request: &OrderRequest,
        price: Price,
    ) -> Result<SubmitResult, ExchangeError> {
        let trader = &request.trader;
        let (ticker, side, amount, timestamp) = (request.ticker, request.side, request.amount, request.timestamp);

        self.check_tradeable(&ticker)?;
        if amount.is_zero() {
            return Err(ExchangeError::InvalidAmount);
        }
        if price.is_zero() {
            return Err(ExchangeError::InvalidPrice);
        }

        let (collateral_asset, collateral) = match side {
            Side::Sell => (ticker, amount),
            Side::Buy => (
                self.quote,
                amount.checked_mul(price).ok_or(ExchangeError::AmountOverflow)?,
            ),
        };

        let (order_id, next_order_id) = self.reserve_order_id()?;
        let fills = match self.books.get(&ticker) {
            Some(book) => plan_fills(book, side, PriceLimit::Limit(price), amount),
            None => Vec::new(),
        };

        let mut tx = ledger.begin();
        tx.lock(trader, &collateral_asset, collateral)
            .map_err(|e| shortfall(e, side, &ticker))?;
        let taker = Taker {
            trader,
            side,
            ticker: &ticker,
            quote: &self.quote,
            funding: TakerFunding::Locked { limit: price },
        };
        for fill in &fills {
            settle_fill(&mut tx, &taker, fill)?;
        }
        tx.commit();
        self.next_order_id = next_order_id;

        let mut order = Order::limit(order_id, trader.clone(), ticker, side, amount, price, timestamp);
        let trades = self.apply_fills(&mut order, &fills, timestamp);

        info!(
            order_id = %order.id,
            trader = %trader,
            ticker = %ticker,
            side = ?side,
            amount = %amount,
            price = %price,
            fills = trades.len(),
            "Limit order accepted"
        );

        if order.is_filled() {
            self.archive(order.clone());
            Ok(SubmitResult::Filled { order, trades })
        } else {
            self.books
                .entry(ticker)
                .or_insert_with(|| OrderBook::new(ticker))
                .insert(order.clone());
            if trades.is_empty() {
                Ok(SubmitResult::Resting { order })
            } else {
                Ok(SubmitResult::PartiallyResting { order, trades })
            }
        }
    }

    /// Place a market order
    ///
    /// Requires liquidity on the opposite side. Fills at resting prices until
    /// `amount` is met or the book is empty; any remainder is dropped. The
    /// taker pays straight from its free balance.
    pub fn create_market_order(
        &mut self,
        ledger: &mut BalanceLedger,
        request: &OrderRequest,
    ) -> Result<SubmitResult, ExchangeError> {
        let trader = &request.trader;
        let (ticker, side, amount, timestamp) = (request.ticker, request.side, request.amount, request.timestamp);

        self.check_tradeable(&ticker)?;
        if amount.is_zero() {
            return Err(ExchangeError::InvalidAmount);
        }

        let book = self
            .books
            .get(&ticker)
            .filter(|book| !book.is_empty(side.opposite()))
            .ok_or(ExchangeError::EmptyOrderBook {
                ticker: ticker.to_string(),
            })?;

        match side {
            Side::Sell => {
                let available = ledger.balance(trader, &ticker).free;
                if available < amount {
                    return Err(ExchangeError::InsufficientTokenBalance {
                        ticker: ticker.to_string(),
                        required: amount.to_string(),
                        available: available.to_string(),
                    });
                }
            }
            Side::Buy => {
                let available = ledger.balance(trader, &self.quote).free;
                let best = book.best_price(Side::Sell).unwrap_or(Amount::ZERO);
                let required = amount
                    .checked_mul(best)
                    .ok_or(ExchangeError::AmountOverflow)?;
                if available < required {
                    return Err(ExchangeError::InsufficientQuoteBalance {
                        required: required.to_string(),
                        available: available.to_string(),
                    });
                }
            }
        }

        let (order_id, next_order_id) = self.reserve_order_id()?;
        let fills = plan_fills(book, side, PriceLimit::Any, amount);

        let mut tx = ledger.begin();
        let taker = Taker {
            trader,
            side,
            ticker: &ticker,
            quote: &self.quote,
            funding: TakerFunding::Free,
        };
        for fill in &fills {
            settle_fill(&mut tx, &taker, fill)?;
        }
        tx.commit();
        self.next_order_id = next_order_id;

        let mut order = Order::market(order_id, trader.clone(), ticker, side, amount, timestamp);
        let trades = self.apply_fills(&mut order, &fills, timestamp);

        info!(
            order_id = %order.id,
            trader = %trader,
            ticker = %ticker,
            side = ?side,
            amount = %amount,
            filled = %order.filled(),
            fills = trades.len(),
            "Market order executed"
        );

        if order.is_filled() {
            self.archive(order.clone());
            Ok(SubmitResult::Filled { order, trades })
        } else {
            order.status = OrderStatus::Closed;
            self.archive(order.clone());
            Ok(SubmitResult::Exhausted { order, trades })
        }
    }

    /// Cancel a resting order
    ///
    /// Unlocks the unfilled collateral (`remaining` of `ticker` for a sell,
    /// `remaining * price` of quote for a buy) and removes the order.
    pub fn cancel_order(
        &mut self,
        ledger: &mut BalanceLedger,
        trader: &Address,
        ticker: Ticker,
        side: Side,
        order_id: OrderId,
    ) -> Result<Order, ExchangeError> {
        let not_found = ExchangeError::OrderNotFound {
            order_id: order_id.value(),
        };
        let book = self.books.get_mut(&ticker).ok_or(not_found.clone())?;
        let order = book.get(side, &order_id).ok_or(not_found)?;
        if order.trader != *trader {
            return Err(ExchangeError::NotOrderOwner {
                order_id: order_id.value(),
            });
        }

        let remaining = order.remaining();
        let (asset, refund) = match side {
            Side::Sell => (ticker, remaining),
            Side::Buy => (
                self.quote,
                remaining
                    .checked_mul(order.price)
                    .ok_or(ExchangeError::AmountOverflow)?,
            ),
        };
        ledger.unlock(trader, &asset, refund)?;

        let mut cancelled = book.remove(side, &order_id)?;
        cancelled.status = OrderStatus::Cancelled;

        info!(
            order_id = %order_id,
            trader = %trader,
            ticker = %ticker,
            side = ?side,
            refund = %refund,
            "Order cancelled"
        );

        self.archive(cancelled.clone());
        Ok(cancelled)
    }

    /// Resting orders of one side, in price-time priority
    pub fn orders(&self, ticker: &Ticker, side: Side) -> Vec<Order> {
        self.books
            .get(ticker)
            .map(|book| book.snapshot(side))
            .unwrap_or_default()
    }

    /// Best resting order of one side
    pub fn best_order(&self, ticker: &Ticker, side: Side) -> Option<&Order> {
        self.books.get(ticker)?.best_order(side)
    }

    /// Terminal orders of one side, oldest completion first
    pub fn historical_orders(&self, ticker: &Ticker, side: Side) -> &[Order] {
        self.history
            .get(&(*ticker, side))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Aggregated price levels of one side
    pub fn depth(&self, ticker: &Ticker, side: Side) -> Vec<DepthLevel> {
        self.books
            .get(ticker)
            .map(|book| book.depth(side))
            .unwrap_or_default()
    }

    pub fn book(&self, ticker: &Ticker) -> Option<&OrderBook> {
        self.books.get(ticker)
    }

    fn check_tradeable(&self, ticker: &Ticker) -> Result<(), ExchangeError> {
        if *ticker == self.quote {
            return Err(ExchangeError::QuoteAssetNotTradeable {
                ticker: ticker.to_string(),
            });
        }
        Ok(())
    }

    /// Id for the incoming order and the counter value after it
    ///
    /// The counter only moves once the order's ledger changes commit.
    fn reserve_order_id(&self) -> Result<(OrderId, u64), ExchangeError> {
        let next = self
            .next_order_id
            .checked_add(1)
            .ok_or(ExchangeError::OrderIdExhausted)?;
        Ok((OrderId::new(self.next_order_id), next))
    }

    /// Append committed fills to makers and taker, retire filled makers,
    /// and record trades.
    fn apply_fills(&mut self, taker: &mut Order, fills: &[PlannedFill], timestamp: i64) -> Vec<Trade> {
        let mut trades = Vec::with_capacity(fills.len());
        let maker_side = taker.side.opposite();

        for fill in fills {
            let finished = match self.books.get_mut(&taker.ticker) {
                Some(book) => book.apply_fill(maker_side, &fill.maker_order_id, fill.quantity),
                None => None,
            };
            if let Some(maker) = finished {
                self.archive(maker);
            }
            let applied = taker.add_fill(fill.quantity);
            debug_assert!(applied, "planned fills exceed taker amount");
            trades.push(self.executor.record_trade(
                taker.ticker,
                fill,
                taker.id,
                &taker.trader,
                taker.side,
                timestamp,
            ));
        }

        trades
    }

    fn archive(&mut self, order: Order) {
        self.history
            .entry((order.ticker, order.side))
            .or_default()
            .push(order);
    }
}
