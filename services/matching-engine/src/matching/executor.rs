//! Trade execution logic
//!
//! Plans fills against the opposite book, settles each fill through a
//! ledger transaction, and stamps the resulting trades with a monotonic
//! sequence. Planning is read-only and settlement is staged, so nothing is
//! visible until the engine commits.

use tracing::debug;
use types::errors::{ExchangeError, LedgerError};
use types::ids::{Address, OrderId, Ticker, TradeId};
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::trade::Trade;

use crate::book::OrderBook;
use crate::ledger::LedgerTx;
use crate::matching::crossing::{incoming_can_match, PriceLimit};

/// One intended match against a resting order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFill {
    pub maker_order_id: OrderId,
    pub maker: Address,
    /// Maker's limit price; every fill executes here
    pub price: Price,
    pub quantity: Quantity,
}

/// Where the taker's side of a fill is paid from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakerFunding {
    /// Limit taker: collateral was locked up front at its limit price
    Locked { limit: Price },
    /// Market taker: paid directly out of free balance
    Free,
}

/// Parties and assets of the incoming order
#[derive(Debug, Clone, Copy)]
pub struct Taker<'a> {
    pub trader: &'a Address,
    pub side: Side,
    pub ticker: &'a Ticker,
    pub quote: &'a Ticker,
    pub funding: TakerFunding,
}

/// Walk the opposite side in price-time priority and collect fills until
/// `amount` is exhausted, the book runs out, or prices stop crossing.
pub fn plan_fills(
    book: &OrderBook,
    taker_side: Side,
    limit: PriceLimit,
    amount: Quantity,
) -> Vec<PlannedFill> {
    let mut fills = Vec::new();
    let mut remaining = amount;

    for maker in book.iter(taker_side.opposite()) {
        if remaining.is_zero() || !incoming_can_match(taker_side, limit, maker.price) {
            break;
        }
        let quantity = remaining.min(maker.remaining());
        fills.push(PlannedFill {
            maker_order_id: maker.id,
            maker: maker.trader.clone(),
            price: maker.price,
            quantity,
        });
        remaining = remaining.saturating_sub(quantity);
    }

    fills
}

/// Move the value of one fill between taker and maker
///
/// The maker side always pays out of its locked collateral. The taker pays
/// out of its own lock (limit) or free balance (market); a limit buyer that
/// fills below its limit gets the difference unlocked.
pub fn settle_fill(tx: &mut LedgerTx<'_>, taker: &Taker<'_>, fill: &PlannedFill) -> Result<(), ExchangeError> {
    let cost = fill
        .quantity
        .checked_mul(fill.price)
        .ok_or(ExchangeError::AmountOverflow)?;

    match taker.side {
        // Maker is a seller: holds locked `ticker`, wants quote
        Side::Buy => {
            tx.unlock_and_transfer(&fill.maker, taker.ticker, fill.quantity, taker.trader)?;
            match taker.funding {
                TakerFunding::Locked { limit } => {
                    tx.unlock_and_transfer(taker.trader, taker.quote, cost, &fill.maker)?;
                    let reserved = fill
                        .quantity
                        .checked_mul(limit)
                        .ok_or(ExchangeError::AmountOverflow)?;
                    let improvement = reserved
                        .checked_sub(cost)
                        .ok_or(ExchangeError::AmountOverflow)?;
                    if !improvement.is_zero() {
                        tx.unlock(taker.trader, taker.quote, improvement)?;
                    }
                }
                TakerFunding::Free => {
                    tx.debit_free(taker.trader, taker.quote, cost)
                        .map_err(|e| shortfall(e, taker.side, taker.ticker))?;
                    tx.credit(&fill.maker, taker.quote, cost)?;
                }
            }
        }
        // Maker is a buyer: holds locked quote, wants `ticker`
        Side::Sell => {
            tx.unlock_and_transfer(&fill.maker, taker.quote, cost, taker.trader)?;
            match taker.funding {
                TakerFunding::Locked { .. } => {
                    tx.unlock_and_transfer(taker.trader, taker.ticker, fill.quantity, &fill.maker)?;
                }
                TakerFunding::Free => {
                    tx.debit_free(taker.trader, taker.ticker, fill.quantity)
                        .map_err(|e| shortfall(e, taker.side, taker.ticker))?;
                    tx.credit(&fill.maker, taker.ticker, fill.quantity)?;
                }
            }
        }
    }

    debug!(
        ticker = %taker.ticker,
        maker_order_id = %fill.maker_order_id,
        maker = %fill.maker,
        taker = %taker.trader,
        price = %fill.price,
        quantity = %fill.quantity,
        "Fill settled"
    );
    Ok(())
}

/// Map a free-balance shortfall to the side-specific error
///
/// Buyers spend quote, sellers spend the traded token.
pub fn shortfall(err: LedgerError, side: Side, ticker: &Ticker) -> ExchangeError {
    match err {
        LedgerError::InsufficientFree {
            required, available, ..
        } => match side {
            Side::Buy => ExchangeError::InsufficientQuoteBalance { required, available },
            Side::Sell => ExchangeError::InsufficientTokenBalance {
                ticker: ticker.to_string(),
                required,
                available,
            },
        },
        other => ExchangeError::Ledger(other),
    }
}

/// Trade recorder with sequence generation
#[derive(Debug, Clone)]
pub struct MatchExecutor {
    sequence_counter: u64,
}

impl MatchExecutor {
    /// Create a new match executor with starting sequence number
    pub fn new(starting_sequence: u64) -> Self {
        Self {
            sequence_counter: starting_sequence,
        }
    }

    /// Get next sequence number (monotonically increasing)
    fn next_sequence(&mut self) -> u64 {
        let seq = self.sequence_counter;
        self.sequence_counter += 1;
        seq
    }

    /// Record a settled fill as a trade
    pub fn record_trade(
        &mut self,
        ticker: Ticker,
        fill: &PlannedFill,
        taker_order_id: OrderId,
        taker: &Address,
        taker_side: Side,
        executed_at: i64,
    ) -> Trade {
        Trade {
            trade_id: TradeId::new(),
            sequence: self.next_sequence(),
            ticker,
            maker_order_id: fill.maker_order_id,
            taker_order_id,
            maker: fill.maker.clone(),
            taker: taker.clone(),
            side: taker_side,
            price: fill.price,
            quantity: fill.quantity,
            executed_at,
        }
    }
}
