//! Dex: the exchange contract
//!
//! Single entry point for traders, the admin and any presentation layer.
//! Every call resolves its ticker through the registry before touching the
//! ledger, the books or a token. Calls run to completion one at a time and a
//! rejected call leaves no trace: no balance change, no book change, no event.

use chrono::Utc;
use matching_engine::{BalanceLedger, DepthLevel, MatchingEngine, SubmitResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use types::account::Balance;
use types::asset::Asset;
use types::errors::ExchangeError;
use types::ids::{Address, OrderId, Ticker};
use types::numeric::{Amount, Price, Quantity};
use types::order::{Order, OrderKind, OrderRequest, Side};

use crate::config::{ConfigError, DexConfig};
use crate::events::{
    AdminChanged, AssetRegistered, ContractEvent, Deposited, OrderCancelled, OrderPlaced, Withdrawn,
};
use crate::registry::AssetRegistry;
use crate::security::AccessControl;
use crate::token::Token;
use crate::vault::Vault;

/// Balance rendered in whole units for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceView {
    pub free: Decimal,
    pub locked: Decimal,
}

/// On-chain order-book exchange
#[derive(Debug)]
pub struct Dex {
    config: DexConfig,
    access_control: AccessControl,
    registry: AssetRegistry,
    vault: Vault,
    ledger: BalanceLedger,
    engine: MatchingEngine,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
}

impl Dex {
    /// Deploy an exchange from a validated configuration.
    pub fn new(config: DexConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let quote = config.quote()?;
        info!(
            admin = %config.admin,
            exchange = %config.exchange_address,
            quote = %quote,
            "Exchange deployed"
        );
        Ok(Self {
            access_control: AccessControl::new(config.admin.clone()),
            registry: AssetRegistry::new(quote),
            vault: Vault::new(config.exchange_address.clone()),
            ledger: BalanceLedger::new(),
            engine: MatchingEngine::new(quote, config.first_order_id),
            events: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &DexConfig {
        &self.config
    }

    pub fn quote(&self) -> &Ticker {
        self.registry.quote()
    }

    // ───────────────────────── Asset Registry ─────────────────────────

    /// Register an asset and take custody of its token handle. Admin-only.
    pub fn register_asset(
        &mut self,
        caller: &Address,
        ticker: Ticker,
        token: Box<dyn Token>,
    ) -> Result<(), ExchangeError> {
        self.try_register_asset(caller, ticker, token)
            .inspect_err(|err| warn!(caller = %caller, ticker = %ticker, error = %err, "Asset registration rejected"))
    }

    fn try_register_asset(
        &mut self,
        caller: &Address,
        ticker: Ticker,
        token: Box<dyn Token>,
    ) -> Result<(), ExchangeError> {
        self.access_control.ensure_admin(caller)?;
        let handle = token.address().clone();
        self.registry.register(ticker, handle.clone())?;
        self.vault.attach(ticker, token);

        info!(ticker = %ticker, handle = %handle, "Asset registered");
        self.events
            .push(ContractEvent::AssetRegistered(AssetRegistered { ticker, handle }));
        Ok(())
    }

    /// All registered assets in registration order.
    pub fn assets(&self) -> &[Asset] {
        self.registry.list_assets()
    }

    pub fn tickers(&self) -> Vec<Ticker> {
        self.registry.list_tickers()
    }

    /// Token contract address of a registered ticker.
    pub fn resolve(&self, ticker: &Ticker) -> Result<&Address, ExchangeError> {
        self.registry.resolve(ticker)
    }

    // ───────────────────────── Deposit / Withdraw ─────────────────────────

    /// Pull `amount` from the trader's wallet and credit it to free balance.
    ///
    /// The trader must have approved the exchange address on the token.
    pub fn deposit(&mut self, trader: &Address, ticker: Ticker, amount: Amount) -> Result<(), ExchangeError> {
        self.try_deposit(trader, ticker, amount)
            .inspect_err(|err| warn!(trader = %trader, ticker = %ticker, amount = %amount, error = %err, "Deposit rejected"))
    }

    fn try_deposit(&mut self, trader: &Address, ticker: Ticker, amount: Amount) -> Result<(), ExchangeError> {
        self.ensure_not_custody(trader)?;
        if amount.is_zero() {
            return Err(ExchangeError::InvalidAmount);
        }
        self.registry.resolve(&ticker)?;

        let mut tx = self.ledger.begin();
        tx.credit(trader, &ticker, amount)?;
        self.vault.pull(&ticker, trader, amount)?;
        tx.commit();

        info!(trader = %trader, ticker = %ticker, amount = %amount, "Deposit credited");
        self.events.push(ContractEvent::Deposited(Deposited {
            trader: trader.clone(),
            ticker,
            amount,
        }));
        Ok(())
    }

    /// Debit free balance and push the tokens back to the trader's wallet.
    pub fn withdraw(&mut self, trader: &Address, ticker: Ticker, amount: Amount) -> Result<(), ExchangeError> {
        self.try_withdraw(trader, ticker, amount)
            .inspect_err(|err| warn!(trader = %trader, ticker = %ticker, amount = %amount, error = %err, "Withdrawal rejected"))
    }

    fn try_withdraw(&mut self, trader: &Address, ticker: Ticker, amount: Amount) -> Result<(), ExchangeError> {
        self.ensure_not_custody(trader)?;
        if amount.is_zero() {
            return Err(ExchangeError::InvalidAmount);
        }
        self.registry.resolve(&ticker)?;

        let mut tx = self.ledger.begin();
        tx.debit_free(trader, &ticker, amount)?;
        self.vault.push(&ticker, trader, amount)?;
        tx.commit();

        info!(trader = %trader, ticker = %ticker, amount = %amount, "Withdrawal sent");
        self.events.push(ContractEvent::Withdrawn(Withdrawn {
            trader: trader.clone(),
            ticker,
            amount,
        }));
        Ok(())
    }

    // ───────────────────────── Orders ─────────────────────────

    /// Place a limit order; matches immediately against crossing orders.
    pub fn create_limit_order(
        &mut self,
        trader: &Address,
        ticker: Ticker,
        amount: Quantity,
        price: Price,
        side: Side,
    ) -> Result<SubmitResult, ExchangeError> {
        self.try_create_limit_order(trader, ticker, amount, price, side)
            .inspect_err(|err| {
                warn!(
                    trader = %trader,
                    ticker = %ticker,
                    side = ?side,
                    amount = %amount,
                    price = %price,
                    error = %err,
                    "Limit order rejected"
                )
            })
    }

    fn try_create_limit_order(
        &mut self,
        trader: &Address,
        ticker: Ticker,
        amount: Quantity,
        price: Price,
        side: Side,
    ) -> Result<SubmitResult, ExchangeError> {
        self.ensure_not_custody(trader)?;
        self.registry.ensure_tradeable(&ticker)?;
        let request = OrderRequest::new(trader.clone(), ticker, side, amount, now());
        let result = self.engine.create_limit_order(&mut self.ledger, &request, price)?;
        self.record_submission(&result);
        Ok(result)
    }

    /// Take liquidity from the opposite book; any unmet remainder is dropped.
    pub fn create_market_order(
        &mut self,
        trader: &Address,
        ticker: Ticker,
        amount: Quantity,
        side: Side,
    ) -> Result<SubmitResult, ExchangeError> {
        self.try_create_market_order(trader, ticker, amount, side)
            .inspect_err(|err| {
                warn!(
                    trader = %trader,
                    ticker = %ticker,
                    side = ?side,
                    amount = %amount,
                    error = %err,
                    "Market order rejected"
                )
            })
    }

    fn try_create_market_order(
        &mut self,
        trader: &Address,
        ticker: Ticker,
        amount: Quantity,
        side: Side,
    ) -> Result<SubmitResult, ExchangeError> {
        self.ensure_not_custody(trader)?;
        self.registry.ensure_tradeable(&ticker)?;
        let request = OrderRequest::new(trader.clone(), ticker, side, amount, now());
        let result = self.engine.create_market_order(&mut self.ledger, &request)?;
        self.record_submission(&result);
        Ok(result)
    }

    /// Cancel a resting order and unlock its unfilled collateral.
    pub fn cancel_order(
        &mut self,
        trader: &Address,
        ticker: Ticker,
        order_id: OrderId,
        side: Side,
    ) -> Result<Order, ExchangeError> {
        self.try_cancel_order(trader, ticker, order_id, side)
            .inspect_err(|err| {
                warn!(
                    trader = %trader,
                    ticker = %ticker,
                    order_id = %order_id,
                    error = %err,
                    "Cancellation rejected"
                )
            })
    }

    fn try_cancel_order(
        &mut self,
        trader: &Address,
        ticker: Ticker,
        order_id: OrderId,
        side: Side,
    ) -> Result<Order, ExchangeError> {
        self.registry.resolve(&ticker)?;
        let cancelled = self
            .engine
            .cancel_order(&mut self.ledger, trader, ticker, side, order_id)?;
        self.events.push(ContractEvent::OrderCancelled(OrderCancelled {
            order_id,
            trader: trader.clone(),
            ticker,
            side,
            remaining: cancelled.remaining(),
        }));
        Ok(cancelled)
    }

    /// The custody account holds every deposit; it never trades or
    /// keeps a ledger balance of its own.
    fn ensure_not_custody(&self, trader: &Address) -> Result<(), ExchangeError> {
        if trader == self.vault.exchange() {
            return Err(ExchangeError::CustodyAddress {
                address: trader.to_string(),
            });
        }
        Ok(())
    }

    fn record_submission(&mut self, result: &SubmitResult) {
        let order = result.order();
        self.events.push(ContractEvent::OrderPlaced(OrderPlaced {
            order_id: order.id,
            trader: order.trader.clone(),
            ticker: order.ticker,
            side: order.side,
            kind: order.kind,
            amount: order.amount,
            price: match order.kind {
                OrderKind::Limit => order.price,
                OrderKind::Market => Amount::ZERO,
            },
        }));
        self.events.extend(
            result
                .trades()
                .iter()
                .cloned()
                .map(ContractEvent::TradeExecuted),
        );
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Free and locked balance of a trader.
    pub fn balance(&self, trader: &Address, ticker: &Ticker) -> Result<Balance, ExchangeError> {
        self.registry.resolve(ticker)?;
        Ok(self.ledger.balance(trader, ticker))
    }

    /// Every ticker the trader has touched, in ticker order.
    pub fn balances_of(&self, trader: &Address) -> Vec<(Ticker, Balance)> {
        self.ledger.balances_of(trader)
    }

    /// Balance scaled down by the configured decimals.
    pub fn balance_units(&self, trader: &Address, ticker: &Ticker) -> Result<BalanceView, ExchangeError> {
        let balance = self.balance(trader, ticker)?;
        let decimals = self.config.decimals;
        Ok(BalanceView {
            free: balance.free.to_units(decimals).ok_or(ExchangeError::AmountOverflow)?,
            locked: balance.locked.to_units(decimals).ok_or(ExchangeError::AmountOverflow)?,
        })
    }

    /// Wallet balance of `owner` on the asset's token contract.
    pub fn token_balance(&self, ticker: &Ticker, owner: &Address) -> Result<Amount, ExchangeError> {
        self.registry.resolve(ticker)?;
        self.vault.balance_of(ticker, owner)
    }

    /// Tokens held in custody by the exchange.
    pub fn custody_balance(&self, ticker: &Ticker) -> Result<Amount, ExchangeError> {
        self.registry.resolve(ticker)?;
        self.vault.custody_balance(ticker)
    }

    /// Sum of every trader's free and locked balance of `ticker`.
    pub fn total_held(&self, ticker: &Ticker) -> Result<Amount, ExchangeError> {
        self.registry.resolve(ticker)?;
        self.ledger
            .total_held(ticker)
            .ok_or(ExchangeError::AmountOverflow)
    }

    /// Mutable access to a registered token, e.g. to approve the exchange.
    pub fn token_mut(&mut self, ticker: &Ticker) -> Result<&mut (dyn Token + 'static), ExchangeError> {
        self.registry.resolve(ticker)?;
        self.vault.token_mut(ticker)
    }

    /// Resting orders in price-time priority.
    pub fn orders(&self, ticker: &Ticker, side: Side) -> Result<Vec<Order>, ExchangeError> {
        self.registry.resolve(ticker)?;
        Ok(self.engine.orders(ticker, side))
    }

    pub fn best_order(&self, ticker: &Ticker, side: Side) -> Result<Option<&Order>, ExchangeError> {
        self.registry.resolve(ticker)?;
        Ok(self.engine.best_order(ticker, side))
    }

    /// Filled, cancelled and closed orders, oldest first.
    pub fn historical_orders(&self, ticker: &Ticker, side: Side) -> Result<&[Order], ExchangeError> {
        self.registry.resolve(ticker)?;
        Ok(self.engine.historical_orders(ticker, side))
    }

    pub fn depth(&self, ticker: &Ticker, side: Side) -> Result<Vec<DepthLevel>, ExchangeError> {
        self.registry.resolve(ticker)?;
        Ok(self.engine.depth(ticker, side))
    }

    /// Id the next accepted order will receive.
    pub fn next_order_id(&self) -> u64 {
        self.engine.next_order_id()
    }

    // ───────────────────────── Access Control ─────────────────────────

    /// Hand the admin role to `new_admin`. Admin-only.
    pub fn transfer_admin(&mut self, caller: &Address, new_admin: Address) -> Result<(), ExchangeError> {
        let previous = self
            .access_control
            .transfer_admin(caller, new_admin)
            .inspect_err(|err| warn!(caller = %caller, error = %err, "Admin transfer rejected"))?;
        let current = self.access_control.admin().clone();

        info!(previous = %previous, current = %current, "Admin changed");
        self.events
            .push(ContractEvent::AdminChanged(AdminChanged { previous, current }));
        Ok(())
    }

    pub fn admin(&self) -> &Address {
        self.access_control.admin()
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }
}

fn now() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::InMemoryToken;

    fn t(symbol: &str) -> Ticker {
        Ticker::new(symbol).unwrap()
    }

    fn admin() -> Address {
        Address::from("admin")
    }

    fn setup_dex() -> Dex {
        let mut dex = Dex::new(DexConfig::new(admin(), "DAI")).unwrap();
        dex.register_asset(&admin(), t("DAI"), Box::new(InMemoryToken::new("0xdai")))
            .unwrap();
        dex.register_asset(&admin(), t("BAT"), Box::new(InMemoryToken::new("0xbat")))
            .unwrap();
        dex
    }

    #[test]
    fn test_register_requires_admin() {
        let mut dex = setup_dex();
        let result = dex.register_asset(&Address::from("eve"), t("REP"), Box::new(InMemoryToken::new("0xrep")));
        assert_eq!(result, Err(ExchangeError::Unauthorized));
        assert_eq!(dex.tickers(), vec![t("DAI"), t("BAT")]);
    }

    #[test]
    fn test_register_duplicate() {
        let mut dex = setup_dex();
        let result = dex.register_asset(&admin(), t("BAT"), Box::new(InMemoryToken::new("0xbat2")));
        assert!(matches!(result, Err(ExchangeError::DuplicateTicker { .. })));
        assert_eq!(dex.resolve(&t("BAT")), Ok(&Address::from("0xbat")));
    }

    #[test]
    fn test_unknown_ticker_queries() {
        let dex = setup_dex();
        let zrx = t("ZRX");
        assert!(matches!(dex.balance(&admin(), &zrx), Err(ExchangeError::UnknownTicker { .. })));
        assert!(matches!(dex.orders(&zrx, Side::Buy), Err(ExchangeError::UnknownTicker { .. })));
    }

    #[test]
    fn test_zero_deposit_rejected() {
        let mut dex = setup_dex();
        let result = dex.deposit(&Address::from("x"), t("DAI"), Amount::ZERO);
        assert_eq!(result, Err(ExchangeError::InvalidAmount));
    }

    #[test]
    fn test_deposit_without_approval_changes_nothing() {
        let mut dex = setup_dex();
        let alice = Address::from("alice");
        dex.drain_events();

        let result = dex.deposit(&alice, t("DAI"), Amount::from(10));

        assert!(matches!(result, Err(ExchangeError::TokenTransferFailed { .. })));
        assert_eq!(dex.balance(&alice, &t("DAI")).unwrap(), Balance::default());
        assert!(dex.events().is_empty());
    }

    #[test]
    fn test_transfer_admin() {
        let mut dex = setup_dex();
        dex.transfer_admin(&admin(), Address::from("new")).unwrap();

        assert_eq!(dex.admin(), &Address::from("new"));
        assert_eq!(
            dex.register_asset(&admin(), t("REP"), Box::new(InMemoryToken::new("0xrep"))),
            Err(ExchangeError::Unauthorized)
        );
        assert!(matches!(
            dex.events().last(),
            Some(ContractEvent::AdminChanged(AdminChanged { .. }))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Dex::new(DexConfig::new(admin(), ""));
        assert!(matches!(result, Err(ConfigError::InvalidQuoteTicker { .. })));
    }
}
