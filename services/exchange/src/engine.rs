//! Matching engine core
//!
//! Owns the per-(family, asset) books and every order's state transitions.
//! A submission runs in three steps against a consistent read of the book:
//! plan the fills, journal the whole event batch through the sink, then
//! apply the mutations. Nothing is applied if journaling fails, so a trade
//! can never become visible without its order updates or vice versa.

use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};
use types::errors::OrderError;
use types::ids::{AssetId, FamilyId, MemberId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderStatus, Side};
use types::trade::Trade;

use crate::book::{AskBook, BidBook};
use crate::events::ExchangeEvent;
use crate::matching::TradeExecutor;
use crate::sink::{EventSink, NullSink, SinkError};

/// Scope of one order book: one asset within one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BookKey {
    pub family_id: FamilyId,
    pub asset_id: AssetId,
}

impl BookKey {
    pub fn new(family_id: FamilyId, asset_id: AssetId) -> Self {
        Self {
            family_id,
            asset_id,
        }
    }
}

/// Both sides of one asset's book.
#[derive(Debug, Clone, Default)]
struct Book {
    bids: BidBook,
    asks: AskBook,
}

/// One maker consumption computed during planning.
#[derive(Debug, Clone)]
struct PlannedFill {
    maker_order_id: OrderId,
    maker_member_id: MemberId,
    /// The maker's limit price; trades always execute at it.
    price: Price,
    quantity: Quantity,
    /// Maker remaining after this fill.
    maker_remaining: Quantity,
}

/// Result of a submission: the order's final state plus the trades created.
#[derive(Debug, Clone)]
pub struct Submission {
    pub order: Order,
    pub trades: Vec<Trade>,
}

/// Depth snapshot of one book, for display.
#[derive(Debug, Clone)]
pub struct BookSnapshot {
    pub family_id: FamilyId,
    pub asset_id: AssetId,
    /// Highest price first.
    pub bids: Vec<(Price, Quantity)>,
    /// Lowest price first.
    pub asks: Vec<(Price, Quantity)>,
}

/// Engine errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("order error: {0}")]
    Order(#[from] OrderError),

    #[error("duplicate order: {order_id}")]
    DuplicateOrder { order_id: OrderId },

    #[error("order not found: {order_id}")]
    UnknownOrder { order_id: OrderId },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// The matching engine.
///
/// Single writer: submissions and cancellations take `&mut self`, so two
/// orders can never race for the same resting liquidity. Embedders that
/// share an engine across threads serialize access around it.
pub struct ExchangeEngine<S: EventSink = NullSink> {
    books: HashMap<BookKey, Book>,
    orders: HashMap<OrderId, Order>,
    trades: Vec<Trade>,
    executor: TradeExecutor,
    /// Last acceptance sequence handed out; drives time priority.
    order_sequence: u64,
    sink: S,
}

impl ExchangeEngine<NullSink> {
    /// An ephemeral engine that journals nothing.
    pub fn in_memory() -> Self {
        Self::with_sink(NullSink)
    }
}

impl<S: EventSink> ExchangeEngine<S> {
    pub fn with_sink(sink: S) -> Self {
        Self {
            books: HashMap::new(),
            orders: HashMap::new(),
            trades: Vec::new(),
            executor: TradeExecutor::new(),
            order_sequence: 0,
            sink,
        }
    }

    /// Swap the sink, keeping all engine state (used to attach a journal
    /// after replay).
    pub fn replace_sink<T: EventSink>(self, sink: T) -> ExchangeEngine<T> {
        ExchangeEngine {
            books: self.books,
            orders: self.orders,
            trades: self.trades,
            executor: self.executor,
            order_sequence: self.order_sequence,
            sink,
        }
    }

    /// Submit a freshly created order for matching.
    ///
    /// Walks the opposite side of the book in price/time priority, trading
    /// at each maker's limit price, until the order is filled or no
    /// crossable liquidity remains; any remainder rests in the book. An
    /// untradeable order resting with zero trades is a normal outcome.
    pub fn submit_order(
        &mut self,
        mut order: Order,
        timestamp: i64,
    ) -> Result<Submission, EngineError> {
        // Defensive guard: only freshly created orders are matched.
        if order.status != OrderStatus::Open || order.remaining != order.quantity {
            warn!(
                order_id = %order.order_id,
                status = ?order.status,
                "submit called with a non-open order, ignoring"
            );
            return Ok(Submission {
                order,
                trades: Vec::new(),
            });
        }
        if self.orders.contains_key(&order.order_id) {
            return Err(EngineError::DuplicateOrder {
                order_id: order.order_id,
            });
        }

        let key = BookKey::new(order.family_id, order.asset_id);
        order.sequence = self.order_sequence + 1;

        // Plan: read-only walk over the book.
        let fills = {
            let book = self.books.entry(key).or_default();
            Self::plan_fills(book, &order)
        };
        let trades: Vec<Trade> = fills
            .iter()
            .enumerate()
            .map(|(offset, fill)| {
                self.executor.build_trade(
                    offset as u64,
                    &order,
                    fill.maker_order_id,
                    fill.maker_member_id,
                    fill.price,
                    fill.quantity,
                    timestamp,
                )
            })
            .collect();

        // Journal the full batch before touching any state.
        let mut events = Vec::with_capacity(1 + trades.len());
        events.push(ExchangeEvent::OrderAccepted {
            order: order.clone(),
        });
        events.extend(trades.iter().map(|trade| ExchangeEvent::TradeExecuted {
            trade: trade.clone(),
        }));
        self.sink.commit(&events)?;

        // Apply.
        self.order_sequence = order.sequence;
        for (fill, trade) in fills.iter().zip(&trades) {
            let maker = self
                .orders
                .get_mut(&fill.maker_order_id)
                .expect("planned maker is a known order");
            maker
                .apply_fill(fill.quantity, timestamp)
                .expect("planned fill fits maker remaining");
            let maker_side = maker.side;

            let book = self.books.get_mut(&key).expect("book exists");
            let updated = match maker_side {
                Side::Buy => {
                    book.bids
                        .set_remaining(&fill.maker_order_id, fill.price, fill.maker_remaining)
                }
                Side::Sell => {
                    book.asks
                        .set_remaining(&fill.maker_order_id, fill.price, fill.maker_remaining)
                }
            };
            debug_assert!(updated, "planned maker was resting in the book");

            order
                .apply_fill(fill.quantity, timestamp)
                .expect("planned fill fits taker remaining");

            debug!(
                trade_id = %trade.trade_id,
                price = %trade.price,
                quantity = %trade.quantity,
                "trade executed"
            );
        }
        self.executor.advance(trades.len() as u64);

        if order.is_live() {
            let book = self.books.get_mut(&key).expect("book exists");
            match order.side {
                Side::Buy => book.bids.insert(&order),
                Side::Sell => book.asks.insert(&order),
            }
        }
        self.orders.insert(order.order_id, order.clone());
        self.trades.extend(trades.iter().cloned());

        info!(
            order_id = %order.order_id,
            trades = trades.len(),
            status = ?order.status,
            "submission complete"
        );
        Ok(Submission { order, trades })
    }

    /// Cancel a live order, removing its remainder from the book.
    pub fn cancel_order(
        &mut self,
        order_id: &OrderId,
        timestamp: i64,
    ) -> Result<Order, EngineError> {
        let (family_id, asset_id, side, price, status) = {
            let order = self
                .orders
                .get(order_id)
                .ok_or(EngineError::UnknownOrder {
                    order_id: *order_id,
                })?;
            (
                order.family_id,
                order.asset_id,
                order.side,
                order.price,
                order.status,
            )
        };
        if !status.is_live() {
            return Err(EngineError::Order(OrderError::AlreadyTerminal { status }));
        }

        self.sink.commit(&[ExchangeEvent::OrderCancelled {
            order_id: *order_id,
            family_id,
            asset_id,
            cancelled_at: timestamp,
        }])?;

        let order = self.orders.get_mut(order_id).expect("looked up above");
        order.cancel(timestamp)?;
        let cancelled = order.clone();

        if let Some(book) = self.books.get_mut(&BookKey::new(family_id, asset_id)) {
            match side {
                Side::Buy => book.bids.remove(order_id, price),
                Side::Sell => book.asks.remove(order_id, price),
            };
        }

        info!(order_id = %order_id, "order cancelled");
        Ok(cancelled)
    }

    /// Re-apply a journaled event (replay path; bypasses the sink).
    pub fn apply_event(&mut self, event: &ExchangeEvent) -> Result<(), EngineError> {
        match event {
            ExchangeEvent::OrderAccepted { order } => {
                if self.orders.contains_key(&order.order_id) {
                    return Err(EngineError::DuplicateOrder {
                        order_id: order.order_id,
                    });
                }
                let key = BookKey::new(order.family_id, order.asset_id);
                if order.is_live() {
                    let book = self.books.entry(key).or_default();
                    match order.side {
                        Side::Buy => book.bids.insert(order),
                        Side::Sell => book.asks.insert(order),
                    }
                }
                self.order_sequence = self.order_sequence.max(order.sequence);
                self.orders.insert(order.order_id, order.clone());
            }
            ExchangeEvent::TradeExecuted { trade } => {
                let key = BookKey::new(trade.family_id, trade.asset_id);
                for order_id in [trade.buy_order_id, trade.sell_order_id] {
                    let order =
                        self.orders
                            .get_mut(&order_id)
                            .ok_or(EngineError::UnknownOrder { order_id })?;
                    order.apply_fill(trade.quantity, trade.executed_at)?;
                    let (side, price, remaining) = (order.side, order.price, order.remaining);
                    if let Some(book) = self.books.get_mut(&key) {
                        match side {
                            Side::Buy => book.bids.set_remaining(&order_id, price, remaining),
                            Side::Sell => book.asks.set_remaining(&order_id, price, remaining),
                        };
                    }
                }
                self.executor.observe_sequence(trade.sequence);
                self.trades.push(trade.clone());
            }
            ExchangeEvent::OrderCancelled {
                order_id,
                family_id,
                asset_id,
                cancelled_at,
            } => {
                let order =
                    self.orders
                        .get_mut(order_id)
                        .ok_or(EngineError::UnknownOrder {
                            order_id: *order_id,
                        })?;
                let (side, price) = (order.side, order.price);
                order.cancel(*cancelled_at)?;
                if let Some(book) = self.books.get_mut(&BookKey::new(*family_id, *asset_id)) {
                    match side {
                        Side::Buy => book.bids.remove(order_id, price),
                        Side::Sell => book.asks.remove(order_id, price),
                    };
                }
            }
        }
        Ok(())
    }

    /// Look up an order by id.
    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// All orders the engine has accepted, in no particular order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// All trades in execution order.
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Trades for one family's asset, in execution order.
    pub fn trades_for<'a>(
        &'a self,
        family_id: FamilyId,
        asset_id: AssetId,
    ) -> impl Iterator<Item = &'a Trade> {
        self.trades
            .iter()
            .filter(move |trade| trade.family_id == family_id && trade.asset_id == asset_id)
    }

    /// Depth snapshot of one book.
    pub fn book_snapshot(
        &self,
        family_id: FamilyId,
        asset_id: AssetId,
        depth: usize,
    ) -> BookSnapshot {
        let key = BookKey::new(family_id, asset_id);
        let (bids, asks) = self
            .books
            .get(&key)
            .map(|book| {
                (
                    book.bids.depth_snapshot(depth),
                    book.asks.depth_snapshot(depth),
                )
            })
            .unwrap_or_default();
        BookSnapshot {
            family_id,
            asset_id,
            bids,
            asks,
        }
    }

    /// Plan the fills for an incoming order against a consistent book read.
    ///
    /// Walks the opposite side best price first, FIFO within a level,
    /// skipping the submitter's own resting orders, and stops as soon as
    /// the incoming quantity is exhausted.
    fn plan_fills(book: &Book, taker: &Order) -> Vec<PlannedFill> {
        let mut fills = Vec::new();
        let mut remaining = taker.remaining;

        match taker.side {
            Side::Buy => {
                'levels: for (price, level) in book.asks.matchable(taker.price) {
                    for entry in level.entries() {
                        if entry.member_id == taker.member_id {
                            continue; // never match against our own resting order
                        }
                        let quantity = remaining.min(entry.remaining);
                        fills.push(PlannedFill {
                            maker_order_id: entry.order_id,
                            maker_member_id: entry.member_id,
                            price: *price,
                            quantity,
                            maker_remaining: entry
                                .remaining
                                .checked_sub(quantity)
                                .unwrap_or_else(|_| Quantity::zero()),
                        });
                        remaining = remaining
                            .checked_sub(quantity)
                            .unwrap_or_else(|_| Quantity::zero());
                        if remaining.is_zero() {
                            break 'levels;
                        }
                    }
                }
            }
            Side::Sell => {
                'levels: for (price, level) in book.bids.matchable(taker.price) {
                    for entry in level.entries() {
                        if entry.member_id == taker.member_id {
                            continue;
                        }
                        let quantity = remaining.min(entry.remaining);
                        fills.push(PlannedFill {
                            maker_order_id: entry.order_id,
                            maker_member_id: entry.member_id,
                            price: *price,
                            quantity,
                            maker_remaining: entry
                                .remaining
                                .checked_sub(quantity)
                                .unwrap_or_else(|_| Quantity::zero()),
                        });
                        remaining = remaining
                            .checked_sub(quantity)
                            .unwrap_or_else(|_| Quantity::zero());
                        if remaining.is_zero() {
                            break 'levels;
                        }
                    }
                }
            }
        }

        fills
    }
}
