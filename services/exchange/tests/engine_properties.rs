//! Property tests for the matching engine
//!
//! Random order streams against one family book, checking the structural
//! invariants that must hold after every submission: quantity conservation,
//! remaining bounds, status consistency, maker-price execution, gapless
//! trade sequences, and no crossable liquidity left between strangers.

use exchange::ExchangeEngine;
use proptest::prelude::*;
use rust_decimal::Decimal;
use types::ids::{AssetId, FamilyId, MemberId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

const T0: i64 = 1_754_000_000_000_000_000;

#[derive(Debug, Clone)]
struct OrderSeed {
    member: usize,
    side: Side,
    price: u64,
    /// Quantity in hundredths.
    qty_centi: u32,
}

fn order_seed() -> impl Strategy<Value = OrderSeed> {
    (0usize..3, prop::bool::ANY, 95u64..=105, 1u32..=400).prop_map(
        |(member, is_buy, price, qty_centi)| OrderSeed {
            member,
            side: if is_buy { Side::Buy } else { Side::Sell },
            price,
            qty_centi,
        },
    )
}

fn build_order(
    family: FamilyId,
    asset: AssetId,
    members: &[MemberId],
    seed: &OrderSeed,
    timestamp: i64,
) -> Order {
    Order::new(
        family,
        members[seed.member],
        asset,
        seed.side,
        Price::from_u64(seed.price),
        Quantity::try_new(Decimal::new(seed.qty_centi as i64, 2)).unwrap(),
        timestamp,
    )
    .unwrap()
}

fn traded_quantity_for(engine: &ExchangeEngine, order_id: &OrderId) -> Decimal {
    engine
        .trades()
        .iter()
        .filter(|trade| trade.involves(order_id))
        .map(|trade| trade.quantity.as_decimal())
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_order_streams_preserve_invariants(seeds in prop::collection::vec(order_seed(), 1..60)) {
        let family = FamilyId::new();
        let asset = AssetId::new();
        let members: Vec<MemberId> = (0..3).map(|_| MemberId::new()).collect();
        let mut engine = ExchangeEngine::in_memory();
        let mut submitted = Vec::new();

        for (i, seed) in seeds.iter().enumerate() {
            let timestamp = T0 + i as i64;
            let order = build_order(family, asset, &members, seed, timestamp);
            let submission = engine.submit_order(order, timestamp).unwrap();

            // Conservation within the submission itself.
            let traded: Decimal = submission
                .trades
                .iter()
                .map(|trade| trade.quantity.as_decimal())
                .sum();
            prop_assert_eq!(
                submission.order.quantity.as_decimal(),
                submission.order.remaining.as_decimal() + traded
            );
            // No zero-quantity trades, all at crossable prices.
            for trade in &submission.trades {
                prop_assert!(!trade.quantity.is_zero());
            }

            submitted.push(submission.order.order_id);
        }

        // Global conservation and bounds for every order ever accepted.
        for order_id in &submitted {
            let order = engine.order(order_id).unwrap();
            prop_assert!(order.check_invariant());
            prop_assert!(order.remaining <= order.quantity);
            prop_assert_eq!(
                order.quantity.as_decimal() - order.remaining.as_decimal(),
                traded_quantity_for(&engine, order_id)
            );
        }

        // Every trade executed at the maker's limit price, with the maker
        // accepted before the taker.
        for trade in engine.trades() {
            let (taker_id, maker_id) = match trade.taker_side {
                Side::Buy => (trade.buy_order_id, trade.sell_order_id),
                Side::Sell => (trade.sell_order_id, trade.buy_order_id),
            };
            let maker = engine.order(&maker_id).unwrap();
            let taker = engine.order(&taker_id).unwrap();
            prop_assert_eq!(trade.price, maker.price);
            prop_assert!(maker.sequence < taker.sequence);
            prop_assert!(maker.member_id != taker.member_id);
        }

        // Gapless trade sequencing.
        for (i, trade) in engine.trades().iter().enumerate() {
            prop_assert_eq!(trade.sequence, i as u64 + 1);
        }

        // No crossing left behind between different members. Same-member
        // crossings can rest: self-matching is skipped by design.
        let live: Vec<_> = engine.orders().filter(|o| o.is_live()).collect();
        for buy in live.iter().filter(|o| o.side == Side::Buy) {
            for sell in live.iter().filter(|o| o.side == Side::Sell) {
                if buy.price >= sell.price {
                    prop_assert_eq!(buy.member_id, sell.member_id);
                }
            }
        }
    }

    #[test]
    fn snapshot_agrees_with_live_orders(seeds in prop::collection::vec(order_seed(), 1..40)) {
        let family = FamilyId::new();
        let asset = AssetId::new();
        let members: Vec<MemberId> = (0..3).map(|_| MemberId::new()).collect();
        let mut engine = ExchangeEngine::in_memory();

        for (i, seed) in seeds.iter().enumerate() {
            let timestamp = T0 + i as i64;
            let order = build_order(family, asset, &members, seed, timestamp);
            engine.submit_order(order, timestamp).unwrap();
        }

        let snapshot = engine.book_snapshot(family, asset, usize::MAX);
        let bid_total: Decimal = snapshot.bids.iter().map(|(_, q)| q.as_decimal()).sum();
        let ask_total: Decimal = snapshot.asks.iter().map(|(_, q)| q.as_decimal()).sum();

        let live_bid_total: Decimal = engine
            .orders()
            .filter(|o| o.is_live() && o.side == Side::Buy)
            .map(|o| o.remaining.as_decimal())
            .sum();
        let live_ask_total: Decimal = engine
            .orders()
            .filter(|o| o.is_live() && o.side == Side::Sell)
            .map(|o| o.remaining.as_decimal())
            .sum();

        prop_assert_eq!(bid_total, live_bid_total);
        prop_assert_eq!(ask_total, live_ask_total);

        // Snapshot sides are sorted best-first.
        for pair in snapshot.bids.windows(2) {
            prop_assert!(pair[0].0 > pair[1].0);
        }
        for pair in snapshot.asks.windows(2) {
            prop_assert!(pair[0].0 < pair[1].0);
        }
    }
}
