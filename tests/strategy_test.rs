//! Per-bar controller behaviour against a recording broker.

mod common;

use breadfree::domain::bar::Bar;
use breadfree::domain::error::BreadfreeError;
use breadfree::domain::strategy::{BarOutcome, Phase};
use common::*;

fn feed(
    s: &mut breadfree::domain::strategy::DoubleMaStrategy,
    broker: &mut RecordingBroker,
    closes: &[f64],
) -> Vec<BarOutcome> {
    bars(closes)
        .iter()
        .map(|bar| s.on_bar(bar, &mut *broker).unwrap())
        .collect()
}

fn next_bar(close: f64) -> Bar {
    Bar::new(date(2024, 2, 1), close)
}

mod warmup {
    use super::*;

    #[test]
    fn short_history_never_orders() {
        let mut s = strategy(5, 20, 100, 1.0);
        let mut broker = RecordingBroker::new(1_000_000.0, 0.0);
        let closes: Vec<f64> = (0..19).map(|i| if i % 2 == 0 { 10.0 } else { 30.0 }).collect();

        let outcomes = feed(&mut s, &mut broker, &closes);

        assert!(outcomes.iter().all(|o| *o == BarOutcome::Warming));
        assert!(broker.orders.is_empty());
        assert_eq!(s.phase(), Phase::Warming);
    }

    #[test]
    fn arms_on_the_bar_that_reaches_long_window() {
        let mut s = strategy(2, 4, 100, 1.0);
        let mut broker = RecordingBroker::new(100_000.0, 0.0);
        let outcomes = feed(&mut s, &mut broker, &[10.0, 10.0, 10.0, 10.0]);
        assert_eq!(outcomes[3], BarOutcome::NoSignal);
        assert_eq!(s.phase(), Phase::Armed);
    }

    #[test]
    fn invalid_bars_do_not_count_toward_warmup() {
        let mut s = strategy(2, 4, 100, 1.0);
        let mut broker = RecordingBroker::new(100_000.0, 0.0);
        let outcomes = feed(&mut s, &mut broker, &[10.0, f64::NAN, 10.0, -1.0, 10.0, 0.0]);
        assert_eq!(
            outcomes,
            vec![
                BarOutcome::Warming,
                BarOutcome::InvalidPrice,
                BarOutcome::Warming,
                BarOutcome::InvalidPrice,
                BarOutcome::Warming,
                BarOutcome::InvalidPrice,
            ]
        );
        assert_eq!(s.history().len(), 3);
    }

    #[test]
    fn infinite_close_is_skipped() {
        let mut s = strategy(2, 4, 100, 1.0);
        s.preload(golden_setup());
        let mut broker = RecordingBroker::new(100_000.0, 0.0);

        let outcome = s.on_bar(&next_bar(f64::INFINITY), &mut broker).unwrap();

        assert_eq!(outcome, BarOutcome::InvalidPrice);
        assert_eq!(s.history().len(), 5);
        assert!(broker.orders.is_empty());
    }
}

mod crossover_flow {
    use super::*;

    #[test]
    fn flat_dip_spike_sequence() {
        let mut s = strategy(2, 4, 100, 1.0);
        let mut broker = RecordingBroker::new(100_000.0, 0.0);
        let outcomes = feed(&mut s, &mut broker, &[10.0, 10.0, 10.0, 10.0, 5.0, 20.0]);

        assert_eq!(
            outcomes,
            vec![
                BarOutcome::Warming,
                BarOutcome::Warming,
                BarOutcome::Warming,
                BarOutcome::NoSignal,
                BarOutcome::NoPositionToSell,
                BarOutcome::Bought {
                    quantity: 5000,
                    fallback: false
                },
            ]
        );
        assert_eq!(
            broker.orders,
            vec![Order::Buy {
                date: date(2024, 1, 6),
                symbol: SYMBOL.to_string(),
                price: 20.0,
                quantity: 5000,
            }]
        );
    }

    #[test]
    fn golden_cross_while_holding_is_suppressed() {
        let mut s = strategy(2, 4, 100, 1.0);
        s.preload(golden_setup());
        let mut broker = RecordingBroker::new(100_000.0, 0.0).with_position(SYMBOL, 300);

        let outcome = s.on_bar(&next_bar(50.0), &mut broker).unwrap();

        assert_eq!(outcome, BarOutcome::AlreadyHolding);
        assert!(broker.orders.is_empty());
    }

    #[test]
    fn death_cross_without_position_sells_nothing() {
        let mut s = strategy(2, 4, 100, 1.0);
        s.preload(death_setup());
        let mut broker = RecordingBroker::new(100_000.0, 0.0);

        let outcome = s.on_bar(&next_bar(2.0), &mut broker).unwrap();

        assert_eq!(outcome, BarOutcome::NoPositionToSell);
        assert!(broker.orders.is_empty());
    }
}

mod buy_sizing {
    use super::*;

    #[test]
    fn full_allocation_with_commission_buys_1900() {
        let mut s = strategy(2, 4, 100, 1.0);
        s.preload(golden_setup());
        let mut broker = RecordingBroker::new(100_000.0, 0.001);

        let outcome = s.on_bar(&next_bar(50.0), &mut broker).unwrap();

        assert_eq!(
            outcome,
            BarOutcome::Bought {
                quantity: 1900,
                fallback: false
            }
        );
        assert_eq!(broker.orders[0].quantity(), 1900);
    }

    #[test]
    fn cash_below_one_lot_is_insufficient_funds() {
        let mut s = strategy(2, 4, 100, 1.0);
        s.preload(golden_setup());
        let mut broker = RecordingBroker::new(4000.0, 0.0);

        let outcome = s.on_bar(&next_bar(50.0), &mut broker).unwrap();

        assert_eq!(outcome, BarOutcome::InsufficientFunds);
        assert!(broker.orders.is_empty());
    }

    #[test]
    fn small_allocation_falls_back_to_one_lot() {
        let mut s = strategy(2, 4, 100, 0.1);
        s.preload(golden_setup());
        let mut broker = RecordingBroker::new(10_000.0, 0.0);

        let outcome = s.on_bar(&next_bar(50.0), &mut broker).unwrap();

        assert_eq!(
            outcome,
            BarOutcome::Bought {
                quantity: 100,
                fallback: true
            }
        );
        assert_eq!(broker.orders[0].quantity(), 100);
    }

    #[test]
    fn zero_allocation_never_buys() {
        let mut s = strategy(2, 4, 100, 0.0);
        s.preload(golden_setup());
        let mut broker = RecordingBroker::new(10_000_000.0, 0.0);

        let outcome = s.on_bar(&next_bar(50.0), &mut broker).unwrap();

        assert_eq!(outcome, BarOutcome::InsufficientFunds);
        assert!(broker.orders.is_empty());
    }

    #[test]
    fn non_positive_cost_basis_aborts_buy() {
        let mut s = strategy(2, 4, 100, 1.0);
        s.preload(golden_setup());
        let mut broker = RecordingBroker::new(100_000.0, -2.0);

        let outcome = s.on_bar(&next_bar(50.0), &mut broker).unwrap();

        assert_eq!(outcome, BarOutcome::InvalidCostBasis);
        assert!(broker.orders.is_empty());
    }
}

mod sell_sizing {
    use super::*;

    #[test]
    fn sells_whole_lots_only() {
        let mut s = strategy(2, 4, 100, 1.0);
        s.preload(death_setup());
        let mut broker = RecordingBroker::new(0.0, 0.0).with_position(SYMBOL, 150);

        let outcome = s.on_bar(&next_bar(2.0), &mut broker).unwrap();

        assert_eq!(
            outcome,
            BarOutcome::Sold {
                quantity: 100,
                liquidated: false
            }
        );
        assert_eq!(
            broker.orders,
            vec![Order::Sell {
                date: date(2024, 2, 1),
                symbol: SYMBOL.to_string(),
                price: 2.0,
                quantity: 100,
            }]
        );
    }

    #[test]
    fn odd_lot_holding_is_liquidated() {
        let mut s = strategy(2, 4, 100, 1.0);
        s.preload(death_setup());
        let mut broker = RecordingBroker::new(0.0, 0.0).with_position(SYMBOL, 50);

        let outcome = s.on_bar(&next_bar(2.0), &mut broker).unwrap();

        assert_eq!(
            outcome,
            BarOutcome::Sold {
                quantity: 50,
                liquidated: true
            }
        );
        assert_eq!(broker.orders[0].quantity(), 50);
    }

    #[test]
    fn zero_quantity_position_sells_nothing() {
        let mut s = strategy(2, 4, 100, 1.0);
        s.preload(death_setup());
        let mut broker = RecordingBroker::new(0.0, 0.0).with_position(SYMBOL, 0);

        let outcome = s.on_bar(&next_bar(2.0), &mut broker).unwrap();

        assert_eq!(outcome, BarOutcome::NoPositionToSell);
        assert!(broker.orders.is_empty());
    }
}

mod errors {
    use super::*;

    #[test]
    fn broker_rejection_propagates_unmodified() {
        let mut s = strategy(2, 4, 100, 1.0);
        s.preload(golden_setup());
        let mut broker = RecordingBroker::new(100_000.0, 0.0).rejecting("market closed");

        let err = s.on_bar(&next_bar(50.0), &mut broker).unwrap_err();

        match err {
            BreadfreeError::InvalidOrder { symbol, reason } => {
                assert_eq!(symbol, SYMBOL);
                assert_eq!(reason, "market closed");
            }
            other => panic!("expected InvalidOrder, got {other:?}"),
        }
        // the bar was still recorded before the order failed
        assert_eq!(s.history().len(), 6);
    }

    #[test]
    fn rejected_sell_propagates() {
        let mut s = strategy(2, 4, 100, 1.0);
        s.preload(death_setup());
        let mut broker = RecordingBroker::new(0.0, 0.0)
            .with_position(SYMBOL, 200)
            .rejecting("halted");

        assert!(matches!(
            s.on_bar(&next_bar(2.0), &mut broker),
            Err(BreadfreeError::InvalidOrder { .. })
        ));
    }
}

mod refeed {
    use super::*;

    #[test]
    fn duplicate_bar_is_appended_again() {
        let mut s = strategy(2, 4, 100, 1.0);
        s.preload(golden_setup());
        let mut broker = RecordingBroker::new(100_000.0, 0.0);
        let bar = next_bar(50.0);

        let first = s.on_bar(&bar, &mut broker).unwrap();
        let second = s.on_bar(&bar, &mut broker).unwrap();

        assert!(matches!(first, BarOutcome::Bought { .. }));
        // the same bar a second time grows history and is evaluated afresh
        assert_eq!(s.history().len(), 7);
        assert_eq!(second, BarOutcome::NoSignal);
        assert_ne!(first, second);
    }

    #[test]
    fn duplicate_dip_does_not_sell_twice() {
        let mut s = strategy(2, 4, 100, 1.0);
        s.preload(vec![10.0, 10.0, 10.0, 10.0]);
        let mut broker = RecordingBroker::new(0.0, 0.0).with_position(SYMBOL, 100);
        let bar = next_bar(10.0);

        assert_eq!(s.on_bar(&bar, &mut broker).unwrap(), BarOutcome::NoSignal);
        let dip = Bar::new(date(2024, 2, 2), 4.0);
        assert!(matches!(
            s.on_bar(&dip, &mut broker).unwrap(),
            BarOutcome::Sold { quantity: 100, .. }
        ));
        // re-feeding the dip: history keeps falling but the cross has
        // already happened, so no second order
        assert_eq!(s.on_bar(&dip, &mut broker).unwrap(), BarOutcome::NoSignal);
        assert_eq!(broker.orders.len(), 1);
    }
}
