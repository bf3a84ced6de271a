use configuration::RiskLimits;
use core_types::Position;
use proptest::prelude::*;
use risk::{calculate_stops, update_trailing_stop, validate_position_size};
use rust_decimal::Decimal;

fn cents(value: u32) -> Decimal {
    Decimal::new(value as i64, 2)
}

proptest! {
    #[test]
    fn trailing_stop_never_moves_down(
        current in 1u32..1_000_000,
        highest in 1u32..1_000_000,
        stop in 0u32..1_000_000,
    ) {
        let limits = RiskLimits::default();
        let previous = cents(stop);
        let updated = update_trailing_stop(cents(current), cents(highest), previous, &limits);
        prop_assert!(updated >= previous);
    }

    #[test]
    fn repeated_trailing_updates_are_monotonic(prices in prop::collection::vec(100u32..100_000, 1..50)) {
        let limits = RiskLimits::default();
        let mut stop = Decimal::ZERO;
        let mut highest = Decimal::ZERO;
        for price in prices {
            let price = cents(price);
            highest = highest.max(price);
            let next = update_trailing_stop(price, highest, stop, &limits);
            prop_assert!(next >= stop);
            stop = next;
        }
    }

    #[test]
    fn stops_straddle_the_entry(entry in 1u32..1_000_000, atr in 1u32..100_000) {
        let entry = cents(entry);
        let stops = calculate_stops(entry, cents(atr), &RiskLimits::default()).unwrap();
        prop_assert!(stops.stop_loss < entry);
        prop_assert!(stops.take_profit > entry);
        prop_assert!(stops.stop_loss >= Decimal::ZERO);
    }

    #[test]
    fn adjusted_quantity_never_exceeds_request(
        quantity in 0u64..10_000,
        price in 1u32..100_000,
        capital in 1u32..100_000_000,
        open in 0usize..8,
    ) {
        let limits = RiskLimits::default();
        let positions: Vec<Position> = (0..open)
            .map(|i| Position {
                symbol: format!("P{i}"),
                quantity: 1,
                entry_price: Decimal::ONE,
                current_price: Decimal::ONE,
            })
            .collect();
        let decision = validate_position_size(quantity, cents(price), cents(capital), &positions, &limits).unwrap();
        prop_assert!(decision.adjusted_quantity <= quantity);
        if decision.approved {
            prop_assert_eq!(decision.adjusted_quantity, quantity);
        }
        if open >= limits.max_positions {
            prop_assert_eq!(decision.adjusted_quantity, 0);
        }
    }
}
