use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use cemflow_api::entities::driver_transaction::{Model as TransactionModel, TransactionType};
use cemflow_api::services::reconciliation::QUANTITY_TOLERANCE;
use cemflow_api::services::wallet::fold_balance;

fn arb_amount() -> impl Strategy<Value = Decimal> {
    // Amounts in the 0.00..=1_000_000.00 range with kobo precision.
    (0i64..=100_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_transaction_type() -> impl Strategy<Value = TransactionType> {
    prop_oneof![
        Just(TransactionType::ShortageDeduction),
        Just(TransactionType::Allowance),
        Just(TransactionType::SalaryPayment),
        Just(TransactionType::Bonus),
        Just(TransactionType::Deposit),
        Just(TransactionType::Other),
    ]
}

fn arb_transaction() -> impl Strategy<Value = TransactionModel> {
    (arb_transaction_type(), arb_amount()).prop_map(|(transaction_type, amount)| {
        TransactionModel {
            id: Uuid::new_v4(),
            driver_id: Uuid::nil(),
            order_id: None,
            transaction_type,
            amount,
            note: None,
            created_at: Utc::now(),
        }
    })
}

proptest! {
    /// The wallet balance is exactly credits minus debits, however the
    /// ledger lines are interleaved.
    #[test]
    fn fold_balance_is_credits_minus_debits(txs in prop::collection::vec(arb_transaction(), 0..40)) {
        let credits: Decimal = txs
            .iter()
            .filter(|tx| tx.transaction_type.is_credit())
            .map(|tx| tx.amount)
            .sum();
        let debits: Decimal = txs
            .iter()
            .filter(|tx| !tx.transaction_type.is_credit())
            .map(|tx| tx.amount)
            .sum();
        prop_assert_eq!(fold_balance(&txs), credits - debits);
    }

    /// Reordering the ledger never changes the balance.
    #[test]
    fn fold_balance_is_order_independent(txs in prop::collection::vec(arb_transaction(), 0..40)) {
        let mut reversed = txs.clone();
        reversed.reverse();
        prop_assert_eq!(fold_balance(&txs), fold_balance(&reversed));
    }

    /// An appended credit raises the balance by exactly its amount, a
    /// debit lowers it.
    #[test]
    fn appending_a_line_moves_the_balance_by_its_amount(
        txs in prop::collection::vec(arb_transaction(), 0..20),
        extra in arb_transaction(),
    ) {
        let before = fold_balance(&txs);
        let mut txs = txs;
        let delta = if extra.transaction_type.is_credit() {
            extra.amount
        } else {
            -extra.amount
        };
        txs.push(extra);
        prop_assert_eq!(fold_balance(&txs), before + delta);
    }

    /// Any breakdown that conserves the dispatched quantity stays within
    /// the reconciliation tolerance.
    #[test]
    fn exact_breakdowns_are_within_tolerance(
        good in 0i64..=50_000,
        missing in 0i64..=5_000,
        damaged in 0i64..=5_000,
    ) {
        let good = Decimal::new(good, 3);
        let missing = Decimal::new(missing, 3);
        let damaged = Decimal::new(damaged, 3);
        let quantity = good + missing + damaged;
        let drift = (good + missing + damaged - quantity).abs();
        prop_assert!(drift <= QUANTITY_TOLERANCE);
    }

    /// Anything off by more than a hundredth of a ton trips the check.
    #[test]
    fn drift_beyond_tolerance_is_detected(
        quantity in 1i64..=50_000,
        off_by in 11i64..=10_000,
        shortfall in proptest::bool::ANY,
    ) {
        let quantity = Decimal::new(quantity, 3);
        let error = Decimal::new(off_by, 3);
        let reported = if shortfall && quantity > error {
            quantity - error
        } else {
            quantity + error
        };
        let drift = (reported - quantity).abs();
        prop_assert!(drift > QUANTITY_TOLERANCE);
    }
}
