use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use hrm_compoff::calendar::{HolidayCalendar, NonWorkingDays};
use hrm_compoff::error::LeaveError;
use hrm_compoff::ledger::CompOffLedger;
use hrm_compoff::model::credit::{CreditEntry, CreditRecord, CreditStatus};
use hrm_compoff::model::leave_request::LeaveId;
use hrm_compoff::store::InMemoryStore;
use proptest::prelude::*;
use rust_decimal::Decimal;

const EMP: u64 = 1000;

fn halves(n: u32) -> Decimal {
    Decimal::new(i64::from(n) * 5, 1)
}

// n-th weekend day of 2024, Saturday 01-06 being the first
fn weekend_day(n: u32) -> NaiveDate {
    let first_saturday = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
    first_saturday + Duration::days(i64::from(n / 2) * 7 + i64::from(n % 2))
}

fn sum_with(credits: &[CreditRecord], status: CreditStatus) -> Decimal {
    credits
        .iter()
        .filter(|c| c.status == status)
        .map(|c| c.days)
        .sum()
}

/// Balance agrees with the records and no quantity appears or vanishes.
async fn assert_consistent(ledger: &CompOffLedger, banked: Decimal) {
    let credits = ledger.credits(EMP).await.unwrap();
    let balance = ledger.balance(EMP).await.unwrap();

    let total: Decimal = credits.iter().map(|c| c.days).sum();
    assert_eq!(total, banked);
    assert_eq!(balance.available, sum_with(&credits, CreditStatus::Earned));
    assert_eq!(balance.used, sum_with(&credits, CreditStatus::Used));
    assert_eq!(balance.available, balance.accrued - balance.used);
    assert!(credits
        .iter()
        .all(|c| (c.status == CreditStatus::Used) == c.used_by_leave_id.is_some()));
}

async fn run_sequence(worked: BTreeMap<u32, u32>, steps: Vec<(bool, u32)>) {
    let store = InMemoryStore::new();
    let ledger = CompOffLedger::new(Arc::new(store.clone()), Arc::new(HolidayCalendar::default()));

    let entries: Vec<CreditEntry> = worked
        .iter()
        .map(|(&n, &qty)| CreditEntry {
            worked_date: weekend_day(n),
            planned_leave_date: None,
            days: halves(qty),
            description: None,
        })
        .collect();
    ledger
        .earn_bulk(EMP, &entries, CreditStatus::Earned)
        .await
        .unwrap();
    let banked: Decimal = entries.iter().map(|e| e.days).sum();
    assert_consistent(&ledger, banked).await;

    let mut open_leaves: Vec<LeaveId> = Vec::new();
    let mut next_leave = 1;

    for (consume, size) in steps {
        let before = ledger.available_balance(EMP).await.unwrap();

        if consume || open_leaves.is_empty() {
            let quantity = halves(size);
            let leave_id = LeaveId(next_leave);
            next_leave += 1;
            let snapshot = store.all_credits().await;

            match ledger.consume(EMP, quantity, leave_id).await {
                Ok(used) => {
                    assert!(quantity <= before);
                    let spent: Decimal = used.iter().map(|c| c.days).sum();
                    assert_eq!(spent, quantity);
                    assert_eq!(ledger.available_balance(EMP).await.unwrap(), before - quantity);
                    open_leaves.push(leave_id);
                }
                Err(LeaveError::InsufficientBalance { available, .. }) => {
                    assert!(quantity > before);
                    assert_eq!(available, before);
                    assert_eq!(store.all_credits().await, snapshot);
                }
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        } else {
            let leave_id = open_leaves.remove(size as usize % open_leaves.len());
            let linked: Decimal = ledger
                .credits_used_by(leave_id)
                .await
                .unwrap()
                .iter()
                .map(|c| c.days)
                .sum();

            ledger.reverse(leave_id).await.unwrap();
            let after = ledger.available_balance(EMP).await.unwrap();
            assert_eq!(after, before + linked);

            assert!(ledger.reverse(leave_id).await.unwrap().is_empty());
            assert_eq!(ledger.available_balance(EMP).await.unwrap(), after);
        }

        assert_consistent(&ledger, banked).await;
    }

    for leave_id in open_leaves {
        ledger.reverse(leave_id).await.unwrap();
    }
    assert_eq!(ledger.available_balance(EMP).await.unwrap(), banked);
    assert_consistent(&ledger, banked).await;
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]
    #[test]
    fn ledger_invariants_hold_over_random_histories(
        // weekend index -> quantity in half days
        worked in prop::collection::btree_map(0u32..100, 1u32..=4, 1..10),
        // (consume?, half days or which open leave to reverse)
        steps in prop::collection::vec((any::<bool>(), 1u32..=8), 1..12),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(run_sequence(worked, steps));
    }

    #[test]
    fn earning_on_a_weekday_is_always_refused(offset in 0i64..366) {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset);
        let calendar = HolidayCalendar::default();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let ledger = CompOffLedger::new(Arc::new(InMemoryStore::new()), Arc::new(calendar.clone()));

        let result = runtime.block_on(ledger.earn(
            EMP,
            CreditEntry {
                worked_date: date,
                planned_leave_date: None,
                days: Decimal::ONE,
                description: None,
            },
            CreditStatus::Earned,
        ));

        if calendar.is_non_working_day(date) {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(matches!(result, Err(LeaveError::NotNonWorkingDay(d)) if d == date));
        }
    }
}
