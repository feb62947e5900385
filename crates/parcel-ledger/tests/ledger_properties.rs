//! Randomized checks of the ledger's accounting rules.
//!
//! Every test uses a seeded ChaCha RNG so failures are reproducible.

use approx::assert_abs_diff_eq;
use parcel_ledger::{Ledger, LedgerError, Parcel, ParcelId, ToggleOutcome};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const EPSILON: f64 = 1e-9;
const SEEDS: [u64; 4] = [1, 42, 1234, 987_654_321];

/// Build a catalog of parcels with acreages in eighths of an acre, which keeps
/// every partial sum exactly representable.
fn catalog(rng: &mut ChaCha8Rng, count: usize) -> Vec<Parcel> {
    (0..count)
        .map(|i| {
            let acres = rng.gen_range(0..32) as f64 * 0.125;
            Parcel::new(format!("{:03}-{:02}-{:03}", i / 100, i % 7, i), acres, "random")
        })
        .collect()
}

fn member_sum(ledger: &Ledger) -> f64 {
    ledger.snapshot().parcels.iter().map(Parcel::acreage).sum()
}

#[test]
fn test_total_matches_members_after_every_toggle() {
    for seed in SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let parcels = catalog(&mut rng, 40);
        let mut ledger = Ledger::new(25.0).unwrap();

        for _ in 0..2_000 {
            let parcel = &parcels[rng.gen_range(0..parcels.len())];
            let _ = ledger.toggle(parcel);

            assert_abs_diff_eq!(ledger.total_acreage(), member_sum(&ledger), epsilon = EPSILON);
            assert!(ledger.total_acreage() >= 0.0);
        }
    }
}

#[test]
fn test_total_never_exceeds_budget() {
    for seed in SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let parcels = catalog(&mut rng, 60);
        let mut ledger = Ledger::new(rng.gen_range(1.0..30.0)).unwrap();

        for _ in 0..2_000 {
            let parcel = &parcels[rng.gen_range(0..parcels.len())];
            match ledger.toggle(parcel) {
                Ok(_) => {}
                Err(LedgerError::BudgetExceeded { prospective, budget, .. }) => {
                    assert!(prospective > budget);
                    assert!(!ledger.contains(parcel.id()));
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
            assert!(ledger.total_acreage() <= ledger.budget());
        }
    }
}

#[test]
fn test_toggle_twice_restores_state() {
    for seed in SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let parcels = catalog(&mut rng, 30);
        let mut ledger = Ledger::new(40.0).unwrap();

        // Random warm-up so the pair is tested against varied prior states.
        for _ in 0..rng.gen_range(0..50) {
            let _ = ledger.toggle(&parcels[rng.gen_range(0..parcels.len())]);
        }

        for parcel in &parcels {
            let before_ids: Vec<ParcelId> =
                ledger.snapshot().parcels.iter().map(|p| p.id().clone()).collect();
            let before_total = ledger.total_acreage();

            match ledger.toggle(parcel) {
                Ok(_) => {
                    ledger.toggle(parcel).unwrap();
                }
                // A rejected add never changed anything, so there is nothing to undo.
                Err(LedgerError::BudgetExceeded { .. }) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }

            let mut after_ids: Vec<ParcelId> =
                ledger.snapshot().parcels.iter().map(|p| p.id().clone()).collect();
            let mut sorted_before = before_ids.clone();
            sorted_before.sort();
            after_ids.sort();
            assert_eq!(after_ids, sorted_before);
            assert_abs_diff_eq!(ledger.total_acreage(), before_total, epsilon = EPSILON);
        }
    }
}

#[test]
fn test_rejected_budget_edit_changes_nothing() {
    for seed in SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let parcels = catalog(&mut rng, 20);
        let mut ledger = Ledger::new(15.0).unwrap();
        for parcel in &parcels {
            let _ = ledger.toggle(parcel);
        }

        let total = ledger.total_acreage();
        if total == 0.0 {
            continue;
        }
        let budget = ledger.budget();
        let members = ledger.len();
        let requested = total * rng.gen_range(0.0..0.999);

        let err = ledger.set_budget(requested).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidBudget {
                requested,
                selected: total,
                current: budget,
            }
        );
        assert_eq!(ledger.budget(), budget);
        assert_eq!(ledger.len(), members);
        assert_eq!(ledger.total_acreage(), total);
    }
}

#[test]
fn test_reset_catalog_from_any_state() {
    for seed in SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let parcels = catalog(&mut rng, 25);
        let budget = rng.gen_range(5.0..50.0);
        let mut ledger = Ledger::new(budget).unwrap();
        for _ in 0..rng.gen_range(0..100) {
            let _ = ledger.toggle(&parcels[rng.gen_range(0..parcels.len())]);
        }

        ledger.reset_catalog();

        assert!(ledger.is_empty());
        assert_eq!(ledger.total_acreage(), 0.0);
        assert_eq!(ledger.budget(), budget);
    }
}

#[test]
fn test_development_limit_scenario() {
    let a = Parcel::new("A", 6.0, "scenario");
    let b = Parcel::new("B", 5.0, "scenario");
    let c = Parcel::new("C", 4.0, "scenario");
    let mut ledger = Ledger::new(10.0).unwrap();

    assert_eq!(ledger.toggle(&a), Ok(ToggleOutcome::Selected));
    assert_eq!(ledger.total_acreage(), 6.0);

    assert!(matches!(ledger.toggle(&b), Err(LedgerError::BudgetExceeded { .. })));
    assert_eq!(ledger.total_acreage(), 6.0);

    assert_eq!(ledger.toggle(&c), Ok(ToggleOutcome::Selected));
    assert_eq!(ledger.total_acreage(), 10.0);

    assert_eq!(ledger.toggle(&a), Ok(ToggleOutcome::Unselected));
    assert_eq!(ledger.total_acreage(), 4.0);

    assert!(matches!(ledger.set_budget(3.0), Err(LedgerError::InvalidBudget { .. })));
    assert_eq!(ledger.budget(), 10.0);

    assert_eq!(ledger.set_budget(4.0), Ok(()));
    assert_eq!(ledger.budget(), 4.0);
}
