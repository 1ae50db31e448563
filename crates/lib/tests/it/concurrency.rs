//! Stress tests running model operations from many threads at once.
//!
//! Every test here shares models across scoped threads and checks that
//! reads never observe anything but a value that was actually written.

use std::{
    sync::{
        Arc, Barrier,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use docview::{Model, ModelOptions, lock::GuardPool};

use crate::helpers::*;

const THREADS: usize = 8;
const ITERATIONS: usize = 200;

fn fresh_person(mutable: bool) -> Model<Person> {
    Model::new(person_data(), mutable)
}

#[test]
fn test_concurrent_materialization_of_fresh_model() {
    for _ in 0..20 {
        let model = fresh_person(false);
        let barrier = Barrier::new(THREADS);
        let expected = person_data();

        thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    barrier.wait();
                    assert_eq!(model.current_data(false, false), expected);
                });
            }
        });
    }
}

#[test]
fn test_concurrent_equality() {
    let left = fresh_person(false);
    let right = fresh_person(true);

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..ITERATIONS / 4 {
                    assert_eq!(left, right);
                    assert_eq!(right, left);
                }
            });
        }
    });
}

#[test]
fn test_concurrent_copies() {
    let source = fresh_person(true);
    source.first_name.set("Jane".into()).unwrap();

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..ITERATIONS / 4 {
                    let copy = source.mutable_copy();
                    assert_eq!(copy.first_name.value(), "Jane");
                    copy.last_name.set("Doe".into()).unwrap();
                    assert_eq!(source.last_name.value(), "Appleseed");

                    let frozen = source.frozen_copy();
                    assert!(!frozen.is_mutable());
                    assert_eq!(frozen.first_name.value(), "Jane");
                }
            });
        }
    });
}

#[test]
fn test_reads_see_only_written_values() {
    let model = fresh_person(true);
    let done = AtomicBool::new(false);
    let allowed: Vec<i64> = std::iter::once(69).chain(0..ITERATIONS as i64).collect();

    thread::scope(|s| {
        s.spawn(|| {
            for age in 0..ITERATIONS as i64 {
                model.age.set(age).unwrap();
                model.city.set(format!("City {age}")).unwrap();
                if age % 10 == 0 {
                    model.clear_mutations();
                }
            }
            done.store(true, Ordering::Release);
        });

        for _ in 0..THREADS {
            s.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    let age = model.age.value();
                    assert!(allowed.contains(&age), "unexpected age {age}");

                    let city = model.city.value();
                    assert!(city == "Cupertino" || city.starts_with("City "));

                    let data = model.current_data(false, false);
                    assert!(data["age"].as_i64().is_some_and(|a| allowed.contains(&a)));
                    assert_eq!(data["profile"]["tagline"], "Think different");
                }
            });
        }
    });
}

#[test]
fn test_sub_model_writes_against_root_reads() {
    let model = Model::copy_of(&wyatt(), false, true);
    let purchases = model.purchases.value();
    assert_eq!(purchases.len(), 3);

    thread::scope(|s| {
        for (index, purchase) in purchases.iter().enumerate() {
            s.spawn(move || {
                for round in 0..ITERATIONS {
                    purchase.price.set((index * 1000 + round) as f64).unwrap();
                }
            });
        }
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..ITERATIONS / 4 {
                    let data = model.current_data(false, true);
                    let past = data["pastPurchases"].as_array().unwrap();
                    assert_eq!(past.len(), 3);
                    assert_eq!(data["firstName"], "Wyatt");
                }
            });
        }
    });

    let last = (ITERATIONS - 1) as f64;
    for (index, purchase) in purchases.iter().enumerate() {
        assert_eq!(purchase.price.value(), (index * 1000) as f64 + last);
    }
}

#[test]
fn test_assigned_sub_model_writes_against_root_reads() {
    let model = mutable_wyatt();
    let foreign = Model::<Purchase>::from_value(
        serde_json::json!({"purchaseDate": "2020-01-02T03:04:05Z", "purchasePrice": 1.0}),
        true,
    )
    .unwrap();
    model.current_purchase.set(Some(foreign)).unwrap();
    let purchase = model.current_purchase.value().unwrap();
    assert!(purchase.shares_guard_with(&model));

    thread::scope(|s| {
        s.spawn(|| {
            for round in 0..ITERATIONS {
                purchase.price.set(round as f64).unwrap();
                purchase.adjustment.set(round as i64).unwrap();
            }
        });
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..ITERATIONS / 4 {
                    let data = model.current_data(false, false);
                    let current = &data["currentPurchase"];
                    let price = current["purchasePrice"].as_f64().unwrap();
                    assert!(price == 1.0 || (0.0..ITERATIONS as f64).contains(&price));
                    assert_eq!(current["purchaseDate"], "2020-01-02T03:04:05Z");
                    assert_eq!(data["firstName"], "Wyatt");
                }
            });
        }
    });

    let last = (ITERATIONS - 1) as f64;
    assert_eq!(purchase.price.value(), last);
    let data = model.current_data(false, false);
    assert_eq!(data["currentPurchase"]["purchasePrice"], last);
    assert_eq!(data["currentPurchase"]["purchaseAdjustment"], last as i64);
}

#[test]
fn test_mixed_operations() {
    let model = fresh_person(true);

    thread::scope(|s| {
        for thread_index in 0..THREADS {
            let model = &model;
            s.spawn(move || {
                for round in 0..ITERATIONS / 4 {
                    match (thread_index + round) % 5 {
                        0 => {
                            let _ = model.current_data(true, true);
                        }
                        1 => model.score.set(round as f64).unwrap(),
                        2 => {
                            let copy = model.mutable_copy();
                            copy.bio.set("copied".into()).unwrap();
                        }
                        3 => {
                            let _ = model.archive();
                        }
                        _ => model.follower_count.clear(),
                    }
                }
            });
        }
    });

    assert_eq!(model.bio.value(), "Sent from my iPhone");
    assert_eq!(model.follower_count.value(), 1_000_000_000);
}

#[test]
fn test_guards_return_to_pool() {
    let pool = Arc::new(GuardPool::new());
    let options = ModelOptions::new().mutable(true).pool(Arc::clone(&pool));

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..ITERATIONS / 4 {
                    let model = Model::<Person>::with_options(person_data(), &options);
                    let copy = model.mutable_copy();
                    assert_eq!(copy.city.value(), "Cupertino");
                }
            });
        }
    });

    let stats = pool.stats();
    assert_eq!(stats.active, 0);
    assert!(stats.idle > 0);
}
