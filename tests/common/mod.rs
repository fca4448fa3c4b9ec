//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use microflow::message::{ObserverSet, PipelineEvent};
use std::sync::{Arc, Mutex};

/// Observer set that records every event into the returned log
pub fn recording_observers() -> (ObserverSet, Arc<Mutex<Vec<PipelineEvent>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let mut observers = ObserverSet::new();
    observers.add(move |event: &PipelineEvent| sink.lock().unwrap().push(event.clone()));
    (observers, log)
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}
