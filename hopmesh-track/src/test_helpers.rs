// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! This module provides helper functions for testing logging output
//!
//! The aim of this module is to provide commonly-used functions that enable the
//! testing of the output that should appear from logging macros.

use std::fs;
use std::io::BufWriter;
use std::path::Path;
use std::rc::Rc;

use regex::Regex;

use crate::tracker::{EntityManager, InMemoryTracker, TextTracker};
use crate::{Tracker, Writer};

/// Create a [`Tracker`] for a test which writes all events to a log file.
///
/// All log files are placed in a `traces` folder and named after the test
/// source file (pass `file!()`).
#[must_use]
pub fn create_tracker(full_filepath: &str) -> Tracker {
    // Place all trace files in one folder
    const FOLDER: &str = "traces";

    // Create that folder if it doesn't exist yet
    fs::create_dir_all(FOLDER).unwrap();

    let filename_only = Path::new(full_filepath)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap();

    let log_writer: Writer = Box::new(BufWriter::new(
        fs::File::create(format!("{FOLDER}/{filename_only}.log")).unwrap(),
    ));

    let default_log_level = log::Level::Trace;
    let entity_manger = EntityManager::new(default_log_level);
    let tracker: Tracker = Rc::new(TextTracker::new(entity_manger, log_writer));
    tracker
}

/// Create an [`InMemoryTracker`] enabled at `level` for all entities.
///
/// Returns both the concrete tracker (for checking events) and the shared
/// [`Tracker`] to pass to entities.
#[must_use]
pub fn create_in_memory_tracker(level: log::Level) -> (Rc<InMemoryTracker>, Tracker) {
    let in_memory = Rc::new(InMemoryTracker::new(EntityManager::new(level)));
    let tracker: Tracker = in_memory.clone();
    (in_memory, tracker)
}

/// Check and clear the _trace_ and _log_ output
///
/// This function asserts that the events seen since the start or the last
/// time this function was called match the `expected` regular expressions,
/// in order. It then clears the events recorded so far.
pub fn check_and_clear(tracker: &InMemoryTracker, expected: &[&str]) {
    let events = tracker.take_events();

    println!("Checking {expected:?} matches {events:?}");

    // Check that there are the same number of strings produced as expected
    assert_eq!(expected.len(), events.len());

    for (i, (log_expect, actual)) in expected.iter().zip(events.iter()).enumerate() {
        let re = Regex::new(log_expect).unwrap();
        println!("Checking {i}: {log_expect:?} matches {actual:?}");
        assert!(re.is_match(actual));
    }
}

/// Assert that at least one event seen so far matches `expected`.
pub fn assert_any_match(tracker: &InMemoryTracker, expected: &str) {
    let re = Regex::new(expected).unwrap();
    let events = tracker.events();
    assert!(
        events.iter().any(|e| re.is_match(e)),
        "No event matches {expected:?} in {events:?}"
    );
}
