// src/lifecycle/session.rs

//! Session ids handed out at claim time.
//!
//! An id is `session-<YYYYmmdd>-<HHMMSS>-<suffix>`: the timestamp makes ids
//! sort chronologically, the random base-36 suffix separates claims made
//! within the same second.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Local};
use rand::Rng;

const SUFFIX_LEN: usize = 6;
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Produces session identifiers.
pub trait SessionIdGenerator: Send + Sync {
    fn generate(&self, now: DateTime<Local>) -> String;
}

/// Random-suffix generator that never repeats an id within one process.
///
/// Only suffixes of the current second are remembered; ids from different
/// seconds differ in their timestamp.
#[derive(Debug, Default)]
pub struct RandomSessionIds {
    issued: Mutex<IssuedThisSecond>,
}

#[derive(Debug, Default)]
struct IssuedThisSecond {
    stamp: String,
    suffixes: HashSet<String>,
}

impl RandomSessionIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionIdGenerator for RandomSessionIds {
    fn generate(&self, now: DateTime<Local>) -> String {
        let stamp = now.format("%Y%m%d-%H%M%S").to_string();
        let mut issued = self.issued.lock().unwrap_or_else(PoisonError::into_inner);
        if issued.stamp != stamp {
            issued.stamp.clone_from(&stamp);
            issued.suffixes.clear();
        }
        let mut rng = rand::thread_rng();
        loop {
            let suffix: String = (0..SUFFIX_LEN)
                .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
                .collect();
            if issued.suffixes.insert(suffix.clone()) {
                return format!("session-{stamp}-{suffix}");
            }
        }
    }
}

/// Hands out `session-test-1`, `session-test-2`, ... for deterministic tests.
#[derive(Debug, Default)]
pub struct SequentialSessionIds {
    next: Mutex<u64>,
}

impl SessionIdGenerator for SequentialSessionIds {
    fn generate(&self, _now: DateTime<Local>) -> String {
        let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
        *next += 1;
        format!("session-test-{}", *next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::clock::FixedClock;
    use crate::lifecycle::Clock;

    #[test]
    fn same_tick_ids_do_not_collide() {
        let clock = FixedClock::at("2024-05-01 09:30:00").unwrap();
        let ids = RandomSessionIds::new();
        let mut seen = HashSet::new();
        for _ in 0..500 {
            let id = ids.generate(clock.now());
            assert!(id.starts_with("session-20240501-093000-"));
            assert_eq!(id.len(), "session-20240501-093000-".len() + SUFFIX_LEN);
            assert!(seen.insert(id));
        }
    }

    #[test]
    fn ids_sort_chronologically_across_seconds() {
        let ids = RandomSessionIds::new();
        let early = ids.generate(FixedClock::at("2024-05-01 09:30:00").unwrap().now());
        let late = ids.generate(FixedClock::at("2024-05-01 09:30:01").unwrap().now());
        assert!(early < late);
    }

    #[test]
    fn remembered_suffixes_reset_each_second() {
        let ids = RandomSessionIds::new();
        let first = FixedClock::at("2024-05-01 09:30:00").unwrap().now();
        for _ in 0..10 {
            ids.generate(first);
        }
        assert_eq!(ids.issued.lock().unwrap().suffixes.len(), 10);

        ids.generate(FixedClock::at("2024-05-01 09:30:01").unwrap().now());
        let issued = ids.issued.lock().unwrap();
        assert_eq!(issued.stamp, "20240501-093001");
        assert_eq!(issued.suffixes.len(), 1);
    }

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialSessionIds::default();
        let now = Local::now();
        assert_eq!(ids.generate(now), "session-test-1");
        assert_eq!(ids.generate(now), "session-test-2");
    }
}
