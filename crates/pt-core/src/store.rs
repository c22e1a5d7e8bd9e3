//! Per-user accumulation of join and leave instants.

use std::collections::{BTreeMap, BTreeSet};

use chrono::DateTime;
use chrono_tz::Tz;

use crate::classify::LogEvent;

/// Join and leave instants observed for one user.
///
/// Set semantics: identical instants collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserEvents {
    starts: BTreeSet<DateTime<Tz>>,
    ends: BTreeSet<DateTime<Tz>>,
}

impl UserEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the instant was already recorded.
    pub fn add_start(&mut self, at: DateTime<Tz>) -> bool {
        self.starts.insert(at)
    }

    /// Returns `false` if the instant was already recorded.
    pub fn add_end(&mut self, at: DateTime<Tz>) -> bool {
        self.ends.insert(at)
    }

    pub fn has_starts(&self) -> bool {
        !self.starts.is_empty()
    }

    /// Consumes the set, returning starts and ends in ascending order.
    pub fn into_sorted(self) -> (Vec<DateTime<Tz>>, Vec<DateTime<Tz>>) {
        (
            self.starts.into_iter().collect(),
            self.ends.into_iter().collect(),
        )
    }
}

/// Events gathered during one analysis run.
#[derive(Debug, Default)]
pub struct EventStore {
    users: BTreeMap<String, UserEvents>,
    server_stops: Vec<DateTime<Tz>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's events, inserting an empty set on first sight.
    pub fn get_or_insert_empty(&mut self, user: &str) -> &mut UserEvents {
        self.users
            .entry(user.to_string())
            .or_insert_with(UserEvents::new)
    }

    /// Routes a classified line into the store.
    pub fn record(&mut self, event: LogEvent) {
        match event {
            LogEvent::Start { user, at } => {
                self.get_or_insert_empty(&user).add_start(at);
            }
            LogEvent::End { user, at } => {
                self.get_or_insert_empty(&user).add_end(at);
            }
            LogEvent::ServerStop { at } => self.server_stops.push(at),
            LogEvent::Ignored => {}
        }
    }

    /// Consumes the store. Server stops are returned in chronological order.
    pub fn into_parts(self) -> (BTreeMap<String, UserEvents>, Vec<DateTime<Tz>>) {
        let mut server_stops = self.server_stops;
        server_stops.sort();
        (self.users, server_stops)
    }
}
