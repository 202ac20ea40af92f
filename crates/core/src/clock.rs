//! Server-side timestamps.
//!
//! Timestamps are assigned by the store, never by the caller, and serialize
//! to a fixed-width RFC 3339 string so that string order equals time order.

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerTimestamp(DateTime<Utc>);

impl ServerTimestamp {
    pub fn from_datetime(value: DateTime<Utc>) -> Self {
        Self(value)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for ServerTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Nanos, true))
    }
}

impl FromStr for ServerTimestamp {
    type Err = chrono::ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        DateTime::parse_from_rfc3339(value).map(|parsed| Self(parsed.with_timezone(&Utc)))
    }
}

impl From<ServerTimestamp> for serde_json::Value {
    fn from(value: ServerTimestamp) -> Self {
        serde_json::Value::String(value.to_string())
    }
}

impl Serialize for ServerTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ServerTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Wall clock that never hands out the same instant twice.
///
/// Two calls within the clock's resolution are separated by one nanosecond,
/// so documents stamped in sequence keep their insertion order when sorted.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl MonotonicClock {
    pub fn now(&self) -> ServerTimestamp {
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let wall = Utc::now();
        let next = match *last {
            Some(previous) if wall <= previous => previous + Duration::nanoseconds(1),
            _ => wall,
        };
        *last = Some(next);
        ServerTimestamp(next)
    }
}
