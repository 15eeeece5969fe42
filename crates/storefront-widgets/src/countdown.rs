//! # Countdown Timers
//!
//! Urgency timers bound to a `data-countdown` deadline (epoch milliseconds).
//!
//! ## Timeline
//! ```text
//! start ──tick──► "0h 0m 2s" ──tick──► "0h 0m 1s" ──tick──► "Offer expired!" ■
//!        (1s)                 (1s)                 (1s)       run() returns
//! ```
//!
//! The first render happens one tick after `run` starts.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

const MS_PER_HOUR: i64 = 60 * 60 * 1000;
const MS_PER_MINUTE: i64 = 60 * 1000;
const MS_PER_SECOND: i64 = 1000;

/// Parses a `data-countdown` attribute value.
///
/// Reads the leading integer like the browser's `parseInt`, so `"1700000000000ms"`
/// yields `1700000000000`. Missing or unparseable values yield 0, which is
/// already expired.
pub fn parse_countdown_attr(value: Option<&str>) -> i64 {
    let Some(value) = value else {
        return 0;
    };
    let trimmed = value.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digits = trimmed[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed.len(), |end| end + sign_len);

    trimmed[..digits].parse().unwrap_or(0)
}

/// What a countdown element shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownDisplay {
    Remaining { hours: i64, minutes: i64, seconds: i64 },
    Expired,
}

impl CountdownDisplay {
    pub fn is_expired(&self) -> bool {
        matches!(self, CountdownDisplay::Expired)
    }
}

impl fmt::Display for CountdownDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountdownDisplay::Remaining {
                hours,
                minutes,
                seconds,
            } => write!(f, "{}h {}m {}s", hours, minutes, seconds),
            CountdownDisplay::Expired => f.write_str("Offer expired!"),
        }
    }
}

/// A timer counting down to a fixed deadline.
#[derive(Debug, Clone)]
pub struct Countdown {
    deadline: DateTime<Utc>,
    tick: Duration,
}

impl Countdown {
    /// Creates a countdown. A zero tick is raised to 1ms.
    pub fn new(deadline: DateTime<Utc>, tick: Duration) -> Self {
        Countdown {
            deadline,
            tick: tick.max(Duration::from_millis(1)),
        }
    }

    /// Builds a countdown from a raw `data-countdown` attribute.
    pub fn from_attribute(value: Option<&str>, tick: Duration) -> Self {
        let millis = parse_countdown_attr(value);
        let deadline = Utc.timestamp_millis_opt(millis).single().unwrap_or_default();
        Self::new(deadline, tick)
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// The display at instant `now`.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> CountdownDisplay {
        let left = (self.deadline - now).num_milliseconds();
        if left <= 0 {
            return CountdownDisplay::Expired;
        }

        CountdownDisplay::Remaining {
            hours: left / MS_PER_HOUR,
            minutes: (left % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (left % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }

    /// Renders on every tick against the wall clock until expired.
    pub async fn run<F>(&self, render: F)
    where
        F: FnMut(&CountdownDisplay),
    {
        self.run_with_clock(Utc::now, render).await
    }

    /// Same as [`Countdown::run`] with an explicit clock.
    pub async fn run_with_clock<C, F>(&self, clock: C, mut render: F)
    where
        C: Fn() -> DateTime<Utc>,
        F: FnMut(&CountdownDisplay),
    {
        let mut ticker = interval_at(Instant::now() + self.tick, self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let display = self.remaining_at(clock());
            render(&display);
            if display.is_expired() {
                debug!(deadline = %self.deadline, "Countdown expired");
                return;
            }
        }
    }
}
