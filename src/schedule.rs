//! Update check scheduling.
//!
//! A single RFC-3339 timestamp (the next time a check is allowed) is
//! persisted to disk so rapid process restarts do not hammer the update
//! server. The file carries no lock; concurrent processes sharing it
//! can at worst cause a redundant check, never corruption — it plays no
//! part in the binary-swap critical section.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// How far checks are pushed out when the state file is unreadable
/// garbage. A corrupt file must never cause a runaway check loop.
const CORRUPT_STATE_BACKOFF_DAYS: i64 = 365;

/// Filesystem-backed check schedule.
pub struct FsSchedule {
    path: PathBuf,
    base_interval: Duration,
    jitter_max: Duration,
}

impl FsSchedule {
    pub fn new(path: PathBuf, base_interval: Duration, jitter_max: Duration) -> Self {
        Self {
            path,
            base_interval,
            jitter_max,
        }
    }

    /// Whether a check is due at `now`.
    ///
    /// Missing state means "due now" (first run, or state wiped).
    /// Unparsable state means "not due", and a far-future timestamp is
    /// written defensively so the bad file stops mattering.
    pub fn should_check(&self, now: DateTime<Utc>) -> bool {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return true,
        };

        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(next) => now >= next.with_timezone(&Utc),
            Err(_) => {
                warn!(path = %self.path.display(), "corrupt update schedule state, deferring checks");
                if let Err(err) = self.persist(now + Duration::days(CORRUPT_STATE_BACKOFF_DAYS)) {
                    warn!(error = %err, "could not rewrite schedule state");
                }
                false
            }
        }
    }

    /// Records that a check happened at `now`.
    ///
    /// Persists `now + base_interval + uniform(0, jitter_max)`. The
    /// jitter desynchronizes fleets of instances that all started at
    /// the same time.
    pub fn record_checked(&self, now: DateTime<Utc>) -> Result<()> {
        let jitter_secs = self.jitter_max.num_seconds();
        let jitter = if jitter_secs > 0 {
            Duration::seconds(rand::thread_rng().gen_range(0..=jitter_secs))
        } else {
            Duration::zero()
        };
        self.persist(now + self.base_interval + jitter)
    }

    fn persist(&self, next: DateTime<Utc>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("could not create state directory {}", dir.display()))?;
        }
        fs::write(&self.path, next.to_rfc3339())
            .with_context(|| format!("could not write schedule state {}", self.path.display()))
    }
}
