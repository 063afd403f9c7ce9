#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use selfup::schedule::FsSchedule;
    use std::fs;
    use tempfile::TempDir;

    fn schedule_in(dir: &TempDir, interval_secs: i64, jitter_secs: i64) -> FsSchedule {
        FsSchedule::new(
            dir.path().join("cktime"),
            Duration::seconds(interval_secs),
            Duration::seconds(jitter_secs),
        )
    }

    #[test]
    fn test_missing_state_means_due_now() {
        let dir = tempfile::tempdir().unwrap();
        let schedule = schedule_in(&dir, 3600, 0);

        assert!(schedule.should_check(Utc::now()));
    }

    #[test]
    fn test_not_due_within_base_interval_after_check() {
        let dir = tempfile::tempdir().unwrap();
        let schedule = schedule_in(&dir, 3600, 0);
        let now = Utc::now();

        schedule.record_checked(now).unwrap();

        assert!(!schedule.should_check(now));
        assert!(!schedule.should_check(now + Duration::seconds(3599)));
        assert!(schedule.should_check(now + Duration::seconds(3600)));
    }

    #[test]
    fn test_due_after_interval_plus_max_jitter() {
        let dir = tempfile::tempdir().unwrap();
        let schedule = schedule_in(&dir, 3600, 60);
        let now = Utc::now();

        schedule.record_checked(now).unwrap();

        // The jitter lands somewhere in [0, 60]; the window edges are
        // the only deterministic assertions.
        assert!(!schedule.should_check(now + Duration::seconds(3599)));
        assert!(schedule.should_check(now + Duration::seconds(3660)));
    }

    #[test]
    fn test_corrupt_state_defers_instead_of_looping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cktime");
        fs::write(&path, "certainly not an rfc3339 timestamp").unwrap();
        let schedule = FsSchedule::new(path.clone(), Duration::seconds(3600), Duration::zero());
        let now = Utc::now();

        // Not due, and the garbage was replaced with a far-future time.
        assert!(!schedule.should_check(now));
        assert!(!schedule.should_check(now + Duration::days(300)));
        assert!(schedule.should_check(now + Duration::days(400)));

        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(rewritten.trim()).is_ok());
    }

    #[test]
    fn test_record_checked_creates_state_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("update").join("cktime");
        let schedule = FsSchedule::new(nested.clone(), Duration::seconds(60), Duration::zero());

        schedule.record_checked(Utc::now()).unwrap();

        assert!(nested.exists());
    }

    #[test]
    fn test_persisted_state_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();

        schedule_in(&dir, 3600, 0).record_checked(now).unwrap();

        // A fresh instance reading the same file agrees.
        let reloaded = schedule_in(&dir, 3600, 0);
        assert!(!reloaded.should_check(now + Duration::seconds(10)));
    }
}
