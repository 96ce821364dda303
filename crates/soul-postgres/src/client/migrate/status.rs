use std::time::Duration;

/// Applied and pending migration versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Applied versions in chronological order.
    pub applied_versions: Vec<String>,
    /// Embedded versions not yet applied.
    pub pending_versions: Vec<String>,
}

impl MigrationStatus {
    pub fn new(applied_versions: Vec<String>, pending_versions: Vec<String>) -> Self {
        Self {
            applied_versions,
            pending_versions,
        }
    }

    /// Returns the most recently applied version.
    pub fn last_applied_version(&self) -> Option<&str> {
        self.applied_versions.last().map(String::as_str)
    }

    #[inline]
    pub fn pending_migrations(&self) -> usize {
        self.pending_versions.len()
    }

    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.pending_versions.is_empty()
    }
}

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    /// Wall time of the whole run.
    pub duration: Duration,
    /// Versions applied by this run.
    pub processed_versions: Vec<String>,
}

impl MigrationResult {
    pub fn new(duration: Duration, processed_versions: Vec<String>) -> Self {
        Self {
            duration,
            processed_versions,
        }
    }

    /// Returns true if nothing had to be applied.
    pub fn is_no_op(&self) -> bool {
        self.processed_versions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reports_pending() {
        let status = MigrationStatus::new(
            vec!["20250101000000".into()],
            vec!["20250101000001".into()],
        );

        assert!(!status.is_up_to_date());
        assert_eq!(status.pending_migrations(), 1);
        assert_eq!(status.last_applied_version(), Some("20250101000000"));
    }

    #[test]
    fn empty_run_is_no_op() {
        let result = MigrationResult::new(Duration::from_millis(3), Vec::new());
        assert!(result.is_no_op());
    }
}
