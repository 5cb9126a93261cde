//! Progress reporting for fetch operations.
//!
//! The fetch client and the session emit [`FetchProgress`] events through an
//! optional callback so a front end can drive a spinner or log lines without
//! the library knowing how they are displayed.

/// Progress events emitted while loading a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FetchProgress {
    /// Checking that a repository exists.
    CheckingRepository {
        /// `owner/repo`.
        repo: String,
    },

    /// About to request one page of a paginated resource.
    FetchingPage {
        /// Path of the resource, e.g. `/repos/o/r/issues`.
        resource: String,
        /// Page number (1-indexed).
        page: u32,
    },

    /// Fetched a page of a paginated resource.
    FetchedPage {
        resource: String,
        /// Page number (1-indexed).
        page: u32,
        /// Number of items on this page.
        count: usize,
        /// Running total of items fetched so far.
        total_so_far: usize,
        /// Expected total pages (if the Link header carried `rel="last"`).
        expected_pages: Option<u32>,
    },

    /// Finished fetching every page of a resource.
    FetchComplete {
        resource: String,
        /// Total number of items fetched.
        total: usize,
        /// Number of pages requested.
        pages: u32,
    },

    /// Statistics were computed for the loaded snapshot.
    StatsComputed {
        repo: String,
        /// Number of issues the statistics cover.
        issues: usize,
    },
}

/// Callback type for progress reporting.
pub type ProgressCallback = Box<dyn Fn(FetchProgress) + Send + Sync>;

/// Helper to emit progress events.
///
/// Does nothing if `on_progress` is `None`.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: FetchProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_emit_with_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let callback: ProgressCallback = Box::new(move |event| {
            seen_clone.lock().unwrap().push(event);
        });

        emit(
            Some(&callback),
            FetchProgress::FetchingPage {
                resource: "/repos/o/r/labels".to_string(),
                page: 1,
            },
        );
        emit(
            Some(&callback),
            FetchProgress::FetchComplete {
                resource: "/repos/o/r/labels".to_string(),
                total: 3,
                pages: 1,
            },
        );

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(matches!(seen[0], FetchProgress::FetchingPage { page: 1, .. }));
        assert!(matches!(seen[1], FetchProgress::FetchComplete { total: 3, .. }));
    }

    #[test]
    fn test_emit_without_callback() {
        // Should not panic when callback is None
        emit(
            None,
            FetchProgress::StatsComputed {
                repo: "o/r".to_string(),
                issues: 0,
            },
        );
    }
}
