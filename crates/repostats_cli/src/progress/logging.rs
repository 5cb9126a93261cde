use repostats::FetchProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: FetchProgress) {
        match event {
            FetchProgress::CheckingRepository { repo } => {
                tracing::info!(repo = %repo, "Checking repository");
            }

            FetchProgress::FetchingPage { resource, page } => {
                tracing::debug!(resource = %resource, page, "Fetching page");
            }

            FetchProgress::FetchedPage {
                resource,
                page,
                count,
                total_so_far,
                expected_pages,
            } => {
                tracing::debug!(resource = %resource, page, count, total_so_far, expected_pages = ?expected_pages, "Fetched page");
            }

            FetchProgress::FetchComplete {
                resource,
                total,
                pages,
            } => {
                tracing::info!(resource = %resource, total, pages, "Fetch complete");
            }

            FetchProgress::StatsComputed { repo, issues } => {
                tracing::info!(repo = %repo, issues, "Statistics computed");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
