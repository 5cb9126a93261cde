use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use repostats::FetchProgress;

/// Short display name of a resource path, e.g. `issues` for
/// `/repos/o/r/issues`.
fn resource_label(resource: &str) -> &str {
    resource.rsplit('/').next().unwrap_or(resource)
}

/// Interactive progress reporter using indicatif.
///
/// One line per resource. A resource whose page count is known (from the
/// `rel="last"` link) gets a bar; otherwise a spinner with a running count.
pub struct InteractiveReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn spinner(&self, prefix: &str, message: String) -> ProgressBar {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(Self::spinner_style());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_prefix(format!("{prefix:12}"));
        bar.set_message(message);
        bar
    }

    pub fn handle(&self, event: FetchProgress) {
        let mut bars = self.bars.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            FetchProgress::CheckingRepository { repo } => {
                let bar = self.spinner("repository", format!("Checking {repo}..."));
                bars.insert(repo, bar);
            }

            FetchProgress::FetchingPage { resource, page } => {
                if page == 1 {
                    // A completed line from an earlier load stays on screen.
                    if let Some(old) = bars.remove(&resource)
                        && !old.is_finished()
                    {
                        old.finish_and_clear();
                    }
                    let label = resource_label(&resource).to_string();
                    let bar = self.spinner(&label, format!("Fetching {label}..."));
                    bars.insert(resource, bar);
                }
            }

            FetchProgress::FetchedPage {
                resource,
                page,
                count: _,
                total_so_far,
                expected_pages,
            } => {
                if let Some(bar) = bars.get(&resource) {
                    if let Some(pages) = expected_pages
                        && bar.length().is_none()
                    {
                        bar.disable_steady_tick();
                        bar.set_length(u64::from(pages));
                        bar.set_style(Self::bar_style());
                    }
                    if let Some(len) = bar.length()
                        && u64::from(page) > len
                    {
                        bar.set_length(u64::from(page));
                    }
                    bar.set_position(u64::from(page));
                    bar.set_message(format!("Page {page} ({total_so_far} items)"));
                }
            }

            FetchProgress::FetchComplete {
                resource,
                total,
                pages,
            } => {
                if let Some(bar) = bars.get(&resource) {
                    let noun = if pages == 1 { "page" } else { "pages" };
                    bar.finish_with_message(format!("✓ {total} items, {pages} {noun}"));
                }
            }

            FetchProgress::StatsComputed { repo, issues } => {
                if let Some(bar) = bars.get(&repo) {
                    bar.finish_with_message(format!("✓ {repo} ({issues} issues)"));
                }
            }

            _ => {}
        }
    }

    pub fn clear(&self) {
        self.multi.clear().ok();
    }

    pub fn finish(&self) {
        let bars = self.bars.lock().unwrap_or_else(|e| e.into_inner());
        for bar in bars.values() {
            if !bar.is_finished() {
                bar.finish();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hidden() -> InteractiveReporter {
        InteractiveReporter::with_target(ProgressDrawTarget::hidden())
    }

    fn bar(reporter: &InteractiveReporter, key: &str) -> ProgressBar {
        reporter.bars.lock().unwrap()[key].clone()
    }

    #[test]
    fn test_resource_label() {
        assert_eq!(resource_label("/repos/octo/demo/issues"), "issues");
        assert_eq!(resource_label("labels"), "labels");
    }

    #[test]
    fn test_page_events_drive_one_line_per_resource() {
        let reporter = hidden();
        let resource = "/repos/octo/demo/issues".to_string();

        reporter.handle(FetchProgress::FetchingPage {
            resource: resource.clone(),
            page: 1,
        });
        reporter.handle(FetchProgress::FetchedPage {
            resource: resource.clone(),
            page: 1,
            count: 100,
            total_so_far: 100,
            expected_pages: Some(3),
        });
        reporter.handle(FetchProgress::FetchingPage {
            resource: resource.clone(),
            page: 2,
        });

        let line = bar(&reporter, &resource);
        assert_eq!(line.length(), Some(3));
        assert_eq!(line.position(), 1);
        assert_eq!(reporter.bars.lock().unwrap().len(), 1);

        reporter.handle(FetchProgress::FetchComplete {
            resource: resource.clone(),
            total: 250,
            pages: 3,
        });
        assert!(line.is_finished());
    }

    #[test]
    fn test_finish_completes_open_lines() {
        let reporter = hidden();
        reporter.handle(FetchProgress::CheckingRepository {
            repo: "octo/demo".to_string(),
        });
        let line = bar(&reporter, "octo/demo");
        assert!(!line.is_finished());

        reporter.finish();
        assert!(line.is_finished());
    }
}
