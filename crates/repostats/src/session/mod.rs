//! Repository session: builds the in-memory snapshot of one repository.
//!
//! A [`Session`] owns the snapshot and the statistics derived from it. Every
//! load sequence takes a new generation number; results that arrive after a
//! newer load or a [`Session::reset`] has started are discarded instead of
//! being written over the newer state.
//!
//! ```no_run
//! use repostats::github::{DEFAULT_API_URL, DEFAULT_TIMEOUT, GitHubClient};
//! use repostats::session::Session;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GitHubClient::new(DEFAULT_API_URL, None, DEFAULT_TIMEOUT)?;
//! let session = Session::new(client);
//! let loaded = session.load("rust-lang/rust").await?;
//! println!("{} issues", loaded.stats.total_at(&["Issues"]).unwrap_or(0));
//! # Ok(())
//! # }
//! ```

mod error;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, MutexGuard};

use crate::github::{
    GitHubBranch, GitHubClient, GitHubIssue, GitHubLabel, GitHubRepo, Paginated,
    short_error_message, to_issue, to_label,
};
use crate::model::RepositorySnapshot;
use crate::progress::{FetchProgress, ProgressCallback, emit};
use crate::stats::{StatsTree, compute_stats};
use crate::validation::RepoName;

pub use error::SessionError;

#[derive(Debug, Default)]
struct SessionState {
    snapshot: RepositorySnapshot,
    stats: Option<StatsTree>,
}

/// Result of a successful load.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub generation: u64,
    pub snapshot: RepositorySnapshot,
    pub stats: StatsTree,
    /// Non-fatal failures (branch or label fetches) that were skipped.
    pub warnings: Vec<String>,
}

/// Handle to one repository session. Clones share the same state.
#[derive(Clone)]
pub struct Session {
    client: GitHubClient,
    state: Arc<Mutex<SessionState>>,
    generation: Arc<AtomicU64>,
    on_progress: Option<Arc<ProgressCallback>>,
}

impl Session {
    pub fn new(client: GitHubClient) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(SessionState::default())),
            generation: Arc::new(AtomicU64::new(0)),
            on_progress: None,
        }
    }

    /// Report fetch progress through `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn client(&self) -> &GitHubClient {
        &self.client
    }

    /// The generation of the most recent load or reset.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn progress(&self) -> Option<&ProgressCallback> {
        self.on_progress.as_deref()
    }

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Lock the state, failing if `generation` is no longer the latest.
    async fn lock_current(
        &self,
        generation: u64,
    ) -> Result<MutexGuard<'_, SessionState>, SessionError> {
        let state = self.state.lock().await;
        if self.generation() != generation {
            tracing::debug!(
                generation,
                current = self.generation(),
                "Discarding stale results"
            );
            return Err(SessionError::Superseded);
        }
        Ok(state)
    }

    async fn clear_if_current(&self, generation: u64) {
        if let Ok(mut state) = self.lock_current(generation).await {
            *state = SessionState::default();
        }
    }

    /// Validate `input`, then load the repository it names.
    ///
    /// An invalid identifier clears the session and returns
    /// [`SessionError::Validation`] without making any request.
    pub async fn load(&self, input: &str) -> Result<Loaded, SessionError> {
        match RepoName::parse(input) {
            Ok(name) => self.check_existence(&name).await,
            Err(err) => {
                tracing::debug!(input, "Rejected repository name");
                self.reset().await;
                Err(err.into())
            }
        }
    }

    /// Check that a repository exists and, if so, fetch branches, labels and
    /// issues one after another and compute its statistics.
    ///
    /// Branch and label failures are logged and reported in
    /// [`Loaded::warnings`]. Any other failure clears the session.
    pub async fn check_existence(&self, name: &RepoName) -> Result<Loaded, SessionError> {
        let generation = self.begin();
        let repo = name.full_name();
        tracing::info!(repo = %repo, generation, "Loading repository");

        match self.run_load(generation, &repo).await {
            Ok(loaded) => Ok(loaded),
            Err(SessionError::Superseded) => Err(SessionError::Superseded),
            Err(err) => {
                tracing::warn!(repo = %repo, generation, "Failed to load repository: {err}");
                self.clear_if_current(generation).await;
                Err(err)
            }
        }
    }

    async fn run_load(&self, generation: u64, repo: &str) -> Result<Loaded, SessionError> {
        emit(
            self.progress(),
            FetchProgress::CheckingRepository {
                repo: repo.to_string(),
            },
        );

        let response = self.client.get_response(&format!("/repos/{repo}")).await?;
        let info: GitHubRepo = match response.meta.status {
            200 => response.json()?,
            404 => return Err(SessionError::NotFound),
            status => return Err(SessionError::UnexpectedStatus(status)),
        };

        {
            let mut state = self.lock_current(generation).await?;
            state.snapshot = RepositorySnapshot {
                name: repo.to_string(),
                default_branch: info.default_branch,
                ..Default::default()
            };
            state.stats = None;
        }

        let mut warnings = Vec::new();

        match self.fetch_branches_at(generation, repo).await {
            Ok(_) => {}
            Err(SessionError::Superseded) => return Err(SessionError::Superseded),
            Err(err) => {
                tracing::warn!(repo, "Error fetching branches: {err}");
                warnings.push(warning("branches", &err));
            }
        }

        match self.fetch_labels_at(generation, repo).await {
            Ok(_) => {}
            Err(SessionError::Superseded) => return Err(SessionError::Superseded),
            Err(err) => {
                tracing::warn!(repo, "Error fetching labels: {err}");
                warnings.push(warning("labels", &err));
            }
        }

        // Statistics are meaningless without issues.
        self.fetch_issues_at(generation, repo).await?;

        let mut state = self.lock_current(generation).await?;
        let stats = compute_stats(&state.snapshot);
        state.stats = Some(stats.clone());
        emit(
            self.progress(),
            FetchProgress::StatsComputed {
                repo: repo.to_string(),
                issues: state.snapshot.issues.len(),
            },
        );
        tracing::info!(
            repo,
            generation,
            branches = state.snapshot.branches.len(),
            labels = state.snapshot.labels.len(),
            issues = state.snapshot.issues.len(),
            "Repository loaded"
        );

        Ok(Loaded {
            generation,
            snapshot: state.snapshot.clone(),
            stats,
            warnings,
        })
    }

    /// Name and generation of the loaded repository.
    async fn current_target(&self) -> Result<(u64, String), SessionError> {
        let state = self.state.lock().await;
        if state.snapshot.name.is_empty() {
            return Err(SessionError::NoRepository);
        }
        Ok((self.generation(), state.snapshot.name.clone()))
    }

    /// Re-fetch the branch list of the loaded repository, replacing it.
    pub async fn fetch_branches(&self) -> Result<usize, SessionError> {
        let (generation, repo) = self.current_target().await?;
        self.fetch_branches_at(generation, &repo).await
    }

    /// Re-fetch the labels of the loaded repository, replacing them.
    pub async fn fetch_labels(&self) -> Result<usize, SessionError> {
        let (generation, repo) = self.current_target().await?;
        self.fetch_labels_at(generation, &repo).await
    }

    /// Re-fetch the issues of the loaded repository, replacing them.
    pub async fn fetch_issues(&self) -> Result<usize, SessionError> {
        let (generation, repo) = self.current_target().await?;
        self.fetch_issues_at(generation, &repo).await
    }

    async fn fetch_branches_at(&self, generation: u64, repo: &str) -> Result<usize, SessionError> {
        let page: Paginated<GitHubBranch> = self
            .client
            .get_paginated(&format!("/repos/{repo}/branches"), &[], self.progress())
            .await?;
        let branches: Vec<String> = page.items.into_iter().map(|b| b.name).collect();
        let count = branches.len();

        let mut state = self.lock_current(generation).await?;
        state.snapshot.branches = branches;
        state.stats = None;
        tracing::debug!(repo, count, "Stored branches");
        Ok(count)
    }

    async fn fetch_labels_at(&self, generation: u64, repo: &str) -> Result<usize, SessionError> {
        let page: Paginated<GitHubLabel> = self
            .client
            .get_paginated(&format!("/repos/{repo}/labels"), &[], self.progress())
            .await?;
        let labels: BTreeMap<_, _> = page
            .items
            .into_iter()
            .map(|label| (label.id, to_label(label)))
            .collect();
        let count = labels.len();

        let mut state = self.lock_current(generation).await?;
        state.snapshot.labels = labels;
        state.stats = None;
        tracing::debug!(repo, count, "Stored labels");
        Ok(count)
    }

    async fn fetch_issues_at(&self, generation: u64, repo: &str) -> Result<usize, SessionError> {
        let page: Paginated<GitHubIssue> = self
            .client
            .get_paginated(
                &format!("/repos/{repo}/issues"),
                &[("state", "all")],
                self.progress(),
            )
            .await?;
        let fetched = page.items.len();
        let issues: BTreeMap<_, _> = page
            .items
            .into_iter()
            .filter_map(to_issue)
            .map(|issue| (issue.id, issue))
            .collect();
        let count = issues.len();

        let mut state = self.lock_current(generation).await?;
        state.snapshot.issues = issues;
        state.stats = None;
        tracing::debug!(
            repo,
            count,
            pull_requests = fetched - count,
            "Stored issues"
        );
        Ok(count)
    }

    /// Recompute statistics from the current snapshot and keep them.
    pub async fn compute_stats(&self) -> StatsTree {
        let mut state = self.state.lock().await;
        let stats = compute_stats(&state.snapshot);
        state.stats = Some(stats.clone());
        stats
    }

    /// Clear the session and invalidate any load still in flight.
    pub async fn reset(&self) {
        let generation = self.begin();
        let mut state = self.state.lock().await;
        *state = SessionState::default();
        tracing::debug!(generation, "Session reset");
    }

    pub async fn snapshot(&self) -> RepositorySnapshot {
        self.state.lock().await.snapshot.clone()
    }

    /// Statistics of the last load or [`compute_stats`](Self::compute_stats)
    /// call, if the snapshot has not changed since.
    pub async fn stats(&self) -> Option<StatsTree> {
        self.state.lock().await.stats.clone()
    }
}

fn warning(resource: &str, err: &SessionError) -> String {
    match err {
        SessionError::Transport(e) => format!("{resource}: {}", short_error_message(e)),
        other => format!("{resource}: {other}"),
    }
}
