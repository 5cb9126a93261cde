//! Repository identifier validation.
//!
//! An identifier has the form `owner/repo`. The rules mirror the ones GitHub
//! applies to user names and repository names, and every violated rule yields
//! its own message so a front end can show them all at once.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Maximum length of a GitHub user or organization name.
pub const MAX_OWNER_LEN: usize = 39;

/// Maximum length of a repository name.
pub const MAX_REPO_LEN: usize = 100;

/// One or more validation rules were violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.join(", "))]
pub struct ValidationError(pub Vec<String>);

impl ValidationError {
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

/// Validate an `owner/repo` identifier.
///
/// Returns every violated rule in a fixed order; an empty list means the
/// identifier is valid. Only the first two `/`-separated segments are looked
/// at.
///
/// ```
/// use repostats::validation::validate_repo_name;
///
/// assert!(validate_repo_name("rust-lang/cargo").is_empty());
/// assert_eq!(
///     validate_repo_name("rust--lang/cargo"),
///     vec!["Username cannot contain consecutive hyphens"],
/// );
/// ```
pub fn validate_repo_name(input: &str) -> Vec<String> {
    let mut segments = input.split('/');
    let owner = segments.next().unwrap_or_default();
    let repo = segments.next().unwrap_or_default();

    let mut messages = Vec::new();

    if owner.is_empty() {
        messages.push("Missing username".to_string());
    } else {
        if owner.starts_with('-') || owner.ends_with('-') {
            messages.push("Username cannot begin or end with a hyphen".to_string());
        }
        if !owner.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            messages.push(
                "Username may only contain alphanumeric characters or single hyphens".to_string(),
            );
        }
        if owner.contains("--") {
            messages.push("Username cannot contain consecutive hyphens".to_string());
        }
        if owner.chars().count() > MAX_OWNER_LEN {
            messages.push(format!(
                "Username is too long (maximum is {MAX_OWNER_LEN} characters)"
            ));
        }
    }

    if repo.is_empty() {
        messages.push("Missing repository or Missing / between username and repository".to_string());
    } else {
        // Printable ASCII: space through tilde.
        if !repo.chars().all(|c| (' '..='~').contains(&c)) {
            messages.push("Repository name can only contain ASCII characters".to_string());
        }
        if repo.chars().count() > MAX_REPO_LEN {
            messages.push(format!(
                "Repository name is too long (maximum is {MAX_REPO_LEN} characters)"
            ));
        }
    }

    messages
}

/// A validated `owner/repo` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoName {
    owner: String,
    repo: String,
}

impl RepoName {
    /// Validate and split an identifier.
    ///
    /// Anything after a second `/` is ignored, matching
    /// [`validate_repo_name`].
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let messages = validate_repo_name(input);
        if !messages.is_empty() {
            return Err(ValidationError(messages));
        }

        let mut segments = input.split('/');
        match (segments.next(), segments.next()) {
            (Some(owner), Some(repo)) => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(ValidationError(vec![
                "Missing repository or Missing / between username and repository".to_string(),
            ])),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// `owner/repo`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
