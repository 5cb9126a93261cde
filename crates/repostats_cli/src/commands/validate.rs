use console::style;
use repostats::validate_repo_name;

/// Print every validation message for `repo`.
///
/// Returns an error (and so a non-zero exit) when there is at least one.
pub(crate) fn handle_validate(repo: &str) -> Result<(), Box<dyn std::error::Error>> {
    let messages = validate_repo_name(repo);
    if messages.is_empty() {
        println!("{} {} is a valid repository name", style("✓").green().bold(), repo);
        return Ok(());
    }

    for message in &messages {
        eprintln!("{} {}", style("✗").red().bold(), message);
    }
    Err(format!("'{repo}' is not a valid repository name").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_name() {
        assert!(handle_validate("rust-lang/cargo").is_ok());
    }

    #[test]
    fn test_invalid_name_fails() {
        let err = handle_validate("ab--c/repo").unwrap_err();
        assert_eq!(err.to_string(), "'ab--c/repo' is not a valid repository name");
    }
}
