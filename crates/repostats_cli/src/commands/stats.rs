use std::sync::Arc;

use console::{Term, style};
use repostats::Session;

use crate::commands::shared::{build_client, open_store, request_token};
use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::render::{OutputFormat, render};

/// Load a repository and print its statistics.
pub(crate) async fn handle_stats(
    repo: &str,
    output: OutputFormat,
    depth: Option<usize>,
    token: Option<&str>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    let client = build_client(config, None)?;
    let token = request_token(&client, token, config, store).await;
    let client = client.with_token(token.as_deref());

    let reporter = Arc::new(ProgressReporter::new());
    let session = Session::new(client).with_progress(reporter.as_callback());

    let result = session.load(repo).await;
    reporter.finish();
    reporter.clear();

    let loaded = match result {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::debug!("Load failed: {e:?}");
            return Err(e.user_message().into());
        }
    };

    let is_tty = Term::stderr().is_term();
    for warning in &loaded.warnings {
        if is_tty {
            eprintln!("{} {}", style("⚠").yellow(), warning);
        } else {
            tracing::warn!("{warning}");
        }
    }

    let out = render(&loaded.snapshot.name, &loaded.stats, output, depth)?;
    print!("{out}");
    if matches!(output, OutputFormat::Json) {
        println!();
    }
    Ok(())
}
