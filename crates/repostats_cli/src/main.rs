//! repostats CLI - statistics dashboard for a GitHub repository.

mod commands;
mod config;
mod progress;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::Term;
use repostats::Theme;
use tracing_subscriber::EnvFilter;

use crate::render::OutputFormat;

#[derive(Parser)]
#[command(name = "repostats")]
#[command(version)]
#[command(about = "Statistics dashboard for a GitHub repository")]
#[command(
    long_about = "repostats fetches a repository's branches, labels and issues from the GitHub \
REST API and prints aggregate statistics: who opens and closes issues, who they are \
assigned to, how labels are used and how long issues take to close."
)]
#[command(after_long_help = r#"EXAMPLES
    Show statistics for a repository:
        $ repostats stats rust-lang/cargo

    Only the top two levels of the tree:
        $ repostats stats rust-lang/cargo --depth 1

    JSON for scripting:
        $ repostats stats rust-lang/cargo --output json | jq '.values.Issues.total'

    Log in through the browser (needed for private repositories):
        $ repostats login

    Check a name without touching the network:
        $ repostats validate octo/hello-world

    Generate shell completions:
        $ repostats completions bash > ~/.local/share/bash-completion/completions/repostats

CONFIGURATION
    repostats reads configuration from:
      1. ~/.config/repostats/config.toml (or $XDG_CONFIG_HOME/repostats/config.toml)
      2. ./repostats.toml
      3. Environment variables (REPOSTATS_* prefix, e.g., REPOSTATS_GITHUB_TOKEN)
      4. .env file in current directory

    The token saved by `repostats login` and the theme live in
    ~/.local/state/repostats/state.toml.

ENVIRONMENT VARIABLES
    REPOSTATS_GITHUB_TOKEN    GitHub personal access token (overrides the saved login)
    RUST_LOG                  Log filter for non-interactive output (default: repostats=info)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a repository and print its statistics
    Stats {
        /// Repository as owner/name
        repo: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Tree)]
        output: OutputFormat,

        /// Expand the tree this many levels below the categories (tree output only)
        #[arg(short, long)]
        depth: Option<usize>,

        /// GitHub token for this run (overrides config and the saved login)
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Check a repository name and print what is wrong with it
    Validate {
        /// Repository as owner/name
        repo: String,
    },
    /// Log in to GitHub
    ///
    /// Opens your browser to authorize repostats with GitHub. The token is
    /// verified and saved for future runs.
    Login {
        /// Use this token instead of the browser flow
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Forget the saved token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show or set the color theme preference
    Theme {
        /// light or dark (shows the current theme if omitted)
        theme: Option<Theme>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Structured logging when progress is not drawn on a terminal
    if !Term::stderr().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("repostats=info,repostats_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let config = config::Config::load();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stats {
            repo,
            output,
            depth,
            token,
        } => {
            commands::stats::handle_stats(&repo, output, depth, token.as_deref(), &config).await?;
        }
        Commands::Validate { repo } => commands::validate::handle_validate(&repo)?,
        Commands::Login { token } => commands::login::handle_login(token, &config).await?,
        Commands::Logout => commands::login::handle_logout()?,
        Commands::Whoami => commands::login::handle_whoami(&config).await?,
        Commands::Theme { theme } => {
            let store = commands::shared::open_store()?;
            commands::theme::handle_theme(theme, store.as_ref())?;
        }
        Commands::Completions { shell } => commands::meta::handle_completions(shell)?,
        Commands::Man { output } => commands::meta::handle_man(output)?,
    }

    Ok(())
}
