mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod workflow;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::comment::{self as comment_cmd, CommentArgs};
use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::jira::JiraClient;

#[derive(Parser)]
#[command(
    name = "jira-comment",
    author,
    version,
    about = "Post a comment to Jira issues"
)]
struct Cli {
    /// Log request and response details.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Post the same comment to one or more issues.
    Post(CommentArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(error) = run(cli.command).await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

async fn run(command: Commands) -> AppResult<()> {
    match command {
        Commands::Config(args) => config_cmd::run(args.command),
        Commands::Post(args) => run_post(args).await,
    }
}

async fn run_post(args: CommentArgs) -> AppResult<()> {
    let mut config = AppConfig::load()?;
    if let Some(base_url) = &args.base_url {
        config.jira_base_url = Some(base_url.clone());
    }

    let base_url = config.base_url()?.to_string();
    let token = config.basic_token()?;
    let issue_tracker = Arc::new(JiraClient::new(&token, base_url));
    let context = AppContext::new(config, issue_tracker);

    let outcome = comment_cmd::run(&context, args).await?;
    println!("Comment posted to {} issue(s).", outcome.posted);

    Ok(())
}
