//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `smart_screenshot` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::process;

use smart_screenshot::admin_server::{start_admin_server, AdminState};
use smart_screenshot::config::{Cli, Command};
use smart_screenshot::discovery::generate_typed_candidates;
use smart_screenshot::initialization::init_logger_with;
use smart_screenshot::{run_screenshots, Config, RunResources, Selection};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // Try the current directory first, then next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();

    let log_level = cli.config.log_level.clone();
    let log_format = cli.config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    if let Err(e) = dispatch(cli.config, cli.command).await {
        eprintln!("smart_screenshot error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn dispatch(config: Config, command: Command) -> Result<()> {
    match command {
        Command::Run {
            project_ids,
            all_pending,
            all,
            force,
        } => {
            let selection = Selection::from_flags(project_ids, all_pending, all)?;
            let resources = RunResources::init(config).await?;
            let report = run_screenshots(&resources, &selection, force).await?;

            let summary = &report.summary;
            println!(
                "Processed {} project{} ({} succeeded, {} failed, {} skipped) in {:.1}s",
                summary.total,
                if summary.total == 1 { "" } else { "s" },
                summary.succeeded,
                summary.failed,
                summary.skipped,
                report.elapsed_seconds
            );
            for (strategy, count) in &summary.strategies {
                println!("  {strategy}: {count}");
            }
            for id in &report.not_found {
                println!("  not found: {id}");
            }
            Ok(())
        }
        Command::Serve { listen } => {
            let Some(token) = config
                .admin_token
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
            else {
                bail!("An admin token is required to serve (set ADMIN_TOKEN or --admin-token)");
            };
            let resources = RunResources::init(config).await?;
            start_admin_server(&listen, AdminState::new(resources, &token)).await
        }
        Command::Candidates {
            name,
            deployment_url,
            repo_url,
        } => {
            for (url, source) in
                generate_typed_candidates(&name, deployment_url.as_deref(), repo_url.as_deref())
            {
                println!("{url}\t{}", source.as_str());
            }
            Ok(())
        }
    }
}
