//! CLI entrypoint for runbook-pilot
//!
//! Wires the layers together with dependency injection: settings from the
//! environment, the integration registry, the configured ML engine, and the
//! use cases on top.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use runbook_application::{Orchestrator, RunbookExecutor};
use runbook_domain::Incident;
use runbook_infrastructure::{build_ml_engine, IntegrationRegistry, RunbookParser, Settings};

#[derive(Parser)]
#[command(name = "runbook-pilot", about = "Incident-response automation engine", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Diagnose a problem report up to the approval gate
    Diagnose {
        /// Free-text problem description
        description: String,
    },
    /// Run the full workflow: diagnose, execute approved actions, verify, summarize
    Run {
        /// Free-text problem description
        description: String,
        /// Verification attempts before giving up
        #[arg(long, default_value_t = 3)]
        max_attempts: usize,
        /// Seconds between verification attempts
        #[arg(long, default_value_t = 30.0)]
        interval_seconds: f64,
    },
    /// Execute a runbook YAML file against a fresh incident
    Runbook {
        /// Path to the runbook YAML file
        path: PathBuf,
        /// Problem description for the incident the runbook targets
        #[arg(long, default_value = "Incident opened for runbook execution")]
        description: String,
        /// Step IDs approved ahead of execution
        #[arg(long = "approve", value_name = "STEP_ID")]
        approved: Vec<String>,
    },
    /// List runbook files in a directory
    ListRunbooks {
        /// Directory containing *.yaml / *.yml runbooks
        #[arg(default_value = "runbooks")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let settings = Settings::load()?;
    info!(mode = %settings.runbook_mode, scenario = %settings.mock_scenario, "starting runbook-pilot");

    let registry = Arc::new(IntegrationRegistry::new(settings.clone()));
    let ml = build_ml_engine(&settings);

    match cli.command {
        Command::Diagnose { description } => {
            let orchestrator = Orchestrator::new(registry, ml);
            let incident = orchestrator.run_diagnosis(&description).await?;

            let pending = orchestrator.pending_approvals(&incident);
            println!("{}", serde_json::to_string_pretty(&incident)?);
            if pending.is_empty() {
                println!("\nNo actions awaiting approval.");
            } else {
                println!("\nActions awaiting approval:");
                for action in pending {
                    println!("  {}  [{}] {}", action.id, action.risk_level, action.description);
                }
            }
        }

        Command::Run {
            description,
            max_attempts,
            interval_seconds,
        } => {
            let orchestrator = Orchestrator::new(registry, ml);
            let (incident, verification) = orchestrator
                .run_full_workflow(&description, max_attempts, interval_seconds)
                .await?;

            println!("{}", serde_json::to_string_pretty(&incident)?);
            println!(
                "\nVerification: {} ({} attempts) - {}",
                if verification.resolved { "resolved" } else { "unresolved" },
                verification.attempts,
                verification.detail
            );
        }

        Command::Runbook {
            path,
            description,
            approved,
        } => {
            let runbook = RunbookParser::load_file(&path)?;
            let executor = RunbookExecutor::new(registry, ml);
            let mut incident = Incident::from_report(description);
            let approved: HashSet<String> = approved.into_iter().collect();

            let execution = executor.execute_runbook(&runbook, &mut incident, &approved).await;
            println!("{}", serde_json::to_string_pretty(&execution)?);
            if !execution.pending_approval_steps.is_empty() {
                println!(
                    "\nAwaiting approval for steps: {} (re-run with --approve <STEP_ID>)",
                    execution.pending_approval_steps.join(", ")
                );
            }
        }

        Command::ListRunbooks { dir } => {
            let runbooks = RunbookParser::load_directory(&dir);
            if runbooks.is_empty() {
                println!("No runbooks found in {}", dir.display());
            }
            for runbook in runbooks {
                println!(
                    "{:<30} {:>2} steps  {}",
                    runbook.name,
                    runbook.steps.len(),
                    runbook.description
                );
            }
        }
    }

    Ok(())
}
