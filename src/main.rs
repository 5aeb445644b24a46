// secret-edit - edit GCP Secret Manager secrets as YAML
//
// This is the main entry point for the application.

use anyhow::{Context, Result};
use clap::Parser;
use secret_edit::cleaner::{self, CleanupGuard};
use secret_edit::config::Config;
use secret_edit::editor::ExternalEditor;
use secret_edit::prompt::{ConfirmPrompt, LinePrompt, RetryPrompt};
use secret_edit::store::{GcloudStore, VersionSelector};
use secret_edit::workflow::{EditWorkflow, Outcome};
use secret_edit::Error;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// A CLI to edit GCP Secret Manager secrets
#[derive(Parser, Debug)]
#[command(name = "secret-edit")]
#[command(version)]
#[command(about = "A CLI to edit GCP Secret Manager secrets", long_about = None)]
struct Cli {
    /// ID of the secret to edit
    secret_id: Option<String>,

    /// GCP Project ID
    #[arg(short, long, env = "SECRET_EDIT_PROJECT")]
    project: Option<String>,

    /// List all secrets instead of editing a specific one
    #[arg(long)]
    list: bool,

    /// Version to start editing from ('latest' or a version number)
    #[arg(long, value_name = "VERSION", default_value = "latest")]
    from_version: VersionSelector,

    /// Path to the configuration file (default: ~/.config/secret-edit/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("secret_edit=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_list(store: &GcloudStore) -> Result<()> {
    tracing::debug!(project = store.project(), "listing secrets");

    let mut stdout = io::stdout().lock();
    secret_edit::list::list_secrets(store, &mut stdout).context("Failed to list secrets")?;
    Ok(())
}

fn run_edit(store: GcloudStore, config: &Config, secret_id: &str, version: VersionSelector) -> Result<()> {
    // The watcher owns the only path out on SIGINT/SIGTERM
    let guard = CleanupGuard::new();
    let interrupts =
        cleaner::install_signal_handler().context("Failed to set signal handler")?;
    cleaner::watch(interrupts, guard.clone(), |code| std::process::exit(code));
    cleaner::install_panic_hook(guard.clone());

    let editor = ExternalEditor::new(config.editor(std::env::var("EDITOR").ok()));
    let prompt: Box<dyn RetryPrompt> = if io::stdin().is_terminal() {
        Box::new(ConfirmPrompt)
    } else {
        Box::new(LinePrompt::new(io::stdin().lock(), io::stderr()))
    };

    println!("📖 Editing secret {:?} in project {:?}", secret_id, store.project());

    let outcome = EditWorkflow::new(store, editor, prompt)
        .with_guard(guard)
        .with_version(version)
        .run(secret_id)
        .with_context(|| format!("Failed to edit secret {:?}", secret_id))?;

    match outcome {
        Outcome::Unchanged => println!("✓ No changes were made, ignoring..."),
        Outcome::Published { version } => {
            println!("✓ Changes detected, created version {} of secret {:?}", version, secret_id)
        }
        Outcome::Aborted => anyhow::bail!("Operation aborted, no new version was created"),
    }

    println!("✅ Done");
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let project = config
        .project(cli.project)
        .ok_or(Error::MissingArgument("--project"))?;
    let store = GcloudStore::new(config.gcloud(), project);

    if cli.list {
        return run_list(&store);
    }

    let secret_id = cli.secret_id.ok_or(Error::MissingArgument("SECRET_ID"))?;
    run_edit(store, &config, &secret_id, cli.from_version)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }
}
