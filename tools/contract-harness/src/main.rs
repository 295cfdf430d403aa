//! Contract harness — runs HTTP golden assertions against the API.
//!
//! # Usage
//!
//! ```bash
//! # Against an already-running deployment
//! cargo run -p contract-harness -- --base-url http://localhost:8080
//!
//! # Self-contained: boot postgres, migrate, serve in-process, assert
//! cargo run -p contract-harness --features api -- --managed
//! ```
//!
//! Exits 0 when all assertions pass, exits 1 when any fail.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

use contract_harness::fixture::{self, Fixture};
use contract_harness::reporter::Reporter;
use contract_harness::runner::Runner;

#[derive(Parser)]
#[command(about = "Run HTTP contract assertions against the API")]
struct Args {
    /// Base URL of an already-running service (e.g. http://localhost:8080)
    #[arg(long, conflicts_with = "managed")]
    base_url: Option<String>,

    /// Boot postgres in Docker, migrate, and serve the API in-process
    #[arg(long)]
    managed: bool,

    /// Run only fixtures under contracts/http/{service}
    #[arg(long)]
    service: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let args = Args::parse();
    let workspace_root = workspace_root();

    if args.managed {
        return managed(&workspace_root).await;
    }

    let Some(base_url) = args.base_url else {
        anyhow::bail!("pass --base-url URL, or --managed to boot everything locally");
    };

    let fixtures: Vec<Fixture> = fixture::load_all(&workspace_root, args.service.as_deref())?;
    if fixtures.is_empty() {
        eprintln!("No fixtures found.");
        return Ok(());
    }

    println!(
        "Running {} fixture(s) against {}",
        fixtures.len(),
        base_url
    );
    println!();

    let runner = Runner::new(&base_url);
    let mut reporter = Reporter::new();
    for f in &fixtures {
        let result = runner.run(f).await;
        reporter.record(f, result);
    }
    reporter.print_summary();

    if reporter.all_passed() {
        Ok(())
    } else {
        std::process::exit(1)
    }
}

/// Boot the full stack, run the api fixtures, and tear the containers down
/// whatever the outcome.
#[cfg(feature = "api")]
async fn managed(workspace_root: &Path) -> Result<()> {
    use contract_harness::config::ContractHarnessConfig;
    use contract_harness::docker::Orchestrator;
    use contract_harness::services::{self, InfraUrls};

    // One managed run at a time; concurrent runs would race the stale sweep
    // over each other's labeled containers.
    let lock_path = workspace_root.join("target/contract-harness.lock");
    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let lock_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .open(&lock_path)?;
    let mut lock = fd_lock::RwLock::new(lock_file);
    let _guard = lock.write()?;

    let config = ContractHarnessConfig::from_env();
    let mut docker = Orchestrator::connect(&config.docker_host).await?;
    docker.sweep_stale().await?;

    let outcome = async {
        let database_url = docker.launch_postgres().await?;
        let infra = InfraUrls { database_url };
        services::api::run(&infra, workspace_root).await
    }
    .await;

    docker.teardown().await.ok();

    match outcome {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => Err(e),
    }
}

#[cfg(not(feature = "api"))]
async fn managed(_workspace_root: &Path) -> Result<()> {
    anyhow::bail!("built without the api feature; rebuild with --features api to use --managed")
}

/// Walk up from the binary's own manifest dir to the workspace root (the
/// directory containing `Cargo.lock`).
fn workspace_root() -> PathBuf {
    let start = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    start
        .ancestors()
        .find(|p| p.join("Cargo.lock").exists())
        .unwrap_or(&start)
        .to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::workspace_root;

    #[test]
    fn workspace_root_has_cargo_lock() {
        let root = workspace_root();
        assert!(
            root.join("Cargo.lock").exists(),
            "workspace root should contain Cargo.lock"
        );
    }

    #[test]
    fn workspace_root_has_contracts_dir() {
        let root = workspace_root();
        assert!(
            root.join("contracts").exists(),
            "workspace root should contain contracts/"
        );
    }
}
