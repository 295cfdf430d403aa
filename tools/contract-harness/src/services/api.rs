//! API service contract runner (requires `--features api`).

use std::path::Path;

use anyhow::Result;
use medworld_api::{router::build_router, state::AppState};
use medworld_api_migration::Migrator;
use medworld_testing::fixture::{sample_admin, sample_doctor, sample_patient, superadmin};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;

use crate::{fixture, reporter, runner::Runner, services::InfraUrls};

/// Run migrations, start the API in-process, seed the canonical identities,
/// then run every api fixture.
///
/// Returns `true` if every fixture passed.
pub async fn run(infra: &InfraUrls, workspace_root: &Path) -> Result<bool> {
    // ── Database + migrations ──────────────────────────────────────────────
    let db = Database::connect(&infra.database_url).await?;
    Migrator::up(&db, None).await?;

    // ── Start the service on a random OS-assigned port ─────────────────────
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let base_url = format!("http://127.0.0.1:{port}");

    let state = AppState { db };
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });

    seed_identities(&base_url).await?;

    // ── Run the fixture set ────────────────────────────────────────────────
    let fixtures = fixture::load_all(workspace_root, Some("api"))?;
    let runner = Runner::new(&base_url);
    let mut rep = reporter::Reporter::new();

    for f in &fixtures {
        let result = runner.run(f).await;
        rep.record(f, result);
    }

    rep.print_summary();
    Ok(rep.all_passed())
}

/// Register the well-known identities fixtures log in as. Registration order
/// fixes their ids: superadmin 1, admin 2, doctor 3, patient 4.
async fn seed_identities(base_url: &str) -> Result<()> {
    let client = reqwest::Client::new();
    for seed in [
        superadmin(),
        sample_admin(),
        sample_doctor(),
        sample_patient(),
    ] {
        let resp = client
            .post(format!("{base_url}/api/v1/auth/register"))
            .json(&seed.register_body())
            .send()
            .await?;
        anyhow::ensure!(
            resp.status().is_success(),
            "seeding {} answered {}",
            seed.email,
            resp.status()
        );
    }

    // Credentials must round-trip before any fixture logs in.
    let login = client
        .post(format!("{base_url}/api/v1/auth/login"))
        .json(&superadmin().login_body())
        .send()
        .await?;
    anyhow::ensure!(
        login.status().is_success(),
        "seeded superadmin cannot log in: {}",
        login.status()
    );
    Ok(())
}
