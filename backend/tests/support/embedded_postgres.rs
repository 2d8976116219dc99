//! Embedded PostgreSQL databases for the Diesel adapter suites.
//!
//! One cluster is shared per test binary. A template database is migrated
//! once per migration-directory hash, and every test gets its own clone of
//! it, so suites never see each other's rows.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;
use uuid::Uuid;
use weather_bot::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use super::format_postgres_error;

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "weather_bot_template";
const PROVISION_RETRIES: usize = 5;
const PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

fn template_database_name() -> Result<String, String> {
    let migrations = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let hash = hash_directory(migrations).map_err(|err| format!("hash migrations: {err}"))?;
    let short = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short}"))
}

fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(err) if attempt >= PROVISION_RETRIES => return Err(format!("{err:?}")),
            Err(_) => {
                std::thread::sleep(PROVISION_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

/// Create the migrated template if this migration set has not been seen.
fn ensure_template_database(cluster: &ClusterHandle, runtime: &Runtime) -> Result<String, String> {
    let template = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(template.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        let url = cluster.connection().database_url(&template);
        runtime
            .block_on(run_pending_migrations(&url))
            .map_err(|err| err.to_string())?;
    }
    Ok(template)
}

fn provision(cluster: &ClusterHandle, runtime: &Runtime) -> Result<TemporaryDatabase, String> {
    let mut last_error = String::new();
    for attempt in 1..=PROVISION_RETRIES {
        let cloned = ensure_template_database(cluster, runtime).and_then(|template| {
            let name = format!("test_{}", Uuid::new_v4());
            cluster
                .temporary_database_from_template(name.as_str(), template.as_str())
                .map_err(|err| format!("clone template: {err:?}"))
        });
        match cloned {
            Ok(database) => return Ok(database),
            Err(err) => last_error = format!("attempt {attempt}/{PROVISION_RETRIES}: {err}"),
        }
        std::thread::sleep(PROVISION_RETRY_DELAY);
    }
    Err(last_error)
}

/// A freshly migrated database with a pool and a runtime to drive it.
///
/// Suites stay synchronous and `block_on` the repository futures, since the
/// `postgres` client used for seeding cannot run inside a Tokio runtime.
pub struct TestDatabase {
    pub runtime: Runtime,
    pub pool: DbPool,
    url: String,
    _database: TemporaryDatabase,
}

impl TestDatabase {
    /// Provision a database cloned from the migrated template.
    pub fn start() -> Result<Self, String> {
        let runtime = Runtime::new().map_err(|err| err.to_string())?;
        let cluster = shared_cluster()?;
        let database = provision(cluster, &runtime)?;
        let url = database.url().to_string();

        let config = PoolConfig::new(url.as_str())
            .with_max_size(2)
            .with_min_idle(Some(1));
        let pool = runtime
            .block_on(DbPool::new(config))
            .map_err(|err| err.to_string())?;

        Ok(Self {
            runtime,
            pool,
            url,
            _database: database,
        })
    }

    /// A plain client on a side connection, for seeding and inspection.
    pub fn client(&self) -> Result<Client, String> {
        Client::connect(&self.url, NoTls).map_err(|err| format_postgres_error(&err))
    }

    /// Run raw SQL on a side connection.
    pub fn batch_execute(&self, sql: &str) -> Result<(), String> {
        self.client()?
            .batch_execute(sql)
            .map_err(|err| format_postgres_error(&err))
    }

    /// Row count of `table`.
    pub fn count_rows(&self, table: &str) -> Result<i64, String> {
        let escaped = table.replace('"', "\"\"");
        let row = self
            .client()?
            .query_one(format!(r#"SELECT COUNT(*) FROM "{escaped}""#).as_str(), &[])
            .map_err(|err| format_postgres_error(&err))?;
        Ok(row.get(0))
    }
}
