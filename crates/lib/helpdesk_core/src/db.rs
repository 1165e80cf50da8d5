//! Locally managed PostgreSQL instances.
//!
//! `LocalDb` drives a PostgreSQL server through its stock tooling (`initdb`,
//! `pg_ctl`, `pg_isready`). The integration tests use the ephemeral flavor;
//! the server binary can use the persistent flavor for local development
//! instead of an externally provisioned database.

use std::net::TcpListener;
use std::path::PathBuf;
use std::time::Duration;

use sqlx::postgres::PgPool;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::sleep;

/// Database name created inside the managed instance.
const DATABASE_NAME: &str = "helpdesk";

/// Maximum time to wait for PostgreSQL to become ready.
const READY_TIMEOUT: Duration = Duration::from_secs(30);

/// Poll interval while waiting for readiness.
const READY_POLL: Duration = Duration::from_millis(200);

/// Errors from managing a local PostgreSQL instance.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("PostgreSQL command failed: {0}")]
    Command(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no data directory available on this platform")]
    NoDataDir,

    #[error("pg_config not found on PATH")]
    PgConfigNotFound,

    #[error("PostgreSQL not ready after {0:?}")]
    ReadyTimeout(Duration),
}

/// Result type for local database operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// A locally managed PostgreSQL instance.
pub struct LocalDb {
    bin_dir: PathBuf,
    data_dir: PathBuf,
    port: u16,
    started: bool,
    /// Keeps the tempdir alive for ephemeral instances; dropping cleans it up.
    _tempdir: Option<tempfile::TempDir>,
}

impl LocalDb {
    /// A persistent instance under the platform data directory
    /// (`~/.local/share/helpdesk/pgdata` on Linux). Data survives restarts.
    pub async fn with_default_data_dir() -> Result<Self> {
        let data_dir = default_data_dir().ok_or(DbError::NoDataDir)?;
        Ok(Self {
            bin_dir: discover_bin_dir().await?,
            data_dir,
            port: 0,
            started: false,
            _tempdir: None,
        })
    }

    /// An ephemeral instance in a temporary directory, cleaned up on drop.
    pub async fn ephemeral() -> Result<Self> {
        let bin_dir = discover_bin_dir().await?;
        let tempdir = tempfile::tempdir()?;
        let data_dir = tempdir.path().join("pgdata");
        Ok(Self {
            bin_dir,
            data_dir,
            port: 0,
            started: false,
            _tempdir: Some(tempdir),
        })
    }

    /// Initialize the data directory. Skips when already initialized, so it
    /// is safe to call on every start.
    pub async fn setup(&mut self) -> Result<()> {
        if self.data_dir.join("PG_VERSION").exists() {
            log::info!("data directory already initialized, skipping initdb");
            return Ok(());
        }

        log::info!("running initdb in {}", self.data_dir.display());
        let output = Command::new(self.bin_dir.join("initdb"))
            .arg("-D")
            .arg(&self.data_dir)
            .arg("--no-locale")
            .arg("--encoding=UTF8")
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DbError::Command(format!("initdb failed: {stderr}")));
        }
        Ok(())
    }

    /// Start the server and ensure the application database exists.
    pub async fn start(&mut self) -> Result<()> {
        if self.port == 0 {
            self.port = find_free_port()?;
        }

        let socket_opts = format!(
            "-p {} -k {} -h localhost",
            self.port,
            self.data_dir.display()
        );
        let output = Command::new(self.bin_dir.join("pg_ctl"))
            .arg("-D")
            .arg(&self.data_dir)
            .arg("-o")
            .arg(&socket_opts)
            .arg("-l")
            .arg(self.data_dir.join("postgresql.log"))
            .arg("start")
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DbError::Command(format!("pg_ctl start failed: {stderr}")));
        }

        self.wait_for_ready().await?;
        self.started = true;
        self.create_database_if_missing().await?;

        log::info!("PostgreSQL ready at {}", self.connection_url());
        Ok(())
    }

    /// Stop the server gracefully. A no-op when not started.
    pub async fn stop(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }

        let output = Command::new(self.bin_dir.join("pg_ctl"))
            .arg("-D")
            .arg(&self.data_dir)
            .arg("-m")
            .arg("fast")
            .arg("stop")
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DbError::Command(format!("pg_ctl stop failed: {stderr}")));
        }

        self.started = false;
        log::info!("PostgreSQL stopped");
        Ok(())
    }

    /// Connection URL for the application database.
    pub fn connection_url(&self) -> String {
        format!("postgresql://localhost:{}/{}", self.port, DATABASE_NAME)
    }

    /// The port the server listens on (0 until started).
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the server has been started.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Poll `pg_isready` until the server accepts connections.
    async fn wait_for_ready(&self) -> Result<()> {
        let pg_isready = self.bin_dir.join("pg_isready");
        let deadline = tokio::time::Instant::now() + READY_TIMEOUT;

        loop {
            let output = Command::new(&pg_isready)
                .arg("-p")
                .arg(self.port.to_string())
                .arg("-h")
                .arg("localhost")
                .output()
                .await?;

            if output.status.success() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(DbError::ReadyTimeout(READY_TIMEOUT));
            }
            sleep(READY_POLL).await;
        }
    }

    /// Create the application database when absent, via the `postgres`
    /// maintenance database.
    async fn create_database_if_missing(&self) -> Result<()> {
        let maintenance_url = format!("postgresql://localhost:{}/postgres", self.port);
        let pool = PgPool::connect(&maintenance_url).await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
                .bind(DATABASE_NAME)
                .fetch_one(&pool)
                .await?;

        if !exists {
            log::info!("creating database '{DATABASE_NAME}'");
            // CREATE DATABASE cannot use bind parameters
            let sql = format!("CREATE DATABASE \"{DATABASE_NAME}\"");
            sqlx::query(&sql).execute(&pool).await?;
        }

        pool.close().await;
        Ok(())
    }
}

/// Locate the PostgreSQL bin directory via `pg_config --bindir` on PATH.
async fn discover_bin_dir() -> Result<PathBuf> {
    let output = Command::new("pg_config")
        .arg("--bindir")
        .output()
        .await
        .map_err(|_| DbError::PgConfigNotFound)?;

    if !output.status.success() {
        return Err(DbError::PgConfigNotFound);
    }

    Ok(PathBuf::from(
        String::from_utf8_lossy(&output.stdout).trim(),
    ))
}

/// Find a free ephemeral port by binding to port 0.
fn find_free_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Default data directory for the persistent flavor.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("helpdesk").join("pgdata"))
}
