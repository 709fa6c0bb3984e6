use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    pub bucket: String,
    pub url_ttl_secs: i64,
    pub url_secret: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Image hosting API")]
pub struct Args {
    /// Host to bind to (overrides IMAGE_HOST_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides IMAGE_HOST_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where objects are stored (overrides IMAGE_HOST_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL (overrides IMAGE_HOST_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Bucket name objects are stored under (overrides IMAGE_HOST_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Signed-URL lifetime in seconds (overrides IMAGE_HOST_URL_TTL_SECS)
    #[arg(long)]
    pub url_ttl_secs: Option<i64>,

    /// Secret for signing retrieval URLs (overrides IMAGE_HOST_URL_SECRET)
    #[arg(long)]
    pub url_secret: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("IMAGE_HOST_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("IMAGE_HOST_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing IMAGE_HOST_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading IMAGE_HOST_PORT"),
        };
        let env_storage =
            env::var("IMAGE_HOST_STORAGE_DIR").unwrap_or_else(|_| "./data/objects".into());
        let env_db = env::var("IMAGE_HOST_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/image_host.db".into());
        let env_bucket = env::var("IMAGE_HOST_BUCKET").unwrap_or_else(|_| "images-bucket".into());
        let env_ttl = match env::var("IMAGE_HOST_URL_TTL_SECS") {
            Ok(value) => value
                .parse::<i64>()
                .with_context(|| format!("parsing IMAGE_HOST_URL_TTL_SECS value `{}`", value))?,
            Err(env::VarError::NotPresent) => 900,
            Err(err) => return Err(err).context("reading IMAGE_HOST_URL_TTL_SECS"),
        };
        let env_secret =
            env::var("IMAGE_HOST_URL_SECRET").unwrap_or_else(|_| "dev-secret".into());

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            database_url: args.database_url.unwrap_or(env_db),
            bucket: args.bucket.unwrap_or(env_bucket),
            url_ttl_secs: args.url_ttl_secs.unwrap_or(env_ttl),
            url_secret: args.url_secret.unwrap_or(env_secret),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
