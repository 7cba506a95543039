use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, path::PathBuf};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub migrations_dir: PathBuf,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Resource database API")]
pub struct Args {
    /// Host to bind to (overrides RESOURCE_STORE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides RESOURCE_STORE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides RESOURCE_STORE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Directory holding schema migrations (overrides RESOURCE_STORE_MIGRATIONS_DIR)
    #[arg(long)]
    pub migrations_dir: Option<PathBuf>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        let cfg = Self::from_sources(args, |name| env::var(name).ok())?;
        Ok((cfg, migrate))
    }

    /// Merge CLI arguments over values read through `lookup`.
    ///
    /// The database URL and migration directory have no defaults; a missing
    /// or empty value is an error.
    pub fn from_sources(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = args
            .host
            .or_else(|| lookup("RESOURCE_STORE_HOST"))
            .unwrap_or_else(|| "0.0.0.0".into());

        let port = match args.port {
            Some(port) => port,
            None => match lookup("RESOURCE_STORE_PORT") {
                Some(value) => value
                    .parse::<u16>()
                    .with_context(|| format!("parsing RESOURCE_STORE_PORT value `{}`", value))?,
                None => 8080,
            },
        };

        let database_url = required(
            args.database_url,
            lookup("RESOURCE_STORE_DATABASE_URL"),
            "database URL (--database-url / RESOURCE_STORE_DATABASE_URL)",
        )?;
        let migrations_dir = required(
            args.migrations_dir.map(|p| p.to_string_lossy().into_owned()),
            lookup("RESOURCE_STORE_MIGRATIONS_DIR"),
            "migration directory (--migrations-dir / RESOURCE_STORE_MIGRATIONS_DIR)",
        )?;

        Ok(Self {
            host,
            port,
            database_url,
            migrations_dir: PathBuf::from(migrations_dir),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required(cli: Option<String>, env: Option<String>, what: &str) -> Result<String> {
    match cli.or(env) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("missing required configuration: {}", what),
    }
}
