use anyhow::{Context, Result};
use clap::Parser;
use std::{env, fmt};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Base used when building the URLs handed back to clients.
    pub public_url: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Image upload gateway for S3-compatible storage")]
pub struct Args {
    /// Host to bind to (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Bucket receiving uploads (overrides S3_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Object store endpoint URL (overrides AWS_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Object store region (overrides AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Base of the URLs returned to clients (overrides S3_PUBLIC_ENDPOINT)
    #[arg(long)]
    pub public_url: Option<String>,
}

impl AppConfig {
    /// Parse CLI args, then fall back to the process environment.
    pub fn from_env_and_args() -> Result<Self> {
        let args = Args::parse();
        Self::resolve(args, |key| env::var(key).ok())
    }

    /// Merge `args` over values produced by `lookup`, then over defaults.
    pub fn resolve(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let env_port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing PORT value `{}`", value))?,
            None => 3000,
        };

        Ok(Self {
            host: args.host.unwrap_or_else(|| env_or("HOST", "0.0.0.0")),
            port: args.port.unwrap_or(env_port),
            bucket: args
                .bucket
                .unwrap_or_else(|| env_or("S3_BUCKET", "shopping-images")),
            endpoint: args
                .endpoint
                .unwrap_or_else(|| env_or("AWS_ENDPOINT", "http://localstack:4566")),
            region: args
                .region
                .unwrap_or_else(|| env_or("AWS_REGION", "us-east-1")),
            access_key_id: env_or("AWS_ACCESS_KEY_ID", "test"),
            secret_access_key: env_or("AWS_SECRET_ACCESS_KEY", "test"),
            public_url: args
                .public_url
                .unwrap_or_else(|| env_or("S3_PUBLIC_ENDPOINT", "http://localhost:4566")),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("public_url", &self.public_url)
            .finish()
    }
}
