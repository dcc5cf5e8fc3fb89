use anyhow::{Context, Result, bail};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub bucket: String,
    pub session_token: String,
    pub endpoint_url: Option<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Object-store file manager API")]
pub struct Args {
    /// Host to bind to (overrides BUCKET_BROWSER_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BUCKET_BROWSER_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Bucket to browse (overrides S3_BUCKET_NAME)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Session token accepted by the auth gate (overrides BUCKET_BROWSER_SESSION_TOKEN)
    #[arg(long)]
    pub session_token: Option<String>,

    /// Custom store endpoint for S3-compatible providers (overrides BUCKET_BROWSER_ENDPOINT_URL)
    #[arg(long)]
    pub endpoint_url: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    /// Store credentials and region stay on the ambient provider chain.
    pub fn from_env_and_args() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    fn from_args(args: Args) -> Result<Self> {
        let env_host = env::var("BUCKET_BROWSER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("BUCKET_BROWSER_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing BUCKET_BROWSER_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading BUCKET_BROWSER_PORT"),
        };

        let bucket = match args.bucket.or_else(|| env::var("S3_BUCKET_NAME").ok()) {
            Some(bucket) if !bucket.is_empty() => bucket,
            _ => bail!("S3_BUCKET_NAME is not set"),
        };
        let session_token = match args
            .session_token
            .or_else(|| env::var("BUCKET_BROWSER_SESSION_TOKEN").ok())
        {
            Some(token) if !token.is_empty() => token,
            _ => bail!("BUCKET_BROWSER_SESSION_TOKEN is not set"),
        };

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            bucket,
            session_token,
            endpoint_url: args
                .endpoint_url
                .or_else(|| env::var("BUCKET_BROWSER_ENDPOINT_URL").ok()),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_satisfy_required_settings() {
        let cfg = AppConfig::from_args(Args {
            bucket: Some("files".into()),
            session_token: Some("s3cr3t".into()),
            port: Some(8080),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(cfg.bucket, "files");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.addr(), "0.0.0.0:8080");
    }

    #[test]
    fn empty_bucket_value_is_rejected() {
        let result = AppConfig::from_args(Args {
            bucket: Some(String::new()),
            session_token: Some("s3cr3t".into()),
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
