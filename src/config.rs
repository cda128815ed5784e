use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: String,
    pub jwt_secret: String,
    pub max_file_size: u64,
}

/// Parameters for the offline token-issuing mode (`--issue-token`).
#[derive(Debug, Clone)]
pub struct IssueToken {
    pub subject: String,
    pub role: String,
    pub ttl_secs: u64,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Authenticated HTTP file-upload API")]
pub struct Args {
    /// Host to bind to (overrides UPLOAD_API_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides UPLOAD_API_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where uploaded files are stored (overrides UPLOAD_API_UPLOAD_DIR)
    #[arg(long)]
    pub upload_dir: Option<String>,

    /// Shared secret for signing/verifying bearer tokens (overrides UPLOAD_API_JWT_SECRET)
    #[arg(long)]
    pub jwt_secret: Option<String>,

    /// Maximum accepted size per uploaded file, in bytes (overrides UPLOAD_API_MAX_FILE_SIZE)
    #[arg(long)]
    pub max_file_size: Option<u64>,

    /// Sign a bearer token for the given subject, print it, and exit
    #[arg(long, value_name = "SUBJECT")]
    pub issue_token: Option<String>,

    /// Role claim embedded in the issued token
    #[arg(long, default_value = "uploader")]
    pub token_role: String,

    /// Lifetime of the issued token in seconds
    #[arg(long, default_value_t = 3600)]
    pub token_ttl_secs: u64,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and an optional
    /// token-issuing request.
    pub fn from_env_and_args() -> Result<(Self, Option<IssueToken>)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("UPLOAD_API_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("UPLOAD_API_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing UPLOAD_API_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading UPLOAD_API_PORT"),
        };
        let env_upload_dir =
            env::var("UPLOAD_API_UPLOAD_DIR").unwrap_or_else(|_| "./data/uploads".into());
        let env_secret = match env::var("UPLOAD_API_JWT_SECRET") {
            Ok(value) => Some(value),
            Err(env::VarError::NotPresent) => None,
            Err(err) => return Err(err).context("reading UPLOAD_API_JWT_SECRET"),
        };
        let env_max_size = match env::var("UPLOAD_API_MAX_FILE_SIZE") {
            Ok(value) => Some(value.parse::<u64>().with_context(|| {
                format!("parsing UPLOAD_API_MAX_FILE_SIZE value `{}`", value)
            })?),
            Err(env::VarError::NotPresent) => None,
            Err(err) => return Err(err).context("reading UPLOAD_API_MAX_FILE_SIZE"),
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            upload_dir: args.upload_dir.unwrap_or(env_upload_dir),
            jwt_secret: args
                .jwt_secret
                .or(env_secret)
                .context("UPLOAD_API_JWT_SECRET must be set")?,
            max_file_size: args
                .max_file_size
                .or(env_max_size)
                .context("UPLOAD_API_MAX_FILE_SIZE must be set (bytes per uploaded file)")?,
        };

        let issue = args.issue_token.map(|subject| IssueToken {
            subject,
            role: args.token_role,
            ttl_secs: args.token_ttl_secs,
        });

        Ok((cfg, issue))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
