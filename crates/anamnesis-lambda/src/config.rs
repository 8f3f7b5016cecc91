use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use eyre::{WrapErr, bail};

use anamnesis_interview::InterviewConfig;

const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-sonnet-4-20250514-v1:0";
const DEFAULT_BUCKET: &str = "anamnesis";
const DEFAULT_DATA_DIR: &str = "/tmp/anamnesis/sessions";

/// Where session snapshots are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    S3 { bucket: String },
    File { dir: PathBuf },
    Memory,
}

/// Service settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub model_id: String,
    /// Overrides the region from the default AWS config chain.
    pub region: Option<String>,
    pub max_tokens: Option<i32>,
    pub store: StoreBackend,
    pub interview: InterviewConfig,
    /// Serve on this address instead of running as a Lambda function.
    pub listen_addr: Option<SocketAddr>,
}

impl ServiceConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let model_id = var("ANAMNESIS_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());
        let region = var("AWS_REGION");

        let max_tokens = var("ANAMNESIS_MAX_TOKENS")
            .map(|v| v.parse::<i32>())
            .transpose()
            .wrap_err("ANAMNESIS_MAX_TOKENS must be an integer")?;

        let store = match var("ANAMNESIS_STORE").as_deref().unwrap_or("s3") {
            "s3" => StoreBackend::S3 {
                bucket: var("ANAMNESIS_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            },
            "file" => StoreBackend::File {
                dir: var("ANAMNESIS_DATA_DIR")
                    .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                    .into(),
            },
            "memory" => StoreBackend::Memory,
            other => bail!("ANAMNESIS_STORE must be one of s3, file, memory (got {other:?})"),
        };

        let mut interview = InterviewConfig::default();
        if let Some(max_images) = var("ANAMNESIS_MAX_IMAGES") {
            interview.max_images = max_images
                .parse()
                .wrap_err("ANAMNESIS_MAX_IMAGES must be a non-negative integer")?;
        }

        let listen_addr = var("ANAMNESIS_LISTEN_ADDR")
            .map(|v| v.parse::<SocketAddr>())
            .transpose()
            .wrap_err("ANAMNESIS_LISTEN_ADDR must be a socket address such as 127.0.0.1:3000")?;

        Ok(Self {
            model_id,
            region,
            max_tokens,
            store,
            interview,
            listen_addr,
        })
    }
}
