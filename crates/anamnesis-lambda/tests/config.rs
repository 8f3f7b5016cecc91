use std::collections::HashMap;
use std::path::PathBuf;

use anamnesis_lambda::config::{ServiceConfig, StoreBackend};

fn config(vars: &[(&str, &str)]) -> eyre::Result<ServiceConfig> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ServiceConfig::from_lookup(|name| vars.get(name).cloned())
}

#[test]
fn defaults_use_s3_and_lambda_runtime() {
    let config = config(&[]).unwrap();
    assert_eq!(
        config.store,
        StoreBackend::S3 {
            bucket: "anamnesis".to_string()
        }
    );
    assert!(config.listen_addr.is_none());
    assert!(config.region.is_none());
    assert_eq!(config.interview.max_images, 5);
    assert!(config.interview.json_output);
}

#[test]
fn file_backend_with_local_listener() {
    let config = config(&[
        ("ANAMNESIS_STORE", "file"),
        ("ANAMNESIS_DATA_DIR", "/var/lib/anamnesis"),
        ("ANAMNESIS_LISTEN_ADDR", "127.0.0.1:3000"),
        ("ANAMNESIS_MAX_IMAGES", "3"),
        ("ANAMNESIS_MODEL_ID", "eu.anthropic.claude-sonnet-4-6"),
        ("AWS_REGION", "eu-west-1"),
    ])
    .unwrap();

    assert_eq!(
        config.store,
        StoreBackend::File {
            dir: PathBuf::from("/var/lib/anamnesis")
        }
    );
    assert_eq!(config.listen_addr.unwrap().port(), 3000);
    assert_eq!(config.interview.max_images, 3);
    assert_eq!(config.model_id, "eu.anthropic.claude-sonnet-4-6");
    assert_eq!(config.region.as_deref(), Some("eu-west-1"));
}

#[test]
fn blank_values_fall_back_to_defaults() {
    let config = config(&[("ANAMNESIS_STORE", "memory"), ("ANAMNESIS_MODEL_ID", "  ")]).unwrap();
    assert_eq!(config.store, StoreBackend::Memory);
    assert!(config.model_id.starts_with("us.anthropic."));
}

#[test]
fn invalid_values_are_rejected() {
    assert!(config(&[("ANAMNESIS_STORE", "redis")]).is_err());
    assert!(config(&[("ANAMNESIS_MAX_IMAGES", "lots")]).is_err());
    assert!(config(&[("ANAMNESIS_LISTEN_ADDR", "localhost")]).is_err());
    assert!(config(&[("ANAMNESIS_MAX_TOKENS", "-")]).is_err());
}
