use serde::{Deserialize, Serialize};

const DEFAULT_MAX_IMAGES: usize = 5;

/// Tunables for the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewConfig {
    /// Upper bound on images accepted by a single submission.
    #[serde(default = "default_max_images")]
    pub max_images: usize,
    /// Ask the gateway for single-object JSON output.
    #[serde(default = "default_json_output")]
    pub json_output: bool,
}

fn default_max_images() -> usize {
    DEFAULT_MAX_IMAGES
}

fn default_json_output() -> bool {
    true
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            max_images: DEFAULT_MAX_IMAGES,
            json_output: true,
        }
    }
}
