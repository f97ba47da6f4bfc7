//! Configuration model loaded from external sources.

use serde::Deserialize;

fn default_zmq_address() -> String {
    "tcp://127.0.0.1:5555".to_string()
}

fn default_extractor() -> String {
    "textlayer".to_string()
}

fn default_report_path() -> String {
    "clustered_questions.csv".to_string()
}

fn default_threshold() -> f32 {
    crate::SIMILARITY_THRESHOLD
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across message handlers.
pub struct AnalyzerConfig {
    #[serde(default = "default_zmq_address")]
    pub zmq_address: String,
    /// Extraction backend selector: `textlayer` or `vision`.
    #[serde(default = "default_extractor")]
    pub extractor: String,
    /// CSV report location, overwritten wholesale on every run.
    #[serde(default = "default_report_path")]
    pub report_path: String,
    /// Projection artifact location; no projection is written when unset.
    #[serde(default)]
    pub projection_path: Option<String>,
    /// Fallback similarity threshold for requests that do not carry one.
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f32,
    #[serde(default)]
    pub vision: VisionConfig,
}

#[derive(Clone, Debug, Deserialize)]
/// Settings for the OCR + generative extraction backend.
pub struct VisionConfig {
    #[serde(default = "VisionConfig::default_api_base")]
    pub api_base: String,
    /// Environment variable holding the API key.
    #[serde(default = "VisionConfig::default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "VisionConfig::default_model")]
    pub model: String,
}

impl VisionConfig {
    fn default_api_base() -> String {
        "https://api.anthropic.com/".to_string()
    }

    fn default_api_key_env() -> String {
        "ANTHROPIC_API_KEY".to_string()
    }

    fn default_model() -> String {
        "claude-3-5-haiku-20241022".to_string()
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_base: Self::default_api_base(),
            api_key_env: Self::default_api_key_env(),
            model: Self::default_model(),
        }
    }
}

impl AnalyzerConfig {
    /// Loads configuration from an optional `analyzer.yaml` next to the
    /// binary, overridden by `ANALYZER_*` environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("analyzer").required(false))
            .add_source(config::Environment::with_prefix("ANALYZER").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::AnalyzerConfig;

    #[test]
    fn defaults_cover_every_field() {
        let config: AnalyzerConfig = serde_json::from_str("{}").expect("defaults apply");
        assert_eq!(config.zmq_address, "tcp://127.0.0.1:5555");
        assert_eq!(config.extractor, "textlayer");
        assert_eq!(config.report_path, "clustered_questions.csv");
        assert!(config.projection_path.is_none());
        assert_eq!(config.similarity_threshold, crate::SIMILARITY_THRESHOLD);
        assert_eq!(config.vision.api_key_env, "ANTHROPIC_API_KEY");
    }
}
