use serde::Deserialize;

/// Settings of the alloy `RetryBackoffLayer` wrapped around the chain RPC
/// transport. Rate-limited (429) and transport errors are retried there, so
/// the poll loop only sees failures that outlived this budget.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RpcRetryConfig {
    /// Retries after the first attempt.
    pub max_retry: u32,
    /// Initial backoff in milliseconds, passed to alloy as is.
    pub backoff_ms: u64,
    /// Compute-unit budget used by alloy to pace retries.
    pub compute_units_per_second: u64,
}

impl Default for RpcRetryConfig {
    fn default() -> Self {
        Self { max_retry: 10, backoff_ms: 1000, compute_units_per_second: 100 }
    }
}

#[cfg(test)]
mod tests {
    use config::Config;

    use super::*;

    fn from_yaml(yaml: &str) -> RpcRetryConfig {
        Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config = from_yaml("max_retry: 3");

        assert_eq!(config.max_retry, 3);
        assert_eq!(config.backoff_ms, 1000);
        assert_eq!(config.compute_units_per_second, 100);
    }

    #[test]
    fn test_empty_section_uses_defaults() {
        assert_eq!(from_yaml(""), RpcRetryConfig::default());
    }
}
