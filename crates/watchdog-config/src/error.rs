use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("environment variable `{0}` referenced in config is not set")]
    MissingEnvVar(String),

    #[error("failed to parse config as YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{0}")]
    Validation(String),
}
