//! CLI error type.

pub type CliResult<T> = Result<T, CliError>;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid scenario: {what}")]
    Scenario { what: String },

    #[error(transparent)]
    Sim(#[from] af_sim::SimError),

    #[error(transparent)]
    Ocean(#[from] af_ocean::OceanError),

    #[error(transparent)]
    Control(#[from] af_controls::ControlError),

    #[error(transparent)]
    Results(#[from] af_results::ResultsError),
}
