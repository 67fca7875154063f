use thiserror::Error;

pub type ScenarioResult<T> = Result<T, ScenarioError>;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario suite: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown scenario type {0}")]
    UnknownScenario(u32),
}
