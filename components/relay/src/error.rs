/// Balance which didn't end up where the scenario expected it.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{check}: expected {expected}, actual {actual}")]
pub struct AssertionFailure {
    /// What was checked, e.g. `source balance`.
    pub check: String,
    /// Expected value.
    pub expected: i64,
    /// Observed value.
    pub actual: i64,
}

/// Errors returned by a scenario run.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// The scenario ran, but its outcome is wrong.
    #[error(transparent)]
    Assertion(#[from] AssertionFailure),
    /// The chains or the relayer could not be brought up.
    #[error("setup failed: {0:#}")]
    Setup(anyhow::Error),
    /// A chain or the relayer failed while the scenario was running.
    #[error("infrastructure failure: {0:#}")]
    Infrastructure(anyhow::Error),
}

impl From<anyhow::Error> for ScenarioError {
    fn from(err: anyhow::Error) -> Self {
        Self::Infrastructure(err)
    }
}
