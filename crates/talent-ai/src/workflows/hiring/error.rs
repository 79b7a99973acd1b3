use super::collaborators::ServiceError;

/// Failures a pipeline run can record. None of these abort a step: they are rendered into
/// `error_message` and the routers decide whether the run continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// A step's precondition was not met; the message names what was missing.
    #[error("{0}")]
    MissingInput(&'static str),
    #[error("{operation} failed: {source}")]
    ExternalService {
        operation: &'static str,
        #[source]
        source: ServiceError,
    },
    #[error("{loop_name} loop stopped after {limit} iterations")]
    LoopBound { loop_name: &'static str, limit: u32 },
    #[error("invalid pipeline configuration: {0}")]
    Configuration(String),
}

impl PipelineError {
    pub fn external(operation: &'static str, source: ServiceError) -> Self {
        Self::ExternalService { operation, source }
    }
}
