use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("State not found: {name}, context: {context}")]
    StateNotFound { name: &'static str, context: String },
    #[error("Compute not found: {name}, context: {context}")]
    ComputeNotFound { name: &'static str, context: String },
    #[error("Command not registered: {name}")]
    CommandNotFound { name: &'static str },
}

impl Error {
    pub fn state_not_found(name: &'static str, context: impl Into<String>) -> Self {
        Self::StateNotFound {
            name,
            context: context.into(),
        }
    }

    pub fn compute_not_found(name: &'static str, context: impl Into<String>) -> Self {
        Self::ComputeNotFound {
            name,
            context: context.into(),
        }
    }
}
