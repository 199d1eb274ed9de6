use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("State context for {state} is shut down, context: {context}")]
    ShutDown {
        state: &'static str,
        context: String,
    },
}

impl Error {
    pub fn shut_down(state: &'static str, context: impl Into<String>) -> Self {
        Self::ShutDown {
            state,
            context: context.into(),
        }
    }
}
