use atlas_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    #[error("config error: {0}")]
    Config(String),
}
