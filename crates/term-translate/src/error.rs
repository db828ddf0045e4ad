use atlas_common::error::CommonError;
use atlas_common::translate::TranslateError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error(transparent)]
    Translate(#[from] TranslateError),
}
