use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Cannot create an app without a name")]
    MissingName,
    #[error("A target frame time of {0:?} is too long")]
    FrameTimeTooLong(std::time::Duration),
}
