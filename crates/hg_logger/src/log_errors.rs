use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("The logging thread is already running")]
    AlreadyInitialized,
    #[error("The logging thread is not running")]
    NotRunning,
    #[error("Unknown log level '{0}'")]
    UnknownLevel(String),
    #[error("Could not open log file '{path}': {source}")]
    CouldNotOpenFile {
        path: String,
        source: std::io::Error,
    },
    #[error("Could not write to log file '{path}': {source}")]
    CouldNotWriteToFile {
        path: String,
        source: std::io::Error,
    },
}
