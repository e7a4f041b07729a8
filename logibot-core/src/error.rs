use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogibotError {
    /// Failure inside a route handler or middleware. Displays as the bare message
    /// so the router can surface it verbatim in a 500 body.
    #[error("{0}")]
    Handler(String),

    #[error("Invalid JSON body")]
    InvalidJson,

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Bot not initialized")]
    NotInitialized,

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LogibotError>;
