#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Token error: {0}")]
    Token(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("File store error: {0}")]
    Store(String),
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Self::Store(e.to_string())
    }
}
