use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("not found")]
    NotFound,

    #[error("already exists")]
    AlreadyExists,

    #[error("product is already on this list")]
    DuplicateItem,

    #[error("share link is invalid or inactive")]
    InvalidLink,

    #[error("share token collision")]
    TokenCollision,

    #[error("list owner cannot hold a share on their own list")]
    OwnerShare,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("hashing failed: {0}")]
    Hash(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("access denied")]
    AccessDenied,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("arithmetic overflow computing totals")]
    Overflow,
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
