use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum IdentityError {
    #[error("generate random UUID for the voter: {0}")]
    Generation(String),
}

impl From<getrandom::Error> for IdentityError {
    fn from(err: getrandom::Error) -> Self {
        IdentityError::Generation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IdentityError>;
