use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Identifier errors
    #[error("Invalid device id: {0}")]
    InvalidDeviceId(String),

    // Status errors
    #[error("Invalid scale status code: {0}")]
    InvalidStatusCode(u8),
}

pub type Result<T> = std::result::Result<T, Error>;
