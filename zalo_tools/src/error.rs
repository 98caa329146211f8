use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZaloApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not sign the request: {0}")]
    SigningError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("The gateway did not answer in time: {0}")]
    Timeout(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

impl From<reqwest::Error> for ZaloApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else {
            Self::RestResponseError(e.to_string())
        }
    }
}
