/// Error taxonomy for the integration API client
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP 401, the credential is expired or invalid
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// HTTP 403, the credential lacks permission
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Any other HTTP failure, transport fault or malformed payload
    #[error("Error requesting data from {url}: {message}")]
    Request {
        status: Option<u16>,
        url: String,
        message: String,
    },

    #[error("Unknown device serial number: {0}")]
    DeviceNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn request<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Error::Request {
            status: None,
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn status<U: Into<String>, M: Into<String>>(status: u16, url: U, message: M) -> Self {
        Error::Request {
            status: Some(status),
            url: url.into(),
            message: message.into(),
        }
    }

    /// Errors the client recovers from by logging in again
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::Unauthorized(_) | Error::Forbidden(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Request {
            status: err.status().map(|s| s.as_u16()),
            url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            message: err.to_string(),
        }
    }
}
