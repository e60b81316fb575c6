//! Error types for the crate.

use reqwest::StatusCode;
use reqwest_middleware;

/// Result alias for methods in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Any error that can occur when making a request.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An invalid parameter was passed by the caller.
    #[error("Invalid parameter: {}", .0)]
    Parameter(#[from] ParameterError),
    /// An error occurred during the request.
    #[error("Request error: {}", .0)]
    Reqwest(#[from] reqwest::Error),
    /// An error occurred in the request middleware.
    #[error("Request middleware error: {}", .0)]
    ReqwestMiddleware(anyhow::Error),
    /// The response returned an HTTP error status.
    #[error("HTTP error {}", .0)]
    Http(StatusCode),
    /// An error occurred parsing the response body.
    #[error("Error parsing response: {}", .0)]
    Parse(#[from] serde_json::Error),
    /// The response did not have the expected shape. This usually means Steam changed
    /// something on their end.
    #[error("{}", .0)]
    MalformedResponse(&'static str),
    /// The response contained an error message.
    #[error("Unexpected response: {}", .0)]
    Response(String),
    /// RSA encryption of the password failed.
    #[error("RSA error: {}", .0)]
    Rsa(#[from] rsa::Error),
    /// The session is no longer logged in. Detected when an authenticated request comes
    /// back with a not-logged-in marker. Also broadcast through
    /// [`crate::SessionExpiryNotifier`].
    #[error("Not logged in")]
    NotLoggedIn,
}

impl From<reqwest_middleware::Error> for Error {
    fn from(error: reqwest_middleware::Error) -> Error {
        match error {
            reqwest_middleware::Error::Reqwest(e) => Error::Reqwest(e),
            reqwest_middleware::Error::Middleware(e) => Error::ReqwestMiddleware(e),
        }
    }
}

/// An invalid parameter. These indicate a caller bug rather than a runtime condition and
/// are never worth retrying.
#[derive(thiserror::Error, Debug)]
pub enum ParameterError {
    /// The account name or password is empty.
    #[error("Missing account name or password")]
    MissingCredentials,
    /// A machine auth token was supplied but does not have the
    /// `"<steamid>||<token>"` format.
    #[error("Invalid machine auth token format")]
    InvalidMachineAuthToken,
}

/// Why a login attempt did not complete. Apart from
/// [`RejectedCredentials`][`LoginChallenge::RejectedCredentials`] these are actionable:
/// call login again with the additional field filled in.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginChallenge {
    /// A Steam Guard code was sent to the account's email address at this domain.
    #[error("A Steam Guard code sent to the address at {} is required", .0)]
    EmailGuard(String),
    /// A Steam Guard code from the mobile authenticator is required.
    #[error("A Steam Guard mobile authenticator code is required")]
    MobileGuard,
    /// A CAPTCHA must be solved. `url` renders the image for the given `gid`.
    #[error("A CAPTCHA is required ({})", .url)]
    Captcha {
        /// The CAPTCHA challenge ID.
        gid: String,
        /// URL which renders the CAPTCHA image.
        url: String,
    },
    /// Steam rejected the credentials.
    #[error("{}", .0)]
    RejectedCredentials(String),
}

/// Any error that can occur during login.
#[derive(thiserror::Error, Debug)]
pub enum LoginError {
    /// The attempt did not complete and requires caller action before retrying.
    #[error("{}", .0)]
    Challenge(#[from] LoginChallenge),
    /// The attempt failed outright.
    #[error("{}", .0)]
    Error(#[from] Error),
}

impl From<ParameterError> for LoginError {
    fn from(error: ParameterError) -> LoginError {
        LoginError::Error(Error::Parameter(error))
    }
}

impl From<reqwest_middleware::Error> for LoginError {
    fn from(error: reqwest_middleware::Error) -> LoginError {
        LoginError::Error(error.into())
    }
}

impl From<reqwest::Error> for LoginError {
    fn from(error: reqwest::Error) -> LoginError {
        LoginError::Error(Error::Reqwest(error))
    }
}

impl From<serde_json::Error> for LoginError {
    fn from(error: serde_json::Error) -> LoginError {
        LoginError::Error(Error::Parse(error))
    }
}
