use client::net::error::{ApiError, AuthFailure};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("not logged in; run `promptworks login` first")]
    NotLoggedIn,
    #[error("login succeeded but the account could not be loaded; try again")]
    LoginIncomplete,
    #[error("no token file location; pass --token-file or set PROMPTWORKS_TOKEN_FILE")]
    NoTokenPath,
    #[error("prompt {prompt_id} has no version {version_id}")]
    UnknownVersion { prompt_id: i64, version_id: i64 },
    #[error("{0}")]
    Auth(#[from] AuthFailure),
    #[error("api call failed: {0}")]
    Api(#[from] ApiError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
