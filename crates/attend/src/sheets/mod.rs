//! Google Sheets API を使った各ストアの実装。
//!
//! サービスアカウントで認証し、シート全体の読み込みと行の追記だけを行う。

mod auth;
mod client;
mod store;

pub use auth::ServiceAccountKey;
pub use client::SheetsClient;
pub use store::{SheetAttendanceLog, SheetProfiles, SheetSettings};

use attend_core::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("Failed to read credentials: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid credentials: {0}")]
    Credentials(#[from] serde_json::Error),

    #[error("Failed to sign token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API returned {status}: {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Invalid request URL")]
    Url,
}

pub type Result<T> = std::result::Result<T, SheetsError>;

impl From<SheetsError> for StoreError {
    fn from(e: SheetsError) -> Self {
        StoreError::unavailable_with("Google Sheets request failed", e)
    }
}
