use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 外部ストアへのアクセスで発生するエラー。
#[derive(Debug, Error)]
pub enum StoreError {
    /// 読み込みまたは追記に失敗した。リトライは呼び出し側の責務。
    #[error("Source unavailable: {message}")]
    SourceUnavailable {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
            source: None,
        }
    }

    pub fn unavailable_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// ログイン処理 1 回分を失敗させるエラー。
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("User ID must not be empty")]
    EmptyUserId,

    /// 出席ログの読み込みまたは追記に失敗した。
    #[error("Attendance store error: {0}")]
    AttendanceStore(#[source] StoreError),
}
