//! ログインボタンによる出席記録のコアロジックを提供する。
//!
//! 日切り替え時刻を考慮した「論理的な今日」の計算と、
//! 出席ログへの重複しないログイン記録を扱う。
//! 外部ストア（スプレッドシートなど）へのアクセスはトレイト越しに行う。

pub mod attendance;
pub mod clock;
pub mod error;
pub mod login;
pub mod memory;
pub mod profile;
pub mod settings;

pub use attendance::{AttendanceEvent, AttendanceLog, EventKind, LogSchema};
pub use clock::{CutoverError, CutoverHour, DEFAULT_CUTOVER_HOUR, format_day, logical_day};
pub use error::{LoginError, StoreError, StoreResult};
pub use login::{
    LoginDecision, LoginOptions, LoginOutcome, LoginReport, LoginService, MissingProfilePolicy,
    ProfileReport,
};
pub use profile::{ProfileDirectory, UserProfile};
pub use settings::{Settings, SettingsStore};
