//! ログインボタン押下時の処理。
//!
//! 日切り替え時刻から論理日を求め、その日のログインが未記録であれば
//! 出席ログに 1 行追記する。

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::attendance::{AttendanceEvent, AttendanceLog};
use crate::clock::{CutoverHour, format_day, logical_day};
use crate::error::LoginError;
use crate::profile::{ProfileDirectory, UserProfile};
use crate::settings::SettingsStore;

/// 管理シートにユーザーが見つからない場合の扱い。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingProfilePolicy {
    /// 見つからなかったことを報告する
    #[default]
    Report,
    /// 何も報告しない
    Omit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOptions {
    /// ログの日時と論理日の計算に使うタイムゾーン
    pub timezone: Tz,
    /// 設定シート上の日切り替え時刻の設定名
    pub cutover_key: String,
    pub missing_profile: MissingProfilePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    AlreadyLoggedIn,
    Recorded,
}

/// 重複チェックと記録の結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginDecision {
    pub outcome: LoginOutcome,
    pub logical_day: NaiveDate,
    pub cutover: CutoverHour,
    /// 設定タイムゾーンでの押下時刻
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileReport {
    Found(UserProfile),
    /// 管理シートに未登録。ポイントは次の日切り替え以降に照会できる。
    Missing { cutover: CutoverHour },
    Omitted,
}

/// ボット側に返す結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginReport {
    pub decision: LoginDecision,
    pub profile: ProfileReport,
}

impl LoginReport {
    pub fn outcome(&self) -> LoginOutcome {
        self.decision.outcome
    }
}

pub struct LoginService {
    settings: Arc<dyn SettingsStore>,
    log: Arc<dyn AttendanceLog>,
    profiles: Arc<dyn ProfileDirectory>,
    options: LoginOptions,
}

impl LoginService {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        log: Arc<dyn AttendanceLog>,
        profiles: Arc<dyn ProfileDirectory>,
        options: LoginOptions,
    ) -> Self {
        Self {
            settings,
            log,
            profiles,
            options,
        }
    }

    /// 設定シートから日切り替え時刻を取得する。
    ///
    /// 取得や解釈に失敗した場合は既定値を使い、処理は続行する。
    pub async fn cutover_hour(&self) -> CutoverHour {
        let key = self.options.cutover_key.as_str();
        let settings = match self.settings.load().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Failed to load settings, using default cutover hour");
                return CutoverHour::default();
            }
        };
        match settings.cutover_hour(key) {
            Ok(hour) => hour,
            Err(e) => {
                warn!(error = %e, key, "Invalid cutover setting, using default cutover hour");
                CutoverHour::default()
            }
        }
    }

    /// 論理日のログインが未記録であれば記録する。
    pub async fn record_login_if_needed(
        &self,
        user_id: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginDecision, LoginError> {
        if user_id.is_empty() {
            return Err(LoginError::EmptyUserId);
        }

        let zone = self.options.timezone;
        let cutover = self.cutover_hour().await;
        let day = logical_day(now, zone, cutover);
        debug!(user_id, day = %format_day(day), cutover = cutover.get(), "Checking login");

        let event = AttendanceEvent::login(user_id, display_name, now, zone);

        let already = self
            .log
            .has_login_on(user_id, day)
            .await
            .map_err(LoginError::AttendanceStore)?;

        let outcome = if already {
            LoginOutcome::AlreadyLoggedIn
        } else {
            self.log
                .append(&event)
                .await
                .map_err(LoginError::AttendanceStore)?;
            info!(user_id, user = display_name, at = %event.timestamp, "Login recorded");
            LoginOutcome::Recorded
        };

        Ok(LoginDecision {
            outcome,
            logical_day: day,
            cutover,
            timestamp: event.timestamp,
        })
    }

    /// ボタン押下 1 回分の処理。ログインの記録とユーザー情報の照会を行う。
    ///
    /// ユーザー情報の照会に失敗してもログインの結果は返す。
    pub async fn on_login_request(
        &self,
        user_id: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginReport, LoginError> {
        let decision = self
            .record_login_if_needed(user_id, display_name, now)
            .await?;

        let profile = match self.profiles.find(user_id).await {
            Ok(Some(profile)) => ProfileReport::Found(profile),
            Ok(None) => match self.options.missing_profile {
                MissingProfilePolicy::Report => ProfileReport::Missing {
                    cutover: decision.cutover,
                },
                MissingProfilePolicy::Omit => ProfileReport::Omitted,
            },
            Err(e) => {
                warn!(error = %e, user_id, "Failed to look up user profile");
                ProfileReport::Omitted
            }
        };

        Ok(LoginReport { decision, profile })
    }
}
