use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use attend_core::{LogSchema, LoginOptions, MissingProfilePolicy};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub discord: DiscordConfig,
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub attendance: AttendanceConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DiscordConfig {
    pub token: String,
    /// ログインボタンを投稿するチャンネル
    pub channel_id: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: "YOUR_DISCORD_BOT_TOKEN".to_string(),
            channel_id: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    /// サービスアカウントの鍵ファイル (JSON)
    pub credentials: PathBuf,
    #[serde(default = "default_log_sheet")]
    pub log_sheet: String,
    #[serde(default = "default_profile_sheet")]
    pub profile_sheet: String,
    #[serde(default = "default_settings_sheet")]
    pub settings_sheet: String,
    /// 設定シート上の日切り替え時刻の設定名
    #[serde(default = "default_cutover_key")]
    pub cutover_key: String,
    /// ログシートの種別列にログインとして書き込む文字列
    #[serde(default = "default_login_label")]
    pub login_label: String,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: "YOUR_SPREADSHEET_ID".to_string(),
            credentials: PathBuf::from("google_service.json"),
            log_sheet: default_log_sheet(),
            profile_sheet: default_profile_sheet(),
            settings_sheet: default_settings_sheet(),
            cutover_key: default_cutover_key(),
            login_label: default_login_label(),
            timeout: default_timeout(),
        }
    }
}

fn default_log_sheet() -> String {
    "log".to_string()
}

fn default_profile_sheet() -> String {
    "管理".to_string()
}

fn default_settings_sheet() -> String {
    "設定".to_string()
}

fn default_cutover_key() -> String {
    "日切り替え".to_string()
}

fn default_login_label() -> String {
    "ログイン".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AttendanceConfig {
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    #[serde(default)]
    pub missing_profile: MissingProfilePolicy,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            missing_profile: MissingProfilePolicy::default(),
        }
    }
}

fn default_timezone() -> Tz {
    chrono_tz::Asia::Tokyo
}

impl Config {
    pub fn login_options(&self) -> LoginOptions {
        LoginOptions {
            timezone: self.attendance.timezone,
            cutover_key: self.sheets.cutover_key.clone(),
            missing_profile: self.attendance.missing_profile,
        }
    }

    pub fn log_schema(&self) -> LogSchema {
        LogSchema::new(self.sheets.login_label.clone())
    }
}

pub fn open_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
    let config: Config = toml::from_str(&content).context("Failed to parse configuration file")?;
    Ok(config)
}

pub fn write_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let content =
        toml::to_string_pretty(&Config::default()).context("Failed to serialize configuration")?;
    fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
    Ok(())
}
