//! コアのストアトレイトをスプレッドシートのシートに対応付ける。

use std::sync::Arc;

use async_trait::async_trait;
use attend_core::{
    AttendanceEvent, AttendanceLog, LogSchema, ProfileDirectory, Settings, SettingsStore,
    StoreResult, UserProfile,
};
use chrono::NaiveDate;
use tracing::debug;

use super::SheetsClient;

/// 設定シート（1 行目はヘッダー, A 列が設定名, B 列が値）。
pub struct SheetSettings {
    client: Arc<SheetsClient>,
    sheet: String,
}

impl SheetSettings {
    pub fn new(client: Arc<SheetsClient>, sheet: impl Into<String>) -> Self {
        Self {
            client,
            sheet: sheet.into(),
        }
    }
}

#[async_trait]
impl SettingsStore for SheetSettings {
    async fn load(&self) -> StoreResult<Settings> {
        let rows = self.client.get_values(&self.sheet).await?;
        Ok(Settings::from_rows(&rows))
    }
}

/// 出席ログのシート。
pub struct SheetAttendanceLog {
    client: Arc<SheetsClient>,
    sheet: String,
    schema: LogSchema,
}

impl SheetAttendanceLog {
    pub fn new(client: Arc<SheetsClient>, sheet: impl Into<String>, schema: LogSchema) -> Self {
        Self {
            client,
            sheet: sheet.into(),
            schema,
        }
    }
}

#[async_trait]
impl AttendanceLog for SheetAttendanceLog {
    async fn has_login_on(&self, user_id: &str, day: NaiveDate) -> StoreResult<bool> {
        let rows = self.client.get_values(&self.sheet).await?;
        debug!(sheet = %self.sheet, rows = rows.len(), "Attendance log loaded");
        Ok(self.schema.contains_login(&rows, user_id, day))
    }

    async fn append(&self, event: &AttendanceEvent) -> StoreResult<()> {
        let row = self.schema.encode(event);
        self.client.append_row(&self.sheet, &row).await?;
        Ok(())
    }
}

/// 管理シート（ユーザーごとのポイント集計）。
pub struct SheetProfiles {
    client: Arc<SheetsClient>,
    sheet: String,
}

impl SheetProfiles {
    pub fn new(client: Arc<SheetsClient>, sheet: impl Into<String>) -> Self {
        Self {
            client,
            sheet: sheet.into(),
        }
    }
}

#[async_trait]
impl ProfileDirectory for SheetProfiles {
    async fn find(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        let rows = self.client.get_values(&self.sheet).await?;
        Ok(UserProfile::find_in_rows(&rows, user_id))
    }
}
