//! テスト用のインメモリ実装。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::attendance::{AttendanceEvent, AttendanceLog};
use crate::profile::{ProfileDirectory, UserProfile};
use crate::settings::{Settings, SettingsStore};
use crate::{StoreError, StoreResult};

/// 出席ログのインメモリ実装。読み込み・追記の失敗を切り替えられる。
#[derive(Debug, Default)]
pub struct MemoryAttendanceLog {
    events: RwLock<Vec<AttendanceEvent>>,
    fail_reads: AtomicBool,
    fail_appends: AtomicBool,
}

impl MemoryAttendanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// 記録済みのイベントを古い順に返す。
    pub async fn events(&self) -> Vec<AttendanceEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl AttendanceLog for MemoryAttendanceLog {
    async fn has_login_on(&self, user_id: &str, day: NaiveDate) -> StoreResult<bool> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("attendance log read failed"));
        }
        let events = self.events.read().await;
        Ok(events
            .iter()
            .rev()
            .any(|event| event.is_login_on(user_id, day)))
    }

    async fn append(&self, event: &AttendanceEvent) -> StoreResult<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("attendance log append failed"));
        }
        self.events.write().await.push(event.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySettings {
    settings: RwLock<Settings>,
    fail: AtomicBool,
}

impl MemorySettings {
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let settings: Settings = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            settings: RwLock::new(settings),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn load(&self) -> StoreResult<Settings> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("settings read failed"));
        }
        Ok(self.settings.read().await.clone())
    }
}

#[derive(Debug, Default)]
pub struct MemoryProfiles {
    profiles: RwLock<HashMap<String, UserProfile>>,
    fail: AtomicBool,
}

impl MemoryProfiles {
    pub async fn insert(&self, profile: UserProfile) {
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile);
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProfileDirectory for MemoryProfiles {
    async fn find(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("profile read failed"));
        }
        Ok(self.profiles.read().await.get(user_id).cloned())
    }
}
