//! 出席ログ（追記専用のイベント行）を扱う。

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::StoreResult;
use crate::clock::{format_day, format_timestamp};

/// 出席ログの 1 行が持つセル数。
pub const LOG_COLUMNS: usize = 6;

/// マッチングに必要な最小セル数（ユーザーID, ユーザー名, 日時, 種別）。
const REQUIRED_COLUMNS: usize = 4;

/// イベントの種別。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Login,
    /// ログイン以外の種別。ボイスチャンネルの接続記録など、他の仕組みが書き込む行。
    Other(String),
}

/// 出席ログの 1 行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEvent {
    pub user_id: String,
    /// 表示用。マッチングには使わない。
    pub display_name: String,
    /// 設定されたタイムゾーンでの `YYYY/MM/DD HH:MM:SS`
    pub timestamp: String,
    pub kind: EventKind,
    pub voice_start: String,
    pub voice_end: String,
}

impl AttendanceEvent {
    /// `now` 時点のログインイベントを作る。ボイスチャンネルの列は空のまま。
    pub fn login(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        now: DateTime<Utc>,
        zone: Tz,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            timestamp: format_timestamp(now, zone),
            kind: EventKind::Login,
            voice_start: String::new(),
            voice_end: String::new(),
        }
    }

    /// `user_id` が論理日 `day` にログインしたことを示す行かどうか。
    pub fn is_login_on(&self, user_id: &str, day: NaiveDate) -> bool {
        self.kind == EventKind::Login
            && self.user_id == user_id
            && self.timestamp.starts_with(&format_day(day))
    }
}

/// シートの行とイベントの相互変換規則。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSchema {
    login_label: String,
}

impl Default for LogSchema {
    fn default() -> Self {
        Self::new("login")
    }
}

impl LogSchema {
    /// `login_label` はログイン種別としてシートに書き込む文字列。
    pub fn new(login_label: impl Into<String>) -> Self {
        Self {
            login_label: login_label.into(),
        }
    }

    pub fn login_label(&self) -> &str {
        &self.login_label
    }

    pub fn encode(&self, event: &AttendanceEvent) -> Vec<String> {
        let kind = match &event.kind {
            EventKind::Login => self.login_label.clone(),
            EventKind::Other(label) => label.clone(),
        };
        vec![
            event.user_id.clone(),
            event.display_name.clone(),
            event.timestamp.clone(),
            kind,
            event.voice_start.clone(),
            event.voice_end.clone(),
        ]
    }

    /// 行をイベントとして読む。セルが 4 つ未満の行は `None`。
    pub fn decode(&self, row: &[String]) -> Option<AttendanceEvent> {
        if row.len() < REQUIRED_COLUMNS {
            return None;
        }
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
        let kind = if row[3] == self.login_label {
            EventKind::Login
        } else {
            EventKind::Other(row[3].clone())
        };
        Some(AttendanceEvent {
            user_id: cell(0),
            display_name: cell(1),
            timestamp: cell(2),
            kind,
            voice_start: cell(4),
            voice_end: cell(5),
        })
    }

    /// 行の中に `user_id` の論理日 `day` のログインがあるかを調べる。
    ///
    /// 新しい行ほど末尾にあるので末尾から走査する。結果は走査順に依存しない。
    pub fn contains_login<R: AsRef<[String]>>(
        &self,
        rows: &[R],
        user_id: &str,
        day: NaiveDate,
    ) -> bool {
        rows.iter()
            .rev()
            .filter_map(|row| self.decode(row.as_ref()))
            .any(|event| event.is_login_on(user_id, day))
    }
}

/// 出席ログの保存先。
///
/// 重複チェックと追記の間に排他は無い。同じユーザーの同時リクエストは
/// 両方とも追記されうる。
#[async_trait]
pub trait AttendanceLog: Send + Sync {
    async fn has_login_on(&self, user_id: &str, day: NaiveDate) -> StoreResult<bool>;

    /// 末尾に 1 行追記する。追記後の読み直しは行わない。
    async fn append(&self, event: &AttendanceEvent) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Tokyo;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn login_event_row() {
        let now = Tokyo
            .with_ymd_and_hms(2024, 3, 10, 8, 15, 0)
            .unwrap()
            .with_timezone(&Utc);
        let event = AttendanceEvent::login("123", "alice", now, Tokyo);
        let schema = LogSchema::new("ログイン");

        assert_eq!(
            schema.encode(&event),
            row(&["123", "alice", "2024/03/10 08:15:00", "ログイン", "", ""])
        );
        assert_eq!(schema.encode(&event).len(), LOG_COLUMNS);
    }

    #[test]
    fn decode_reads_kind_by_label() {
        let schema = LogSchema::new("ログイン");
        let login = schema
            .decode(&row(&["1", "a", "2024/03/10 08:00:00", "ログイン"]))
            .unwrap();
        assert_eq!(login.kind, EventKind::Login);
        assert_eq!(login.voice_start, "");

        let voice = schema
            .decode(&row(&["1", "a", "2024/03/10 08:00:00", "VC", "08:00", "09:00"]))
            .unwrap();
        assert_eq!(voice.kind, EventKind::Other("VC".to_string()));
        assert_eq!(voice.voice_end, "09:00");
    }

    #[test]
    fn decode_rejects_short_rows() {
        let schema = LogSchema::default();
        assert!(schema.decode(&row(&["1", "a", "2024/03/10 08:00:00"])).is_none());
        assert!(schema.decode(&[]).is_none());
    }

    #[test]
    fn contains_login_matches_user_day_and_kind() {
        let schema = LogSchema::new("ログイン");
        let rows = vec![
            row(&["ユーザーID", "ユーザー名", "日時", "種別", "VC開始", "VC終了"]),
            row(&["123", "alice", "2024/03/09 23:00:00", "ログイン", "", ""]),
            row(&["456", "bob", "2024/03/10 07:00:00", "ログイン", "", ""]),
            row(&["123", "alice", "2024/03/10 09:00:00", "VC", "09:00", "10:00"]),
            row(&["123", "alice", "2024/03/10"]),
        ];

        assert!(schema.contains_login(&rows, "123", day(2024, 3, 9)));
        assert!(!schema.contains_login(&rows, "123", day(2024, 3, 10)));
        assert!(schema.contains_login(&rows, "456", day(2024, 3, 10)));
        assert!(!schema.contains_login(&rows, "12", day(2024, 3, 9)));
    }

    #[test]
    fn contains_login_ignores_other_labels() {
        let rows = vec![row(&["123", "alice", "2024/03/10 09:00:00", "ログイン"])];
        assert!(!LogSchema::default().contains_login(&rows, "123", day(2024, 3, 10)));
        assert!(LogSchema::new("ログイン").contains_login(&rows, "123", day(2024, 3, 10)));
    }

    #[test]
    fn contains_login_is_order_independent() {
        let schema = LogSchema::default();
        let mut rows = vec![
            row(&["123", "alice", "2024/03/10 09:00:00", "login"]),
            row(&["456", "bob", "2024/03/10 10:00:00", "login"]),
            row(&["789", "carol", "2024/03/11 06:00:00", "login"]),
        ];
        let forward = schema.contains_login(&rows, "123", day(2024, 3, 10));
        rows.reverse();
        assert_eq!(forward, schema.contains_login(&rows, "123", day(2024, 3, 10)));
        assert!(forward);
    }
}
