//! 管理シートのユーザー情報（読み取り専用）。

use async_trait::async_trait;

use crate::StoreResult;

/// 管理シートの 1 行。値はシート上の表記のまま保持する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: String,
    pub user_name: String,
    pub login_count: String,
    /// 募集
    pub recruitment: String,
    /// VC 接続時間
    pub voice_time: String,
    pub bonus: String,
    pub total_points: String,
}

impl UserProfile {
    /// 行をユーザー情報として読む。足りないセルは空文字列になる。
    pub fn from_row(row: &[String]) -> Option<Self> {
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
        let user_id = row.first()?.clone();
        Some(Self {
            user_id,
            user_name: cell(1),
            login_count: cell(2),
            recruitment: cell(3),
            voice_time: cell(4),
            bonus: cell(5),
            total_points: cell(6),
        })
    }

    /// 表示用の (項目名, 値) をシートの列順で返す。
    pub fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("ユーザーID", self.user_id.as_str()),
            ("ユーザー名", self.user_name.as_str()),
            ("ログイン回数", self.login_count.as_str()),
            ("募集", self.recruitment.as_str()),
            ("VC接続時間", self.voice_time.as_str()),
            ("ボーナス", self.bonus.as_str()),
            ("総ポイント", self.total_points.as_str()),
        ]
    }

    /// ヘッダー行を除いた行から `user_id` と完全一致する最初の行を探す。
    pub fn find_in_rows<R: AsRef<[String]>>(rows: &[R], user_id: &str) -> Option<Self> {
        rows.iter()
            .skip(1)
            .map(|row| row.as_ref())
            .find(|row| row.first().is_some_and(|id| id == user_id))
            .and_then(Self::from_row)
    }
}

#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn find(&self, user_id: &str) -> StoreResult<Option<UserProfile>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn finds_exact_match_after_header() {
        let rows = vec![
            row(&["ユーザーID", "ユーザー名", "ログイン回数", "募集", "VC接続時間", "ボーナス", "総ポイント"]),
            row(&["1234", "bob", "1", "0", "0", "0", "1"]),
            row(&["123", "alice", "12", "3", "4:30", "5", "42"]),
        ];

        let profile = UserProfile::find_in_rows(&rows, "123").unwrap();
        assert_eq!(profile.user_name, "alice");
        assert_eq!(profile.total_points, "42");
        assert_eq!(profile.fields()[4], ("VC接続時間", "4:30"));

        assert!(UserProfile::find_in_rows(&rows, "12").is_none());
        assert!(UserProfile::find_in_rows(&rows, "ユーザーID").is_none());
    }

    #[test]
    fn short_rows_are_padded() {
        let rows = vec![row(&["header"]), row(&["123", "alice"])];
        let profile = UserProfile::find_in_rows(&rows, "123").unwrap();
        assert_eq!(profile.login_count, "");
        assert_eq!(profile.total_points, "");
    }
}
