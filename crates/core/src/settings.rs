//! 設定シート（設定名 → 設定値）の読み込み。

use std::collections::HashMap;

use async_trait::async_trait;

use crate::StoreResult;
use crate::clock::{CutoverError, CutoverHour};

/// 設定名をキーにした設定値の集合。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    /// シートの行から設定を組み立てる。
    ///
    /// 1 行目はヘッダーとして読み飛ばす。列 0 が設定名、列 1 が設定値。
    /// 同じ設定名が複数行にある場合は後の行が優先される。
    pub fn from_rows<R: AsRef<[String]>>(rows: &[R]) -> Self {
        rows.iter()
            .skip(1)
            .filter_map(|row| {
                let row = row.as_ref();
                let key = row.first()?;
                let value = row.get(1).cloned().unwrap_or_default();
                Some((key.clone(), value))
            })
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// `key` の値を日切り替え時刻として解釈する。
    pub fn cutover_hour(&self, key: &str) -> Result<CutoverHour, CutoverError> {
        CutoverHour::parse(self.get(key))
    }
}

impl FromIterator<(String, String)> for Settings {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// 設定の読み込み元。
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> StoreResult<Settings>;
}
