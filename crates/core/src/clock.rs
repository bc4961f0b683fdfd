//! 日切り替え時刻を考慮した日付計算。

use std::fmt;

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// 設定が無い、または不正な場合に使う日切り替え時刻。
pub const DEFAULT_CUTOVER_HOUR: u32 = 6;

/// 論理日の表記 (`YYYY/MM/DD`)。
pub const DAY_FORMAT: &str = "%Y/%m/%d";

/// ログに記録するタイムスタンプの表記。先頭が [`DAY_FORMAT`] と一致する。
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CutoverError {
    #[error("Cutover hour is not set")]
    Missing,
    #[error("Cutover hour is not an integer: {0:?}")]
    NotANumber(String),
    #[error("Cutover hour must be within 0..=23: {0}")]
    OutOfRange(i64),
}

/// 日付が切り替わる時刻（時単位, 0..=23）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CutoverHour(u32);

impl CutoverHour {
    pub fn new(hour: u32) -> Result<Self, CutoverError> {
        if hour <= 23 {
            Ok(Self(hour))
        } else {
            Err(CutoverError::OutOfRange(i64::from(hour)))
        }
    }

    /// 設定シートの値を解釈する。前後の空白は無視する。
    pub fn parse(value: Option<&str>) -> Result<Self, CutoverError> {
        let raw = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(CutoverError::Missing)?;
        let hour: i64 = raw
            .parse()
            .map_err(|_| CutoverError::NotANumber(raw.to_string()))?;
        u32::try_from(hour)
            .ok()
            .and_then(|h| Self::new(h).ok())
            .ok_or(CutoverError::OutOfRange(hour))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for CutoverHour {
    fn default() -> Self {
        Self(DEFAULT_CUTOVER_HOUR)
    }
}

impl fmt::Display for CutoverHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `now` が属する論理日を返す。
///
/// `zone` の現地時刻が同日の `cutover:00:00` より前なら前日、
/// それ以降ならその日の日付になる。`cutover` が 0 なら暦日と一致する。
pub fn logical_day(now: DateTime<Utc>, zone: Tz, cutover: CutoverHour) -> NaiveDate {
    let local = now.with_timezone(&zone).naive_local();
    let date = local.date();
    // 境界は cutover:00:00.000 ちょうどなので、時だけ比べれば十分
    if local.hour() < cutover.get() {
        date.pred_opt().unwrap_or(date)
    } else {
        date
    }
}

pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// `now` を `zone` の現地時刻としてログ用の文字列にする。
pub fn format_timestamp(now: DateTime<Utc>, zone: Tz) -> String {
    now.with_timezone(&zone).format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Tokyo;
    use chrono_tz::UTC;

    fn tokyo(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Tokyo
            .with_ymd_and_hms(y, m, d, h, min, s)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn before_cutover_is_previous_day() {
        let now = tokyo(2024, 3, 10, 5, 59, 59);
        assert_eq!(logical_day(now, Tokyo, CutoverHour::default()), ymd(2024, 3, 9));
    }

    #[test]
    fn at_cutover_is_same_day() {
        let now = tokyo(2024, 3, 10, 6, 0, 0);
        assert_eq!(logical_day(now, Tokyo, CutoverHour::default()), ymd(2024, 3, 10));
    }

    #[test]
    fn sub_second_before_cutover_is_previous_day() {
        let now = tokyo(2024, 3, 10, 5, 59, 59) + chrono::Duration::milliseconds(999);
        assert_eq!(logical_day(now, Tokyo, CutoverHour::default()), ymd(2024, 3, 9));
    }

    #[test]
    fn zero_cutover_is_calendar_day() {
        let cutover = CutoverHour::new(0).unwrap();
        assert_eq!(logical_day(tokyo(2024, 3, 10, 0, 0, 0), Tokyo, cutover), ymd(2024, 3, 10));
        assert_eq!(
            logical_day(tokyo(2024, 3, 10, 23, 59, 59), Tokyo, cutover),
            ymd(2024, 3, 10)
        );
    }

    #[test]
    fn crosses_month_and_year_boundaries() {
        let cutover = CutoverHour::new(6).unwrap();
        assert_eq!(logical_day(tokyo(2024, 3, 1, 1, 0, 0), Tokyo, cutover), ymd(2024, 2, 29));
        assert_eq!(logical_day(tokyo(2025, 1, 1, 5, 0, 0), Tokyo, cutover), ymd(2024, 12, 31));
    }

    #[test]
    fn uses_local_time_of_zone() {
        // 2024-03-09 21:30 UTC は東京では 3/10 06:30
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 21, 30, 0).unwrap();
        assert_eq!(logical_day(now, Tokyo, CutoverHour::default()), ymd(2024, 3, 10));
        assert_eq!(logical_day(now, UTC, CutoverHour::default()), ymd(2024, 3, 9));
    }

    #[test]
    fn repeated_evaluation_is_stable() {
        let now = tokyo(2024, 3, 10, 12, 0, 0);
        let cutover = CutoverHour::new(13).unwrap();
        let first = logical_day(now, Tokyo, cutover);
        assert_eq!(first, logical_day(now, Tokyo, cutover));
        assert_eq!(first, ymd(2024, 3, 9));
    }

    #[test]
    fn parse_cutover_hour() {
        assert_eq!(CutoverHour::parse(Some("6")), Ok(CutoverHour(6)));
        assert_eq!(CutoverHour::parse(Some(" 0 ")), Ok(CutoverHour(0)));
        assert_eq!(CutoverHour::parse(Some("23")), Ok(CutoverHour(23)));
        assert_eq!(CutoverHour::parse(None), Err(CutoverError::Missing));
        assert_eq!(CutoverHour::parse(Some("")), Err(CutoverError::Missing));
        assert_eq!(
            CutoverHour::parse(Some("6時")),
            Err(CutoverError::NotANumber("6時".to_string()))
        );
        assert_eq!(CutoverHour::parse(Some("24")), Err(CutoverError::OutOfRange(24)));
        assert_eq!(CutoverHour::parse(Some("-1")), Err(CutoverError::OutOfRange(-1)));
    }

    #[test]
    fn format_day_and_timestamp() {
        assert_eq!(format_day(ymd(2024, 3, 9)), "2024/03/09");
        let now = tokyo(2024, 3, 10, 5, 7, 9);
        assert_eq!(format_timestamp(now, Tokyo), "2024/03/10 05:07:09");
    }
}
