use std::time::Duration;

use reqwest::{Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::auth::{ServiceAccountKey, TokenProvider};
use super::{Result, SheetsError};

const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Sheets API (values) の最小限のクライアント。
pub struct SheetsClient {
    http: reqwest::Client,
    tokens: TokenProvider,
    spreadsheet_id: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    /// 空のシートではフィールド自体が返らない
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AppendRequest<'a> {
    major_dimension: &'a str,
    values: [&'a [String]; 1],
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl SheetsClient {
    pub fn new(
        spreadsheet_id: impl Into<String>,
        key: ServiceAccountKey,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let tokens = TokenProvider::new(key, http.clone())?;
        Ok(Self {
            http,
            tokens,
            spreadsheet_id: spreadsheet_id.into(),
        })
    }

    /// シート全体の値を行単位で取得する。
    pub async fn get_values(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        let url = values_url(&self.spreadsheet_id, &sheet_range(sheet), "")?;
        let token = self.tokens.access_token().await?;

        let response = self.http.get(url).bearer_auth(token).send().await?;
        let body: ValueRange = check_status(response).await?.json().await?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    /// シートの末尾に 1 行追記する。値は入力どおりの文字列として保存される。
    pub async fn append_row(&self, sheet: &str, row: &[String]) -> Result<()> {
        let url = values_url(&self.spreadsheet_id, &sheet_range(sheet), ":append")?;
        let token = self.tokens.access_token().await?;

        let request = AppendRequest {
            major_dimension: "ROWS",
            values: [row],
        };
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&request)
            .send()
            .await?;
        check_status(response).await?;

        Ok(())
    }
}

/// シート名を A1 表記の範囲にする。シングルクォートは二重にする。
pub fn sheet_range(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

fn values_url(spreadsheet_id: &str, range: &str, suffix: &str) -> Result<Url> {
    let mut url = Url::parse(SHEETS_ENDPOINT).map_err(|_| SheetsError::Url)?;
    url.path_segments_mut()
        .map_err(|_| SheetsError::Url)?
        .push(spreadsheet_id)
        .push("values")
        .push(&format!("{range}{suffix}"));
    Ok(url)
}

fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.error.message)
        .unwrap_or(text);
    Err(SheetsError::Api { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quotes_sheet_names() {
        assert_eq!(sheet_range("log"), "'log'");
        assert_eq!(sheet_range("管理"), "'管理'");
        assert_eq!(sheet_range("it's"), "'it''s'");
    }

    #[test]
    fn builds_values_urls() {
        let url = values_url("abc", &sheet_range("log"), "").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'log'"
        );

        let url = values_url("abc", &sheet_range("log"), ":append").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'log':append"
        );

        let url = values_url("abc", &sheet_range("設定"), "").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'%E8%A8%AD%E5%AE%9A'"
        );
    }

    #[test]
    fn parses_value_range() {
        let body: ValueRange = serde_json::from_value(json!({
            "range": "'log'!A1:F2",
            "majorDimension": "ROWS",
            "values": [["123", "alice", "2024/03/10 09:00:00", "ログイン"], ["456", 7]]
        }))
        .unwrap();

        let rows: Vec<Vec<String>> = body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();
        assert_eq!(rows[0][3], "ログイン");
        assert_eq!(rows[1], vec!["456".to_string(), "7".to_string()]);
    }

    #[test]
    fn empty_sheet_has_no_values() {
        let body: ValueRange =
            serde_json::from_value(json!({"range": "'log'!A1:Z1000", "majorDimension": "ROWS"}))
                .unwrap();
        assert!(body.values.is_empty());
    }

    #[test]
    fn append_request_body() {
        let row = vec!["123".to_string(), String::new()];
        let request = AppendRequest {
            major_dimension: "ROWS",
            values: [&row],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"majorDimension": "ROWS", "values": [["123", ""]]})
        );
    }
}
