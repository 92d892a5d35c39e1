//! Google Sheets workbook backend.
//!
//! Talks to the Sheets v4 REST API directly. Workbooks are located by title
//! through the Drive v3 file listing, or opened by spreadsheet id.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use polars::prelude::DataFrame;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};
use valuation_core::{CellAddress, DataError, Result, Workbook, Worksheet, table};

use crate::auth::{ServiceAccountAuth, ServiceAccountKey};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";

const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.readonly",
];

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

const PROVIDER_NAME: &str = "Google Sheets";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: usize,
    #[serde(default)]
    column_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
    #[serde(default)]
    grid_properties: GridProperties,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Default, Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// Quotes a sheet title for use in A1 notation.
fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// A1 range of a whole sheet, or of the cell at `anchor` when given.
fn a1_range(title: &str, anchor: Option<CellAddress>) -> String {
    match anchor {
        Some(anchor) => format!("{}!{anchor}", quote_title(title)),
        None => quote_title(title),
    }
}

/// Drive query matching a spreadsheet by exact name.
fn drive_query(title: &str) -> String {
    let escaped = title.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name='{escaped}' and mimeType='{SPREADSHEET_MIME_TYPE}' and trashed=false")
}

/// Maps a failed API response to a [`DataError`].
fn status_error(status: StatusCode, body: &str) -> DataError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED => DataError::AuthenticationFailed(message),
        StatusCode::TOO_MANY_REQUESTS => DataError::RateLimited {
            provider: PROVIDER_NAME.to_string(),
            message,
        },
        _ => DataError::Sheet(format!("HTTP {status}: {message}")),
    }
}

fn parse_url(base: &str) -> Result<Url> {
    Url::parse(base).map_err(|e| DataError::InvalidParameter(format!("{base}: {e}")))
}

/// Builds `{base}/{segments...}` with each segment percent-encoded.
fn join_segments(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = parse_url(base)?;
    url.path_segments_mut()
        .map_err(|()| DataError::InvalidParameter(format!("{base} cannot be a base URL")))?
        .extend(segments);
    Ok(url)
}

/// Authenticated client bound to one spreadsheet.
struct SheetsClient {
    http: Client,
    auth: ServiceAccountAuth,
    spreadsheet_id: String,
}

impl fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetsClient")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("auth", &self.auth)
            .finish()
    }
}

impl SheetsClient {
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut all = vec![self.spreadsheet_id.as_str()];
        all.extend_from_slice(segments);
        join_segments(SHEETS_API, &all)
    }

    fn values_url(&self, range: &str, action: Option<&str>) -> Result<Url> {
        match action {
            Some(action) => {
                let target = format!("{range}:{action}");
                self.url(&["values", target.as_str()])
            }
            None => self.url(&["values", range]),
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        send_authorized(&self.auth, request).await
    }

    async fn sheet_properties(&self) -> Result<Vec<SheetProperties>> {
        let mut url = self.url(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(sheetId,title,gridProperties)");

        let body = self.send(self.http.get(url)).await?;
        let response: SpreadsheetResponse =
            serde_json::from_value(body).map_err(|e| DataError::Parse(e.to_string()))?;
        Ok(response
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties)
            .collect())
    }

    async fn batch_update(&self, requests: Value) -> Result<Value> {
        let target = format!("{}:batchUpdate", self.spreadsheet_id);
        let url = join_segments(SHEETS_API, &[target.as_str()])?;
        self.send(self.http.post(url).json(&json!({ "requests": requests })))
            .await
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<Value>>> {
        let mut url = self.values_url(range, None)?;
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE")
            .append_pair("majorDimension", "ROWS");

        let body = self.send(self.http.get(url)).await?;
        let range: ValueRange =
            serde_json::from_value(body).map_err(|e| DataError::Parse(e.to_string()))?;
        Ok(range.values)
    }

    async fn clear_values(&self, range: &str) -> Result<()> {
        let url = self.values_url(range, Some("clear"))?;
        self.send(self.http.post(url).json(&json!({}))).await?;
        Ok(())
    }

    async fn update_values(&self, range: &str, rows: Vec<Vec<Value>>) -> Result<()> {
        let mut url = self.values_url(range, None)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });
        self.send(self.http.put(url).json(&body)).await?;
        Ok(())
    }

    /// Grows the sheet's grid so that it holds at least `rows` x `columns`.
    async fn ensure_grid(&self, sheet_id: i64, rows: usize, columns: usize) -> Result<()> {
        let current = self
            .sheet_properties()
            .await?
            .into_iter()
            .find(|p| p.sheet_id == sheet_id)
            .map(|p| p.grid_properties)
            .unwrap_or_default();

        if current.row_count >= rows && current.column_count >= columns {
            return Ok(());
        }

        let row_count = current.row_count.max(rows);
        let column_count = current.column_count.max(columns);
        debug!(sheet_id, row_count, column_count, "Resizing sheet grid");

        self.batch_update(json!([{
            "updateSheetProperties": {
                "properties": {
                    "sheetId": sheet_id,
                    "gridProperties": {
                        "rowCount": row_count,
                        "columnCount": column_count,
                    },
                },
                "fields": "gridProperties(rowCount,columnCount)",
            }
        }]))
        .await?;
        Ok(())
    }
}

/// Sends a request with a bearer token and decodes the JSON reply.
async fn send_authorized(auth: &ServiceAccountAuth, request: RequestBuilder) -> Result<Value> {
    let token = auth.access_token().await?;
    let response = request
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| DataError::Network(e.to_string()))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| DataError::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(status_error(status, &text));
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| DataError::Parse(format!("{e}: {text}")))
}

/// A Google Sheets spreadsheet opened with a service account.
#[derive(Debug)]
pub struct GoogleWorkbook {
    title: String,
    client: Arc<SheetsClient>,
}

impl GoogleWorkbook {
    /// Open the spreadsheet whose Drive name is `title`.
    ///
    /// # Errors
    /// Returns [`DataError::WorkbookNotFound`] when no spreadsheet visible to
    /// the service account has that name.
    #[instrument(skip(key))]
    pub async fn open(key: ServiceAccountKey, title: &str) -> Result<Self> {
        let http = Client::new();
        let auth = ServiceAccountAuth::new(http.clone(), key, &SCOPES);

        let mut url = parse_url(DRIVE_FILES_API)?;
        url.query_pairs_mut()
            .append_pair("q", &drive_query(title))
            .append_pair("fields", "files(id,name)")
            .append_pair("pageSize", "1");

        let body = send_authorized(&auth, http.get(url)).await?;
        let list: DriveFileList =
            serde_json::from_value(body).map_err(|e| DataError::Parse(e.to_string()))?;
        let Some(file) = list.files.into_iter().next() else {
            return Err(DataError::WorkbookNotFound(title.to_string()));
        };

        debug!(spreadsheet_id = %file.id, "Opened workbook");
        Ok(Self::from_parts(http, auth, file.id, title))
    }

    /// Open a spreadsheet by its id, skipping the Drive lookup.
    ///
    /// The title is read back from the spreadsheet.
    ///
    /// # Errors
    /// Returns an error if the spreadsheet cannot be read.
    #[instrument(skip(key))]
    pub async fn open_by_key(key: ServiceAccountKey, spreadsheet_id: &str) -> Result<Self> {
        let http = Client::new();
        let auth = ServiceAccountAuth::new(http.clone(), key, &SCOPES);

        let mut url = join_segments(SHEETS_API, &[spreadsheet_id])?;
        url.query_pairs_mut().append_pair("fields", "properties.title");
        let body = send_authorized(&auth, http.get(url)).await?;
        let title = body
            .pointer("/properties/title")
            .and_then(Value::as_str)
            .unwrap_or(spreadsheet_id)
            .to_string();

        Ok(Self::from_parts(http, auth, spreadsheet_id.to_string(), &title))
    }

    fn from_parts(
        http: Client,
        auth: ServiceAccountAuth,
        spreadsheet_id: String,
        title: &str,
    ) -> Self {
        Self {
            title: title.to_string(),
            client: Arc::new(SheetsClient {
                http,
                auth,
                spreadsheet_id,
            }),
        }
    }

    /// Id of the underlying spreadsheet.
    #[must_use]
    pub fn spreadsheet_id(&self) -> &str {
        &self.client.spreadsheet_id
    }

    fn handle(&self, properties: SheetProperties) -> Arc<dyn Worksheet> {
        Arc::new(GoogleWorksheet {
            client: Arc::clone(&self.client),
            title: properties.title,
            sheet_id: properties.sheet_id,
        })
    }
}

#[async_trait]
impl Workbook for GoogleWorkbook {
    fn title(&self) -> &str {
        &self.title
    }

    #[instrument(skip(self))]
    async fn worksheet(&self, title: &str) -> Result<Arc<dyn Worksheet>> {
        let properties = self
            .client
            .sheet_properties()
            .await?
            .into_iter()
            .find(|p| p.title == title)
            .ok_or_else(|| DataError::WorksheetNotFound(title.to_string()))?;
        Ok(self.handle(properties))
    }

    #[instrument(skip(self))]
    async fn add_worksheet(&self, title: &str) -> Result<Arc<dyn Worksheet>> {
        let reply = self
            .client
            .batch_update(json!([{ "addSheet": { "properties": { "title": title } } }]))
            .await?;
        let properties = reply
            .pointer("/replies/0/addSheet/properties")
            .cloned()
            .ok_or_else(|| DataError::Parse(format!("addSheet reply for {title} has no properties")))?;
        let properties: SheetProperties =
            serde_json::from_value(properties).map_err(|e| DataError::Parse(e.to_string()))?;

        warn!(sheet = title, sheet_id = properties.sheet_id, "Created worksheet");
        Ok(self.handle(properties))
    }
}

/// One tab of a [`GoogleWorkbook`].
#[derive(Debug)]
pub struct GoogleWorksheet {
    client: Arc<SheetsClient>,
    title: String,
    sheet_id: i64,
}

#[async_trait]
impl Worksheet for GoogleWorksheet {
    fn title(&self) -> &str {
        &self.title
    }

    #[instrument(skip(self))]
    async fn get_all_records(&self) -> Result<DataFrame> {
        let rows = self.client.get_values(&a1_range(&self.title, None)).await?;
        let df = table::rows_to_dataframe(&rows)?;
        debug!(sheet = %self.title, rows = df.height(), "Read records");
        Ok(df)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.client.clear_values(&a1_range(&self.title, None)).await?;
        debug!(sheet = %self.title, "Cleared worksheet");
        Ok(())
    }

    #[instrument(skip(self, df))]
    async fn set_dataframe(&self, df: &DataFrame, anchor: CellAddress) -> Result<()> {
        let rows = table::dataframe_to_rows(df)?;
        let end = anchor.offset(rows.len(), df.width());
        self.client
            .ensure_grid(self.sheet_id, end.row, end.column)
            .await?;

        self.client
            .update_values(&a1_range(&self.title, Some(anchor)), rows)
            .await?;
        debug!(sheet = %self.title, rows = df.height(), "Wrote records");
        Ok(())
    }
}
