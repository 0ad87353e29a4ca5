use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::adapter::{AppendResult, RowStoreAdapter, TableRef};
use crate::config::FormConfig;
use crate::error::FormError;
use crate::sanitize::{clean, normalize_email};
use crate::store::RowStore;
use crate::validator::{ValidatedFields, validate};
use crate::workbook::CellValue;

pub const SUCCESS_MESSAGE: &str = "Data saved successfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Uniform response to a submission, successful or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_number: Option<usize>,
    /// Time the response was produced, RFC 3339
    pub timestamp: String,
}

impl SubmissionResponse {
    pub fn success(result: &AppendResult) -> Self {
        SubmissionResponse {
            status: Status::Success,
            message: Some(SUCCESS_MESSAGE.to_string()),
            row_number: Some(result.row_number),
            timestamp: now_rfc3339(),
        }
    }

    pub fn error(err: &FormError) -> Self {
        Self::error_message(err.to_string())
    }

    pub fn error_message(message: impl Into<String>) -> Self {
        SubmissionResponse {
            status: Status::Error,
            message: Some(message.into()),
            row_number: None,
            timestamp: now_rfc3339(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// Snapshot of where submissions go and how far the table has grown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupInfo {
    pub store_id: String,
    pub table_name: String,
    pub last_row: usize,
    pub timestamp: String,
}

/// Takes raw form parameters through validation, cleanup and the row store
pub struct SubmissionHandler {
    config: FormConfig,
    adapter: RowStoreAdapter,
}

impl SubmissionHandler {
    pub fn new(config: FormConfig, store: Arc<dyn RowStore>) -> Self {
        SubmissionHandler {
            config,
            adapter: RowStoreAdapter::new(store),
        }
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Handle one submission and wrap the outcome in a response envelope
    ///
    /// Never fails: every error from validation or the store becomes an
    /// error envelope carrying the error's message.
    pub fn handle(&self, raw: &HashMap<String, String>) -> SubmissionResponse {
        info!("received submission with {} parameters", raw.len());

        match self.process(raw) {
            Ok(result) => SubmissionResponse::success(&result),
            Err(e) => {
                error!("submission rejected: {}", e);
                SubmissionResponse::error(&e)
            }
        }
    }

    /// Validate, clean and append a submission
    ///
    /// # Errors
    /// * `FormError::EmptyRequest` if `raw` holds no parameters
    /// * Any validation or store error, unchanged
    pub fn process(&self, raw: &HashMap<String, String>) -> Result<AppendResult, FormError> {
        if raw.is_empty() {
            return Err(FormError::EmptyRequest);
        }

        let fields = validate(raw)?;
        let row = prepare_row(&fields);

        let table = self.open_table()?;
        self.adapter.append_row(&table, &row)
    }

    /// Append a fixed test entry, confirming the store is reachable and writable
    pub fn self_test(&self) -> Result<AppendResult, FormError> {
        let table = self.open_table()?;
        info!("accessed table {}", table.name);

        let fields = ValidatedFields {
            timestamp: now_rfc3339(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: "test@example.com".to_string(),
            phone: "123-456-7890".to_string(),
            company: "Test Company".to_string(),
            subject: "Test Subject".to_string(),
            message: "This is a test message".to_string(),
        };
        let result = self.adapter.append_row(&table, &prepare_row(&fields))?;
        info!("test data added to row {}", result.row_number);
        Ok(result)
    }

    /// Report the configured destination and its current last row
    pub fn setup_info(&self) -> Result<SetupInfo, FormError> {
        let last_row = self
            .adapter
            .last_row(&self.config.store_id, &self.config.table_name)?;

        Ok(SetupInfo {
            store_id: self.config.store_id.clone(),
            table_name: self.config.table_name.clone(),
            last_row,
            timestamp: now_rfc3339(),
        })
    }

    /// All rows of the configured table, header first
    ///
    /// Read-only: a table that was never written to yields no rows.
    pub fn rows(&self) -> Result<Vec<Vec<CellValue>>, FormError> {
        self.adapter
            .read_rows(&self.config.store_id, &self.config.table_name)
    }

    fn open_table(&self) -> Result<TableRef, FormError> {
        self.adapter
            .ensure_table(&self.config.store_id, &self.config.table_name)
    }
}

/// Build the table row for a validated submission, in header order
///
/// First and last name and the message are whitespace-cleaned and
/// truncated; the email is trimmed and lower-cased. Phone, company and
/// subject go in as submitted.
pub fn prepare_row(fields: &ValidatedFields) -> [CellValue; 8] {
    [
        parse_timestamp(&fields.timestamp),
        CellValue::text(clean(Some(&fields.first_name))),
        CellValue::text(clean(Some(&fields.last_name))),
        CellValue::text(normalize_email(&fields.email)),
        CellValue::text(fields.phone.as_str()),
        CellValue::text(fields.company.as_str()),
        CellValue::text(fields.subject.as_str()),
        CellValue::text(clean(Some(&fields.message))),
    ]
}

/// Turn a submitted timestamp into a date cell
///
/// Accepts RFC 3339, a date and time without offset, or a bare date. A date
/// and time without offset is read in the server's local time zone; a bare
/// date is midnight UTC. Anything else, including a local time that falls
/// in a DST gap, is kept as text.
pub fn parse_timestamp(raw: &str) -> CellValue {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return CellValue::Timestamp(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            if let Some(local) = naive.and_local_timezone(Local).earliest() {
                return CellValue::Timestamp(local.with_timezone(&Utc));
            }
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return CellValue::Timestamp(midnight.and_utc());
    }

    CellValue::text(raw)
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
