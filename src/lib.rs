/*!
# Form Intake

A small service that takes contact-form submissions and appends them as
rows to a spreadsheet-like table, plus an elapsed-time counter.

## Overview

A submission is a set of key-value form fields. It is validated (required
fields, email shape), cleaned (whitespace collapsed, length capped, email
lower-cased) and written as one row in a table whose header row is created
on first use. Whatever happens, the caller gets back a uniform JSON
envelope: `{status, message, rowNumber, timestamp}`.

## Architecture

### Submission path
- **Text Sanitizer** (`sanitize`) - trims, collapses whitespace, truncates
- **Form Validator** (`validator`) - required fields and email format
- **Row Store Adapter** (`adapter`) - get-or-create table, header row, append
- **Submission Handler** (`handler`) - runs the steps above, builds the envelope

### Storage
- `store::RowStore` - the narrow interface to the backing store
- In-memory and file-backed implementations; the file store keeps one
  gzip-compressed bincode workbook per store id

### Web layer (feature `web`)
- `/` - status page (GET) and submissions (POST, form-urlencoded or query)
- `/info` - configured destination and last row
- `/export.csv`, `/export.xlsx` - table download

### Counter
- `elapsed` - renders `DDd HHh MMm SSs` since a fixed launch instant, once
  per second

## Configuration

`FORMSHEET_STORE_ID`, `FORMSHEET_TABLE`, `FORMSHEET_DATA_DIR` and
`FORMSHEET_ADDR` environment variables, read into `config::FormConfig`.
*/

pub mod adapter;
pub mod config;
pub mod downloader;
pub mod elapsed;
pub mod error;
pub mod handler;
pub mod sanitize;
pub mod saving;
pub mod store;
pub mod validator;
pub mod workbook;

#[cfg(feature = "web")]
pub mod app;

pub use adapter::*;
pub use config::*;
pub use error::*;
pub use handler::*;
pub use store::*;
pub use workbook::*;
