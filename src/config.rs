use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Store id shipped in the default configuration; it must be replaced
pub const PLACEHOLDER_STORE_ID: &str = "YOUR_SHEET_ID";

pub const DEFAULT_TABLE_NAME: &str = "Sheet1";

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Settings for the submission handler and the server around it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    /// Workbook the submissions go to
    pub store_id: String,
    /// Table inside the workbook
    pub table_name: String,
    /// Directory for file-backed workbooks; `None` keeps them in memory
    pub data_dir: Option<PathBuf>,
    /// Address the HTTP server listens on
    pub addr: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        FormConfig {
            store_id: PLACEHOLDER_STORE_ID.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            data_dir: None,
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

impl FormConfig {
    pub fn new(store_id: &str, table_name: &str) -> Self {
        FormConfig {
            store_id: store_id.to_string(),
            table_name: table_name.to_string(),
            ..FormConfig::default()
        }
    }

    /// Build a configuration from `FORMSHEET_*` environment variables
    ///
    /// * `FORMSHEET_STORE_ID` - workbook id
    /// * `FORMSHEET_TABLE` - table name
    /// * `FORMSHEET_DATA_DIR` - directory for file-backed workbooks
    /// * `FORMSHEET_ADDR` - listen address
    ///
    /// Unset or empty variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = FormConfig::default();

        FormConfig {
            store_id: var("FORMSHEET_STORE_ID").unwrap_or(defaults.store_id),
            table_name: var("FORMSHEET_TABLE").unwrap_or(defaults.table_name),
            data_dir: var("FORMSHEET_DATA_DIR").map(PathBuf::from),
            addr: var("FORMSHEET_ADDR").unwrap_or(defaults.addr),
        }
    }

    /// Whether the store id has been set to something other than the placeholder
    pub fn is_configured(&self) -> bool {
        let id = self.store_id.trim();
        !id.is_empty() && id != PLACEHOLDER_STORE_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_unconfigured() {
        let config = FormConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.table_name, "Sheet1");
    }

    #[test]
    fn reads_overrides_and_ignores_blank_values() {
        let vars: HashMap<&str, &str> = [
            ("FORMSHEET_STORE_ID", "contact-book"),
            ("FORMSHEET_TABLE", " "),
            ("FORMSHEET_DATA_DIR", "/var/lib/formsheet"),
        ]
        .into_iter()
        .collect();

        let config = FormConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert!(config.is_configured());
        assert_eq!(config.store_id, "contact-book");
        assert_eq!(config.table_name, DEFAULT_TABLE_NAME);
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/formsheet")));
        assert_eq!(config.addr, DEFAULT_ADDR);
    }
}
