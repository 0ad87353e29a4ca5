use thiserror::Error;

/// Everything that can go wrong while taking in a submission
///
/// The handler never lets one of these escape; each is rendered into the
/// error envelope through its `Display` text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// The request carried no parameters at all
    #[error("No form data received")]
    EmptyRequest,

    /// One or more required fields were missing or blank, in field order
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// The email did not have a `local@domain.tld` shape
    #[error("Invalid email format")]
    InvalidEmail,

    /// The backing store or table could not be opened
    #[error("Cannot access store: {0}")]
    StoreUnavailable(String),

    /// The row write itself failed
    #[error("Failed to add data to sheet: {0}")]
    AppendFailed(String),
}
