use thiserror::Error;

/// Errors that can occur while extracting a recipe from a web page
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Transport failure: DNS, connection, timeout or body read
    #[error("Failed to fetch URL: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("Failed to fetch URL: {url} returned status {status}")]
    Status { status: u16, url: String },

    /// A configured selector could not be compiled
    #[error("Failed to parse selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl ExtractError {
    /// Network, transport or non-2xx response
    pub fn is_fetch(&self) -> bool {
        matches!(self, ExtractError::Fetch(_) | ExtractError::Status { .. })
    }

    /// Anything that went wrong after the page was retrieved
    pub fn is_parse(&self) -> bool {
        matches!(self, ExtractError::InvalidSelector { .. })
    }
}

/// Errors raised by the recipe store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Another recipe already uses this URL
    #[error("A recipe with URL {0} already exists")]
    DuplicateUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_fetch_error() {
        let err = ExtractError::Status {
            status: 404,
            url: "https://example.com/missing".to_string(),
        };
        assert!(err.is_fetch());
        assert!(!err.is_parse());
        assert_eq!(
            err.to_string(),
            "Failed to fetch URL: https://example.com/missing returned status 404"
        );
    }

    #[test]
    fn test_invalid_selector_is_parse_error() {
        let err = ExtractError::InvalidSelector {
            selector: "div[".to_string(),
            reason: "unexpected end of input".to_string(),
        };
        assert!(err.is_parse());
        assert!(!err.is_fetch());
    }
}
