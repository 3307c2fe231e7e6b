use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Highlight error: {0}")]
    Highlight(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Popup error: {0}")]
    Popup(String),
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
        assert!(app_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_display() {
        let err = AppError::Clipboard("denied by session".to_string());
        assert_eq!(err.to_string(), "Clipboard error: denied by session");

        let err = AppError::Highlight("bad grammar state".to_string());
        assert_eq!(err.to_string(), "Highlight error: bad grammar state");

        let err = AppError::Search("unbalanced pattern".to_string());
        assert_eq!(err.to_string(), "Search error: unbalanced pattern");
    }
}
