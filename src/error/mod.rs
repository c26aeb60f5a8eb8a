use crate::config::ConfigError;
use crate::session::SessionError;
use crate::storage::StoreError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DocumentId;

    #[test]
    fn store_errors_convert_and_keep_their_message() {
        let err: AppError = StoreError::NotFound(DocumentId::new("abc")).into();
        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(err.to_string(), "document abc not found");
    }

    #[test]
    fn question_mark_lifts_session_errors() {
        fn open() -> AppResult<()> {
            Err(SessionError::DocumentNotFound(DocumentId::new("gone")))?;
            Ok(())
        }
        assert!(matches!(open(), Err(AppError::Session(_))));
    }
}
