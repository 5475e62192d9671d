use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KdIndexError {
    /// The queried point is not stored in the tree.
    #[error("Point not found in tree")]
    NotFound,

    /// An argument was outside of its allowed range, such as `k == 0`.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A nearest-neighbor query was made against a tree without any points.
    #[error("Cannot search an empty tree")]
    EmptyIndex,
}

pub type Result<T> = std::result::Result<T, KdIndexError>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            KdIndexError::NotFound.to_string(),
            "Point not found in tree"
        );
        assert_eq!(
            KdIndexError::InvalidArgument("k must be at least 1".to_string()).to_string(),
            "Invalid argument: k must be at least 1"
        );
        assert_eq!(
            KdIndexError::EmptyIndex.to_string(),
            "Cannot search an empty tree"
        );
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: std::error::Error + Send + Sync>() {}
        assert_impl::<KdIndexError>();
    }
}
