//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur while building fixtures
#[derive(Debug, Error)]
pub enum TestError {
    /// Fixture rows have inconsistent lengths or no rows were given
    #[error("malformed fixture: {0}")]
    MalformedFixture(String),

    /// Unexpected character in an ASCII fixture
    #[error("unexpected character '{ch}' at row {row}, column {col}")]
    UnexpectedChar { ch: char, row: usize, col: usize },

    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] morphotrack_core::Error),
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
