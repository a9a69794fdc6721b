//! Error types for mtcombo_widgets

use mtcombo_surface::SurfaceError;
use thiserror::Error;

/// Errors that can occur while driving the combo widgets
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComboError {
    /// A node or piece of bound data the widget relies on is missing
    #[error("{0} not found")]
    NotFound(&'static str),

    /// An option index outside the bound source
    #[error("option index {index} out of range for {len} options")]
    IndexOutOfRange { index: usize, len: usize },

    /// `fill` was called a second time on the same list
    #[error("expansion list is already filled")]
    AlreadyFilled,

    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),

    /// The rendering surface rejected an operation
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Result type for widget operations
pub type Result<T> = std::result::Result<T, ComboError>;
