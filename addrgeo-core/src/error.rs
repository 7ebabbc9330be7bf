use thiserror::Error;

/// A structured field that cannot be coerced into its expected shape.
///
/// The record it belongs to cannot be normalized; the caller decides
/// whether to skip it or to abort the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Invalid house number '{0}'")]
    HouseNumber(String),
    #[error("Invalid house number suffix '{0}'")]
    HouseNumberSuffix(String),
    #[error("Invalid postal code '{0}'")]
    PostalCode(String),
}
