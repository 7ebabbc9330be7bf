//! # addrgeo-core
//!
//! Address normalization and the rate-limited, degrading geocoding
//! resolution built on top of it.

pub mod gateways;
pub mod normalize;
pub mod resolve;
pub mod usecases;

mod error;

pub use self::error::FormatError;

pub mod entities {
    pub use addrgeo_entities::{address::*, canonical::*, geo::*};
}
