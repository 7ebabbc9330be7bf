#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # addrgeo-entities
//!
//! Reusable, agnostic domain entities for address geocoding.
//!
//! The entities only contain generic functionality that does not reveal any application-specific business logic.

pub mod address;
pub mod canonical;
pub mod geo;

#[cfg(any(test, feature = "builders"))]
pub mod builders;
