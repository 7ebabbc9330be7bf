mod geocode_addresses;
mod merge_addresses;

#[cfg(test)]
pub mod tests;

pub use self::{geocode_addresses::*, merge_addresses::*};
