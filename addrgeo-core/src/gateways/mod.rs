pub mod geocode;
pub mod progress;
