//! Sensor data loading.

pub mod loader;

pub use loader::{load, Dataset};
