//! Domain model and typed errors for the fixture driver.

pub mod errors;
pub mod model;
