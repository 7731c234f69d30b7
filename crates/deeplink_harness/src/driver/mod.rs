//! Driver layer: the convergence navigator and the public fixture facade.

pub mod fixture;
pub mod navigator;
