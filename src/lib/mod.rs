//! Implementations that are useful accross the whole project
//!
//! Amount normalization, field state and the forms that consume amounts

pub mod amount;
pub mod field;
pub mod flow;
