//! Terminal output

pub mod replay;
pub mod table;
