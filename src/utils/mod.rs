//! Utility modules shared by the generators.

pub mod date;
