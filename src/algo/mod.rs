//! Numerical building blocks shared across the crate.

pub mod histogram;
pub mod interp;
pub mod root;
