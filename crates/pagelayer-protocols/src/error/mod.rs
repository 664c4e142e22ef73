//! Error types shared across the pagelayer crates.

mod navigator;

pub use navigator::*;
