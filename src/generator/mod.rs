//! Build artifact generators.

pub mod search;
