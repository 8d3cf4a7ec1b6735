//! Persistence layer for assignments and submissions

pub mod assignments;
pub mod submissions;
