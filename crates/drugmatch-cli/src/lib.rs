//! Library components of the drugmatch command-line tool.

pub mod logging;
pub mod summary;
