#![forbid(unsafe_code)]

//! Core types shared by every Ulriksdal crate: the error type, the algorithm
//! identifier table, and XML namespace / element name constants.

pub mod algorithm;
pub mod error;
pub mod ns;

pub use error::{Error, Result};
