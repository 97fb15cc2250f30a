//! RxNorm identifier lookup.
//!
//! [`RxNavClient`] queries the NLM RxNav service for the RxCUI of a drug
//! name. [`CachedLookup`] wraps any [`IdentifierLookup`] with a JSON cache
//! keyed by normalized name and paces remote calls.

#![deny(unsafe_code)]

pub mod cache;
pub mod client;
pub mod error;

pub use cache::{CachedLookup, REQUEST_DELAY, assign_identifiers};
pub use client::{IdentifierLookup, RXNAV_RXCUI_URL, RxNavClient};
pub use error::{LookupError, Result};
