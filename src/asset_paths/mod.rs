//! Helpers for classifying asset references and naming cache entries.
//!
//! Classification and cache naming are pure functions over strings so that the resolver
//! and the fetcher agree on them without sharing any state.

mod cache_key;
mod filters;

pub use cache_key::{CACHE_KEY_LEN, cache_key};
pub use filters::{has_expected_extension, is_remote_reference, is_well_formed_url};
