//! Download remote assets into a content-addressed cache directory.

mod cache;
mod transport;

pub use cache::ModelCache;
pub use transport::{HttpTransport, Transport};
