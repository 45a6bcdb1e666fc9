//! Gmail API module
//!
//! Wire types, the MIME message codec, and the REST client.

pub mod client;
pub mod mime;
pub mod types;
