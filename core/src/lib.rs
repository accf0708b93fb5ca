//! Shared plumbing for the chat completion client: the error type and the
//! single-attempt HTTP exchange.

pub mod error;
pub mod http;

pub use error::ClientError;
pub use http::{RawResponse, RequestOptions, send_once};
