pub mod client;
pub mod resources;
pub mod types;

pub use chat_client_core::{ClientError, RawResponse, RequestOptions};
pub use client::{Client, ClientConfig, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
pub use types::chat::{ChatCompletion, ChatCompletionRequest, ChatMessage, ChatRole};
