use crate::client::Client;
use crate::types::chat::{ChatCompletion, ChatCompletionRequest, ChatMessage};
use chat_client_core::{ClientError, RequestOptions, send_once};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct ChatResource {
    pub(crate) client: Client,
}

impl ChatResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build the request `complete` sends for `prompt` from the client's
    /// configured model, temperature and system prompt.
    pub fn request_for(&self, prompt: &str) -> ChatCompletionRequest {
        let config = &self.client.config;
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &config.system_prompt {
            messages.push(ChatMessage::system(system.as_str()));
        }
        messages.push(ChatMessage::user(prompt));

        ChatCompletionRequest::builder()
            .model(config.model.as_str())
            .messages(messages)
            .temperature(config.temperature)
            .build()
    }

    /// Send `prompt` as a user message and return `choices[0].message.content`.
    pub async fn complete(&self, prompt: &str) -> Result<String, ClientError> {
        self.complete_with_options(prompt, RequestOptions::default())
            .await
    }

    pub async fn complete_with_options(
        &self,
        prompt: &str,
        options: RequestOptions,
    ) -> Result<String, ClientError> {
        let request = self.request_for(prompt);
        self.create_with_options(&request, options)
            .await?
            .into_content()
    }

    /// Create a Chat Completion
    ///
    /// POST to the configured endpoint, single attempt.
    pub async fn create(&self, request: &ChatCompletionRequest) -> Result<ChatCompletion, ClientError> {
        self.create_with_options(request, RequestOptions::default())
            .await
    }

    /// Create a Chat Completion with custom options
    pub async fn create_with_options(
        &self,
        request: &ChatCompletionRequest,
        options: RequestOptions,
    ) -> Result<ChatCompletion, ClientError> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "creating chat completion"
        );
        let response = send_once(
            &self.client.http_client,
            &self.client.config.url,
            request,
            &options,
        )
        .await?
        .error_for_status()?;

        ChatCompletion::from_slice(&response.body)
    }
}
