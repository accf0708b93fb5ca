use chat_client_core::ClientError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

// ─── Request Types ───────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize, bon::Builder)]
pub struct ChatCompletionRequest {
    #[builder(into)]
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

// ─── Message Types ───────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

// ─── Response Types ──────────────────────────────────────────────

/// Decoded body of a successful chat completion.
///
/// Only `choices` has to be an array. Every other field is optional and
/// becomes `None` when absent or of an unexpected type, so a response that
/// carries `choices[0].message.content` is never rejected over fields the
/// caller does not read.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub model: Option<String>,
    #[serde(deserialize_with = "lenient_choices")]
    pub choices: Vec<Choice>,
    #[serde(default, deserialize_with = "lenient")]
    pub usage: Option<Usage>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default, deserialize_with = "lenient")]
    pub index: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<ResponseMessage>,
    #[serde(default, deserialize_with = "lenient")]
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Usage {
    #[serde(default, deserialize_with = "lenient")]
    pub prompt_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub completion_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_tokens: Option<u64>,
}

/// Decodes a field as `T`, or `None` when the value has another type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Requires an array; elements that are not choice objects decode as empty choices.
fn lenient_choices<'de, D>(deserializer: D) -> Result<Vec<Choice>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

impl ChatCompletion {
    /// Decode a 200 response body from raw bytes.
    ///
    /// Bytes that are not UTF-8 are `MalformedResponse`, like any other body
    /// that is not JSON.
    pub fn from_slice(body: &[u8]) -> Result<Self, ClientError> {
        let text = std::str::from_utf8(body)
            .map_err(|e| ClientError::MalformedResponse(format!("body is not UTF-8: {}", e)))?;
        Self::from_body(text)
    }

    /// Decode a 200 response body.
    ///
    /// Invalid JSON is `MalformedResponse`; valid JSON without a `choices`
    /// array is `UnexpectedShape`.
    pub fn from_body(body: &str) -> Result<Self, ClientError> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
        serde_json::from_value(value).map_err(|e| ClientError::UnexpectedShape(e.to_string()))
    }

    /// `choices[0].message.content`, returned exactly as received.
    pub fn into_content(self) -> Result<String, ClientError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::UnexpectedShape("response contained no choices".to_string()))?;
        choice
            .message
            .ok_or_else(|| {
                ClientError::UnexpectedShape("choices[0].message is missing or not an object".to_string())
            })?
            .content
            .ok_or_else(|| {
                ClientError::UnexpectedShape("choices[0].message.content is missing or not a string".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_user_message() {
        let request = ChatCompletionRequest::builder()
            .model("gemini-1.5-flash-latest")
            .messages(vec![ChatMessage::user("Hello")])
            .temperature(0.7)
            .build();

        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&request).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "gemini-1.5-flash-latest",
                "messages": [{"role": "user", "content": "Hello"}],
                "temperature": 0.7
            })
        );
    }

    #[test]
    fn test_request_omits_missing_temperature() {
        let request = ChatCompletionRequest::builder()
            .model("m")
            .messages(vec![ChatMessage::system("be brief"), ChatMessage::user("hi")])
            .build();

        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&request).unwrap()).unwrap();
        assert!(value.get("temperature").is_none());
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
    }

    #[test]
    fn test_from_body_ignores_unknown_fields() {
        let body = json!({
            "id": "chatcmpl-abc",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "gemini-1.5-flash-latest",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "hi"},
                "logprobs": null,
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        })
        .to_string();

        let completion = ChatCompletion::from_body(&body).unwrap();
        assert_eq!(completion.id.as_deref(), Some("chatcmpl-abc"));
        assert_eq!(completion.choices[0].finish_reason.as_deref(), Some("stop"));
        assert_eq!(completion.usage.as_ref().unwrap().total_tokens, Some(4));
        assert_eq!(completion.into_content().unwrap(), "hi");
    }

    #[test]
    fn test_from_body_rejects_invalid_json() {
        let err = ChatCompletion::from_body("not json").unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(_)));
    }

    #[test]
    fn test_empty_choices_is_unexpected_shape() {
        let completion = ChatCompletion::from_body(r#"{"choices": []}"#).unwrap();
        let err = completion.into_content().unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedShape(_)));
    }

    #[test]
    fn test_mistyped_fields_are_unexpected_shape() {
        for body in [
            "null",
            "[]",
            r#"{}"#,
            r#"{"choices": {}}"#,
            r#"{"choices": [{}]}"#,
            r#"{"choices": [{"message": {"role": "assistant"}}]}"#,
            r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
            r#"{"choices": [{"message": {"role": "assistant", "content": 42}}]}"#,
            r#"{"choices": [{"message": "hi"}]}"#,
            r#"{"choices": [7]}"#,
        ] {
            let err = ChatCompletion::from_body(body)
                .and_then(ChatCompletion::into_content)
                .unwrap_err();
            assert!(
                matches!(err, ClientError::UnexpectedShape(_)),
                "body {} gave {:?}",
                body,
                err
            );
        }
    }

    #[test]
    fn test_content_is_not_trimmed() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "  two\nlines \n"}}]}"#;
        let content = ChatCompletion::from_body(body).unwrap().into_content().unwrap();
        assert_eq!(content, "  two\nlines \n");
    }

    fn content_of(body: serde_json::Value) -> Result<String, ClientError> {
        ChatCompletion::from_body(&body.to_string()).and_then(ChatCompletion::into_content)
    }

    #[test]
    fn test_missing_role_is_ignored() {
        let body = json!({"choices": [{"message": {"content": "hi"}}]});
        assert_eq!(content_of(body).unwrap(), "hi");
    }

    #[test]
    fn test_later_choice_without_content_is_ignored() {
        let body = json!({
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "hi"}},
                {"index": 1, "message": {"role": "assistant"}, "finish_reason": "content_filter"},
                "not even an object"
            ]
        });
        assert_eq!(content_of(body).unwrap(), "hi");
    }

    #[test]
    fn test_mistyped_id_is_ignored() {
        let body = json!({"id": 42, "choices": [{"message": {"role": "assistant", "content": "hi"}}]});
        assert_eq!(content_of(body).unwrap(), "hi");
    }

    #[test]
    fn test_large_usage_counts_are_accepted() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "hi"}}],
            "usage": {"prompt_tokens": 5_000_000_000u64, "completion_tokens": "n/a"}
        });
        let completion = ChatCompletion::from_body(&body.to_string()).unwrap();
        let usage = completion.usage.clone().unwrap();
        assert_eq!(usage.prompt_tokens, Some(5_000_000_000));
        assert_eq!(usage.completion_tokens, None);
        assert_eq!(completion.into_content().unwrap(), "hi");
    }

    #[test]
    fn test_negative_index_is_accepted() {
        let body = json!({"choices": [{"index": -1, "message": {"role": "assistant", "content": "hi"}}]});
        assert_eq!(content_of(body).unwrap(), "hi");
    }

    #[test]
    fn test_from_slice_rejects_invalid_utf8() {
        let body = b"{\"choices\":[{\"message\":{\"content\":\"a\xFFb\"}}]}";
        let err = ChatCompletion::from_slice(body).unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(_)), "got {:?}", err);

        let ok = br#"{"choices":[{"message":{"content":"hi"}}]}"#;
        assert_eq!(ChatCompletion::from_slice(ok).unwrap().into_content().unwrap(), "hi");
    }
}
