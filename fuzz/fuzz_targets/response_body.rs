#![no_main]

use chat_client_core::ClientError;
use chat_completion_client::ChatCompletion;
use libfuzzer_sys::fuzz_target;

const MAX_INPUT_BYTES: usize = 64 * 1024;

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_INPUT_BYTES {
        return;
    }
    let Ok(body) = std::str::from_utf8(data) else {
        return;
    };

    match ChatCompletion::from_body(body) {
        Ok(completion) => {
            let first_content = completion
                .choices
                .first()
                .and_then(|choice| choice.message.as_ref())
                .and_then(|message| message.content.clone());
            match completion.into_content() {
                Ok(content) => assert_eq!(Some(content), first_content),
                Err(ClientError::UnexpectedShape(_)) => assert!(first_content.is_none()),
                Err(other) => panic!("unexpected error from into_content: {other:?}"),
            }
        }
        Err(ClientError::MalformedResponse(_)) => {
            assert!(serde_json::from_str::<serde_json::Value>(body).is_err());
        }
        Err(ClientError::UnexpectedShape(_)) => {}
        Err(other) => panic!("unexpected error from from_body: {other:?}"),
    }
});
