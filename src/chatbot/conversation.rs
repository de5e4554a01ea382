//! One conversational turn: store, build context, complete, store the reply.

use log::debug;

use crate::bot::Data;
use crate::error::Result;
use crate::types::{ChatKey, MessageRole, UserKey};

use super::context::build_completion_messages;

/// Record `text` from the user, ask their model for a reply and record it.
///
/// On failure the user's message stays in history and no reply is stored.
pub async fn generate_reply(
    data: &Data,
    chat_id: ChatKey,
    user_id: UserKey,
    text: &str,
) -> Result<String> {
    let model_key = data.preferences().read().await.user_model(user_id).to_string();

    let messages = {
        let mut conversations = data.conversations().write().await;
        conversations.add_message(chat_id, MessageRole::User, text);
        let history = conversations.context(chat_id, data.context_window());
        build_completion_messages(data.system_prompt(), history)
    };
    debug!(
        "Chat {chat_id}: sending {} messages to '{model_key}'",
        messages.len()
    );

    let reply = data
        .completion_client()
        .generate_response(&messages, &model_key)
        .await?;

    data.conversations()
        .write()
        .await
        .add_message(chat_id, MessageRole::Assistant, reply.as_str());

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::completion::CompletionClient;
    use crate::error::{BotError, CompletionError};
    use crate::models::ModelRegistry;

    const MINI_ENDPOINT: &str =
        "accounts/sentientfoundation-serverless/models/dobby-mini-unhinged-plus-llama-3-1-8b";

    fn data_for(server: &MockServer, context_window: usize) -> Data {
        let registry = Arc::new(ModelRegistry::builtin());
        let base = Url::parse(&server.uri()).expect("valid mock url");
        let client = CompletionClient::new("key".to_string(), &base, Arc::clone(&registry))
            .expect("client should build");
        Data::new(registry, client, "Be Dobby.".to_string(), context_window)
    }

    fn reply_with(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": content}}]
        }))
    }

    #[tokio::test]
    async fn reply_is_stored_after_user_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply_with("hello"))
            .mount(&server)
            .await;

        let data = data_for(&server, 10);
        let reply = generate_reply(&data, 42, 7, "hi").await.expect("reply");
        assert_eq!(reply, "hello");

        let context = data.conversations().read().await.context(42, 10);
        let stored: Vec<(MessageRole, &str)> = context
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            stored,
            [(MessageRole::User, "hi"), (MessageRole::Assistant, "hello")]
        );
    }

    #[tokio::test]
    async fn uses_the_users_model_and_system_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "model": MINI_ENDPOINT,
                "messages": [
                    {"role": "system", "content": "Be Dobby."},
                    {"role": "user", "content": "hi"}
                ]
            })))
            .respond_with(reply_with("hey"))
            .expect(1)
            .mount(&server)
            .await;

        let data = data_for(&server, 10);
        assert!(data.preferences().write().await.set_user_model(7, "dobby-mini"));
        generate_reply(&data, 1, 7, "hi").await.expect("reply");
    }

    #[tokio::test]
    async fn context_window_bounds_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply_with("ok"))
            .mount(&server)
            .await;

        let data = data_for(&server, 3);
        for i in 0..4 {
            generate_reply(&data, 5, 1, &format!("q{i}")).await.expect("reply");
        }

        let requests = server.received_requests().await.expect("recording enabled");
        let last: serde_json::Value = requests[3].body_json().expect("json body");
        let contents: Vec<&str> = last["messages"]
            .as_array()
            .expect("messages array")
            .iter()
            .filter_map(|m| m["content"].as_str())
            .collect();
        assert_eq!(contents, ["Be Dobby.", "q2", "ok", "q3"]);
    }

    #[tokio::test]
    async fn failed_generation_keeps_only_the_user_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let data = data_for(&server, 10);
        let err = generate_reply(&data, 9, 1, "hi")
            .await
            .expect_err("empty choices must fail");
        assert!(matches!(
            err,
            BotError::Generation(CompletionError::EmptyResponse)
        ));
        assert_eq!(data.conversations().read().await.stats(9).total_messages, 1);
    }
}
