//! HTTP-level tests for `GeminiClient` against a mockito server.

use mockito::Matcher;
use serde_json::json;
use sparkle::{AiService, Config, GeminiClient, ImagePayload, ServiceError, Turn};

fn config_for(server: &mockito::ServerGuard) -> Config {
    let mut config = Config::default();
    config.api_base = server.url();
    config.api_key = Some("test-key".into());
    config.request_timeout_secs = Some(5);
    config
}

/// Key the client will actually send; the environment wins over the config file
fn key_matcher(config: &Config) -> Matcher {
    Matcher::UrlEncoded("key".into(), config.get_api_key().unwrap())
}

#[tokio::test]
async fn chat_posts_contents_and_returns_first_candidate() {
    let mut server = mockito::Server::new_async().await;
    let config = config_for(&server);

    let mock = server
        .mock("POST", "/models/gemini-2.0-flash:generateContent")
        .match_query(key_matcher(&config))
        .match_body(Matcher::PartialJson(json!({
            "contents": [
                { "role": "user", "parts": [{ "text": "Tell me a joke." }] },
                { "role": "model", "parts": [{ "text": "Knock knock." }] },
                { "role": "user", "parts": [{ "text": "Who's there?" }] }
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{ "content": { "role": "model", "parts": [{ "text": "Lettuce." }] } }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = GeminiClient::new(&config).unwrap();
    let turns = [
        Turn::user("Tell me a joke."),
        Turn::model("Knock knock."),
        Turn::user("Who's there?"),
    ];
    let text = client.generate_text(&turns).await.unwrap();

    assert_eq!(text, "Lettuce.");
    mock.assert_async().await;
}

#[tokio::test]
async fn empty_candidates_are_malformed() {
    let mut server = mockito::Server::new_async().await;
    let config = config_for(&server);

    let _mock = server
        .mock("POST", "/models/gemini-2.0-flash:generateContent")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates": []}"#)
        .create_async()
        .await;

    let client = GeminiClient::new(&config).unwrap();
    let result = client.generate_text(&[Turn::user("hi")]).await;
    assert!(matches!(result, Err(ServiceError::Malformed(_))));
}

#[tokio::test]
async fn analysis_sends_inline_image_data() {
    let mut server = mockito::Server::new_async().await;
    let config = config_for(&server);

    let mock = server
        .mock("POST", "/models/gemini-2.0-flash:generateContent")
        .match_query(key_matcher(&config))
        .match_body(Matcher::PartialJson(json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": "What is this?" },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "aGk=" } }
                ]
            }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"A cat."}]}}]}"#)
        .create_async()
        .await;

    let client = GeminiClient::new(&config).unwrap();
    let image = ImagePayload::from_base64("image/jpeg", "aGk=");
    let text = client.analyze_image("What is this?", &image).await.unwrap();

    assert_eq!(text, "A cat.");
    mock.assert_async().await;
}

#[tokio::test]
async fn analysis_rejects_non_inline_images_without_a_request() {
    let server = mockito::Server::new_async().await;
    let client = GeminiClient::new(&config_for(&server)).unwrap();

    let result = client
        .analyze_image("What is this?", &ImagePayload::placeholder())
        .await;
    assert!(matches!(result, Err(ServiceError::InvalidImage)));
}

#[tokio::test]
async fn predict_returns_png_data_uri() {
    let mut server = mockito::Server::new_async().await;
    let config = config_for(&server);

    let mock = server
        .mock("POST", "/models/imagen-3.0-generate-002:predict")
        .match_query(key_matcher(&config))
        .match_body(Matcher::Json(json!({
            "instances": { "prompt": "a red bicycle" },
            "parameters": { "sampleCount": 1 }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"predictions":[{"bytesBase64Encoded":"iVBORw0KGgo="}]}"#)
        .create_async()
        .await;

    let client = GeminiClient::new(&config).unwrap();
    let image = client.generate_image("a red bicycle").await.unwrap();

    assert_eq!(image.as_str(), "data:image/png;base64,iVBORw0KGgo=");
    mock.assert_async().await;
}

#[tokio::test]
async fn server_errors_carry_status_and_body() {
    let mut server = mockito::Server::new_async().await;
    let config = config_for(&server);

    let _mock = server
        .mock("POST", "/models/imagen-3.0-generate-002:predict")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal")
        .create_async()
        .await;

    let client = GeminiClient::new(&config).unwrap();
    match client.generate_image("anything").await {
        Err(ServiceError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_body_is_a_transport_error() {
    let mut server = mockito::Server::new_async().await;
    let config = config_for(&server);

    let _mock = server
        .mock("POST", "/models/gemini-2.0-flash:generateContent")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let client = GeminiClient::new(&config).unwrap();
    let result = client.generate_text(&[Turn::user("hi")]).await;
    assert!(matches!(result, Err(ServiceError::Transport(_))));
}

#[tokio::test]
async fn missing_api_key_fails_before_sending() {
    let server = mockito::Server::new_async().await;
    let mut config = config_for(&server);
    config.api_key = None;
    if config.has_api_key() {
        eprintln!("SKIP: an API key is set in the environment");
        return;
    }

    let client = GeminiClient::new(&config).unwrap();
    let result = client.generate_text(&[Turn::user("hi")]).await;
    assert!(matches!(result, Err(ServiceError::MissingApiKey)));
}
