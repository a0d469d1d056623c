use llm::{LlmClient, ScriptedClient};
use review::{PersonaProfile, Registry};
use review_server::router;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

fn applejack() -> PersonaProfile {
    PersonaProfile {
        name: "Applejack".into(),
        description: "Hardworking, honest, plainspoken farmpony.".into(),
        quotes: vec!["Ah reckon...".into(), "That's just plain wrong.".into()],
    }
}

async fn spawn(client: Arc<dyn LlmClient>) -> SocketAddr {
    let registry = Registry::build(vec![applejack()], client).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(Arc::new(registry));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn completion_request(model: &str, stream: bool) -> Value {
    json!({
        "model": model,
        "stream": stream,
        "messages": [
            { "role": "user", "content": "Starswirl loses his hat at the market." },
            { "role": "user", "content": "A filly returns it by sundown." }
        ]
    })
}

#[tokio::test]
async fn completion_returns_the_formatted_review() {
    let scripted = Arc::new(ScriptedClient::replying(vec![
        "```markdown\nAn honest tale of lost and found.\n```",
        "```markdown\nAn honest tale, everypony, of lost and found.\n```",
        "```html\n<p>An honest tale, <b>everypony</b>, of lost and found.</p>\n```",
    ]));
    let addr = spawn(scripted.clone()).await;

    let res = reqwest::Client::new()
        .post(format!("http://{addr}/v1/chat/completions"))
        .json(&completion_request("Applejack", false))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(body["model"], "Applejack");
    assert_eq!(body["choices"][0]["message"]["role"], "assistant");
    assert_eq!(
        body["choices"][0]["message"]["content"],
        "<p>An honest tale, <b>everypony</b>, of lost and found.</p>"
    );
    assert_eq!(body["choices"][0]["finish_reason"], "stop");

    // Both user messages reach the pipeline as one story.
    let first_prompt = &scripted.prompts()[0];
    assert!(first_prompt.contains("Starswirl loses his hat at the market."));
    assert!(first_prompt.contains("A filly returns it by sundown."));
}

#[tokio::test]
async fn unknown_model_is_a_client_error() {
    let addr = spawn(Arc::new(ScriptedClient::replying(vec![]))).await;

    let res = reqwest::Client::new()
        .post(format!("http://{addr}/v1/chat/completions"))
        .json(&completion_request("NoSuchPony", false))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert_eq!(body["error"]["code"], "model_not_found");
}

#[tokio::test]
async fn pipeline_failure_leaks_nothing_to_the_caller() {
    // The draft succeeds, then the refine stage burns its whole budget on
    // wrong-type replies.
    let addr = spawn(Arc::new(ScriptedClient::replying(vec![
        "```markdown\nsecret draft text\n```",
        "```html\n<p>wrong</p>\n```",
        "```html\n<p>wrong</p>\n```",
        "```html\n<p>wrong</p>\n```",
    ])))
    .await;

    let res = reqwest::Client::new()
        .post(format!("http://{addr}/v1/chat/completions"))
        .json(&completion_request("Applejack", false))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);

    let text = res.text().await.unwrap();
    assert!(!text.contains("secret draft text"));
    assert!(!text.contains("<p>wrong</p>"));
}

#[tokio::test]
async fn models_endpoint_lists_registered_personas() {
    let addr = spawn(Arc::new(ScriptedClient::replying(vec![]))).await;

    let res = reqwest::get(format!("http://{addr}/v1/models")).await.unwrap();
    assert_eq!(res.status(), 200);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["object"], "list");
    assert_eq!(body["data"][0]["id"], "Applejack");
    assert_eq!(body["data"][0]["object"], "model");
}

#[tokio::test]
async fn streamed_completion_ends_with_done_marker() {
    let addr = spawn(Arc::new(ScriptedClient::replying(vec![
        "```markdown\ndraft\n```",
        "```markdown\nrefined\n```",
        "```html\n<p>the whole review</p>\n```",
    ])))
    .await;

    let res = reqwest::Client::new()
        .post(format!("http://{addr}/v1/chat/completions"))
        .json(&completion_request("Applejack", true))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let text = res.text().await.unwrap();
    assert!(text.contains("chat.completion.chunk"));
    assert!(text.contains("<p>the whole review</p>"));
    let done = text.rfind("data: [DONE]").unwrap();
    assert!(done > text.rfind("finish_reason").unwrap());
}
