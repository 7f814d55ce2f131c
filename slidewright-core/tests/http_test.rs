use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use slidewright_core::{
    router, AppState, ContentGenerator, ContentPart, ContentRequest, ExportSettings,
    GeneratedContent, InMemoryPresentationStore, PresentationStore, SlideGenerator,
    SlidewrightError, SlidewrightResult,
};

struct ScriptedGenerator {
    reply: Option<String>,
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn generate_content(&self, request: &ContentRequest) -> SlidewrightResult<GeneratedContent> {
        if request.want_image {
            return Ok(GeneratedContent {
                parts: vec![ContentPart::inline("image/png", "iVBORw0KGgo=")],
            });
        }
        match &self.reply {
            Some(reply) => Ok(GeneratedContent::from_text(reply.clone())),
            None => Err(SlidewrightError::ApiRequestFailed("upstream unavailable".to_string())),
        }
    }
}

struct TestServer {
    base: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn start(reply: Option<String>) -> Self {
        let generator = SlideGenerator::new(Arc::new(ScriptedGenerator { reply }), "text-model")
            .with_images("image-model");
        let store: Arc<dyn PresentationStore> = Arc::new(InMemoryPresentationStore::new());
        let state = AppState::new(generator, store, ExportSettings::default());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state, true)).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn post_raw(&self, path: &str, body: &'static str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap()
    }
}

fn deck_reply() -> String {
    json!({
        "slides": [
            {"title": "Q3 Sales Overview", "content": "Revenue up 12%", "imagePrompt": "chart"},
            {"title": "Regions", "content": "EMEA\nAPAC"},
            {"title": "Next Steps", "content": "Hire"}
        ],
        "message": "Here is your quarterly sales report."
    })
    .to_string()
}

mod generate_tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_slides() {
        let server = TestServer::start(Some(deck_reply())).await;

        let response = server
            .client
            .post(server.url("/api/generate-slides"))
            .json(&json!({"prompt": "quarterly sales report", "slideCount": 3}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: Value = response.json().await.unwrap();
        let slides = body["slides"].as_array().unwrap();
        assert_eq!(slides.len(), 3);
        assert_eq!(body["message"], "Here is your quarterly sales report.");
        assert_eq!(slides[0]["imageUrl"], "data:image/png;base64,iVBORw0KGgo=");
        assert!(slides[1].get("imageUrl").is_none());
    }

    #[tokio::test]
    async fn test_generate_failure_shape() {
        let server = TestServer::start(Some("no json here".to_string())).await;

        let response = server
            .client
            .post(server.url("/api/generate-slides"))
            .json(&json!({"prompt": "anything"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 500);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Failed to generate slides");
        assert_eq!(body["message"], "No JSON object found in response");
    }

    #[tokio::test]
    async fn test_upstream_failure() {
        let server = TestServer::start(None).await;

        let response = server
            .client
            .post(server.url("/api/generate-slides"))
            .json(&json!({"prompt": "anything"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Failed to generate slides");
        assert!(body["message"].as_str().unwrap().contains("upstream unavailable"));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = TestServer::start(Some(deck_reply())).await;
        let response = server.post_raw("/api/generate-slides", "{not json").await;
        assert_eq!(response.status(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Failed to generate slides");
    }
}

mod export_tests {
    use super::*;

    #[tokio::test]
    async fn test_download_ppt() {
        let server = TestServer::start(None).await;

        let response = server
            .client
            .post(server.url("/api/download-ppt"))
            .json(&json!({"slides": [{"title": "One", "content": "Body"}]}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["content-type"],
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        );
        assert_eq!(
            response.headers()["content-disposition"],
            "attachment; filename=\"presentation.pptx\""
        );

        let bytes = response.bytes().await.unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn test_download_ppt_requires_slides() {
        let server = TestServer::start(None).await;
        let response = server.post_raw("/api/download-ppt", "{}").await;
        assert_eq!(response.status(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Failed to generate PPT");
    }

    #[tokio::test]
    async fn test_export_json() {
        let server = TestServer::start(None).await;

        let response = server
            .client
            .post(server.url("/api/export-json"))
            .json(&json!({
                "presentationName": "Board deck",
                "messages": [{"id": "1", "role": "user", "content": "hi", "timestamp": "2025-03-14T09:00:00Z"}],
                "slides": [{"title": "A", "content": "B"}]
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["content-disposition"],
            "attachment; filename=\"Board deck.json\""
        );

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["name"], "Board deck");
        assert_eq!(body["messages"][0]["content"], "hi");
        assert_eq!(body["slides"][0]["title"], "A");
        assert!(body["exportedAt"].is_string());
    }

    fn large_image_deck() -> Value {
        let pixels = base64::engine::general_purpose::STANDARD.encode(vec![0u8; 800 * 1024]);
        let slides: Vec<Value> = (1..=3)
            .map(|i| {
                json!({
                    "title": format!("Slide {}", i),
                    "content": "Body",
                    "imageUrl": format!("data:image/png;base64,{}", pixels)
                })
            })
            .collect();
        json!({ "slides": slides, "messages": [] })
    }

    #[tokio::test]
    async fn test_large_decks_are_accepted() {
        let server = TestServer::start(None).await;
        let deck = large_image_deck();
        assert!(deck.to_string().len() > 3 * 1024 * 1024);

        let response = server
            .client
            .post(server.url("/api/download-ppt"))
            .json(&deck)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let bytes = response.bytes().await.unwrap();
        assert_eq!(&bytes[..2], b"PK");

        let response = server
            .client
            .post(server.url("/api/export-json"))
            .json(&deck)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["slides"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_export_json_requires_messages() {
        let server = TestServer::start(None).await;
        let response = server.post_raw("/api/export-json", r#"{"slides": []}"#).await;
        assert_eq!(response.status(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Failed to export JSON");
    }

    #[tokio::test]
    async fn test_export_chat() {
        let server = TestServer::start(None).await;

        let response = server
            .client
            .post(server.url("/api/export-chat"))
            .json(&json!({
                "messages": [
                    {"id": "1", "role": "user", "content": "make slides", "timestamp": "2025-03-14T09:00:00Z"},
                    {"id": "2", "role": "assistant", "content": "done", "timestamp": "2025-03-14T09:01:00Z"}
                ]
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["content-disposition"],
            "attachment; filename=\"Untitled Presentation-chat.txt\""
        );

        let text = response.text().await.unwrap();
        assert!(text.starts_with("Chat History - Untitled Presentation\n"));
        assert!(text.contains("[2025-03-14 09:00:00 UTC] You:\nmake slides\n"));
        assert!(text.contains("\n---\n\n[2025-03-14 09:01:00 UTC] AI:\ndone\n"));
    }

    #[tokio::test]
    async fn test_export_chat_malformed() {
        let server = TestServer::start(None).await;
        let response = server.post_raw("/api/export-chat", "[]").await;
        assert_eq!(response.status(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Failed to export chat");
    }
}

mod presentation_tests {
    use super::*;

    #[tokio::test]
    async fn test_crud_cycle() {
        let server = TestServer::start(None).await;

        let created = server
            .client
            .post(server.url("/api/presentations"))
            .json(&json!({"name": "Draft", "slides": [{"title": "A", "content": "B"}]}))
            .send()
            .await
            .unwrap();
        assert_eq!(created.status(), 201);
        let created: Value = created.json().await.unwrap();
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["name"], "Draft");

        let list: Value = server
            .client
            .get(server.url("/api/presentations"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(list.as_array().unwrap().len(), 1);

        let updated = server
            .client
            .put(server.url(&format!("/api/presentations/{}", id)))
            .json(&json!({"name": "Final"}))
            .send()
            .await
            .unwrap();
        assert_eq!(updated.status(), 200);
        let updated: Value = updated.json().await.unwrap();
        assert_eq!(updated["name"], "Final");
        assert_eq!(updated["createdAt"], created["createdAt"]);
        assert_eq!(updated["slides"], created["slides"]);

        let fetched: Value = server
            .client
            .get(server.url(&format!("/api/presentations/{}", id)))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(fetched["name"], "Final");

        let deleted = server
            .client
            .delete(server.url(&format!("/api/presentations/{}", id)))
            .send()
            .await
            .unwrap();
        assert_eq!(deleted.status(), 200);

        let missing = server
            .client
            .get(server.url(&format!("/api/presentations/{}", id)))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status(), 404);
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let server = TestServer::start(None).await;

        let put = server
            .client
            .put(server.url("/api/presentations/ghost"))
            .json(&json!({"name": "x"}))
            .send()
            .await
            .unwrap();
        assert_eq!(put.status(), 404);

        let delete = server
            .client
            .delete(server.url("/api/presentations/ghost"))
            .send()
            .await
            .unwrap();
        assert_eq!(delete.status(), 404);
        let body: Value = delete.json().await.unwrap();
        assert_eq!(body["error"], "Presentation not found");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_body() {
        let server = TestServer::start(None).await;
        let response = server.post_raw("/api/presentations", "nope").await;
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_health_and_cors() {
        let server = TestServer::start(None).await;

        let response = server
            .client
            .get(server.url("/api/health"))
            .header("origin", "http://localhost:3000")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["status"], "ok");
    }
}
