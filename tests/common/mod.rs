#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value as JsonValue;
use tempfile::TempDir;
use tower::ServiceExt;

use resume_intake_backend::{
    config::{Config, LogFormat},
    database::MemoryCandidateStore,
    middleware::auth::Claims,
    routes,
    services::{
        document_service::LocalDocumentStore,
        llm_service::{ChatBackend, ChatRequest, LlmError},
        pdf_service::test_pdf,
    },
    AppState,
};

pub const JWT_SECRET: &str = "test_secret_key";

/// Answers extraction and ranking requests with fixed replies. `None` makes
/// the call fail.
#[derive(Default)]
pub struct StubChat {
    pub extraction: Option<JsonValue>,
    pub ranking: Option<JsonValue>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl ChatBackend for StubChat {
    async fn complete_json(&self, request: ChatRequest) -> Result<JsonValue, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = if request.user.starts_with("Job Requirements:") {
            &self.ranking
        } else {
            &self.extraction
        };
        reply
            .clone()
            .ok_or_else(|| LlmError::InvalidResponse("stubbed failure".into()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub chat: Arc<StubChat>,
    pub uploads: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    pub fn new(chat: StubChat) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let uploads = dir.path().join("resumes");
        let config = Config {
            server_address: "127.0.0.1:0".into(),
            database_url: None,
            jwt_secret: JWT_SECRET.into(),
            openai_api_key: "sk-test".into(),
            openai_base_url: "http://localhost".into(),
            openai_model: "gpt-4o-mini".into(),
            llm_timeout: Duration::from_secs(5),
            uploads_dir: uploads.clone(),
            max_upload_bytes: 10 * 1024 * 1024,
            match_candidate_limit: 1000,
            log_format: LogFormat::Text,
        };

        let chat = Arc::new(chat);
        let state = AppState::new(
            &config,
            Arc::new(MemoryCandidateStore::new()),
            Arc::new(LocalDocumentStore::new(&uploads)),
            chat.clone(),
        );

        Self {
            router: routes::router(state),
            chat,
            uploads,
            _dir: dir,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.expect("router response")
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        body: Option<JsonValue>,
    ) -> (StatusCode, JsonValue) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, bearer("hr"));
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let resp = self.send(req).await;
        read_json(resp).await
    }

    pub async fn upload(&self, file_name: &str, data: &[u8]) -> (StatusCode, JsonValue) {
        let (content_type, body) = multipart_body("resume", file_name, data);
        let req = Request::builder()
            .method("POST")
            .uri("/api/resumes/process")
            .header(header::AUTHORIZATION, bearer("hr"))
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .expect("request");

        let resp = self.send(req).await;
        read_json(resp).await
    }

    pub fn stored_files(&self) -> usize {
        count_files(&self.uploads)
    }

    pub fn chat_calls(&self) -> usize {
        self.chat.calls.load(Ordering::SeqCst)
    }
}

pub async fn read_json(resp: Response<Body>) -> (StatusCode, JsonValue) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.expect("body");
    let value = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

pub fn bearer(role: &str) -> String {
    format!("Bearer {}", token(role))
}

pub fn token(role: &str) -> String {
    let claims = Claims {
        sub: "staff-1".into(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        role: Some(role.to_string()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("token")
}

pub fn multipart_body(field: &str, file_name: &str, data: &[u8]) -> (String, Vec<u8>) {
    let boundary = "resume-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// A PDF with one page per entry; `None` pages have no content stream.
pub fn pdf(pages: &[Option<&str>]) -> Vec<u8> {
    test_pdf::build(pages).expect("pdf fixture")
}
