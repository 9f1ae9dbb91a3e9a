mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;

use common::{bearer, read_json, StubChat, TestApp};

fn extraction_reply() -> serde_json::Value {
    json!({
        "name": "Jane Doe",
        "email": null,
        "phone": null,
        "skills": ["Audit", "Excel"],
        "experience": "Five years in external audit",
        "experience_level": "Mid",
        "education": "BSc Accounting",
        "certifications": ["CIMA"],
        "industry": "Finance",
        "age": 29
    })
}

#[tokio::test]
async fn health_is_public_and_api_needs_staff_token() {
    let app = TestApp::new(StubChat::default());

    let resp = app
        .send(Request::get("/health").body(Body::empty()).unwrap())
        .await;
    let (status, body) = read_json(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let resp = app
        .send(Request::get("/api/candidates").body(Body::empty()).unwrap())
        .await;
    let (status, body) = read_json(resp).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_authorization");

    let resp = app
        .send(
            Request::get("/api/candidates")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .send(
            Request::get("/api/candidates")
                .header(header::AUTHORIZATION, bearer("candidate"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    let (status, body) = read_json(resp).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let resp = app
        .send(
            Request::get("/api/candidates")
                .header(header::AUTHORIZATION, bearer("admin"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn non_pdf_uploads_are_rejected_before_storage() {
    let app = TestApp::new(StubChat::default());

    let (status, body) = app.upload("resume.docx", b"PK\x03\x04 word file").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app.upload("resume.pdf", b"definitely not a pdf").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.stored_files(), 0);
    assert_eq!(app.chat_calls(), 0);
}

#[tokio::test]
async fn upload_without_resume_field_is_a_bad_request() {
    let app = TestApp::new(StubChat::default());
    let (content_type, body) = common::multipart_body("attachment", "cv.pdf", b"%PDF-1.4");

    let resp = app
        .send(
            Request::post("/api/resumes/process")
                .header(header::AUTHORIZATION, bearer("hr"))
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await;
    let (status, body) = read_json(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file part");
}

#[tokio::test]
async fn textless_pdf_is_unprocessable_and_not_kept() {
    let app = TestApp::new(StubChat {
        extraction: Some(extraction_reply()),
        ..Default::default()
    });

    let (status, body) = app.upload("scan.pdf", &common::pdf(&[None])).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
    assert_eq!(app.stored_files(), 0);
    assert_eq!(app.chat_calls(), 0);
}

#[tokio::test]
async fn full_processing_then_save_and_duplicate() {
    let app = TestApp::new(StubChat {
        extraction: Some(extraction_reply()),
        ..Default::default()
    });

    let pdf = common::pdf(&[Some("Jane Doe"), Some("jane.doe@example.com 555-123-4567")]);
    let (status, processed) = app.upload("jane.pdf", &pdf).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(processed["partial"], false);
    assert_eq!(processed["name"], "Jane Doe");
    assert_eq!(processed["email"], "jane.doe@example.com");
    assert_eq!(processed["phone"], "555-123-4567");
    assert_eq!(processed["certifications"], json!(["CIMA"]));
    assert!(processed.get("warning").is_none());
    assert_eq!(app.stored_files(), 1);

    let mut reviewed = processed.clone();
    reviewed.as_object_mut().unwrap().remove("partial");
    let (status, saved) = app.json("POST", "/api/candidates", Some(reviewed.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["success"], true);
    let id = saved["id"].as_i64().unwrap();

    let (status, again) = app.json("POST", "/api/candidates", Some(reviewed)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(again["code"], "conflict");

    let (status, candidate) = app.json("GET", &format!("/api/candidates/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(candidate["skills"], json!(["Audit", "Excel"]));
    assert_eq!(candidate["age"], 29);
    let resume_path = candidate["resume_path"].as_str().unwrap().to_string();

    let (status, _) = app.json("DELETE", &format!("/api/candidates/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!std::path::Path::new(&resume_path).exists());

    let (status, _) = app.json("GET", &format!("/api/candidates/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn model_failure_yields_partial_multi_status() {
    let app = TestApp::new(StubChat::default());

    let pdf = common::pdf(&[Some("Contact: sam@example.org or 555.987.6543")]);
    let (status, processed) = app.upload("sam.pdf", &pdf).await;
    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert_eq!(processed["partial"], true);
    assert!(processed["warning"].is_string());
    assert_eq!(processed["email"], "sam@example.org");
    assert_eq!(processed["phone"], "555.987.6543");
    assert!(processed["name"].is_null());
    assert!(processed["resume_path"].is_string());
    assert_eq!(app.stored_files(), 1);
}

#[tokio::test]
async fn save_validates_name_and_age() {
    let app = TestApp::new(StubChat::default());

    let (status, _) = app
        .json("POST", "/api/candidates", Some(json!({ "name": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json("POST", "/api/candidates", Some(json!({ "name": "   " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json("POST", "/api/candidates", Some(json!({ "name": "Kim", "age": -3 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, list) = app.json("GET", "/api/candidates", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn update_is_full_replacement_with_conflict_and_not_found() {
    let app = TestApp::new(StubChat::default());
    let (_, a) = app
        .json(
            "POST",
            "/api/candidates",
            Some(json!({ "name": "Ann", "email": "ann@example.com", "phone": "555-000-0001" })),
        )
        .await;
    let (_, b) = app
        .json(
            "POST",
            "/api/candidates",
            Some(json!({ "name": "Ben", "email": "ben@example.com" })),
        )
        .await;
    let a = a["id"].as_i64().unwrap();
    let b = b["id"].as_i64().unwrap();

    let (status, updated) = app
        .json(
            "PUT",
            &format!("/api/candidates/{a}"),
            Some(json!({ "name": "Ann Lee", "email": "ann@example.com", "skills": ["SQL"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Ann Lee");
    assert!(updated["phone"].is_null());
    assert_eq!(updated["skills"], json!(["SQL"]));

    let (status, body) = app
        .json(
            "PUT",
            &format!("/api/candidates/{b}"),
            Some(json!({ "name": "Ben", "email": "ann@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (status, _) = app
        .json("PUT", "/api/candidates/9999", Some(json!({ "name": "Ghost" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_succeeds_when_resume_file_is_missing() {
    let app = TestApp::new(StubChat::default());
    let missing = app.uploads.join("already-gone.pdf");
    let (status, saved) = app
        .json(
            "POST",
            "/api/candidates",
            Some(json!({ "name": "Lee", "resume_path": missing.display().to_string() })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = saved["id"].as_i64().unwrap();

    let (status, _) = app.json("DELETE", &format!("/api/candidates/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.json("DELETE", &format!("/api/candidates/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_never_touches_files_outside_the_uploads_dir() {
    let app = TestApp::new(StubChat::default());
    std::fs::create_dir_all(&app.uploads).unwrap();
    let outside = app.uploads.parent().unwrap().join("server-config.txt");
    std::fs::write(&outside, b"keep me").unwrap();

    let (status, saved) = app
        .json(
            "POST",
            "/api/candidates",
            Some(json!({ "name": "Mallory", "resume_path": outside.display().to_string() })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = saved["id"].as_i64().unwrap();

    let (status, _) = app.json("DELETE", &format!("/api/candidates/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(outside.exists());
}

#[tokio::test]
async fn stats_group_and_rank_values() {
    let app = TestApp::new(StubChat::default());
    let profiles = [
        json!({ "name": "A", "experience_level": "Senior", "industry": "Finance", "skills": ["SQL", "Excel"], "certifications": ["CFA"] }),
        json!({ "name": "B", "experience_level": "Junior", "industry": "Finance", "skills": ["Excel"] }),
        json!({ "name": "C", "experience_level": "Senior", "industry": "Retail", "skills": ["Python"], "certifications": ["CA"] }),
        json!({ "name": "D" }),
    ];
    for profile in profiles {
        let (status, _) = app.json("POST", "/api/candidates", Some(profile)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, stats) = app.json("GET", "/api/candidates/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_candidates"], 4);
    assert_eq!(
        stats["by_experience_level"],
        json!([{ "value": "Senior", "count": 2 }, { "value": "Junior", "count": 1 }])
    );
    assert_eq!(
        stats["top_industries"],
        json!([{ "value": "Finance", "count": 2 }, { "value": "Retail", "count": 1 }])
    );
    assert_eq!(
        stats["top_skills"],
        json!([
            { "value": "Excel", "count": 2 },
            { "value": "Python", "count": 1 },
            { "value": "SQL", "count": 1 }
        ])
    );
    assert_eq!(
        stats["top_certifications"],
        json!([{ "value": "CA", "count": 1 }, { "value": "CFA", "count": 1 }])
    );
}

#[tokio::test]
async fn openapi_document_lists_the_routes() {
    let app = TestApp::new(StubChat::default());
    let (status, doc) = app.json("GET", "/api/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/resumes/process"].is_object());
    assert!(doc["paths"]["/api/match-job"].is_object());
}
