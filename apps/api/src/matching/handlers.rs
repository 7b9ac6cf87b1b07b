//! Axum route handlers for the Match API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;

use crate::errors::AppError;
use crate::matching::pipeline::{extract_resume, run_match, MatchReport};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchTextRequest {
    pub resume_text: String,
    pub job_description: String,
}

/// POST /api/v1/match
///
/// Multipart form: `resume` (file) + `job_description` (text).
/// Extracts the resume, scores it against the job description and attaches feedback.
pub async fn handle_match(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MatchReport>, AppError> {
    let mut resume: Option<(String, Bytes)> = None;
    let mut job_description = String::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    resume = Some((file_name, bytes));
                }
            }
            "job_description" => job_description = field.text().await?,
            _ => {}
        }
    }

    let job_description = job_description.trim().to_string();
    let Some((file_name, bytes)) = resume.filter(|_| !job_description.is_empty()) else {
        return Err(AppError::missing_input());
    };

    let resume_text = extract_resume(file_name.clone(), bytes).await?;
    let report = run_match(&state, Some(file_name), resume_text, job_description).await?;

    Ok(Json(report))
}

/// POST /api/v1/match/text
///
/// Same as `/api/v1/match` for callers that already have the resume as text.
pub async fn handle_match_text(
    State(state): State<AppState>,
    Json(request): Json<MatchTextRequest>,
) -> Result<Json<MatchReport>, AppError> {
    let job_description = request.job_description.trim().to_string();
    if job_description.is_empty() || request.resume_text.trim().is_empty() {
        return Err(AppError::missing_input());
    }

    let report = run_match(&state, None, request.resume_text, job_description).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::routes::build_router;
    use crate::state::AppState;

    const BOUNDARY: &str = "matcher-test-boundary";

    fn multipart_body(file: Option<(&str, &[u8])>, job_description: Option<&str>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some((file_name, contents)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(contents);
            body.extend_from_slice(b"\r\n");
        }
        if let Some(text) = job_description {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"job_description\"\r\n\r\n{text}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/match")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        send_to(AppState::offline_for_tests(), request).await
    }

    async fn send_to(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(state)
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_upload_txt_resume_scores_and_gives_offline_feedback() {
        let body = multipart_body(
            Some(("resume.txt", b"Python Django REST APIs")),
            Some("  Python, Django, SQL  "),
        );

        let (status, json) = send(upload(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["file_name"], "resume.txt");
        assert_eq!(json["job_description"], "Python, Django, SQL");
        assert_eq!(json["matched"], json!(["python", "django"]));
        assert_eq!(json["missing"], json!(["sql"]));
        assert_eq!(json["model_used"], "Offline");
        assert_eq!(json["backend_used"], "Offline");
        let score = json["match_score"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&score));
        assert!(json["feedback"].as_str().unwrap().contains("Your resume matches"));
    }

    #[tokio::test]
    async fn test_upload_without_job_description_is_rejected() {
        let body = multipart_body(Some(("resume.txt", b"Python")), Some("   "));

        let (status, json) = send(upload(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"]["message"],
            "Please upload a resume and enter a job description."
        );
    }

    #[tokio::test]
    async fn test_upload_without_file_is_rejected() {
        let (status, json) = send(upload(multipart_body(None, Some("Rust")))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_upload_unsupported_format() {
        let body = multipart_body(Some(("resume.odt", b"content")), Some("Rust"));

        let (status, json) = send(upload(body)).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(
            json["error"]["message"],
            "Failed to extract text: Unsupported file format: .odt"
        );
    }

    #[tokio::test]
    async fn test_oversize_upload_is_payload_too_large() {
        let mut state = AppState::offline_for_tests();
        state.config.max_upload_bytes = 1024 * 1024;
        let resume = vec![b'a'; 2 * 1024 * 1024];
        let body = multipart_body(Some(("resume.txt", resume.as_slice())), Some("Rust"));

        let (status, json) = send_to(state, upload(body)).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_match_text_endpoint() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/match/text")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "resume_text": "Kubernetes and Terraform on AWS",
                    "job_description": "AWS, Kubernetes, Go"
                })
                .to_string(),
            ))
            .unwrap();

        let (status, json) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["file_name"].is_null());
        assert_eq!(json["matched"], json!(["aws", "kubernetes"]));
        assert_eq!(json["missing"], json!(["go"]));
    }
}
