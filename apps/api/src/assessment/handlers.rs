//! Axum route handlers for the Assessment API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::assessment::pipeline::Assessment;
use crate::assessment::AssessmentError;
use crate::document::read_document;
use crate::errors::AppError;
use crate::state::AppState;

/// Name of the multipart field carrying the resume.
pub const UPLOAD_FIELD: &str = "file";

/// POST /assess_visa_eligibility/
///
/// Accepts one PDF resume as multipart field `file` and returns the refined
/// evidence per criterion with the overall rating.
pub async fn handle_assess(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Assessment>, AppError> {
    let (file_name, content) = read_upload(multipart).await?;
    info!(file_name = %file_name, bytes = content.len(), "Received resume upload");

    let text = read_document(state.reader.clone(), content)
        .await
        .map_err(AssessmentError::from)?;
    let assessment = state.assessor.assess(&text).await?;

    Ok(Json(assessment))
}

/// Returns the first `file` field's name and bytes; other fields are ignored.
async fn read_upload(mut multipart: Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error("Malformed multipart body", e))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| upload_error("Failed to read upload", e))?;
        if content.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        return Ok((file_name, content));
    }
    Err(AppError::Validation(format!(
        "Missing multipart field '{UPLOAD_FIELD}'"
    )))
}

/// Body-limit failures keep their 413; every other multipart failure is the
/// client's malformed request.
fn upload_error(context: &str, error: MultipartError) -> AppError {
    let message = format!("{context}: {}", error.body_text());
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::Validation(message)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::assessment::chunker::TextChunker;
    use crate::assessment::pipeline::{Assessor, CountSource};
    use crate::assessment::testing::ScriptedOracle;
    use crate::document::{DocumentParseError, DocumentReader};
    use crate::routes::build_router;
    use crate::state::AppState;

    const BOUNDARY: &str = "X-ASSESSOR-BOUNDARY";

    /// Treats the upload as UTF-8 text; `%PDF-` prefixed bytes only.
    struct PlainTextReader;

    impl DocumentReader for PlainTextReader {
        fn extract_text(&self, bytes: &[u8]) -> Result<String, DocumentParseError> {
            let rest = bytes
                .strip_prefix(b"%PDF-")
                .ok_or(DocumentParseError::NotPdf)?;
            String::from_utf8(rest.to_vec()).map_err(|e| DocumentParseError::Malformed(e.to_string()))
        }
    }

    fn app(responses: &[&str]) -> Router {
        app_with_limit(responses, 1024 * 1024)
    }

    fn app_with_limit(responses: &[&str], max_upload_bytes: usize) -> Router {
        let oracle = Arc::new(ScriptedOracle::new(responses.iter().copied()));
        let state = AppState {
            assessor: Arc::new(Assessor::new(oracle, TextChunker::default(), CountSource::Oracle)),
            reader: Arc::new(PlainTextReader),
        };
        build_router(state, max_upload_bytes)
    }

    fn upload(field: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"resume.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/assess_visa_eligibility/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const REFINED: &str = "{'Nobel Prize': [], 'Awards': ['Rhodes Scholarship'], 'Membership': [], \
        'Press': ['Profile in Wired'], 'Judging': ['Reviewer, NeurIPS'], 'Original Contribution': [], \
        'Scholarly Articles': [], 'Critical Employment': [], 'High Remuneration': []}";

    #[tokio::test]
    async fn test_assess_returns_criterion_and_rating() {
        let app = app(&[
            "Awards: Rhodes Scholarship\nPress: Profile in Wired\nJudging: Reviewer, NeurIPS",
            REFINED,
            "Awards: 1\nPress: 1\nJudging: 1",
        ]);

        let response = app
            .oneshot(upload("file", b"%PDF-Rhodes Scholar. Wired profile. NeurIPS reviewer."))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["overall_rating"], "medium");
        assert_eq!(json["criterion"]["Awards"][0], "Rhodes Scholarship");
        assert_eq!(json["criterion"].as_object().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_missing_file_field_is_bad_request() {
        let response = app(&[])
            .oneshot(upload("resume", b"%PDF-text"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_oversized_upload_is_payload_too_large() {
        let content = [b"%PDF-".as_slice(), &[b'a'; 4096]].concat();
        let response = app_with_limit(&[], 256)
            .oneshot(upload("file", &content))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_truncated_multipart_body_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/assess_visa_eligibility/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"\r\n\r\n%PDF-cut off"
            )))
            .unwrap();

        let response = app(&[]).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_non_pdf_upload_is_unprocessable() {
        let response = app(&[])
            .oneshot(upload("file", b"just some text"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "DOCUMENT_PARSE_ERROR");
    }

    #[tokio::test]
    async fn test_oracle_failure_is_bad_gateway() {
        let response = app(&[])
            .oneshot(upload("file", b"%PDF-Rhodes Scholar"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "ORACLE_ERROR");
    }

    #[tokio::test]
    async fn test_unparseable_refinement_is_bad_gateway() {
        let response = app(&["Awards: Rhodes Scholarship", "Here you go!"])
            .oneshot(upload("file", b"%PDF-Rhodes Scholar"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "ORACLE_RESPONSE_INVALID");
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(&[])
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }
}
