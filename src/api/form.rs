//! Reading the `/analise` form body.
//!
//! Accepts `multipart/form-data` (text and/or file) and
//! `application/x-www-form-urlencoded` (text only).

use axum::Form;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::debug;

use super::error::ApiError;
use crate::analysis::{EmailSubmission, UploadedFile};

/// Form field carrying the email as text.
pub const TEXT_FIELD: &str = "email_content";

/// Form field carrying the uploaded document.
pub const FILE_FIELD: &str = "email_file";

#[derive(Debug, Deserialize)]
struct UrlEncodedForm {
    #[serde(default)]
    email_content: Option<String>,
}

/// Decode the request body into a submission.
///
/// Bodies that are neither multipart nor urlencoded carry no form fields and
/// yield an empty submission, which the pipeline reports as missing input.
pub async fn read_submission(request: Request) -> Result<EmailSubmission, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase());

    match content_type.as_deref() {
        Some(ct) if ct.starts_with("multipart/form-data") => {
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(|e| ApiError::invalid_body(e.status(), e.body_text()))?;
            read_multipart(multipart).await
        }
        Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
            let Form(form) = Form::<UrlEncodedForm>::from_request(request, &())
                .await
                .map_err(|e| ApiError::invalid_body(e.status(), e.body_text()))?;
            Ok(EmailSubmission {
                text: form.email_content,
                file: None,
            })
        }
        other => {
            debug!(content_type = ?other, "Body is not a form, no fields read");
            Ok(EmailSubmission::default())
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<EmailSubmission, ApiError> {
    let mut submission = EmailSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid_body(e.status(), e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(TEXT_FIELD) => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::invalid_body(e.status(), e.body_text()))?;
                submission.text = Some(text);
            }
            Some(FILE_FIELD) => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::invalid_body(e.status(), e.body_text()))?;
                debug!(filename = %filename, size = bytes.len(), "Received upload");
                submission.file = Some(UploadedFile::new(filename, bytes.to_vec()));
            }
            other => {
                debug!(field = ?other, "Ignoring unknown form field");
            }
        }
    }

    Ok(submission)
}
