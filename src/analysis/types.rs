//! Request-scoped analysis types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Confidence label attached to every result.
pub const DEFAULT_CONFIDENCE: &str = "Alta";

/// Whether an email needs action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    /// Requires an action or a specific answer.
    Produtivo,
    /// Courtesy messages, thanks, greetings.
    Improdutivo,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Produtivo => "PRODUTIVO",
            Classification::Improdutivo => "IMPRODUTIVO",
        }
    }

    /// Exact label match after trimming and uppercasing.
    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "PRODUTIVO" => Some(Classification::Produtivo),
            "IMPRODUTIVO" => Some(Classification::Improdutivo),
            _ => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded document.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Browsers send an empty part when no file was picked.
    pub fn is_blank(&self) -> bool {
        self.filename.is_empty() && self.bytes.is_empty()
    }
}

/// The resolved source of the email body.
#[derive(Debug, Clone)]
pub enum EmailInput {
    Text(String),
    File(UploadedFile),
}

/// Raw form fields as submitted.
#[derive(Debug, Clone, Default)]
pub struct EmailSubmission {
    pub text: Option<String>,
    pub file: Option<UploadedFile>,
}

impl EmailSubmission {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            file: None,
        }
    }

    pub fn from_file(file: UploadedFile) -> Self {
        Self {
            text: None,
            file: Some(file),
        }
    }

    /// Pick the input to analyze. A file wins over text.
    pub fn into_input(self) -> Result<EmailInput, AnalysisError> {
        if let Some(file) = self.file.filter(|f| !f.is_blank()) {
            return Ok(EmailInput::File(file));
        }
        match self.text {
            Some(text) if !text.is_empty() => Ok(EmailInput::Text(text)),
            _ => Err(AnalysisError::MissingInput),
        }
    }
}

/// Response payload for `/analise`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "categoria")]
    pub category: Classification,
    #[serde(rename = "resposta_sugerida")]
    pub suggested_reply: String,
    #[serde(rename = "confianca")]
    pub confidence: String,
}

impl AnalysisResult {
    pub fn new(category: Classification, suggested_reply: impl Into<String>) -> Self {
        Self {
            category,
            suggested_reply: suggested_reply.into(),
            confidence: DEFAULT_CONFIDENCE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_normalized() {
        assert_eq!(
            Classification::from_label(" improdutivo\n"),
            Some(Classification::Improdutivo)
        );
        assert_eq!(
            Classification::from_label("Produtivo"),
            Some(Classification::Produtivo)
        );
        assert_eq!(Classification::from_label("PRODUTIVO."), None);
    }

    #[test]
    fn result_serializes_with_portuguese_keys() {
        let result = AnalysisResult::new(Classification::Improdutivo, "Obrigado!");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "categoria": "IMPRODUTIVO",
                "resposta_sugerida": "Obrigado!",
                "confianca": "Alta"
            })
        );
    }

    #[test]
    fn file_takes_precedence_over_text() {
        let submission = EmailSubmission {
            text: Some("typed text".into()),
            file: Some(UploadedFile::new("mail.txt", b"file text".to_vec())),
        };
        assert!(matches!(
            submission.into_input(),
            Ok(EmailInput::File(f)) if f.filename == "mail.txt"
        ));
    }

    #[test]
    fn blank_file_part_falls_back_to_text() {
        let submission = EmailSubmission {
            text: Some("typed text".into()),
            file: Some(UploadedFile::new("", Vec::new())),
        };
        assert!(matches!(submission.into_input(), Ok(EmailInput::Text(t)) if t == "typed text"));
    }

    #[test]
    fn nothing_submitted_is_missing_input() {
        assert!(matches!(
            EmailSubmission::default().into_input(),
            Err(AnalysisError::MissingInput)
        ));
        assert!(matches!(
            EmailSubmission::from_text("").into_input(),
            Err(AnalysisError::MissingInput)
        ));
    }
}
