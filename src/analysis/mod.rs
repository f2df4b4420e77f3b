//! Email analysis pipeline.
//!
//! Every submission flows through:
//! 1. `EmailSubmission::into_input()`: pick the file or the raw text
//! 2. `extract::extract_text()`: `.txt` / `.pdf` to plain text
//! 3. `EmailClassifier::classify()`: first LLM call, PRODUTIVO / IMPRODUTIVO
//! 4. `EmailClassifier::generate_reply()`: second LLM call, keyed on the label
//! 5. `AnalysisResult::new()`: the response payload
//!
//! Nothing is stored between requests.

pub mod classifier;
pub mod extract;
pub mod prompts;
pub mod types;

pub use classifier::{ClassifierConfig, EmailClassifier};
pub use types::{AnalysisResult, Classification, EmailInput, EmailSubmission, UploadedFile};
