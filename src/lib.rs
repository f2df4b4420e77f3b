//! Email classifier: labels incoming emails as PRODUTIVO / IMPRODUTIVO and
//! drafts a suggested reply.

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod llm;
