//! Infrastructure services

mod answer_service;
mod query_service;
mod retrieval_service;

pub use answer_service::AnswerService;
pub use query_service::{QueryOutcome, QueryRequest, QueryService, QueryServiceDeps};
pub use retrieval_service::{RetrievalScope, RetrievalService, RetrievalSettings};
