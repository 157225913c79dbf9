//! Stored answers: persistence, payload encoding and read-path hydration

pub mod coerce;
mod hydration;
mod payload;
mod record;
mod repository;

pub use hydration::{hydrate_highlights, hydrate_plain, hydrate_verified, Hydrated};
pub use payload::AnswerPayload;
pub use record::StoredAnswer;
pub use repository::AnswerRepository;

#[cfg(test)]
pub use repository::mock::MockAnswerRepository;
