// Resume ingestion: uploaded document → analyzed, scored, stored record.

pub mod handlers;
pub mod repository;
pub mod service;

pub use repository::PgResumeRepository;
pub use service::{IngestError, ResumeService};
