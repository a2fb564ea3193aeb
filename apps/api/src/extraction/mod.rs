// Structured Extraction: resume text → typed `ResumeExtract` via one JSON-mode gateway call.
// Untyped model output is decoded at exactly one boundary (`schema::decode_resume`).

pub mod extractor;
pub mod models;
pub mod schema;

pub use extractor::{ExtractedResume, ExtractionError, ResumeExtractor};
