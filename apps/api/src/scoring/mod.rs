// Rubric Scoring Engine: deterministic, explainable 0–100 score for a structured resume.

pub mod explain;
pub mod rubric;
pub mod scorer;

pub use rubric::Rubric;
pub use scorer::{score_with_rubric, ScoreResult};
