mod transcript;

pub use transcript::TranscriptEvaluator;
