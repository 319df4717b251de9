mod examples;
mod learning;
mod quiz;

pub use examples::CodeExampleSession;
pub use learning::{LearningSession, LoadState, QuizCompletion};
pub use quiz::QuizSession;
