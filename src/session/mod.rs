pub mod controller;
pub mod history;
pub mod quiz;

pub use controller::{Session, SessionError};
pub use history::History;
pub use quiz::{QuestionStatus, QuizState, ScoreBand};
