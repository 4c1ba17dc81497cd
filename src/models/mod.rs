pub mod quiz;

pub use quiz::{
    Difficulty, ExplanationRequest, GeneratedQuestion, GeneratedQuiz, QuestionType,
    QuizConfiguration, QuizPayload,
};
