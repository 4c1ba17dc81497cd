//! Timing policy shared by the configuration form and the HTTP handlers.
//!
//! Both sides derive the minimum quiz duration from the same [`QuizPolicy`]
//! value, so a configuration accepted in one place is accepted in the other.

use crate::models::{Difficulty, QuestionType};
use std::ops::RangeInclusive;

pub const MIN_QUESTIONS: u32 = 1;
pub const MAX_QUESTIONS: u32 = 20;
pub const DEFAULT_QUESTIONS: u32 = 10;
pub const MIN_TOPIC_LENGTH: usize = 2;
pub const MAX_TOTAL_SECONDS: u32 = 1800;
pub const FALLBACK_SECONDS_PER_QUESTION: u32 = 45;
/// Granularity of the total-time slider.
pub const TIME_STEP_SECONDS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerQuestionType {
    pub multiple_choice: u32,
    pub true_false: u32,
}

impl PerQuestionType {
    fn get(&self, question_type: QuestionType) -> u32 {
        match question_type {
            QuestionType::MultipleChoice => self.multiple_choice,
            QuestionType::TrueFalse => self.true_false,
        }
    }
}

/// Seconds allotted per question, keyed by difficulty and question type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeTable {
    pub easy: PerQuestionType,
    pub medium: PerQuestionType,
    pub hard: PerQuestionType,
}

impl TimeTable {
    pub const STANDARD: TimeTable = TimeTable {
        easy: PerQuestionType {
            multiple_choice: 30,
            true_false: 20,
        },
        medium: PerQuestionType {
            multiple_choice: 45,
            true_false: 30,
        },
        hard: PerQuestionType {
            multiple_choice: 60,
            true_false: 45,
        },
    };

    pub fn seconds_per_question(&self, difficulty: Difficulty, question_type: QuestionType) -> u32 {
        let row = match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        };
        row.get(question_type)
    }
}

impl Default for TimeTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizPolicy {
    pub min_questions: u32,
    pub max_questions: u32,
    pub min_topic_length: usize,
    pub max_total_seconds: u32,
    pub fallback_seconds_per_question: u32,
    pub time_table: TimeTable,
}

impl QuizPolicy {
    pub const STANDARD: QuizPolicy = QuizPolicy {
        min_questions: MIN_QUESTIONS,
        max_questions: MAX_QUESTIONS,
        min_topic_length: MIN_TOPIC_LENGTH,
        max_total_seconds: MAX_TOTAL_SECONDS,
        fallback_seconds_per_question: FALLBACK_SECONDS_PER_QUESTION,
        time_table: TimeTable::STANDARD,
    };

    pub fn suggested_minimum_seconds(
        &self,
        difficulty: Difficulty,
        question_type: QuestionType,
        number_of_questions: u32,
    ) -> u32 {
        self.time_table
            .seconds_per_question(difficulty, question_type)
            .saturating_mul(number_of_questions)
    }

    /// Same rule for values that have not been parsed yet. Unknown
    /// difficulties fall back to the default rate; anything other than
    /// `"mcq"` is timed as true/false.
    pub fn suggested_minimum_seconds_raw(
        &self,
        difficulty: &str,
        question_type: &str,
        number_of_questions: u32,
    ) -> u32 {
        let question_type = if question_type == QuestionType::MultipleChoice.as_str() {
            QuestionType::MultipleChoice
        } else {
            QuestionType::TrueFalse
        };
        let per_question = match difficulty.parse::<Difficulty>() {
            Ok(difficulty) => self.time_table.seconds_per_question(difficulty, question_type),
            Err(()) => self.fallback_seconds_per_question,
        };
        per_question.saturating_mul(number_of_questions)
    }

    pub fn maximum_seconds(&self) -> u32 {
        self.max_total_seconds
    }

    pub fn question_range(&self) -> RangeInclusive<u32> {
        self.min_questions..=self.max_questions
    }

    /// Range the total-time slider may move in for the given inputs.
    pub fn total_time_range(
        &self,
        difficulty: Difficulty,
        question_type: QuestionType,
        number_of_questions: u32,
    ) -> RangeInclusive<u32> {
        let min = self.suggested_minimum_seconds(difficulty, question_type, number_of_questions);
        min..=self.max_total_seconds.max(min)
    }
}

impl Default for QuizPolicy {
    fn default() -> Self {
        Self::STANDARD
    }
}

pub fn minutes_rounded_up(seconds: u32) -> u32 {
    seconds.div_ceil(60)
}

/// `"5m"` for whole minutes, `"7m 30s"` otherwise.
pub fn format_duration(seconds: u32) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;
    if secs > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}m", mins)
    }
}

/// Average seconds per question, rounded half up. Zero questions yields zero.
pub fn seconds_per_question(total_time: u32, number_of_questions: u32) -> u32 {
    if number_of_questions == 0 {
        return 0;
    }
    (total_time + number_of_questions / 2) / number_of_questions
}
