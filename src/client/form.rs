//! State machine behind the "create your quiz" form.
//!
//! Every edit goes through [`ConfigForm::apply`]. Only the timing inputs
//! (difficulty, question type, question count) re-run the timing policy, and
//! the total time is never left below the new minimum.

use crate::client::topics::{filter_topics, MAX_VISIBLE_SUGGESTIONS, QUIZ_TOPICS};
use crate::error::Error;
use crate::models::{Difficulty, QuestionType, QuizConfiguration, QuizPayload};
use crate::services::ai_service::QuizGenerator;
use crate::utils::timing::{format_duration, seconds_per_question, QuizPolicy, DEFAULT_QUESTIONS};
use crate::utils::validation::{validate, ConfigInput, ValidationError};
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

/// Time given to a click on a suggestion to land before a blur hides the list.
pub const TOPIC_BLUR_GRACE: Duration = Duration::from_millis(150);
pub const DEFAULT_TOTAL_TIME: u32 = 600;

pub const EMPTY_TOPIC_MESSAGE: &str = "Please enter a topic for your quiz";
pub const GENERATED_MESSAGE: &str = "Quiz generated successfully!";
pub const GENERATION_FALLBACK_MESSAGE: &str = "Failed to generate quiz. Please try again.";

/// What happens to the total time when a timing input changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeSyncPolicy {
    /// `max(suggested, current)`: a manual increase survives.
    #[default]
    PreserveRaiseOnly,
    /// Always snap to the new suggestion, discarding manual changes.
    AlwaysReset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftConfiguration {
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_type: QuestionType,
    pub number_of_questions: u32,
    pub total_time: u32,
}

impl Default for DraftConfiguration {
    fn default() -> Self {
        Self {
            topic: String::new(),
            difficulty: Difficulty::Medium,
            question_type: QuestionType::MultipleChoice,
            number_of_questions: DEFAULT_QUESTIONS,
            total_time: DEFAULT_TOTAL_TIME,
        }
    }
}

impl From<&DraftConfiguration> for ConfigInput {
    fn from(draft: &DraftConfiguration) -> Self {
        Self {
            topic: Some(draft.topic.clone()),
            difficulty: Some(draft.difficulty.as_str().to_string()),
            question_type: Some(draft.question_type.as_str().to_string()),
            number_of_questions: Some(f64::from(draft.number_of_questions)),
            total_time: Some(f64::from(draft.total_time)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionState {
    Hidden,
    Visible,
    /// Blurred; hides once `deadline` passes.
    Closing { deadline: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    EditTopic(String),
    FocusTopic,
    SelectSuggestedTopic(String),
    BlurTopic {
        at: Instant,
        focus_in_suggestions: bool,
    },
    Tick {
        now: Instant,
    },
    SetDifficulty(Difficulty),
    SetQuestionType(QuestionType),
    SetNumberOfQuestions(u32),
    SetTotalTime(u32),
    UseSuggestedTime,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message for the toast area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Local validation failed; nothing was sent.
    Rejected {
        error: ValidationError,
        notice: Notice,
    },
    /// The generator failed; the form stays open for another try.
    Failed(Notice),
    Generated {
        quiz: QuizPayload,
        notice: Notice,
    },
}

#[derive(Debug, Clone)]
pub struct ConfigForm {
    draft: DraftConfiguration,
    filtered_topics: Vec<&'static str>,
    suggestions: SuggestionState,
    policy: QuizPolicy,
    time_sync: TimeSyncPolicy,
    phase: FormPhase,
}

impl Default for ConfigForm {
    fn default() -> Self {
        Self::new(QuizPolicy::default(), TimeSyncPolicy::default())
    }
}

impl ConfigForm {
    pub fn new(policy: QuizPolicy, time_sync: TimeSyncPolicy) -> Self {
        let mut form = Self {
            draft: DraftConfiguration::default(),
            filtered_topics: QUIZ_TOPICS.to_vec(),
            suggestions: SuggestionState::Hidden,
            policy,
            time_sync,
            phase: FormPhase::Editing,
        };
        form.sync_total_time();
        form
    }

    pub fn apply(&mut self, action: FormAction) {
        match action {
            FormAction::EditTopic(text) => {
                if text.is_empty() {
                    self.filtered_topics = QUIZ_TOPICS.to_vec();
                    self.suggestions = SuggestionState::Hidden;
                } else {
                    self.filtered_topics = filter_topics(&text);
                    // A pending blur still hides the list when it expires.
                    if !matches!(self.suggestions, SuggestionState::Closing { .. }) {
                        self.suggestions = SuggestionState::Visible;
                    }
                }
                self.draft.topic = text;
            }
            FormAction::FocusTopic => {
                if self.draft.topic.is_empty() {
                    self.suggestions = SuggestionState::Visible;
                }
            }
            FormAction::SelectSuggestedTopic(topic) => {
                self.draft.topic = topic;
                self.suggestions = SuggestionState::Hidden;
            }
            FormAction::BlurTopic {
                at,
                focus_in_suggestions,
            } => {
                if !focus_in_suggestions && self.suggestions == SuggestionState::Visible {
                    self.suggestions = SuggestionState::Closing {
                        deadline: at + TOPIC_BLUR_GRACE,
                    };
                }
            }
            FormAction::Tick { now } => {
                if let SuggestionState::Closing { deadline } = self.suggestions {
                    if now >= deadline {
                        self.suggestions = SuggestionState::Hidden;
                    }
                }
            }
            FormAction::SetDifficulty(difficulty) => {
                self.draft.difficulty = difficulty;
                self.sync_total_time();
            }
            FormAction::SetQuestionType(question_type) => {
                self.draft.question_type = question_type;
                self.sync_total_time();
            }
            FormAction::SetNumberOfQuestions(n) => {
                self.draft.number_of_questions = n;
                self.sync_total_time();
            }
            FormAction::SetTotalTime(seconds) => {
                self.draft.total_time = seconds;
            }
            FormAction::UseSuggestedTime => {
                self.draft.total_time = self.suggested_time();
            }
            FormAction::Reset => {
                self.draft = DraftConfiguration::default();
                self.draft.total_time = self.suggested_time();
                self.filtered_topics = QUIZ_TOPICS.to_vec();
                self.suggestions = SuggestionState::Hidden;
            }
        }
    }

    fn sync_total_time(&mut self) {
        let suggested = self.suggested_time();
        self.draft.total_time = match self.time_sync {
            TimeSyncPolicy::PreserveRaiseOnly => suggested.max(self.draft.total_time),
            TimeSyncPolicy::AlwaysReset => suggested,
        };
    }

    pub fn edit_topic(&mut self, text: impl Into<String>) {
        self.apply(FormAction::EditTopic(text.into()));
    }

    pub fn focus_topic_input(&mut self) {
        self.apply(FormAction::FocusTopic);
    }

    pub fn select_suggested_topic(&mut self, topic: impl Into<String>) {
        self.apply(FormAction::SelectSuggestedTopic(topic.into()));
    }

    pub fn blur_topic_input(&mut self, at: Instant, focus_in_suggestions: bool) {
        self.apply(FormAction::BlurTopic {
            at,
            focus_in_suggestions,
        });
    }

    pub fn tick(&mut self, now: Instant) {
        self.apply(FormAction::Tick { now });
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.apply(FormAction::SetDifficulty(difficulty));
    }

    pub fn set_question_type(&mut self, question_type: QuestionType) {
        self.apply(FormAction::SetQuestionType(question_type));
    }

    pub fn set_number_of_questions(&mut self, n: u32) {
        self.apply(FormAction::SetNumberOfQuestions(n));
    }

    pub fn set_total_time(&mut self, seconds: u32) {
        self.apply(FormAction::SetTotalTime(seconds));
    }

    pub fn use_suggested_time(&mut self) {
        self.apply(FormAction::UseSuggestedTime);
    }

    pub fn reset(&mut self) {
        self.apply(FormAction::Reset);
    }

    pub fn draft(&self) -> &DraftConfiguration {
        &self.draft
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn suggestion_state(&self) -> SuggestionState {
        self.suggestions
    }

    pub fn filtered_topics(&self) -> &[&'static str] {
        &self.filtered_topics
    }

    /// Suggestions the dropdown should render right now. Empty when hidden.
    pub fn visible_suggestions(&self) -> &[&'static str] {
        match self.suggestions {
            SuggestionState::Hidden => &[],
            SuggestionState::Visible | SuggestionState::Closing { .. } => {
                let shown = self.filtered_topics.len().min(MAX_VISIBLE_SUGGESTIONS);
                &self.filtered_topics[..shown]
            }
        }
    }

    pub fn suggested_time(&self) -> u32 {
        self.policy.suggested_minimum_seconds(
            self.draft.difficulty,
            self.draft.question_type,
            self.draft.number_of_questions,
        )
    }

    pub fn total_time_range(&self) -> RangeInclusive<u32> {
        self.policy.total_time_range(
            self.draft.difficulty,
            self.draft.question_type,
            self.draft.number_of_questions,
        )
    }

    pub fn question_range(&self) -> RangeInclusive<u32> {
        self.policy.question_range()
    }

    /// Slider caption, e.g. `7m 30s`.
    pub fn total_time_label(&self) -> String {
        format_duration(self.draft.total_time)
    }

    pub fn suggested_time_label(&self) -> String {
        format_duration(self.suggested_time())
    }

    /// Rough per-question budget, `~{n}s per question`.
    pub fn per_question_hint(&self) -> String {
        let seconds = seconds_per_question(self.draft.total_time, self.draft.number_of_questions);
        format!("~{}s per question", seconds)
    }

    pub fn validate(&self) -> Result<QuizConfiguration, ValidationError> {
        validate(&ConfigInput::from(&self.draft), &self.policy)
    }

    /// Validates the draft and, if it passes, hands it to `generator`. The
    /// form closes only when generation succeeds. Any pending indicator
    /// belongs to the caller, which holds the future.
    pub async fn submit<G>(&mut self, generator: &G) -> SubmitOutcome
    where
        G: QuizGenerator + ?Sized,
    {
        let config = match self.validate() {
            Ok(config) => config,
            Err(error) => {
                let message = match error {
                    ValidationError::MissingField("topic") => EMPTY_TOPIC_MESSAGE.to_string(),
                    ref other => other.to_string(),
                };
                tracing::debug!(code = error.code(), "quiz form rejected locally");
                return SubmitOutcome::Rejected {
                    error,
                    notice: Notice::error(message),
                };
            }
        };

        match generator.generate_quiz(&config).await {
            Ok(quiz) => {
                self.phase = FormPhase::Closed;
                SubmitOutcome::Generated {
                    quiz,
                    notice: Notice::success(GENERATED_MESSAGE),
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "quiz generation failed");
                SubmitOutcome::Failed(Notice::error(failure_message(err)))
            }
        }
    }
}

fn failure_message(err: Error) -> String {
    match err {
        Error::Generation(msg) | Error::BadRequest(msg) if !msg.trim().is_empty() => msg,
        Error::Validation(err) => err.to_string(),
        Error::Reqwest(err) => err.to_string(),
        _ => GENERATION_FALLBACK_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ai_service::MockQuizGenerator;
    use serde_json::json;

    #[test]
    fn starts_with_defaults() {
        let form = ConfigForm::default();
        let draft = form.draft();
        assert_eq!(draft.topic, "");
        assert_eq!(draft.difficulty, Difficulty::Medium);
        assert_eq!(draft.question_type, QuestionType::MultipleChoice);
        assert_eq!(draft.number_of_questions, 10);
        assert_eq!(draft.total_time, 600);
        assert_eq!(form.suggested_time(), 450);
        assert_eq!(form.phase(), FormPhase::Editing);
    }

    #[test]
    fn preserve_raise_only_keeps_manual_increase() {
        let mut form = ConfigForm::new(QuizPolicy::default(), TimeSyncPolicy::PreserveRaiseOnly);
        form.set_total_time(900);
        form.set_difficulty(Difficulty::Easy);
        assert_eq!(form.draft().total_time, 900);

        form.set_difficulty(Difficulty::Hard);
        form.set_number_of_questions(20);
        assert_eq!(form.draft().total_time, 1200);
    }

    #[test]
    fn always_reset_discards_manual_increase() {
        let mut form = ConfigForm::new(QuizPolicy::default(), TimeSyncPolicy::AlwaysReset);
        assert_eq!(form.draft().total_time, 450);
        form.set_total_time(900);
        form.set_difficulty(Difficulty::Easy);
        assert_eq!(form.draft().total_time, 300);
        form.set_question_type(QuestionType::TrueFalse);
        assert_eq!(form.draft().total_time, 200);
    }

    #[test]
    fn timing_inputs_never_leave_total_below_minimum() {
        for policy in [TimeSyncPolicy::PreserveRaiseOnly, TimeSyncPolicy::AlwaysReset] {
            let mut form = ConfigForm::new(QuizPolicy::default(), policy);
            form.set_total_time(0);
            form.set_number_of_questions(3);
            assert!(form.draft().total_time >= form.suggested_time());
            form.set_difficulty(Difficulty::Hard);
            assert!(form.draft().total_time >= form.suggested_time());
        }
    }

    #[test]
    fn total_time_is_not_synced_by_non_timing_edits() {
        let mut form = ConfigForm::default();
        form.set_total_time(100);
        form.edit_topic("History");
        assert_eq!(form.draft().total_time, 100);
    }

    #[test]
    fn use_suggested_time_and_slider_range() {
        let mut form = ConfigForm::default();
        form.set_total_time(1500);
        form.use_suggested_time();
        assert_eq!(form.draft().total_time, 450);
        assert_eq!(form.total_time_range(), 450..=1800);
        assert_eq!(form.question_range(), 1..=20);
    }

    #[test]
    fn time_labels_follow_draft() {
        let mut form = ConfigForm::default();
        assert_eq!(form.total_time_label(), "10m");
        assert_eq!(form.suggested_time_label(), "7m 30s");
        assert_eq!(form.per_question_hint(), "~60s per question");

        form.set_number_of_questions(7);
        assert_eq!(form.per_question_hint(), "~86s per question");
    }

    #[test]
    fn topic_editing_filters_and_toggles_suggestions() {
        let mut form = ConfigForm::default();
        form.edit_topic("hist");
        assert_eq!(form.suggestion_state(), SuggestionState::Visible);
        assert_eq!(form.visible_suggestions(), ["World History", "Art History"]);

        form.edit_topic("");
        assert_eq!(form.suggestion_state(), SuggestionState::Hidden);
        assert_eq!(form.filtered_topics().len(), QUIZ_TOPICS.len());
        assert!(form.visible_suggestions().is_empty());
    }

    #[test]
    fn focus_with_empty_topic_shows_capped_list() {
        let mut form = ConfigForm::default();
        form.focus_topic_input();
        assert_eq!(form.visible_suggestions().len(), MAX_VISIBLE_SUGGESTIONS);

        form.select_suggested_topic("Rust");
        assert_eq!(form.draft().topic, "Rust");
        assert_eq!(form.suggestion_state(), SuggestionState::Hidden);

        form.focus_topic_input();
        assert_eq!(form.suggestion_state(), SuggestionState::Hidden);
    }

    #[test]
    fn blur_hides_after_grace_period() {
        let mut form = ConfigForm::default();
        form.edit_topic("a");
        let blurred_at = Instant::now();
        form.blur_topic_input(blurred_at, false);
        assert!(matches!(form.suggestion_state(), SuggestionState::Closing { .. }));

        form.tick(blurred_at + Duration::from_millis(100));
        assert!(!form.visible_suggestions().is_empty());

        form.tick(blurred_at + TOPIC_BLUR_GRACE);
        assert_eq!(form.suggestion_state(), SuggestionState::Hidden);
    }

    #[test]
    fn typing_after_blur_does_not_cancel_pending_hide() {
        let mut form = ConfigForm::default();
        form.edit_topic("hi");
        let blurred_at = Instant::now();
        form.blur_topic_input(blurred_at, false);

        form.edit_topic("hist");
        assert_eq!(
            form.suggestion_state(),
            SuggestionState::Closing {
                deadline: blurred_at + TOPIC_BLUR_GRACE
            }
        );
        assert_eq!(form.visible_suggestions(), ["World History", "Art History"]);

        form.tick(blurred_at + TOPIC_BLUR_GRACE);
        assert_eq!(form.suggestion_state(), SuggestionState::Hidden);
        assert_eq!(form.draft().topic, "hist");

        form.edit_topic("histo");
        assert_eq!(form.suggestion_state(), SuggestionState::Visible);
    }

    #[test]
    fn blur_into_suggestion_list_keeps_it_open() {
        let mut form = ConfigForm::default();
        form.edit_topic("hist");
        let blurred_at = Instant::now();
        form.blur_topic_input(blurred_at, true);
        form.tick(blurred_at + Duration::from_secs(1));
        assert_eq!(form.suggestion_state(), SuggestionState::Visible);

        form.select_suggested_topic("World History");
        assert_eq!(form.draft().topic, "World History");
    }

    #[test]
    fn reset_restores_defaults_with_suggested_time() {
        let mut form = ConfigForm::default();
        form.edit_topic("History");
        form.set_difficulty(Difficulty::Hard);
        form.set_number_of_questions(3);
        form.reset();

        let draft = form.draft();
        assert_eq!(draft.topic, "");
        assert_eq!(draft.difficulty, Difficulty::Medium);
        assert_eq!(draft.number_of_questions, 10);
        assert_eq!(draft.total_time, 450);
        assert_eq!(form.suggestion_state(), SuggestionState::Hidden);
    }

    #[tokio::test]
    async fn empty_topic_is_rejected_without_calling_generator() {
        let mut generator = MockQuizGenerator::new();
        generator.expect_generate_quiz().times(0);

        let mut form = ConfigForm::default();
        form.edit_topic("   ");
        match form.submit(&generator).await {
            SubmitOutcome::Rejected { error, notice } => {
                assert_eq!(error, ValidationError::MissingField("topic"));
                assert_eq!(notice.message, EMPTY_TOPIC_MESSAGE);
                assert_eq!(notice.level, NoticeLevel::Error);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(form.phase(), FormPhase::Editing);
    }

    #[tokio::test]
    async fn programmatic_total_time_is_still_checked() {
        let mut generator = MockQuizGenerator::new();
        generator.expect_generate_quiz().times(0);

        let mut form = ConfigForm::default();
        form.edit_topic("History");
        form.set_total_time(5000);
        match form.submit(&generator).await {
            SubmitOutcome::Rejected { error, notice } => {
                assert_eq!(error, ValidationError::TotalTimeTooHigh { max_allowed: 1800 });
                assert_eq!(notice.message, "Total time cannot exceed 30 minutes");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        form.set_number_of_questions(0);
        assert!(matches!(
            form.submit(&generator).await,
            SubmitOutcome::Rejected {
                error: ValidationError::QuestionCountOutOfRange { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn successful_submit_closes_form() {
        let mut generator = MockQuizGenerator::new();
        generator
            .expect_generate_quiz()
            .withf(|config| config.topic == "History" && config.total_time == 600)
            .times(1)
            .returning(|_| Ok(QuizPayload::new().with_field("quiz", json!({ "title": "History" }))));

        let mut form = ConfigForm::default();
        form.edit_topic(" History ");
        match form.submit(&generator).await {
            SubmitOutcome::Generated { quiz, notice } => {
                assert_eq!(quiz.get("quiz").unwrap()["title"], "History");
                assert_eq!(notice.message, GENERATED_MESSAGE);
                assert_eq!(notice.level, NoticeLevel::Success);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(form.phase(), FormPhase::Closed);
    }

    #[tokio::test]
    async fn failed_generation_keeps_form_open() {
        let mut generator = MockQuizGenerator::new();
        generator
            .expect_generate_quiz()
            .times(2)
            .returning(|config| {
                if config.topic == "History" {
                    Err(Error::Generation("The model is overloaded".into()))
                } else {
                    Err(Error::Internal("socket closed".into()))
                }
            });

        let mut form = ConfigForm::default();
        form.edit_topic("History");
        assert_eq!(
            form.submit(&generator).await,
            SubmitOutcome::Failed(Notice::error("The model is overloaded"))
        );
        assert_eq!(form.phase(), FormPhase::Editing);

        form.edit_topic("Physics");
        assert_eq!(
            form.submit(&generator).await,
            SubmitOutcome::Failed(Notice::error(GENERATION_FALLBACK_MESSAGE))
        );
    }
}
