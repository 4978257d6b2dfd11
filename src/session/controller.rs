use chrono::{DateTime, Utc};

use crate::client::{ClientError, ContentClient};
use crate::content::{ContentPayload, Difficulty, GenerationRequest};
use crate::session::history::History;
use crate::session::quiz::{QuestionStatus, QuizState, ScoreBand};

pub const EMPTY_SKILL_MESSAGE: &str = "Please enter a skill to learn";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Please enter a skill to learn")]
    EmptySkill,
    #[error("A generation request is already in progress")]
    Busy,
}

/// A generation the session has committed to. The caller performs the
/// network call and hands the result back with the same `id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingGeneration {
    pub id: u64,
    pub request: GenerationRequest,
}

/// What `finish_generation` did with a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Content stored and history updated.
    Loaded,
    /// Error recorded; content stays unset.
    Failed,
    /// Result did not belong to the in-flight request.
    Stale,
}

/// All state of one learning session: input difficulty, the request in
/// flight, fetched content, quiz progress, history and theme flag.
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub difficulty: Difficulty,
    pub error: Option<String>,
    pub content: Option<ContentPayload>,
    pub quiz: QuizState,
    pub history: History,
    pub dark_mode: bool,
    in_flight: Option<u64>,
    next_request_id: u64,
}

impl Session {
    pub fn new(history: History, dark_mode: bool) -> Self {
        Self {
            history,
            dark_mode,
            ..Self::default()
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Validates input and enters the loading state.
    ///
    /// Blank input sets the visible error and leaves everything else alone.
    /// A second submission while one is outstanding is refused.
    pub fn begin_generation(&mut self, skill: &str) -> Result<PendingGeneration, SessionError> {
        if self.is_loading() {
            return Err(SessionError::Busy);
        }
        let Some(request) = GenerationRequest::new(skill, self.difficulty) else {
            self.error = Some(EMPTY_SKILL_MESSAGE.to_string());
            return Err(SessionError::EmptySkill);
        };

        self.next_request_id += 1;
        let id = self.next_request_id;
        self.in_flight = Some(id);
        self.error = None;
        self.content = None;
        self.quiz.reset();

        tracing::debug!(id, skill = %request.skill, difficulty = %request.difficulty, "generation started");
        Ok(PendingGeneration { id, request })
    }

    /// Applies the outcome of request `id`, stamping successful content with
    /// `received_at` and prepending it to history.
    pub fn finish_generation(
        &mut self,
        id: u64,
        result: Result<ContentPayload, ClientError>,
        received_at: DateTime<Utc>,
    ) -> Completion {
        if self.in_flight != Some(id) {
            tracing::debug!(id, "dropping stale generation result");
            return Completion::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(mut payload) => {
                payload.searched_at = Some(received_at);
                self.history.push_front(payload.clone());
                self.content = Some(payload);
                self.quiz.reset();
                Completion::Loaded
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "generation failed");
                self.error = Some(err.user_message());
                Completion::Failed
            }
        }
    }

    /// Runs a whole generation on the current thread.
    pub fn generate_with(
        &mut self,
        skill: &str,
        client: &dyn ContentClient,
    ) -> Result<Completion, SessionError> {
        let pending = self.begin_generation(skill)?;
        let result = client.generate(&pending.request);
        Ok(self.finish_generation(pending.id, result, Utc::now()))
    }

    /// Shows a history entry without refetching. Out of range, or while a
    /// generation is outstanding, is a no-op.
    pub fn load_from_history(&mut self, index: usize) -> bool {
        if self.is_loading() {
            return false;
        }
        let Some(entry) = self.history.get(index) else {
            return false;
        };
        self.content = Some(entry.clone());
        self.quiz.reset();
        true
    }

    pub fn select_answer(&mut self, question: usize, option: usize) -> bool {
        self.quiz.select(question, option)
    }

    pub fn question_count(&self) -> usize {
        self.content.as_ref().map_or(0, |c| c.mcqs.len())
    }

    /// True while the quiz is open and every question has an answer.
    pub fn can_submit_quiz(&self) -> bool {
        !self.quiz.submitted && self.quiz.answered_all(self.question_count())
    }

    pub fn submit_quiz(&mut self) -> Option<u8> {
        let content = self.content.as_ref()?;
        self.quiz.submit(&content.mcqs)
    }

    pub fn reset_quiz(&mut self) {
        self.quiz.reset();
    }

    pub fn question_status(&self, index: usize) -> QuestionStatus {
        match self.content.as_ref().and_then(|c| c.mcqs.get(index)) {
            Some(mcq) => self.quiz.status(index, mcq),
            None => QuestionStatus::Unanswered,
        }
    }

    pub fn score_band(&self) -> Option<ScoreBand> {
        self.quiz.band()
    }

    pub fn toggle_theme(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::content::{ContentMeta, Mcq};

    /// Echoes the request back as content, or fails with a fixed error.
    struct FakeClient {
        calls: Mutex<Vec<GenerationRequest>>,
        fail_with: Option<ClientError>,
    }

    impl FakeClient {
        fn ok() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_with: None,
            }
        }

        fn failing(err: ClientError) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_with: Some(err),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl ContentClient for FakeClient {
        fn generate(&self, request: &GenerationRequest) -> Result<ContentPayload, ClientError> {
            self.calls.lock().unwrap().push(request.clone());
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            Ok(payload(&request.skill, request.difficulty))
        }
    }

    fn payload(skill: &str, difficulty: Difficulty) -> ContentPayload {
        ContentPayload {
            meta: ContentMeta {
                skill: Some(skill.to_string()),
                difficulty: Some(difficulty.as_str().to_string()),
                ..ContentMeta::default()
            },
            micro_lessons: vec!["lesson".to_string()],
            mcqs: vec![
                Mcq {
                    question: "q0".to_string(),
                    options: vec!["a".to_string(), "b".to_string()],
                    answer: 0,
                },
                Mcq {
                    question: "q1".to_string(),
                    options: vec!["a".to_string(), "b".to_string()],
                    answer: 1,
                },
            ],
            ..ContentPayload::default()
        }
    }

    #[test]
    fn successful_generation_sets_content_and_history() {
        let client = FakeClient::ok();
        let mut session = Session::default();
        session.difficulty = Difficulty::Intermediate;

        let done = session.generate_with("  Python ", &client).unwrap();
        assert_eq!(done, Completion::Loaded);
        assert!(!session.is_loading());

        let content = session.content.as_ref().unwrap();
        assert_eq!(content.meta.skill.as_deref(), Some("Python"));
        assert!(content.searched_at.is_some());
        assert_eq!(session.history.len(), 1);
        assert_eq!(session.history.get(0), Some(content));

        let sent = client.calls.lock().unwrap();
        assert_eq!(sent[0].skill, "Python");
        assert_eq!(sent[0].difficulty, Difficulty::Intermediate);
    }

    #[test]
    fn blank_skill_never_reaches_the_client() {
        let client = FakeClient::ok();
        let mut session = Session::default();

        let err = session.generate_with("   ", &client).unwrap_err();
        assert_eq!(err, SessionError::EmptySkill);
        assert_eq!(session.error.as_deref(), Some(EMPTY_SKILL_MESSAGE));
        assert_eq!(client.call_count(), 0);
        assert!(!session.is_loading());
    }

    #[test]
    fn blank_skill_keeps_existing_content() {
        let client = FakeClient::ok();
        let mut session = Session::default();
        session.generate_with("rust", &client).unwrap();

        let _ = session.begin_generation("");
        assert!(session.content.is_some());
    }

    #[test]
    fn remote_error_is_surfaced_and_content_unset() {
        let client = FakeClient::failing(ClientError::Remote("Skill is required".to_string()));
        let mut session = Session::default();
        session.generate_with("rust", &FakeClient::ok()).unwrap();

        let done = session.generate_with("go", &client).unwrap();
        assert_eq!(done, Completion::Failed);
        assert_eq!(session.error.as_deref(), Some("Skill is required"));
        assert!(session.content.is_none());
        assert!(!session.is_loading());
        assert_eq!(session.history.len(), 1);
    }

    #[test]
    fn begin_clears_previous_error_content_and_quiz() {
        let mut session = Session::default();
        session.generate_with("rust", &FakeClient::ok()).unwrap();
        session.select_answer(0, 0);
        session.error = Some("old".to_string());

        session.begin_generation("go").unwrap();
        assert!(session.is_loading());
        assert!(session.error.is_none());
        assert!(session.content.is_none());
        assert_eq!(session.quiz, QuizState::default());
    }

    #[test]
    fn second_submit_while_loading_is_refused() {
        let mut session = Session::default();
        let first = session.begin_generation("rust").unwrap();
        assert_eq!(session.begin_generation("go"), Err(SessionError::Busy));

        let done = session.finish_generation(
            first.id,
            Ok(payload("rust", Difficulty::Beginner)),
            Utc::now(),
        );
        assert_eq!(done, Completion::Loaded);
        assert!(session.begin_generation("go").is_ok());
    }

    #[test]
    fn stale_results_are_ignored() {
        let mut session = Session::default();
        let first = session.begin_generation("rust").unwrap();
        session.finish_generation(first.id, Err(ClientError::Transport("x".into())), Utc::now());

        let second = session.begin_generation("go").unwrap();
        let done = session.finish_generation(
            first.id,
            Ok(payload("rust", Difficulty::Beginner)),
            Utc::now(),
        );
        assert_eq!(done, Completion::Stale);
        assert!(session.is_loading());
        assert!(session.history.is_empty());

        session.finish_generation(second.id, Ok(payload("go", Difficulty::Beginner)), Utc::now());
        assert_eq!(session.content.as_ref().unwrap().skill_label(), "go");
    }

    #[test]
    fn receipt_time_is_stamped_by_the_client() {
        let mut session = Session::default();
        let pending = session.begin_generation("rust").unwrap();
        let at = "2025-01-02T03:04:05Z".parse::<DateTime<Utc>>().unwrap();
        session.finish_generation(pending.id, Ok(payload("rust", Difficulty::Beginner)), at);
        assert_eq!(session.content.unwrap().searched_at, Some(at));
    }

    #[test]
    fn load_from_history_resets_quiz_without_fetching() {
        let client = FakeClient::ok();
        let mut session = Session::default();
        session.generate_with("rust", &client).unwrap();
        session.generate_with("go", &client).unwrap();
        session.select_answer(0, 0);
        session.select_answer(1, 1);
        session.submit_quiz();

        assert!(session.load_from_history(1));
        assert_eq!(client.call_count(), 2);
        assert_eq!(session.content.as_ref().unwrap().skill_label(), "rust");
        assert_eq!(session.quiz, QuizState::default());
    }

    #[test]
    fn load_from_history_out_of_range_is_noop() {
        let mut session = Session::default();
        session.generate_with("rust", &FakeClient::ok()).unwrap();
        session.select_answer(0, 1);

        assert!(!session.load_from_history(5));
        assert_eq!(session.quiz.answers.len(), 1);
    }

    #[test]
    fn history_is_locked_while_loading() {
        let mut session = Session::default();
        session.generate_with("rust", &FakeClient::ok()).unwrap();
        let pending = session.begin_generation("go").unwrap();

        assert!(!session.load_from_history(0));
        assert!(session.content.is_none());
        session.select_answer(0, 1);

        let done = session.finish_generation(
            pending.id,
            Ok(payload("go", Difficulty::Beginner)),
            Utc::now(),
        );
        assert_eq!(done, Completion::Loaded);
        assert_eq!(session.content.as_ref().unwrap().skill_label(), "go");
        assert_eq!(session.quiz, QuizState::default());
    }

    #[test]
    fn quiz_flow_through_session() {
        let mut session = Session::default();
        session.generate_with("rust", &FakeClient::ok()).unwrap();

        session.select_answer(0, 0);
        assert!(!session.can_submit_quiz());
        session.select_answer(1, 0);
        assert!(session.can_submit_quiz());

        assert_eq!(session.submit_quiz(), Some(50));
        assert!(!session.can_submit_quiz());
        assert_eq!(session.question_status(0), QuestionStatus::Correct);
        assert_eq!(session.question_status(1), QuestionStatus::Incorrect);
        assert_eq!(session.score_band(), Some(ScoreBand::KeepPracticing));

        assert!(!session.select_answer(1, 1));

        session.reset_quiz();
        assert!(!session.quiz.submitted);
        assert!(session.quiz.answers.is_empty());
        assert_eq!(session.quiz.score, 0);
        assert!(session.content.is_some());
    }

    #[test]
    fn submit_without_content_or_questions() {
        let mut session = Session::default();
        assert_eq!(session.submit_quiz(), None);

        session.content = Some(ContentPayload::default());
        assert!(!session.can_submit_quiz());
        assert_eq!(session.submit_quiz(), None);
        assert!(!session.quiz.submitted);
    }

    #[test]
    fn toggle_theme_flips() {
        let mut session = Session::new(History::new(), true);
        assert!(!session.toggle_theme());
        assert!(session.toggle_theme());
    }
}
