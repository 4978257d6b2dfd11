use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use chrono::Utc;

use skillmate::client::ContentClient;
use skillmate::config::Config;
use skillmate::content::ContentPayload;
use skillmate::session::SessionError;
use skillmate::session::controller::Completion;
use skillmate::session::Session;
use skillmate::store::JsonStore;

use crate::event::AppEvent;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Search,
    Content,
    History,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Lessons,
    Quiz,
    Exercises,
    Takeaways,
    Videos,
}

impl Section {
    pub fn title(self) -> &'static str {
        match self {
            Section::Lessons => "Micro Lessons",
            Section::Quiz => "Test Your Knowledge",
            Section::Exercises => "Practical Exercises",
            Section::Takeaways => "Key Takeaways",
            Section::Videos => "Video Resources",
        }
    }

    pub fn tab_label(self) -> &'static str {
        match self {
            Section::Lessons => "Lessons",
            Section::Quiz => "Quiz",
            Section::Exercises => "Exercises",
            Section::Takeaways => "Takeaways",
            Section::Videos => "Videos",
        }
    }

    /// Sections with something to show for `content`. Lessons always appear.
    pub fn available(content: &ContentPayload) -> Vec<Section> {
        let mut sections = vec![Section::Lessons];
        if content.has_quiz() {
            sections.push(Section::Quiz);
        }
        if !content.exercises.is_empty() {
            sections.push(Section::Exercises);
        }
        if !content.key_takeaways.is_empty() {
            sections.push(Section::Takeaways);
        }
        if !content.videos.is_empty() {
            sections.push(Section::Videos);
        }
        sections
    }
}

pub struct App {
    pub screen: AppScreen,
    pub session: Session,
    pub skill_input: LineInput,
    pub section: Section,
    pub selected_question: usize,
    pub history_selected: usize,
    pub scroll: u16,
    /// One-line notice that is not an error (hints, save failures).
    pub notice: Option<String>,
    pub theme: Theme,
    pub config: Config,
    pub tick: u64,
    pub should_quit: bool,
    store: Option<JsonStore>,
    client: Arc<dyn ContentClient>,
    events: Sender<AppEvent>,
}

impl App {
    pub fn new(
        config: Config,
        store: Option<JsonStore>,
        client: Arc<dyn ContentClient>,
        events: Sender<AppEvent>,
    ) -> Self {
        let stored = store.as_ref().map(JsonStore::load).unwrap_or_default();
        let mut session = Session::new(stored.history, stored.dark_mode);
        session.difficulty = config.default_difficulty;
        let theme = Theme::for_mode(&config, session.dark_mode);

        Self {
            screen: AppScreen::Search,
            session,
            skill_input: LineInput::new(""),
            section: Section::Lessons,
            selected_question: 0,
            history_selected: 0,
            scroll: 0,
            notice: None,
            theme,
            config,
            tick: 0,
            should_quit: false,
            store,
            client,
            events,
        }
    }

    /// Starts a generation for the current input on a worker thread.
    pub fn submit(&mut self) {
        self.notice = None;
        let pending = match self.session.begin_generation(self.skill_input.value()) {
            Ok(pending) => pending,
            Err(SessionError::EmptySkill) => return,
            Err(err @ SessionError::Busy) => {
                self.notice = Some(err.to_string());
                return;
            }
        };

        let client = Arc::clone(&self.client);
        let tx = self.events.clone();
        thread::spawn(move || {
            let result = client.generate(&pending.request);
            // Receiver gone means the app is shutting down.
            let _ = tx.send(AppEvent::Generated {
                id: pending.id,
                result,
            });
        });
    }

    pub fn on_generated(
        &mut self,
        id: u64,
        result: Result<ContentPayload, skillmate::client::ClientError>,
    ) {
        match self.session.finish_generation(id, result, Utc::now()) {
            Completion::Loaded => {
                self.show_content();
                self.persist();
            }
            Completion::Failed => self.screen = AppScreen::Search,
            Completion::Stale => {}
        }
    }

    fn show_content(&mut self) {
        self.screen = AppScreen::Content;
        self.section = Section::Lessons;
        self.selected_question = 0;
        self.scroll = 0;
    }

    pub fn open_history(&mut self) {
        if self.session.load_from_history(self.history_selected) {
            self.notice = None;
            self.show_content();
        }
    }

    pub fn go_to_history(&mut self) {
        self.history_selected = 0;
        self.screen = AppScreen::History;
    }

    pub fn go_to_search(&mut self) {
        self.screen = AppScreen::Search;
    }

    pub fn history_next(&mut self) {
        let len = self.session.history.len();
        if len > 0 {
            self.history_selected = (self.history_selected + 1).min(len - 1);
        }
    }

    pub fn history_prev(&mut self) {
        self.history_selected = self.history_selected.saturating_sub(1);
    }

    pub fn toggle_theme(&mut self) {
        let dark = self.session.toggle_theme();
        self.theme = Theme::for_mode(&self.config, dark);
        self.persist();
    }

    pub fn cycle_difficulty(&mut self, forward: bool) {
        if self.session.is_loading() {
            return;
        }
        self.session.difficulty = if forward {
            self.session.difficulty.next()
        } else {
            self.session.difficulty.prev()
        };
    }

    pub fn sections(&self) -> Vec<Section> {
        self.session
            .content
            .as_ref()
            .map(Section::available)
            .unwrap_or_default()
    }

    pub fn next_section(&mut self) {
        self.step_section(1);
    }

    pub fn prev_section(&mut self) {
        self.step_section(-1);
    }

    fn step_section(&mut self, delta: isize) {
        let sections = self.sections();
        if sections.is_empty() {
            return;
        }
        let idx = sections.iter().position(|s| *s == self.section).unwrap_or(0) as isize;
        let len = sections.len() as isize;
        self.section = sections[((idx + delta).rem_euclid(len)) as usize];
        self.scroll = 0;
        self.notice = None;
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn next_question(&mut self) {
        let count = self.session.question_count();
        if count > 0 {
            self.selected_question = (self.selected_question + 1).min(count - 1);
        }
    }

    pub fn prev_question(&mut self) {
        self.selected_question = self.selected_question.saturating_sub(1);
    }

    /// Picks `option` for the highlighted question, then moves on to the
    /// next one.
    pub fn choose_option(&mut self, option: usize) {
        let Some(mcq) = self
            .session
            .content
            .as_ref()
            .and_then(|c| c.mcqs.get(self.selected_question))
        else {
            return;
        };
        if option >= mcq.options.len() {
            return;
        }
        if self.session.select_answer(self.selected_question, option) {
            self.next_question();
        }
    }

    pub fn submit_quiz(&mut self) {
        if self.session.quiz.submitted {
            return;
        }
        if !self.session.can_submit_quiz() {
            self.notice = Some("Answer every question before submitting".to_string());
            return;
        }
        if let Some(score) = self.session.submit_quiz() {
            tracing::info!(score, "quiz submitted");
            self.notice = None;
        }
    }

    pub fn retry_quiz(&mut self) {
        self.session.reset_quiz();
        self.selected_question = 0;
        self.notice = None;
    }

    fn persist(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save(&self.session.history, self.session.dark_mode) {
            tracing::error!(error = %e, "failed to save preferences");
            self.notice = Some(format!("Could not save history: {e}"));
        }
    }
}
