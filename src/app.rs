use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent};

use crate::gemini::GenerationError;
use crate::models::{QuizQuestion, UserAnswer, OPTION_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Loading,
    Quiz,
    Feedback,
    Results,
}

/// A generation request the event loop should dispatch. Produced only by
/// `App::start`, which also moves the machine into `Loading`, so at most
/// one of these can be outstanding at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRequest {
    pub missed_ids: Vec<String>,
}

pub struct App {
    pub screen: Screen,
    pub questions: Vec<QuizQuestion>,
    pub current_index: usize,
    pub answers: Vec<UserAnswer>,
    pub missed_question_ids: HashSet<String>,
    pub last_error: Option<String>,
    pub selected_option: usize,
    pub loading_tick: usize,
    pub exit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            screen: Screen::Welcome,
            questions: Vec::new(),
            current_index: 0,
            answers: Vec::new(),
            missed_question_ids: HashSet::new(),
            last_error: None,
            selected_option: 0,
            loading_tick: 0,
            exit: false,
        }
    }

    /// Begins a new quiz from `Welcome` or `Results`. Returns the request
    /// the caller must hand to the question source, or `None` when the
    /// transition is not allowed (notably while a request is already in
    /// flight).
    pub fn start(&mut self) -> Option<QuestionRequest> {
        match self.screen {
            Screen::Welcome | Screen::Results => {
                self.last_error = None;
                self.screen = Screen::Loading;
                self.loading_tick = 0;

                let mut missed_ids: Vec<String> =
                    self.missed_question_ids.iter().cloned().collect();
                missed_ids.sort();
                Some(QuestionRequest { missed_ids })
            }
            _ => None,
        }
    }

    /// Applies the outcome of the in-flight generation request. Anything
    /// delivered while the machine is not `Loading` is dropped.
    pub fn finish_generation(&mut self, result: Result<Vec<QuizQuestion>, GenerationError>) {
        if self.screen != Screen::Loading {
            return;
        }

        match result {
            Ok(batch) => {
                self.questions = batch;
                self.reset_progress();
                self.screen = Screen::Quiz;
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                self.screen = Screen::Welcome;
            }
        }
    }

    /// Records the answer for the current question and shows feedback.
    /// Calling this with no active question or an out-of-range option is a
    /// presentation bug and faults loudly.
    pub fn answer(&mut self, selected_option_index: usize) {
        if self.screen != Screen::Quiz {
            return;
        }

        let question = self
            .questions
            .get(self.current_index)
            .expect("answer with no active question");
        assert!(
            selected_option_index < OPTION_COUNT,
            "answer option {} out of range",
            selected_option_index
        );

        let is_correct = selected_option_index == question.correct_answer_index;
        if !is_correct {
            self.missed_question_ids.insert(question.id.clone());
        }

        self.answers.push(UserAnswer {
            question_id: question.id.clone(),
            selected_option_index,
            is_correct,
        });
        self.screen = Screen::Feedback;
    }

    /// Leaves the feedback screen: next question, or results after the last.
    pub fn advance(&mut self) {
        if self.screen != Screen::Feedback {
            return;
        }

        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            self.selected_option = 0;
            self.screen = Screen::Quiz;
        } else {
            self.screen = Screen::Results;
        }
    }

    /// Re-runs the questions answered incorrectly this round, in their
    /// original order. Silent no-op when everything was correct.
    /// `missed_question_ids` is left as-is; it only ever grows.
    pub fn review_missed(&mut self) {
        if self.screen != Screen::Results {
            return;
        }

        let missed: Vec<QuizQuestion> =
            self.missed_questions().into_iter().cloned().collect();
        if missed.is_empty() {
            return;
        }

        self.questions = missed;
        self.reset_progress();
        self.screen = Screen::Quiz;
    }

    fn reset_progress(&mut self) {
        self.current_index = 0;
        self.answers.clear();
        self.selected_option = 0;
    }

    pub fn select_next_option(&mut self) {
        self.selected_option = (self.selected_option + 1) % OPTION_COUNT;
    }

    pub fn select_previous_option(&mut self) {
        self.selected_option = (self.selected_option + OPTION_COUNT - 1) % OPTION_COUNT;
    }

    pub fn tick(&mut self) {
        if self.screen == Screen::Loading {
            self.loading_tick = self.loading_tick.wrapping_add(1);
        }
    }

    // --- display queries (idempotent over immutable state) ---

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current_index)
    }

    pub fn current_answer(&self) -> Option<&UserAnswer> {
        self.answers.last()
    }

    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }

    /// Percentage score, rounded; 0 when nothing was answered.
    pub fn score_percent(&self) -> u32 {
        if self.answers.is_empty() {
            return 0;
        }
        (self.correct_count() as f64 * 100.0 / self.answers.len() as f64).round() as u32
    }

    pub fn has_incorrect_answers(&self) -> bool {
        self.answers.iter().any(|a| !a.is_correct)
    }

    /// The questions answered incorrectly this round, in appearance order.
    pub fn missed_questions(&self) -> Vec<&QuizQuestion> {
        self.answers
            .iter()
            .filter(|a| !a.is_correct)
            .filter_map(|a| self.questions.iter().find(|q| q.id == a.question_id))
            .collect()
    }

    // --- intent layer ---

    /// Maps a key event onto the transition it means for the current
    /// screen. Returns the generation request to dispatch, if the key
    /// started one.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<QuestionRequest> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.exit = true;
                return None;
            }
            _ => {}
        }

        match self.screen {
            Screen::Welcome => match key.code {
                KeyCode::Enter => return self.start(),
                _ => {}
            },
            Screen::Loading => {}
            Screen::Quiz => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.select_previous_option(),
                KeyCode::Down | KeyCode::Char('j') => self.select_next_option(),
                KeyCode::Enter => self.answer(self.selected_option),
                KeyCode::Char(c @ '1'..='4') => {
                    self.answer(c as usize - '1' as usize);
                }
                _ => {}
            },
            Screen::Feedback => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.advance(),
                _ => {}
            },
            Screen::Results => match key.code {
                KeyCode::Char('r') => return self.start(),
                KeyCode::Char('m') => self.review_missed(),
                _ => {}
            },
        }

        None
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod app_tests;
