//! The multiple-choice quiz: a fresh AI-generated question set per
//! play-through, scored locally.

use std::cell::{Cell, RefCell};

use lesson_utils::{Course, QuizQuestion, VocabularyLevel};
use wasm_bindgen::prelude::*;

use crate::client;

/// The pure quiz state machine: Active(question i of N) → Finished.
#[derive(Clone, Debug)]
pub struct QuizCore {
    questions: Vec<QuizQuestion>,
    current: usize,
    score: u32,
    selection: Option<String>,
    finished: bool,
}

impl QuizCore {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self {
            questions,
            current: 0,
            score: 0,
            selection: None,
            finished: false,
        }
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.finished {
            None
        } else {
            self.questions.get(self.current)
        }
    }

    /// Answer the current question. The first selection locks it; repeat
    /// selections (and selections on a finished quiz) are rejected. The
    /// score moves only on an exact match with the correct answer.
    pub fn select_option(&mut self, option: &str) -> bool {
        if self.finished || self.selection.is_some() {
            return false;
        }
        let Some(question) = self.questions.get(self.current) else {
            return false;
        };
        if option == question.correct_answer {
            self.score += 1;
        }
        self.selection = Some(option.to_string());
        true
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// Move on after an answer. At the last question this finishes the
    /// quiz. Rejected until the current question has been answered.
    pub fn advance(&mut self) -> bool {
        if self.finished || self.selection.is_none() {
            return false;
        }
        self.selection = None;
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        } else {
            self.finished = true;
        }
        true
    }

    /// Swap in a fresh question set and reset score and position.
    pub fn replace_questions(&mut self, questions: Vec<QuizQuestion>) {
        *self = QuizCore::new(questions);
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total(&self) -> u32 {
        self.questions.len() as u32
    }

    /// 1-based, for the "question i of N" display.
    pub fn question_number(&self) -> u32 {
        (self.current + 1).min(self.questions.len()) as u32
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// The JS-facing quiz handle. Fetches its question set on construction and
/// refetches (with a bumped variation seed) on "try new questions".
#[wasm_bindgen]
pub struct QuizRound {
    core: RefCell<QuizCore>,
    words: Vec<String>,
    level: VocabularyLevel,
    course: Course,
    variation: Cell<u32>,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl QuizRound {
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub async fn new(
        words: Vec<String>,
        level: VocabularyLevel,
        course: Course,
    ) -> Result<QuizRound, JsValue> {
        let questions = client::fetch_quiz(&words, level, course, 0).await?;
        Ok(QuizRound {
            core: RefCell::new(QuizCore::new(questions)),
            words,
            level,
            course,
            variation: Cell::new(0),
        })
    }

    /// Fetch a fresh set of questions for the same words and start over.
    /// On failure the current round is left untouched.
    pub async fn try_new_questions(&self) -> Result<(), JsValue> {
        let variation = self.variation.get() + 1;
        let questions = client::fetch_quiz(&self.words, self.level, self.course, variation).await?;
        self.variation.set(variation);
        self.core.borrow_mut().replace_questions(questions);
        Ok(())
    }

    pub fn select_option(&self, option: String) -> bool {
        self.core.borrow_mut().select_option(&option)
    }

    pub fn advance(&self) -> bool {
        self.core.borrow_mut().advance()
    }

    pub fn current_question(&self) -> Option<QuizQuestion> {
        self.core.borrow().current_question().cloned()
    }

    pub fn selection(&self) -> Option<String> {
        self.core.borrow().selection().map(str::to_string)
    }

    pub fn question_number(&self) -> u32 {
        self.core.borrow().question_number()
    }

    pub fn total(&self) -> u32 {
        self.core.borrow().total()
    }

    pub fn score(&self) -> u32 {
        self.core.borrow().score()
    }

    pub fn is_finished(&self) -> bool {
        self.core.borrow().is_finished()
    }

    pub fn variation_seed(&self) -> u32 {
        self.variation.get()
    }
}
