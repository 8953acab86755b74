#![deny(clippy::string_slice)]

mod client;
pub mod flashcards;
pub mod lesson;
pub mod matching;
pub mod quiz;
mod utils;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::LazyLock;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use lesson_utils::{Course, Language, VocabularyLevel};
use wasm_bindgen::prelude::*;

use crate::lesson::{Lesson, WordCard};

// putting this inside LOGGER prevents us from accidentally initializing the logger more than once
static LOGGER: LazyLock<()> = LazyLock::new(|| {
    utils::set_panic_hook();

    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Logging initialized");
});

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn get_available_courses() -> Vec<Course> {
    lesson_utils::COURSES.to_vec()
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn get_vocabulary_levels() -> Vec<VocabularyLevel> {
    lesson_utils::VOCABULARY_LEVELS.to_vec()
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn get_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

struct AppState {
    course: Course,
    level: VocabularyLevel,
    lesson: Option<Lesson>,
    /// Bumped whenever a lesson is installed. Results from fetches issued
    /// under an older epoch are discarded on arrival.
    lesson_epoch: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            course: Course {
                native_language: Language::English,
                target_language: Language::English,
            },
            level: VocabularyLevel::default(),
            lesson: None,
            lesson_epoch: 0,
        }
    }
}

#[derive(Default)]
struct Listeners {
    next_key: u32,
    callbacks: Vec<(u32, js_sys::Function)>,
}

fn notify_listeners(listeners: &RefCell<Listeners>) {
    // Clone the callbacks out first: a callback may subscribe or
    // unsubscribe reentrantly.
    let callbacks: Vec<js_sys::Function> = listeners
        .borrow()
        .callbacks
        .iter()
        .map(|(_, callback)| callback.clone())
        .collect();
    for callback in callbacks {
        let _ = callback.call0(&JsValue::null());
    }
}

/// The application handle exported to JS: course and level settings plus
/// the current lesson, with a change-notification callback registry.
///
/// Note: we never hold a borrow of the state across an `.await`. By
/// avoiding this, we guarantee the absence of "already borrowed" panics.
#[wasm_bindgen]
pub struct LexiApp {
    state: Rc<RefCell<AppState>>,
    listeners: Rc<RefCell<Listeners>>,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl LexiApp {
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new() -> LexiApp {
        // used to only initialize the logger once
        LazyLock::force(&LOGGER);

        LexiApp {
            state: Rc::new(RefCell::new(AppState::default())),
            listeners: Rc::new(RefCell::new(Listeners::default())),
        }
    }

    /// Register a callback invoked after every state change. Returns a key
    /// for `unsubscribe`.
    pub fn subscribe(&self, callback: js_sys::Function) -> u32 {
        let mut listeners = self.listeners.borrow_mut();
        let key = listeners.next_key;
        listeners.next_key += 1;
        listeners.callbacks.push((key, callback));
        key
    }

    pub fn unsubscribe(&self, key: u32) {
        self.listeners
            .borrow_mut()
            .callbacks
            .retain(|(listener_key, _)| *listener_key != key);
    }

    pub fn set_course(&self, course: Course) {
        self.state.borrow_mut().course = course;
        self.notify();
    }

    pub fn course(&self) -> Course {
        self.state.borrow().course
    }

    pub fn set_level(&self, level: VocabularyLevel) {
        self.state.borrow_mut().level = level;
        self.notify();
    }

    /// Snap a raw proficiency-slider value to the closest level band.
    pub fn set_level_from_words(&self, words: u32) {
        self.set_level(VocabularyLevel::closest(words));
    }

    pub fn level(&self) -> VocabularyLevel {
        self.state.borrow().level
    }

    pub fn has_lesson(&self) -> bool {
        self.state.borrow().lesson.is_some()
    }

    pub fn lesson_cards(&self) -> Vec<WordCard> {
        self.state
            .borrow()
            .lesson
            .as_ref()
            .map(|lesson| lesson.cards().to_vec())
            .unwrap_or_default()
    }

    pub fn lesson_words(&self) -> Vec<String> {
        self.state
            .borrow()
            .lesson
            .as_ref()
            .map(|lesson| {
                lesson
                    .cards()
                    .iter()
                    .map(|card| card.context.word.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Start a lesson from the raw word-input text. Awaits the text
    /// contexts (a hard failure aborts, leaving any previous lesson
    /// intact), then resolves per-word images concurrently in the
    /// background.
    pub async fn start_lesson(&self, words_text: String) -> Result<(), JsValue> {
        let words = lesson_utils::text::parse_word_list(&words_text);
        if words.is_empty() {
            return Err(JsValue::from_str("No words were submitted"));
        }

        let (level, course) = {
            let state = self.state.borrow();
            (state.level, state.course)
        };

        let contexts = client::fetch_contexts(&words, level, course).await?;

        let (epoch, prompts) = {
            let mut state = self.state.borrow_mut();
            state.lesson_epoch += 1;
            let lesson = Lesson::new(contexts);
            let prompts: Vec<(usize, u64, String)> = lesson
                .cards()
                .iter()
                .enumerate()
                .map(|(index, card)| {
                    let generation = lesson
                        .card_generation(index)
                        .expect("freshly built lesson has a generation per card");
                    (index, generation, card.context.image_prompt.clone())
                })
                .collect();
            state.lesson = Some(lesson);
            (state.lesson_epoch, prompts)
        };
        self.notify();

        self.spawn_image_fetches(epoch, prompts);
        Ok(())
    }

    /// Regenerate a single card: new context, then a new image, merged
    /// positionally. Failures clear the card's transient flags and leave
    /// its prior content untouched; there is no user-visible error beyond
    /// that, so this never rejects.
    pub async fn regenerate_word(&self, index: usize) {
        let request = {
            let mut state = self.state.borrow_mut();
            let epoch = state.lesson_epoch;
            let (level, course) = (state.level, state.course);
            state.lesson.as_mut().and_then(|lesson| {
                let generation = lesson.begin_regeneration(index)?;
                let word = lesson.cards()[index].context.word.clone();
                Some((word, level, course, epoch, generation))
            })
        };
        let Some((word, level, course, epoch, generation)) = request else {
            return;
        };
        self.notify();

        let context = match client::fetch_single_context(&word, level, course).await {
            Ok(context) => context,
            Err(e) => {
                log::warn!("Regeneration failed for \"{word}\": {e}");
                {
                    let mut state = self.state.borrow_mut();
                    if state.lesson_epoch == epoch {
                        if let Some(lesson) = state.lesson.as_mut() {
                            lesson.fail_regeneration(index, generation);
                        }
                    }
                }
                self.notify();
                return;
            }
        };

        let image_prompt = context.image_prompt.clone();
        let applied = {
            let mut state = self.state.borrow_mut();
            state.lesson_epoch == epoch
                && state
                    .lesson
                    .as_mut()
                    .is_some_and(|lesson| lesson.apply_regeneration(index, generation, context))
        };
        if !applied {
            log::info!("Discarding stale regeneration result for card {index}");
            return;
        }
        self.notify();

        let image_url = client::fetch_image(&image_prompt).await;
        let applied = {
            let mut state = self.state.borrow_mut();
            state.lesson_epoch == epoch
                && state
                    .lesson
                    .as_mut()
                    .is_some_and(|lesson| lesson.apply_image(index, generation, image_url))
        };
        if applied {
            self.notify();
        } else {
            log::info!("Discarding stale image result for card {index}");
        }
    }

    fn notify(&self) {
        notify_listeners(&self.listeners);
    }
}

impl Default for LexiApp {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiApp {
    /// Launch one image fetch per card. The fetches run concurrently and
    /// each result lands in its own slot as it arrives; slots that have
    /// moved on (restart, regeneration) discard the result.
    fn spawn_image_fetches(&self, epoch: u64, prompts: Vec<(usize, u64, String)>) {
        let state = Rc::clone(&self.state);
        let listeners = Rc::clone(&self.listeners);
        wasm_bindgen_futures::spawn_local(async move {
            let mut fetches = prompts
                .into_iter()
                .map(|(index, generation, prompt)| async move {
                    let image_url = client::fetch_image(&prompt).await;
                    (index, generation, image_url)
                })
                .collect::<FuturesUnordered<_>>();

            while let Some((index, generation, image_url)) = fetches.next().await {
                let applied = {
                    let mut state = state.borrow_mut();
                    state.lesson_epoch == epoch
                        && state
                            .lesson
                            .as_mut()
                            .is_some_and(|lesson| lesson.apply_image(index, generation, image_url))
                };
                if applied {
                    notify_listeners(&listeners);
                } else {
                    log::info!("Discarding stale image result for card {index}");
                }
            }
        });
    }
}
