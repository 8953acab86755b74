//! The lesson state: one card per submitted word, mutated in place as
//! images and regenerations resolve.
//!
//! All transitions are pure methods on [`Lesson`]; the async drivers in
//! `lib.rs` only fetch and then apply. In-flight fetches are never
//! cancelled. Instead every card slot carries a generation counter: a fetch
//! remembers the generation it was issued under, and its result is
//! discarded if the slot has moved on (regeneration, restart). That turns
//! the lost-update race into a well-defined discard.

use lesson_utils::WordContext;

/// One study card. The context is immutable between regenerations; the
/// image and the two flags are the mutable parts.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct WordCard {
    pub context: WordContext,
    pub image_url: Option<String>,
    pub is_loading_image: bool,
    pub is_regenerating: bool,
}

impl WordCard {
    /// The short meaning shown in games: the gloss, or the definition when
    /// the service left the gloss empty.
    pub fn short_meaning(&self) -> &str {
        if self.context.gloss.trim().is_empty() {
            &self.context.definition
        } else {
            &self.context.gloss
        }
    }
}

pub struct Lesson {
    cards: Vec<WordCard>,
    generations: Vec<u64>,
}

impl Lesson {
    /// Start a lesson from freshly generated contexts (already in submitted
    /// word order). Every card begins with its image pending.
    pub fn new(contexts: Vec<WordContext>) -> Self {
        let cards = contexts
            .into_iter()
            .map(|context| WordCard {
                context,
                image_url: None,
                is_loading_image: true,
                is_regenerating: false,
            })
            .collect::<Vec<_>>();
        let generations = vec![0; cards.len()];
        Self { cards, generations }
    }

    pub fn cards(&self) -> &[WordCard] {
        &self.cards
    }

    pub fn card_generation(&self, index: usize) -> Option<u64> {
        self.generations.get(index).copied()
    }

    /// Apply a resolved image fetch to its slot. Returns false (and changes
    /// nothing) if the slot's generation has moved on since the fetch was
    /// issued. A `None` image still clears the loading flag: the card is
    /// done loading, there is just nothing to show.
    pub fn apply_image(
        &mut self,
        index: usize,
        generation: u64,
        image_url: Option<String>,
    ) -> bool {
        if self.card_generation(index) != Some(generation) {
            return false;
        }
        let card = &mut self.cards[index];
        card.image_url = image_url;
        card.is_loading_image = false;
        true
    }

    /// Mark a card as regenerating and advance its generation, invalidating
    /// any fetch still in flight for the old content. Returns the new
    /// generation for the regeneration's own fetches, or `None` if the
    /// index is out of range or a regeneration is already running.
    pub fn begin_regeneration(&mut self, index: usize) -> Option<u64> {
        let card = self.cards.get_mut(index)?;
        if card.is_regenerating {
            return None;
        }
        card.is_regenerating = true;
        self.generations[index] += 1;
        Some(self.generations[index])
    }

    /// Replace a card's context with its regenerated version. The card
    /// moves on to loading its new image. Returns false on a stale
    /// generation.
    pub fn apply_regeneration(
        &mut self,
        index: usize,
        generation: u64,
        context: WordContext,
    ) -> bool {
        if self.card_generation(index) != Some(generation) {
            return false;
        }
        let card = &mut self.cards[index];
        card.context = context;
        card.image_url = None;
        card.is_loading_image = true;
        card.is_regenerating = false;
        true
    }

    /// A regeneration failed before producing a context: clear the
    /// transient flags and keep the prior content untouched.
    pub fn fail_regeneration(&mut self, index: usize, generation: u64) {
        if self.card_generation(index) != Some(generation) {
            return;
        }
        let card = &mut self.cards[index];
        card.is_regenerating = false;
        card.is_loading_image = false;
    }
}
