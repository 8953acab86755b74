//! Flip-card browsing over a shuffled copy of the lesson's words.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use wasm_bindgen::prelude::*;

use crate::lesson::WordCard;

/// Which content sits on the visible face before the flip.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum FlashcardOrientation {
    WordFirst,
    ImageFirst,
}

#[wasm_bindgen]
pub struct FlashcardDeck {
    cards: Vec<WordCard>,
    position: usize,
    revealed: bool,
    orientation: FlashcardOrientation,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl FlashcardDeck {
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new(cards: Vec<WordCard>, seed: u32) -> FlashcardDeck {
        let mut deck = FlashcardDeck {
            cards,
            position: 0,
            revealed: false,
            orientation: FlashcardOrientation::WordFirst,
        };
        deck.reshuffle(seed);
        deck
    }

    /// New random order, back at the first card, face down.
    pub fn reshuffle(&mut self, seed: u32) {
        self.cards.shuffle(&mut SmallRng::seed_from_u64(seed as u64));
        self.position = 0;
        self.revealed = false;
    }

    pub fn flip(&mut self) {
        if !self.cards.is_empty() {
            self.revealed = !self.revealed;
        }
    }

    pub fn next(&mut self) {
        if self.cards.is_empty() {
            return;
        }
        self.revealed = false;
        self.position = (self.position + 1) % self.cards.len();
    }

    pub fn previous(&mut self) {
        if self.cards.is_empty() {
            return;
        }
        self.revealed = false;
        self.position = (self.position + self.cards.len() - 1) % self.cards.len();
    }

    /// Switching orientation turns the card face down again.
    pub fn set_orientation(&mut self, orientation: FlashcardOrientation) {
        self.orientation = orientation;
        self.revealed = false;
    }

    pub fn orientation(&self) -> FlashcardOrientation {
        self.orientation
    }

    pub fn current(&self) -> Option<WordCard> {
        self.cards.get(self.position).cloned()
    }

    /// The short meaning for the image-first face (gloss, falling back to
    /// the definition).
    pub fn current_meaning(&self) -> Option<String> {
        self.cards
            .get(self.position)
            .map(|card| card.short_meaning().to_string())
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// 1-based position for the "i / N" display.
    pub fn position(&self) -> u32 {
        if self.cards.is_empty() {
            0
        } else {
            (self.position + 1) as u32
        }
    }

    pub fn len(&self) -> u32 {
        self.cards.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_utils::WordContext;

    fn word_card(word: &str) -> WordCard {
        WordCard {
            context: WordContext {
                word: word.to_string(),
                definition: format!("definition of {word}"),
                gloss: format!("gloss of {word}"),
                sentence: format!("A sentence with {word}."),
                dialogue: format!("A: {word}?\nB: {word}!"),
                image_prompt: format!("A picture of {word}"),
            },
            image_url: None,
            is_loading_image: false,
            is_regenerating: false,
        }
    }

    fn sample_deck() -> FlashcardDeck {
        FlashcardDeck::new(
            vec![word_card("run"), word_card("jump"), word_card("swim")],
            5,
        )
    }

    #[test]
    fn test_navigation_is_circular_and_resets_reveal() {
        let mut deck = sample_deck();
        assert_eq!(deck.len(), 3);
        assert_eq!(deck.position(), 1);

        deck.flip();
        assert!(deck.is_revealed());

        deck.next();
        assert_eq!(deck.position(), 2);
        assert!(!deck.is_revealed(), "moving on hides the answer");

        deck.next();
        deck.next();
        assert_eq!(deck.position(), 1, "next wraps past the last card");

        deck.previous();
        assert_eq!(deck.position(), 3, "previous wraps past the first card");
    }

    #[test]
    fn test_reshuffle_resets_position_and_keeps_cards() {
        let mut deck = sample_deck();
        deck.next();
        deck.flip();

        deck.reshuffle(11);
        assert_eq!(deck.position(), 1);
        assert!(!deck.is_revealed());
        assert_eq!(deck.len(), 3);

        let mut words: Vec<String> = Vec::new();
        for _ in 0..deck.len() {
            words.push(deck.current().unwrap().context.word);
            deck.next();
        }
        words.sort();
        assert_eq!(words, vec!["jump", "run", "swim"]);
    }

    #[test]
    fn test_same_seed_gives_same_order() {
        let mut a = sample_deck();
        let mut b = sample_deck();
        for _ in 0..3 {
            assert_eq!(
                a.current().unwrap().context.word,
                b.current().unwrap().context.word
            );
            a.next();
            b.next();
        }
    }

    #[test]
    fn test_orientation_switch_hides_the_answer() {
        let mut deck = sample_deck();
        deck.flip();
        deck.set_orientation(FlashcardOrientation::ImageFirst);
        assert_eq!(deck.orientation(), FlashcardOrientation::ImageFirst);
        assert!(!deck.is_revealed());
        assert!(deck.current_meaning().unwrap().starts_with("gloss of"));
    }

    #[test]
    fn test_empty_deck_is_inert() {
        let mut deck = FlashcardDeck::new(Vec::new(), 0);
        assert!(deck.is_empty());
        assert_eq!(deck.position(), 0);
        deck.next();
        deck.previous();
        deck.flip();
        assert!(!deck.is_revealed());
        assert_eq!(deck.current(), None);
    }
}
