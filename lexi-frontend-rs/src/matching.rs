//! The two matching games: a memory grid and a two-column connect game.
//!
//! Both play over the same deck: per lesson word, one card carrying the
//! word and one carrying its short meaning (plus the illustration when one
//! exists). The original's setTimeout-driven reveal windows become explicit
//! pending/error states here; the driver applies `resolve_pending` /
//! `clear_error` after the advertised delay, which keeps the engines pure
//! and exactly testable.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use wasm_bindgen::prelude::*;

use crate::lesson::WordCard;

/// How long a found pair stays face up before it is taken out of play.
pub const MATCH_RESOLVE_DELAY_MS: u32 = 500;
/// How long a failed pair stays face up before flipping back.
pub const MISMATCH_RESOLVE_DELAY_MS: u32 = 1000;
/// How long a failed connect attempt is flagged as an error.
pub const ERROR_FLASH_MS: u32 = 500;

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum MatchCardKind {
    Word,
    Meaning,
}

/// One face in a matching game. Cards come in pairs: a `Word` card and a
/// `Meaning` card share a `word_id`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct MatchCard {
    pub id: u32,
    pub content: String,
    pub kind: MatchCardKind,
    pub word_id: String,
    pub matched: bool,
    pub image_url: Option<String>,
}

/// Build the unshuffled 2N-card deck from the lesson's word cards.
pub fn build_match_deck(cards: &[WordCard]) -> Vec<MatchCard> {
    let mut deck = Vec::with_capacity(cards.len() * 2);
    for (index, card) in cards.iter().enumerate() {
        deck.push(MatchCard {
            id: (index * 2) as u32,
            content: card.context.word.clone(),
            kind: MatchCardKind::Word,
            word_id: card.context.word.clone(),
            matched: false,
            image_url: None,
        });
        deck.push(MatchCard {
            id: (index * 2 + 1) as u32,
            content: card.short_meaning().to_string(),
            kind: MatchCardKind::Meaning,
            word_id: card.context.word.clone(),
            matched: false,
            image_url: card.image_url.clone(),
        });
    }
    deck
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum GridOutcome {
    /// The selection did nothing (matched card, already face up, or a pair
    /// is still awaiting resolution).
    Ignored,
    /// First card of an attempt turned face up.
    Flipped,
    /// Second card completed a pair; resolve after [`MATCH_RESOLVE_DELAY_MS`].
    MatchPending,
    /// Second card did not pair up; resolve after
    /// [`MISMATCH_RESOLVE_DELAY_MS`].
    MismatchPending,
}

struct PendingPair {
    first: u32,
    second: u32,
    is_match: bool,
}

/// The memory-grid variant: one shuffled deck, two cards face up at a time.
#[wasm_bindgen]
pub struct GridSession {
    deck: Vec<MatchCard>,
    face_up: Vec<u32>,
    pending: Option<PendingPair>,
    matched_pairs: u32,
    moves: u32,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl GridSession {
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new(cards: Vec<WordCard>, seed: u32) -> GridSession {
        let mut deck = build_match_deck(&cards);
        deck.shuffle(&mut SmallRng::seed_from_u64(seed as u64));
        GridSession {
            deck,
            face_up: Vec::new(),
            pending: None,
            matched_pairs: 0,
            moves: 0,
        }
    }

    /// Reshuffle the same deck and reset all match/selection state.
    pub fn new_game(&mut self, seed: u32) {
        for card in &mut self.deck {
            card.matched = false;
        }
        self.deck.shuffle(&mut SmallRng::seed_from_u64(seed as u64));
        self.face_up.clear();
        self.pending = None;
        self.matched_pairs = 0;
        self.moves = 0;
    }

    pub fn select(&mut self, id: u32) -> GridOutcome {
        if self.pending.is_some() {
            return GridOutcome::Ignored;
        }
        let Some(card) = self.deck.iter().find(|card| card.id == id) else {
            return GridOutcome::Ignored;
        };
        if card.matched || self.face_up.contains(&id) {
            return GridOutcome::Ignored;
        }

        self.face_up.push(id);
        if self.face_up.len() < 2 {
            return GridOutcome::Flipped;
        }

        self.moves += 1;
        let first = self.face_up[0];
        let second = self.face_up[1];
        let is_match = self.word_id_of(first) == self.word_id_of(second);
        self.pending = Some(PendingPair {
            first,
            second,
            is_match,
        });
        if is_match {
            GridOutcome::MatchPending
        } else {
            GridOutcome::MismatchPending
        }
    }

    /// Apply the outcome of the current two-card attempt: a matched pair
    /// leaves play, a mismatch flips back. Returns false when nothing was
    /// pending.
    pub fn resolve_pending(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        if pending.is_match {
            for card in &mut self.deck {
                if card.id == pending.first || card.id == pending.second {
                    card.matched = true;
                }
            }
            self.matched_pairs += 1;
        }
        self.face_up.clear();
        true
    }

    /// The delay the driver should wait before calling `resolve_pending`,
    /// or `None` when nothing is pending.
    pub fn pending_delay_ms(&self) -> Option<u32> {
        self.pending.as_ref().map(|pending| {
            if pending.is_match {
                MATCH_RESOLVE_DELAY_MS
            } else {
                MISMATCH_RESOLVE_DELAY_MS
            }
        })
    }

    pub fn cards(&self) -> Vec<MatchCard> {
        self.deck.clone()
    }

    pub fn face_up(&self) -> Vec<u32> {
        self.face_up.clone()
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn matched_pairs(&self) -> u32 {
        self.matched_pairs
    }

    pub fn total_pairs(&self) -> u32 {
        (self.deck.len() / 2) as u32
    }

    pub fn is_complete(&self) -> bool {
        self.total_pairs() > 0 && self.matched_pairs == self.total_pairs()
    }
}

impl GridSession {
    fn word_id_of(&self, id: u32) -> &str {
        self.deck
            .iter()
            .find(|card| card.id == id)
            .map(|card| card.word_id.as_str())
            .unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum ConnectOutcome {
    Ignored,
    /// A left-column word card is armed and awaiting its right-column pick.
    Armed,
    Matched,
    /// Wrong pair: both cards are error-flagged until `clear_error`, which
    /// the driver calls after [`ERROR_FLASH_MS`].
    Mismatch,
}

/// The connect variant: words on the left, meanings on the right, each
/// column shuffled independently so they never trivially align.
#[wasm_bindgen]
pub struct ConnectSession {
    left: Vec<MatchCard>,
    right: Vec<MatchCard>,
    armed: Option<u32>,
    error: Option<(u32, u32)>,
    matched_pairs: u32,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl ConnectSession {
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new(cards: Vec<WordCard>, seed: u32) -> ConnectSession {
        let deck = build_match_deck(&cards);
        let mut rng = SmallRng::seed_from_u64(seed as u64);
        let (mut left, mut right): (Vec<_>, Vec<_>) = deck
            .into_iter()
            .partition(|card| card.kind == MatchCardKind::Word);
        left.shuffle(&mut rng);
        right.shuffle(&mut rng);
        ConnectSession {
            left,
            right,
            armed: None,
            error: None,
            matched_pairs: 0,
        }
    }

    pub fn new_game(&mut self, seed: u32) {
        let mut rng = SmallRng::seed_from_u64(seed as u64);
        for card in self.left.iter_mut().chain(self.right.iter_mut()) {
            card.matched = false;
        }
        self.left.shuffle(&mut rng);
        self.right.shuffle(&mut rng);
        self.armed = None;
        self.error = None;
        self.matched_pairs = 0;
    }

    pub fn select_left(&mut self, id: u32) -> ConnectOutcome {
        let Some(card) = self.left.iter().find(|card| card.id == id) else {
            return ConnectOutcome::Ignored;
        };
        if card.matched {
            return ConnectOutcome::Ignored;
        }
        self.error = None;
        self.armed = Some(id);
        ConnectOutcome::Armed
    }

    pub fn select_right(&mut self, id: u32) -> ConnectOutcome {
        let Some(card) = self.right.iter().find(|card| card.id == id) else {
            return ConnectOutcome::Ignored;
        };
        if card.matched {
            return ConnectOutcome::Ignored;
        }
        let right_word_id = card.word_id.clone();
        let Some(armed) = self.armed.take() else {
            return ConnectOutcome::Ignored;
        };

        let armed_word_id = self
            .left
            .iter()
            .find(|card| card.id == armed)
            .map(|card| card.word_id.clone())
            .unwrap_or_default();

        if armed_word_id == right_word_id {
            for card in self.left.iter_mut().chain(self.right.iter_mut()) {
                if card.id == armed || card.id == id {
                    card.matched = true;
                }
            }
            self.matched_pairs += 1;
            ConnectOutcome::Matched
        } else {
            self.error = Some((armed, id));
            ConnectOutcome::Mismatch
        }
    }

    /// Clear the error flash; the driver calls this after
    /// [`ERROR_FLASH_MS`].
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn error_flash_ms(&self) -> u32 {
        ERROR_FLASH_MS
    }

    pub fn left_cards(&self) -> Vec<MatchCard> {
        self.left.clone()
    }

    pub fn right_cards(&self) -> Vec<MatchCard> {
        self.right.clone()
    }

    pub fn armed(&self) -> Option<u32> {
        self.armed
    }

    pub fn error_ids(&self) -> Vec<u32> {
        match self.error {
            Some((left, right)) => vec![left, right],
            None => Vec::new(),
        }
    }

    pub fn matched_pairs(&self) -> u32 {
        self.matched_pairs
    }

    pub fn total_pairs(&self) -> u32 {
        self.left.len() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.total_pairs() > 0 && self.matched_pairs == self.total_pairs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_utils::WordContext;
    use std::collections::BTreeMap;

    fn word_card(word: &str, gloss: &str, image_url: Option<&str>) -> WordCard {
        WordCard {
            context: WordContext {
                word: word.to_string(),
                definition: format!("definition of {word}"),
                gloss: gloss.to_string(),
                sentence: format!("A sentence with {word}."),
                dialogue: format!("A: {word}?\nB: {word}!"),
                image_prompt: format!("A picture of {word}"),
            },
            image_url: image_url.map(str::to_string),
            is_loading_image: false,
            is_regenerating: false,
        }
    }

    fn sample_cards() -> Vec<WordCard> {
        vec![
            word_card("run", "跑", Some("data:image/png;base64,aGk=")),
            word_card("jump", "跳", None),
            word_card("swim", "", None),
        ]
    }

    /// Pair up ids by word_id so tests can play perfectly.
    fn pairs_of(cards: &[MatchCard]) -> Vec<(u32, u32)> {
        let mut by_word: BTreeMap<&str, Vec<&MatchCard>> = BTreeMap::new();
        for card in cards {
            by_word.entry(card.word_id.as_str()).or_default().push(card);
        }
        by_word
            .values()
            .map(|pair| {
                assert_eq!(pair.len(), 2, "every word_id appears exactly twice");
                assert_ne!(pair[0].kind, pair[1].kind, "one word card, one meaning card");
                (pair[0].id, pair[1].id)
            })
            .collect()
    }

    #[test]
    fn test_deck_is_2n_disjoint_pairs_with_gloss_fallback() {
        let deck = build_match_deck(&sample_cards());
        assert_eq!(deck.len(), 6);
        assert_eq!(pairs_of(&deck).len(), 3);

        let meaning_of = |word: &str| {
            deck.iter()
                .find(|card| card.word_id == word && card.kind == MatchCardKind::Meaning)
                .unwrap()
        };
        assert_eq!(meaning_of("run").content, "跑");
        assert_eq!(
            meaning_of("run").image_url.as_deref(),
            Some("data:image/png;base64,aGk=")
        );
        // empty gloss falls back to the definition
        assert_eq!(meaning_of("swim").content, "definition of swim");
    }

    #[test]
    fn test_grid_perfect_game_completes_in_n_moves() {
        let mut session = GridSession::new(sample_cards(), 7);
        for (first, second) in pairs_of(&session.cards()) {
            assert_eq!(session.select(first), GridOutcome::Flipped);
            assert_eq!(session.select(second), GridOutcome::MatchPending);
            assert_eq!(session.pending_delay_ms(), Some(MATCH_RESOLVE_DELAY_MS));
            assert!(session.resolve_pending());
        }
        assert!(session.is_complete());
        assert_eq!(session.moves(), 3);
        assert_eq!(session.matched_pairs(), session.total_pairs());
    }

    #[test]
    fn test_grid_mismatch_flips_back_and_counts_a_move() {
        let mut session = GridSession::new(sample_cards(), 7);
        let pairs = pairs_of(&session.cards());
        let (first, _) = pairs[0];
        let (second, _) = pairs[1];

        assert_eq!(session.select(first), GridOutcome::Flipped);
        assert_eq!(session.select(second), GridOutcome::MismatchPending);
        assert_eq!(session.pending_delay_ms(), Some(MISMATCH_RESOLVE_DELAY_MS));

        // a third selection is ignored while the pair is face up
        let (third, _) = pairs[2];
        assert_eq!(session.select(third), GridOutcome::Ignored);

        assert!(session.resolve_pending());
        assert_eq!(session.moves(), 1);
        assert_eq!(session.matched_pairs(), 0);
        assert!(session.face_up().is_empty());
        assert!(session.cards().iter().all(|card| !card.matched));
    }

    #[test]
    fn test_grid_ignores_matched_and_repeated_cards() {
        let mut session = GridSession::new(sample_cards(), 7);
        let (first, second) = pairs_of(&session.cards())[0];

        session.select(first);
        assert_eq!(session.select(first), GridOutcome::Ignored);
        session.select(second);
        session.resolve_pending();

        assert_eq!(session.select(first), GridOutcome::Ignored);
        assert_eq!(session.select(999), GridOutcome::Ignored);
    }

    #[test]
    fn test_grid_new_game_resets_everything() {
        let mut session = GridSession::new(sample_cards(), 7);
        let (first, second) = pairs_of(&session.cards())[0];
        session.select(first);
        session.select(second);
        session.resolve_pending();
        assert_eq!(session.matched_pairs(), 1);

        session.new_game(8);
        assert_eq!(session.matched_pairs(), 0);
        assert_eq!(session.moves(), 0);
        assert!(session.face_up().is_empty());
        assert!(session.cards().iter().all(|card| !card.matched));
        assert_eq!(session.cards().len(), 6);
    }

    #[test]
    fn test_same_seed_shuffles_identically() {
        let a = GridSession::new(sample_cards(), 42);
        let b = GridSession::new(sample_cards(), 42);
        assert_eq!(a.cards(), b.cards());

        let a = ConnectSession::new(sample_cards(), 42);
        let b = ConnectSession::new(sample_cards(), 42);
        assert_eq!(a.left_cards(), b.left_cards());
        assert_eq!(a.right_cards(), b.right_cards());
    }

    #[test]
    fn test_connect_columns_split_by_kind() {
        let session = ConnectSession::new(sample_cards(), 3);
        assert_eq!(session.left_cards().len(), 3);
        assert_eq!(session.right_cards().len(), 3);
        assert!(
            session
                .left_cards()
                .iter()
                .all(|card| card.kind == MatchCardKind::Word)
        );
        assert!(
            session
                .right_cards()
                .iter()
                .all(|card| card.kind == MatchCardKind::Meaning)
        );
    }

    #[test]
    fn test_connect_match_and_mismatch_flow() {
        let mut session = ConnectSession::new(sample_cards(), 3);
        let left = session.left_cards();
        let right = session.right_cards();

        // right selection with nothing armed does nothing
        assert_eq!(session.select_right(right[0].id), ConnectOutcome::Ignored);

        // mismatch: arm a word, pick a meaning of a different word
        let wrong_right = right
            .iter()
            .find(|card| card.word_id != left[0].word_id)
            .unwrap();
        assert_eq!(session.select_left(left[0].id), ConnectOutcome::Armed);
        assert_eq!(session.armed(), Some(left[0].id));
        assert_eq!(
            session.select_right(wrong_right.id),
            ConnectOutcome::Mismatch
        );
        assert_eq!(session.error_ids(), vec![left[0].id, wrong_right.id]);
        assert_eq!(session.armed(), None, "mismatch disarms");
        assert_eq!(session.matched_pairs(), 0);

        session.clear_error();
        assert!(session.error_ids().is_empty());

        // match: arm the word, pick its meaning
        let matching_right = right
            .iter()
            .find(|card| card.word_id == left[0].word_id)
            .unwrap();
        assert_eq!(session.select_left(left[0].id), ConnectOutcome::Armed);
        assert_eq!(
            session.select_right(matching_right.id),
            ConnectOutcome::Matched
        );
        assert_eq!(session.matched_pairs(), 1);

        // both cards of the pair left the selectable state
        assert_eq!(session.select_left(left[0].id), ConnectOutcome::Ignored);
        assert_eq!(
            session.select_right(matching_right.id),
            ConnectOutcome::Ignored
        );
    }

    #[test]
    fn test_connect_completes_when_all_pairs_found() {
        let mut session = ConnectSession::new(sample_cards(), 3);
        let left = session.left_cards();
        let right = session.right_cards();

        for word in &left {
            let meaning = right
                .iter()
                .find(|card| card.word_id == word.word_id)
                .unwrap();
            assert_eq!(session.select_left(word.id), ConnectOutcome::Armed);
            assert_eq!(session.select_right(meaning.id), ConnectOutcome::Matched);
        }
        assert!(session.is_complete());

        session.new_game(4);
        assert!(!session.is_complete());
        assert_eq!(session.matched_pairs(), 0);
        assert_eq!(session.left_cards().len(), 3);
        assert_eq!(session.right_cards().len(), 3);
    }
}
