//! Typed wrappers over the AI relay: the three generation calls plus quiz.
//!
//! Context and quiz failures are hard failures surfaced to the caller.
//! Image failures are soft: they resolve to `None` and the lesson carries on
//! without an illustration.

use std::collections::BTreeMap;

use lesson_utils::{
    Course, QuizQuestion, QuizRequest, SingleContextRequest, VocabularyLevel, WordContext,
    WordContextsRequest, WordImageRequest, text::normalize_word,
};
use wasm_bindgen::JsValue;

use crate::utils::hit_ai_server;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned HTTP {0}")]
    Status(String),
    #[error("no context was generated for \"{0}\"")]
    MissingWord(String),
    #[error("the service returned an empty result")]
    Empty,
}

impl From<ClientError> for JsValue {
    fn from(error: ClientError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

fn transport(error: fetch_happen::Error) -> ClientError {
    ClientError::Transport(format!("{error:?}"))
}

/// Batch context generation. The relay's output array is not guaranteed to
/// line up positionally with the submitted words, so the result is
/// re-associated by normalized word and returned in submitted order.
pub async fn fetch_contexts(
    words: &[String],
    level: VocabularyLevel,
    course: Course,
) -> Result<Vec<WordContext>, ClientError> {
    let request = WordContextsRequest {
        words: words.to_vec(),
        level,
        course,
    };
    let response = hit_ai_server("/word-contexts", &request)
        .await
        .map_err(transport)?;
    if !response.ok() {
        return Err(ClientError::Status(response.status().to_string()));
    }
    let contexts: Vec<WordContext> = response.json().await.map_err(transport)?;
    reassociate_contexts(words, contexts)
}

/// Match generated contexts back to the submitted word order.
///
/// Comparison goes through [`normalize_word`] on both sides; if the service
/// returned several contexts for the same word, the first wins. A submitted
/// word with no matching context is a hard failure.
pub fn reassociate_contexts(
    words: &[String],
    contexts: Vec<WordContext>,
) -> Result<Vec<WordContext>, ClientError> {
    let mut by_word: BTreeMap<String, WordContext> = BTreeMap::new();
    for context in contexts {
        by_word
            .entry(normalize_word(&context.word))
            .or_insert(context);
    }

    words
        .iter()
        .map(|word| {
            by_word
                .remove(&normalize_word(word))
                .ok_or_else(|| ClientError::MissingWord(word.clone()))
        })
        .collect()
}

/// Regenerate the materials for a single word. The prompt asks the service
/// for a context different from its usual output.
pub async fn fetch_single_context(
    word: &str,
    level: VocabularyLevel,
    course: Course,
) -> Result<WordContext, ClientError> {
    let request = SingleContextRequest {
        word: word.to_string(),
        level,
        course,
    };
    let response = hit_ai_server("/word-context", &request)
        .await
        .map_err(transport)?;
    if !response.ok() {
        return Err(ClientError::Status(response.status().to_string()));
    }
    response.json().await.map_err(transport)
}

/// Best-effort image generation. Every failure mode resolves to `None`.
pub async fn fetch_image(image_prompt: &str) -> Option<String> {
    let request = WordImageRequest {
        image_prompt: image_prompt.to_string(),
    };
    let response = match hit_ai_server("/word-image", &request).await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Image fetch failed, continuing without an illustration: {e:?}");
            return None;
        }
    };
    if !response.ok() {
        log::warn!(
            "Image fetch returned HTTP {}, continuing without an illustration",
            response.status()
        );
        return None;
    }
    match response.json::<Option<String>>().await {
        Ok(image_url) => image_url,
        Err(e) => {
            log::warn!("Image response was unreadable, continuing without an illustration: {e:?}");
            None
        }
    }
}

/// Fetch a fresh quiz. `variation_seed` nudges the service toward different
/// questions on repeat plays; it is advisory only.
pub async fn fetch_quiz(
    words: &[String],
    level: VocabularyLevel,
    course: Course,
    variation_seed: u32,
) -> Result<Vec<QuizQuestion>, ClientError> {
    let request = QuizRequest {
        words: words.to_vec(),
        level,
        course,
        variation_seed,
    };
    let response = hit_ai_server("/quiz", &request).await.map_err(transport)?;
    if !response.ok() {
        return Err(ClientError::Status(response.status().to_string()));
    }
    let questions: Vec<QuizQuestion> = response.json().await.map_err(transport)?;
    if questions.is_empty() {
        return Err(ClientError::Empty);
    }
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_for(word: &str) -> WordContext {
        WordContext {
            word: word.to_string(),
            definition: format!("definition of {word}"),
            gloss: format!("gloss of {word}"),
            sentence: format!("A sentence with {word}."),
            dialogue: format!("A: {word}?\nB: {word}!"),
            image_prompt: format!("A picture of {word}"),
        }
    }

    #[test]
    fn test_reassociation_restores_submitted_order() {
        let words = vec!["run".to_string(), "jump".to_string(), "swim".to_string()];
        let scrambled = vec![
            context_for("swim"),
            context_for("run"),
            context_for("jump"),
        ];

        let contexts = reassociate_contexts(&words, scrambled).unwrap();
        let returned: Vec<&str> = contexts.iter().map(|c| c.word.as_str()).collect();
        assert_eq!(returned, vec!["run", "jump", "swim"]);
    }

    #[test]
    fn test_reassociation_normalizes_case_and_whitespace() {
        let words = vec!["Give Up".to_string()];
        let contexts = reassociate_contexts(&words, vec![context_for("  give  up ")]).unwrap();
        assert_eq!(contexts.len(), 1);
        assert_eq!(contexts[0].word, "  give  up ");
    }

    #[test]
    fn test_reassociation_missing_word_is_a_hard_failure() {
        let words = vec!["run".to_string(), "jump".to_string()];
        let result = reassociate_contexts(&words, vec![context_for("run")]);
        assert!(matches!(result, Err(ClientError::MissingWord(word)) if word == "jump"));
    }

    #[test]
    fn test_reassociation_first_duplicate_wins() {
        let words = vec!["run".to_string()];
        let mut second = context_for("run");
        second.definition = "a different definition".to_string();

        let contexts = reassociate_contexts(&words, vec![context_for("run"), second]).unwrap();
        assert_eq!(contexts[0].definition, "definition of run");
    }
}
