use axum::{
    Router,
    extract::Json,
    http::StatusCode,
    routing::{get, post},
};
use base64::Engine;
use lesson_utils::{
    Course, QuizQuestion, QuizRequest, SingleContextRequest, VocabularyLevel, WordContext,
    WordContextsRequest, WordImageRequest,
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tysm::chat_completions::ChatClient;

static CLIENT: LazyLock<ChatClient> = LazyLock::new(|| {
    ChatClient::from_env("gpt-5-mini").unwrap()
});

/// The image-capable generate-content model on the Google side.
const IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<GenerateContentPrompt>,
}

#[derive(Serialize)]
struct GenerateContentPrompt {
    parts: Vec<TextPart>,
}

#[derive(Serialize)]
struct TextPart {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

fn language_instruction(course: &Course) -> String {
    let native = course.native_language;
    let target = course.target_language;
    format!(
        r#"Provide the 'definition' in {native} (a simple explanation).
Provide the 'gloss' in {native} (MAX 2-3 words, essentially a translation or keyword).
Ensure the 'sentence' and 'dialogue' are in {target}.
The 'word' must be the {target} word exactly as provided."#
    )
}

fn contexts_system_prompt(course: &Course, level: VocabularyLevel) -> String {
    let target = course.target_language;
    let native = course.native_language;
    let vocabulary_size = level.words();
    format!(
        r#"You are an expert {target} teacher.
The student has a vocabulary of roughly {vocabulary_size} words. The student's primary language is {native}.
You will be given a list of {target} words. Create learning materials for each of them.

{language_instruction}

For each word:
1. Define it simply.
2. Provide a 'gloss': just the core meaning or translation (1-2 words).
3. Create a sentence in {target} a student who knows {vocabulary_size} words can read.
4. Create a short A/B dialogue in {target} at the same level.
5. Create a prompt for an AI image generator that clearly visualizes the sentence or dialogue.

Respond with JSON: one entry per word, covering every word you were given."#,
        language_instruction = language_instruction(course),
    )
}

fn regenerate_system_prompt(course: &Course, level: VocabularyLevel) -> String {
    let target = course.target_language;
    let native = course.native_language;
    let vocabulary_size = level.words();
    format!(
        r#"You are an expert {target} teacher.
The student has a vocabulary of roughly {vocabulary_size} words. The student's primary language is {native}.
You will be given a single {target} word the student has already seen materials for. Regenerate its learning materials, choosing a DIFFERENT context (sentence and dialogue) than the obvious one.

{language_instruction}

Respond with JSON."#,
        language_instruction = language_instruction(course),
    )
}

fn quiz_system_prompt(course: &Course, level: VocabularyLevel, variation_seed: u32) -> String {
    let target = course.target_language;
    let native = course.native_language;
    let vocabulary_size = level.words();
    format!(
        r#"Create a fun, interactive quiz for a student with a vocabulary of roughly {vocabulary_size} words.
The student's primary language is {native}, and they are learning {target}.
You will be given the {target} words to test. Create exactly 1 question per word.

Iteration seed: {variation_seed}. If this number is greater than 0, make the questions DIFFERENT from a standard set.
Mix up the question types. Don't just ask for definitions. Questions can be:
- Fill in the blank (sentence in {target})
- Choose the correct definition (options in {native})
- Scenario-based matching
- Synonym/antonym identification

Ensure 'options' is an array of exactly 4 possible answers, one of which is 'correctAnswer' verbatim.
Provide the 'explanation' in {native}.

Respond with JSON."#
    )
}

async fn generate_word_contexts(
    Json(request): Json<WordContextsRequest>,
) -> Result<Json<Vec<WordContext>>, StatusCode> {
    #[derive(Deserialize, schemars::JsonSchema)]
    struct WordContextsResponse {
        contexts: Vec<WordContext>,
    }

    let response: WordContextsResponse = CLIENT
        .chat_with_system_prompt(
            contexts_system_prompt(&request.course, request.level),
            format!(
                "{target} words: {words}",
                target = request.course.target_language,
                words = request.words.join(", ")
            ),
        )
        .await
        .inspect_err(|e| eprintln!("Error generating word contexts: {e:?}"))
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;

    if response.contexts.is_empty() {
        eprintln!("Context generation returned an empty set");
        return Err(StatusCode::BAD_GATEWAY);
    }

    Ok(Json(response.contexts))
}

async fn regenerate_word_context(
    Json(request): Json<SingleContextRequest>,
) -> Result<Json<WordContext>, StatusCode> {
    let context: WordContext = CLIENT
        .chat_with_system_prompt(
            regenerate_system_prompt(&request.course, request.level),
            format!(
                "{target} word: \"{word}\"",
                target = request.course.target_language,
                word = request.word
            ),
        )
        .await
        .inspect_err(|e| eprintln!("Error regenerating word context: {e:?}"))
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(context))
}

/// Question shape as the model produces it. Ids are assigned here rather
/// than trusted from the model.
#[derive(Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
struct QuizQuestionDraft {
    question: String,
    options: Vec<String>,
    correct_answer: String,
    explanation: String,
}

fn validated_questions(drafts: Vec<QuizQuestionDraft>) -> Vec<QuizQuestion> {
    drafts
        .into_iter()
        .map(|draft| QuizQuestion {
            id: uuid::Uuid::new_v4().to_string(),
            question: draft.question,
            options: draft.options,
            correct_answer: draft.correct_answer,
            explanation: draft.explanation,
        })
        .filter(|question| {
            let valid = question.has_valid_options();
            if !valid {
                eprintln!(
                    "Dropping malformed quiz question (bad option set): {:?}",
                    question.question
                );
            }
            valid
        })
        .collect()
}

async fn generate_quiz(
    Json(request): Json<QuizRequest>,
) -> Result<Json<Vec<QuizQuestion>>, StatusCode> {
    #[derive(Deserialize, schemars::JsonSchema)]
    struct QuizResponse {
        questions: Vec<QuizQuestionDraft>,
    }

    let response: QuizResponse = CLIENT
        .chat_with_system_prompt(
            quiz_system_prompt(&request.course, request.level, request.variation_seed),
            format!(
                "{target} words to test: {words}",
                target = request.course.target_language,
                words = request.words.join(", ")
            ),
        )
        .await
        .inspect_err(|e| eprintln!("Error generating quiz: {e:?}"))
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;

    let questions = validated_questions(response.questions);
    if questions.is_empty() {
        eprintln!("Quiz generation produced no valid questions");
        return Err(StatusCode::BAD_GATEWAY);
    }

    Ok(Json(questions))
}

fn data_uri_from_response(response: &GenerateContentResponse) -> Option<String> {
    for candidate in &response.candidates {
        let Some(content) = &candidate.content else {
            continue;
        };
        for part in &content.parts {
            if let Some(inline) = &part.inline_data {
                // Reject payloads that aren't actually base64 rather than
                // forwarding a data URI the client can't render.
                if base64::engine::general_purpose::STANDARD
                    .decode(&inline.data)
                    .is_err()
                {
                    continue;
                }
                return Some(format!(
                    "data:{mime};base64,{data}",
                    mime = inline.mime_type,
                    data = inline.data
                ));
            }
        }
    }
    None
}

async fn fetch_image(image_prompt: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let api_key = std::env::var("GOOGLE_AI_API_KEY")?;
    let client = reqwest::Client::new();

    let request = GenerateContentRequest {
        contents: vec![GenerateContentPrompt {
            parts: vec![TextPart {
                text: format!(
                    "Create a colorful, illustrative educational image for this scene: {image_prompt}. Style: digital art, clean lines, friendly."
                ),
            }],
        }],
    };

    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{IMAGE_MODEL}:generateContent?key={api_key}"
    );

    let response = client.post(&url).json(&request).send().await?;

    if !response.status().is_success() {
        return Err(format!("image generation returned {}", response.status()).into());
    }

    let response: GenerateContentResponse = response.json().await?;
    Ok(data_uri_from_response(&response))
}

/// Best-effort by contract: a missing or failed image is `null`, never an
/// error status, so text content is never blocked on illustration.
async fn generate_word_image(Json(request): Json<WordImageRequest>) -> Json<Option<String>> {
    match fetch_image(&request.image_prompt).await {
        Ok(data_uri) => Json(data_uri),
        Err(e) => {
            eprintln!("Error generating image: {e:?}");
            Json(None)
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    let app = Router::new()
        .route("/", get(|| async { "Lexi AI relay" }))
        .route("/word-contexts", post(generate_word_contexts))
        .route("/word-context", post(regenerate_word_context))
        .route("/word-image", post(generate_word_image))
        .route("/quiz", post(generate_quiz))
        .layer(CompressionLayer::new())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
    println!("Listening on port 8080");
    axum::serve(listener, app).await.unwrap();
}
