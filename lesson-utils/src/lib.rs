pub mod text;

#[derive(
    Copy,
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Hash,
    PartialEq,
    Eq,
    Ord,
    PartialOrd,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum Language {
    English,
    Chinese,
    Spanish,
}

impl Language {
    pub fn iso_639_1(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "zh",
            Language::Spanish => "es",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::English => write!(f, "English"),
            Language::Chinese => write!(f, "Chinese"),
            Language::Spanish => write!(f, "Spanish"),
        }
    }
}

/// A native-language/target-language pair the app can teach.
#[derive(
    Copy,
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub native_language: Language,
    pub target_language: Language,
}

pub const COURSES: &[Course] = &[
    Course {
        native_language: Language::English,
        target_language: Language::English,
    },
    Course {
        native_language: Language::English,
        target_language: Language::Spanish,
    },
    Course {
        native_language: Language::Chinese,
        target_language: Language::English,
    },
    Course {
        native_language: Language::Chinese,
        target_language: Language::Spanish,
    },
];

/// The student's approximate vocabulary size, in bands matching the
/// proficiency slider.
#[derive(
    Copy,
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum VocabularyLevel {
    Beginner,
    Elementary,
    Intermediate,
    UpperIntermediate,
    Advanced,
    Fluent,
    Native,
}

pub const VOCABULARY_LEVELS: &[VocabularyLevel] = &[
    VocabularyLevel::Beginner,
    VocabularyLevel::Elementary,
    VocabularyLevel::Intermediate,
    VocabularyLevel::UpperIntermediate,
    VocabularyLevel::Advanced,
    VocabularyLevel::Fluent,
    VocabularyLevel::Native,
];

impl VocabularyLevel {
    /// Approximate number of words the student already knows.
    pub fn words(&self) -> u32 {
        match self {
            VocabularyLevel::Beginner => 100,
            VocabularyLevel::Elementary => 500,
            VocabularyLevel::Intermediate => 1000,
            VocabularyLevel::UpperIntermediate => 2000,
            VocabularyLevel::Advanced => 3000,
            VocabularyLevel::Fluent => 5000,
            VocabularyLevel::Native => 8000,
        }
    }

    /// The band closest to a raw slider value.
    pub fn closest(words: u32) -> VocabularyLevel {
        *VOCABULARY_LEVELS
            .iter()
            .min_by_key(|level| level.words().abs_diff(words))
            .expect("VOCABULARY_LEVELS is non-empty")
    }
}

impl Default for VocabularyLevel {
    fn default() -> Self {
        VocabularyLevel::Elementary
    }
}

/// The generated learning materials for one word. Produced entirely by the
/// AI service; immutable once received, replaced wholesale on regeneration.
#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct WordContext {
    /// The target-language word being taught.
    pub word: String,
    /// A simple native-language definition suited to the student's level.
    pub definition: String,
    /// A very concise 1-3 word native-language meaning or translation.
    pub gloss: String,
    /// A target-language sentence using the word in context.
    pub sentence: String,
    /// A short 2-3 line target-language dialogue demonstrating the word.
    pub dialogue: String,
    /// A detailed visual description for an image generator, illustrating
    /// the sentence or dialogue.
    pub image_prompt: String,
}

/// One multiple-choice quiz question. `correct_answer` is always one of
/// `options`; ids are assigned server-side.
#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    /// Native-language explanation revealed after the student answers.
    pub explanation: String,
}

impl QuizQuestion {
    /// Whether the option set upholds the quiz invariant: exactly four
    /// options, containing the correct answer exactly once.
    pub fn has_valid_options(&self) -> bool {
        self.options.len() == 4
            && self
                .options
                .iter()
                .filter(|option| *option == &self.correct_answer)
                .count()
                == 1
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct WordContextsRequest {
    pub words: Vec<String>,
    pub level: VocabularyLevel,
    pub course: Course,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct SingleContextRequest {
    pub word: String,
    pub level: VocabularyLevel,
    pub course: Course,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct WordImageRequest {
    pub image_prompt: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    pub words: Vec<String>,
    pub level: VocabularyLevel,
    pub course: Course,
    /// Advisory counter fed into the prompt so repeat plays get different
    /// questions. The service treats it as a hint, not a guarantee.
    pub variation_seed: u32,
}
