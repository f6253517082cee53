use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question has no options")]
    NoOptions,

    #[error("option {index} is blank")]
    BlankOption { index: usize },

    #[error("option key {key:?} is used by more than one option")]
    DuplicateOptionKey { key: String },

    #[error("correct answer {answer:?} is not one of the option keys")]
    UnknownCorrectAnswer { answer: String },
}

//
// ─── METADATA ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[default]
    MultipleChoice,
    TrueFalse,
    Matching,
}

/// Returns the identifier of an option: its first character.
///
/// `"B) Lyon"` has key `"B"`. Returns `None` for an empty option.
#[must_use]
pub fn option_key(option: &str) -> Option<&str> {
    option.chars().next().map(|first| &option[..first.len_utf8()])
}

//
// ─── DRAFT ────────────────────────────────────────────────────────────────────
//

/// Unvalidated question fields as supplied by a quiz provider.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub points: u32,
    pub explanation: Option<String>,
    pub misconception: Option<String>,
    pub difficulty: Difficulty,
    pub kind: QuestionKind,
    pub topic: String,
    pub subtopic: Option<String>,
}

impl QuestionDraft {
    /// Draft of a multiple-choice question with default metadata.
    #[must_use]
    pub fn multiple_choice<I, S>(
        id: impl Into<QuestionId>,
        text: impl Into<String>,
        options: I,
        correct_answer: impl Into<String>,
        points: u32,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            text: text.into(),
            options: options.into_iter().map(Into::into).collect(),
            correct_answer: correct_answer.into(),
            points,
            explanation: None,
            misconception: None,
            difficulty: Difficulty::default(),
            kind: QuestionKind::MultipleChoice,
            topic: String::new(),
            subtopic: None,
        }
    }

    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the options are empty, blank or share a key,
    /// or when the correct answer is not one of the option keys.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.options.is_empty() {
            return Err(QuestionError::NoOptions);
        }

        let mut keys = HashSet::with_capacity(self.options.len());
        for (index, option) in self.options.iter().enumerate() {
            if option.trim().is_empty() {
                return Err(QuestionError::BlankOption { index });
            }
            let key = option_key(option).ok_or(QuestionError::BlankOption { index })?;
            if !keys.insert(key) {
                return Err(QuestionError::DuplicateOptionKey {
                    key: key.to_string(),
                });
            }
        }

        if !keys.contains(self.correct_answer.as_str()) {
            return Err(QuestionError::UnknownCorrectAnswer {
                answer: self.correct_answer,
            });
        }

        Ok(Question {
            id: self.id,
            text: self.text,
            options: self.options,
            correct_answer: self.correct_answer,
            points: self.points,
            explanation: self.explanation,
            misconception: self.misconception,
            difficulty: self.difficulty,
            kind: self.kind,
            topic: self.topic,
            subtopic: self.subtopic,
        })
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A validated, immutable quiz question.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    correct_answer: String,
    points: u32,
    explanation: Option<String>,
    misconception: Option<String>,
    difficulty: Difficulty,
    kind: QuestionKind,
    topic: String,
    subtopic: Option<String>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn misconception(&self) -> Option<&str> {
        self.misconception.as_deref()
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn subtopic(&self) -> Option<&str> {
        self.subtopic.as_deref()
    }

    /// Option keys in display order.
    pub fn option_keys(&self) -> impl Iterator<Item = &str> {
        self.options.iter().filter_map(|option| option_key(option))
    }

    /// `(key, label)` pairs in display order.
    pub fn keyed_options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options
            .iter()
            .filter_map(|option| option_key(option).map(|key| (key, option.as_str())))
    }

    #[must_use]
    pub fn has_option(&self, key: &str) -> bool {
        self.option_keys().any(|candidate| candidate == key)
    }

    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }

    /// Points earned by `answer`: full value when correct, otherwise zero.
    #[must_use]
    pub fn points_for(&self, answer: &str) -> u32 {
        if self.is_correct(answer) { self.points } else { 0 }
    }
}
