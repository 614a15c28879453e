//! Learning Blocks
//!
//! A learning block is one unit of generated content attached to a subtopic:
//! reading material, a quiz, or an interactive game. Blocks are a tagged sum
//! type discriminated by the `type` field on the wire, matching the JSON the
//! generation prompts ask the model for (`MATERIAL`, `QUIZ_TRUE_FALSE`,
//! `QUIZ_CHOICE`, `GAME`). Blocks are appended in generation order and never
//! reordered.

use serde::{Deserialize, Serialize};

/// One unit of generated learning content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum LearningBlock {
    #[serde(rename = "MATERIAL")]
    Material(MaterialBlock),
    #[serde(rename = "QUIZ_TRUE_FALSE")]
    TrueFalseQuiz(TrueFalseQuizBlock),
    #[serde(rename = "QUIZ_CHOICE")]
    ChoiceQuiz(ChoiceQuizBlock),
    #[serde(rename = "GAME")]
    Game(GameBlock),
}

/// Reading material for a subtopic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaterialBlock {
    pub title: String,
    pub material: MaterialBody,
    /// Short summary of the material, reused as generation context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<Reference>>,
}

/// Material is either a single markdown string or an ordered sequence of
/// text/image parts. Models return both shapes, so both deserialize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MaterialBody {
    Markdown(String),
    Parts(Vec<MaterialPart>),
}

impl MaterialBody {
    /// Concatenates the textual content of the body, joining multi-part
    /// bodies with newlines.
    pub fn text(&self) -> String {
        match self {
            MaterialBody::Markdown(text) => text.clone(),
            MaterialBody::Parts(parts) => parts
                .iter()
                .map(|part| part.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPart {
    pub text: String,
    pub image_url: String,
    pub image_description: String,
}

/// External resource reference attached to a material block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reference {
    pub title: String,
    pub url: String,
}

/// True/false quiz over a subtopic's existing material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrueFalseQuizBlock {
    pub title: String,
    pub questions: Vec<TrueFalseQuizQuestion>,
    /// Set after the user completes the quiz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrueFalseQuizQuestion {
    pub question: String,
    pub correct_answer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Multiple-choice quiz over a subtopic's existing material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceQuizBlock {
    pub title: String,
    pub questions: Vec<ChoiceQuizQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceQuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_option_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Self-contained interactive HTML game, rendered in an isolated frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameBlock {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub html: String,
}

/// Which quiz flavor a result belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuizKind {
    #[serde(rename = "QUIZ_TRUE_FALSE")]
    TrueFalse,
    #[serde(rename = "QUIZ_CHOICE")]
    Choice,
}

/// Outcome of a completed quiz, sent to a provider for mastery scoring.
/// Ephemeral: constructed per submission, never persisted on the topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub subtopic_id: String,
    pub subtopic_title: String,
    pub quiz_type: QuizKind,
    pub questions: Vec<QuizQuestionResult>,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionResult {
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_block_round_trips_with_type_tag() {
        let block = LearningBlock::Material(MaterialBlock {
            title: "Ownership".to_string(),
            material: MaterialBody::Markdown("Every value has a single owner.".to_string()),
            summary: Some("Ownership basics".to_string()),
            references: Some(vec![Reference {
                title: "The Book".to_string(),
                url: "https://doc.rust-lang.org/book/".to_string(),
            }]),
        });

        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "MATERIAL");
        assert_eq!(json["title"], "Ownership");

        let back: LearningBlock = serde_json::from_value(json).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn quiz_blocks_use_original_discriminants() {
        let tf = LearningBlock::TrueFalseQuiz(TrueFalseQuizBlock {
            title: "Check".to_string(),
            questions: vec![TrueFalseQuizQuestion {
                question: "References can outlive their referent".to_string(),
                correct_answer: false,
                explanation: Some("The borrow checker forbids it".to_string()),
            }],
            passed: None,
        });
        let json = serde_json::to_value(&tf).unwrap();
        assert_eq!(json["type"], "QUIZ_TRUE_FALSE");
        assert_eq!(json["questions"][0]["correctAnswer"], false);

        let choice = LearningBlock::ChoiceQuiz(ChoiceQuizBlock {
            title: "Pick one".to_string(),
            questions: vec![ChoiceQuizQuestion {
                question: "Which keyword moves a value?".to_string(),
                options: vec!["let".into(), "move".into(), "ref".into(), "mut".into()],
                correct_option_index: 1,
                explanation: None,
            }],
            passed: Some(true),
        });
        let json = serde_json::to_value(&choice).unwrap();
        assert_eq!(json["type"], "QUIZ_CHOICE");
        assert_eq!(json["questions"][0]["correctOptionIndex"], 1);
    }

    #[test]
    fn material_body_deserializes_both_shapes() {
        let plain: MaterialBlock =
            serde_json::from_str(r#"{"title":"T","material":"just markdown"}"#).unwrap();
        assert_eq!(plain.material.text(), "just markdown");

        let parts: MaterialBlock = serde_json::from_str(
            r#"{"title":"T","material":[
                {"text":"part one","imageUrl":"http://x/1.png","imageDescription":"one"},
                {"text":"part two","imageUrl":"http://x/2.png","imageDescription":"two"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(parts.material.text(), "part one\npart two");
    }

    #[test]
    fn unknown_block_type_is_rejected() {
        let result: Result<LearningBlock, _> =
            serde_json::from_str(r#"{"type":"VIDEO","title":"clip"}"#);
        assert!(result.is_err());
    }
}
