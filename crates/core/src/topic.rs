//! Topic Content Model
//!
//! The tree-shaped content model: a topic owns ordered sections, a section
//! owns ordered subtopics, and a subtopic lazily accumulates learning blocks.
//! Ownership is strict (no sharing, no cycles). Subtopic ids must be unique
//! across all sections of a topic; lookups scan section by section and return
//! the first match.
//!
//! Serialization keeps the camelCase wire format the generation prompts ask
//! the model for, so storage round-trips and model output share one schema.

use crate::block::LearningBlock;
use crate::error::TopicError;
use serde::{Deserialize, Serialize};

/// Root learning unit, created by a topic-generation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_style: Option<LearningStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_plan_style: Option<LearningPlanStyle>,
}

/// Named grouping of subtopics. Sections are fixed at topic generation;
/// there is no add/remove-section operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub title: String,
    pub subtopics: Vec<Subtopic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// An individually learnable unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subtopic {
    /// Unique within the owning topic, not globally.
    pub id: String,
    pub title: String,
    /// Short summary (up to 144 characters), used only in prompts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Intended learning sequence among siblings.
    #[serde(default)]
    pub order: i32,
    /// Lazily generated; absent until the first generation call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_blocks: Option<Vec<LearningBlock>>,
    /// Mastery score from 0 to 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

impl Topic {
    /// Finds a subtopic by id, scanning all sections in order.
    pub fn subtopic(&self, subtopic_id: &str) -> Result<&Subtopic, TopicError> {
        self.sections
            .iter()
            .flat_map(|section| section.subtopics.iter())
            .find(|subtopic| subtopic.id == subtopic_id)
            .ok_or_else(|| TopicError::SubtopicNotFound(subtopic_id.to_string()))
    }

    /// Mutable variant of [`Topic::subtopic`].
    pub fn subtopic_mut(&mut self, subtopic_id: &str) -> Result<&mut Subtopic, TopicError> {
        self.sections
            .iter_mut()
            .flat_map(|section| section.subtopics.iter_mut())
            .find(|subtopic| subtopic.id == subtopic_id)
            .ok_or_else(|| TopicError::SubtopicNotFound(subtopic_id.to_string()))
    }

    /// Returns the section that directly contains the given subtopic.
    pub fn section_for_subtopic(&self, subtopic_id: &str) -> Result<&Section, TopicError> {
        self.sections
            .iter()
            .find(|section| {
                section
                    .subtopics
                    .iter()
                    .any(|subtopic| subtopic.id == subtopic_id)
            })
            .ok_or_else(|| TopicError::SectionNotFound {
                topic: self.id.clone(),
                subtopic: subtopic_id.to_string(),
            })
    }

    /// All subtopic ids in the topic, in section order.
    pub fn subtopic_ids(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(|section| section.subtopics.iter())
            .map(|subtopic| subtopic.id.clone())
            .collect()
    }
}

impl Subtopic {
    /// Builds a deterministic text digest of this subtopic's MATERIAL blocks,
    /// in block order, for reuse as generation context. Pure and idempotent;
    /// returns an empty string when no material blocks exist.
    pub fn summarize_material_blocks(&self) -> String {
        let material_blocks: Vec<_> = self
            .learning_blocks
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|block| match block {
                LearningBlock::Material(material) => Some(material),
                _ => None,
            })
            .collect();

        if material_blocks.is_empty() {
            return String::new();
        }

        let mut summary = String::from("Existing Learning Blocks:\n");
        for (index, block) in material_blocks.iter().enumerate() {
            summary.push_str(&format!(
                "Block {}: {}\n{}\n\n",
                index + 1,
                block.title,
                block.material.text()
            ));
        }
        summary
    }
}

/// How much material one generation call should produce.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MaterialSize {
    #[serde(rename = "small")]
    Small,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "large")]
    Large,
}

impl MaterialSize {
    pub fn description(&self) -> &'static str {
        match self {
            MaterialSize::Small => "Concise content with essential information. 1 min reading time",
            MaterialSize::Medium => "Balanced content with good detail. 5 mins reading time.",
            MaterialSize::Large => {
                "Comprehensive content with in-depth explanations. 10 mins reading time."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MaterialStyle {
    #[serde(rename = "story-telling")]
    Storytelling,
    #[serde(rename = "bulletin points")]
    BulletinPoints,
}

impl MaterialStyle {
    pub fn description(&self) -> &'static str {
        match self {
            MaterialStyle::Storytelling => "Narrative approach with flowing explanations",
            MaterialStyle::BulletinPoints => {
                "Structured list format for easy scanning and markdown formatting"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuizDifficulty {
    #[serde(rename = "basic")]
    Basic,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "advanced")]
    Advanced,
}

impl QuizDifficulty {
    pub fn description(&self) -> &'static str {
        match self {
            QuizDifficulty::Basic => "Fundamental concepts for beginners",
            QuizDifficulty::Medium => "Balanced complexity for intermediate learners",
            QuizDifficulty::Advanced => "Challenging questions requiring deeper understanding",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuizSize {
    #[serde(rename = "small")]
    Small,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "large")]
    Large,
}

impl QuizSize {
    pub fn description(&self) -> &'static str {
        match self {
            QuizSize::Small => "Fewer questions for quick assessment",
            QuizSize::Medium => "Balanced set of questions",
            QuizSize::Large => "Comprehensive testing with many questions",
        }
    }
}

/// Per-topic material and quiz preferences, mutable through the state store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LearningStyle {
    pub material_size: MaterialSize,
    pub material_style: MaterialStyle,
    pub quiz_difficulty: QuizDifficulty,
    pub quiz_size: QuizSize,
}

impl Default for LearningStyle {
    fn default() -> Self {
        Self {
            material_size: MaterialSize::Medium,
            material_style: MaterialStyle::Storytelling,
            quiz_difficulty: QuizDifficulty::Medium,
            quiz_size: QuizSize::Medium,
        }
    }
}

/// Partial update merged over a topic's current (or default) learning style.
#[derive(Debug, Clone, Copy, Default)]
pub struct LearningStyleUpdate {
    pub material_size: Option<MaterialSize>,
    pub material_style: Option<MaterialStyle>,
    pub quiz_difficulty: Option<QuizDifficulty>,
    pub quiz_size: Option<QuizSize>,
}

impl LearningStyle {
    /// Returns this style with the set fields of `update` applied.
    pub fn merged(&self, update: LearningStyleUpdate) -> LearningStyle {
        LearningStyle {
            material_size: update.material_size.unwrap_or(self.material_size),
            material_style: update.material_style.unwrap_or(self.material_style),
            quiz_difficulty: update.quiz_difficulty.unwrap_or(self.quiz_difficulty),
            quiz_size: update.quiz_size.unwrap_or(self.quiz_size),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LearningPlanType {
    #[serde(rename = "explorer")]
    Explorer,
    #[serde(rename = "achiever")]
    Achiever,
    #[serde(rename = "social_learner")]
    SocialLearner,
}

impl LearningPlanType {
    pub fn description(&self) -> &'static str {
        match self {
            LearningPlanType::Explorer => {
                "A flexible, discovery-based learning approach that adapts to your interests and helps you explore new topics organically."
            }
            LearningPlanType::Achiever => {
                "A goal-oriented, structured approach with clear milestones and measurable outcomes to efficiently reach specific learning objectives."
            }
            LearningPlanType::SocialLearner => {
                "A collaborative learning experience that leverages community interaction, peer feedback, and group dynamics to enhance understanding and motivation."
            }
        }
    }
}

/// Plan type plus an optional free-text override prompt. The override wins
/// over the canned plan-type description when both are present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LearningPlanStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_plan_type: Option<LearningPlanType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_plan_type_prompt: Option<String>,
}

/// Resolves a plan style to prompt text: the custom prompt if present, else
/// the canned description for the plan type, else a fixed fallback.
pub fn learning_plan_style_summary(style: Option<&LearningPlanStyle>) -> String {
    match style {
        Some(style) => {
            if let Some(prompt) = style
                .learning_plan_type_prompt
                .as_deref()
                .filter(|prompt| !prompt.is_empty())
            {
                prompt.to_string()
            } else if let Some(plan_type) = style.learning_plan_type {
                plan_type.description().to_string()
            } else {
                "No specific learning plan style selected".to_string()
            }
        }
        None => "No specific learning plan style selected".to_string(),
    }
}
