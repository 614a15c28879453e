//! Direct Chat-Completion Provider
//!
//! Talks to an OpenAI-compatible chat-completion API with deterministic,
//! tightly-templated prompts and fixed sampling parameters. Each operation
//! submits a single user message, consumes the single response choice, and
//! runs the content through the response normalizer before coercing it into
//! the target entity. The credential is validated at construction so a bad
//! key fails before any network call.

use crate::agent::{
    ClarificationQuestion, LearnieAgent, SubtopicSuggestion, previous_qa_context,
};
use crate::block::{
    ChoiceQuizBlock, GameBlock, MaterialBlock, QuizResult, TrueFalseQuizBlock,
};
use crate::error::AgentError;
use crate::llm_json;
use crate::prompts;
use crate::topic::{
    LearningPlanStyle, Subtopic, Topic, learning_plan_style_summary,
};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub const DEFAULT_MODEL: &str = "gpt-4o";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 10_000;

/// Direct provider backed by an OpenAI-compatible chat-completion endpoint.
pub struct OpenAiLearnieAgent {
    client: Client<OpenAIConfig>,
    model: String,
}

#[derive(Deserialize)]
struct ScoreResponse {
    score: u8,
}

impl OpenAiLearnieAgent {
    /// Creates a new direct provider.
    ///
    /// Fails with [`AgentError::Configuration`] when the API key is missing
    /// or not in the expected `sk-` format.
    pub fn new(api_key: &str, model: Option<String>) -> Result<Self, AgentError> {
        if api_key.is_empty() || !api_key.starts_with("sk-") {
            return Err(AgentError::Configuration(
                "Invalid OpenAI API key format".to_string(),
            ));
        }
        let config = OpenAIConfig::new().with_api_key(api_key);
        Ok(Self {
            client: Client::with_config(config),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    /// Submits one user message and normalizes the single response choice.
    async fn json_completion<T: DeserializeOwned>(&self, prompt: String) -> Result<T, AgentError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "Submitting chat completion");
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS)
            .build()?;

        let response = self.client.chat().create(request).await?;
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                AgentError::Generation("Empty response from chat completion".to_string())
            })?;

        llm_json::parse(content)
    }

    fn subtopic_context<'a>(
        topic: &'a Topic,
        subtopic_id: &str,
    ) -> Result<(&'a Subtopic, String, String), AgentError> {
        let subtopic = topic.subtopic(subtopic_id)?;
        let covered = subtopic.summarize_material_blocks();
        let style = prompts::learning_style_preferences(topic);
        Ok((subtopic, covered, style))
    }

    fn sibling_titles(topic: &Topic, parent_subtopic_id: &str) -> Vec<String> {
        topic
            .section_for_subtopic(parent_subtopic_id)
            .map(|section| {
                section
                    .subtopics
                    .iter()
                    .map(|subtopic| subtopic.title.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl LearnieAgent for OpenAiLearnieAgent {
    async fn generate_clarification_questions(
        &self,
        prompt: &str,
        previous_qa: &[ClarificationQuestion],
        question_number: Option<u32>,
    ) -> Result<Vec<ClarificationQuestion>, AgentError> {
        let context = previous_qa_context(previous_qa);
        let full_prompt = prompts::clarification_questions(prompt, &context, question_number);
        self.json_completion(full_prompt).await
    }

    async fn generate_topic(
        &self,
        prompt: &str,
        plan_style: Option<&LearningPlanStyle>,
    ) -> Result<Topic, AgentError> {
        let clarification_info = format!(
            "Use the following learning plan style:\n{}",
            learning_plan_style_summary(plan_style)
        );
        let full_prompt = prompts::topic_plan(prompt, &clarification_info);
        let mut topic: Topic = self.json_completion(full_prompt).await?;
        topic.learning_plan_style = plan_style.cloned();
        Ok(topic)
    }

    async fn generate_learning_block(
        &self,
        topic: &Topic,
        subtopic_id: &str,
        prompt: Option<&str>,
    ) -> Result<MaterialBlock, AgentError> {
        let (subtopic, covered, style) = Self::subtopic_context(topic, subtopic_id)?;
        let full_prompt = prompts::learning_block(topic, subtopic, &covered, prompt, &style);
        self.json_completion(full_prompt).await
    }

    async fn generate_true_false_quiz(
        &self,
        topic: &Topic,
        subtopic_id: &str,
    ) -> Result<TrueFalseQuizBlock, AgentError> {
        let (subtopic, covered, style) = Self::subtopic_context(topic, subtopic_id)?;
        let full_prompt = prompts::true_false_quiz(subtopic, &covered, &style);
        self.json_completion(full_prompt).await
    }

    async fn generate_choice_quiz(
        &self,
        topic: &Topic,
        subtopic_id: &str,
    ) -> Result<ChoiceQuizBlock, AgentError> {
        let (subtopic, covered, style) = Self::subtopic_context(topic, subtopic_id)?;
        let full_prompt = prompts::choice_quiz(subtopic, &covered, &style);
        self.json_completion(full_prompt).await
    }

    async fn generate_subtopic(
        &self,
        topic: &Topic,
        parent_subtopic_id: &str,
        custom_prompt: Option<&str>,
    ) -> Result<Subtopic, AgentError> {
        let parent = topic.subtopic(parent_subtopic_id)?;
        let structure = prompts::format_topic_structure(topic);
        let siblings = Self::sibling_titles(topic, parent_subtopic_id);
        let full_prompt = prompts::subtopic(topic, &structure, parent, &siblings, custom_prompt);
        self.json_completion(full_prompt).await
    }

    async fn generate_subtopic_suggestions(
        &self,
        topic: &Topic,
        parent_subtopic_id: &str,
    ) -> Result<Vec<SubtopicSuggestion>, AgentError> {
        let parent = topic.subtopic(parent_subtopic_id)?;
        let structure = prompts::format_topic_structure(topic);
        let siblings = Self::sibling_titles(topic, parent_subtopic_id);
        let full_prompt = prompts::subtopic_suggestions(topic, &structure, parent, &siblings);
        self.json_completion(full_prompt).await
    }

    async fn send_quiz_results_and_get_subtopic_score(
        &self,
        topic_id: &str,
        quiz_result: &QuizResult,
    ) -> Result<u8, AgentError> {
        // Mastery scoring is best-effort telemetry: failures default to 0
        // instead of propagating.
        let full_prompt = prompts::quiz_score(quiz_result);
        match self.json_completion::<ScoreResponse>(full_prompt).await {
            Ok(response) => Ok(response.score.min(100)),
            Err(error) => {
                warn!(topic_id, %error, "Quiz score submission failed, defaulting to 0");
                Ok(0)
            }
        }
    }

    async fn generate_html_game(
        &self,
        _topic: &Topic,
        _subtopic_id: &str,
    ) -> Result<GameBlock, AgentError> {
        Err(AgentError::NotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::tests::sample_topic;

    #[test]
    fn rejects_missing_or_malformed_api_key() {
        assert!(matches!(
            OpenAiLearnieAgent::new("", None),
            Err(AgentError::Configuration(_))
        ));
        assert!(matches!(
            OpenAiLearnieAgent::new("not-a-key", None),
            Err(AgentError::Configuration(_))
        ));
    }

    #[test]
    fn accepts_well_formed_key_and_defaults_model() {
        let agent = OpenAiLearnieAgent::new("sk-test", None).unwrap();
        assert_eq!(agent.model, DEFAULT_MODEL);

        let agent = OpenAiLearnieAgent::new("sk-test", Some("gpt-4.1-mini".to_string())).unwrap();
        assert_eq!(agent.model, "gpt-4.1-mini");
    }

    #[test]
    fn sibling_titles_come_from_the_parent_section_only() {
        let topic = sample_topic();
        let siblings = OpenAiLearnieAgent::sibling_titles(&topic, "s1-t1");
        assert_eq!(siblings, vec!["Ownership".to_string(), "Borrowing".to_string()]);
        assert!(OpenAiLearnieAgent::sibling_titles(&topic, "missing").is_empty());
    }

    #[tokio::test]
    async fn game_generation_is_declined() {
        let agent = OpenAiLearnieAgent::new("sk-test", None).unwrap();
        let topic = sample_topic();
        assert!(matches!(
            agent.generate_html_game(&topic, "s1-t1").await,
            Err(AgentError::NotSupported)
        ));
    }

    #[tokio::test]
    async fn lookup_failure_surfaces_before_any_network_call() {
        let agent = OpenAiLearnieAgent::new("sk-test", None).unwrap();
        let topic = sample_topic();
        let result = agent.generate_learning_block(&topic, "missing", None).await;
        assert!(matches!(result, Err(AgentError::Lookup(_))));
    }
}
