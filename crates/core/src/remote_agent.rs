//! Delegating Remote Provider
//!
//! Talks to a session-oriented remote agent service over HTTP. Each topic
//! maps to one session on the service; sessions are created lazily and
//! idempotently (the service answers HTTP 400 when the session already
//! exists, which is treated as success). Topic generation, learning-block
//! generation, game generation, and score submission run as conversation
//! turns in the session; clarifications, quizzes, and subtopic operations
//! are delegated to an owned direct provider whose tightly-templated
//! prompts serve them better.

use crate::agent::{ClarificationQuestion, LearnieAgent, SubtopicSuggestion};
use crate::block::{
    ChoiceQuizBlock, GameBlock, MaterialBlock, QuizResult, TrueFalseQuizBlock,
};
use crate::error::AgentError;
use crate::llm_json;
use crate::openai_agent::OpenAiLearnieAgent;
use crate::prompts;
use crate::topic::{LearningPlanStyle, Topic, learning_plan_style_summary};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};
use uuid::Uuid;

const AGENT_NAME: &str = "tutor_agent";
const USER_ID: &str = "u_123";

/// Remote provider that delegates a subset of operations to a direct one.
pub struct RemoteLearnieAgent {
    http: reqwest::Client,
    base_url: String,
    delegate: OpenAiLearnieAgent,
}

#[derive(Deserialize)]
struct AgentTurn {
    content: TurnContent,
}

#[derive(Deserialize)]
struct TurnContent {
    parts: Vec<TurnPart>,
}

#[derive(Deserialize)]
struct TurnPart {
    text: String,
}

#[derive(Deserialize)]
struct ScoreResponse {
    score: u8,
}

/// Overwrites the topic id with the session id and regenerates
/// deterministic section (`s{n}`) and subtopic (`s{n}-t{m}`) ids. The
/// upstream model's proposed ids are untrustworthy; this step guarantees
/// uniqueness within the topic and must not be skipped.
fn assign_session_ids(topic: &mut Topic, session_id: &str) {
    topic.id = session_id.to_string();
    for (section_index, section) in topic.sections.iter_mut().enumerate() {
        section.id = format!("s{}", section_index + 1);
        for (subtopic_index, subtopic) in section.subtopics.iter_mut().enumerate() {
            subtopic.id = format!("s{}-t{}", section_index + 1, subtopic_index + 1);
        }
    }
}

impl RemoteLearnieAgent {
    pub fn new(base_url: impl Into<String>, delegate: OpenAiLearnieAgent) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            delegate,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Lazily creates the session for a topic. HTTP 400 means the session
    /// already exists and is treated as success.
    async fn create_session_if_not_exists(&self, session_id: &str) -> Result<(), AgentError> {
        let url = self.url(&format!(
            "/api/apps/{AGENT_NAME}/users/{USER_ID}/sessions/{session_id}"
        ));
        let response = self.http.post(&url).send().await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::BAD_REQUEST => {
                debug!(session_id, "Session already exists, skipping creation");
                Ok(())
            }
            status => Err(AgentError::Generation(format!(
                "Session creation failed with status {status}"
            ))),
        }
    }

    /// Posts one conversation turn and normalizes the text of the first
    /// part of the last turn in the response.
    async fn run(&self, session_id: &str, prompt: String) -> Result<Value, AgentError> {
        debug!(session_id, prompt_len = prompt.len(), "Posting agent turn");
        let body = json!({
            "app_name": AGENT_NAME,
            "user_id": USER_ID,
            "session_id": session_id,
            "new_message": {
                "role": "user",
                "parts": [{ "text": prompt }]
            }
        });

        let response = self.http.post(self.url("/api/run")).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(AgentError::Generation(format!(
                "Agent run failed with status {}",
                response.status()
            )));
        }

        let turns: Vec<AgentTurn> = response.json().await?;
        let text = turns
            .last()
            .and_then(|turn| turn.content.parts.first())
            .map(|part| part.text.as_str())
            .ok_or_else(|| {
                AgentError::Generation("Agent response contained no message parts".to_string())
            })?;

        llm_json::parse_value(text)
    }

    async fn run_typed<T: serde::de::DeserializeOwned>(
        &self,
        session_id: &str,
        prompt: String,
    ) -> Result<T, AgentError> {
        let value = self.run(session_id, prompt).await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl LearnieAgent for RemoteLearnieAgent {
    async fn generate_clarification_questions(
        &self,
        prompt: &str,
        previous_qa: &[ClarificationQuestion],
        question_number: Option<u32>,
    ) -> Result<Vec<ClarificationQuestion>, AgentError> {
        self.delegate
            .generate_clarification_questions(prompt, previous_qa, question_number)
            .await
    }

    async fn generate_topic(
        &self,
        prompt: &str,
        plan_style: Option<&LearningPlanStyle>,
    ) -> Result<Topic, AgentError> {
        let session_id = Uuid::new_v4().to_string();
        self.create_session_if_not_exists(&session_id).await?;

        let request_prompt = format!(
            "Generate a topic based on the following prompt:\n{prompt}\n\n\
             Use the following learning plan style:\n{style}\n\n\
             Use this additional information to better tailor the learning module to the user's needs.",
            style = learning_plan_style_summary(plan_style),
        );

        let mut topic: Topic = self.run_typed(&session_id, request_prompt).await?;
        topic.learning_plan_style = plan_style.cloned();
        assign_session_ids(&mut topic, &session_id);
        Ok(topic)
    }

    async fn generate_learning_block(
        &self,
        topic: &Topic,
        subtopic_id: &str,
        prompt: Option<&str>,
    ) -> Result<MaterialBlock, AgentError> {
        self.create_session_if_not_exists(&topic.id).await?;
        let subtopic = topic.subtopic(subtopic_id)?;
        let covered = subtopic.summarize_material_blocks();
        let style = prompts::learning_style_preferences(topic);

        let request_prompt = format!(
            "Generate learning material for subtopic:\n\
               - topic title: {topic_title}\n\
               - subtopic title: {subtopic_title}\n\
               - summary: {summary}\n\
               - user's prompt: {user_prompt}\n\n\
             Use the following learning style preferences:\n{style}\n\n\
             Already learnt material:\n{covered}",
            topic_title = topic.title,
            subtopic_title = subtopic.title,
            summary = subtopic.summary.as_deref().unwrap_or(""),
            user_prompt = prompt.unwrap_or(""),
        );

        self.run_typed(&topic.id, request_prompt).await
    }

    async fn generate_true_false_quiz(
        &self,
        topic: &Topic,
        subtopic_id: &str,
    ) -> Result<TrueFalseQuizBlock, AgentError> {
        self.delegate.generate_true_false_quiz(topic, subtopic_id).await
    }

    async fn generate_choice_quiz(
        &self,
        topic: &Topic,
        subtopic_id: &str,
    ) -> Result<ChoiceQuizBlock, AgentError> {
        self.delegate.generate_choice_quiz(topic, subtopic_id).await
    }

    async fn generate_subtopic(
        &self,
        topic: &Topic,
        parent_subtopic_id: &str,
        custom_prompt: Option<&str>,
    ) -> Result<crate::topic::Subtopic, AgentError> {
        self.delegate
            .generate_subtopic(topic, parent_subtopic_id, custom_prompt)
            .await
    }

    async fn generate_subtopic_suggestions(
        &self,
        topic: &Topic,
        parent_subtopic_id: &str,
    ) -> Result<Vec<SubtopicSuggestion>, AgentError> {
        self.delegate
            .generate_subtopic_suggestions(topic, parent_subtopic_id)
            .await
    }

    async fn send_quiz_results_and_get_subtopic_score(
        &self,
        topic_id: &str,
        quiz_result: &QuizResult,
    ) -> Result<u8, AgentError> {
        let request_prompt = prompts::quiz_score(quiz_result);
        let submission = async {
            self.create_session_if_not_exists(topic_id).await?;
            self.run_typed::<ScoreResponse>(topic_id, request_prompt).await
        };
        match submission.await {
            Ok(response) => Ok(response.score.min(100)),
            Err(error) => {
                warn!(topic_id, %error, "Quiz score submission failed, defaulting to 0");
                Ok(0)
            }
        }
    }

    async fn generate_html_game(
        &self,
        topic: &Topic,
        subtopic_id: &str,
    ) -> Result<GameBlock, AgentError> {
        self.create_session_if_not_exists(&topic.id).await?;
        let subtopic = topic.subtopic(subtopic_id)?;
        let covered = subtopic.summarize_material_blocks();

        let request_prompt = format!(
            "Generate a small interactive educational game for subtopic:\n\
               - topic title: {topic_title}\n\
               - subtopic title: {subtopic_title}\n\n\
             The game must be a single self-contained HTML document (inline CSS and JavaScript, no external resources) that can be rendered in an isolated frame.\n\n\
             Base the game on the already learnt material:\n{covered}\n\n\
             Return a single JSON object: {{\"title\": \"Game Title\", \"summary\": \"What the game practices\", \"html\": \"<!DOCTYPE html>...\", \"type\": \"GAME\"}}\n\
             Only output raw, compact JSON with no formatting, explanation, or markdown.",
            topic_title = topic.title,
            subtopic_title = subtopic.title,
        );

        self.run_typed(&topic.id, request_prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{QuizKind, QuizQuestionResult};
    use crate::topic::tests::sample_topic;

    fn unreachable_agent() -> RemoteLearnieAgent {
        // Port 1 is never listening; requests fail at connect time.
        let delegate = OpenAiLearnieAgent::new("sk-test", None).unwrap();
        RemoteLearnieAgent::new("http://127.0.0.1:1", delegate)
    }

    #[test]
    fn session_ids_are_deterministic_regardless_of_model_output() {
        let mut topic = sample_topic();
        // Simulate whatever ids the upstream model proposed.
        topic.id = "model-made-this-up".to_string();
        topic.sections[0].id = "intro".to_string();
        topic.sections[0].subtopics[0].id = "subtopic-0".to_string();

        assign_session_ids(&mut topic, "3f6c0b9e");

        assert_eq!(topic.id, "3f6c0b9e");
        let section_ids: Vec<_> = topic.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(section_ids, vec!["s1", "s2"]);
        let subtopic_ids = topic.subtopic_ids();
        assert_eq!(subtopic_ids, vec!["s1-t1", "s1-t2", "s2-t1"]);
    }

    #[test]
    fn session_ids_cover_two_by_three_grids() {
        let mut topic = sample_topic();
        // Grow both sections to three subtopics each.
        for section in &mut topic.sections {
            while section.subtopics.len() < 3 {
                let mut extra = section.subtopics[0].clone();
                extra.id = format!("extra-{}", section.subtopics.len());
                section.subtopics.push(extra);
            }
        }

        assign_session_ids(&mut topic, "session-1");

        assert_eq!(
            topic.subtopic_ids(),
            vec!["s1-t1", "s1-t2", "s1-t3", "s2-t1", "s2-t2", "s2-t3"]
        );
    }

    #[test]
    fn url_building_tolerates_trailing_slash() {
        let delegate = OpenAiLearnieAgent::new("sk-test", None).unwrap();
        let agent = RemoteLearnieAgent::new("http://localhost:8000/", delegate);
        assert_eq!(agent.url("/api/run"), "http://localhost:8000/api/run");
    }

    #[tokio::test]
    async fn score_submission_returns_zero_on_upstream_failure() {
        let agent = unreachable_agent();
        let result = QuizResult {
            subtopic_id: "s1-t1".to_string(),
            subtopic_title: "Ownership".to_string(),
            quiz_type: QuizKind::Choice,
            questions: vec![QuizQuestionResult {
                question: "Q".to_string(),
                user_answer: "A".to_string(),
                correct_answer: "B".to_string(),
                is_correct: false,
            }],
            passed: false,
        };
        let score = agent
            .send_quiz_results_and_get_subtopic_score("topic-1", &result)
            .await
            .unwrap();
        assert_eq!(score, 0);
    }

    #[tokio::test]
    async fn topic_generation_propagates_session_failures() {
        let agent = unreachable_agent();
        let result = agent.generate_topic("learn chess", None).await;
        assert!(matches!(result, Err(AgentError::Http(_))));
    }
}
