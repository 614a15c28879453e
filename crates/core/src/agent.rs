//! Agent Provider Interface
//!
//! The capability contract every AI back end must satisfy. Implementations
//! are interchangeable behind `dyn LearnieAgent`; callers obtain one through
//! the factory and never depend on a concrete provider. Every operation is
//! asynchronous and fails with a generation-class [`AgentError`] when the
//! upstream call errors, the response is empty, or normalization fails;
//! partial results are never applied to caller state.

use crate::block::{
    ChoiceQuizBlock, GameBlock, MaterialBlock, QuizResult, TrueFalseQuizBlock,
};
use crate::error::AgentError;
use crate::topic::{LearningPlanStyle, Subtopic, Topic};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A clarification question asked before topic generation, optionally
/// paired with the user's answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClarificationQuestion {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

/// A non-committal subtopic suggestion: generated for display, never
/// attached to the tree until the user accepts it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubtopicSuggestion {
    pub title: String,
    pub description: String,
}

/// Capability set of an AI provider.
#[async_trait]
pub trait LearnieAgent: Send + Sync {
    /// Generates clarification questions for a learning request, either the
    /// whole batch or a single numbered follow-up building on prior Q&A.
    async fn generate_clarification_questions(
        &self,
        prompt: &str,
        previous_qa: &[ClarificationQuestion],
        question_number: Option<u32>,
    ) -> Result<Vec<ClarificationQuestion>, AgentError>;

    /// Generates a full topic (sections and subtopics) from a free-text
    /// prompt and an optional learning-plan style descriptor.
    async fn generate_topic(
        &self,
        prompt: &str,
        plan_style: Option<&LearningPlanStyle>,
    ) -> Result<Topic, AgentError>;

    /// Generates one material block for a subtopic, building on the material
    /// already covered and an optional free-text follow-up prompt.
    async fn generate_learning_block(
        &self,
        topic: &Topic,
        subtopic_id: &str,
        prompt: Option<&str>,
    ) -> Result<MaterialBlock, AgentError>;

    /// Generates a true/false quiz grounded only in the subtopic's existing
    /// material blocks.
    async fn generate_true_false_quiz(
        &self,
        topic: &Topic,
        subtopic_id: &str,
    ) -> Result<TrueFalseQuizBlock, AgentError>;

    /// Generates a multiple-choice quiz grounded only in the subtopic's
    /// existing material blocks.
    async fn generate_choice_quiz(
        &self,
        topic: &Topic,
        subtopic_id: &str,
    ) -> Result<ChoiceQuizBlock, AgentError>;

    /// Generates a new child subtopic for a parent, optionally guided by a
    /// custom prompt. The result is not attached to any topic; the state
    /// store assigns final id and position on insert.
    async fn generate_subtopic(
        &self,
        topic: &Topic,
        parent_subtopic_id: &str,
        custom_prompt: Option<&str>,
    ) -> Result<Subtopic, AgentError>;

    /// Generates title/description suggestions for new subtopics without
    /// mutating any state.
    async fn generate_subtopic_suggestions(
        &self,
        topic: &Topic,
        parent_subtopic_id: &str,
    ) -> Result<Vec<SubtopicSuggestion>, AgentError>;

    /// Submits a completed quiz result and returns an updated mastery score
    /// (0-100). Best-effort: implementations swallow failures and return 0.
    async fn send_quiz_results_and_get_subtopic_score(
        &self,
        topic_id: &str,
        quiz_result: &QuizResult,
    ) -> Result<u8, AgentError>;

    /// Generates a self-contained interactive HTML game for a subtopic.
    /// Optional capability; providers without it return
    /// [`AgentError::NotSupported`].
    async fn generate_html_game(
        &self,
        topic: &Topic,
        subtopic_id: &str,
    ) -> Result<GameBlock, AgentError>;
}

/// A mock `LearnieAgent` for development and integration testing.
///
/// This implementation provides predictable, deterministic output, which is
/// useful for testing scenarios without external dependencies or API costs.
pub struct MockLearnieAgent;

#[async_trait]
impl LearnieAgent for MockLearnieAgent {
    async fn generate_clarification_questions(
        &self,
        prompt: &str,
        previous_qa: &[ClarificationQuestion],
        question_number: Option<u32>,
    ) -> Result<Vec<ClarificationQuestion>, AgentError> {
        let questions = match question_number {
            Some(number) => vec![ClarificationQuestion {
                question: format!("Follow-up question #{number} about {prompt}?"),
                answer: None,
            }],
            None => vec![
                ClarificationQuestion {
                    question: format!("What is your current experience with {prompt}?"),
                    answer: None,
                },
                ClarificationQuestion {
                    question: format!("What do you want to achieve by learning {prompt}?"),
                    answer: None,
                },
                ClarificationQuestion {
                    question: format!(
                        "How much time can you dedicate to {prompt}? (previous answers: {})",
                        previous_qa.len()
                    ),
                    answer: None,
                },
            ],
        };
        Ok(questions)
    }

    /// Generates a standard two-section topic for any given prompt.
    async fn generate_topic(
        &self,
        prompt: &str,
        plan_style: Option<&LearningPlanStyle>,
    ) -> Result<Topic, AgentError> {
        let section = |id: &str, title: &str, subtopics: Vec<Subtopic>| crate::topic::Section {
            id: id.to_string(),
            title: title.to_string(),
            subtopics,
            image_url: None,
        };
        let subtopic = |id: &str, title: &str, order: i32| Subtopic {
            id: id.to_string(),
            title: title.to_string(),
            summary: Some(format!("{title} within {prompt}")),
            order,
            learning_blocks: None,
            progress: None,
        };
        Ok(Topic {
            id: "mock-topic".to_string(),
            title: format!("Learning {prompt}"),
            subject: prompt.to_string(),
            sections: vec![
                section(
                    "s1",
                    "Fundamentals",
                    vec![
                        subtopic("s1-t1", "Introduction", 1),
                        subtopic("s1-t2", "Core Concepts", 2),
                    ],
                ),
                section(
                    "s2",
                    "In Practice",
                    vec![
                        subtopic("s2-t1", "Practical Applications", 1),
                        subtopic("s2-t2", "Advanced Topics", 2),
                    ],
                ),
            ],
            learning_style: None,
            learning_plan_style: plan_style.cloned(),
        })
    }

    async fn generate_learning_block(
        &self,
        topic: &Topic,
        subtopic_id: &str,
        _prompt: Option<&str>,
    ) -> Result<MaterialBlock, AgentError> {
        let subtopic = topic.subtopic(subtopic_id)?;
        Ok(MaterialBlock {
            title: format!("About {}", subtopic.title),
            material: crate::block::MaterialBody::Markdown(format!(
                "# {}\n\nDeterministic material for testing.",
                subtopic.title
            )),
            summary: Some(format!("Summary of {}", subtopic.title)),
            references: None,
        })
    }

    async fn generate_true_false_quiz(
        &self,
        topic: &Topic,
        subtopic_id: &str,
    ) -> Result<TrueFalseQuizBlock, AgentError> {
        let subtopic = topic.subtopic(subtopic_id)?;
        Ok(TrueFalseQuizBlock {
            title: format!("{} Quiz", subtopic.title),
            questions: vec![crate::block::TrueFalseQuizQuestion {
                question: format!("{} is part of this topic.", subtopic.title),
                correct_answer: true,
                explanation: None,
            }],
            passed: None,
        })
    }

    async fn generate_choice_quiz(
        &self,
        topic: &Topic,
        subtopic_id: &str,
    ) -> Result<ChoiceQuizBlock, AgentError> {
        let subtopic = topic.subtopic(subtopic_id)?;
        Ok(ChoiceQuizBlock {
            title: format!("{} Quiz", subtopic.title),
            questions: vec![crate::block::ChoiceQuizQuestion {
                question: "Which subtopic is this quiz about?".to_string(),
                options: vec![
                    subtopic.title.clone(),
                    "None of these".to_string(),
                    "All of these".to_string(),
                    "Unrelated".to_string(),
                ],
                correct_option_index: 0,
                explanation: None,
            }],
            passed: None,
        })
    }

    async fn generate_subtopic(
        &self,
        topic: &Topic,
        parent_subtopic_id: &str,
        _custom_prompt: Option<&str>,
    ) -> Result<Subtopic, AgentError> {
        let parent = topic.subtopic(parent_subtopic_id)?;
        Ok(Subtopic {
            id: format!("{parent_subtopic_id}-child-1"),
            title: format!("Deep Dive: {}", parent.title),
            summary: Some(format!("A closer look at {}", parent.title)),
            order: 0,
            learning_blocks: None,
            progress: None,
        })
    }

    async fn generate_subtopic_suggestions(
        &self,
        topic: &Topic,
        parent_subtopic_id: &str,
    ) -> Result<Vec<SubtopicSuggestion>, AgentError> {
        let parent = topic.subtopic(parent_subtopic_id)?;
        Ok(vec![
            SubtopicSuggestion {
                title: format!("{} Foundations", parent.title),
                description: "Builds up the prerequisites.".to_string(),
            },
            SubtopicSuggestion {
                title: format!("{} in Practice", parent.title),
                description: "Worked examples and exercises.".to_string(),
            },
            SubtopicSuggestion {
                title: format!("{} Pitfalls", parent.title),
                description: "Common mistakes and how to avoid them.".to_string(),
            },
        ])
    }

    /// Scores the percentage of correctly answered questions.
    async fn send_quiz_results_and_get_subtopic_score(
        &self,
        _topic_id: &str,
        quiz_result: &QuizResult,
    ) -> Result<u8, AgentError> {
        if quiz_result.questions.is_empty() {
            return Ok(0);
        }
        let correct = quiz_result
            .questions
            .iter()
            .filter(|question| question.is_correct)
            .count();
        Ok((correct * 100 / quiz_result.questions.len()) as u8)
    }

    async fn generate_html_game(
        &self,
        topic: &Topic,
        subtopic_id: &str,
    ) -> Result<GameBlock, AgentError> {
        let subtopic = topic.subtopic(subtopic_id)?;
        Ok(GameBlock {
            title: format!("{} Game", subtopic.title),
            summary: None,
            html: "<!DOCTYPE html><html><body>Mock game</body></html>".to_string(),
        })
    }
}

/// Renders prior Q&A into the context paragraph the clarification prompt
/// expects; empty when there is no history.
pub(crate) fn previous_qa_context(previous_qa: &[ClarificationQuestion]) -> String {
    previous_qa
        .iter()
        .enumerate()
        .map(|(index, qa)| {
            format!(
                "Question {n}: {question}\nAnswer {n}: {answer}",
                n = index + 1,
                question = qa.question,
                answer = qa.answer.as_deref().unwrap_or("No answer provided"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clarification_question_serde_shape() {
        let parsed: Vec<ClarificationQuestion> =
            serde_json::from_str(r#"[{"question":"What is your current level?"}]"#).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].question, "What is your current level?");
        assert_eq!(parsed[0].answer, None);
    }

    #[test]
    fn previous_qa_context_numbers_pairs_and_defaults_answers() {
        let context = previous_qa_context(&[
            ClarificationQuestion {
                question: "Why?".to_string(),
                answer: Some("For work".to_string()),
            },
            ClarificationQuestion {
                question: "How deep?".to_string(),
                answer: None,
            },
        ]);
        assert!(context.contains("Question 1: Why?\nAnswer 1: For work"));
        assert!(context.contains("Question 2: How deep?\nAnswer 2: No answer provided"));
    }

    #[tokio::test]
    async fn mock_agent_generates_a_deterministic_topic() {
        let agent: Box<dyn LearnieAgent> = Box::new(MockLearnieAgent);
        let topic = agent.generate_topic("chess", None).await.unwrap();
        assert_eq!(topic.title, "Learning chess");
        assert_eq!(topic.sections.len(), 2);
        assert_eq!(
            topic.subtopic_ids(),
            vec!["s1-t1", "s1-t2", "s2-t1", "s2-t2"]
        );
        assert!(agent.generate_learning_block(&topic, "s1-t1", None).await.is_ok());
        assert!(agent.generate_learning_block(&topic, "missing", None).await.is_err());
    }

    #[tokio::test]
    async fn mock_agent_scores_the_correct_answer_ratio() {
        use crate::block::{QuizKind, QuizQuestionResult};

        let question = |is_correct| QuizQuestionResult {
            question: "Q".to_string(),
            user_answer: "A".to_string(),
            correct_answer: "A".to_string(),
            is_correct,
        };
        let result = QuizResult {
            subtopic_id: "s1-t1".to_string(),
            subtopic_title: "Introduction".to_string(),
            quiz_type: QuizKind::TrueFalse,
            questions: vec![question(true), question(true), question(false), question(true)],
            passed: true,
        };

        let score = MockLearnieAgent
            .send_quiz_results_and_get_subtopic_score("mock-topic", &result)
            .await
            .unwrap();
        assert_eq!(score, 75);
    }
}
