//! Prompt Builder
//!
//! Deterministic prompt templates for every generation operation. Each
//! builder embeds topic/subtopic context, previously covered material, and
//! the user's style preferences, and ends with the shared compact-JSON
//! output instruction so responses survive the normalizer unchanged.

use crate::block::QuizResult;
use crate::topic::{Subtopic, Topic, learning_plan_style_summary};

const JSON_FORMAT_PROMPT: &str = "Only output raw, compact JSON with no formatting, explanation, or markdown. Do not use line breaks or indentation. Just return the JSON object.";

/// Renders the topic outline (sections, subtopics, ids, summaries) used as
/// context when generating new subtopics.
pub fn format_topic_structure(topic: &Topic) -> String {
    let mut result = format!("Topic: {} (Subject: {})\n\n", topic.title, topic.subject);
    for (section_index, section) in topic.sections.iter().enumerate() {
        result.push_str(&format!("Section {}: {}\n", section_index + 1, section.title));
        for (subtopic_index, subtopic) in section.subtopics.iter().enumerate() {
            result.push_str(&format!(
                "  - {}.{} {} (ID: {})",
                section_index + 1,
                subtopic_index + 1,
                subtopic.title,
                subtopic.id
            ));
            if let Some(summary) = &subtopic.summary {
                result.push_str(&format!(": {summary}"));
            }
            result.push('\n');
        }
        result.push('\n');
    }
    result
}

/// The "Learning Style Preferences" paragraph for a topic, or an empty
/// string when the topic has no style configured yet.
pub fn learning_style_preferences(topic: &Topic) -> String {
    let Some(style) = &topic.learning_style else {
        return String::new();
    };
    format!(
        "Learning Style Preferences:\n\
         - Material size: {} ({})\n\
         - Material style: {} ({})\n\
         - Quiz difficulty: {} ({})\n\
         - Quiz size: {} ({})\n\
         - Learning plan style: {}",
        serde_plain(&style.material_size),
        style.material_size.description(),
        serde_plain(&style.material_style),
        style.material_style.description(),
        serde_plain(&style.quiz_difficulty),
        style.quiz_difficulty.description(),
        serde_plain(&style.quiz_size),
        style.quiz_size.description(),
        learning_plan_style_summary(topic.learning_plan_style.as_ref()),
    )
}

// Renders a unit enum through its serde wire value ("story-telling" etc.).
fn serde_plain<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

pub fn clarification_questions(
    prompt: &str,
    previous_qa_context: &str,
    question_number: Option<u32>,
) -> String {
    let ask = match question_number {
        Some(number) => format!(
            "Generate question #{number} that would help you better understand what I want to learn.\n\
             This question should build upon the previous questions and answers to dig deeper or explore new aspects."
        ),
        None => "Generate 3 clarification questions that would help you better understand what I want to learn.".to_string(),
    };
    format!(
        "I want to learn about: \"{prompt}\"\n\n\
         {ask}\n\n\
         Previous questions and answers:\n{previous_qa_context}\n\n\
         Return the questions in JSON format as an array of objects with a \"question\" property:\n\
         [\n  {{ \"question\": \"Your follow-up question based on previous context?\" }}\n]\n\n\
         {JSON_FORMAT_PROMPT}"
    )
}

pub fn topic_plan(prompt: &str, clarification_info: &str) -> String {
    format!(
        "Generate a tailored learning plan for a user aspiring to learn the following topic:\n\
         {prompt}\n\n\
         {clarification_info}\n\n\
         Follow these steps to create an effective learning plan:\n\
         - Focus on the specific topic: \"{prompt}\"\n\
         - Within each section, create subtopics that represent specific concepts or skills\n\
         - Each subtopic should be a fundamental concept or area within its section\n\
         - Make subtopics clear and distinct from each other\n\
         - Include a concise summary of not more than 144 characters for each subtopic that describes its content and purpose\n\
         - Generate at least 3 sections and 3 subtopics for each section\n\n\
         Generate a structure where:\n\
         - The topic is organized into sections\n\
         - Each section contains multiple subtopics\n\
         - Ensure subtopic IDs follow the pattern: 'subtopic-0', 'subtopic-1', etc.\n\
         - IMPORTANT: Assign an \"order\" number to each subtopic that represents the sequence in which they should be learned\n\
           - Subtopics within each section should have sequential order numbers (1, 2, 3, etc.)\n\
           - The order should reflect a logical learning progression from foundational to more advanced concepts\n\n\
         The content will be used to create a Topic with the following structure:\n\
         {{\n\
           \"id\": \"ID of the topic\",\n\
           \"title\": \"Title of the topic\",\n\
           \"subject\": \"Subject of the topic\",\n\
           \"sections\": [\n\
             {{\n\
               \"id\": \"section-1\",\n\
               \"title\": \"Section 1 Title\",\n\
               \"subtopics\": [\n\
                 {{\"id\": \"subtopic-0\", \"title\": \"Subtopic 1\", \"order\": 1, \"summary\": \"Concise summary of the subtopic (max 144 characters)\"}}\n\
               ]\n\
             }}\n\
           ]\n\
         }}\n\n\
         {JSON_FORMAT_PROMPT}"
    )
}

pub fn learning_block(
    topic: &Topic,
    subtopic: &Subtopic,
    covered_material: &str,
    user_prompt: Option<&str>,
    learning_style_prompt: &str,
) -> String {
    let covered = if covered_material.is_empty() {
        String::new()
    } else {
        format!("Already Covered Material:\n{covered_material}\n\n")
    };
    let request = match user_prompt {
        Some(prompt) if !prompt.is_empty() => format!("User's specific request:\n{prompt}\n\n"),
        _ => String::new(),
    };
    let style = if learning_style_prompt.is_empty() {
        String::new()
    } else {
        format!("User's learning style preferences:\n{learning_style_prompt}\n\n")
    };
    format!(
        "Generate a learning block for the subtopic: \"{subtopic_title}\" (ID: {subtopic_id})\n\n\
         Topic Summary:\n\
           - Topic: {topic_title}\n\
           - Subject: {subject}\n\n\
         {covered}{request}{style}\
         The learning material should:\n\
         - Be relevant to the subtopic \"{subtopic_title}\"\n\
         - Be formatted in markdown\n\
         - Be comprehensive but concise (about 1-minute read)\n\
         - Include a concise summary that captures the key points of the material\n\
         - Include 2-3 references to high-quality external resources with a descriptive title and a valid URL\n\
         - Build upon the already covered material without repeating the same content\n\
         - Provide new insights, examples, or deeper explanations that complement the existing blocks\n\
         - Include code blocks where appropriate if the subject is software development related\n\
         - Adapt to the user's learning style preferences if provided\n\n\
         Create a learning block with the following structure:\n\
         {{\n\
           \"title\": \"Learning Block Title\",\n\
           \"material\": \"Learning material in markdown format\",\n\
           \"summary\": \"A concise summary of the learning material (up to 280 characters)\",\n\
           \"references\": [{{\"title\": \"Reference Title\", \"url\": \"https://example.com/reference-url\"}}],\n\
           \"type\": \"MATERIAL\"\n\
         }}\n\n\
         {JSON_FORMAT_PROMPT}",
        subtopic_title = subtopic.title,
        subtopic_id = subtopic.id,
        topic_title = topic.title,
        subject = topic.subject,
    )
}

fn quiz_grounding(covered_material: &str) -> String {
    if covered_material.is_empty() {
        "Note: There are no learning blocks available for this subtopic yet.".to_string()
    } else {
        format!("Material to base the quiz on (use ONLY this material):\n{covered_material}")
    }
}

pub fn true_false_quiz(
    subtopic: &Subtopic,
    covered_material: &str,
    learning_style_prompt: &str,
) -> String {
    let style = if learning_style_prompt.is_empty() {
        String::new()
    } else {
        format!("User's learning style preferences:\n{learning_style_prompt}\n\n")
    };
    format!(
        "Generate a true/false quiz with multiple questions for the subtopic: \"{subtopic_title}\" (ID: {subtopic_id})\n\n\
         {grounding}\n\n\
         {style}\
         The quiz should:\n\
         - Be relevant to the subtopic \"{subtopic_title}\"\n\
         - Include 3-5 clear, unambiguous true/false questions\n\
         - Be challenging but fair based ONLY on the provided learning blocks\n\
         - Have definitive correct answers (true or false) for each question\n\
         - Include a concise explanation (up to 144 characters) for each question explaining why the answer is true or false\n\
         - DO NOT include information from outside the provided learning blocks\n\
         - If no learning blocks are provided, create very basic questions about the subtopic title only\n\n\
         Create a true/false quiz with the following structure:\n\
         {{\n\
           \"title\": \"Quiz Title\",\n\
           \"type\": \"QUIZ_TRUE_FALSE\",\n\
           \"questions\": [\n\
             {{\"question\": \"A clear true/false question about the topic\", \"correctAnswer\": true, \"explanation\": \"Brief explanation (up to 144 characters)\"}}\n\
           ]\n\
         }}\n\n\
         {JSON_FORMAT_PROMPT}",
        subtopic_title = subtopic.title,
        subtopic_id = subtopic.id,
        grounding = quiz_grounding(covered_material),
    )
}

pub fn choice_quiz(
    subtopic: &Subtopic,
    covered_material: &str,
    learning_style_prompt: &str,
) -> String {
    let style = if learning_style_prompt.is_empty() {
        String::new()
    } else {
        format!("User's learning style preferences:\n{learning_style_prompt}\n\n")
    };
    format!(
        "Generate a multiple choice quiz with several questions for the subtopic: \"{subtopic_title}\" (ID: {subtopic_id})\n\n\
         {grounding}\n\n\
         {style}\
         The quiz should:\n\
         - Be relevant to the subtopic \"{subtopic_title}\"\n\
         - Include 3-5 clear, unambiguous multiple choice questions\n\
         - Each question should have 4 options (A, B, C, D)\n\
         - Be challenging but fair based ONLY on the provided learning blocks\n\
         - Have one definitive correct answer for each question\n\
         - Include a concise explanation (up to 144 characters) for each question explaining why the correct answer is right\n\
         - DO NOT include information from outside the provided learning blocks\n\
         - If no learning blocks are provided, create very basic questions about the subtopic title only\n\n\
         Create a multiple choice quiz with the following structure:\n\
         {{\n\
           \"title\": \"Multiple Choice Quiz Title\",\n\
           \"type\": \"QUIZ_CHOICE\",\n\
           \"questions\": [\n\
             {{\"question\": \"A clear multiple choice question about the topic\", \"options\": [\"Option A\", \"Option B\", \"Option C\", \"Option D\"], \"correctOptionIndex\": 0, \"explanation\": \"Brief explanation (up to 144 characters)\"}}\n\
           ]\n\
         }}\n\n\
         {JSON_FORMAT_PROMPT}",
        subtopic_title = subtopic.title,
        subtopic_id = subtopic.id,
        grounding = quiz_grounding(covered_material),
    )
}

pub fn subtopic(
    topic: &Topic,
    topic_structure: &str,
    parent_subtopic: &Subtopic,
    sibling_titles: &[String],
    custom_prompt: Option<&str>,
) -> String {
    let siblings = sibling_titles
        .iter()
        .enumerate()
        .map(|(index, title)| format!("{}. {}", index + 1, title))
        .collect::<Vec<_>>()
        .join("\n");
    let custom = match custom_prompt {
        Some(prompt) if !prompt.is_empty() => format!(
            "User's custom prompt for this subtopic:\n{prompt}\n\n\
             IMPORTANT: Use the user's custom prompt to guide the creation of this subtopic, but ensure it still fits within the overall topic structure.\n\n"
        ),
        _ => String::new(),
    };
    format!(
        "Generate a new subtopic for the parent subtopic: \"{parent_title}\" (ID: {parent_id})\n\n\
         Topic Summary:\n\
           - Topic: {topic_title}\n\
           - Subject: {subject}\n\n\
         Complete Topic Structure:\n{topic_structure}\n\n\
         Sibling subtopics for the current parent:\n{siblings}\n\n\
         {custom}\
         The new subtopic should:\n\
         - Be relevant to the parent subtopic \"{parent_title}\"\n\
         - Have a clear, concise title that describes a specific aspect or concept within the parent subtopic\n\
         - IMPORTANT: Keep the title short - maximum 3 words\n\
         - NOT duplicate ANY of the existing subtopics in the entire topic structure\n\
         - Fill knowledge gaps that are not covered by existing subtopics\n\
         - Have a unique ID that follows the pattern: \"{parent_id}-child-number\"\n\
         - Include a concise summary of not more than 144 characters that describes the content and purpose of this subtopic\n\
         - IMPORTANT: Determine an appropriate \"order\" value that represents where this subtopic should be learned in relation to its siblings\n\n\
         Create a new subtopic with the following structure:\n\
         {{\"id\": \"Generated unique ID\", \"title\": \"New Subtopic Title\", \"order\": 1, \"summary\": \"Concise summary of the subtopic content and purpose (max 144 characters)\"}}\n\n\
         {JSON_FORMAT_PROMPT}",
        parent_title = parent_subtopic.title,
        parent_id = parent_subtopic.id,
        topic_title = topic.title,
        subject = topic.subject,
    )
}

pub fn subtopic_suggestions(
    topic: &Topic,
    topic_structure: &str,
    parent_subtopic: &Subtopic,
    sibling_titles: &[String],
) -> String {
    let siblings = sibling_titles
        .iter()
        .enumerate()
        .map(|(index, title)| format!("{}. {}", index + 1, title))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Generate 3 suggestions for new subtopics for the parent subtopic: \"{parent_title}\" (ID: {parent_id})\n\n\
         Topic Summary:\n\
           - Topic: {topic_title}\n\
           - Subject: {subject}\n\n\
         Complete Topic Structure:\n{topic_structure}\n\n\
         Sibling subtopics for the current parent:\n{siblings}\n\n\
         The suggested subtopics should:\n\
         - Be relevant to the parent subtopic \"{parent_title}\"\n\
         - Have clear, concise descriptions that explain what the user would learn in each subtopic\n\
         - Be distinct from each other and cover different aspects of the parent topic\n\
         - NOT duplicate ANY of the existing subtopics in the entire topic structure\n\
         - Fill knowledge gaps that are not covered by existing subtopics\n\n\
         Create an array of 3 suggestion objects with the following structure:\n\
         [{{\"title\": \"Suggested Subtopic Title\", \"description\": \"Brief description of what this subtopic would cover (1-2 sentences)\"}}]\n\n\
         {JSON_FORMAT_PROMPT}",
        parent_title = parent_subtopic.title,
        parent_id = parent_subtopic.id,
        topic_title = topic.title,
        subject = topic.subject,
    )
}

/// Score-submission prompt shared by both providers. Reports per-question
/// outcomes and asks for a single `{"score": N}` object back.
pub fn quiz_score(quiz_result: &QuizResult) -> String {
    let questions_formatted = quiz_result
        .questions
        .iter()
        .map(|question| {
            format!(
                "Question: {}\n- User answer: {}\n- Correct answer: {}\nIs correct: {}\n---",
                question.question, question.user_answer, question.correct_answer, question.is_correct
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Here is the quiz results subtopic title: {subtopic_title}:\n\
           - PASSED: {passed}\n\
           - questions and results: {questions_formatted}\n\n\
         How good I know this subtopic now? Evaluate all my quizes regarding this subtopic and return me the score of how much of this subtopic material I've learnt where 100 means 'I fully know the subtopic'.\n\
         Your output is a single valid JSON without any other characters around the JSON. Example output: {{\"score\": 70}}",
        subtopic_title = quiz_result.subtopic_title,
        passed = quiz_result.passed,
    )
}
