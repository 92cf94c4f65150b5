//! Prompt construction for quiz generation.
//!
//! The system prompt pins the JSON contract the reply is parsed against; the
//! user prompt carries the article title and its full plain text.

/// Fewest questions requested from the model.
pub const MIN_QUESTIONS: usize = 5;

/// Most questions requested from the model.
pub const MAX_QUESTIONS: usize = 8;

/// Options per question.
pub const OPTIONS_PER_QUESTION: usize = 4;

const UNTITLED: &str = "Untitled";

/// System and user messages for one generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizPrompt {
    pub system: String,
    pub user: String,
}

/// Build the prompt pair for `text`, titled `title` (or "Untitled").
pub fn build_quiz_prompt(text: &str, title: Option<&str>) -> QuizPrompt {
    let title = title.map(str::trim).filter(|title| !title.is_empty()).unwrap_or(UNTITLED);

    let user = format!("Generate a quiz based on the following content (Title: {title}):\n\n---\n\n{text}\n\n---");

    QuizPrompt { system: system_prompt(), user }
}

fn system_prompt() -> String {
    format!(
        r#"You are an expert quiz generator. Given the following text content, create a multiple-choice quiz with {MIN_QUESTIONS}-{MAX_QUESTIONS} questions. Each question must have exactly {OPTIONS_PER_QUESTION} options. Ensure exactly one option is clearly the correct answer based *only* on the provided text.

Output the quiz *only* as a valid JSON object with this exact structure:
{{
  "title": "Quiz based on: <the provided title or a concise summary of the content>",
  "questions": [
    {{
      "id": "q1",
      "questionText": "The text of the first question?",
      "options": [
        {{ "id": "q1-opt1", "text": "Option 1 text" }},
        {{ "id": "q1-opt2", "text": "Option 2 text" }},
        {{ "id": "q1-opt3", "text": "Option 3 text" }},
        {{ "id": "q1-opt4", "text": "Option 4 text" }}
      ],
      "correctOptionId": "q1-opt2",
      "explanation": "One sentence explaining why the answer is correct."
    }}
  ]
}}

Question ids must be unique (q1, q2, ...). Option ids must be unique within their question. "correctOptionId" must be the id of one of that question's options.
Do not include introductory text or markdown formatting outside the JSON object. The entire response must be only the JSON object."#
    )
}
