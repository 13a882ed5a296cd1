use serde::{Deserialize, Serialize};

/// The placeholder substring marking the blank inside a question sentence.
pub const BLANK_MARKER: &str = "＿＿＿";

/// Number of answer options on every question.
pub const OPTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    N2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "文法")]
    Grammar,
    #[serde(rename = "語彙")]
    Vocabulary,
}

impl QuestionType {
    pub fn label(&self) -> &'static str {
        match self {
            QuestionType::Grammar => "文法",
            QuestionType::Vocabulary => "語彙",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExampleSentence {
    pub sentence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Explanation {
    pub title: String,
    pub meaning: String,
    pub why_correct: String,
    pub why_incorrect: Vec<String>,
    pub example_sentences: Vec<ExampleSentence>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizQuestion {
    pub id: String,
    pub level: Level,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question_sentence: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
    pub explanation: Explanation,
}

impl QuizQuestion {
    /// Checks the batch contract on a single received question.
    /// Generated content is untrusted; every structural field is verified
    /// before the question enters a session.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("question id is empty".to_string());
        }
        if self.options.len() != OPTION_COUNT {
            return Err(format!(
                "question {}: expected {} options, got {}",
                self.id,
                OPTION_COUNT,
                self.options.len()
            ));
        }
        if self.correct_answer_index >= self.options.len() {
            return Err(format!(
                "question {}: correct_answer_index {} out of range",
                self.id, self.correct_answer_index
            ));
        }
        if self.explanation.why_incorrect.len() != OPTION_COUNT - 1 {
            return Err(format!(
                "question {}: expected {} why_incorrect entries, got {}",
                self.id,
                OPTION_COUNT - 1,
                self.explanation.why_incorrect.len()
            ));
        }
        if self.explanation.example_sentences.is_empty() {
            return Err(format!("question {}: no example sentences", self.id));
        }
        if !self.question_sentence.contains(BLANK_MARKER) {
            return Err(format!(
                "question {}: sentence has no blank marker",
                self.id
            ));
        }
        Ok(())
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_answer_index]
    }

    /// The sentence with the blank filled in, used by feedback and the
    /// results list: 「今月＿＿＿予算を見直す」→「今月【をめどに】予算を見直す」.
    pub fn sentence_with_answer(&self) -> String {
        self.question_sentence
            .replace(BLANK_MARKER, &format!("【{}】", self.correct_option()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserAnswer {
    pub question_id: String,
    pub selected_option_index: usize,
    pub is_correct: bool,
}
