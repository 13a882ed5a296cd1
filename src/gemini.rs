use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::models::QuizQuestion;

const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

/// Questions requested per batch: 10 grammar + 10 vocabulary.
pub const BATCH_SIZE: usize = 20;

const API_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Debug, Error)]
#[error("GEMINI_API_KEY が設定されていません。環境変数 GEMINI_API_KEY を設定してください。")]
pub struct MissingApiKey;

/// Opaque failure for one batch request. Callers get a human-readable
/// message and nothing else; transport, parse and schema problems are
/// deliberately indistinguishable here (details go to the log).
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{0}")]
pub struct GenerationError(pub String);

impl GenerationError {
    fn from_detail(detail: impl std::fmt::Display) -> Self {
        log::error!("question generation failed: {}", detail);
        GenerationError(
            "問題の生成に失敗しました。APIキーを確認するか、しばらくしてから再試行してください。"
                .to_string(),
        )
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Reads the credential once at startup. A missing key is fatal; there
    /// is no per-request recovery path for configuration.
    pub fn from_env() -> Result<Self, MissingApiKey> {
        match std::env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(MissingApiKey),
        }
    }

    /// Requests one batch of questions, biased toward `missed_ids` when
    /// non-empty. Exactly one HTTP call; retries are the caller's choice.
    pub async fn generate_questions(
        &self,
        missed_ids: &[String],
    ) -> Result<Vec<QuizQuestion>, GenerationError> {
        let body = json!({
            "contents": [{
                "parts": [{ "text": build_prompt(missed_ids) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
                "temperature": 0.8
            }
        });

        let url = format!("{}?key={}", GEMINI_URL, self.api_key);

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(GenerationError::from_detail)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(GenerationError::from_detail(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_resp: GeminiResponse =
            resp.json().await.map_err(GenerationError::from_detail)?;

        let text = gemini_resp
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| GenerationError::from_detail("response carried no candidates"))?;

        parse_batch(text)
    }
}

/// Parses and validates one raw response body. Any size >= 1 is accepted;
/// a size other than the requested 20 is only warned about.
pub fn parse_batch(text: &str) -> Result<Vec<QuizQuestion>, GenerationError> {
    let questions: Vec<QuizQuestion> =
        serde_json::from_str(text.trim()).map_err(GenerationError::from_detail)?;

    if questions.is_empty() {
        return Err(GenerationError::from_detail("response batch was empty"));
    }
    if questions.len() != BATCH_SIZE {
        log::warn!(
            "requested {} questions but received {}",
            BATCH_SIZE,
            questions.len()
        );
    }

    for question in &questions {
        question
            .validate()
            .map_err(GenerationError::from_detail)?;
    }

    Ok(questions)
}

fn build_prompt(missed_ids: &[String]) -> String {
    let incorrect_focus = if missed_ids.is_empty() {
        String::new()
    } else {
        format!(
            "ユーザーは以前、以下のIDの問題を間違えました: {}。\
             これらの問題に関連する文法項目や語彙、または類似の文脈を持つ問題を優先的に生成してください。",
            missed_ids.join(", ")
        )
    };

    format!(
        "あなたは日本語能力試験(JLPT) N2レベルの問題を作成する専門家です。\n\
         これからJLPT N2レベルのクイズ問題を20問生成してください。文法問題を10問、語彙問題を10問含めてください。\n\
         問題は、単なる知識だけでなく、文脈におけるニュアンスの理解を問うような、質の高いものにしてください。\n\
         すべてのコンテンツは日本語で生成してください。\n\
         {}\n\
         以下のJSONスキーマに厳密に従って、結果をJSON配列として返してください。",
        incorrect_focus
    )
}

fn response_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING", "description": "問題のユニークID (例: g001, v001)" },
                "level": { "type": "STRING", "description": "常に 'N2' を設定" },
                "type": { "type": "STRING", "description": "'文法' または '語彙' のいずれか" },
                "question_sentence": { "type": "STRING", "description": "空欄を含む問題文。空欄は「＿＿＿」で示す。" },
                "options": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "4つの選択肢の配列"
                },
                "correct_answer_index": { "type": "INTEGER", "description": "正解の選択肢のインデックス (0-3)" },
                "explanation": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING", "description": "文法項目または語彙のタイトル (例:【文法】〜をめぐって)" },
                        "meaning": { "type": "STRING", "description": "文法・語彙の意味の解説" },
                        "why_correct": { "type": "STRING", "description": "なぜその選択肢が正解かの詳細な理由" },
                        "why_incorrect": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "他の3つの選択肢がなぜ間違いかの理由の配列"
                        },
                        "example_sentences": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "sentence": { "type": "STRING", "description": "解説のための例文" }
                                },
                                "required": ["sentence"]
                            },
                            "description": "文法・語彙を使った複数の例文の配列"
                        }
                    },
                    "required": ["title", "meaning", "why_correct", "why_incorrect", "example_sentences"]
                }
            },
            "required": ["id", "level", "type", "question_sentence", "options", "correct_answer_index", "explanation"]
        }
    })
}

#[cfg(test)]
#[path = "gemini_tests.rs"]
mod gemini_tests;
