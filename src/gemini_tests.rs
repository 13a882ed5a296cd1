use super::*;
use crate::models::{Level, QuestionType};
use serde_json::{json, Value};

fn question_json(id: &str) -> Value {
    json!({
        "id": id,
        "level": "N2",
        "type": "文法",
        "question_sentence": "彼の努力＿＿＿、今回の成功はなかった。",
        "options": ["なくして", "において", "に際して", "をもって"],
        "correct_answer_index": 0,
        "explanation": {
            "title": "【文法】〜なくして",
            "meaning": "「〜がなければ」という仮定条件を表す。",
            "why_correct": "後件の成立に前件が不可欠であることを示すため。",
            "why_incorrect": [
                "「において」は場所・場面を表すため不適切。",
                "「に際して」は時点を表すため不適切。",
                "「をもって」は手段・期限を表すため不適切。"
            ],
            "example_sentences": [
                { "sentence": "皆様のご協力なくして、この事業の成功はありません。" }
            ]
        }
    })
}

fn batch_json(questions: Vec<Value>) -> String {
    serde_json::to_string(&Value::Array(questions)).unwrap()
}

#[test]
fn test_parse_batch_accepts_valid_questions() {
    let text = batch_json(vec![question_json("g001"), question_json("g002")]);
    let questions = parse_batch(&text).unwrap();

    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].id, "g001");
    assert_eq!(questions[0].level, Level::N2);
    assert_eq!(questions[0].question_type, QuestionType::Grammar);
    assert_eq!(questions[0].correct_answer_index, 0);
    assert_eq!(questions[0].explanation.why_incorrect.len(), 3);
}

#[test]
fn test_parse_batch_accepts_vocabulary_type() {
    let mut q = question_json("v001");
    q["type"] = json!("語彙");
    let questions = parse_batch(&batch_json(vec![q])).unwrap();
    assert_eq!(questions[0].question_type, QuestionType::Vocabulary);
}

#[test]
fn test_parse_batch_tolerates_off_size_batches() {
    // Any size >= 1 is usable; the size mismatch is only logged.
    let text = batch_json(vec![question_json("g001")]);
    assert_eq!(parse_batch(&text).unwrap().len(), 1);
}

#[test]
fn test_parse_batch_trims_surrounding_whitespace() {
    let text = format!("\n  {}  \n", batch_json(vec![question_json("g001")]));
    assert!(parse_batch(&text).is_ok());
}

#[test]
fn test_parse_batch_rejects_malformed_json() {
    assert!(parse_batch("これはJSONではありません").is_err());
}

#[test]
fn test_parse_batch_rejects_empty_array() {
    assert!(parse_batch("[]").is_err());
}

#[test]
fn test_parse_batch_rejects_unknown_level() {
    let mut q = question_json("g001");
    q["level"] = json!("N5");
    assert!(parse_batch(&batch_json(vec![q])).is_err());
}

#[test]
fn test_parse_batch_rejects_out_of_range_answer_index() {
    let mut q = question_json("g001");
    q["correct_answer_index"] = json!(4);
    assert!(parse_batch(&batch_json(vec![q])).is_err());
}

#[test]
fn test_parse_batch_rejects_wrong_option_count() {
    let mut q = question_json("g001");
    q["options"] = json!(["一つ", "二つ"]);
    assert!(parse_batch(&batch_json(vec![q])).is_err());
}

#[test]
fn test_parse_batch_rejects_short_why_incorrect() {
    let mut q = question_json("g001");
    q["explanation"]["why_incorrect"] = json!(["一つだけ"]);
    assert!(parse_batch(&batch_json(vec![q])).is_err());
}

#[test]
fn test_parse_batch_rejects_empty_example_sentences() {
    let mut q = question_json("g001");
    q["explanation"]["example_sentences"] = json!([]);
    assert!(parse_batch(&batch_json(vec![q])).is_err());
}

#[test]
fn test_parse_batch_rejects_sentence_without_blank() {
    let mut q = question_json("g001");
    q["question_sentence"] = json!("空欄のない文です。");
    assert!(parse_batch(&batch_json(vec![q])).is_err());
}

#[test]
fn test_one_invalid_question_fails_the_whole_batch() {
    let mut bad = question_json("g002");
    bad["correct_answer_index"] = json!(9);
    let text = batch_json(vec![question_json("g001"), bad]);
    assert!(parse_batch(&text).is_err());
}

#[test]
fn test_generation_error_message_is_user_facing() {
    let mut q = question_json("g001");
    q["options"] = json!([]);
    let err = parse_batch(&batch_json(vec![q])).unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_prompt_requests_fixed_batch_split() {
    let prompt = build_prompt(&[]);
    assert!(prompt.contains("20問"));
    assert!(prompt.contains("文法問題を10問"));
    assert!(prompt.contains("語彙問題を10問"));
}

#[test]
fn test_prompt_mentions_missed_ids_when_present() {
    let missed = vec!["g003".to_string(), "v007".to_string()];
    let prompt = build_prompt(&missed);
    assert!(prompt.contains("g003, v007"));
    assert!(prompt.contains("間違えました"));
}

#[test]
fn test_prompt_omits_focus_paragraph_without_missed_ids() {
    assert!(!build_prompt(&[]).contains("間違えました"));
}

#[test]
fn test_missing_api_key_is_reported() {
    assert!(!MissingApiKey.to_string().is_empty());
}
