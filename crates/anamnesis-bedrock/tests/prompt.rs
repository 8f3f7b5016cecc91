use std::collections::HashMap;

use anamnesis_bedrock::prompt::{
    CONTINUATION_INSTRUCTION, INTERVIEW_SYSTEM_PROMPT, OUTCOME_SYSTEM_PROMPT, PromptPhase,
    RECORD_SYSTEM_PROMPT, build_prompt, format_answers,
};
use anamnesis_core::models::image::{EncodedImage, ImageEncoding};
use anamnesis_core::models::intake::Intake;
use anamnesis_core::models::message::{ContentPart, Message, MessageContent, Role};
use anamnesis_core::models::outcome::StructuredOutcome;
use anamnesis_core::models::question::Question;
use anamnesis_core::placeholder::NAME_PLACEHOLDER;

fn intake() -> Intake {
    Intake {
        name: "Margarethe Vollmer".to_string(),
        age: "67".to_string(),
        gender: "Female".to_string(),
        complaint: "shortness of breath".to_string(),
    }
}

fn outcome() -> StructuredOutcome {
    StructuredOutcome {
        most_probable_diagnosis: vec!["Heart failure".to_string(), "COPD".to_string()],
        advice: "See a doctor within 24 hours.".to_string(),
        recommended_specialists: vec!["Cardiologist".to_string()],
    }
}

const OUTCOME_JSON: &str = r#"{"mostProbableDiagnosis":["Heart failure"],"advice":"x","recommendedSpecialists":["Cardiologist"]}"#;

fn history() -> Vec<Message> {
    vec![
        Message::system(INTERVIEW_SYSTEM_PROMPT),
        Message::user("intake summary"),
        Message::assistant(r#"{"explanation":"e","questions":[{"id":"q1","text":"t"}]}"#),
        Message::user("answers"),
        Message::assistant(r#"{"readyForRecord":true}"#),
    ]
}

fn image() -> EncodedImage {
    EncodedImage {
        encoding: ImageEncoding::Png,
        data: "iVBORw0KGgo=".to_string(),
    }
}

fn all_text(messages: &[Message]) -> String {
    messages.iter().map(Message::text).collect::<Vec<_>>().join("\n")
}

#[test]
fn start_has_system_then_intake_without_name() {
    let data = intake();
    let messages = build_prompt(&PromptPhase::InterviewStart { intake: &data }, &[]);

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], Message::system(INTERVIEW_SYSTEM_PROMPT));
    assert_eq!(messages[1].role, Role::User);
    let summary = messages[1].text();
    assert!(summary.contains("67"));
    assert!(summary.contains("Female"));
    assert!(summary.contains("shortness of breath"));
    assert!(!all_text(&messages).contains("Margarethe"));
}

#[test]
fn continuation_strips_old_system_and_appends_instruction() {
    let messages = build_prompt(&PromptPhase::InterviewContinuation, &history());

    assert_eq!(messages.len(), 1 + 4 + 1);
    assert_eq!(messages.iter().filter(|m| m.is_system()).count(), 1);
    assert!(messages[0].is_system());
    assert_eq!(messages[1], Message::user("intake summary"));
    assert_eq!(messages.last(), Some(&Message::user(CONTINUATION_INSTRUCTION)));
}

#[test]
fn outcome_attaches_images_to_trailing_message() {
    let images = vec![image(), image()];
    let messages = build_prompt(&PromptPhase::OutcomeGeneration { images: &images }, &history());

    assert_eq!(messages[0], Message::system(OUTCOME_SYSTEM_PROMPT));
    assert_eq!(messages.iter().filter(|m| m.is_system()).count(), 1);
    let trailing = messages.last().unwrap();
    assert_eq!(trailing.role, Role::User);
    assert_eq!(trailing.image_count(), 2);
    let MessageContent::Parts(parts) = &trailing.content else {
        panic!("expected parts");
    };
    assert!(matches!(parts[0], ContentPart::Text { .. }));
}

#[test]
fn outcome_without_images_is_plain_text() {
    let messages = build_prompt(&PromptPhase::OutcomeGeneration { images: &[] }, &history());
    assert!(matches!(messages.last().unwrap().content, MessageContent::Text(_)));
}

#[test]
fn record_drops_prior_outcome_and_uses_placeholder() {
    let data = intake();
    let result = outcome();
    let mut hist = history();
    hist.push(Message::assistant(OUTCOME_JSON));
    hist.push(Message::assistant("{ not json"));

    let images = vec![image()];
    let messages = build_prompt(
        &PromptPhase::RecordGeneration {
            intake: &data,
            outcome: &result,
            images: &images,
        },
        &hist,
    );

    assert_eq!(messages[0], Message::system(RECORD_SYSTEM_PROMPT));
    assert!(!messages.iter().any(|m| m.text() == OUTCOME_JSON));
    // Undecodable assistant content is kept.
    assert!(messages.iter().any(|m| m.text() == "{ not json"));

    let trailing = messages.last().unwrap();
    assert_eq!(trailing.image_count(), 1);
    let instruction = trailing.text();
    assert!(instruction.contains(NAME_PLACEHOLDER));
    assert!(instruction.contains("Heart failure"));
    assert!(instruction.contains("Cardiologist"));
    assert!(instruction.contains("shortness of breath"));
    assert!(!all_text(&messages).contains("Margarethe"));
}

#[test]
fn answers_follow_batch_order() {
    let questions = vec![
        Question {
            id: "q1".to_string(),
            text: "When did it start?".to_string(),
            suggestions: vec![],
        },
        Question {
            id: "q2".to_string(),
            text: "Any chest pain?".to_string(),
            suggestions: vec!["yes".to_string(), "no".to_string()],
        },
    ];
    let answers = HashMap::from([
        ("q2".to_string(), "no".to_string()),
        ("q1".to_string(), "two days ago".to_string()),
    ]);

    let text = format_answers(&questions, &answers);
    let first = text.find("When did it start?").unwrap();
    let second = text.find("Any chest pain?").unwrap();
    assert!(first < second);
    assert!(text.contains("Answer: two days ago"));
    assert!(text.contains("Answer: no"));
}

#[test]
fn unanswered_question_is_marked() {
    let questions = vec![Question {
        id: "q1".to_string(),
        text: "Any allergies?".to_string(),
        suggestions: vec![],
    }];
    let text = format_answers(&questions, &HashMap::new());
    assert!(text.contains("Answer: (no answer)"));
}
