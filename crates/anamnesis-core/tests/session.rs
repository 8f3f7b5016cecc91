use anamnesis_core::models::intake::Intake;
use anamnesis_core::models::outcome::StructuredOutcome;
use anamnesis_core::models::question::Question;
use anamnesis_core::models::session::{InterviewStep, Session, SessionPatch, SessionStatus};
use anamnesis_core::placeholder::{NAME_PLACEHOLDER, substitute_name};

fn intake() -> Intake {
    Intake {
        name: "Jane Doe".to_string(),
        age: "41".to_string(),
        gender: "Female".to_string(),
        complaint: "headache".to_string(),
    }
}

fn outcome() -> StructuredOutcome {
    StructuredOutcome {
        most_probable_diagnosis: vec!["Tension headache".to_string()],
        advice: "Hydrate.".to_string(),
        recommended_specialists: vec!["Neurologist".to_string()],
    }
}

#[test]
fn blank_intake_field_is_rejected() {
    let mut data = intake();
    data.complaint = "   ".to_string();
    let err = data.validate().unwrap_err();
    assert!(err.to_string().contains("complaint"));
    assert!(intake().validate().is_ok());
}

#[test]
fn new_session_is_consistent() {
    let session = Session::new(intake());
    assert_eq!(session.step, InterviewStep::Initial);
    assert_eq!(session.status, SessionStatus::InProgress);
    assert!(session.check_consistency().is_ok());
}

#[test]
fn interviewing_requires_questions() {
    let mut session = Session::new(intake());
    session.step = InterviewStep::Interviewing;
    assert!(session.check_consistency().is_err());

    session.current_questions.push(Question {
        id: "q1".to_string(),
        text: "Where does it hurt?".to_string(),
        suggestions: vec![],
    });
    assert!(session.check_consistency().is_ok());
}

#[test]
fn record_requires_outcome() {
    let mut session = Session::new(intake());
    session.step = InterviewStep::Completed;
    session.final_record = Some("record".to_string());
    assert!(session.check_consistency().is_err());

    session.structured_outcome = Some(outcome());
    assert!(session.check_consistency().is_ok());
}

#[test]
fn patch_merges_only_present_fields() {
    let mut session = Session::new(intake());
    session.guidance = Some("keep".to_string());
    session.apply(SessionPatch::status(SessionStatus::Abandoned));
    assert_eq!(session.status, SessionStatus::Abandoned);
    assert_eq!(session.guidance.as_deref(), Some("keep"));
    assert_eq!(session.step, InterviewStep::Initial);
}

#[test]
fn snapshot_serializes_round_trip() {
    let mut session = Session::new(intake());
    session.structured_outcome = Some(outcome());
    session.step = InterviewStep::OutcomeReady;
    let json = serde_json::to_string(&session).unwrap();
    assert!(json.contains("\"step\":\"outcome_ready\""));
    assert!(json.contains("\"mostProbableDiagnosis\""));
    let back: Session = serde_json::from_str(&json).unwrap();
    assert_eq!(back, session);
}

#[test]
fn placeholder_is_replaced_everywhere() {
    let record = format!("Patient {NAME_PLACEHOLDER} reports pain. Signed for {NAME_PLACEHOLDER}.");
    let out = substitute_name(&record, "Jane Doe");
    assert_eq!(out, "Patient Jane Doe reports pain. Signed for Jane Doe.");
    assert!(!out.contains(NAME_PLACEHOLDER));
}
