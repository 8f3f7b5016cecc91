//! Prompt assembly for each phase of the interview.
//!
//! Pure functions: given a phase (with its inputs) and the session history,
//! produce the ordered messages for one model round trip. The subject's name
//! never appears in anything built here.

use std::collections::HashMap;

use anamnesis_core::models::image::EncodedImage;
use anamnesis_core::models::intake::Intake;
use anamnesis_core::models::message::Message;
use anamnesis_core::models::outcome::StructuredOutcome;
use anamnesis_core::models::question::Question;
use anamnesis_core::placeholder::NAME_PLACEHOLDER;
use anamnesis_core::schema::is_structured_outcome_message;

pub const INTERVIEW_SYSTEM_PROMPT: &str = "\
You are a careful clinical intake assistant conducting a structured, multi-stage \
interview with a patient before they see a physician.

Protocol:
1. You receive the patient's age, gender and initial complaint.
2. You ask focused follow-up questions in small batches (one to five questions). \
Each question may offer short suggested answers.
3. After each batch you receive the patient's answers and decide whether you need \
more information.
4. When you have gathered enough information for a clinical summary, you signal \
that you are ready instead of asking more questions.

Output rules:
- Reply with exactly one JSON object and nothing else.
- To ask questions, reply with:
  {\"explanation\": \"why these questions matter\", \"questions\": [{\"id\": \"q1\", \"text\": \"question\", \"suggestions\": [\"option\"]}]}
  Question ids must be unique within the batch. \"suggestions\" may be omitted.
- To signal that the interview is complete, reply with:
  {\"readyForRecord\": true, \"explanation\": \"optional note for the patient\"}
- Do not add any other keys. Your first reply must be a batch of questions.";

pub const CONTINUATION_INSTRUCTION: &str = "\
Continue the interview. Reply with exactly one JSON object, either a new batch of questions:
{\"explanation\": \"...\", \"questions\": [{\"id\": \"q1\", \"text\": \"...\", \"suggestions\": [\"...\"]}]}
or, if you have enough information, the readiness signal:
{\"readyForRecord\": true, \"explanation\": \"optional\"}";

pub const OUTCOME_SYSTEM_PROMPT: &str = "\
You are a clinical reasoning assistant. You are given the transcript of a patient \
intake interview and, possibly, images the patient supplied. Produce a preliminary \
assessment for the patient.

Reply with exactly one JSON object with exactly these three keys:
{\"mostProbableDiagnosis\": [\"most likely first\", \"...\"], \"advice\": \"plain-language advice for the patient\", \"recommendedSpecialists\": [\"most relevant first\", \"...\"]}
All three keys are required. Do not add any other keys.";

pub const OUTCOME_INSTRUCTION: &str = "\
The interview is complete. Produce the assessment now as the three-key JSON object \
described above.";

pub const RECORD_SYSTEM_PROMPT: &str = "\
You are a clinical documentation assistant. You write a concise, professional \
medical record in Markdown for the physician who will see the patient, based on an \
intake interview, a preliminary assessment and any supplied images.

Reply with exactly one JSON object with exactly one key:
{\"medicalRecord\": \"the record as a Markdown string\"}
Do not add any other keys.";

/// A phase of the interview together with the inputs that phase needs.
#[derive(Debug, Clone, Copy)]
pub enum PromptPhase<'a> {
    InterviewStart {
        intake: &'a Intake,
    },
    InterviewContinuation,
    OutcomeGeneration {
        images: &'a [EncodedImage],
    },
    RecordGeneration {
        intake: &'a Intake,
        outcome: &'a StructuredOutcome,
        images: &'a [EncodedImage],
    },
}

impl PromptPhase<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InterviewStart { .. } => "interview_start",
            Self::InterviewContinuation => "interview_continuation",
            Self::OutcomeGeneration { .. } => "outcome_generation",
            Self::RecordGeneration { .. } => "record_generation",
        }
    }
}

/// Assemble the messages for one round trip.
///
/// `history` is ignored for [`PromptPhase::InterviewStart`]; every other phase
/// replays it with system messages stripped, behind the phase's own system
/// prompt.
pub fn build_prompt(phase: &PromptPhase<'_>, history: &[Message]) -> Vec<Message> {
    match phase {
        PromptPhase::InterviewStart { intake } => vec![
            Message::system(INTERVIEW_SYSTEM_PROMPT),
            Message::user(intake_summary(intake)),
        ],
        PromptPhase::InterviewContinuation => {
            let mut messages = vec![Message::system(INTERVIEW_SYSTEM_PROMPT)];
            messages.extend(history.iter().filter(|m| !m.is_system()).cloned());
            messages.push(Message::user(CONTINUATION_INSTRUCTION));
            messages
        }
        PromptPhase::OutcomeGeneration { images } => {
            let mut messages = vec![Message::system(OUTCOME_SYSTEM_PROMPT)];
            messages.extend(history.iter().filter(|m| !m.is_system()).cloned());
            messages.push(Message::user_with_images(
                outcome_instruction(images.len()),
                images,
            ));
            messages
        }
        PromptPhase::RecordGeneration {
            intake,
            outcome,
            images,
        } => {
            let mut messages = vec![Message::system(RECORD_SYSTEM_PROMPT)];
            // The stored outcome is restated in the instruction below; the
            // model's own earlier JSON is not replayed.
            messages.extend(
                history
                    .iter()
                    .filter(|m| !m.is_system() && !is_structured_outcome_message(m))
                    .cloned(),
            );
            messages.push(Message::user_with_images(
                record_instruction(intake, outcome, images.len()),
                images,
            ));
            messages
        }
    }
}

/// Demographics and complaint, without the name.
pub fn intake_summary(intake: &Intake) -> String {
    format!(
        "New patient intake.\n\
         - Age: {}\n\
         - Gender: {}\n\
         - Initial complaint: {}\n\n\
         Begin the interview with your first batch of questions.",
        intake.age.trim(),
        intake.gender.trim(),
        intake.complaint.trim(),
    )
}

/// Render submitted answers against the batch they answer, in batch order.
pub fn format_answers(questions: &[Question], answers: &HashMap<String, String>) -> String {
    let mut out = String::from("My answers to your questions:\n");
    for (index, question) in questions.iter().enumerate() {
        let answer = answers
            .get(&question.id)
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .unwrap_or("(no answer)");
        out.push_str(&format!(
            "\n{}. {}\n   Answer: {}\n",
            index + 1,
            question.text,
            answer
        ));
    }
    out
}

fn outcome_instruction(image_count: usize) -> String {
    if image_count == 0 {
        OUTCOME_INSTRUCTION.to_string()
    } else {
        format!(
            "{OUTCOME_INSTRUCTION}\n\nThe patient attached {image_count} image(s) to this \
             message. Take them into account."
        )
    }
}

fn record_instruction(intake: &Intake, outcome: &StructuredOutcome, image_count: usize) -> String {
    let mut out = format!(
        "Write the medical record now.\n\n\
         Patient details:\n\
         - Name: {NAME_PLACEHOLDER}\n\
         - Age: {}\n\
         - Gender: {}\n\
         - Initial complaint: {}\n\n\
         Wherever the patient's name belongs, write exactly {NAME_PLACEHOLDER} and nothing else.\n\n\
         Preliminary assessment:\n",
        intake.age.trim(),
        intake.gender.trim(),
        intake.complaint.trim(),
    );

    out.push_str("- Most probable diagnoses (most likely first):\n");
    for (rank, diagnosis) in outcome.most_probable_diagnosis.iter().enumerate() {
        out.push_str(&format!("  {}. {diagnosis}\n", rank + 1));
    }
    out.push_str(&format!("- Advice given: {}\n", outcome.advice));
    out.push_str("- Recommended specialists (most relevant first):\n");
    for (rank, specialist) in outcome.recommended_specialists.iter().enumerate() {
        out.push_str(&format!("  {}. {specialist}\n", rank + 1));
    }

    if image_count > 0 {
        out.push_str(&format!(
            "\nThe patient attached {image_count} image(s) to this message; describe relevant findings."
        ));
    }
    out
}
