/// Token the model is told to emit wherever the subject's name belongs.
///
/// The real name never leaves the orchestrator; it is substituted back into
/// the final record once the record has been accepted.
pub const NAME_PLACEHOLDER: &str = "[[PATIENT_NAME]]";

/// Replace every literal occurrence of [`NAME_PLACEHOLDER`] with `name`.
pub fn substitute_name(record: &str, name: &str) -> String {
    record.replace(NAME_PLACEHOLDER, name)
}
