use crate::constants::MIN_DESCRIPTION_CHARS;
use crate::types::{FieldNames, RawRecord};

/// Why a record failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    MissingTitle,
    MissingDescription,
    DescriptionTooShort { chars: usize },
}

/// Check the required fields of a record, reporting the first failure
pub fn check(record: &RawRecord, fields: &FieldNames) -> Result<(), ValidationFailure> {
    if record.field(&fields.title).is_empty() {
        return Err(ValidationFailure::MissingTitle);
    }

    let description = record.field(&fields.description);
    if description.is_empty() {
        return Err(ValidationFailure::MissingDescription);
    }

    let chars = description.chars().count();
    if chars < MIN_DESCRIPTION_CHARS {
        return Err(ValidationFailure::DescriptionTooShort { chars });
    }

    Ok(())
}

/// A record is publishable only with a title and a description of at least
/// [`MIN_DESCRIPTION_CHARS`] characters.
pub fn is_valid(record: &RawRecord, fields: &FieldNames) -> bool {
    check(record, fields).is_ok()
}
