//! Input checks applied before anything reaches storage.

use crate::error::ValidationError;
use crate::list::{
    CreateList, UpdateList, ATTACHMENT_MAX_LEN, DESCRIPTION_MAX_LEN, TITLE_MAX_LEN,
};

/// A non-blank value of at most `max` characters.
pub fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    max_len(field, value, max)
}

pub fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong { field, max, len });
    }
    Ok(())
}

pub fn validate_create(input: &CreateList) -> Result<(), ValidationError> {
    require_text("title", &input.title, TITLE_MAX_LEN)?;
    require_text("description", &input.description, DESCRIPTION_MAX_LEN)?;
    if let Some(attachment) = &input.attachment {
        max_len("attachment", attachment, ATTACHMENT_MAX_LEN)?;
    }
    Ok(())
}

/// Supplied fields must satisfy the same bounds as on create.
pub fn validate_update(input: &UpdateList) -> Result<(), ValidationError> {
    if let Some(title) = &input.title {
        require_text("title", title, TITLE_MAX_LEN)?;
    }
    if let Some(description) = &input.description {
        require_text("description", description, DESCRIPTION_MAX_LEN)?;
    }
    if let Some(attachment) = &input.attachment {
        max_len("attachment", attachment, ATTACHMENT_MAX_LEN)?;
    }
    Ok(())
}
