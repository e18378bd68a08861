//! Draft validation for listing creation.

use crate::error::{PlazaError, PlazaResult};
use crate::marketplace::ListingDraft;

/// Bounds on a plausible subscriber number, digits only.
const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

/// Normalize a contact value to a canonical phone number.
///
/// Separators (spaces, dashes, dots, parentheses) are stripped; a single
/// leading `+` is preserved. Returns `None` when what remains is not a
/// plausible phone number.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let (prefix, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };

    let mut digits = String::with_capacity(rest.len());
    for ch in rest.chars() {
        match ch {
            '0'..='9' => digits.push(ch),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return None,
        }
    }

    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return None;
    }

    Some(format!("{prefix}{digits}"))
}

/// Validate the required fields of a listing draft.
///
/// Reported synchronously to the caller; nothing is written on failure.
pub fn validate_draft(draft: &ListingDraft) -> PlazaResult<()> {
    let details = &draft.details;

    for (field, value) in [
        ("name", &details.name),
        ("category", &details.category),
        ("location", &details.location),
        ("description", &details.description),
        ("contact", &details.contact),
    ] {
        if value.trim().is_empty() {
            return Err(PlazaError::Validation(format!("{field} is required")));
        }
    }

    if draft.owner_id.trim().is_empty() {
        return Err(PlazaError::Validation("ownerId is required".to_string()));
    }

    if normalize_phone(&details.contact).is_none() {
        return Err(PlazaError::Validation(format!(
            "contact '{}' is not a valid phone number",
            details.contact
        )));
    }

    Ok(())
}
