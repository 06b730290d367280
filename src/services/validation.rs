//! Field validation shared by the create and update paths.
//!
//! Each [`Field`] carries its own rules; the caller only decides whether the
//! field is required (create) or optional (update).

use crate::error::{AppError, AppResult};
use crate::models::ProjectStatus;

pub const NAME_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Description,
    Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
}

impl Field {
    fn label(self) -> &'static str {
        match self {
            Field::Name => "Project name",
            Field::Description => "Description",
            Field::Color => "Color",
        }
    }

    fn missing(self) -> AppError {
        AppError::Validation(format!("{} is required", self.label()))
    }

    fn too_long(self, max: usize) -> AppError {
        AppError::Validation(format!("{} must be {} characters or less", self.label(), max))
    }

    /// Check a present value and return its normalized form.
    fn check(self, value: &str, requirement: Requirement) -> AppResult<String> {
        match self {
            Field::Name => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(match requirement {
                        Requirement::Required => self.missing(),
                        Requirement::Optional => AppError::Validation(format!(
                            "{} cannot be empty",
                            self.label()
                        )),
                    });
                }
                if trimmed.chars().count() > NAME_MAX_CHARS {
                    return Err(self.too_long(NAME_MAX_CHARS));
                }
                Ok(trimmed.to_string())
            }
            Field::Description => {
                if value.chars().count() > DESCRIPTION_MAX_CHARS {
                    return Err(self.too_long(DESCRIPTION_MAX_CHARS));
                }
                Ok(value.trim().to_string())
            }
            Field::Color => {
                if !is_hex_color(value) {
                    return Err(AppError::Validation(format!(
                        "{} must be a valid hex color",
                        self.label()
                    )));
                }
                Ok(value.to_string())
            }
        }
    }
}

/// `^#[0-9A-Fa-f]{6}$`
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

pub fn validate_required(field: Field, value: Option<&str>) -> AppResult<String> {
    let value = value.ok_or_else(|| field.missing())?;
    field.check(value, Requirement::Required)
}

pub fn validate_optional(field: Field, value: Option<&str>) -> AppResult<Option<String>> {
    value
        .map(|value| field.check(value, Requirement::Optional))
        .transpose()
}

/// Optional field where an explicit `null` counts as an empty value.
pub fn validate_nullable(field: Field, value: Option<Option<&str>>) -> AppResult<Option<String>> {
    value
        .map(|value| field.check(value.unwrap_or_default(), Requirement::Optional))
        .transpose()
}

/// Blank descriptions are stored as null.
pub fn validate_description(value: Option<&str>) -> AppResult<Option<String>> {
    Ok(validate_optional(Field::Description, value)?.filter(|d| !d.is_empty()))
}

/// A status that was sent; `None` here is an explicit `null`.
pub fn validate_status(value: Option<&str>) -> AppResult<ProjectStatus> {
    value
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| AppError::Validation("Invalid status".to_string()))
}
