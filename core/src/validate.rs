//! Draft validation mirroring the constraints the backend enforces.
//!
//! Lengths count `char`s, so a 64-character Chinese name is accepted even
//! though it is well over 64 bytes.

use std::fmt;

use thiserror::Error;

use crate::types::{Gender, StudentInput, MAJORS};

pub const NAME_MAX: usize = 64;
pub const PHONE_MAX: usize = 16;
pub const NATIVE_PLACE_MAX: usize = 64;
pub const EMAIL_MAX: usize = 32;
pub const TAG_MAX: usize = 512;
pub const REMARK_MAX: usize = 512;

/// Editable student fields, used for error reporting and form edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Gender,
    Phone,
    Age,
    NativePlace,
    Major,
    Email,
    Tag,
    Remark,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Gender => "gender",
            Field::Phone => "phone",
            Field::Age => "age",
            Field::NativePlace => "nativePlace",
            Field::Major => "major",
            Field::Email => "email",
            Field::Tag => "tag",
            Field::Remark => "remark",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(Field),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: Field, max: usize },

    #[error("{field} is not valid: {value}")]
    Invalid { field: Field, value: String },
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::Required(field) => *field,
            FieldError::TooLong { field, .. } | FieldError::Invalid { field, .. } => *field,
        }
    }
}

/// Every problem found in one draft, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn for_field(&self, field: Field) -> impl Iterator<Item = &FieldError> {
        self.0.iter().filter(move |e| e.field() == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

fn check_len(errors: &mut Vec<FieldError>, field: Field, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(FieldError::TooLong { field, max });
    }
}

fn check_required(errors: &mut Vec<FieldError>, field: Field, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.push(FieldError::Required(field));
    } else {
        check_len(errors, field, value, max);
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !value.contains(' ')
        }
        None => false,
    }
}

impl StudentInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        check_required(&mut errors, Field::Name, &self.name, NAME_MAX);
        if self.gender == Gender::Unknown {
            errors.push(FieldError::Invalid {
                field: Field::Gender,
                value: self.gender.to_string(),
            });
        }
        check_required(&mut errors, Field::Phone, &self.phone, PHONE_MAX);
        if let Some(place) = &self.native_place {
            check_len(&mut errors, Field::NativePlace, place, NATIVE_PLACE_MAX);
        }
        if !MAJORS.contains(&self.major.as_str()) {
            errors.push(FieldError::Invalid {
                field: Field::Major,
                value: self.major.clone(),
            });
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            check_len(&mut errors, Field::Email, email, EMAIL_MAX);
            if !looks_like_email(email) {
                errors.push(FieldError::Invalid {
                    field: Field::Email,
                    value: email.to_string(),
                });
            }
        }
        if let Some(tag) = &self.tag {
            check_len(&mut errors, Field::Tag, tag, TAG_MAX);
        }
        if let Some(remark) = &self.remark {
            check_len(&mut errors, Field::Remark, remark, REMARK_MAX);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    /// Apply a textual edit to one field. Empty input clears optional fields.
    pub fn set_field(&mut self, field: Field, value: &str) -> Result<(), FieldError> {
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());
        match field {
            Field::Name => self.name = value.to_string(),
            Field::Phone => self.phone = value.to_string(),
            Field::Major => self.major = value.to_string(),
            Field::Gender => {
                self.gender = value.parse().map_err(|_| FieldError::Invalid {
                    field,
                    value: value.to_string(),
                })?
            }
            Field::Age => {
                self.age = value.trim().parse().map_err(|_| FieldError::Invalid {
                    field,
                    value: value.to_string(),
                })?
            }
            Field::NativePlace => self.native_place = optional(value),
            Field::Email => self.email = optional(value),
            Field::Tag => self.tag = optional(value),
            Field::Remark => self.remark = optional(value),
        }
        Ok(())
    }
}
