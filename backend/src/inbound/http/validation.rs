//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose details carry the
//! offending request field and a stable machine-readable code.

use serde_json::json;

use crate::domain::{
    CredentialsValidationError, DesignId, DesignValidationError, Error,
    InteractionValidationError, PromptValidationError, TagValidationError, UserId,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUserId,
    InvalidDesignId,
    InvalidDesign,
    InvalidTags,
    InvalidComment,
    InvalidFollow,
    InvalidCredentials,
    InvalidPrompt,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUserId => "invalid_user_id",
            ErrorCode::InvalidDesignId => "invalid_design_id",
            ErrorCode::InvalidDesign => "invalid_design",
            ErrorCode::InvalidTags => "invalid_tags",
            ErrorCode::InvalidComment => "invalid_comment",
            ErrorCode::InvalidFollow => "invalid_follow",
            ErrorCode::InvalidCredentials => "invalid_credentials",
            ErrorCode::InvalidPrompt => "invalid_prompt",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {field}"),
    )
}

/// Unwrap a required request value.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_user_id(value: String, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|err| {
        field_error(
            field.as_str(),
            ErrorCode::InvalidUserId,
            format!("{}: {err}", field.as_str()),
        )
    })
}

pub(crate) fn parse_design_id(value: String, field: FieldName) -> Result<DesignId, Error> {
    DesignId::new(value).map_err(|err| {
        field_error(
            field.as_str(),
            ErrorCode::InvalidDesignId,
            format!("{}: {err}", field.as_str()),
        )
    })
}

/// Parse a required user id, reporting a missing value first.
pub(crate) fn required_user_id(value: Option<String>, field: FieldName) -> Result<UserId, Error> {
    parse_user_id(require(value, field)?, field)
}

/// Parse a required design id, reporting a missing value first.
pub(crate) fn required_design_id(
    value: Option<String>,
    field: FieldName,
) -> Result<DesignId, Error> {
    parse_design_id(require(value, field)?, field)
}

pub(crate) fn design_error(err: &DesignValidationError) -> Error {
    field_error(err.field(), ErrorCode::InvalidDesign, err.to_string())
}

pub(crate) fn tags_error(err: &TagValidationError) -> Error {
    let details = match err {
        TagValidationError::TooMany { count, max } => json!({
            "field": "tags",
            "code": ErrorCode::InvalidTags.as_str(),
            "count": count,
            "max": max,
        }),
        TagValidationError::Empty { index } | TagValidationError::TooLong { index, .. } => json!({
            "field": "tags",
            "code": ErrorCode::InvalidTags.as_str(),
            "index": index,
        }),
    };
    Error::invalid_request(err.to_string()).with_details(details)
}

pub(crate) fn interaction_error(err: &InteractionValidationError) -> Error {
    match err {
        InteractionValidationError::SelfFollow => {
            field_error("followedId", ErrorCode::InvalidFollow, err.to_string())
        }
        InteractionValidationError::EmptyComment
        | InteractionValidationError::CommentTooLong { .. } => {
            field_error("content", ErrorCode::InvalidComment, err.to_string())
        }
    }
}

pub(crate) fn credentials_error(err: &CredentialsValidationError) -> Error {
    let field = match err {
        CredentialsValidationError::EmptyEmail | CredentialsValidationError::MalformedEmail => {
            "email"
        }
        CredentialsValidationError::EmptyPassword
        | CredentialsValidationError::PasswordTooShort { .. } => "password",
    };
    field_error(field, ErrorCode::InvalidCredentials, err.to_string())
}

pub(crate) fn prompt_error(err: &PromptValidationError) -> Error {
    field_error("prompt", ErrorCode::InvalidPrompt, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;

    const USER_ID: FieldName = FieldName::new("userId");

    #[rstest]
    fn missing_field_reports_field_and_code() {
        let err = required_user_id(None, USER_ID).expect_err("missing");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(
            err.details(),
            Some(&json!({ "field": "userId", "code": "missing_field" }))
        );
    }

    #[rstest]
    fn blank_user_id_is_invalid() {
        let err = required_user_id(Some("  ".into()), USER_ID).expect_err("blank");
        assert_eq!(
            err.details().and_then(|d| d.get("code")),
            Some(&json!("invalid_user_id"))
        );
    }

    #[rstest]
    fn too_many_tags_carry_count() {
        let err = tags_error(&TagValidationError::TooMany { count: 11, max: 10 });
        let details = err.details().expect("details");
        assert_eq!(details["count"], json!(11));
        assert_eq!(details["field"], json!("tags"));
    }

    #[rstest]
    #[case(CredentialsValidationError::MalformedEmail, "email")]
    #[case(CredentialsValidationError::PasswordTooShort { min: 6 }, "password")]
    fn credential_errors_point_at_field(
        #[case] err: CredentialsValidationError,
        #[case] field: &str,
    ) {
        let mapped = credentials_error(&err);
        assert_eq!(mapped.details().expect("details")["field"], json!(field));
    }

    #[rstest]
    fn design_errors_use_domain_field() {
        let err = design_error(&DesignValidationError::MissingImageUrl);
        assert_eq!(err.details().expect("details")["field"], json!("image_url"));
    }
}
