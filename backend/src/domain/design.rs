//! Design aggregate: a pet illustration owned by one user.
//!
//! A design is either a vector composition (slot name → component id, plus
//! optional colour overrides) or an AI-generated image referenced by URL.
//! The split is a type-level invariant: [`DesignContent`] cannot represent a
//! vector design without components or an AI design without an image.
//!
//! Designs travel on the wire and through the record store in the row shape
//! of [`DesignRow`] (`snake_case`, one column per field).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;
use uuid::Uuid;

use super::{UserId, UserIdValidationError};

/// Maximum accepted title length.
pub const TITLE_MAX: usize = 120;
/// Title applied when a draft omits one.
pub const DEFAULT_TITLE: &str = "Untitled Design";
/// Prefix of ids assigned to drafts that only exist in the local mirror.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Validation errors raised while building designs from raw input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DesignValidationError {
    /// Design id was blank.
    #[error("design id must not be empty")]
    EmptyId,
    /// Owner id was not supplied.
    #[error("user_id is required")]
    MissingOwner,
    /// Owner id failed validation.
    #[error("invalid user_id: {0}")]
    InvalidOwner(UserIdValidationError),
    /// Unknown `design_type` value.
    #[error("unknown design type: {value}")]
    UnknownKind { value: String },
    /// Vector design without a components object.
    #[error("components are required for vector designs")]
    MissingComponents,
    /// Components were present but not a JSON object.
    #[error("components must be a JSON object")]
    ComponentsNotObject,
    /// AI design without an image URL.
    #[error("image_url is required for AI image designs")]
    MissingImageUrl,
    /// Image URL did not parse.
    #[error("image_url must be an absolute URL")]
    InvalidImageUrl,
    /// Title exceeded [`TITLE_MAX`].
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    /// Patch tried to set content belonging to the other design kind.
    #[error("{field} cannot be set on a {kind} design")]
    ContentMismatch { field: &'static str, kind: DesignKind },
}

impl DesignValidationError {
    /// Request field the error refers to, for adapter error details.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyId => "id",
            Self::MissingOwner | Self::InvalidOwner(_) => "user_id",
            Self::UnknownKind { .. } => "design_type",
            Self::MissingComponents | Self::ComponentsNotObject => "components",
            Self::MissingImageUrl | Self::InvalidImageUrl => "image_url",
            Self::TitleTooLong { .. } => "title",
            Self::ContentMismatch { field, .. } => field,
        }
    }
}

/// Identifier of a design.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DesignId(String);

impl DesignId {
    /// Validate and construct a [`DesignId`].
    pub fn new(raw: impl Into<String>) -> Result<Self, DesignValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DesignValidationError::EmptyId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Fresh server-side identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Fresh identifier for a draft that only lives in the local mirror.
    pub fn local() -> Self {
        Self(format!("{LOCAL_ID_PREFIX}{}", Uuid::new_v4()))
    }

    /// Whether the id was assigned to a local-only draft.
    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_ID_PREFIX)
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DesignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DesignId> for String {
    fn from(value: DesignId) -> Self {
        value.0
    }
}

impl TryFrom<String> for DesignId {
    type Error = DesignValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// How a design's artwork is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignKind {
    /// Composed from SVG components in the editor.
    Vector,
    /// Generated by the external image service.
    AiImage,
}

impl DesignKind {
    /// Canonical storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::AiImage => "ai_image",
        }
    }
}

impl fmt::Display for DesignKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DesignKind {
    type Err = DesignValidationError;

    /// Accepts the canonical names plus the editor's legacy aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vector" | "svg" => Ok(Self::Vector),
            "ai_image" | "ai" | "ai-generated" | "ai_generated" => Ok(Self::AiImage),
            other => Err(DesignValidationError::UnknownKind {
                value: other.to_owned(),
            }),
        }
    }
}

/// Who may see a design in the public gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Listed in the public gallery.
    Public,
    /// Visible to the owner only.
    Private,
}

impl Visibility {
    /// Map the `is_public` column onto a visibility.
    pub fn from_public(is_public: bool) -> Self {
        if is_public { Self::Public } else { Self::Private }
    }

    /// Whether the design is public.
    pub fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

/// Slot selections and colour overrides of a vector design.
///
/// Stored verbatim as a JSON object; the editor owns the slot vocabulary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Components(Map<String, Value>);

impl Components {
    /// Wrap an object map.
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Accept a JSON value, requiring an object.
    pub fn from_value(value: Value) -> Result<Self, DesignValidationError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err(DesignValidationError::MissingComponents),
            _ => Err(DesignValidationError::ComponentsNotObject),
        }
    }

    /// Component id chosen for `slot`, if any.
    pub fn slot(&self, slot: &str) -> Option<&str> {
        self.0.get(slot).and_then(Value::as_str)
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Artwork of a design; the variant fixes the [`DesignKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum DesignContent {
    /// Vector composition.
    Vector { components: Components },
    /// Generated image.
    AiImage { image_url: String },
}

impl DesignContent {
    /// Kind implied by the content.
    pub fn kind(&self) -> DesignKind {
        match self {
            Self::Vector { .. } => DesignKind::Vector,
            Self::AiImage { .. } => DesignKind::AiImage,
        }
    }

    fn build(
        kind: DesignKind,
        components: Option<Value>,
        image_url: Option<String>,
    ) -> Result<Self, DesignValidationError> {
        match kind {
            DesignKind::Vector => {
                let value = components.ok_or(DesignValidationError::MissingComponents)?;
                Ok(Self::Vector {
                    components: Components::from_value(value)?,
                })
            }
            DesignKind::AiImage => {
                let raw = image_url
                    .map(|url| url.trim().to_owned())
                    .filter(|url| !url.is_empty())
                    .ok_or(DesignValidationError::MissingImageUrl)?;
                Url::parse(&raw).map_err(|_| DesignValidationError::InvalidImageUrl)?;
                Ok(Self::AiImage { image_url: raw })
            }
        }
    }
}

/// A saved design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DesignRow", into = "DesignRow")]
pub struct Design {
    pub id: DesignId,
    pub title: String,
    pub owner_id: UserId,
    pub content: DesignContent,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub likes_count: u64,
    pub comments_count: u64,
}

impl Design {
    /// Materialise a new design from a validated draft.
    pub fn from_new(id: DesignId, draft: NewDesign, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            owner_id: draft.owner_id,
            content: draft.content,
            visibility: draft.visibility,
            created_at: now,
            updated_at: now,
            likes_count: 0,
            comments_count: 0,
        }
    }

    /// Kind of artwork.
    pub fn kind(&self) -> DesignKind {
        self.content.kind()
    }
}

/// Row shape of a design in the record store and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignRow {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub user_id: String,
    pub design_type: String,
    #[serde(default)]
    pub components: Option<Value>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub comments_count: u64,
}

impl From<Design> for DesignRow {
    fn from(value: Design) -> Self {
        let design_type = value.kind().as_str().to_owned();
        let (components, image_url) = match value.content {
            DesignContent::Vector { components } => (Some(components.into_value()), None),
            DesignContent::AiImage { image_url } => (None, Some(image_url)),
        };
        Self {
            id: value.id.into(),
            title: value.title,
            user_id: value.owner_id.into(),
            design_type,
            components,
            image_url,
            is_public: value.visibility.is_public(),
            created_at: value.created_at,
            updated_at: Some(value.updated_at),
            likes_count: value.likes_count,
            comments_count: value.comments_count,
        }
    }
}

impl TryFrom<DesignRow> for Design {
    type Error = DesignValidationError;

    fn try_from(row: DesignRow) -> Result<Self, Self::Error> {
        let kind = DesignKind::from_str(&row.design_type)?;
        let content = DesignContent::build(kind, row.components, row.image_url)?;
        Ok(Self {
            id: DesignId::new(row.id)?,
            title: row.title,
            owner_id: UserId::new(row.user_id).map_err(DesignValidationError::InvalidOwner)?,
            content,
            visibility: Visibility::from_public(row.is_public),
            created_at: row.created_at,
            updated_at: row.updated_at.unwrap_or(row.created_at),
            likes_count: row.likes_count,
            comments_count: row.comments_count,
        })
    }
}

/// Raw, unvalidated design creation input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesignDraft {
    pub title: Option<String>,
    pub owner_id: Option<String>,
    pub design_type: Option<String>,
    pub components: Option<Value>,
    pub image_url: Option<String>,
    pub is_public: Option<bool>,
}

/// Validated design creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDesign {
    pub title: String,
    pub owner_id: UserId,
    pub content: DesignContent,
    pub visibility: Visibility,
}

impl NewDesign {
    /// Validate a draft. A missing `design_type` means a vector design; a
    /// missing visibility means private.
    ///
    /// # Examples
    /// ```
    /// use pawprint::domain::{DesignDraft, DesignKind, NewDesign};
    /// use serde_json::json;
    ///
    /// let draft = DesignDraft {
    ///     title: Some("A".into()),
    ///     owner_id: Some("temp-1".into()),
    ///     design_type: Some("svg".into()),
    ///     components: Some(json!({})),
    ///     ..DesignDraft::default()
    /// };
    /// let design = NewDesign::parse(draft).unwrap();
    /// assert_eq!(design.content.kind(), DesignKind::Vector);
    /// ```
    pub fn parse(draft: DesignDraft) -> Result<Self, DesignValidationError> {
        let owner_raw = draft
            .owner_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(DesignValidationError::MissingOwner)?;
        let owner_id = UserId::new(owner_raw).map_err(DesignValidationError::InvalidOwner)?;
        let kind = match draft.design_type.as_deref() {
            Some(raw) => DesignKind::from_str(raw)?,
            None => DesignKind::Vector,
        };
        let content = DesignContent::build(kind, draft.components, draft.image_url)?;
        Ok(Self {
            title: normalise_title(draft.title)?,
            owner_id,
            content,
            visibility: Visibility::from_public(draft.is_public.unwrap_or(false)),
        })
    }
}

fn normalise_title(raw: Option<String>) -> Result<String, DesignValidationError> {
    let title = raw
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_owned());
    if title.chars().count() > TITLE_MAX {
        return Err(DesignValidationError::TitleTooLong { max: TITLE_MAX });
    }
    Ok(title)
}

/// Owner-initiated changes to a design.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesignPatch {
    pub title: Option<String>,
    pub components: Option<Value>,
    pub image_url: Option<String>,
    pub is_public: Option<bool>,
}

impl DesignPatch {
    /// Apply the patch in place, refreshing `updated_at`.
    pub fn apply(self, design: &mut Design, now: DateTime<Utc>) -> Result<(), DesignValidationError> {
        let kind = design.kind();
        if let Some(title) = self.title {
            design.title = normalise_title(Some(title))?;
        }
        match (self.components, self.image_url, &mut design.content) {
            (Some(_), _, DesignContent::AiImage { .. }) => {
                return Err(DesignValidationError::ContentMismatch {
                    field: "components",
                    kind,
                });
            }
            (_, Some(_), DesignContent::Vector { .. }) => {
                return Err(DesignValidationError::ContentMismatch {
                    field: "image_url",
                    kind,
                });
            }
            (Some(value), None, content @ DesignContent::Vector { .. }) => {
                *content = DesignContent::Vector {
                    components: Components::from_value(value)?,
                };
            }
            (None, Some(url), content @ DesignContent::AiImage { .. }) => {
                *content = DesignContent::build(DesignKind::AiImage, None, Some(url))?;
            }
            _ => {}
        }
        if let Some(is_public) = self.is_public {
            design.visibility = Visibility::from_public(is_public);
        }
        design.updated_at = now;
        Ok(())
    }
}

/// Listing filter for `GET /designs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesignFilter {
    pub owner_id: Option<UserId>,
    pub visibility: Option<Visibility>,
}

impl DesignFilter {
    /// Whether `design` satisfies the filter.
    pub fn matches(&self, design: &Design) -> bool {
        self.owner_id
            .as_ref()
            .is_none_or(|owner| &design.owner_id == owner)
            && self
                .visibility
                .is_none_or(|visibility| design.visibility == visibility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn draft(design_type: &str) -> DesignDraft {
        DesignDraft {
            title: Some("  Whiskers ".into()),
            owner_id: Some("temp-1".into()),
            design_type: Some(design_type.into()),
            components: Some(json!({ "body": "round", "colors": { "body": "#fff" } })),
            image_url: Some("https://img.example/cat.png".into()),
            is_public: Some(true),
        }
    }

    #[rstest]
    #[case("svg", DesignKind::Vector)]
    #[case("vector", DesignKind::Vector)]
    #[case("ai_image", DesignKind::AiImage)]
    #[case("AI", DesignKind::AiImage)]
    fn parses_kind_aliases(#[case] raw: &str, #[case] expected: DesignKind) {
        let design = NewDesign::parse(draft(raw)).expect("valid draft");
        assert_eq!(design.content.kind(), expected);
        assert_eq!(design.title, "Whiskers");
    }

    #[rstest]
    fn missing_owner_is_rejected() {
        let mut input = draft("svg");
        input.owner_id = None;
        assert_eq!(
            NewDesign::parse(input).expect_err("owner required"),
            DesignValidationError::MissingOwner
        );
    }

    #[rstest]
    #[case("svg", DesignValidationError::MissingComponents)]
    #[case("ai_image", DesignValidationError::MissingImageUrl)]
    fn kind_specific_fields_are_required(
        #[case] kind: &str,
        #[case] expected: DesignValidationError,
    ) {
        let mut input = draft(kind);
        input.components = None;
        input.image_url = None;
        assert_eq!(NewDesign::parse(input).expect_err("missing field"), expected);
    }

    #[rstest]
    fn blank_title_defaults() {
        let mut input = draft("svg");
        input.title = Some("   ".into());
        let design = NewDesign::parse(input).expect("valid draft");
        assert_eq!(design.title, DEFAULT_TITLE);
    }

    #[rstest]
    fn row_round_trip_keeps_kind_invariant() {
        let row = json!({
            "id": "d1",
            "title": "A",
            "user_id": "u1",
            "design_type": "ai_image",
            "components": null,
            "image_url": null,
            "is_public": false,
            "created_at": "2026-01-01T00:00:00Z"
        });
        let err = serde_json::from_value::<Design>(row).expect_err("ai design needs image");
        assert!(err.to_string().contains("image_url"));
    }

    #[rstest]
    fn patch_rejects_cross_kind_content() {
        let now = Utc::now();
        let mut design = Design::from_new(
            DesignId::random(),
            NewDesign::parse(draft("svg")).expect("valid draft"),
            now,
        );
        let patch = DesignPatch {
            image_url: Some("https://img.example/x.png".into()),
            ..DesignPatch::default()
        };
        let err = patch.apply(&mut design, now).expect_err("mismatch");
        assert_eq!(err.field(), "image_url");
    }

    #[rstest]
    fn filter_matches_owner_and_visibility() {
        let design = Design::from_new(
            DesignId::random(),
            NewDesign::parse(draft("svg")).expect("valid draft"),
            Utc::now(),
        );
        let owner = UserId::new("temp-1").expect("id");
        let filter = DesignFilter {
            owner_id: Some(owner),
            visibility: Some(Visibility::Public),
        };
        assert!(filter.matches(&design));
        let private_only = DesignFilter {
            visibility: Some(Visibility::Private),
            ..DesignFilter::default()
        };
        assert!(!private_only.matches(&design));
    }
}
