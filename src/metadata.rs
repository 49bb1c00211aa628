//! Codec for the free-form project attribute bag
//!
//! Alongside its scalar columns, every project row carries a schemaless
//! attribute bag (keywords, submitted team roster, cached external links,
//! uploaded file descriptors) serialized as JSON into the `comment_student`
//! text column. The column predates the bag and holds whatever older
//! writers left there, so decoding is tolerant: malformed payloads decode
//! to `None`, and malformed array elements are dropped one by one instead
//! of failing the whole bag.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// A submitted team roster entry, as it appears in the bag and in
/// project submission payloads
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    #[serde(default = "default_member_role")]
    pub role: String,
    #[serde(default)]
    pub is_primary: bool,
}

fn default_member_role() -> String {
    "student".to_string()
}

/// Descriptor of an uploaded file; storage itself lives elsewhere
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

/// The project attribute bag
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_links: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team_members: Vec<TeamMemberEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub award: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,
    /// Legacy shadow of the `grade` column, kept readable for old payloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

impl ProjectMetadata {
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
            && self.external_links.is_empty()
            && self.team_members.is_empty()
            && self.files.is_empty()
            && self.award.is_none()
            && self.course_code.is_none()
            && self.completion_date.is_none()
            && self.grade.is_none()
    }
}

/// Decode the stored column text into a bag.
///
/// Returns `None` for missing/blank input, for text that is not valid
/// JSON, and for JSON whose top level is not an object. Never panics.
pub fn decode(raw: Option<&str>) -> Option<ProjectMetadata> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let value: Value = serde_json::from_str(raw).ok()?;
    let obj = value.as_object()?;

    Some(ProjectMetadata {
        keywords: string_items(obj.get("keywords")),
        external_links: string_items(obj.get("externalLinks")),
        team_members: array_items(obj.get("teamMembers"), member_from_value),
        files: array_items(obj.get("files"), file_from_value),
        award: string_field(obj.get("award")),
        course_code: string_field(obj.get("courseCode")),
        completion_date: string_field(obj.get("completionDate")),
        grade: string_field(obj.get("grade")),
    })
}

/// Encode a bag for storage; `None` when there is nothing worth storing
pub fn encode(metadata: &ProjectMetadata) -> Option<String> {
    if metadata.is_empty() {
        return None;
    }
    serde_json::to_string(metadata).ok()
}

fn string_items(value: Option<&Value>) -> Vec<String> {
    match value.and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

fn array_items<T>(value: Option<&Value>, parse: fn(&Value) -> Option<T>) -> Vec<T> {
    match value.and_then(Value::as_array) {
        Some(items) => items.iter().filter_map(parse).collect(),
        None => Vec::new(),
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

// A roster entry is kept only when it carries a string email; every other
// field falls back rather than failing the element.
fn member_from_value(value: &Value) -> Option<TeamMemberEntry> {
    let email = value.get("email")?.as_str()?.to_string();
    Some(TeamMemberEntry {
        name: value.get("name").and_then(Value::as_str).map(str::to_string),
        email,
        role: value
            .get("role")
            .and_then(Value::as_str)
            .unwrap_or("student")
            .to_string(),
        is_primary: value
            .get("isPrimary")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

// A file entry is kept only when it carries a string name.
fn file_from_value(value: &Value) -> Option<FileEntry> {
    let name = value.get("name")?.as_str()?.to_string();
    Some(FileEntry {
        name,
        size: value.get("size").and_then(Value::as_i64),
        file_type: value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}
