use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_COMPLETED: &str = "completed";

pub fn is_valid_status(status: &str) -> bool {
    status == STATUS_PENDING || status == STATUS_COMPLETED
}

/// Stored user row, including the password hash. Never serialized; routes
/// expose `UserDto` instead.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: String,
}

impl From<UserRecord> for UserDto {
    fn from(user: UserRecord) -> Self {
        UserDto {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub user_id: i64,
    pub created_at: String,
    /// Number of tasks currently referencing this project.
    pub task_count: i64,
}

/// Slim owning-project reference embedded in task responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProjectRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub project_id: Option<i64>,
    pub user_id: i64,
    pub created_at: String,
    pub project: Option<ProjectRef>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub project_id: Option<i64>,
}

/// Partial task update. Double-`Option` fields distinguish "absent" (keep the
/// stored value) from an explicit `null` (clear it).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<i64>)]
    pub project_id: Option<Option<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

/// JWT payload: the owning user id and email, plus expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub exp: usize,
}

/// A field that was present in the JSON, possibly as `null`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Uniform response envelope: `{success, data, message, httpStatus}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
    pub http_status: u16,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T, message: impl Into<String>) -> HttpResponse {
        respond(StatusCode::OK, Some(data), message)
    }

    pub fn created(data: T, message: impl Into<String>) -> HttpResponse {
        respond(StatusCode::CREATED, Some(data), message)
    }
}

pub fn respond<T: Serialize>(
    status: StatusCode,
    data: Option<T>,
    message: impl Into<String>,
) -> HttpResponse {
    HttpResponse::build(status).json(Envelope {
        success: status.is_success(),
        data,
        message: message.into(),
        http_status: status.as_u16(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_patch_distinguishes_null_from_absent() {
        let patch: TaskPatch = serde_json::from_str(r#"{"projectId": null}"#).unwrap();
        assert_eq!(patch.project_id, Some(None));
        assert!(patch.title.is_none());

        let patch: TaskPatch = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert!(patch.project_id.is_none());
        assert_eq!(patch.title.as_deref(), Some("x"));

        let patch: TaskPatch = serde_json::from_str(r#"{"projectId": 7}"#).unwrap();
        assert_eq!(patch.project_id, Some(Some(7)));
    }

    #[test]
    fn status_values() {
        assert!(is_valid_status("pending"));
        assert!(is_valid_status("completed"));
        assert!(!is_valid_status("done"));
        assert!(!is_valid_status(""));
    }

    #[test]
    fn envelope_serializes_camel_case() {
        let body = serde_json::to_value(Envelope {
            success: true,
            data: Some(1),
            message: "ok".into(),
            http_status: 200,
        })
        .unwrap();
        assert_eq!(body["httpStatus"], 200);
        assert_eq!(body["success"], true);
    }
}
