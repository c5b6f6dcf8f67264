//! Field-name translation between the wire representation and the client's
//! in-memory one: `title<->text`, `status<->completed`,
//! `projectId<->category` with the `pessoal` sentinel standing in for a task
//! without a project. The mapping is bijective for those fields; `priority`
//! and `time` are client-only decoration and never reach the server.

use crate::models::{NewTask, TaskDto, STATUS_COMPLETED, STATUS_PENDING};

/// Category of tasks that have no project on the server.
pub const PERSONAL_CATEGORY: &str = "pessoal";

/// Default value for the client-only priority decoration.
pub const DEFAULT_PRIORITY: &str = "padrao";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientTask {
    pub id: i64,
    pub text: String,
    pub description: Option<String>,
    pub completed: bool,
    pub category: String,
    pub priority: String,
    pub time: Option<String>,
}

pub fn to_client_task(task: &TaskDto) -> ClientTask {
    ClientTask {
        id: task.id,
        text: task.title.clone(),
        description: task.description.clone(),
        completed: task.status == STATUS_COMPLETED,
        category: task
            .project_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| PERSONAL_CATEGORY.to_string()),
        priority: DEFAULT_PRIORITY.to_string(),
        time: None,
    }
}

pub fn to_server_task(task: &ClientTask) -> NewTask {
    NewTask {
        title: task.text.clone(),
        description: task.description.clone(),
        status: Some(
            if task.completed {
                STATUS_COMPLETED
            } else {
                STATUS_PENDING
            }
            .to_string(),
        ),
        project_id: category_to_project_id(&task.category),
    }
}

/// `pessoal` (and any other non-numeric fixed bucket) maps to "no project".
pub fn category_to_project_id(category: &str) -> Option<i64> {
    if category == PERSONAL_CATEGORY {
        None
    } else {
        category.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectRef;

    fn server_task(id: i64, title: &str, status: &str, project_id: Option<i64>) -> TaskDto {
        TaskDto {
            id,
            title: title.into(),
            description: Some("details".into()),
            status: status.into(),
            project_id,
            user_id: 1,
            created_at: "2026-01-01T00:00:00Z".into(),
            project: project_id.map(|id| ProjectRef {
                id,
                name: "Work".into(),
            }),
        }
    }

    #[test]
    fn server_to_client_renames_fields() {
        let client = to_client_task(&server_task(7, "Write report", "completed", Some(3)));
        assert_eq!(client.text, "Write report");
        assert!(client.completed);
        assert_eq!(client.category, "3");
        assert_eq!(client.priority, DEFAULT_PRIORITY);
        assert!(client.time.is_none());
    }

    #[test]
    fn null_project_becomes_personal_sentinel() {
        let client = to_client_task(&server_task(7, "Buy milk", "pending", None));
        assert_eq!(client.category, PERSONAL_CATEGORY);
        assert!(!client.completed);
    }

    #[test]
    fn round_trip_preserves_mapped_fields() {
        for task in [
            server_task(1, "Write report", "completed", Some(3)),
            server_task(2, "Buy milk", "pending", None),
        ] {
            let client = to_client_task(&task);
            let back = to_server_task(&client);
            assert_eq!(back.title, task.title);
            assert_eq!(back.status.as_deref(), Some(task.status.as_str()));
            assert_eq!(back.project_id, task.project_id);
            assert_eq!(back.description, task.description);
        }
    }

    #[test]
    fn client_round_trip_preserves_mapped_fields() {
        let original = ClientTask {
            id: 0,
            text: "Write report".into(),
            description: None,
            completed: true,
            category: "12".into(),
            priority: DEFAULT_PRIORITY.into(),
            time: None,
        };
        let server = to_server_task(&original);
        assert_eq!(server.project_id, Some(12));
        assert_eq!(server.status.as_deref(), Some(STATUS_COMPLETED));
        assert_eq!(server.title, "Write report");
    }
}
