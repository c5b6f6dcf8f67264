//! Ties the API client to the state container. Mutations confirm with the
//! backend first and touch local state only on success, so the board never
//! diverges from the store; the `loading` flag is up for the whole round
//! trip and callers are expected to block the UI on it.

use crate::client::state::TaskBoard;
use crate::client::translate::category_to_project_id;
use crate::client::{ApiClient, ClientError};
use crate::models::{NewProject, NewTask, TaskPatch, UserDto, STATUS_COMPLETED, STATUS_PENDING};

pub struct Session {
    api: ApiClient,
    pub board: TaskBoard,
    pub user: Option<UserDto>,
    pub loading: bool,
}

impl Session {
    pub fn new(base_url: impl Into<String>) -> Self {
        Session {
            api: ApiClient::new(base_url),
            board: TaskBoard::new(),
            user: None,
            loading: false,
        }
    }

    pub fn with_board(base_url: impl Into<String>, board: TaskBoard) -> Self {
        Session {
            api: ApiClient::new(base_url),
            board,
            user: None,
            loading: false,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Login plus the initial data load.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        self.loading = true;
        let result = self.sign_in_inner(email, password).await;
        self.loading = false;
        result
    }

    async fn sign_in_inner(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        let user = self.api.login(email, password).await?;
        let projects = self.api.get_projects().await?;
        let tasks = self.api.get_tasks(None).await?;
        self.board.sync_from_server(&projects, &tasks);
        self.user = Some(user);
        Ok(())
    }

    pub fn sign_out(&mut self) {
        self.user = None;
        self.board = TaskBoard::new();
    }

    /// Re-fetches projects and tasks wholesale.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.loading = true;
        let result = async {
            let projects = self.api.get_projects().await?;
            let tasks = self.api.get_tasks(None).await?;
            self.board.sync_from_server(&projects, &tasks);
            Ok(())
        }
        .await;
        self.loading = false;
        result
    }

    /// Creates a task in the active filter's category (or `pessoal` under
    /// the `hoje` filter) and prepends it locally once the server confirms.
    pub async fn add_task(
        &mut self,
        text: &str,
        description: Option<&str>,
    ) -> Result<(), ClientError> {
        let category = self.board.default_category();
        let task = NewTask {
            title: text.to_string(),
            description: description.map(str::to_string),
            status: None,
            project_id: category_to_project_id(&category),
        };

        self.loading = true;
        let result = self.api.create_task(&task).await;
        self.loading = false;

        self.board.insert_task(&result?);
        Ok(())
    }

    /// Flips a task between pending and completed.
    pub async fn toggle_task(&mut self, id: i64) -> Result<(), ClientError> {
        let completed = self
            .board
            .find_task(id)
            .map(|task| task.completed)
            .ok_or_else(|| ClientError::Refused("unknown task".into()))?;

        let patch = TaskPatch {
            status: Some(
                if completed {
                    STATUS_PENDING
                } else {
                    STATUS_COMPLETED
                }
                .to_string(),
            ),
            ..TaskPatch::default()
        };

        self.loading = true;
        let result = self.api.update_task(id, &patch).await;
        self.loading = false;

        self.board.apply_task(&result?);
        Ok(())
    }

    pub async fn edit_task(&mut self, id: i64, patch: TaskPatch) -> Result<(), ClientError> {
        self.loading = true;
        let result = self.api.update_task(id, &patch).await;
        self.loading = false;

        self.board.apply_task(&result?);
        Ok(())
    }

    pub async fn remove_task(&mut self, id: i64) -> Result<(), ClientError> {
        self.loading = true;
        let result = self.api.delete_task(id).await;
        self.loading = false;

        result?;
        self.board.remove_task(id);
        Ok(())
    }

    /// Creates a custom project and moves the filter onto it.
    pub async fn add_project(&mut self, name: &str) -> Result<(), ClientError> {
        let project = NewProject {
            name: name.to_string(),
            description: None,
        };

        self.loading = true;
        let result = self.api.create_project(&project).await;
        self.loading = false;

        self.board.insert_project(&result?);
        Ok(())
    }

    /// Fixed buckets are refused before any network call.
    pub async fn remove_project(&mut self, client_id: &str) -> Result<(), ClientError> {
        let server_id = match self.board.find_project(client_id) {
            Some(project) if self.board.can_delete_project(client_id) => project
                .server_id
                .ok_or_else(|| ClientError::Refused("project has no server identity".into()))?,
            Some(_) => {
                return Err(ClientError::Refused(
                    "default projects cannot be deleted".into(),
                ))
            }
            None => return Err(ClientError::Refused("unknown project".into())),
        };

        self.loading = true;
        let result = self.api.delete_project(server_id).await;
        self.loading = false;

        result?;
        self.board.remove_project(client_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::translate::PERSONAL_CATEGORY;
    use serde_json::json;

    fn envelope(data: serde_json::Value, message: &str, status: u16) -> String {
        json!({
            "success": status < 400,
            "data": data,
            "message": message,
            "httpStatus": status,
        })
        .to_string()
    }

    fn task_json(id: i64, title: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "description": null,
            "status": status,
            "projectId": null,
            "userId": 1,
            "createdAt": "2026-01-01T00:00:00Z",
            "project": null,
        })
    }

    #[tokio::test]
    async fn add_task_applies_only_after_confirmation() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/tasks")
            .with_status(201)
            .with_body(envelope(task_json(1, "Buy milk", "pending"), "task created", 201))
            .create_async()
            .await;

        let mut session = Session::new(server.url());
        session.add_task("Buy milk", None).await.unwrap();

        assert_eq!(session.board.tasks().len(), 1);
        assert_eq!(session.board.tasks()[0].text, "Buy milk");
        assert_eq!(session.board.tasks()[0].category, PERSONAL_CATEGORY);
        assert!(!session.loading);
    }

    #[tokio::test]
    async fn failed_mutation_leaves_state_untouched() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/tasks")
            .with_status(500)
            .with_body(envelope(json!(null), "internal server error", 500))
            .create_async()
            .await;

        let mut session = Session::new(server.url());
        let err = session.add_task("Buy milk", None).await.unwrap_err();

        assert!(matches!(err, ClientError::Api { status: 500, .. }));
        assert!(session.board.tasks().is_empty());
        assert!(!session.loading);
    }

    #[tokio::test]
    async fn toggle_round_trips_through_the_backend() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/tasks")
            .with_status(201)
            .with_body(envelope(task_json(1, "Buy milk", "pending"), "task created", 201))
            .create_async()
            .await;
        let update_mock = server
            .mock("PUT", "/api/tasks/1")
            .match_body(mockito::Matcher::PartialJson(json!({"status": "completed"})))
            .with_status(200)
            .with_body(envelope(task_json(1, "Buy milk", "completed"), "task updated", 200))
            .create_async()
            .await;

        let mut session = Session::new(server.url());
        session.add_task("Buy milk", None).await.unwrap();
        session.toggle_task(1).await.unwrap();

        assert!(session.board.tasks()[0].completed);
        update_mock.assert_async().await;
    }

    #[tokio::test]
    async fn fixed_projects_are_refused_without_a_network_call() {
        let server = mockito::Server::new_async().await;
        let mut session = Session::new(server.url());

        let err = session.remove_project("pessoal").await.unwrap_err();
        assert!(matches!(err, ClientError::Refused(_)));
        assert_eq!(session.board.projects().len(), 2);
    }

    #[tokio::test]
    async fn deleting_the_viewed_project_resets_the_filter() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/projects")
            .with_status(201)
            .with_body(envelope(
                json!({
                    "id": 7,
                    "name": "Work",
                    "description": null,
                    "userId": 1,
                    "createdAt": "now",
                    "taskCount": 0,
                }),
                "project created",
                201,
            ))
            .create_async()
            .await;
        server
            .mock("DELETE", "/api/projects/7")
            .with_status(200)
            .with_body(envelope(json!(null), "project deleted", 200))
            .create_async()
            .await;

        let mut session = Session::new(server.url());
        session.add_project("Work").await.unwrap();
        assert_eq!(session.board.filter(), "7");

        session.remove_project("7").await.unwrap();
        assert_eq!(session.board.filter(), crate::client::state::TODAY_FILTER);
    }
}
