//! Client-side state container: projects, translated tasks, the active
//! filter and pagination. All update functions are pure with respect to the
//! outside world; network effects live in [`super::session`].

use crate::client::translate::{to_client_task, ClientTask, PERSONAL_CATEGORY};
use crate::models::{ProjectDto, TaskDto};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Filter sentinel that shows every task.
pub const TODAY_FILTER: &str = "hoje";

pub const PAGE_SIZES: [usize; 3] = [10, 20, 50];
const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    /// Built-in default bucket with no server identity; cannot be deleted.
    Fixed,
    /// User-created, server-persisted, deletable.
    Custom,
}

#[derive(Debug, Clone)]
pub struct ClientProject {
    pub id: String,
    pub name: String,
    pub kind: ProjectKind,
    pub server_id: Option<i64>,
}

fn fixed_projects() -> Vec<ClientProject> {
    vec![
        ClientProject {
            id: "trabalho".into(),
            name: "Trabalho".into(),
            kind: ProjectKind::Fixed,
            server_id: None,
        },
        ClientProject {
            id: PERSONAL_CATEGORY.into(),
            name: "Pessoal".into(),
            kind: ProjectKind::Fixed,
            server_id: None,
        },
    ]
}

fn client_project(project: &ProjectDto) -> ClientProject {
    ClientProject {
        id: project.id.to_string(),
        name: project.name.clone(),
        kind: ProjectKind::Custom,
        server_id: Some(project.id),
    }
}

/// User preferences surviving across sessions, stored as a small JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prefs {
    pub page_size: usize,
}

impl Default for Prefs {
    fn default() -> Self {
        Prefs {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Prefs {
    /// Unreadable or corrupt prefs fall back to the defaults.
    pub fn load(path: &Path) -> Prefs {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|raw| serde_json::from_str::<Prefs>(&raw).ok())
            .filter(|prefs| PAGE_SIZES.contains(&prefs.page_size))
            .unwrap_or_default()
    }

    pub fn store(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, serde_json::to_string(self).unwrap_or_default())
    }
}

#[derive(Debug)]
pub struct TaskBoard {
    projects: Vec<ClientProject>,
    tasks: Vec<ClientTask>,
    filter: String,
    /// 1-based page within the filtered view.
    page: usize,
    page_size: usize,
}

impl Default for TaskBoard {
    fn default() -> Self {
        TaskBoard::new()
    }
}

impl TaskBoard {
    pub fn new() -> Self {
        TaskBoard {
            projects: fixed_projects(),
            tasks: Vec::new(),
            filter: TODAY_FILTER.to_string(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_prefs(prefs: &Prefs) -> Self {
        let mut board = TaskBoard::new();
        if PAGE_SIZES.contains(&prefs.page_size) {
            board.page_size = prefs.page_size;
        }
        board
    }

    // ==================== accessors ====================

    pub fn projects(&self) -> &[ClientProject] {
        &self.projects
    }

    pub fn tasks(&self) -> &[ClientTask] {
        &self.tasks
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// All tasks under the `hoje` sentinel, otherwise the tasks whose
    /// category equals the filter.
    pub fn filtered_tasks(&self) -> Vec<&ClientTask> {
        self.tasks
            .iter()
            .filter(|task| self.filter == TODAY_FILTER || task.category == self.filter)
            .collect()
    }

    pub fn total_pages(&self) -> usize {
        let filtered = self.filtered_tasks().len();
        filtered.div_ceil(self.page_size).max(1)
    }

    /// The slice of the filtered view for the current page.
    pub fn page_slice(&self) -> Vec<&ClientTask> {
        self.filtered_tasks()
            .into_iter()
            .skip((self.page - 1) * self.page_size)
            .take(self.page_size)
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.filtered_tasks()
            .iter()
            .filter(|task| !task.completed)
            .count()
    }

    /// New tasks land in the active project filter, or in `pessoal` when the
    /// filter is `hoje`.
    pub fn default_category(&self) -> String {
        if self.filter == TODAY_FILTER {
            PERSONAL_CATEGORY.to_string()
        } else {
            self.filter.clone()
        }
    }

    pub fn find_project(&self, id: &str) -> Option<&ClientProject> {
        self.projects.iter().find(|project| project.id == id)
    }

    pub fn find_task(&self, id: i64) -> Option<&ClientTask> {
        self.tasks.iter().find(|task| task.id == id)
    }

    // ==================== updates ====================

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.page = 1;
    }

    /// Only 10/20/50 are accepted; a change resets to the first page.
    pub fn set_page_size(&mut self, size: usize) -> bool {
        if !PAGE_SIZES.contains(&size) {
            return false;
        }
        self.page_size = size;
        self.page = 1;
        true
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    /// Replaces all server-backed state, keeping the fixed buckets in front.
    pub fn sync_from_server(&mut self, projects: &[ProjectDto], tasks: &[TaskDto]) {
        self.projects = fixed_projects();
        self.projects.extend(projects.iter().map(client_project));
        self.tasks = tasks.iter().map(to_client_task).collect();
        self.page = 1;
    }

    pub fn insert_task(&mut self, task: &TaskDto) {
        self.tasks.insert(0, to_client_task(task));
    }

    pub fn apply_task(&mut self, task: &TaskDto) {
        let updated = to_client_task(task);
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == updated.id) {
            *slot = updated;
        }
    }

    pub fn remove_task(&mut self, id: i64) {
        self.tasks.retain(|task| task.id != id);
    }

    /// Inserts a custom project and jumps the filter to it.
    pub fn insert_project(&mut self, project: &ProjectDto) {
        let project = client_project(project);
        let filter = project.id.clone();
        self.projects.push(project);
        self.set_filter(filter);
    }

    pub fn can_delete_project(&self, id: &str) -> bool {
        matches!(
            self.find_project(id),
            Some(ClientProject {
                kind: ProjectKind::Custom,
                ..
            })
        )
    }

    /// Removes a custom project; when it was being viewed the filter falls
    /// back to `hoje`.
    pub fn remove_project(&mut self, id: &str) {
        self.projects.retain(|project| project.id != id);
        if self.filter == id {
            self.set_filter(TODAY_FILTER);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::translate::DEFAULT_PRIORITY;

    fn task(id: i64, category: &str, completed: bool) -> ClientTask {
        ClientTask {
            id,
            text: format!("task {id}"),
            description: None,
            completed,
            category: category.into(),
            priority: DEFAULT_PRIORITY.into(),
            time: None,
        }
    }

    fn board_with(tasks: Vec<ClientTask>) -> TaskBoard {
        let mut board = TaskBoard::new();
        board.tasks = tasks;
        board
    }

    #[test]
    fn today_filter_shows_everything() {
        let board = board_with(vec![
            task(1, PERSONAL_CATEGORY, false),
            task(2, "work", false),
        ]);
        assert_eq!(board.filtered_tasks().len(), 2);
    }

    #[test]
    fn category_filter_shows_only_matching_tasks() {
        let mut board = board_with(vec![
            task(1, PERSONAL_CATEGORY, false),
            task(2, "work", false),
            task(3, PERSONAL_CATEGORY, true),
        ]);
        board.set_filter(PERSONAL_CATEGORY);
        let filtered = board.filtered_tasks();
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|t| t.category == PERSONAL_CATEGORY));

        board.set_filter(TODAY_FILTER);
        assert_eq!(board.filtered_tasks().len(), 3);
    }

    #[test]
    fn page_slice_respects_page_and_size() {
        let tasks = (1..=25).map(|id| task(id, "work", false)).collect();
        let mut board = board_with(tasks);

        assert_eq!(board.page_slice().len(), 10);
        board.set_page(3);
        assert_eq!(board.page_slice().len(), 5);
        assert_eq!(board.total_pages(), 3);

        // out-of-range pages clamp instead of showing nothing
        board.set_page(99);
        assert_eq!(board.page(), 3);
    }

    #[test]
    fn changing_page_size_resets_to_first_page() {
        let tasks = (1..=60).map(|id| task(id, "work", false)).collect();
        let mut board = board_with(tasks);
        board.set_page(4);

        assert!(board.set_page_size(20));
        assert_eq!(board.page(), 1);
        assert_eq!(board.page_slice().len(), 20);

        assert!(!board.set_page_size(37));
        assert_eq!(board.page_size(), 20);
    }

    #[test]
    fn default_category_follows_the_filter() {
        let mut board = TaskBoard::new();
        assert_eq!(board.default_category(), PERSONAL_CATEGORY);

        board.set_filter("7");
        assert_eq!(board.default_category(), "7");
    }

    #[test]
    fn fixed_projects_cannot_be_deleted() {
        let board = TaskBoard::new();
        assert!(!board.can_delete_project("trabalho"));
        assert!(!board.can_delete_project(PERSONAL_CATEGORY));
        assert!(!board.can_delete_project("missing"));
    }

    #[test]
    fn deleting_the_viewed_project_resets_the_filter() {
        let mut board = TaskBoard::new();
        let project = ProjectDto {
            id: 7,
            name: "Work".into(),
            description: None,
            user_id: 1,
            created_at: "now".into(),
            task_count: 0,
        };
        board.insert_project(&project);
        assert_eq!(board.filter(), "7");
        assert!(board.can_delete_project("7"));

        board.remove_project("7");
        assert_eq!(board.filter(), TODAY_FILTER);
        assert!(board.find_project("7").is_none());
    }

    #[test]
    fn prefs_survive_a_round_trip_and_reject_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let prefs = Prefs { page_size: 50 };
        prefs.store(&path).unwrap();
        assert_eq!(Prefs::load(&path).page_size, 50);

        std::fs::write(&path, "{\"page_size\": 9999}").unwrap();
        assert_eq!(Prefs::load(&path).page_size, DEFAULT_PAGE_SIZE);

        assert_eq!(Prefs::load(dir.path().join("absent.json").as_path()).page_size, DEFAULT_PAGE_SIZE);
    }
}
