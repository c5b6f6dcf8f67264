use actix_web::{
    delete, get, http::StatusCode, middleware::from_fn, post, put, web, HttpResponse, Responder,
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use utoipa::OpenApi;

use crate::auth;
use crate::config::Config;
use crate::db::DbConnection;
use crate::errors::ApiError;
use crate::middleware::{require_auth, AuthedUser};
use crate::models::{
    is_valid_status, Envelope, LoginRequest, LoginResponse, NewProject, NewTask, ProjectDto,
    ProjectPatch, ProjectRef, RegisterRequest, TaskDto, TaskPatch, UserDto,
};
use crate::repository::{projects, tasks, users};

/// Request bodies are JSON and capped at 10 KB.
const JSON_BODY_LIMIT: usize = 10 * 1024;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_BODY_LIMIT)
            .error_handler(|err, _req| ApiError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::validation(err.to_string()).into()),
    )
    .service(health)
    .service(openapi_spec)
    .service(
        web::scope("/api")
            .service(register)
            .service(login)
            .service(
                web::scope("")
                    .wrap(from_fn(require_auth))
                    .service(list_tasks)
                    .service(get_task)
                    .service(create_task)
                    .service(update_task)
                    .service(delete_task)
                    .service(list_projects)
                    .service(get_project)
                    .service(create_project)
                    .service(update_project)
                    .service(delete_project),
            ),
    );
}

// ==================== helpers ====================

fn required_trimmed(value: &str, field: &'static str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn trimmed_or_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation("invalid id, expected a number"))
}

fn ensure_status(status: &str) -> Result<(), ApiError> {
    if !is_valid_status(status) {
        return Err(ApiError::validation(
            "invalid status, valid values are: pending, completed",
        ));
    }
    Ok(())
}

/// A task may only reference a project the same user owns; anything else is
/// indistinguishable from a missing project.
fn ensure_project_owned(conn: &Connection, project_id: i64, user_id: i64) -> Result<(), ApiError> {
    projects::find_by_id(conn, project_id, user_id)?
        .map(|_| ())
        .ok_or(ApiError::NotFound {
            resource: "project",
        })
}

// ==================== health & docs ====================

#[get("/health")]
async fn health() -> impl Responder {
    Envelope::ok(
        json!({ "status": "OK", "timestamp": crate::db::now() }),
        "Server is running",
    )
}

#[get("/api-docs/openapi.json")]
async fn openapi_spec() -> impl Responder {
    web::Json(ApiDoc::openapi())
}

// ==================== auth ====================

#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserDto),
        (status = 400, description = "Missing required field"),
        (status = 409, description = "Email already registered")
    )
)]
#[post("/register")]
async fn register(
    db: web::Data<DbConnection>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let email = required_trimmed(&body.email, "email")?;
    let name = required_trimmed(&body.name, "name")?;
    if body.password.is_empty() {
        return Err(ApiError::validation("password is required"));
    }

    let conn = db.lock()?;
    if users::find_by_email(&conn, &email)?.is_some() {
        return Err(ApiError::conflict("email already registered"));
    }

    let hash = auth::hash_password(&body.password)?;
    let user = users::create(&conn, &email, &hash, &name)?;
    log::info!("registered user {} ({})", user.id, user.email);

    Ok(Envelope::created(UserDto::from(user), "user created"))
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Unknown email or wrong password")
    )
)]
#[post("/login")]
async fn login(
    db: web::Data<DbConnection>,
    config: web::Data<Config>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let email = required_trimmed(&body.email, "email")?;
    if body.password.is_empty() {
        return Err(ApiError::validation("password is required"));
    }

    let conn = db.lock()?;
    let user = users::find_by_email(&conn, &email)?.ok_or(ApiError::BadCredentials)?;
    if !auth::verify_password(&body.password, &user.password_hash)? {
        return Err(ApiError::BadCredentials);
    }

    let token = auth::create_jwt(user.id, &user.email, config.jwt_secret.as_bytes())?;
    Ok(Envelope::ok(
        LoginResponse {
            token,
            user: UserDto::from(user),
        },
        "login successful",
    ))
}

// ==================== tasks ====================

#[derive(Debug, Deserialize)]
struct TaskListQuery {
    limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/tasks",
    params(("limit" = Option<i64>, Query, description = "Max rows to return, clamped to 100")),
    responses(
        (status = 200, description = "Tasks, newest first", body = [TaskDto]),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[get("/tasks")]
async fn list_tasks(
    db: web::Data<DbConnection>,
    user: AuthedUser,
    query: web::Query<TaskListQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = db.lock()?;
    let found = tasks::list_for_user(&conn, user.user_id, query.limit)?;
    let message = format!("{} tasks found", found.len());
    Ok(Envelope::ok(found, message))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task", body = TaskDto),
        (status = 400, description = "Non-numeric id"),
        (status = 404, description = "Unknown or not-owned id")
    )
)]
#[get("/tasks/{id}")]
async fn get_task(
    db: web::Data<DbConnection>,
    user: AuthedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let conn = db.lock()?;
    let task = tasks::find_by_id(&conn, id, user.user_id)?
        .ok_or(ApiError::NotFound { resource: "task" })?;
    Ok(Envelope::ok(task, "task found"))
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = NewTask,
    responses(
        (status = 201, description = "Task created", body = TaskDto),
        (status = 400, description = "Missing title or invalid status"),
        (status = 404, description = "Referenced project not owned")
    )
)]
#[post("/tasks")]
async fn create_task(
    db: web::Data<DbConnection>,
    user: AuthedUser,
    body: web::Json<NewTask>,
) -> Result<HttpResponse, ApiError> {
    let title = required_trimmed(&body.title, "title")?;
    if let Some(status) = body.status.as_deref() {
        ensure_status(status)?;
    }

    let conn = db.lock()?;
    if let Some(project_id) = body.project_id {
        ensure_project_owned(&conn, project_id, user.user_id)?;
    }

    let task = NewTask {
        title,
        description: trimmed_or_none(body.description.as_deref()),
        status: body.status.clone(),
        project_id: body.project_id,
    };
    let created = tasks::create(&conn, user.user_id, &task)?;
    Ok(Envelope::created(created, "task created"))
}

#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    request_body = TaskPatch,
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task updated", body = TaskDto),
        (status = 400, description = "Non-numeric id or invalid field"),
        (status = 404, description = "Unknown or not-owned id")
    )
)]
#[put("/tasks/{id}")]
async fn update_task(
    db: web::Data<DbConnection>,
    user: AuthedUser,
    path: web::Path<String>,
    body: web::Json<TaskPatch>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;

    let mut patch = body.into_inner();
    if let Some(title) = patch.title.take() {
        patch.title = Some(required_trimmed(&title, "title")?);
    }
    if let Some(status) = patch.status.as_deref() {
        ensure_status(status)?;
    }

    let conn = db.lock()?;
    if let Some(Some(project_id)) = patch.project_id {
        ensure_project_owned(&conn, project_id, user.user_id)?;
    }

    let updated = tasks::update(&conn, id, user.user_id, &patch)?
        .ok_or(ApiError::NotFound { resource: "task" })?;
    Ok(Envelope::ok(updated, "task updated"))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task deleted"),
        (status = 404, description = "Unknown or not-owned id")
    )
)]
#[delete("/tasks/{id}")]
async fn delete_task(
    db: web::Data<DbConnection>,
    user: AuthedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let conn = db.lock()?;
    if !tasks::delete(&conn, id, user.user_id)? {
        return Err(ApiError::NotFound { resource: "task" });
    }
    Ok(crate::models::respond::<()>(
        StatusCode::OK,
        None,
        "task deleted",
    ))
}

// ==================== projects ====================

#[utoipa::path(
    get,
    path = "/api/projects",
    responses(
        (status = 200, description = "Projects, newest first", body = [ProjectDto]),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[get("/projects")]
async fn list_projects(
    db: web::Data<DbConnection>,
    user: AuthedUser,
) -> Result<HttpResponse, ApiError> {
    let conn = db.lock()?;
    let found = projects::list_for_user(&conn, user.user_id)?;
    let message = format!("{} projects found", found.len());
    Ok(Envelope::ok(found, message))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(("id" = i64, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project", body = ProjectDto),
        (status = 400, description = "Non-numeric id"),
        (status = 404, description = "Unknown or not-owned id")
    )
)]
#[get("/projects/{id}")]
async fn get_project(
    db: web::Data<DbConnection>,
    user: AuthedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let conn = db.lock()?;
    let project = projects::find_by_id(&conn, id, user.user_id)?.ok_or(ApiError::NotFound {
        resource: "project",
    })?;
    Ok(Envelope::ok(project, "project found"))
}

#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = NewProject,
    responses(
        (status = 201, description = "Project created", body = ProjectDto),
        (status = 400, description = "Missing name")
    )
)]
#[post("/projects")]
async fn create_project(
    db: web::Data<DbConnection>,
    user: AuthedUser,
    body: web::Json<NewProject>,
) -> Result<HttpResponse, ApiError> {
    let name = required_trimmed(&body.name, "name")?;
    let description = trimmed_or_none(body.description.as_deref());

    let conn = db.lock()?;
    let created = projects::create(&conn, user.user_id, &name, description.as_deref())?;
    Ok(Envelope::created(created, "project created"))
}

#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    request_body = ProjectPatch,
    params(("id" = i64, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project updated", body = ProjectDto),
        (status = 400, description = "Non-numeric id or empty name"),
        (status = 404, description = "Unknown or not-owned id")
    )
)]
#[put("/projects/{id}")]
async fn update_project(
    db: web::Data<DbConnection>,
    user: AuthedUser,
    path: web::Path<String>,
    body: web::Json<ProjectPatch>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;

    let mut patch = body.into_inner();
    if let Some(name) = patch.name.take() {
        patch.name = Some(required_trimmed(&name, "name")?);
    }

    let conn = db.lock()?;
    let updated = projects::update(&conn, id, user.user_id, &patch)?.ok_or(ApiError::NotFound {
        resource: "project",
    })?;
    Ok(Envelope::ok(updated, "project updated"))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    params(("id" = i64, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project deleted, its tasks keep living without a project"),
        (status = 404, description = "Unknown or not-owned id")
    )
)]
#[delete("/projects/{id}")]
async fn delete_project(
    db: web::Data<DbConnection>,
    user: AuthedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let conn = db.lock()?;
    if !projects::delete(&conn, id, user.user_id)? {
        return Err(ApiError::NotFound {
            resource: "project",
        });
    }
    Ok(crate::models::respond::<()>(
        StatusCode::OK,
        None,
        "project deleted",
    ))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        register,
        login,
        list_tasks,
        get_task,
        create_task,
        update_task,
        delete_task,
        list_projects,
        get_project,
        create_project,
        update_project,
        delete_project
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        UserDto,
        TaskDto,
        NewTask,
        TaskPatch,
        ProjectDto,
        ProjectRef,
        NewProject,
        ProjectPatch
    ))
)]
pub struct ApiDoc;
