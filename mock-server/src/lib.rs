//! In-memory stand-in for the student REST backend.
//!
//! Serves `/api/students` with the same envelope, status codes and
//! soft-delete behavior the real service exposes, so clients can be tested
//! end to end without a database.

mod store;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub use store::{Filter, Page, SortField, Store, Student, StudentFields};

pub type Db = Arc<RwLock<Store>>;

const NAME_MAX: usize = 64;
const GENDER_MAX: usize = 8;
const GENDERS: [&str; 3] = ["男", "女", "其他"];
const PHONE_MAX: usize = 16;
const NATIVE_PLACE_MAX: usize = 64;
const MAJOR_MAX: usize = 128;
const EMAIL_MAX: usize = 32;
const TAG_MAX: usize = 512;
const REMARK_MAX: usize = 512;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error("{message}")]
    BadRequest {
        message: String,
        errors: Vec<String>,
    },
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            errors: Vec::new(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    errors: Vec<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND.into_response(),
            AppError::BadRequest { message, errors } => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { message, errors })).into_response()
            }
        }
    }
}

/// Incoming create/update body. Required fields are optional here so a
/// missing one produces a readable 400 instead of a decoding rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub age: Option<i64>,
    pub native_place: Option<String>,
    pub major: Option<String>,
    pub email: Option<String>,
    pub tag: Option<String>,
    pub remark: Option<String>,
}

fn required(
    errors: &mut Vec<String>,
    value: Option<String>,
    label: &str,
    max: usize,
) -> String {
    let value = value.unwrap_or_default();
    if value.trim().is_empty() {
        errors.push(format!("{label} is required"));
    } else if value.chars().count() > max {
        errors.push(format!("{label} must be less than {max} characters"));
    }
    value
}

fn bounded(errors: &mut Vec<String>, value: &Option<String>, label: &str, max: usize) {
    if value.as_ref().is_some_and(|v| v.chars().count() > max) {
        errors.push(format!("{label} must be less than {max} characters"));
    }
}

impl StudentPayload {
    pub fn validate(self) -> Result<StudentFields, AppError> {
        let mut errors = Vec::new();
        let name = required(&mut errors, self.name, "Name", NAME_MAX);
        let gender = required(&mut errors, self.gender, "Gender", GENDER_MAX);
        if !gender.trim().is_empty() && !GENDERS.contains(&gender.as_str()) {
            errors.push(format!("Gender must be one of {}", GENDERS.join(", ")));
        }
        let phone = required(&mut errors, self.phone, "Phone", PHONE_MAX);
        let major = required(&mut errors, self.major, "Major", MAJOR_MAX);
        let age = match self.age {
            None => {
                errors.push("Age is required".to_string());
                0
            }
            Some(age) if age < 0 => {
                errors.push("Age must be a positive number".to_string());
                age
            }
            Some(age) if age > i64::from(u32::MAX) => {
                errors.push("Age is out of range".to_string());
                age
            }
            Some(age) => age,
        };
        bounded(&mut errors, &self.native_place, "Native place", NATIVE_PLACE_MAX);
        bounded(&mut errors, &self.email, "Email", EMAIL_MAX);
        if self
            .email
            .as_deref()
            .is_some_and(|e| !e.is_empty() && !e.contains('@'))
        {
            errors.push("Email should be valid".to_string());
        }
        bounded(&mut errors, &self.tag, "Tag", TAG_MAX);
        bounded(&mut errors, &self.remark, "Remark", REMARK_MAX);

        if !errors.is_empty() {
            return Err(AppError::BadRequest {
                message: errors.join("; "),
                errors,
            });
        }
        Ok(StudentFields {
            user_id: self.user_id,
            name,
            gender,
            phone,
            age,
            native_place: self.native_place,
            major,
            email: self.email,
            tag: self.tag,
            remark: self.remark,
        })
    }
}

fn default_size() -> u32 {
    10
}

fn default_sort() -> String {
    "id".to_string()
}

fn default_order() -> String {
    "asc".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    page: u32,
    #[serde(default = "default_size")]
    size: u32,
    #[serde(default = "default_sort")]
    sort: String,
    #[serde(default = "default_order")]
    order: String,
}

#[derive(Debug, Deserialize)]
pub struct KeywordParams {
    keyword: String,
    #[serde(default)]
    page: u32,
    #[serde(default = "default_size")]
    size: u32,
}

#[derive(Debug, Deserialize)]
pub struct NameParams {
    name: String,
    #[serde(default)]
    page: u32,
    #[serde(default = "default_size")]
    size: u32,
}

#[derive(Debug, Deserialize)]
pub struct PhoneParams {
    phone: String,
    #[serde(default)]
    page: u32,
    #[serde(default = "default_size")]
    size: u32,
}

pub fn app() -> Router {
    app_with_store(Store::new())
}

pub fn app_with_store(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    let students = Router::new()
        .route("/students", get(list_students).post(create_student))
        .route("/students/search", get(search_students))
        .route("/students/search/name", get(search_by_name))
        .route("/students/search/phone", get(search_by_phone))
        .route(
            "/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .with_state(db);
    Router::new().nest("/api", students)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn paged(
    db: &Db,
    filter: Filter,
    sort: SortField,
    descending: bool,
    page: u32,
    size: u32,
) -> Result<Json<Page>, AppError> {
    if size == 0 {
        return Err(AppError::bad_request("Page size must not be less than one"));
    }
    let result = db.read().await.page(&filter, sort, descending, page, size);
    debug!(?filter, page, size, total = result.total_items, "served page");
    Ok(Json(result))
}

async fn list_students(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page>, AppError> {
    let sort = SortField::parse(&params.sort)
        .ok_or_else(|| AppError::bad_request(format!("No property '{}' found", params.sort)))?;
    let descending = params.order.eq_ignore_ascii_case("desc");
    paged(&db, Filter::All, sort, descending, params.page, params.size).await
}

async fn search_students(
    State(db): State<Db>,
    Query(params): Query<KeywordParams>,
) -> Result<Json<Page>, AppError> {
    let filter = Filter::Keyword(params.keyword);
    paged(&db, filter, SortField::Id, false, params.page, params.size).await
}

async fn search_by_name(
    State(db): State<Db>,
    Query(params): Query<NameParams>,
) -> Result<Json<Page>, AppError> {
    let filter = Filter::Name(params.name);
    paged(&db, filter, SortField::Id, false, params.page, params.size).await
}

async fn search_by_phone(
    State(db): State<Db>,
    Query(params): Query<PhoneParams>,
) -> Result<Json<Page>, AppError> {
    let filter = Filter::Phone(params.phone);
    paged(&db, filter, SortField::Id, false, params.page, params.size).await
}

async fn create_student(
    State(db): State<Db>,
    Json(payload): Json<StudentPayload>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let fields = payload.validate()?;
    let student = db.write().await.insert(fields);
    info!(id = student.id, "created student");
    Ok((StatusCode::CREATED, Json(student)))
}

async fn get_student(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Student>, AppError> {
    db.read().await.get(id).cloned().map(Json).ok_or(AppError::NotFound)
}

async fn update_student(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(payload): Json<StudentPayload>,
) -> Result<Json<Student>, AppError> {
    let fields = payload.validate()?;
    let student = db.write().await.replace(id, fields).ok_or(AppError::NotFound)?;
    info!(id, "updated student");
    Ok(Json(student))
}

async fn delete_student(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if db.write().await.soft_delete(id) {
        info!(id, "soft-deleted student");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
