//! Async facade over the sans-IO core: build, execute, parse.

use student_core::view::Outcome;
use student_core::{
    ApiError, HttpRequest, ListQuery, PageRequest, PageResponse, Student, StudentClient,
    StudentInput,
};

use crate::config::Config;
use crate::executor::ReqwestExecutor;

#[derive(Debug, Clone)]
pub struct StudentApi {
    client: StudentClient,
    executor: ReqwestExecutor,
}

impl StudentApi {
    pub fn new(client: StudentClient, executor: ReqwestExecutor) -> Self {
        Self { client, executor }
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Ok(Self::new(
            StudentClient::new(&config.base_url),
            ReqwestExecutor::new(config.timeout)?,
        ))
    }

    pub fn client(&self) -> &StudentClient {
        &self.client
    }

    /// Run a request built elsewhere, e.g. one handed out by a view.
    pub async fn execute(&self, request: HttpRequest) -> Outcome {
        self.executor.execute(request).await
    }

    pub async fn list_students(&self, query: &ListQuery) -> Result<PageResponse<Student>, ApiError> {
        let response = self.execute(self.client.build_list_students(query)).await?;
        self.client.parse_list_students(response)
    }

    pub async fn get_student(&self, id: i64) -> Result<Student, ApiError> {
        let response = self.execute(self.client.build_get_student(id)).await?;
        self.client.parse_get_student(response)
    }

    pub async fn create_student(&self, input: &StudentInput) -> Result<Student, ApiError> {
        let request = self.client.build_create_student(input)?;
        let response = self.execute(request).await?;
        self.client.parse_create_student(response)
    }

    pub async fn update_student(&self, id: i64, input: &StudentInput) -> Result<Student, ApiError> {
        let request = self.client.build_update_student(id, input)?;
        let response = self.execute(request).await?;
        self.client.parse_update_student(response)
    }

    pub async fn delete_student(&self, id: i64) -> Result<(), ApiError> {
        let response = self.execute(self.client.build_delete_student(id)).await?;
        self.client.parse_delete_student(response)
    }

    pub async fn search_students(
        &self,
        keyword: &str,
        page: PageRequest,
    ) -> Result<PageResponse<Student>, ApiError> {
        let response = self
            .execute(self.client.build_search_students(keyword, page))
            .await?;
        self.client.parse_search_students(response)
    }

    pub async fn search_students_by_name(
        &self,
        name: &str,
        page: PageRequest,
    ) -> Result<PageResponse<Student>, ApiError> {
        let response = self
            .execute(self.client.build_search_students_by_name(name, page))
            .await?;
        self.client.parse_search_students(response)
    }

    pub async fn search_students_by_phone(
        &self,
        phone: &str,
        page: PageRequest,
    ) -> Result<PageResponse<Student>, ApiError> {
        let response = self
            .execute(self.client.build_search_students_by_phone(phone, page))
            .await?;
        self.client.parse_search_students(response)
    }
}
