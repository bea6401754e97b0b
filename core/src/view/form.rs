use tracing::{info, warn};

use super::{Navigation, Outcome, Pending, Sequencer, Ticket, ViewError};
use crate::client::StudentClient;
use crate::error::ApiError;
use crate::types::StudentInput;
use crate::validate::{Field, FieldError};

const LOAD_FAILED: &str = "Failed to load student data";
const SAVE_FAILED: &str = "Failed to save student data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRequest {
    Load,
    Save,
}

/// Create/edit form bound to a local draft.
#[derive(Debug)]
pub struct FormView {
    client: StudentClient,
    mode: FormMode,
    draft: StudentInput,
    loading: bool,
    error: Option<ViewError>,
    loads: Sequencer,
    saves: Sequencer,
}

impl FormView {
    pub fn create(client: StudentClient) -> Self {
        Self::with_mode(client, FormMode::Create)
    }

    pub fn edit(client: StudentClient, id: i64) -> Self {
        Self::with_mode(client, FormMode::Edit(id))
    }

    fn with_mode(client: StudentClient, mode: FormMode) -> Self {
        Self {
            client,
            mode,
            draft: StudentInput::default(),
            loading: false,
            error: None,
            loads: Sequencer::default(),
            saves: Sequencer::default(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn draft(&self) -> &StudentInput {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut StudentInput {
        &mut self.draft
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&ViewError> {
        self.error.as_ref()
    }

    /// Edit mode fetches the existing record; create mode has nothing to load.
    pub fn mount(&mut self) -> Option<Pending<FormRequest>> {
        let FormMode::Edit(id) = self.mode else {
            return None;
        };
        self.loading = true;
        self.error = None;
        Some(Pending {
            ticket: self.loads.issue(FormRequest::Load),
            request: self.client.build_get_student(id),
        })
    }

    pub fn set_field(&mut self, field: Field, value: &str) -> Result<(), FieldError> {
        self.draft.set_field(field, value)
    }

    /// Validate the draft and build the create or update request. On local
    /// validation failure the error is recorded and nothing is sent.
    pub fn submit(&mut self) -> Option<Pending<FormRequest>> {
        self.error = None;
        let built = self
            .draft
            .validate()
            .map_err(ApiError::from)
            .and_then(|()| match self.mode {
                FormMode::Create => self.client.build_create_student(&self.draft),
                FormMode::Edit(id) => self.client.build_update_student(id, &self.draft),
            });
        match built {
            Ok(request) => {
                self.loading = true;
                Some(Pending {
                    ticket: self.saves.issue(FormRequest::Save),
                    request,
                })
            }
            Err(err) => {
                warn!(error = %err, "draft rejected before submit");
                self.error = Some(ViewError::new(SAVE_FAILED, err));
                None
            }
        }
    }

    pub fn complete(&mut self, ticket: Ticket<FormRequest>, outcome: Outcome) -> Option<Navigation> {
        match ticket.kind {
            FormRequest::Load => {
                if !self.loads.is_current(&ticket) {
                    return None;
                }
                self.loading = false;
                match outcome.and_then(|r| self.client.parse_get_student(r)) {
                    Ok(student) => {
                        self.draft = student.to_input();
                        self.error = None;
                    }
                    Err(err) => {
                        warn!(error = %err, "{LOAD_FAILED}");
                        self.error = Some(ViewError::new(LOAD_FAILED, err));
                    }
                }
                None
            }
            FormRequest::Save => {
                if !self.saves.is_current(&ticket) {
                    return None;
                }
                self.loading = false;
                let result = outcome.and_then(|r| match self.mode {
                    FormMode::Create => self.client.parse_create_student(r),
                    FormMode::Edit(_) => self.client.parse_update_student(r),
                });
                match result {
                    Ok(saved) => {
                        info!(id = saved.id, mode = ?self.mode, "saved student");
                        Some(Navigation::ToList)
                    }
                    Err(err) => {
                        warn!(error = %err, "{SAVE_FAILED}");
                        self.error = Some(ViewError::new(SAVE_FAILED, err));
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, HttpResponse};
    use crate::types::{Gender, MAJORS};
    use crate::view::test_support::{ok, record};

    fn client() -> StudentClient {
        StudentClient::new("http://h/api")
    }

    fn fill(form: &mut FormView) {
        form.set_field(Field::Name, "张三").unwrap();
        form.set_field(Field::Phone, "1234567890").unwrap();
    }

    #[test]
    fn create_defaults() {
        let mut form = FormView::create(client());
        assert!(form.mount().is_none());
        let draft = form.draft();
        assert_eq!(draft.gender, Gender::Male);
        assert_eq!(draft.age, 18);
        assert_eq!(draft.major, MAJORS[0]);
    }

    #[test]
    fn create_submits_post_and_navigates() {
        let mut form = FormView::create(client());
        fill(&mut form);
        let p = form.submit().unwrap();
        assert_eq!(p.request.method, HttpMethod::Post);
        assert!(form.is_loading());
        let nav = form.complete(p.ticket, Ok(HttpResponse::new(201, record(1, "张三"))));
        assert_eq!(nav, Some(Navigation::ToList));
    }

    #[test]
    fn invalid_draft_is_not_sent() {
        let mut form = FormView::create(client());
        assert!(form.submit().is_none());
        let err = form.error().unwrap();
        assert_eq!(err.message(), "Failed to save student data");
        assert!(matches!(err.source, ApiError::InvalidDraft(_)));
    }

    #[test]
    fn edit_loads_then_puts() {
        let mut form = FormView::edit(client(), 3);
        let load = form.mount().unwrap();
        assert_eq!(load.request.url, "http://h/api/students/3");
        form.complete(load.ticket, ok(record(3, "李四")));
        assert_eq!(form.draft().name, "李四");

        form.set_field(Field::Age, "30").unwrap();
        let save = form.submit().unwrap();
        assert_eq!(save.request.method, HttpMethod::Put);
        assert_eq!(save.request.url, "http://h/api/students/3");
        let body: serde_json::Value =
            serde_json::from_str(save.request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["age"], 30);
    }

    #[test]
    fn server_failure_keeps_draft() {
        let mut form = FormView::create(client());
        fill(&mut form);
        form.set_field(Field::Remark, "备注").unwrap();
        let p = form.submit().unwrap();
        let nav = form.complete(
            p.ticket,
            Ok(HttpResponse::new(400, r#"{"message":"Phone is required"}"#)),
        );
        assert!(nav.is_none());
        assert_eq!(form.draft().remark.as_deref(), Some("备注"));
        assert_eq!(form.error().unwrap().source.status(), Some(400));
        assert!(!form.is_loading());
    }

    #[test]
    fn stale_load_does_not_clobber_edits() {
        let mut form = FormView::edit(client(), 3);
        let first = form.mount().unwrap();
        let second = form.mount().unwrap();
        form.complete(second.ticket, ok(record(3, "新")));
        form.set_field(Field::Name, "编辑中").unwrap();
        form.complete(first.ticket, ok(record(3, "旧")));
        assert_eq!(form.draft().name, "编辑中");
    }

    #[test]
    fn successful_reload_clears_load_error() {
        let mut form = FormView::edit(client(), 3);
        let p = form.mount().unwrap();
        form.complete(p.ticket, Ok(HttpResponse::new(500, "")));
        assert_eq!(form.error().unwrap().message(), "Failed to load student data");

        let p = form.mount().unwrap();
        assert!(form.error().is_none());
        form.complete(p.ticket, ok(record(3, "x")));
        assert_eq!(form.draft().name, "x");
        assert!(form.error().is_none());
    }
}
