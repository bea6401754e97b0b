use tracing::{info, warn};

use super::{Navigation, Outcome, Pending, Sequencer, Ticket, ViewError};
use crate::client::StudentClient;
use crate::error::ApiError;
use crate::types::Student;

const LOAD_FAILED: &str = "Failed to load student data";
const DELETE_FAILED: &str = "Failed to delete student";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailRequest {
    Load,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Loading,
    Failed(ViewError),
    NotFound,
    Loaded(Student),
}

/// One student's record, with delete.
#[derive(Debug)]
pub struct DetailView {
    client: StudentClient,
    id: i64,
    state: DetailState,
    delete_error: Option<ViewError>,
    awaiting_confirmation: bool,
    loads: Sequencer,
    deletes: Sequencer,
}

impl DetailView {
    pub fn new(client: StudentClient, id: i64) -> Self {
        Self {
            client,
            id,
            state: DetailState::Loading,
            delete_error: None,
            awaiting_confirmation: false,
            loads: Sequencer::default(),
            deletes: Sequencer::default(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn student(&self) -> Option<&Student> {
        match &self.state {
            DetailState::Loaded(s) => Some(s),
            _ => None,
        }
    }

    pub fn delete_error(&self) -> Option<&ViewError> {
        self.delete_error.as_ref()
    }

    pub fn awaiting_confirmation(&self) -> bool {
        self.awaiting_confirmation
    }

    pub fn mount(&mut self) -> Pending<DetailRequest> {
        self.state = DetailState::Loading;
        self.delete_error = None;
        Pending {
            ticket: self.loads.issue(DetailRequest::Load),
            request: self.client.build_get_student(self.id),
        }
    }

    pub fn request_delete(&mut self) {
        self.awaiting_confirmation = true;
    }

    pub fn cancel_delete(&mut self) {
        self.awaiting_confirmation = false;
    }

    pub fn confirm_delete(&mut self) -> Option<Pending<DetailRequest>> {
        if !std::mem::take(&mut self.awaiting_confirmation) {
            return None;
        }
        Some(Pending {
            ticket: self.deletes.issue(DetailRequest::Delete),
            request: self.client.build_delete_student(self.id),
        })
    }

    /// Feed back an outcome. Returns where to navigate, if anywhere.
    pub fn complete(&mut self, ticket: Ticket<DetailRequest>, outcome: Outcome) -> Option<Navigation> {
        match ticket.kind {
            DetailRequest::Load => {
                if !self.loads.is_current(&ticket) {
                    return None;
                }
                self.state = match outcome.and_then(|r| self.client.parse_get_student(r)) {
                    Ok(student) => DetailState::Loaded(student),
                    Err(ApiError::NotFound) => DetailState::NotFound,
                    Err(err) => {
                        warn!(id = self.id, error = %err, "{LOAD_FAILED}");
                        DetailState::Failed(ViewError::new(LOAD_FAILED, err))
                    }
                };
                None
            }
            DetailRequest::Delete => {
                if !self.deletes.is_current(&ticket) {
                    return None;
                }
                match outcome.and_then(|r| self.client.parse_delete_student(r)) {
                    Ok(()) => {
                        info!(id = self.id, "deleted student");
                        self.delete_error = None;
                        Some(Navigation::ToList)
                    }
                    Err(err) => {
                        warn!(id = self.id, error = %err, "{DELETE_FAILED}");
                        self.delete_error = Some(ViewError::new(DELETE_FAILED, err));
                        None
                    }
                }
            }
        }
    }
}
