//! Host-agnostic view state machines for the list, detail and form screens.
//!
//! # Design
//! A view never performs I/O. Every user action that needs the server
//! returns a [`Pending`]: the request to execute plus a [`Ticket`] to hand
//! back with the outcome. Tickets carry a per-slot sequence number; when a
//! newer request has been issued for the same slot, the older response is
//! dropped instead of overwriting fresher state.

mod detail;
mod form;
mod list;

pub use detail::{DetailRequest, DetailState, DetailView};
pub use form::{FormMode, FormRequest, FormView};
pub use list::{ListRequest, ListView};

use thiserror::Error;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Outcome of executing a request: the response, or the reason there was none.
pub type Outcome = Result<HttpResponse, ApiError>;

/// Handle returned with every request a view issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket<K> {
    seq: u64,
    pub kind: K,
}

impl<K> Ticket<K> {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// A request the host must execute, paired with its ticket.
#[derive(Debug, Clone)]
pub struct Pending<K> {
    pub ticket: Ticket<K>,
    pub request: HttpRequest,
}

/// Monotonic sequence for one request slot. Only the most recently issued
/// ticket is current.
#[derive(Debug, Default, Clone)]
pub(crate) struct Sequencer {
    latest: u64,
}

impl Sequencer {
    pub(crate) fn issue<K>(&mut self, kind: K) -> Ticket<K> {
        self.latest += 1;
        Ticket {
            seq: self.latest,
            kind,
        }
    }

    pub(crate) fn is_current<K>(&self, ticket: &Ticket<K>) -> bool {
        ticket.seq == self.latest
    }
}

/// Where the host should go after an action finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    ToList,
}

/// An error shown inline by a view: a fixed message for the failed action
/// plus the typed cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{context}: {source}")]
pub struct ViewError {
    pub context: &'static str,
    pub source: ApiError,
}

impl ViewError {
    pub(crate) fn new(context: &'static str, source: ApiError) -> Self {
        Self { context, source }
    }

    pub fn message(&self) -> &'static str {
        self.context
    }
}
