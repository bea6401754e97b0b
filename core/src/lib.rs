//! Sans-IO API client core for the student records service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The host executes the actual
//! HTTP round-trip, which keeps the core deterministic and testable.
//!
//! # Design
//! - `StudentClient` is stateless: it holds only the injected `base_url`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Failures are typed (`ApiError`): not-found, rejected input, server
//!   fault and unreachable server are separate variants.
//! - `view` holds the list/detail/form state machines. They hand requests
//!   to the host tagged with sequence tickets and ignore stale responses.
//! - DTOs are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod types;
pub mod validate;
pub mod view;

pub use client::StudentClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{
    Gender, ListQuery, PageRequest, PageResponse, SortOrder, Student, StudentInput, StudentQuery,
    MAJORS,
};
pub use validate::{Field, FieldError, ValidationErrors};
