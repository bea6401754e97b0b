use tracing::{debug, info, warn};

use super::{Outcome, Pending, Sequencer, Ticket, ViewError};
use crate::client::StudentClient;
use crate::types::{ListQuery, PageRequest, PageResponse, SortOrder, Student, StudentQuery, DEFAULT_SORT};

const LOAD_FAILED: &str = "Failed to load students";
const SEARCH_FAILED: &str = "Search failed";
const DELETE_FAILED: &str = "Failed to delete student";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRequest {
    Fetch { page: u32 },
    Delete { id: i64 },
}

/// Paged list of students with keyword search and delete.
#[derive(Debug)]
pub struct ListView {
    client: StudentClient,
    page_size: u32,
    sort: String,
    order: SortOrder,
    query: StudentQuery,
    students: Vec<Student>,
    current_page: u32,
    total_pages: u32,
    total_items: u64,
    loading: bool,
    error: Option<ViewError>,
    awaiting_confirmation: Option<i64>,
    fetches: Sequencer,
    deletes: Sequencer,
}

impl ListView {
    pub fn new(client: StudentClient, page_size: u32) -> Self {
        Self {
            client,
            page_size: page_size.max(1),
            sort: DEFAULT_SORT.to_string(),
            order: SortOrder::Asc,
            query: StudentQuery::All,
            students: Vec::new(),
            current_page: 0,
            total_pages: 0,
            total_items: 0,
            loading: true,
            error: None,
            awaiting_confirmation: None,
            fetches: Sequencer::default(),
            deletes: Sequencer::default(),
        }
    }

    /// Ordering of the unfiltered listing. Searches use the server's order.
    pub fn with_order(mut self, sort: impl Into<String>, order: SortOrder) -> Self {
        self.sort = sort.into();
        self.order = order;
        self
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_searching(&self) -> bool {
        self.query.is_search()
    }

    pub fn query(&self) -> &StudentQuery {
        &self.query
    }

    pub fn error(&self) -> Option<&ViewError> {
        self.error.as_ref()
    }

    pub fn awaiting_confirmation(&self) -> Option<i64> {
        self.awaiting_confirmation
    }

    /// Initial load: the unfiltered first page.
    pub fn mount(&mut self) -> Pending<ListRequest> {
        self.query = StudentQuery::All;
        self.fetch(0)
    }

    /// Keyword search across name, phone and email. A blank keyword leaves
    /// search mode and reloads the unfiltered list.
    pub fn submit_search(&mut self, keyword: &str) -> Pending<ListRequest> {
        self.search_by(StudentQuery::Keyword(keyword.to_string()))
    }

    pub fn search_by(&mut self, query: StudentQuery) -> Pending<ListRequest> {
        self.query = query.normalized();
        self.fetch(0)
    }

    /// Fetch `page` of whatever is currently shown, keeping search mode.
    pub fn go_to_page(&mut self, page: u32) -> Pending<ListRequest> {
        self.fetch(page)
    }

    pub fn next_page(&mut self) -> Option<Pending<ListRequest>> {
        (self.current_page + 1 < self.total_pages).then(|| self.fetch(self.current_page + 1))
    }

    pub fn previous_page(&mut self) -> Option<Pending<ListRequest>> {
        (self.current_page > 0).then(|| self.fetch(self.current_page - 1))
    }

    pub fn reload(&mut self) -> Pending<ListRequest> {
        self.fetch(self.current_page)
    }

    fn fetch(&mut self, page: u32) -> Pending<ListRequest> {
        self.loading = true;
        let ticket = self.fetches.issue(ListRequest::Fetch { page });
        let page_request = PageRequest::new(page, self.page_size);
        let request = match &self.query {
            StudentQuery::All => self.client.build_list_students(&ListQuery {
                page: page_request,
                sort: self.sort.clone(),
                order: self.order,
            }),
            query => self.client.build_query(query, page_request),
        };
        Pending { ticket, request }
    }

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: i64) {
        self.awaiting_confirmation = Some(id);
    }

    pub fn cancel_delete(&mut self) {
        self.awaiting_confirmation = None;
    }

    /// The user confirmed: issue the delete for the pending id, if any.
    pub fn confirm_delete(&mut self) -> Option<Pending<ListRequest>> {
        let id = self.awaiting_confirmation.take()?;
        let ticket = self.deletes.issue(ListRequest::Delete { id });
        let request = self.client.build_delete_student(id);
        Some(Pending { ticket, request })
    }

    /// Feed back the outcome of a request this view issued. May return a
    /// follow-up request (the refresh after a delete, or a step back when
    /// the current page no longer exists).
    pub fn complete(
        &mut self,
        ticket: Ticket<ListRequest>,
        outcome: Outcome,
    ) -> Option<Pending<ListRequest>> {
        match ticket.kind {
            ListRequest::Fetch { page } => {
                if !self.fetches.is_current(&ticket) {
                    debug!(seq = ticket.seq(), page, "discarding superseded page response");
                    return None;
                }
                self.loading = false;
                let result = outcome.and_then(|response| self.client.parse_page(response));
                match result {
                    Ok(envelope) => self.apply_page(envelope),
                    Err(err) => {
                        let context = if self.is_searching() {
                            SEARCH_FAILED
                        } else {
                            LOAD_FAILED
                        };
                        warn!(error = %err, page, "{context}");
                        self.error = Some(ViewError::new(context, err));
                        None
                    }
                }
            }
            ListRequest::Delete { id } => {
                if !self.deletes.is_current(&ticket) {
                    debug!(seq = ticket.seq(), id, "discarding superseded delete response");
                    return None;
                }
                let result = outcome.and_then(|response| self.client.parse_delete_student(response));
                match result {
                    Ok(()) => {
                        info!(id, "deleted student");
                        Some(self.fetch(self.current_page))
                    }
                    Err(err) => {
                        warn!(error = %err, id, "{DELETE_FAILED}");
                        self.error = Some(ViewError::new(DELETE_FAILED, err));
                        None
                    }
                }
            }
        }
    }

    fn apply_page(&mut self, envelope: PageResponse<Student>) -> Option<Pending<ListRequest>> {
        self.error = None;
        let past_end = envelope.items.is_empty()
            && envelope.total_pages > 0
            && envelope.current_page >= envelope.total_pages;
        self.students = envelope.items;
        self.current_page = envelope.current_page;
        self.total_pages = envelope.total_pages;
        self.total_items = envelope.total_items;
        if past_end {
            debug!(
                page = self.current_page,
                total_pages = self.total_pages,
                "page no longer exists, stepping back"
            );
            return Some(self.fetch(self.total_pages - 1));
        }
        None
    }
}
