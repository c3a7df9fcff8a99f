// crates/tqmonitor/src/jobs/state.rs
//
// View state for interactive frontends. Every user-initiated fetch takes a
// ticket for the panel it fills; a response is applied only if its ticket is
// still the latest one issued for that panel.

use std::collections::HashMap;

use tracing::debug;

use crate::error::MonitorError;
use crate::jobs::model::{NormalizedRecord, PageRequest, PageResult, StatsSnapshot, StatusFilter};
use crate::jobs::relation::{ChainView, GroupView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    Jobs,
    Chains,
    Groups,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::Jobs => "jobs",
            View::Chains => "chains",
            View::Groups => "groups",
        }
    }
}

/// Independently refreshed area of a view. The jobs view has two: the page
/// list and the detail of a single looked-up record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    JobList,
    JobDetail,
    Chain,
    Group,
}

impl Panel {
    pub fn view(&self) -> View {
        match self {
            Panel::JobList | Panel::JobDetail => View::Jobs,
            Panel::Chain => View::Chains,
            Panel::Group => View::Groups,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub panel: Panel,
    pub seq: u64,
}

// ----------------------------
// Jobs cursor
// ----------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobsCursor {
    pub status: StatusFilter,
    pub queue: String,
    pub page_index: usize,
    pub total_count: usize,
    page_size: usize,
}

impl JobsCursor {
    pub fn new(page_size: usize) -> Self {
        Self {
            status: StatusFilter::All,
            queue: String::new(),
            page_index: 0,
            total_count: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.status, self.queue.clone(), self.page_index)
    }

    /// New filter: back to the first page.
    pub fn reset(&mut self, status: StatusFilter, queue: impl Into<String>) {
        self.status = status;
        self.queue = queue.into();
        self.page_index = 0;
        self.total_count = 0;
    }

    /// Last valid page index, `None` when there is nothing to show.
    pub fn max_page(&self) -> Option<usize> {
        if self.total_count == 0 {
            return None;
        }
        Some(self.total_count.div_ceil(self.page_size) - 1)
    }

    /// Returns false (and stays put) on the last page.
    pub fn next(&mut self) -> bool {
        match self.max_page() {
            Some(max) if self.page_index < max => {
                self.page_index += 1;
                true
            }
            _ => false,
        }
    }

    /// Returns false (and stays put) on the first page.
    pub fn prev(&mut self) -> bool {
        if self.page_index == 0 {
            return false;
        }
        self.page_index -= 1;
        true
    }
}

// ----------------------------
// App state
// ----------------------------

#[derive(Debug)]
pub struct AppState {
    view: View,
    latest: HashMap<Panel, u64>,
    messages: HashMap<Panel, String>,

    pub jobs: JobsCursor,
    pub stats: Option<StatsSnapshot>,
    pub page: Option<PageResult>,
    pub detail: Option<NormalizedRecord>,
    pub chain: Option<ChainView>,
    pub group: Option<GroupView>,
}

impl AppState {
    pub fn new(page_size: usize) -> Self {
        Self {
            view: View::Dashboard,
            latest: HashMap::new(),
            messages: HashMap::new(),
            jobs: JobsCursor::new(page_size),
            stats: None,
            page: None,
            detail: None,
            chain: None,
            group: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Returns true when the visible view actually changed.
    pub fn switch_view(&mut self, view: View) -> bool {
        if self.view == view {
            return false;
        }
        debug!(from = self.view.as_str(), to = view.as_str(), "view switch");
        self.view = view;
        true
    }

    /// Issues a ticket, superseding every earlier one for the same panel.
    pub fn begin_request(&mut self, panel: Panel) -> RequestTicket {
        let seq = self.latest.entry(panel).or_insert(0);
        *seq += 1;
        RequestTicket { panel, seq: *seq }
    }

    pub fn accepts(&self, ticket: RequestTicket) -> bool {
        self.latest.get(&ticket.panel) == Some(&ticket.seq)
    }

    pub fn message(&self, panel: Panel) -> Option<&str> {
        self.messages.get(&panel).map(String::as_str)
    }

    pub fn apply_stats(&mut self, snapshot: StatsSnapshot) {
        self.stats = Some(snapshot);
    }

    /// A failed page leaves no partial list behind.
    pub fn apply_page(
        &mut self,
        ticket: RequestTicket,
        result: Result<PageResult, MonitorError>,
    ) -> bool {
        let Some(result) = self.settle(ticket, result, "jobs") else {
            return false;
        };
        match result {
            Some(page) => {
                self.jobs.total_count = page.total_count;
                self.jobs.page_index = page.page_index;
                self.page = Some(page);
            }
            None => {
                self.jobs.total_count = 0;
                self.page = None;
            }
        }
        true
    }

    pub fn apply_detail(
        &mut self,
        ticket: RequestTicket,
        result: Result<NormalizedRecord, MonitorError>,
    ) -> bool {
        match self.settle(ticket, result, "job details") {
            Some(record) => {
                self.detail = record;
                true
            }
            None => false,
        }
    }

    pub fn apply_chain(
        &mut self,
        ticket: RequestTicket,
        result: Result<ChainView, MonitorError>,
    ) -> bool {
        match self.settle(ticket, result, "chain") {
            Some(view) => {
                self.chain = view;
                true
            }
            None => false,
        }
    }

    pub fn apply_group(
        &mut self,
        ticket: RequestTicket,
        result: Result<GroupView, MonitorError>,
    ) -> bool {
        match self.settle(ticket, result, "group") {
            Some(view) => {
                self.group = view;
                true
            }
            None => false,
        }
    }

    /// `None` for a stale ticket, otherwise the value (or `None` after
    /// recording the error as the panel's inline message).
    fn settle<T>(
        &mut self,
        ticket: RequestTicket,
        result: Result<T, MonitorError>,
        context: &str,
    ) -> Option<Option<T>> {
        if !self.accepts(ticket) {
            debug!(panel = ?ticket.panel, seq = ticket.seq, "dropping stale response");
            return None;
        }
        match result {
            Ok(v) => {
                self.messages.remove(&ticket.panel);
                Some(Some(v))
            }
            Err(e) => {
                self.messages.insert(ticket.panel, e.inline_message(context));
                Some(None)
            }
        }
    }
}
