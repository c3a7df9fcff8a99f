// crates/tqmonitor/src/jobs/browser.rs
//
// One "page of jobs" over two backend shapes:
//  - successful/failed jobs are only exposed as full id lists, so the page is
//    cut client-side and details are fetched per id
//  - pending jobs live in a queue the backend paginates itself

use std::ops::Range;

use futures::future::try_join_all;
use tracing::info;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::MonitorError;
use crate::jobs::detail::DetailResolver;
use crate::jobs::model::{JobRecord, PageRequest, PageResult, StatusFilter};
use crate::jobs::normalize::normalize_job;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    MergeThenPaginate,
    NativeOffset,
}

impl Strategy {
    pub fn for_status(status: StatusFilter) -> Self {
        match status {
            StatusFilter::All | StatusFilter::Successful | StatusFilter::Failed => {
                Strategy::MergeThenPaginate
            }
            StatusFilter::Pending => Strategy::NativeOffset,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobBrowser {
    resolver: DetailResolver,
    page_size: usize,
    default_queue: String,
}

impl JobBrowser {
    pub fn new(client: ApiClient, cfg: &Config) -> Self {
        Self {
            resolver: DetailResolver::new(client),
            page_size: cfg.page_size.max(1),
            default_queue: cfg.default_queue.clone(),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub async fn fetch_page(&self, req: &PageRequest) -> Result<PageResult, MonitorError> {
        let strategy = Strategy::for_status(req.status);
        let (records, total_count) = match strategy {
            Strategy::MergeThenPaginate => self.merged_page(req).await?,
            Strategy::NativeOffset => self.queue_page(req).await?,
        };

        info!(
            status = req.status.as_str(),
            strategy = ?strategy,
            page = req.page_index,
            records = records.len(),
            total = total_count,
            "loaded jobs page"
        );

        Ok(PageResult {
            records,
            total_count,
            page_index: req.page_index,
            page_size: self.page_size,
        })
    }

    /// Merged id list for the filter: successful ids before failed ids, each
    /// in backend order, whichever request finishes first.
    pub async fn merged_ids(&self, status: StatusFilter) -> Result<Vec<String>, MonitorError> {
        let client = self.resolver.client();
        match status {
            StatusFilter::All => {
                let (mut successful, failed) =
                    tokio::try_join!(client.job_ids("successful"), client.job_ids("failed"))?;
                successful.extend(failed);
                Ok(successful)
            }
            StatusFilter::Successful | StatusFilter::Failed => {
                client.job_ids(status.as_str()).await
            }
            StatusFilter::Pending => Ok(Vec::new()),
        }
    }

    async fn merged_page(
        &self,
        req: &PageRequest,
    ) -> Result<(Vec<JobRecord>, usize), MonitorError> {
        // 1) full id list(s)
        let ids = self.merged_ids(req.status).await?;
        let total = ids.len();

        // 2) cut the page window
        let window = page_window(total, req.page_index, self.page_size);
        let page_ids = &ids[window];

        // 3) details for the window, concurrently, kept in id order.
        //    The first failure aborts the whole page.
        let records = try_join_all(page_ids.iter().map(|id| self.resolver.fetch_job(id))).await?;

        Ok((records, total))
    }

    async fn queue_page(
        &self,
        req: &PageRequest,
    ) -> Result<(Vec<JobRecord>, usize), MonitorError> {
        let queue = if req.queue.trim().is_empty() {
            self.default_queue.as_str()
        } else {
            req.queue.trim()
        };
        let offset = req.page_index.saturating_mul(self.page_size);

        let resp = self
            .resolver
            .client()
            .pending_page(queue, offset, self.page_size)
            .await?;

        let records = resp
            .jobs
            .unwrap_or_default()
            .iter()
            .map(normalize_job)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((records, usize::try_from(resp.total).unwrap_or(usize::MAX)))
    }
}

/// `[page * size, page * size + size)` clamped to `total`; empty past the end.
pub fn page_window(total: usize, page_index: usize, page_size: usize) -> Range<usize> {
    let start = page_index.saturating_mul(page_size);
    if start >= total {
        return total..total;
    }
    let end = start.saturating_add(page_size).min(total);
    start..end
}
