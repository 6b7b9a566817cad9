use serde::Serialize;
use serde_json::Value;

use crate::config::ListConfig;

use super::params::RawParams;

/// One page of a listing: `[start_index, end_index)` of the sorted population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub limit: u64,
}

impl PageWindow {
    /// `page` and `limit` are read from their leading base-10 digits, so
    /// `10abc` is 10 and `2.5` is 2. Anything missing, negative, without
    /// leading digits or zero falls back to the configured default; `limit`
    /// is then capped at `max_limit`.
    pub fn from_params(params: &RawParams, config: &ListConfig) -> Self {
        let page = parse_positive(params.single("page")).unwrap_or(config.default_page.max(1));
        let requested = parse_positive(params.single("limit")).unwrap_or(config.default_limit.max(1));

        let limit = match config.max_limit {
            Some(max) if requested > max => {
                if config.debug_logging {
                    tracing::warn!("Limit {} exceeds max {}, capping to max", requested, max);
                }
                max.max(1)
            }
            _ => requested,
        };

        Self { page, limit }
    }

    pub fn start_index(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn end_index(&self) -> u64 {
        self.page.saturating_mul(self.limit)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    let s = raw?.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let digits = &s[..s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len())];
    if digits.is_empty() {
        return None;
    }
    // Only overflow can fail here
    let n = digits.parse::<u64>().unwrap_or(u64::MAX);
    (n > 0).then_some(n)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: u64,
    pub limit: u64,
}

/// Links to the adjacent pages. Serializes as `{}` when there are none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

impl PaginationMeta {
    pub fn new(window: PageWindow, total: u64) -> Self {
        let next = (window.end_index() < total).then(|| PageRef { page: window.page + 1, limit: window.limit });
        let prev = (window.start_index() > 0).then(|| PageRef { page: window.page - 1, limit: window.limit });
        Self { next, prev }
    }
}

/// Outcome of running a list query
#[derive(Debug, Clone)]
pub struct ListResult {
    pub records: Vec<Value>,
    /// Size of the filtered population, independent of the page window
    pub total: u64,
    pub pagination: PaginationMeta,
}
