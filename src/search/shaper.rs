//! Result shaping
//!
//! Pagination arithmetic, best-match extraction and suggestion truncation.
//! Records are never re-sorted; engine order is kept as-is.

use super::{Pagination, RankedRecord, SearchResult, Suggestion};

/// Most suggestions returned to the caller
pub const SUGGESTION_LIMIT: usize = 10;

/// Largest skip the engine accepts as a signed 64-bit integer
const MAX_SKIP: u64 = i64::MAX as u64;

/// Normalized page position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: u64,
    pub limit: u64,
}

impl Paging {
    /// Coerce requested values to `page >= 1` and `limit >= 1`. The page is
    /// capped so `skip()` stays within `i64::MAX`.
    pub fn normalize(requested_page: i64, requested_limit: i64) -> Self {
        let limit = requested_limit.max(1).unsigned_abs();
        let last_page = MAX_SKIP / limit + 1;
        Self {
            page: requested_page.max(1).unsigned_abs().min(last_page),
            limit,
        }
    }

    /// Records to skip before this page
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit).min(MAX_SKIP)
    }

    /// `ceil(total / limit)`
    pub fn pages_for(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }

    pub fn is_first(&self) -> bool {
        self.page == 1
    }
}

/// Assemble the response envelope for one fetched page.
///
/// The best match is split off only on the first page; later pages return
/// their slice untouched.
pub fn shape(
    total: u64,
    records: Vec<RankedRecord>,
    requested_page: i64,
    requested_limit: i64,
    distinguish_best_match: bool,
) -> SearchResult {
    let paging = Paging::normalize(requested_page, requested_limit);
    let mut movies = records;

    let best_match = if distinguish_best_match && paging.is_first() && !movies.is_empty() {
        Some(movies.remove(0))
    } else {
        None
    };

    SearchResult {
        best_match,
        movies,
        pagination: Pagination {
            total,
            page: paging.page,
            pages: paging.pages_for(total),
        },
    }
}

/// First [`SUGGESTION_LIMIT`] candidates as title/score pairs
pub fn shape_suggestions(candidates: Vec<RankedRecord>) -> Vec<Suggestion> {
    candidates
        .into_iter()
        .take(SUGGESTION_LIMIT)
        .map(|record| Suggestion {
            title: record.title,
            score: record.relevance_score,
        })
        .collect()
}
