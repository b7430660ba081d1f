/// Pagination query handling and paged responses
///
/// Listings take `?page=&limit=` query parameters and return the rows for
/// that page alongside the total row count. The total comes from a separate
/// COUNT query run before LIMIT/OFFSET, so it equals the dataset size
/// regardless of which page was requested.
///
/// # Example
///
/// ```
/// use folio_shared::pagination::{PageQuery, Paginated};
///
/// let query = PageQuery { page: Some(2), limit: Some(10) };
/// assert_eq!(query.page(), 2);
/// assert_eq!(query.offset(), 10);
///
/// let page: Paginated<i32> = Paginated::new(vec![1, 2, 3], &query, 25);
/// assert_eq!(page.total, 25);
/// ```
use serde::{Deserialize, Serialize};

/// Default page size when the query omits `limit`
pub const DEFAULT_LIMIT: i64 = 10;

/// Page/limit query parameters
///
/// Both fields are optional in the query string; absent or out-of-range
/// values fall back to page 1 and the default limit.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Effective page number, at least 1
    pub fn page(&self) -> i64 {
        match self.page {
            Some(p) if p >= 1 => p,
            _ => 1,
        }
    }

    /// Effective page size, at least 1
    pub fn limit(&self) -> i64 {
        match self.limit {
            Some(l) if l >= 1 => l,
            _ => DEFAULT_LIMIT,
        }
    }

    /// Rows to skip: `(page - 1) * limit`
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// One page of results with pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,

    pub page: i64,

    pub limit: i64,

    /// Total rows in the dataset, independent of the requested page
    pub total: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, query: &PageQuery, total: i64) -> Self {
        Self {
            data,
            page: query.page(),
            limit: query.limit(),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = PageQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), DEFAULT_LIMIT);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_out_of_range_values_fall_back() {
        let query = PageQuery {
            page: Some(0),
            limit: Some(-5),
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn test_offset_computation() {
        let query = PageQuery {
            page: Some(3),
            limit: Some(20),
        };
        assert_eq!(query.offset(), 40);
    }

    #[test]
    fn test_page_two_of_twenty_five_rows() {
        // 25 rows, limit 10, page 2: rows 10..20, total stays 25.
        let query = PageQuery {
            page: Some(2),
            limit: Some(10),
        };
        assert_eq!(query.offset(), 10);

        let rows: Vec<i64> = (0..25).collect();
        let page: Vec<i64> = rows
            .iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .copied()
            .collect();

        let paginated = Paginated::new(page, &query, rows.len() as i64);
        assert_eq!(paginated.data.len(), 10);
        assert_eq!(paginated.total, 25);
        assert_eq!(paginated.page, 2);
    }

    #[test]
    fn test_last_partial_page() {
        let query = PageQuery {
            page: Some(3),
            limit: Some(10),
        };

        let rows: Vec<i64> = (0..25).collect();
        let page: Vec<i64> = rows
            .iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .copied()
            .collect();

        let paginated = Paginated::new(page, &query, rows.len() as i64);
        assert_eq!(paginated.data.len(), 5);
        assert_eq!(paginated.total, 25);
    }
}
