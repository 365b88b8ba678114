//! Fixed-size page slicing shared by every feed.
//!
//! Page numbers come straight from the query string and are never an error:
//! anything that is not an integer selects page 1, numbers below 1 select
//! page 1 and numbers past the end select the last page. An empty result set
//! still has exactly one (empty) page.

use serde::Serialize;

/// Requested page number as sent by the client.
///
/// Missing or non-numeric values read as 1. Values too large for `i64`
/// saturate, which later clamps to the last page.
pub fn parse_page(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return 1;
    };

    match raw.trim().parse::<i64>() {
        Ok(number) => number,
        Err(e) if *e.kind() == std::num::IntErrorKind::PosOverflow => i64::MAX,
        Err(_) => 1,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: usize,
}

impl Paginator {
    /// `per_page` of 0 is treated as 1
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    /// Never less than 1
    pub fn num_pages(&self, count: usize) -> usize {
        count.div_ceil(self.per_page).max(1)
    }

    /// Clamp a requested page number into `1..=num_pages`
    pub fn resolve(&self, count: usize, requested: i64) -> usize {
        let last = self.num_pages(count);
        if requested < 1 {
            1
        } else {
            usize::try_from(requested).map_or(last, |n| n.min(last))
        }
    }

    /// `(offset, limit)` of page `number`
    pub fn window(&self, number: usize) -> (usize, usize) {
        (number.saturating_sub(1) * self.per_page, self.per_page)
    }

    /// Wrap the items of page `number` with its metadata.
    pub fn page<T>(&self, items: Vec<T>, number: usize, count: usize) -> Page<T> {
        let num_pages = self.num_pages(count);
        Page {
            items,
            number,
            num_pages,
            count,
            per_page: self.per_page,
            has_next: number < num_pages,
            has_previous: number > 1,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served
    pub number: usize,
    pub num_pages: usize,
    /// Size of the whole sequence
    pub count: usize,
    pub per_page: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Same steps the feed service takes against the store.
    fn paginate<T: Clone>(paginator: &Paginator, items: &[T], requested: i64) -> Page<T> {
        let count = items.len();
        let number = paginator.resolve(count, requested);
        let (offset, limit) = paginator.window(number);
        let slice = items.iter().skip(offset).take(limit).cloned().collect();
        paginator.page(slice, number, count)
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("3")), 3);
        assert_eq!(parse_page(Some(" 2 ")), 2);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("")), 1);
        assert_eq!(parse_page(Some("1.5")), 1);
        assert_eq!(parse_page(Some("-4")), -4);
        assert_eq!(parse_page(Some("99999999999999999999999")), i64::MAX);
    }

    #[test]
    fn test_thirteen_items_in_pages_of_ten() {
        let items: Vec<u32> = (0..13).collect();
        let paginator = Paginator::new(10);

        let first = paginate(&paginator, &items, 1);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.num_pages, 2);
        assert!(first.has_next);
        assert!(!first.has_previous);

        let second = paginate(&paginator, &items, 2);
        assert_eq!(second.items, vec![10, 11, 12]);
        assert!(!second.has_next);
        assert!(second.has_previous);

        let past_end = paginate(&paginator, &items, 3);
        assert_eq!(past_end, second);
    }

    #[test]
    fn test_out_of_range_requests_clamp() {
        let items: Vec<u32> = (0..25).collect();
        let paginator = Paginator::new(10);

        assert_eq!(paginate(&paginator, &items, 0).number, 1);
        assert_eq!(paginate(&paginator, &items, -7).number, 1);
        assert_eq!(paginate(&paginator, &items, i64::MAX).number, 3);
        assert_eq!(paginate(&paginator, &items, 3).items, vec![20, 21, 22, 23, 24]);
    }

    #[test]
    fn test_empty_sequence_has_one_empty_page() {
        let paginator = Paginator::new(10);
        let page = paginate::<u32>(&paginator, &[], 5);

        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_page() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.num_pages(20), 2);
        assert_eq!(paginator.window(2), (10, 10));
    }
}
