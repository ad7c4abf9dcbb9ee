pub const QUESTIONS_PER_PAGE: usize = 10;

/// Returns the 1-based `page` of `items`. Pages beyond the end of the list
/// yield an empty vec, never an error.
pub fn paginate<T: Clone>(items: &[T], page: usize) -> Vec<T> {
    let start = page.saturating_sub(1).saturating_mul(QUESTIONS_PER_PAGE);
    if start >= items.len() {
        return Vec::new();
    }
    let end = (start + QUESTIONS_PER_PAGE).min(items.len());
    items[start..end].to_vec()
}

/// Reads the `page` parameter from a raw query string. A missing or
/// non-numeric value falls back to the first page, it is never a client
/// error.
pub fn page_from_query(query: Option<&str>) -> usize {
    query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .find_map(|pair| pair.strip_prefix("page="))
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_ten_items_per_page() {
        let items: Vec<usize> = (0..25).collect();

        assert_eq!(paginate(&items, 1), (0..10).collect::<Vec<_>>());
        assert_eq!(paginate(&items, 2), (10..20).collect::<Vec<_>>());
        assert_eq!(paginate(&items, 3), (20..25).collect::<Vec<_>>());
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let items: Vec<usize> = (0..25).collect();

        assert!(paginate(&items, 4).is_empty());
        assert!(paginate(&items, 1000).is_empty());
        assert!(paginate::<usize>(&[], 1).is_empty());
    }

    #[test]
    fn parses_page_parameter() {
        assert_eq!(page_from_query(Some("page=3")), 3);
        assert_eq!(page_from_query(Some("foo=bar&page=2")), 2);
    }

    #[test]
    fn defaults_to_first_page() {
        assert_eq!(page_from_query(None), 1);
        assert_eq!(page_from_query(Some("")), 1);
        assert_eq!(page_from_query(Some("page=abc")), 1);
        assert_eq!(page_from_query(Some("foo=bar")), 1);
    }
}
