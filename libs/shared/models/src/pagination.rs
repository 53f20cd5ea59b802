use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Paginated response envelope shared by all list endpoints.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Slice `items` into the requested page. `path` and `query` come from the
    /// original request and are used to build the next/previous links with the
    /// remaining filters preserved.
    pub fn from_items(
        items: Vec<T>,
        page: usize,
        page_size: usize,
        path: &str,
        query: &str,
    ) -> Page<T> {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let count = items.len();
        let total_pages = count.div_ceil(page_size).max(1);
        let current_page = page.clamp(1, total_pages);

        let results = items
            .into_iter()
            .skip((current_page - 1) * page_size)
            .take(page_size)
            .collect();

        let next = (current_page < total_pages)
            .then(|| page_link(path, query, current_page + 1, page_size));
        let previous = (current_page > 1)
            .then(|| page_link(path, query, current_page - 1, page_size));

        Page {
            count,
            total_pages,
            current_page,
            page_size,
            next,
            previous,
            results,
        }
    }
}

/// Rebuild the request query with `page` and `page_size` replaced.
fn page_link(path: &str, query: &str, page: usize, page_size: usize) -> String {
    let mut params: Vec<String> = query
        .split('&')
        .filter(|p| {
            !p.is_empty() && !p.starts_with("page=") && !p.starts_with("page_size=")
        })
        .map(str::to_string)
        .collect();
    params.push(format!("page={page}"));
    params.push(format!("page_size={page_size}"));
    format!("{}?{}", path, params.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_items_into_pages() {
        let page = Page::from_items((0..45).collect(), 2, 20, "/appointments", "");
        assert_eq!(page.count, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.results, (20..40).collect::<Vec<_>>());
        assert_eq!(
            page.next.as_deref(),
            Some("/appointments?page=3&page_size=20")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("/appointments?page=1&page_size=20")
        );
    }

    #[test]
    fn preserves_filters_in_links() {
        let page = Page::from_items(
            (0..50).collect::<Vec<i32>>(),
            1,
            20,
            "/appointments",
            "status=scheduled&page=1",
        );
        assert_eq!(
            page.next.as_deref(),
            Some("/appointments?status=scheduled&page=2&page_size=20")
        );
        assert!(page.previous.is_none());
    }

    #[test]
    fn empty_set_is_a_single_empty_page() {
        let page = Page::from_items(Vec::<i32>::new(), 1, 20, "/appointments", "");
        assert_eq!(page.count, 0);
        assert_eq!(page.total_pages, 1);
        assert!(page.next.is_none() && page.previous.is_none());
        assert!(page.results.is_empty());
    }
}
