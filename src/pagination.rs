use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Fixed page size for every list screen.
pub const PER_PAGE: i64 = 10;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page number; anything missing or below 1 means page 1.
    pub page: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p >= 1).unwrap_or(1)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * PER_PAGE
    }
}

/// One entry in the pagination control strip: previous, the numbered pages,
/// next. `url` is None when the step is unavailable (previous on the first
/// page, next on the last).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PageLink {
    pub url: Option<String>,
    pub label: String,
    pub active: bool,
}

/// Paginator payload: the page of items plus enough metadata for the client
/// to render pagination controls, including ready-made page URLs.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: i64,
    pub per_page: i64,
    pub last_page: i64,
    pub total: i64,
    pub next_page_url: Option<String>,
    pub prev_page_url: Option<String>,
    pub links: Vec<PageLink>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, current_page: i64, total: i64, path: &str) -> Self {
        let last_page = last_page(total);
        let page_url = |page: i64| format!("{path}?page={page}");

        let next_page_url = (current_page < last_page).then(|| page_url(current_page + 1));
        let prev_page_url = (current_page > 1).then(|| page_url(current_page - 1));

        let mut links = Vec::with_capacity(last_page as usize + 2);
        links.push(PageLink {
            url: prev_page_url.clone(),
            label: "&laquo; Previous".to_string(),
            active: false,
        });
        for page in 1..=last_page {
            links.push(PageLink {
                url: Some(page_url(page)),
                label: page.to_string(),
                active: page == current_page,
            });
        }
        links.push(PageLink {
            url: next_page_url.clone(),
            label: "Next &raquo;".to_string(),
            active: false,
        });

        Self {
            data,
            current_page,
            per_page: PER_PAGE,
            last_page,
            total,
            next_page_url,
            prev_page_url,
            links,
        }
    }
}

fn last_page(total: i64) -> i64 {
    ((total + PER_PAGE - 1) / PER_PAGE).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_to_first() {
        assert_eq!(PageQuery { page: None }.page(), 1);
        assert_eq!(PageQuery { page: Some(0) }.page(), 1);
        assert_eq!(PageQuery { page: Some(-3) }.page(), 1);
        assert_eq!(PageQuery { page: Some(4) }.page(), 4);
    }

    #[test]
    fn offset_follows_page() {
        assert_eq!(PageQuery { page: Some(1) }.offset(), 0);
        assert_eq!(PageQuery { page: Some(3) }.offset(), 20);
    }

    #[test]
    fn last_page_rounds_up_and_never_drops_below_one() {
        assert_eq!(Page::<()>::new(vec![], 1, 0, "/things").last_page, 1);
        assert_eq!(Page::<()>::new(vec![], 1, 10, "/things").last_page, 1);
        assert_eq!(Page::<()>::new(vec![], 1, 11, "/things").last_page, 2);
        assert_eq!(Page::<()>::new(vec![], 1, 25, "/things").last_page, 3);
    }

    #[test]
    fn page_urls_point_at_neighbours() {
        let first = Page::<()>::new(vec![], 1, 25, "/things");
        assert_eq!(first.prev_page_url, None);
        assert_eq!(first.next_page_url.as_deref(), Some("/things?page=2"));

        let middle = Page::<()>::new(vec![], 2, 25, "/things");
        assert_eq!(middle.prev_page_url.as_deref(), Some("/things?page=1"));
        assert_eq!(middle.next_page_url.as_deref(), Some("/things?page=3"));

        let last = Page::<()>::new(vec![], 3, 25, "/things");
        assert_eq!(last.next_page_url, None);
        assert_eq!(last.prev_page_url.as_deref(), Some("/things?page=2"));
    }

    #[test]
    fn links_wrap_numbered_pages_with_previous_and_next() {
        let page = Page::<()>::new(vec![], 2, 25, "/things");
        assert_eq!(page.links.len(), 5);

        assert_eq!(page.links[0].label, "&laquo; Previous");
        assert_eq!(page.links[0].url.as_deref(), Some("/things?page=1"));
        assert!(!page.links[0].active);

        assert_eq!(page.links[2].label, "2");
        assert!(page.links[2].active);
        assert!(!page.links[1].active);

        assert_eq!(page.links[4].label, "Next &raquo;");
        assert_eq!(page.links[4].url.as_deref(), Some("/things?page=3"));
    }

    #[test]
    fn single_page_has_no_neighbour_urls() {
        let page = Page::<()>::new(vec![], 1, 4, "/things");
        assert_eq!(page.prev_page_url, None);
        assert_eq!(page.next_page_url, None);
        assert_eq!(page.links.len(), 3);
        assert_eq!(page.links[0].url, None);
        assert_eq!(page.links[2].url, None);
    }
}
