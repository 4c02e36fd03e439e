//! Describes search queries and the pages of results they yield.
use serde::Serialize;

/// Contains the maximal number of items per page.
pub const MAX_PER_PAGE: usize = 100;

/// Contains the default number of items per page.
pub const DEFAULT_PER_PAGE: usize = 20;

/// Describes a search for records.
///
/// * `q` matches if either the title or any creator contains it,
/// * `title` matches if the title contains it,
/// * `creator` matches if any creator contains it.
///
/// All given filters have to match. Matching is case-insensitive and empty filters are ignored.
/// A query without any filter matches all records.
///
/// # Example
/// ```
/// # use opac::store::SearchQuery;
/// let query = SearchQuery::default().with_q("book").with_page(2);
/// assert_eq!(query.matches("Sample BOOK", &[]), true);
/// assert_eq!(query.matches("Sample", &["Bookman, A."]), true);
/// assert_eq!(query.matches("Sample", &["Smith, J."]), false);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Searches in the title and all creators.
    pub q: Option<String>,

    /// Searches in the title.
    pub title: Option<String>,

    /// Searches in all creators.
    pub creator: Option<String>,

    /// The page to deliver, starting at 1.
    pub page: usize,

    /// The number of items per page (1..=100).
    pub per_page: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        SearchQuery {
            q: None,
            title: None,
            creator: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl SearchQuery {
    /// Sets the general search term.
    pub fn with_q(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// Sets the title filter.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the creator filter.
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    /// Sets the page to deliver.
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Sets the number of items per page.
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }

    /// Verifies the pagination settings.
    pub fn check(&self) -> anyhow::Result<()> {
        if self.page < 1 {
            return Err(anyhow::anyhow!("The page must be at least 1 (got {})", self.page));
        }
        if self.per_page < 1 || self.per_page > MAX_PER_PAGE {
            return Err(anyhow::anyhow!(
                "Items per page must be within 1..={} (got {})",
                MAX_PER_PAGE,
                self.per_page
            ));
        }

        Ok(())
    }

    /// Determines if a record with the given title and creators matches this query.
    pub fn matches(&self, title: &str, creators: &[&str]) -> bool {
        let title = title.to_lowercase();
        let creators: Vec<String> = creators
            .iter()
            .map(|creator| creator.to_lowercase())
            .collect();
        let any_creator = |term: &str| creators.iter().any(|creator| creator.contains(term));

        if let Some(q) = filter(&self.q) {
            if !title.contains(q.as_str()) && !any_creator(q.as_str()) {
                return false;
            }
        }
        if let Some(term) = filter(&self.title) {
            if !title.contains(term.as_str()) {
                return false;
            }
        }
        if let Some(term) = filter(&self.creator) {
            if !any_creator(term.as_str()) {
                return false;
            }
        }

        true
    }
}

/// Returns the lowercased filter value unless it is absent or empty.
fn filter(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
}

/// Represents a page of search results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,

    /// The total number of matches.
    pub total_items: usize,

    /// The total number of pages.
    pub total_pages: usize,

    /// The number of this page, starting at 1.
    pub current_page: usize,

    /// The number of items per page.
    pub per_page: usize,
}

impl<T> Page<T> {
    /// Creates a new page, computing the total number of pages.
    ///
    /// # Example
    /// ```
    /// # use opac::store::Page;
    /// let page: Page<()> = Page::new(Vec::new(), 41, 3, 20);
    /// assert_eq!(page.total_pages, 3);
    /// ```
    pub fn new(items: Vec<T>, total_items: usize, current_page: usize, per_page: usize) -> Self {
        Page {
            items,
            total_items,
            total_pages: if per_page == 0 {
                0
            } else {
                (total_items + per_page - 1) / per_page
            },
            current_page,
            per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::store::search::{Page, SearchQuery};

    #[test]
    fn filters_are_combined() {
        let query = SearchQuery::default()
            .with_title("sample")
            .with_creator("doe");
        assert_eq!(query.matches("Sample Book", &["Smith, J.", "Doe, A."]), true);
        assert_eq!(query.matches("Sample Book", &["Smith, J."]), false);
        assert_eq!(query.matches("Other Book", &["Doe, A."]), false);
    }

    #[test]
    fn empty_filters_are_ignored() {
        let query = SearchQuery::default().with_q("").with_title("").with_creator("");
        assert_eq!(query.matches("Anything", &[]), true);
    }

    #[test]
    fn pagination_is_checked() {
        assert_eq!(SearchQuery::default().check().is_ok(), true);
        assert_eq!(SearchQuery::default().with_page(0).check().is_err(), true);
        assert_eq!(SearchQuery::default().with_per_page(0).check().is_err(), true);
        assert_eq!(SearchQuery::default().with_per_page(100).check().is_ok(), true);
        assert_eq!(SearchQuery::default().with_per_page(101).check().is_err(), true);
    }

    #[test]
    fn total_pages_are_rounded_up() {
        assert_eq!(Page::<()>::new(Vec::new(), 0, 1, 20).total_pages, 0);
        assert_eq!(Page::<()>::new(Vec::new(), 20, 1, 20).total_pages, 1);
        assert_eq!(Page::<()>::new(Vec::new(), 21, 1, 20).total_pages, 2);
    }
}
