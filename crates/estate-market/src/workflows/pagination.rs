use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Zero-based page selection, `?page=0&size=10` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate)]
pub struct PageRequest {
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_size")]
    #[validate(range(min = 1, max = 100, message = "size must be between 1 and 100"))]
    pub size: usize,
}

fn default_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self { page, size }
    }

    /// Slices an already ordered result set.
    pub fn slice<T>(&self, items: Vec<T>) -> Page<T> {
        let total_elements = items.len();
        let total_pages = if self.size == 0 {
            0
        } else {
            total_elements.div_ceil(self.size)
        };
        let content = items
            .into_iter()
            .skip(self.page.saturating_mul(self.size))
            .take(self.size)
            .collect();

        Page {
            content,
            page: self.page,
            size: self.size,
            total_elements,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }

    /// Like `map` for projections that can fail.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            content: self.content.into_iter().map(f).collect::<Result<_, _>>()?,
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_requested_window() {
        let page = PageRequest::new(1, 3).slice((1..=8).collect::<Vec<_>>());
        assert_eq!(page.content, vec![4, 5, 6]);
        assert_eq!(page.total_elements, 8);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = PageRequest::new(5, 10).slice(vec!["a", "b"]);
        assert!(page.content.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn rejects_oversized_pages() {
        assert!(PageRequest::default().validate().is_ok());
        assert!(PageRequest::new(0, 0).validate().is_err());
        assert!(PageRequest::new(0, 101).validate().is_err());
    }
}
