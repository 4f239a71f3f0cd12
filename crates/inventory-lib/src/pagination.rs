//! Paged and unpaged result envelopes

use serde::{Deserialize, Serialize};

/// A one-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(number: u32, size: u32) -> Self {
        Self { number, size }
    }

    /// Number of items preceding the page
    pub fn skip(&self) -> u64 {
        u64::from(self.number.saturating_sub(1)) * u64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PagingMetadata {
    pub number: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl PagingMetadata {
    pub fn new(request: PageRequest, total_elements: u64, returned: usize) -> Self {
        let size = u64::from(request.size.max(1));
        let number = u64::from(request.number);
        let total_pages = total_elements.div_ceil(size);
        Self {
            number,
            size,
            total_elements,
            total_pages,
            first: number <= 1,
            last: number >= total_pages,
            empty: returned == 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub metadata: PagingMetadata,
}

/// Result of a search: a bare list when unpaged, an envelope when paged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResult<T> {
    Paged(Page<T>),
    Unpaged(Vec<T>),
}

impl<T> Default for SearchResult<T> {
    fn default() -> Self {
        Self::Unpaged(Vec::new())
    }
}

impl<T> SearchResult<T> {
    pub fn paged(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let metadata = PagingMetadata::new(request, total_elements, content.len());
        Self::Paged(Page { content, metadata })
    }

    pub fn items(&self) -> &[T] {
        match self {
            Self::Paged(page) => &page.content,
            Self::Unpaged(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Paged(page) => page.content,
            Self::Unpaged(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn metadata(&self) -> Option<&PagingMetadata> {
        match self {
            Self::Paged(page) => Some(&page.metadata),
            Self::Unpaged(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SearchResult<U> {
        match self {
            Self::Paged(page) => SearchResult::Paged(Page {
                content: page.content.into_iter().map(f).collect(),
                metadata: page.metadata,
            }),
            Self::Unpaged(items) => SearchResult::Unpaged(items.into_iter().map(f).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_request_skip() {
        assert_eq!(PageRequest::new(1, 10).skip(), 0);
        assert_eq!(PageRequest::new(3, 10).skip(), 20);
    }

    #[test]
    fn test_metadata_middle_page() {
        let meta = PagingMetadata::new(PageRequest::new(2, 3), 8, 3);
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.first);
        assert!(!meta.last);
        assert!(!meta.empty);
    }

    #[test]
    fn test_metadata_empty_result() {
        let meta = PagingMetadata::new(PageRequest::new(1, 20), 0, 0);
        assert_eq!(meta.total_pages, 0);
        assert!(meta.first);
        assert!(meta.last);
        assert!(meta.empty);
    }

    #[test]
    fn test_unpaged_serializes_as_array() {
        let result = SearchResult::Unpaged(vec![1, 2]);
        assert_eq!(serde_json::to_value(&result).unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_paged_serializes_as_envelope() {
        let result = SearchResult::paged(vec!["a"], PageRequest::new(1, 1), 2);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "Content": ["a"],
                "Metadata": {
                    "Number": 1,
                    "Size": 1,
                    "TotalElements": 2,
                    "TotalPages": 2,
                    "First": true,
                    "Last": false,
                    "Empty": false
                }
            })
        );
    }
}
