//! POI repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::Poi;

/// Category/keyword POI search, paginated.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PoiQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    10
}

impl PoiQuery {
    pub fn by_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            keyword: None,
            page: 0,
            page_size: default_page_size(),
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PoiPage {
    pub items: Vec<Poi>,
    pub page: usize,
    pub total: usize,
}

/// Repository used to resolve step alternatives and manual-add candidates.
#[async_trait]
pub trait PoiRepository: Send + Sync {
    async fn search_pois(&self, query: &PoiQuery) -> RepositoryResult<PoiPage>;
}
