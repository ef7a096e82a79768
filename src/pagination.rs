use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;

pub const DEFAULT_PER_PAGE: i64 = 10;

/// Raw `?page=&per_page=` values, validated by [`PageQuery::validate`].
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 1. Defaults to 1.
    #[param(value_type = Option<i64>, minimum = 1)]
    pub page: Option<String>,
    /// Page size. Defaults to 10.
    #[param(value_type = Option<i64>, minimum = 1)]
    pub per_page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageQuery {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: Some(page.to_string()),
            per_page: Some(per_page.to_string()),
        }
    }

    pub fn validate(&self) -> Result<PageRequest, AppError> {
        let per_page = positive(self.per_page.as_deref(), DEFAULT_PER_PAGE).ok_or_else(|| {
            AppError::InvalidPagination(
                "Invalid per_page value, must be a positive number".to_string(),
            )
        })?;
        let page = positive(self.page.as_deref(), 1).ok_or_else(|| {
            AppError::InvalidPagination("Invalid page value, must be a positive number".to_string())
        })?;
        Ok(PageRequest { page, per_page })
    }
}

fn positive(raw: Option<&str>, default: i64) -> Option<i64> {
    match raw {
        None => Some(default),
        Some(text) => text.trim().parse::<i64>().ok().filter(|n| *n > 0),
    }
}

impl PageRequest {
    /// Row offset, or `None` when the page lies beyond addressable rows.
    pub fn offset(&self) -> Option<i64> {
        (self.page - 1).checked_mul(self.per_page)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageMeta {
    pub current_page: i64,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl PageMeta {
    pub fn new(request: PageRequest, total: i64) -> Self {
        // An empty collection still has one (empty) page.
        let last_page = if total <= 0 {
            1
        } else {
            (total - 1) / request.per_page + 1
        };
        Self {
            current_page: request.page,
            last_page,
            per_page: request.per_page,
            total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageLinks {
    pub first: String,
    pub last: String,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl PageLinks {
    pub fn for_path(path: &str, meta: &PageMeta) -> Self {
        let link = |page: i64| format!("{path}?page={page}&per_page={}", meta.per_page);
        Self {
            first: link(1),
            last: link(meta.last_page),
            prev: (meta.current_page > 1).then(|| link(meta.current_page - 1)),
            next: (meta.current_page < meta.last_page).then(|| link(meta.current_page + 1)),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Page<T> {
    /// Set when the page holds no rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub message: Option<&'static str>,
    pub data: Vec<T>,
    pub meta: PageMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<PageLinks>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, meta: PageMeta, empty_hint: &'static str) -> Self {
        let message = data.is_empty().then_some(empty_hint);
        Self {
            message,
            data,
            meta,
            links: None,
        }
    }

    pub fn with_links(mut self, path: &str) -> Self {
        self.links = Some(PageLinks::for_path(path, &self.meta));
        self
    }
}
