//! The response envelope every endpoint wraps its payload in:
//! `{ "success": bool, "data": T, "message"?: string, "pagination"?: {..} }`.

use serde::{Deserialize, Serialize};

use bazaar_core::{Page, page_count};

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

impl<T> From<&Page<T>> for Pagination {
    fn from(page: &Page<T>) -> Self {
        Self {
            page: page.page,
            limit: page.page_size,
            total: page.total_items,
            pages: page.total_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            pagination: None,
        }
    }

    /// `success = false` becomes an API error carrying `message`.
    pub fn into_data(self, status: u16) -> ClientResult<T> {
        if !self.success {
            return Err(ClientError::api(
                status,
                self.message.unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| ClientError::Decode("envelope is missing `data`".to_string()))
    }
}

impl<T> ApiEnvelope<Vec<T>> {
    pub fn paginated(page: Page<T>) -> Self {
        let pagination = Pagination::from(&page);
        Self {
            success: true,
            data: Some(page.items),
            message: None,
            pagination: Some(pagination),
        }
    }

    /// Unwrap a list response into a [`Page`]. Lists without `pagination`
    /// are treated as a single page holding everything.
    pub fn into_page(self, status: u16) -> ClientResult<Page<T>> {
        let pagination = self.pagination.clone();
        let items = self.into_data(status)?;
        Ok(match pagination {
            Some(p) => Page {
                items,
                page: p.page,
                page_size: p.limit,
                total_items: p.total,
                total_pages: p.pages,
            },
            None => {
                let total = items.len();
                Page {
                    items,
                    page: 1,
                    page_size: total,
                    total_items: total,
                    total_pages: page_count(total, total),
                }
            }
        })
    }
}
