use serde::{Deserialize, Serialize};

use crate::products::repo::Product;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Listing query parameters. Kept as raw strings so that absent or
/// non-numeric values fall back to the defaults instead of rejecting.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    pub fn normalize(&self) -> (i64, i64) {
        let page = parse_positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(self.limit.as_deref()).unwrap_or(DEFAULT_PAGE_SIZE);
        (page, limit)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.parse::<i64>().ok()).filter(|&v| v >= 1)
}

/// First row index for a page. Saturates so absurdly large page numbers
/// stay a valid OFFSET instead of overflowing.
pub fn offset(page: i64, limit: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(limit)
}

/// Pagination metadata returned alongside listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
}

impl PageMeta {
    pub fn new(page: i64, limit: i64, total_items: i64) -> Self {
        Self {
            current_page: page,
            total_pages: (total_items + limit - 1) / limit,
            total_items,
            items_per_page: limit,
        }
    }
}

/// Request body for product creation. Fields are optional so missing
/// ones surface as a 400 with a stable message rather than a body rejection.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub stock: Option<i32>,
}

/// Partial update body.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub stock: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub message: String,
    pub data: Vec<Product>,
    pub pagination: PageMeta,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub message: String,
    pub data: Product,
}
