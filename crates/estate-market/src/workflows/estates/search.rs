use rust_decimal::Decimal;
use serde::Deserialize;

use super::domain::{CategoryId, Estate, EstateStatus, EstateType};
use crate::workflows::error::WorkflowError;
use crate::workflows::pagination::{PageRequest, DEFAULT_PAGE_SIZE};
use crate::workflows::sellers::SellerId;

/// Store-side predicate; `None` leaves a dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstateFilter {
    pub city: Option<String>,
    pub estate_type: Option<EstateType>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub category_id: Option<CategoryId>,
    pub status: Option<EstateStatus>,
    pub seller_id: Option<SellerId>,
}

impl EstateFilter {
    pub fn with_status(status: EstateStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn for_seller(seller_id: SellerId) -> Self {
        Self {
            seller_id: Some(seller_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, estate: &Estate) -> bool {
        self.city
            .as_deref()
            .map_or(true, |city| estate.city.eq_ignore_ascii_case(city.trim()))
            && self.estate_type.map_or(true, |kind| estate.estate_type == kind)
            && self.min_price.map_or(true, |min| estate.price >= min)
            && self.max_price.map_or(true, |max| estate.price <= max)
            && self.category_id.map_or(true, |id| estate.category_id == id)
            && self.status.map_or(true, |status| estate.status == status)
            && self.seller_id.map_or(true, |id| estate.seller_id == id)
    }
}

/// Columns callers may order by. Anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Price,
    Name,
    City,
}

impl SortField {
    pub fn parse(raw: &str) -> Result<Self, WorkflowError> {
        match raw.trim() {
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Ok(SortField::UpdatedAt),
            "price" => Ok(SortField::Price),
            "name" => Ok(SortField::Name),
            "city" => Ok(SortField::City),
            other => Err(WorkflowError::BadRequest(format!(
                "Unsupported sort field '{other}'; expected one of createdAt, updatedAt, price, name, city"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Accepts `ASC` or `DESC` in any case.
    pub fn parse(raw: &str) -> Result<Self, WorkflowError> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if raw.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(WorkflowError::BadRequest(format!(
                "Unsupported sort direction '{raw}'; expected ASC or DESC"
            )))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstateSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl EstateSort {
    pub const NEWEST_FIRST: EstateSort = EstateSort {
        field: SortField::CreatedAt,
        direction: SortDirection::Desc,
    };

    pub const OLDEST_FIRST: EstateSort = EstateSort {
        field: SortField::CreatedAt,
        direction: SortDirection::Asc,
    };

    pub fn parse(sort_by: &str, sort_dir: &str) -> Result<Self, WorkflowError> {
        Ok(Self {
            field: SortField::parse(sort_by)?,
            direction: SortDirection::parse(sort_dir)?,
        })
    }

    /// Sorts in place; ties fall back to id so pages are stable.
    pub fn apply(&self, estates: &mut [Estate]) {
        estates.sort_by(|a, b| {
            let primary = match self.field {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                SortField::Price => a.price.cmp(&b.price),
                SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                SortField::City => a.city.to_lowercase().cmp(&b.city.to_lowercase()),
            };
            let ordering = primary.then_with(|| a.id.cmp(&b.id));
            match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }
}

fn default_sort_by() -> String {
    "createdAt".to_string()
}

fn default_sort_dir() -> String {
    "DESC".to_string()
}

fn default_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Query string of the public listing endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstateSearchQuery {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, rename = "type")]
    pub estate_type: Option<EstateType>,
    #[serde(default)]
    pub min_price: Option<Decimal>,
    #[serde(default)]
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_size")]
    pub size: usize,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_sort_dir")]
    pub sort_dir: String,
}

impl Default for EstateSearchQuery {
    fn default() -> Self {
        Self {
            city: None,
            estate_type: None,
            min_price: None,
            max_price: None,
            category_id: None,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort_by: default_sort_by(),
            sort_dir: default_sort_dir(),
        }
    }
}

impl EstateSearchQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.size)
    }

    pub fn sort(&self) -> Result<EstateSort, WorkflowError> {
        EstateSort::parse(&self.sort_by, &self.sort_dir)
    }

    /// Public searches only ever see approved listings.
    pub fn filter(&self) -> EstateFilter {
        EstateFilter {
            city: self
                .city
                .as_deref()
                .map(str::trim)
                .filter(|city| !city.is_empty())
                .map(str::to_string),
            estate_type: self.estate_type,
            min_price: self.min_price,
            max_price: self.max_price,
            category_id: self.category_id.map(CategoryId),
            status: Some(EstateStatus::Approved),
            seller_id: None,
        }
    }
}
