use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

use crate::workflows::error::WorkflowError;
use crate::workflows::sellers::SellerId;
use crate::workflows::validation::{invalid, not_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EstateId(pub i64);

impl EstateId {
    pub const UNASSIGNED: EstateId = EstateId(0);
}

impl fmt::Display for EstateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstateType {
    Sale,
    Rent,
}

impl EstateType {
    pub const fn label(self) -> &'static str {
        match self {
            EstateType::Sale => "SALE",
            EstateType::Rent => "RENT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstateStatus {
    WaitingForApproval,
    Approved,
    Rejected,
    Sold,
    Rented,
}

impl EstateStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EstateStatus::WaitingForApproval => "WAITING_FOR_APPROVAL",
            EstateStatus::Approved => "APPROVED",
            EstateStatus::Rejected => "REJECTED",
            EstateStatus::Sold => "SOLD",
            EstateStatus::Rented => "RENTED",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            EstateStatus::Rejected | EstateStatus::Sold | EstateStatus::Rented
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "name must be at most 100 characters")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "description must be at most 500 characters"))]
    pub description: Option<String>,
}

/// Name/value tag attached to a listing, optionally illustrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstateCharacteristic {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Estate {
    pub id: EstateId,
    pub seller_id: SellerId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub estate_type: EstateType,
    pub status: EstateStatus,
    pub city: String,
    pub address: String,
    /// Object storage URLs in display order.
    pub images: Vec<String>,
    pub characteristics: Vec<EstateCharacteristic>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Estate {
    /// Builds a listing awaiting moderation, whatever the caller asked for.
    pub fn submitted(
        seller_id: SellerId,
        request: &CreateEstateRequest,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EstateId::UNASSIGNED,
            seller_id,
            category_id: CategoryId(request.category_id),
            name: request.name.trim().to_string(),
            description: request.description.trim().to_string(),
            price: request.price,
            estate_type: request.estate_type,
            status: EstateStatus::WaitingForApproval,
            city: request.city.trim().to_string(),
            address: request.address.trim().to_string(),
            images: request
                .images
                .iter()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .collect(),
            characteristics: request
                .characteristics
                .iter()
                .map(|item| EstateCharacteristic {
                    name: item.name.trim().to_string(),
                    value: item.value.trim().to_string(),
                    images: item.images.clone(),
                })
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn approve(&mut self, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        self.moderate(EstateStatus::Approved, now)
    }

    pub fn reject(&mut self, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        self.moderate(EstateStatus::Rejected, now)
    }

    pub fn mark_sold(&mut self, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        self.close(EstateType::Sale, EstateStatus::Sold, now)
    }

    pub fn mark_rented(&mut self, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        self.close(EstateType::Rent, EstateStatus::Rented, now)
    }

    /// Every image URL the listing references, characteristics included.
    pub fn all_image_urls(&self) -> Vec<String> {
        self.images
            .iter()
            .chain(self.characteristics.iter().flat_map(|item| item.images.iter()))
            .cloned()
            .collect()
    }

    fn moderate(&mut self, next: EstateStatus, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        if self.status != EstateStatus::WaitingForApproval {
            return Err(WorkflowError::InvalidStatus(format!(
                "Estate {} is not waiting for approval (current status: {})",
                self.id,
                self.status.label()
            )));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    fn close(
        &mut self,
        required: EstateType,
        next: EstateStatus,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        if self.status != EstateStatus::Approved {
            return Err(WorkflowError::InvalidStatus(format!(
                "Only approved estates can be marked as {} (current status: {})",
                next.label(),
                self.status.label()
            )));
        }
        if self.estate_type != required {
            return Err(WorkflowError::InvalidType(format!(
                "Only {} estates can be marked as {}",
                required.label(),
                next.label()
            )));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CharacteristicRequest {
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "value must be between 1 and 100 characters"))]
    pub value: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEstateRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "name must be at most 255 characters")
    )]
    pub name: String,
    #[validate(length(min = 10, message = "description must be at least 10 characters"))]
    pub description: String,
    #[validate(custom(function = "positive_price"))]
    pub price: Decimal,
    #[serde(rename = "type")]
    pub estate_type: EstateType,
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "city must be at most 100 characters")
    )]
    pub city: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "address must be at most 255 characters")
    )]
    pub address: String,
    pub category_id: i64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub characteristics: Vec<CharacteristicRequest>,
}

fn positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price > Decimal::ZERO {
        Ok(())
    } else {
        Err(invalid("positive", "price must be greater than 0"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstateSellerSummary {
    pub id: SellerId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub rating: Decimal,
}

/// Listing joined with its category and seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstateView {
    pub id: EstateId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(rename = "type")]
    pub estate_type: EstateType,
    pub status: EstateStatus,
    pub city: String,
    pub address: String,
    pub category: CategorySummary,
    pub seller: EstateSellerSummary,
    pub images: Vec<String>,
    pub characteristics: Vec<EstateCharacteristic>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::validation::validate_request;

    fn request(estate_type: EstateType) -> CreateEstateRequest {
        CreateEstateRequest {
            name: "Harbour flat".into(),
            description: "Two bedrooms facing the river".into(),
            price: Decimal::new(250_000, 0),
            estate_type,
            city: "Porto".into(),
            address: "Cais da Ribeira 5".into(),
            category_id: 1,
            images: vec!["https://img/1.jpg".into(), " ".into()],
            characteristics: vec![CharacteristicRequest {
                name: "rooms".into(),
                value: "2".into(),
                images: vec!["https://img/rooms.jpg".into()],
            }],
        }
    }

    fn estate(estate_type: EstateType) -> Estate {
        Estate::submitted(SellerId(1), &request(estate_type), Utc::now())
    }

    #[test]
    fn submitted_estate_waits_for_approval() {
        let estate = estate(EstateType::Sale);
        assert_eq!(estate.status, EstateStatus::WaitingForApproval);
        assert_eq!(estate.images, vec!["https://img/1.jpg".to_string()]);
        assert_eq!(estate.all_image_urls().len(), 2);
    }

    #[test]
    fn moderation_only_from_waiting() {
        let now = Utc::now();
        let mut approved = estate(EstateType::Sale);
        approved.approve(now).expect("waiting estate approves");
        assert_eq!(approved.status, EstateStatus::Approved);
        assert!(matches!(approved.reject(now), Err(WorkflowError::InvalidStatus(_))));
        assert!(matches!(approved.approve(now), Err(WorkflowError::InvalidStatus(_))));

        let mut rejected = estate(EstateType::Rent);
        rejected.reject(now).expect("waiting estate rejects");
        assert!(rejected.status.is_terminal());
        assert!(matches!(rejected.approve(now), Err(WorkflowError::InvalidStatus(_))));
    }

    #[test]
    fn sold_requires_approved_sale() {
        let now = Utc::now();
        let mut waiting = estate(EstateType::Sale);
        assert!(matches!(waiting.mark_sold(now), Err(WorkflowError::InvalidStatus(_))));

        let mut rent = estate(EstateType::Rent);
        rent.approve(now).expect("approve");
        assert!(matches!(rent.mark_sold(now), Err(WorkflowError::InvalidType(_))));
        rent.mark_rented(now).expect("approved rental can be rented");
        assert_eq!(rent.status, EstateStatus::Rented);
        assert!(matches!(rent.mark_rented(now), Err(WorkflowError::InvalidStatus(_))));

        waiting.approve(now).expect("approve");
        assert!(matches!(waiting.mark_rented(now), Err(WorkflowError::InvalidType(_))));
        waiting.mark_sold(now).expect("approved sale can be sold");
        assert_eq!(waiting.status, EstateStatus::Sold);
    }

    #[test]
    fn create_request_bounds() {
        let mut bad = request(EstateType::Sale);
        bad.price = Decimal::ZERO;
        bad.description = "short".into();
        bad.characteristics[0].name = "n".repeat(101);
        match validate_request(&bad) {
            Err(WorkflowError::Validation(fields)) => {
                assert!(fields.get("price").is_some());
                assert!(fields.get("description").is_some());
                assert!(fields.get("characteristics[0].name").is_some());
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
