use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::workflows::error::WorkflowError;
use crate::workflows::identity::{User, UserId};
use crate::workflows::validation::not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SellerId(pub i64);

impl SellerId {
    pub const UNASSIGNED: SellerId = SellerId(0);
}

impl fmt::Display for SellerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SellerStatus {
    Pending,
    Approved,
    Rejected,
}

impl SellerStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SellerStatus::Pending => "PENDING",
            SellerStatus::Approved => "APPROVED",
            SellerStatus::Rejected => "REJECTED",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SellerApplication {
    #[validate(
        custom(function = "not_blank"),
        length(min = 2, max = 100, message = "city must be between 2 and 100 characters")
    )]
    pub city: String,
    #[validate(
        custom(function = "not_blank"),
        length(min = 5, max = 200, message = "address must be between 5 and 200 characters")
    )]
    pub address: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "companyName must be at most 100 characters"))]
    pub company_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50, message = "licenseNumber must be at most 50 characters"))]
    pub license_number: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500, message = "bio must be at most 500 characters"))]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifySellerRequest {
    pub approved: bool,
    #[serde(default)]
    #[validate(length(max = 500, message = "notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Seller {
    pub id: SellerId,
    pub user_id: UserId,
    pub city: String,
    pub address: String,
    pub company_name: Option<String>,
    pub license_number: Option<String>,
    pub bio: Option<String>,
    pub status: SellerStatus,
    pub rating: Decimal,
    pub verified_at: Option<DateTime<Utc>>,
    pub verification_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Seller {
    pub fn default_rating() -> Decimal {
        Decimal::new(50, 1)
    }

    /// First application for a user; awaits review.
    pub fn applied(user_id: UserId, application: &SellerApplication, now: DateTime<Utc>) -> Self {
        let mut seller = Self {
            id: SellerId::UNASSIGNED,
            user_id,
            city: String::new(),
            address: String::new(),
            company_name: None,
            license_number: None,
            bio: None,
            status: SellerStatus::Pending,
            rating: Self::default_rating(),
            verified_at: None,
            verification_notes: None,
            created_at: now,
            updated_at: now,
        };
        seller.fill_profile(application);
        seller
    }

    /// Re-application after a rejection. Pending and approved profiles refuse.
    pub fn reapply(
        &mut self,
        application: &SellerApplication,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        match self.status {
            SellerStatus::Pending => Err(WorkflowError::Conflict(
                "You have already applied to become a seller".to_string(),
            )),
            SellerStatus::Approved => Err(WorkflowError::Conflict(
                "You are already an approved seller".to_string(),
            )),
            SellerStatus::Rejected => {
                self.fill_profile(application);
                self.status = SellerStatus::Pending;
                self.verified_at = None;
                self.verification_notes = None;
                self.updated_at = now;
                Ok(())
            }
        }
    }

    /// Admin decision on a pending application. Notes are always recorded.
    pub fn review(
        &mut self,
        approved: bool,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        if self.status != SellerStatus::Pending {
            return Err(WorkflowError::BadRequest(format!(
                "Seller application is not pending (current status: {})",
                self.status.label()
            )));
        }

        if approved {
            self.status = SellerStatus::Approved;
            self.verified_at = Some(now);
        } else {
            self.status = SellerStatus::Rejected;
        }
        self.verification_notes = notes;
        self.updated_at = now;
        Ok(())
    }

    fn fill_profile(&mut self, application: &SellerApplication) {
        self.city = application.city.trim().to_string();
        self.address = application.address.trim().to_string();
        self.company_name = application.company_name.clone();
        self.license_number = application.license_number.clone();
        self.bio = application.bio.clone();
    }

    pub fn view(&self, user: &User) -> SellerView {
        SellerView {
            id: self.id,
            user_id: self.user_id,
            user_name: user.profile.full_name(),
            email: user.email.clone(),
            phone: user.profile.contact_number.clone(),
            profile_picture: user.profile.profile_picture.clone(),
            city: self.city.clone(),
            address: self.address.clone(),
            company_name: self.company_name.clone(),
            license_number: self.license_number.clone(),
            bio: self.bio.clone(),
            status: self.status,
            rating: self.rating,
            verified_at: self.verified_at,
            verification_notes: self.verification_notes.clone(),
            created_at: self.created_at,
        }
    }
}

/// Seller profile joined with the owning account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerView {
    pub id: SellerId,
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub city: String,
    pub address: String,
    pub company_name: Option<String>,
    pub license_number: Option<String>,
    pub bio: Option<String>,
    pub status: SellerStatus,
    pub rating: Decimal,
    pub verified_at: Option<DateTime<Utc>>,
    pub verification_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::validation::validate_request;

    fn application() -> SellerApplication {
        SellerApplication {
            city: "Lisbon".into(),
            address: "Rua Augusta 10".into(),
            company_name: Some("Casa Lda".into()),
            license_number: None,
            bio: None,
        }
    }

    #[test]
    fn review_only_from_pending() {
        let now = Utc::now();
        let mut seller = Seller::applied(UserId(1), &application(), now);
        seller
            .review(true, Some("documents ok".into()), now)
            .expect("pending seller can be approved");
        assert_eq!(seller.status, SellerStatus::Approved);
        assert_eq!(seller.verified_at, Some(now));
        assert_eq!(seller.verification_notes.as_deref(), Some("documents ok"));

        assert!(matches!(
            seller.review(false, None, now),
            Err(WorkflowError::BadRequest(_))
        ));
    }

    #[test]
    fn rejection_leaves_verified_at_empty_and_keeps_notes() {
        let now = Utc::now();
        let mut seller = Seller::applied(UserId(1), &application(), now);
        seller
            .review(false, Some("license missing".into()), now)
            .expect("pending seller can be rejected");
        assert_eq!(seller.status, SellerStatus::Rejected);
        assert!(seller.verified_at.is_none());
        assert_eq!(seller.verification_notes.as_deref(), Some("license missing"));
    }

    #[test]
    fn reapply_resets_rejected_profile() {
        let now = Utc::now();
        let mut seller = Seller::applied(UserId(1), &application(), now);
        seller.review(false, Some("no".into()), now).expect("reject");

        let mut second = application();
        second.city = "Porto".into();
        seller.reapply(&second, now).expect("rejected seller may reapply");
        assert_eq!(seller.status, SellerStatus::Pending);
        assert_eq!(seller.city, "Porto");
        assert!(seller.verified_at.is_none());
        assert!(seller.verification_notes.is_none());
    }

    #[test]
    fn reapply_conflicts_while_pending_or_approved() {
        let now = Utc::now();
        let mut seller = Seller::applied(UserId(1), &application(), now);
        assert!(matches!(
            seller.reapply(&application(), now),
            Err(WorkflowError::Conflict(_))
        ));
        seller.review(true, None, now).expect("approve");
        assert!(matches!(
            seller.reapply(&application(), now),
            Err(WorkflowError::Conflict(_))
        ));
    }

    #[test]
    fn application_bounds() {
        let mut bad = application();
        bad.city = "L".into();
        bad.address = "abc".into();
        bad.bio = Some("b".repeat(501));
        match validate_request(&bad) {
            Err(WorkflowError::Validation(fields)) => {
                assert_eq!(fields.len(), 3);
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
