use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::domain::{Seller, SellerApplication, SellerId, SellerStatus, SellerView, VerifySellerRequest};
use super::repository::SellerRepository;
use crate::workflows::clock::Clock;
use crate::workflows::error::{RepositoryError, WorkflowError};
use crate::workflows::identity::{Principal, RoleName, UserRepository};

pub struct SellerService {
    sellers: Arc<dyn SellerRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl SellerService {
    pub fn new(
        sellers: Arc<dyn SellerRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sellers,
            users,
            clock,
        }
    }

    /// Submits a first application or re-applies after a rejection.
    pub fn apply(
        &self,
        principal: &Principal,
        application: SellerApplication,
    ) -> Result<SellerView, WorkflowError> {
        application.validate()?;
        let now = self.clock.now();

        let seller = match self.sellers.find_by_user(principal.user_id)? {
            Some(mut existing) => {
                existing.reapply(&application, now)?;
                self.sellers.update(&existing)?;
                info!(seller_id = %existing.id, user_id = %principal.user_id, "seller re-applied");
                existing
            }
            None => {
                let seller = Seller::applied(principal.user_id, &application, now);
                let seller = self.sellers.insert(seller).map_err(|err| match err {
                    RepositoryError::Conflict(_) => WorkflowError::Conflict(
                        "You have already applied to become a seller".to_string(),
                    ),
                    other => other.into(),
                })?;
                info!(seller_id = %seller.id, user_id = %principal.user_id, "seller application submitted");
                seller
            }
        };

        self.view(&seller)
    }

    pub fn application_status(&self, principal: &Principal) -> Result<SellerView, WorkflowError> {
        let seller = self
            .sellers
            .find_by_user(principal.user_id)?
            .ok_or_else(|| WorkflowError::NotFound("No seller application found".to_string()))?;
        self.view(&seller)
    }

    pub fn list_pending(&self, principal: &Principal) -> Result<Vec<SellerView>, WorkflowError> {
        principal.require_role(RoleName::Admin)?;
        self.sellers
            .by_status(SellerStatus::Pending)?
            .iter()
            .map(|seller| self.view(seller))
            .collect()
    }

    pub fn get(&self, principal: &Principal, id: SellerId) -> Result<SellerView, WorkflowError> {
        principal.require_role(RoleName::Admin)?;
        let seller = self.load(id)?;
        self.view(&seller)
    }

    /// Approves or rejects a pending application. Approval grants SELLER.
    pub fn verify(
        &self,
        principal: &Principal,
        id: SellerId,
        request: VerifySellerRequest,
    ) -> Result<SellerView, WorkflowError> {
        principal.require_role(RoleName::Admin)?;
        request.validate()?;

        let mut seller = self.load(id)?;
        seller.review(request.approved, request.notes, self.clock.now())?;
        if request.approved {
            self.sellers.approve(&seller, RoleName::Seller)?;
        } else {
            self.sellers.update(&seller)?;
        }

        info!(
            seller_id = %seller.id,
            status = seller.status.label(),
            reviewed_by = %principal.user_id,
            "seller application reviewed"
        );
        self.view(&seller)
    }

    fn load(&self, id: SellerId) -> Result<Seller, WorkflowError> {
        self.sellers
            .fetch(id)?
            .ok_or_else(|| WorkflowError::not_found("Seller", "id", id))
    }

    fn view(&self, seller: &Seller) -> Result<SellerView, WorkflowError> {
        let user = self
            .users
            .fetch(seller.user_id)?
            .ok_or_else(|| WorkflowError::not_found("User", "id", seller.user_id))?;
        Ok(seller.view(&user))
    }
}
