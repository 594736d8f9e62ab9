use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::domain::{
    CategoryId, CategorySummary, CreateEstateRequest, Estate, EstateId, EstateSellerSummary,
    EstateStatus, EstateType, EstateView,
};
use super::repository::{CategoryRepository, EstateRepository};
use super::search::{EstateFilter, EstateSearchQuery, EstateSort};
use super::storage::ImageService;
use crate::workflows::clock::Clock;
use crate::workflows::error::WorkflowError;
use crate::workflows::identity::{Principal, RoleName, UserRepository};
use crate::workflows::pagination::{Page, PageRequest};
use crate::workflows::sellers::{Seller, SellerRepository};

pub struct EstateService {
    estates: Arc<dyn EstateRepository>,
    categories: Arc<dyn CategoryRepository>,
    sellers: Arc<dyn SellerRepository>,
    users: Arc<dyn UserRepository>,
    images: Arc<ImageService>,
    clock: Arc<dyn Clock>,
}

impl EstateService {
    pub fn new(
        estates: Arc<dyn EstateRepository>,
        categories: Arc<dyn CategoryRepository>,
        sellers: Arc<dyn SellerRepository>,
        users: Arc<dyn UserRepository>,
        images: Arc<ImageService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            estates,
            categories,
            sellers,
            users,
            images,
            clock,
        }
    }

    /// Lists a property for moderation on behalf of the caller's seller profile.
    pub fn create(
        &self,
        principal: &Principal,
        request: CreateEstateRequest,
    ) -> Result<EstateView, WorkflowError> {
        principal.require_role(RoleName::Seller)?;
        request.validate()?;

        let seller = self.seller_of(principal)?;
        let category_id = CategoryId(request.category_id);
        if self.categories.fetch(category_id)?.is_none() {
            return Err(WorkflowError::not_found("Category", "id", category_id));
        }

        let estate = Estate::submitted(seller.id, &request, self.clock.now());
        let estate = self.estates.insert(estate)?;
        info!(estate_id = %estate.id, seller_id = %seller.id, "estate submitted for approval");
        self.view(&estate)
    }

    /// Public detail; only approved listings are visible.
    pub fn get_public(&self, id: EstateId) -> Result<EstateView, WorkflowError> {
        let estate = self.load(id)?;
        if estate.status != EstateStatus::Approved {
            return Err(WorkflowError::not_found("Estate", "id", id));
        }
        self.view(&estate)
    }

    pub fn list_approved(
        &self,
        page: PageRequest,
        sort: EstateSort,
    ) -> Result<Page<EstateView>, WorkflowError> {
        self.query(&EstateFilter::with_status(EstateStatus::Approved), page, sort)
    }

    pub fn search(&self, query: &EstateSearchQuery) -> Result<Page<EstateView>, WorkflowError> {
        self.query(&query.filter(), query.page_request(), query.sort()?)
    }

    /// Search with the listing type pinned, as used by the sale and rent feeds.
    pub fn search_by_type(
        &self,
        estate_type: EstateType,
        query: &EstateSearchQuery,
    ) -> Result<Page<EstateView>, WorkflowError> {
        let mut filter = query.filter();
        filter.estate_type = Some(estate_type);
        self.query(&filter, query.page_request(), query.sort()?)
    }

    pub fn list_mine(
        &self,
        principal: &Principal,
        page: PageRequest,
    ) -> Result<Page<EstateView>, WorkflowError> {
        principal.require_role(RoleName::Seller)?;
        let seller = self.seller_of(principal)?;
        self.query(&EstateFilter::for_seller(seller.id), page, EstateSort::NEWEST_FIRST)
    }

    pub fn list_pending(
        &self,
        principal: &Principal,
        page: PageRequest,
    ) -> Result<Page<EstateView>, WorkflowError> {
        principal.require_role(RoleName::Admin)?;
        self.query(
            &EstateFilter::with_status(EstateStatus::WaitingForApproval),
            page,
            EstateSort::OLDEST_FIRST,
        )
    }

    pub fn approve(&self, principal: &Principal, id: EstateId) -> Result<EstateView, WorkflowError> {
        principal.require_role(RoleName::Admin)?;
        self.transition(id, "approved", |estate, now| estate.approve(now))
    }

    pub fn reject(&self, principal: &Principal, id: EstateId) -> Result<EstateView, WorkflowError> {
        principal.require_role(RoleName::Admin)?;
        self.transition(id, "rejected", |estate, now| estate.reject(now))
    }

    pub fn mark_sold(&self, principal: &Principal, id: EstateId) -> Result<EstateView, WorkflowError> {
        self.ensure_owner(principal, id)?;
        self.transition(id, "sold", |estate, now| estate.mark_sold(now))
    }

    pub fn mark_rented(
        &self,
        principal: &Principal,
        id: EstateId,
    ) -> Result<EstateView, WorkflowError> {
        self.ensure_owner(principal, id)?;
        self.transition(id, "rented", |estate, now| estate.mark_rented(now))
    }

    /// Deletes stored images first (failures are logged and skipped), then the listing.
    pub fn delete(&self, principal: &Principal, id: EstateId) -> Result<(), WorkflowError> {
        let estate = self.ensure_owner(principal, id)?;

        let urls = estate.all_image_urls();
        let removed = if urls.is_empty() {
            0
        } else {
            self.images.delete_images(&urls)
        };

        self.estates.delete(estate.id)?;
        info!(
            estate_id = %estate.id,
            images = urls.len(),
            images_removed = removed,
            "estate deleted"
        );
        Ok(())
    }

    pub fn load(&self, id: EstateId) -> Result<Estate, WorkflowError> {
        self.estates
            .fetch(id)?
            .ok_or_else(|| WorkflowError::not_found("Estate", "id", id))
    }

    pub fn view(&self, estate: &Estate) -> Result<EstateView, WorkflowError> {
        let category = self
            .categories
            .fetch(estate.category_id)?
            .ok_or_else(|| WorkflowError::not_found("Category", "id", estate.category_id))?;
        let seller = self
            .sellers
            .fetch(estate.seller_id)?
            .ok_or_else(|| WorkflowError::not_found("Seller", "id", estate.seller_id))?;
        let user = self
            .users
            .fetch(seller.user_id)?
            .ok_or_else(|| WorkflowError::not_found("User", "id", seller.user_id))?;

        Ok(EstateView {
            id: estate.id,
            name: estate.name.clone(),
            description: estate.description.clone(),
            price: estate.price,
            estate_type: estate.estate_type,
            status: estate.status,
            city: estate.city.clone(),
            address: estate.address.clone(),
            category: CategorySummary {
                id: category.id,
                name: category.name,
            },
            seller: EstateSellerSummary {
                id: seller.id,
                name: user.profile.full_name(),
                email: user.email,
                phone: user.profile.contact_number,
                company_name: seller.company_name,
                rating: seller.rating,
            },
            images: estate.images.clone(),
            characteristics: estate.characteristics.clone(),
            created_at: estate.created_at,
            updated_at: estate.updated_at,
        })
    }

    fn query(
        &self,
        filter: &EstateFilter,
        page: PageRequest,
        sort: EstateSort,
    ) -> Result<Page<EstateView>, WorkflowError> {
        page.validate()?;
        let mut estates = self.estates.search(filter)?;
        sort.apply(&mut estates);
        page.slice(estates).try_map(|estate| self.view(&estate))
    }

    fn transition(
        &self,
        id: EstateId,
        outcome: &str,
        apply: impl FnOnce(&mut Estate, chrono::DateTime<chrono::Utc>) -> Result<(), WorkflowError>,
    ) -> Result<EstateView, WorkflowError> {
        let mut estate = self.load(id)?;
        apply(&mut estate, self.clock.now())?;
        self.estates.update(&estate)?;
        info!(estate_id = %estate.id, status = estate.status.label(), "estate {outcome}");
        self.view(&estate)
    }

    /// Loads the listing if the caller's seller profile owns it; admins pass.
    fn ensure_owner(&self, principal: &Principal, id: EstateId) -> Result<Estate, WorkflowError> {
        let estate = self.load(id)?;
        if principal.is_admin() {
            return Ok(estate);
        }

        let owns = self
            .sellers
            .find_by_user(principal.user_id)?
            .is_some_and(|seller| seller.id == estate.seller_id);
        if !owns {
            return Err(WorkflowError::forbidden(
                "You can only manage your own estates",
            ));
        }
        Ok(estate)
    }

    fn seller_of(&self, principal: &Principal) -> Result<Seller, WorkflowError> {
        self.sellers
            .find_by_user(principal.user_id)?
            .ok_or_else(|| WorkflowError::not_found("Seller", "user id", principal.user_id))
    }
}
