use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::workflows::appointments::{Appointment, AppointmentId, AppointmentRepository};
use crate::workflows::auth::{
    EmailVerificationToken, RefreshToken, RefreshTokenRepository, VerificationTokenRepository,
};
use crate::workflows::error::RepositoryError;
use crate::workflows::estates::{
    Category, CategoryId, CategoryRepository, Estate, EstateFilter, EstateId, EstateRepository,
};
use crate::workflows::favorites::{Favorite, FavoriteRepository};
use crate::workflows::identity::{RoleName, User, UserId, UserRepository};
use crate::workflows::sellers::{Seller, SellerId, SellerRepository, SellerStatus};

#[derive(Default)]
struct Sequences {
    user: i64,
    seller: i64,
    category: i64,
    estate: i64,
    appointment: i64,
    favorite: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Default)]
struct StoreState {
    sequences: Sequences,
    users: BTreeMap<UserId, User>,
    refresh_tokens: HashMap<String, RefreshToken>,
    verification_tokens: HashMap<String, EmailVerificationToken>,
    sellers: BTreeMap<SellerId, Seller>,
    categories: BTreeMap<CategoryId, Category>,
    estates: BTreeMap<EstateId, Estate>,
    appointments: BTreeMap<AppointmentId, Appointment>,
    favorites: BTreeMap<i64, Favorite>,
}

impl StoreState {
    fn remove_estate(&mut self, id: EstateId) {
        self.estates.remove(&id);
        self.appointments.retain(|_, item| item.estate_id != id);
        self.favorites.retain(|_, item| item.estate_id != id);
    }

    fn remove_seller(&mut self, id: SellerId) {
        let owned: Vec<EstateId> = self
            .estates
            .values()
            .filter(|estate| estate.seller_id == id)
            .map(|estate| estate.id)
            .collect();
        for estate_id in owned {
            self.remove_estate(estate_id);
        }
        self.appointments.retain(|_, item| item.seller_id != id);
        self.sellers.remove(&id);
    }

    fn slot_taken(
        &self,
        seller_id: SellerId,
        date: DateTime<Utc>,
        except: Option<AppointmentId>,
    ) -> bool {
        self.appointments.values().any(|item| {
            Some(item.id) != except
                && item.seller_id == seller_id
                && item.appointment_date == date
                && item.status.is_active()
        })
    }
}

/// Single mutex-guarded store implementing every repository trait.
///
/// Each trait call holds the lock for its whole duration, so uniqueness
/// checks and cascading deletes are atomic.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl UserRepository for InMemoryStore {
    fn insert(&self, mut user: User) -> Result<User, RepositoryError> {
        let mut state = self.lock()?;
        if state.users.values().any(|existing| existing.email == user.email) {
            return Err(RepositoryError::Conflict(format!("user email {}", user.email)));
        }
        user.id = UserId(next(&mut state.sequences.user));
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if state
            .users
            .values()
            .any(|existing| existing.id != user.id && existing.email == user.email)
        {
            return Err(RepositoryError::Conflict(format!("user email {}", user.email)));
        }
        match state.users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if state.users.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        state.refresh_tokens.retain(|_, token| token.user_id != id);
        state.verification_tokens.retain(|_, token| token.user_id != id);
        state.appointments.retain(|_, item| item.client_id != id);
        state.favorites.retain(|_, item| item.user_id != id);
        let seller = state
            .sellers
            .values()
            .find(|seller| seller.user_id == id)
            .map(|seller| seller.id);
        if let Some(seller_id) = seller {
            state.remove_seller(seller_id);
        }
        Ok(())
    }
}

impl RefreshTokenRepository for InMemoryStore {
    fn insert(&self, token: RefreshToken) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if state.refresh_tokens.contains_key(&token.token) {
            return Err(RepositoryError::Conflict("refresh token".to_string()));
        }
        state.refresh_tokens.insert(token.token.clone(), token);
        Ok(())
    }

    fn find(&self, token: &str) -> Result<Option<RefreshToken>, RepositoryError> {
        Ok(self.lock()?.refresh_tokens.get(token).cloned())
    }

    fn update(&self, token: &RefreshToken) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        match state.refresh_tokens.get_mut(&token.token) {
            Some(slot) => {
                *slot = token.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

impl VerificationTokenRepository for InMemoryStore {
    fn replace_for_user(&self, token: EmailVerificationToken) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        state
            .verification_tokens
            .retain(|_, existing| existing.user_id != token.user_id || existing.is_consumed());
        state.verification_tokens.insert(token.token.clone(), token);
        Ok(())
    }

    fn find(&self, token: &str) -> Result<Option<EmailVerificationToken>, RepositoryError> {
        Ok(self.lock()?.verification_tokens.get(token).cloned())
    }

    fn update(&self, token: &EmailVerificationToken) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        match state.verification_tokens.get_mut(&token.token) {
            Some(slot) => {
                *slot = token.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

impl SellerRepository for InMemoryStore {
    fn insert(&self, mut seller: Seller) -> Result<Seller, RepositoryError> {
        let mut state = self.lock()?;
        if !state.users.contains_key(&seller.user_id) {
            return Err(RepositoryError::NotFound);
        }
        if state.sellers.values().any(|existing| existing.user_id == seller.user_id) {
            return Err(RepositoryError::Conflict(format!(
                "seller profile for user {}",
                seller.user_id
            )));
        }
        seller.id = SellerId(next(&mut state.sequences.seller));
        state.sellers.insert(seller.id, seller.clone());
        Ok(seller)
    }

    fn update(&self, seller: &Seller) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        match state.sellers.get_mut(&seller.id) {
            Some(slot) => {
                *slot = seller.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn approve(&self, seller: &Seller, role: RoleName) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if !state.sellers.contains_key(&seller.id) {
            return Err(RepositoryError::NotFound);
        }
        let owner = state
            .users
            .get_mut(&seller.user_id)
            .ok_or(RepositoryError::NotFound)?;
        owner.roles.insert(role);
        state.sellers.insert(seller.id, seller.clone());
        Ok(())
    }

    fn fetch(&self, id: SellerId) -> Result<Option<Seller>, RepositoryError> {
        Ok(self.lock()?.sellers.get(&id).cloned())
    }

    fn find_by_user(&self, user_id: UserId) -> Result<Option<Seller>, RepositoryError> {
        Ok(self
            .lock()?
            .sellers
            .values()
            .find(|seller| seller.user_id == user_id)
            .cloned())
    }

    fn by_status(&self, status: SellerStatus) -> Result<Vec<Seller>, RepositoryError> {
        let mut sellers: Vec<Seller> = self
            .lock()?
            .sellers
            .values()
            .filter(|seller| seller.status == status)
            .cloned()
            .collect();
        sellers.sort_by_key(|seller| (seller.updated_at, seller.id));
        Ok(sellers)
    }
}

impl CategoryRepository for InMemoryStore {
    fn insert(&self, mut category: Category) -> Result<Category, RepositoryError> {
        let mut state = self.lock()?;
        if state
            .categories
            .values()
            .any(|existing| existing.name.eq_ignore_ascii_case(&category.name))
        {
            return Err(RepositoryError::Conflict(format!("category {}", category.name)));
        }
        category.id = CategoryId(next(&mut state.sequences.category));
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    fn fetch(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        Ok(self.lock()?.categories.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(self.lock()?.categories.values().cloned().collect())
    }
}

impl EstateRepository for InMemoryStore {
    fn insert(&self, mut estate: Estate) -> Result<Estate, RepositoryError> {
        let mut state = self.lock()?;
        if !state.sellers.contains_key(&estate.seller_id)
            || !state.categories.contains_key(&estate.category_id)
        {
            return Err(RepositoryError::NotFound);
        }
        estate.id = EstateId(next(&mut state.sequences.estate));
        state.estates.insert(estate.id, estate.clone());
        Ok(estate)
    }

    fn update(&self, estate: &Estate) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        match state.estates.get_mut(&estate.id) {
            Some(slot) => {
                *slot = estate.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: EstateId) -> Result<Option<Estate>, RepositoryError> {
        Ok(self.lock()?.estates.get(&id).cloned())
    }

    fn delete(&self, id: EstateId) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if !state.estates.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        state.remove_estate(id);
        Ok(())
    }

    fn search(&self, filter: &EstateFilter) -> Result<Vec<Estate>, RepositoryError> {
        Ok(self
            .lock()?
            .estates
            .values()
            .filter(|estate| filter.matches(estate))
            .cloned()
            .collect())
    }
}

impl AppointmentRepository for InMemoryStore {
    fn insert(&self, mut appointment: Appointment) -> Result<Appointment, RepositoryError> {
        let mut state = self.lock()?;
        if appointment.status.is_active()
            && state.slot_taken(appointment.seller_id, appointment.appointment_date, None)
        {
            return Err(RepositoryError::Conflict(format!(
                "appointment slot for seller {} at {}",
                appointment.seller_id, appointment.appointment_date
            )));
        }
        appointment.id = AppointmentId(next(&mut state.sequences.appointment));
        state.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    fn update(&self, appointment: &Appointment) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if !state.appointments.contains_key(&appointment.id) {
            return Err(RepositoryError::NotFound);
        }
        if appointment.status.is_active()
            && state.slot_taken(
                appointment.seller_id,
                appointment.appointment_date,
                Some(appointment.id),
            )
        {
            return Err(RepositoryError::Conflict(format!(
                "appointment slot for seller {} at {}",
                appointment.seller_id, appointment.appointment_date
            )));
        }
        state.appointments.insert(appointment.id, appointment.clone());
        Ok(())
    }

    fn fetch(&self, id: AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        Ok(self.lock()?.appointments.get(&id).cloned())
    }

    fn by_client(&self, client_id: UserId) -> Result<Vec<Appointment>, RepositoryError> {
        Ok(self
            .lock()?
            .appointments
            .values()
            .filter(|item| item.client_id == client_id)
            .cloned()
            .collect())
    }

    fn by_seller(&self, seller_id: SellerId) -> Result<Vec<Appointment>, RepositoryError> {
        Ok(self
            .lock()?
            .appointments
            .values()
            .filter(|item| item.seller_id == seller_id)
            .cloned()
            .collect())
    }

    fn has_conflict(
        &self,
        seller_id: SellerId,
        appointment_date: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.slot_taken(seller_id, appointment_date, None))
    }
}

impl FavoriteRepository for InMemoryStore {
    fn insert(&self, mut favorite: Favorite) -> Result<Favorite, RepositoryError> {
        let mut state = self.lock()?;
        if state
            .favorites
            .values()
            .any(|item| item.user_id == favorite.user_id && item.estate_id == favorite.estate_id)
        {
            return Err(RepositoryError::Conflict(format!(
                "favorite of estate {} for user {}",
                favorite.estate_id, favorite.user_id
            )));
        }
        favorite.id = next(&mut state.sequences.favorite);
        state.favorites.insert(favorite.id, favorite.clone());
        Ok(favorite)
    }

    fn find(&self, user_id: UserId, estate_id: EstateId) -> Result<Option<Favorite>, RepositoryError> {
        Ok(self
            .lock()?
            .favorites
            .values()
            .find(|item| item.user_id == user_id && item.estate_id == estate_id)
            .cloned())
    }

    fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        self.lock()?
            .favorites
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn by_user(&self, user_id: UserId) -> Result<Vec<Favorite>, RepositoryError> {
        Ok(self
            .lock()?
            .favorites
            .values()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect())
    }

    fn count_by_user(&self, user_id: UserId) -> Result<usize, RepositoryError> {
        Ok(self
            .lock()?
            .favorites
            .values()
            .filter(|item| item.user_id == user_id)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::appointments::AppointmentStatus;
    use crate::workflows::estates::{EstateStatus, EstateType};
    use crate::workflows::identity::UserProfile;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 4, 1, 10, 0, 0).single().expect("valid instant")
    }

    fn user(email: &str) -> User {
        let profile = UserProfile {
            name: "Test".into(),
            middle_name: None,
            last_name: "User".into(),
            second_last_name: None,
            contact_number: None,
            profile_picture: None,
        };
        User::registered(email.into(), "salt$hash".into(), profile, instant())
    }

    fn seller(user_id: UserId) -> Seller {
        Seller {
            id: SellerId::UNASSIGNED,
            user_id,
            city: "Porto".into(),
            address: "Rua das Flores 1".into(),
            company_name: None,
            license_number: None,
            bio: None,
            status: SellerStatus::Approved,
            rating: Seller::default_rating(),
            verified_at: Some(instant()),
            verification_notes: None,
            created_at: instant(),
            updated_at: instant(),
        }
    }

    fn estate(seller_id: SellerId, category_id: CategoryId) -> Estate {
        Estate {
            id: EstateId::UNASSIGNED,
            seller_id,
            category_id,
            name: "Loft".into(),
            description: "Bright loft near the river".into(),
            price: Decimal::new(1_200, 0),
            estate_type: EstateType::Rent,
            status: EstateStatus::Approved,
            city: "Porto".into(),
            address: "Rua das Flores 2".into(),
            images: Vec::new(),
            characteristics: Vec::new(),
            created_at: instant(),
            updated_at: instant(),
        }
    }

    fn appointment(client: UserId, seller_id: SellerId, estate_id: EstateId) -> Appointment {
        Appointment {
            id: AppointmentId::UNASSIGNED,
            client_id: client,
            seller_id,
            estate_id,
            appointment_date: instant() + Duration::days(2),
            message: None,
            seller_notes: None,
            status: AppointmentStatus::Pending,
            created_at: instant(),
            updated_at: instant(),
        }
    }

    struct Fixture {
        store: InMemoryStore,
        owner: UserId,
        client: UserId,
        seller: SellerId,
        estate: EstateId,
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let owner = UserRepository::insert(&store, user("owner@x.com")).expect("owner").id;
        let client = UserRepository::insert(&store, user("client@x.com")).expect("client").id;
        let seller = SellerRepository::insert(&store, seller(owner)).expect("seller").id;
        let category = CategoryRepository::insert(
            &store,
            Category {
                id: CategoryId(0),
                name: "Apartment".into(),
                description: None,
                created_at: instant(),
            },
        )
        .expect("category")
        .id;
        let estate = EstateRepository::insert(&store, estate(seller, category))
            .expect("estate")
            .id;
        Fixture {
            store,
            owner,
            client,
            seller,
            estate,
        }
    }

    #[test]
    fn email_is_unique() {
        let fx = fixture();
        let result = UserRepository::insert(&fx.store, user("owner@x.com"));
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[test]
    fn one_seller_profile_per_user() {
        let fx = fixture();
        let result = SellerRepository::insert(&fx.store, seller(fx.owner));
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[test]
    fn approval_stores_profile_and_grants_role_together() {
        let fx = fixture();
        let mut reviewed = SellerRepository::fetch(&fx.store, fx.seller)
            .expect("fetch")
            .expect("seller");
        reviewed.verification_notes = Some("documents checked".into());

        fx.store.approve(&reviewed, RoleName::Seller).expect("approve");

        let owner = UserRepository::fetch(&fx.store, fx.owner).expect("fetch").expect("owner");
        assert!(owner.has_role(RoleName::Seller));
        let stored = SellerRepository::fetch(&fx.store, fx.seller)
            .expect("fetch")
            .expect("seller");
        assert_eq!(stored.verification_notes.as_deref(), Some("documents checked"));
    }

    #[test]
    fn approval_without_owner_changes_nothing() {
        let fx = fixture();
        let mut orphan = SellerRepository::fetch(&fx.store, fx.seller)
            .expect("fetch")
            .expect("seller");
        orphan.user_id = UserId(9_999);
        orphan.verification_notes = Some("should not land".into());

        let result = fx.store.approve(&orphan, RoleName::Seller);
        assert!(matches!(result, Err(RepositoryError::NotFound)));

        let stored = SellerRepository::fetch(&fx.store, fx.seller)
            .expect("fetch")
            .expect("seller");
        assert_eq!(stored.user_id, fx.owner);
        assert!(stored.verification_notes.is_none());
    }

    #[test]
    fn approval_of_unknown_profile_grants_nothing() {
        let fx = fixture();
        let mut ghost = seller(fx.client);
        ghost.id = SellerId(9_999);

        let result = fx.store.approve(&ghost, RoleName::Seller);
        assert!(matches!(result, Err(RepositoryError::NotFound)));

        let client = UserRepository::fetch(&fx.store, fx.client).expect("fetch").expect("client");
        assert!(!client.has_role(RoleName::Seller));
    }

    #[test]
    fn active_slot_is_unique_per_seller() {
        let fx = fixture();
        let first = AppointmentRepository::insert(
            &fx.store,
            appointment(fx.client, fx.seller, fx.estate),
        )
        .expect("first booking");

        let clash = AppointmentRepository::insert(
            &fx.store,
            appointment(fx.client, fx.seller, fx.estate),
        );
        assert!(matches!(clash, Err(RepositoryError::Conflict(_))));

        let mut cancelled = first.clone();
        cancelled.status = AppointmentStatus::Cancelled;
        AppointmentRepository::update(&fx.store, &cancelled).expect("cancel frees the slot");
        AppointmentRepository::insert(&fx.store, appointment(fx.client, fx.seller, fx.estate))
            .expect("slot is free again");
    }

    #[test]
    fn favorite_pair_is_unique() {
        let fx = fixture();
        let favorite = Favorite {
            id: 0,
            user_id: fx.client,
            estate_id: fx.estate,
            created_at: instant(),
        };
        FavoriteRepository::insert(&fx.store, favorite.clone()).expect("first favorite");
        assert!(matches!(
            FavoriteRepository::insert(&fx.store, favorite),
            Err(RepositoryError::Conflict(_))
        ));
        assert_eq!(fx.store.count_by_user(fx.client).expect("count"), 1);
    }

    #[test]
    fn deleting_an_estate_removes_dependents() {
        let fx = fixture();
        AppointmentRepository::insert(&fx.store, appointment(fx.client, fx.seller, fx.estate))
            .expect("booking");
        FavoriteRepository::insert(
            &fx.store,
            Favorite {
                id: 0,
                user_id: fx.client,
                estate_id: fx.estate,
                created_at: instant(),
            },
        )
        .expect("favorite");

        EstateRepository::delete(&fx.store, fx.estate).expect("delete estate");
        assert!(fx.store.by_client(fx.client).expect("appointments").is_empty());
        assert!(fx.store.by_user(fx.client).expect("favorites").is_empty());
        assert!(matches!(
            EstateRepository::delete(&fx.store, fx.estate),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn deleting_a_user_cascades_through_seller_profile() {
        let fx = fixture();
        AppointmentRepository::insert(&fx.store, appointment(fx.client, fx.seller, fx.estate))
            .expect("booking");

        UserRepository::delete(&fx.store, fx.owner).expect("delete owner");
        assert!(fx.store.find_by_user(fx.owner).expect("seller lookup").is_none());
        assert!(EstateRepository::fetch(&fx.store, fx.estate)
            .expect("estate lookup")
            .is_none());
        assert!(fx.store.by_client(fx.client).expect("appointments").is_empty());
    }

    #[test]
    fn replacing_verification_tokens_keeps_consumed_ones() {
        let fx = fixture();
        let token = |value: &str, verified: bool| EmailVerificationToken {
            token: value.into(),
            user_id: fx.client,
            expires_at: instant() + Duration::hours(24),
            verified_at: verified.then(instant),
            created_at: instant(),
        };
        fx.store.replace_for_user(token("used", true)).expect("store");
        fx.store.replace_for_user(token("first", false)).expect("store");
        fx.store.replace_for_user(token("second", false)).expect("store");

        assert!(VerificationTokenRepository::find(&fx.store, "used").expect("find").is_some());
        assert!(VerificationTokenRepository::find(&fx.store, "first").expect("find").is_none());
        assert!(VerificationTokenRepository::find(&fx.store, "second").expect("find").is_some());
    }
}
