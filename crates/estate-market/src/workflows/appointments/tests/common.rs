use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::infra::InMemoryStore;
use crate::workflows::appointments::{AppointmentService, CreateAppointmentRequest};
use crate::workflows::auth::{Authenticator, JwtTokenIssuer, TokenIssuer};
use crate::workflows::clock::ManualClock;
use crate::workflows::estates::{
    Category, CategoryId, CategoryRepository, Estate, EstateId, EstateRepository, EstateStatus,
    EstateType,
};
use crate::workflows::identity::{Principal, RoleName, User, UserProfile, UserRepository};
use crate::workflows::sellers::{Seller, SellerId, SellerRepository, SellerStatus};

pub(super) const SECRET: &str = "appointment-test-secret";

pub(super) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 3, 9, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) struct World {
    pub store: InMemoryStore,
    pub clock: Arc<ManualClock>,
    pub service: Arc<AppointmentService>,
    pub client: Principal,
    pub other_client: Principal,
    pub seller: Principal,
    pub rival_seller: Principal,
    pub seller_id: SellerId,
    pub estate: EstateId,
    pub pending_estate: EstateId,
}

impl World {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let clock = Arc::new(ManualClock::new(start()));

        let client = principal(&store, "client@estate.test", false);
        let other_client = principal(&store, "other@estate.test", false);
        let seller = principal(&store, "seller@estate.test", true);
        let rival_seller = principal(&store, "rival@estate.test", true);

        let seller_id = seller_profile(&store, &seller);
        seller_profile(&store, &rival_seller);

        let category = CategoryRepository::insert(
            &store,
            Category {
                id: CategoryId(0),
                name: "House".to_string(),
                description: None,
                created_at: start(),
            },
        )
        .expect("category stored")
        .id;

        let estate = listing(&store, seller_id, category, EstateStatus::Approved);
        let pending_estate = listing(&store, seller_id, category, EstateStatus::WaitingForApproval);

        let shared = Arc::new(store.clone());
        let service = Arc::new(AppointmentService::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared,
            clock.clone(),
        ));

        Self {
            store,
            clock,
            service,
            client,
            other_client,
            seller,
            rival_seller,
            seller_id,
            estate,
            pending_estate,
        }
    }

    pub fn request(&self, offset: Duration) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            estate_id: self.estate.0,
            appointment_date: start() + offset,
            message: Some("Is the garden south facing?".to_string()),
        }
    }

    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(
            Arc::new(self.issuer()),
            Arc::new(self.store.clone()),
            self.clock.clone(),
        )
    }

    pub fn bearer(&self, principal: &Principal) -> String {
        let token = self
            .issuer()
            .issue_access_token(principal, start())
            .expect("token issued");
        format!("Bearer {}", token.token)
    }

    fn issuer(&self) -> JwtTokenIssuer {
        JwtTokenIssuer::new(SECRET, "estate-market".to_string(), Duration::hours(1))
    }
}

fn principal(store: &InMemoryStore, email: &str, seller: bool) -> Principal {
    let profile = UserProfile {
        name: "Jo".to_string(),
        middle_name: None,
        last_name: "Doe".to_string(),
        second_last_name: None,
        contact_number: Some("+351 900 000 000".to_string()),
        profile_picture: None,
    };
    let mut user = User::registered(email.to_string(), "salt$hash".to_string(), profile, start());
    user.mark_email_verified(start());
    if seller {
        user.roles.insert(RoleName::Seller);
    }
    let user = UserRepository::insert(store, user).expect("user stored");
    Principal::from_user(&user)
}

fn seller_profile(store: &InMemoryStore, principal: &Principal) -> SellerId {
    let seller = Seller {
        id: SellerId::UNASSIGNED,
        user_id: principal.user_id,
        city: "Lisbon".to_string(),
        address: "Avenida da Liberdade 10".to_string(),
        company_name: None,
        license_number: None,
        bio: None,
        status: SellerStatus::Approved,
        rating: Seller::default_rating(),
        verified_at: Some(start()),
        verification_notes: None,
        created_at: start(),
        updated_at: start(),
    };
    SellerRepository::insert(store, seller)
        .expect("seller stored")
        .id
}

fn listing(
    store: &InMemoryStore,
    seller_id: SellerId,
    category_id: CategoryId,
    status: EstateStatus,
) -> EstateId {
    let estate = Estate {
        id: EstateId::UNASSIGNED,
        seller_id,
        category_id,
        name: "Townhouse".to_string(),
        description: "Three bedrooms with a garden".to_string(),
        price: Decimal::new(450_000, 0),
        estate_type: EstateType::Sale,
        status,
        city: "Lisbon".to_string(),
        address: "Rua Augusta 5".to_string(),
        images: vec!["https://bucket.s3.us-east-1.amazonaws.com/estates/front.jpg".to_string()],
        characteristics: Vec::new(),
        created_at: start(),
        updated_at: start(),
    };
    EstateRepository::insert(store, estate)
        .expect("estate stored")
        .id
}
