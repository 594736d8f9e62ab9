use axum::{Extension, Router};
use chrono::Duration;
use std::sync::Arc;
use tracing::info;

use crate::config::{AdminSeed, AppConfig};
use crate::infra::{BcryptPasswordHasher, InMemoryStore};
use crate::workflows::appointments::{appointment_router, AppointmentService};
use crate::workflows::auth::{
    auth_router, AuthService, Authenticator, EmailVerificationService, JwtTokenIssuer,
    MailTemplates, Mailer, PasswordCredentialVerifier, PasswordHasher, TokenIssuer,
};
use crate::workflows::clock::Clock;
use crate::workflows::estates::{
    estate_router, CategoryService, EstateService, ImageService, ObjectStorage,
};
use crate::workflows::favorites::{favorite_router, FavoriteService};
use crate::workflows::identity::{RoleName, User, UserProfile, UserRepository, UserView};
use crate::workflows::identity::domain::normalize_email;
use crate::workflows::sellers::{seller_router, SellerService};
use crate::workflows::WorkflowError;

/// External collaborators the marketplace is assembled from.
#[derive(Clone)]
pub struct MarketplaceAdapters {
    pub store: InMemoryStore,
    pub mailer: Arc<dyn Mailer>,
    pub storage: Arc<dyn ObjectStorage>,
    pub clock: Arc<dyn Clock>,
}

/// Every workflow service, wired over a shared store.
#[derive(Clone)]
pub struct Marketplace {
    pub auth: Arc<AuthService>,
    pub verification: Arc<EmailVerificationService>,
    pub sellers: Arc<SellerService>,
    pub estates: Arc<EstateService>,
    pub categories: Arc<CategoryService>,
    pub images: Arc<ImageService>,
    pub appointments: Arc<AppointmentService>,
    pub favorites: Arc<FavoriteService>,
    pub authenticator: Authenticator,
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl Marketplace {
    pub fn new(config: &AppConfig, adapters: MarketplaceAdapters) -> Self {
        let MarketplaceAdapters {
            store,
            mailer,
            storage,
            clock,
        } = adapters;
        let store = Arc::new(store);
        let users: Arc<dyn UserRepository> = store.clone();
        let hasher: Arc<dyn PasswordHasher> =
            Arc::new(BcryptPasswordHasher::new(config.auth.password_hash_cost));
        let tokens: Arc<dyn TokenIssuer> = Arc::new(JwtTokenIssuer::from_config(&config.auth));

        let verification = Arc::new(EmailVerificationService::new(
            users.clone(),
            store.clone(),
            mailer,
            MailTemplates::from_config(&config.mail),
            clock.clone(),
            config.auth.verification_token_ttl(),
        ));
        let credentials = Arc::new(PasswordCredentialVerifier::new(
            users.clone(),
            hasher.clone(),
        ));
        let auth = Arc::new(
            AuthService::new(
                users.clone(),
                store.clone(),
                credentials,
                hasher.clone(),
                tokens.clone(),
                verification.clone(),
                clock.clone(),
            )
            .with_refresh_ttl(config.auth.refresh_token_ttl()),
        );

        let images = Arc::new(ImageService::new(
            storage,
            Duration::seconds(config.storage.presign_ttl_secs),
        ));
        let sellers = Arc::new(SellerService::new(
            store.clone(),
            users.clone(),
            clock.clone(),
        ));
        let categories = Arc::new(CategoryService::new(store.clone(), clock.clone()));
        let estates = Arc::new(EstateService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            users.clone(),
            images.clone(),
            clock.clone(),
        ));
        let appointments = Arc::new(AppointmentService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            users.clone(),
            clock.clone(),
        ));
        let favorites = Arc::new(FavoriteService::new(
            store.clone(),
            estates.clone(),
            clock.clone(),
        ));
        let authenticator = Authenticator::new(tokens, users.clone(), clock.clone());

        Self {
            auth,
            verification,
            sellers,
            estates,
            categories,
            images,
            appointments,
            favorites,
            authenticator,
            users,
            hasher,
            clock,
        }
    }

    /// All `/api` routes with the bearer authenticator installed.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(auth_router(self.auth.clone()))
            .merge(seller_router(self.sellers.clone()))
            .merge(estate_router(
                self.estates.clone(),
                self.categories.clone(),
                self.images.clone(),
            ))
            .merge(appointment_router(self.appointments.clone()))
            .merge(favorite_router(self.favorites.clone()))
            .layer(Extension(self.authenticator.clone()))
    }

    /// Creates a verified administrator unless the address is already taken.
    pub fn seed_admin(&self, seed: &AdminSeed) -> Result<UserView, WorkflowError> {
        let email = normalize_email(&seed.email);
        if let Some(existing) = self.users.find_by_email(&email)? {
            info!(email = %email, "admin account already present");
            return Ok(existing.view());
        }

        let now = self.clock.now();
        let profile = UserProfile {
            name: "System".to_string(),
            middle_name: None,
            last_name: "Administrator".to_string(),
            second_last_name: None,
            contact_number: None,
            profile_picture: None,
        };
        let password_hash = self.hasher.hash(&seed.password)?;
        let mut admin = User::registered(email, password_hash, profile, now);
        admin.roles.insert(RoleName::Admin);
        admin.mark_email_verified(now);

        let admin = self.users.insert(admin)?;
        info!(user_id = %admin.id, "seeded admin account");
        Ok(admin.view())
    }
}
