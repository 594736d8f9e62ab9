//! Registration, email verification, login and session tokens.

pub mod credentials;
pub mod domain;
pub mod guard;
pub mod mail;
pub mod repository;
pub mod router;
pub mod service;
pub mod tokens;
pub mod verification;

pub use credentials::{
    CredentialVerifier, HashError, PasswordCredentialVerifier, PasswordHasher,
};
pub use domain::{
    AuthResponse, EmailVerificationToken, LoginRequest, MessageResponse, RefreshToken,
    RegisterRequest, RegistrationResponse,
};
pub use guard::Authenticator;
pub use mail::{MailError, MailTemplates, Mailer, OutgoingMail};
pub use repository::{RefreshTokenRepository, VerificationTokenRepository};
pub use router::auth_router;
pub use service::AuthService;
pub use tokens::{AccessToken, JwtTokenIssuer, TokenClaims, TokenError, TokenIssuer};
pub use verification::EmailVerificationService;
