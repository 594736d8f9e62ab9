use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Placeholder carried by records the store has not numbered yet.
    pub const UNASSIGNED: UserId = UserId(0);
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleName {
    User,
    Seller,
    Admin,
}

impl RoleName {
    pub const fn label(self) -> &'static str {
        match self {
            RoleName::User => "USER",
            RoleName::Seller => "SELLER",
            RoleName::Admin => "ADMIN",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().trim_start_matches("ROLE_").to_ascii_uppercase().as_str() {
            "USER" => Some(RoleName::User),
            "SELLER" => Some(RoleName::Seller),
            "ADMIN" => Some(RoleName::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default)]
    pub second_last_name: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name.trim(), self.last_name.trim())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub profile: UserProfile,
    pub enabled: bool,
    pub email_verified: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub roles: BTreeSet<RoleName>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A freshly registered account: enabled, unverified, holding only USER.
    pub fn registered(
        email: String,
        password_hash: String,
        profile: UserProfile,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::UNASSIGNED,
            email,
            password_hash,
            profile,
            enabled: true,
            email_verified: false,
            email_verified_at: None,
            roles: BTreeSet::from([RoleName::User]),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }

    pub fn mark_email_verified(&mut self, now: DateTime<Utc>) {
        self.email_verified = true;
        self.email_verified_at = Some(now);
        self.updated_at = now;
    }

    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            email: self.email.clone(),
            name: self.profile.name.clone(),
            middle_name: self.profile.middle_name.clone(),
            last_name: self.profile.last_name.clone(),
            second_last_name: self.profile.second_last_name.clone(),
            contact_number: self.profile.contact_number.clone(),
            profile_picture: self.profile.profile_picture.clone(),
            email_verified: self.email_verified,
            roles: self.roles.iter().copied().collect(),
        }
    }
}

/// Public projection of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub second_last_name: Option<String>,
    pub contact_number: Option<String>,
    pub profile_picture: Option<String>,
    pub email_verified: bool,
    pub roles: Vec<RoleName>,
}

/// Normalized form used for lookups and the uniqueness constraint.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_user_starts_unverified_with_user_role() {
        let profile = UserProfile {
            name: "Ana".into(),
            middle_name: None,
            last_name: "Ruiz".into(),
            second_last_name: None,
            contact_number: None,
            profile_picture: None,
        };
        let user = User::registered("a@x.com".into(), "hash".into(), profile, Utc::now());
        assert!(user.enabled);
        assert!(!user.email_verified);
        assert_eq!(user.roles.len(), 1);
        assert!(user.has_role(RoleName::User));
        assert_eq!(user.profile.full_name(), "Ana Ruiz");
    }

    #[test]
    fn view_carries_every_name_part() {
        let profile = UserProfile {
            name: "Maria".into(),
            middle_name: Some("Luisa".into()),
            last_name: "Garcia".into(),
            second_last_name: Some("Lopez".into()),
            contact_number: None,
            profile_picture: None,
        };
        let user = User::registered("m@x.com".into(), "hash".into(), profile, Utc::now());
        let view = user.view();
        assert_eq!(view.middle_name.as_deref(), Some("Luisa"));
        assert_eq!(view.second_last_name.as_deref(), Some("Lopez"));
        assert_eq!(user.profile.full_name(), "Maria Garcia");

        let json = serde_json::to_value(&view).expect("view serializes");
        assert_eq!(json["middleName"], "Luisa");
        assert_eq!(json["secondLastName"], "Lopez");
    }

    #[test]
    fn role_names_parse_with_or_without_prefix() {
        assert_eq!(RoleName::parse("ROLE_SELLER"), Some(RoleName::Seller));
        assert_eq!(RoleName::parse("admin"), Some(RoleName::Admin));
        assert_eq!(RoleName::parse("guest"), None);
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }
}
