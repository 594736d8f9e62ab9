use serde::Serialize;
use std::collections::BTreeSet;

use super::domain::{RoleName, User, UserId};
use crate::workflows::error::WorkflowError;

/// The authenticated caller, passed explicitly into every workflow call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub roles: BTreeSet<RoleName>,
}

impl Principal {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            roles: user.roles.clone(),
        }
    }

    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(RoleName::Admin)
    }

    pub fn require_role(&self, role: RoleName) -> Result<(), WorkflowError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(WorkflowError::forbidden(format!(
                "{} role required for this operation",
                role.label()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(roles: &[RoleName]) -> Principal {
        Principal {
            user_id: UserId(3),
            email: "p@x.com".into(),
            roles: roles.iter().copied().collect(),
        }
    }

    #[test]
    fn require_role_rejects_missing_role() {
        let caller = principal(&[RoleName::User]);
        assert!(caller.require_role(RoleName::User).is_ok());
        match caller.require_role(RoleName::Admin) {
            Err(WorkflowError::Forbidden(message)) => assert!(message.contains("ADMIN")),
            other => panic!("expected forbidden, got {other:?}"),
        }
        assert!(!caller.is_admin());
    }
}
