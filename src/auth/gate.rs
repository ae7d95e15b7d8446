//! Session-presence gate run before command resolution.

use super::session::Session;

/// What a protected domain demands of the caller's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    /// Any logged-in user.
    User,
    /// A logged-in administrator.
    Admin,
}

/// Gate decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied,
}

/// Authorization gate owned by a protected controller.
///
/// Reads the session only; never creates, touches or modifies it.
#[derive(Debug, Clone, Copy)]
pub struct AuthGate {
    requirement: AuthRequirement,
}

impl AuthGate {
    pub fn new(requirement: AuthRequirement) -> Self {
        Self { requirement }
    }

    pub fn requirement(&self) -> AuthRequirement {
        self.requirement
    }

    /// Decide whether the request may proceed.
    pub fn check(&self, session: Option<&Session>) -> Access {
        let Some(session) = session else {
            return Access::Denied;
        };

        let Some(user) = session.user() else {
            return Access::Denied;
        };

        match self.requirement {
            AuthRequirement::User => Access::Allowed,
            AuthRequirement::Admin if user.is_admin && session.is_admin() => Access::Allowed,
            AuthRequirement::Admin => Access::Denied,
        }
    }
}
