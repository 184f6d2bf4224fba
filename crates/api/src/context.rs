use supplyline_auth::Role;
use supplyline_core::UserId;

/// Authenticated caller for a request.
///
/// Resolved once by the middleware and threaded explicitly into handlers
/// that record who did what; never read from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    user_id: UserId,
    email: String,
    role: Role,
}

impl AuthContext {
    pub fn new(user_id: UserId, email: String, role: Role) -> Self {
        Self {
            user_id,
            email,
            role,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }
}
