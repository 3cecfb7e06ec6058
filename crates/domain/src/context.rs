//! Request identity context.

use common::UserId;

/// The identity of the caller, injected into every operation.
///
/// The surrounding transport resolves authentication and hands the result in
/// as parameters; nothing in the domain reads caller identity from global
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// The authenticated user.
    pub user_id: UserId,

    /// Whether the caller has admin capabilities.
    pub admin: bool,
}

impl RequestContext {
    /// Context for a regular buyer.
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            admin: false,
        }
    }

    /// Context for an admin-capable caller.
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            admin: true,
        }
    }

    /// Returns true if the caller may read or act on resources owned by
    /// `owner`.
    pub fn can_access(&self, owner: UserId) -> bool {
        self.admin || self.user_id == owner
    }
}
