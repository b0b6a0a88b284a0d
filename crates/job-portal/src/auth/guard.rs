use crate::directory::UserId;

/// Ownership predicate consulted before records are exposed or mutated.
///
/// The guard only answers the question; callers decide which error to raise.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationGuard;

impl AuthorizationGuard {
    pub fn owns_resource(identity_id: &UserId, resource_owner_id: &UserId) -> bool {
        identity_id == resource_owner_id
    }
}

/// Raised by callers when [`AuthorizationGuard::owns_resource`] says no.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{identity} is not permitted to {action}")]
pub struct AuthorizationError {
    pub identity: UserId,
    pub action: &'static str,
}
