//! In-process guard against duplicate concurrent ticket creation.
//!
//! Holds the set of users whose ticket channel is currently being
//! provisioned. The mapping store's uniqueness constraint remains the
//! authority; this guard only stops a burst of messages from one user from
//! provisioning several channels before the first mapping lands.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::foundation::UserId;

/// Set of users with a creation in flight.
///
/// Cheap to clone; clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct CreationGuard {
    in_flight: Arc<Mutex<HashSet<UserId>>>,
}

impl CreationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically marks `user_id` as mid-creation.
    ///
    /// Returns `None` if a creation for this user is already in flight.
    /// The returned permit releases the user when dropped.
    pub fn try_acquire(&self, user_id: UserId) -> Option<CreationPermit> {
        if self.lock().insert(user_id) {
            Some(CreationPermit {
                guard: self.clone(),
                user_id,
            })
        } else {
            None
        }
    }

    /// Releases `user_id`. Releasing a user that is not held is a no-op.
    pub fn release(&self, user_id: UserId) {
        self.lock().remove(&user_id);
    }

    pub fn is_in_flight(&self, user_id: UserId) -> bool {
        self.lock().contains(&user_id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.lock().len()
    }

    // Never held across an await. The set is valid after any panic.
    fn lock(&self) -> MutexGuard<'_, HashSet<UserId>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Proof that the holder is the only creator for one user.
///
/// Dropping the permit releases the user on every exit path.
#[derive(Debug)]
#[must_use = "dropping the permit immediately releases the user"]
pub struct CreationPermit {
    guard: CreationGuard,
    user_id: UserId,
}

impl CreationPermit {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

impl Drop for CreationPermit {
    fn drop(&mut self) {
        self.guard.release(self.user_id);
    }
}
