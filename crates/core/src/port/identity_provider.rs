// Identity Provider Port

use crate::domain::Participant;

/// Supplies the participant issuing the current call
pub trait IdentityProvider: Send + Sync {
    /// None when the host has no signed-in user
    fn current_participant(&self) -> Option<Participant>;
}

/// Fixed identity (CLI flags, tests)
pub struct StaticIdentityProvider {
    participant: Participant,
}

impl StaticIdentityProvider {
    pub fn new(participant: Participant) -> Self {
        Self { participant }
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn current_participant(&self) -> Option<Participant> {
        Some(self.participant.clone())
    }
}

/// No signed-in user
pub struct AnonymousIdentityProvider;

impl IdentityProvider for AnonymousIdentityProvider {
    fn current_participant(&self) -> Option<Participant> {
        None
    }
}
