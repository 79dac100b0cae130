use crate::error::RosterError;
use mixlink_core::{Participant, UserId};
use std::collections::HashMap;

/// The set of known room participants.
///
/// Pure data structure: all mutation happens on the controller's single
/// dispatch path, so there is no interior locking.
#[derive(Debug, Default)]
pub struct Roster {
    participants: HashMap<UserId, Participant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the roster wholesale. Used once, on room entry.
    pub fn apply_snapshot(&mut self, participants: Vec<Participant>) {
        self.participants = participants.into_iter().map(|p| (p.id, p)).collect();
    }

    /// Add one participant. A duplicate id keeps the existing entry and
    /// reports the collision; join events are idempotent.
    pub fn add(&mut self, participant: Participant) -> Result<(), RosterError> {
        let id = participant.id;
        if self.participants.contains_key(&id) {
            return Err(RosterError::DuplicateParticipant(id));
        }
        self.participants.insert(id, participant);
        Ok(())
    }

    /// Remove one participant. Absent ids are reported so the caller can
    /// warn, nothing more.
    pub fn remove(&mut self, id: UserId) -> Result<Participant, RosterError> {
        self.participants
            .remove(&id)
            .ok_or(RosterError::UnknownParticipant(id))
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.participants.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.participants.keys().copied().collect();
        ids.sort();
        ids
    }
}
