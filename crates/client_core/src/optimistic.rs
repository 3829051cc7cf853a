//! Two-phase optimistic mutation: `tentative_apply`, then `resolve` with the remote verdict.
//!
//! These are pure functions over [`CommitteeList`]; the controller owns the
//! sequencing against the store and the renderer.

use shared::domain::CommitteeId;

use crate::{error::SkipReason, session::CommitteeList};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Rename { id: CommitteeId, name: String },
}

/// What was changed locally and how to undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMutation {
    pub id: CommitteeId,
    pub index: usize,
    pub previous_name: String,
    pub applied_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Committed,
    RolledBack,
}

pub fn tentative_apply(
    list: &CommitteeList,
    mutation: &Mutation,
) -> Result<(CommitteeList, PendingMutation), SkipReason> {
    match mutation {
        Mutation::Rename { id, name } => {
            let name = name.trim();
            let index = list.position(*id).ok_or(SkipReason::UnknownCommittee)?;
            let previous_name = list
                .at(index)
                .map(|entry| entry.name.clone())
                .ok_or(SkipReason::UnknownCommittee)?;
            if name.is_empty() {
                return Err(SkipReason::EmptyName);
            }
            if name == previous_name {
                return Err(SkipReason::UnchangedName);
            }

            let mut next = list.clone();
            next.rename(*id, name);
            Ok((
                next,
                PendingMutation {
                    id: *id,
                    index,
                    previous_name,
                    applied_name: name.to_string(),
                },
            ))
        }
    }
}

/// Settles a pending mutation. Rolling back touches only the mutated entry and
/// only while it still carries the tentatively applied name.
pub fn resolve(
    list: &CommitteeList,
    pending: &PendingMutation,
    resolution: Resolution,
) -> CommitteeList {
    let mut next = list.clone();
    if resolution == Resolution::RolledBack
        && next
            .get(pending.id)
            .is_some_and(|entry| entry.name == pending.applied_name)
    {
        next.rename(pending.id, &pending.previous_name);
    }
    next
}

#[cfg(test)]
#[path = "tests/optimistic_tests.rs"]
mod tests;
