//! Single-entity cloner.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::Entity;

/// Actor and clock of one duplication request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicationContext {
    pub actor: u64,
    pub now: DateTime<Utc>,
}

impl DuplicationContext {
    /// Context for `actor` at the current time.
    pub fn new(actor: u64) -> Self {
        Self::at(actor, Utc::now())
    }

    /// Context with a fixed clock.
    pub fn at(actor: u64, now: DateTime<Utc>) -> Self {
        Self { actor, now }
    }
}

/// Produces identity-stripped copies of a single entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityCloner;

impl EntityCloner {
    /// Copies every field value of `source` and resets its identity.
    ///
    /// The id and revision id are cleared so storage treats the copy as new,
    /// a fresh UUID is assigned, and owner plus all timestamps are taken from
    /// `ctx`. Nested entities are copied by value but keep their source
    /// identity; the engine replaces them with their own clones.
    pub fn duplicate(&self, source: &Entity, ctx: &DuplicationContext) -> Entity {
        let mut copy = source.clone();

        copy.id = None;
        copy.revision_id = None;
        copy.uuid = Some(Uuid::new_v4());
        copy.owner = Some(ctx.actor);
        copy.created = Some(ctx.now);
        copy.changed = Some(ctx.now);
        copy.revision_timestamp = Some(ctx.now);

        copy
    }
}
