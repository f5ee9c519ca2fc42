//! Moving entities that obstruct light.

use umbra_core::math::{Rect, Vec2};

/// An entity that can cast a dynamic shadow.
///
/// Implemented by whatever owns positions, liveness and factions; the
/// lighting engine only reads through this trait.
pub trait Actor {
    /// Stable identity, used to exclude the viewer from its own vision query.
    fn id(&self) -> u64;

    /// World-space bounds.
    fn bounds(&self) -> Rect;

    fn is_dead(&self) -> bool;

    /// Team identifier backing the default friendliness check.
    fn team(&self) -> u32;

    /// Whether this actor is on the same side as `other`.
    fn is_friendly(&self, other: &dyn Actor) -> bool {
        self.team() == other.team()
    }

    fn center(&self) -> Vec2 {
        self.bounds().center()
    }
}

/// Plain actor state, for callers that copy their entities out per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSnapshot {
    pub id: u64,
    pub bounds: Rect,
    pub team: u32,
    pub dead: bool,
}

impl ActorSnapshot {
    pub fn new(id: u64, bounds: Rect, team: u32) -> Self {
        Self {
            id,
            bounds,
            team,
            dead: false,
        }
    }

    pub fn dead(mut self) -> Self {
        self.dead = true;
        self
    }
}

impl Actor for ActorSnapshot {
    fn id(&self) -> u64 {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn team(&self) -> u32 {
        self.team
    }
}
