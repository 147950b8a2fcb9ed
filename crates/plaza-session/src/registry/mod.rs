//! Session registry: the single owner of participant state.
//!
//! All mutation goes through [`Registry::join`], [`Registry::move_by`],
//! [`Registry::disconnect`] and [`Registry::evict`]. The registry itself is
//! synchronous; callers share it behind one lock (see [`crate::World`]) so
//! every operation runs to completion before the next starts.

mod rules;


pub use rules::WorldRules;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use plaza_common::{JoinError, ParticipantId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};

use crate::clock::Clock;
use crate::participant::{ClientMeta, Participant, Position};

/// Result of a successful join.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub participant: Participant,
    /// Every participant in the registry, including the new one, for the
    /// joining client's initial sync.
    pub current_state: BTreeMap<ParticipantId, Participant>,
}

/// Counters from re-admitting persisted participants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreStats {
    pub restored: usize,
    pub expired: usize,
    pub skipped: usize,
}

pub struct Registry {
    rules: WorldRules,
    participants: HashMap<ParticipantId, Participant>,
    rng: Box<dyn RngCore + Send + Sync>,
    clock: Arc<dyn Clock>,
}

impl Registry {
    pub fn new(
        rules: WorldRules,
        rng: Box<dyn RngCore + Send + Sync>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rules,
            participants: HashMap::new(),
            rng,
            clock,
        }
    }

    /// Registry seeded from OS entropy.
    pub fn with_entropy(rules: WorldRules, clock: Arc<dyn Clock>) -> Self {
        Self::new(rules, Box::new(StdRng::from_entropy()), clock)
    }

    pub fn rules(&self) -> &WorldRules {
        &self.rules
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Admit a new participant for connection `id`.
    pub fn join(
        &mut self,
        id: ParticipantId,
        name: &str,
        client_meta: Option<ClientMeta>,
    ) -> Result<JoinOutcome, JoinError> {
        if self.participants.contains_key(&id) {
            return Err(JoinError::AlreadyJoined);
        }

        let occupied = if self.rules.capacity_counts_offline {
            self.participants.len()
        } else {
            self.online_count()
        };
        if occupied >= self.rules.max_participants {
            return Err(JoinError::CapacityExceeded {
                max: self.rules.max_participants,
            });
        }

        let name = self.rules.validate_name(name)?;
        let position = self.spawn_position();
        let variant = self
            .rules
            .variants
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default();

        let participant = Participant {
            id: id.clone(),
            name,
            position,
            variant,
            size: self.rules.participant_size,
            online: true,
            last_active_at: self.clock.now(),
            disconnected_at: None,
            client_meta,
        };
        self.participants.insert(id, participant.clone());

        Ok(JoinOutcome {
            participant,
            current_state: self.snapshot(),
        })
    }

    /// Apply a movement delta. Unknown, offline, or non-finite moves are
    /// ignored and return `None`.
    pub fn move_by(&mut self, id: &ParticipantId, dx: f64, dy: f64) -> Option<Position> {
        if !dx.is_finite() || !dy.is_finite() {
            return None;
        }
        let now = self.clock.now();
        let participant = self.participants.get_mut(id).filter(|p| p.online)?;

        let target = Position::new(participant.position.x + dx, participant.position.y + dy);
        participant.position = self.rules.clamp(target);
        participant.last_active_at = now;
        Some(participant.position)
    }

    /// Mark a participant offline. The entry stays until evicted.
    pub fn disconnect(&mut self, id: &ParticipantId) -> Option<Participant> {
        let now = self.clock.now();
        let participant = self.participants.get_mut(id).filter(|p| p.online)?;
        participant.online = false;
        participant.disconnected_at = Some(now);
        Some(participant.clone())
    }

    /// Mark every online participant offline at the same instant.
    pub fn disconnect_all(&mut self) -> Vec<Participant> {
        let now = self.clock.now();
        let mut disconnected: Vec<Participant> = self
            .participants
            .values_mut()
            .filter(|p| p.online)
            .map(|p| {
                p.online = false;
                p.disconnected_at = Some(now);
                p.clone()
            })
            .collect();
        disconnected.sort_by(|a, b| a.id.cmp(&b.id));
        disconnected
    }

    /// Hard removal.
    pub fn evict(&mut self, id: &ParticipantId) -> Option<Participant> {
        self.participants.remove(id)
    }

    /// Remove every offline participant whose offline time exceeds `ttl`.
    pub fn evict_expired(&mut self, ttl: Duration) -> Vec<Participant> {
        let now = self.clock.now();
        let expired: Vec<ParticipantId> = self
            .participants
            .values()
            .filter(|p| p.is_expired(now, ttl))
            .map(|p| p.id.clone())
            .collect();

        expired.iter().filter_map(|id| self.evict(id)).collect()
    }

    /// Re-insert persisted participants as offline entries.
    ///
    /// Entries already past `ttl`, entries without a disconnect time, and
    /// ids already present are dropped.
    pub fn restore<I>(&mut self, participants: I, ttl: Duration) -> RestoreStats
    where
        I: IntoIterator<Item = Participant>,
    {
        let now = self.clock.now();
        let mut stats = RestoreStats::default();

        for mut participant in participants {
            if participant.disconnected_at.is_none()
                || self.participants.contains_key(&participant.id)
            {
                stats.skipped += 1;
                continue;
            }
            participant.online = false;
            if participant.is_expired(now, ttl) {
                stats.expired += 1;
                continue;
            }
            // World bounds may have changed since the snapshot was taken.
            participant.position = self.rules.clamp(participant.position);
            self.participants.insert(participant.id.clone(), participant);
            stats.restored += 1;
        }

        stats
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.participants.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn online_count(&self) -> usize {
        self.participants.values().filter(|p| p.online).count()
    }

    /// Copies of all offline participants, for snapshotting.
    pub fn offline_participants(&self) -> Vec<Participant> {
        self.participants
            .values()
            .filter(|p| !p.online)
            .cloned()
            .collect()
    }

    /// Copy of the whole registry, ordered by id.
    pub fn snapshot(&self) -> BTreeMap<ParticipantId, Participant> {
        self.participants
            .iter()
            .map(|(id, p)| (id.clone(), p.clone()))
            .collect()
    }

    fn spawn_position(&mut self) -> Position {
        let x = self.spawn_axis(self.rules.width);
        let y = self.spawn_axis(self.rules.height);
        self.rules.clamp(Position::new(x, y))
    }

    fn spawn_axis(&mut self, extent: f64) -> f64 {
        let (lo, hi) = self.rules.spawn_range(extent);
        if lo < hi {
            self.rng.gen_range(lo..=hi)
        } else {
            extent / 2.0
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("rules", &self.rules)
            .field("participants", &self.participants.len())
            .field("online", &self.online_count())
            .finish()
    }
}
