//! On-disk snapshot schema.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use plaza_common::ParticipantId;
use serde::{Deserialize, Serialize};

use crate::participant::Participant;

/// Format tag written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "1";

/// A persisted participant plus the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRecord {
    #[serde(flatten)]
    pub participant: Participant,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    pub last_saved: DateTime<Utc>,
    pub participants: BTreeMap<ParticipantId, ParticipantRecord>,
}

impl Snapshot {
    /// Capture the offline participants among `participants` at `now`.
    pub fn capture<I>(participants: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = Participant>,
    {
        let participants = participants
            .into_iter()
            .filter(|p| !p.online)
            .map(|participant| {
                (
                    participant.id.clone(),
                    ParticipantRecord {
                        participant,
                        saved_at: now,
                    },
                )
            })
            .collect();

        Self {
            version: SNAPSHOT_VERSION.to_string(),
            last_saved: now,
            participants,
        }
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn into_participants(self) -> Vec<Participant> {
        self.participants
            .into_values()
            .map(|record| record.participant)
            .collect()
    }
}
