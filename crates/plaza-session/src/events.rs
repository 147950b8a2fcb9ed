//! Events the server pushes to connected clients.

use std::collections::BTreeMap;

use plaza_common::ParticipantId;
use serde::{Deserialize, Serialize};

use crate::participant::Participant;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Full registry, sent to a connection right after it joins.
    CurrentState {
        participants: BTreeMap<ParticipantId, Participant>,
    },
    ParticipantJoined {
        participant: Participant,
    },
    ParticipantMoved {
        id: ParticipantId,
        x: f64,
        y: f64,
    },
    ParticipantOffline {
        id: ParticipantId,
        name: String,
    },
    /// Final removal after the offline TTL ran out.
    ParticipantLeft {
        id: ParticipantId,
    },
    SessionError {
        message: String,
    },
}

impl ServerEvent {
    /// Wire name, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CurrentState { .. } => "currentState",
            Self::ParticipantJoined { .. } => "participantJoined",
            Self::ParticipantMoved { .. } => "participantMoved",
            Self::ParticipantOffline { .. } => "participantOffline",
            Self::ParticipantLeft { .. } => "participantLeft",
            Self::SessionError { .. } => "sessionError",
        }
    }
}
