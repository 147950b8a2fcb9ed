//! The participant entity and its value types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use plaza_common::ParticipantId;
use serde::{Deserialize, Serialize};

/// World coordinates of a participant's centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewport the client reported when joining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMeta {
    pub width: u32,
    pub height: u32,
}

/// One participant, online or retained offline.
///
/// `disconnected_at` is `Some` exactly when `online` is false. Only the
/// [`Registry`](crate::Registry) mutates participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    #[serde(flatten)]
    pub position: Position,
    pub variant: String,
    /// Footprint edge length.
    pub size: f64,
    pub online: bool,
    pub last_active_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disconnected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_meta: Option<ClientMeta>,
}

impl Participant {
    /// How long this participant has been offline at `now`.
    ///
    /// `None` while online, or if `disconnected_at` lies in the future.
    pub fn offline_for(&self, now: DateTime<Utc>) -> Option<Duration> {
        let since = self.disconnected_at?;
        now.signed_duration_since(since).to_std().ok()
    }

    /// True once the offline duration strictly exceeds `ttl`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        !self.online && self.offline_for(now).is_some_and(|elapsed| elapsed > ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn sample(online: bool, disconnected_at: Option<DateTime<Utc>>) -> Participant {
        Participant {
            id: ParticipantId::from("p1"),
            name: "Ada".into(),
            position: Position::new(10.0, 20.0),
            variant: "#FF6B6B".into(),
            size: 48.0,
            online,
            last_active_at: Utc::now(),
            disconnected_at,
            client_meta: None,
        }
    }

    #[test]
    fn online_participant_never_expires() {
        let p = sample(true, None);
        assert!(!p.is_expired(Utc::now(), Duration::ZERO));
        assert_eq!(p.offline_for(Utc::now()), None);
    }

    #[test]
    fn expiry_is_strictly_after_ttl() {
        let t0 = Utc::now();
        let p = sample(false, Some(t0));
        let ttl = Duration::from_millis(1000);

        assert!(!p.is_expired(t0 + TimeDelta::milliseconds(1000), ttl));
        assert!(p.is_expired(t0 + TimeDelta::milliseconds(1001), ttl));
    }

    #[test]
    fn future_disconnect_is_not_expired() {
        let t0 = Utc::now();
        let p = sample(false, Some(t0 + TimeDelta::seconds(60)));
        assert!(!p.is_expired(t0, Duration::ZERO));
    }

    #[test]
    fn serializes_flat_camel_case() {
        let p = sample(true, None);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["id"], "p1");
        assert_eq!(json["x"], 10.0);
        assert_eq!(json["y"], 20.0);
        assert!(json.get("lastActiveAt").is_some());
        assert!(json.get("disconnectedAt").is_none());
        assert!(json.get("position").is_none());
    }
}
