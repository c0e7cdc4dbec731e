use std::time::Duration;

use url::Url;

use crate::game::constants::net::{
    MAX_RECONNECT_ATTEMPTS, RECONNECT_BASE_DELAY_MS, RECONNECT_MAX_DELAY_MS, UPDATE_EVERY_N_CALLS,
};

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never connected, or torn down by `disconnect`
    Idle,
    /// Handshake in flight
    Connecting,
    /// Socket open
    Connected,
    /// Dropped unexpectedly, waiting out a backoff delay
    Reconnecting { attempt: u32 },
    /// Reconnect budget exhausted; needs an explicit `connect`
    GaveUp,
}

/// Exponential reconnect backoff: attempt `n` waits `base * 2^n`, capped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(RECONNECT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(RECONNECT_MAX_DELAY_MS),
            max_attempts: MAX_RECONNECT_ATTEMPTS,
        }
    }
}

impl ReconnectPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Delay before 1-based attempt `attempt`, or `None` once the budget
    /// is spent
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        Some(self.base_delay.saturating_mul(factor).min(self.max_delay))
    }
}

/// Lets one in every `every` calls through
#[derive(Debug, Clone)]
pub struct UpdateThrottle {
    every: u32,
    calls: u32,
}

impl Default for UpdateThrottle {
    fn default() -> Self {
        Self::new(UPDATE_EVERY_N_CALLS)
    }
}

impl UpdateThrottle {
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            calls: 0,
        }
    }

    /// Count a call; true on every `every`-th one
    pub fn should_send(&mut self) -> bool {
        self.calls = self.calls.wrapping_add(1);
        self.calls % self.every == 0
    }
}

/// Turn an http(s) base endpoint into the room's ws(s) address. The room
/// goes into the query string percent-encoded; only an empty room is refused.
pub fn room_url(base: &str, room: &str) -> Option<String> {
    if room.is_empty() {
        return None;
    }
    let base = base.trim().trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else if base.starts_with("ws://") || base.starts_with("wss://") {
        base.to_string()
    } else {
        return None;
    };
    let mut url = Url::parse(&format!("{}/ws", ws_base)).ok()?;
    url.query_pairs_mut().append_pair("room", room);
    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_sequence() {
        let policy = ReconnectPolicy::default();
        let delays: Vec<Option<u64>> = (1..=6)
            .map(|n| policy.delay_for(n).map(|d| d.as_secs()))
            .collect();
        assert_eq!(delays, vec![Some(2), Some(4), Some(8), Some(10), Some(10), None]);
    }

    #[test]
    fn test_backoff_zero_attempt() {
        assert_eq!(ReconnectPolicy::default().delay_for(0), None);
    }

    #[test]
    fn test_backoff_large_attempts_saturate() {
        let policy = ReconnectPolicy::with_max_attempts(100);
        assert_eq!(policy.delay_for(64), Some(policy.max_delay));
    }

    #[test]
    fn test_throttle_one_in_three() {
        let mut throttle = UpdateThrottle::default();
        let sent: Vec<bool> = (0..9).map(|_| throttle.should_send()).collect();
        assert_eq!(
            sent,
            vec![false, false, true, false, false, true, false, false, true]
        );
    }

    #[test]
    fn test_throttle_every_one() {
        let mut throttle = UpdateThrottle::new(0);
        assert!(throttle.should_send());
        assert!(throttle.should_send());
    }

    #[test]
    fn test_room_url() {
        assert_eq!(
            room_url("https://game.example.com", "default").as_deref(),
            Some("wss://game.example.com/ws?room=default")
        );
        assert_eq!(
            room_url("http://localhost:8787/", "room-2").as_deref(),
            Some("ws://localhost:8787/ws?room=room-2")
        );
        assert_eq!(
            room_url("ws://127.0.0.1:9001", "a_b").as_deref(),
            Some("ws://127.0.0.1:9001/ws?room=a_b")
        );
        assert_eq!(room_url("ftp://nope", "default"), None);
        assert_eq!(room_url("http://ok", ""), None);
    }

    #[test]
    fn test_room_url_encodes_any_room() {
        assert_eq!(
            room_url("http://h", "eu.lobby").as_deref(),
            Some("ws://h/ws?room=eu.lobby")
        );
        assert_eq!(
            room_url("http://h", "Team 1").as_deref(),
            Some("ws://h/ws?room=Team+1")
        );
        assert_eq!(
            room_url("https://h:8443", "a&b=c#d").as_deref(),
            Some("wss://h:8443/ws?room=a%26b%3Dc%23d")
        );
    }
}
