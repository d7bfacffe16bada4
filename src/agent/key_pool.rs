use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::KeyPoolError;

/// An API key for the remote model service.
///
/// Cloning is cheap. `Display` and `Debug` print a redacted fingerprint so the
/// secret never reaches the logs; use [`Credential::expose`] to get the key
/// itself.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(Arc<str>);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Arc::from(secret.into()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Last four characters of the key, enough to tell keys apart in logs
    pub fn fingerprint(&self) -> String {
        let tail: Vec<char> = self.0.chars().rev().take(4).collect();
        format!("…{}", tail.into_iter().rev().collect::<String>())
    }
}

impl From<&str> for Credential {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl From<String> for Credential {
    fn from(secret: String) -> Self {
        Self::new(secret)
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fingerprint())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.fingerprint())
    }
}

#[derive(Debug, Clone, Copy)]
enum KeyState {
    Available,
    Exhausted { since: Instant },
}

#[derive(Debug)]
struct Slot {
    credential: Credential,
    state: KeyState,
}

#[derive(Debug)]
struct PoolState {
    slots: Vec<Slot>,
    /// Index of the slot the next rotation starts from
    cursor: usize,
}

/// Rotating registry of credentials with exhaustion tracking.
///
/// `next` hands out credentials round-robin, skipping exhausted ones. When
/// every credential is exhausted it still returns the next one in rotation
/// order: quota errors are often per-minute, so attempting a call beats
/// refusing outright. Callers must handle the resulting failure.
///
/// All state sits behind one mutex, so each `next` and `mark_exhausted` call
/// is atomic. No lock is held across calls.
#[derive(Debug)]
pub struct KeyPool {
    state: Mutex<PoolState>,
    cooldown: Option<Duration>,
}

impl KeyPool {
    /// Build a pool from an ordered list of credentials.
    ///
    /// Duplicates are collapsed, keeping the first position.
    pub fn new(credentials: impl IntoIterator<Item = Credential>) -> Result<Self, KeyPoolError> {
        let mut slots: Vec<Slot> = Vec::new();
        for credential in credentials {
            if slots.iter().any(|s| s.credential == credential) {
                continue;
            }
            slots.push(Slot {
                credential,
                state: KeyState::Available,
            });
        }

        if slots.is_empty() {
            return Err(KeyPoolError::Empty);
        }

        info!("Initialized key pool with {} credentials", slots.len());
        Ok(Self {
            state: Mutex::new(PoolState { slots, cursor: 0 }),
            cooldown: None,
        })
    }

    /// Let exhausted credentials recover once `cooldown` has elapsed.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Select the next credential.
    pub fn next(&self) -> Credential {
        let mut state = self.lock();
        let total = state.slots.len();
        let start = state.cursor;

        for offset in 0..total {
            let idx = (start + offset) % total;
            if self.refresh(&mut state.slots[idx]) {
                state.cursor = (idx + 1) % total;
                let credential = state.slots[idx].credential.clone();
                debug!(key = %credential, index = idx, "Round-robin selected key");
                return credential;
            }
        }

        // Degraded mode: everything is exhausted.
        state.cursor = (start + 1) % total;
        let credential = state.slots[start].credential.clone();
        warn!(key = %credential, "All keys exhausted, reusing key in rotation order");
        credential
    }

    /// Returns whether the slot is usable, flipping it back to available when
    /// its cooldown has run out.
    fn refresh(&self, slot: &mut Slot) -> bool {
        match slot.state {
            KeyState::Available => true,
            KeyState::Exhausted { since } => match self.cooldown {
                Some(cooldown) if since.elapsed() >= cooldown => {
                    debug!(key = %slot.credential, "Key cooldown elapsed");
                    slot.state = KeyState::Available;
                    true
                }
                _ => false,
            },
        }
    }

    /// Mark a credential exhausted. Idempotent; the cursor is left alone.
    pub fn mark_exhausted(&self, credential: &Credential) {
        let mut state = self.lock();
        match state.slots.iter_mut().find(|s| &s.credential == credential) {
            Some(slot) => {
                if let KeyState::Available = slot.state {
                    slot.state = KeyState::Exhausted {
                        since: Instant::now(),
                    };
                    warn!(key = %credential, "Marked key as exhausted");
                }
            }
            None => warn!(key = %credential, "Tried to mark unknown key as exhausted"),
        }
    }

    /// Make an exhausted credential available again
    pub fn reset(&self, credential: &Credential) {
        let mut state = self.lock();
        if let Some(slot) = state.slots.iter_mut().find(|s| &s.credential == credential) {
            slot.state = KeyState::Available;
            info!(key = %credential, "Reset key");
        }
    }

    pub fn reset_all(&self) {
        let mut state = self.lock();
        for slot in state.slots.iter_mut() {
            slot.state = KeyState::Available;
        }
        info!("Reset all keys");
    }

    pub fn is_exhausted(&self, credential: &Credential) -> bool {
        let mut state = self.lock();
        state
            .slots
            .iter_mut()
            .find(|s| &s.credential == credential)
            .map(|slot| !self.refresh(slot))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    /// Never true; a pool cannot be built empty.
    pub fn is_empty(&self) -> bool {
        self.lock().slots.is_empty()
    }

    pub fn available_count(&self) -> usize {
        let mut state = self.lock();
        let mut count = 0;
        for slot in state.slots.iter_mut() {
            if self.refresh(slot) {
                count += 1;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_hides_secret() {
        let key = Credential::new("gsk_supersecret_abcd");
        assert_eq!(key.fingerprint(), "…abcd");
        assert_eq!(format!("{key:?}"), "Credential(…abcd)");
        assert!(!format!("{key}").contains("supersecret"));
    }

    #[test]
    fn short_keys_fingerprint_whole() {
        assert_eq!(Credential::new("ab").fingerprint(), "…ab");
    }

    #[test]
    fn zero_cooldown_recovers_immediately() {
        let pool = KeyPool::new([Credential::from("a"), Credential::from("b")])
            .unwrap()
            .with_cooldown(Duration::ZERO);
        let a = Credential::from("a");
        pool.mark_exhausted(&a);
        assert!(!pool.is_exhausted(&a));
        assert_eq!(pool.available_count(), 2);
    }
}
