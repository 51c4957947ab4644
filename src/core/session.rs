//! In-memory access token holder.
//!
//! The token lives in memory; an optional persistence hook mirrors every
//! change (e.g. to localStorage). Server-issued rotations only apply while a
//! token is held, so a late `x-new-token` header cannot sign a user back in.

use std::sync::{Arc, RwLock};

/// Called with the new token (or `None` when cleared).
pub type PersistHook = Arc<dyn Fn(Option<&str>) + Send + Sync>;

#[derive(Default)]
struct Slot {
    token: Option<String>,
    persist: Option<PersistHook>,
}

/// Shared, cloneable session token.
#[derive(Clone, Default)]
pub struct SessionToken {
    slot: Arc<RwLock<Slot>>,
}

impl SessionToken {
    pub fn get(&self) -> Option<String> {
        self.read(|slot| slot.token.clone())
    }

    pub fn is_present(&self) -> bool {
        self.read(|slot| slot.token.is_some())
    }

    /// Replace the token and run the persistence hook.
    pub fn set(&self, token: Option<String>) {
        let hook = self.write(|slot| {
            slot.token = token.clone();
            slot.persist.clone()
        });
        if let Some(hook) = hook {
            hook(token.as_deref());
        }
    }

    /// Apply a server-issued rotation. Returns `false` (and does nothing)
    /// when no token is held or the value is unchanged.
    pub fn rotate(&self, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() {
            return false;
        }
        let rotated = self.write(|slot| match &slot.token {
            Some(current) if current != token => {
                slot.token = Some(token.to_string());
                Some(slot.persist.clone())
            }
            _ => None,
        });
        match rotated {
            Some(hook) => {
                if let Some(hook) = hook {
                    hook(Some(token));
                }
                true
            }
            None => false,
        }
    }

    /// Replace the token without running the persistence hook.
    ///
    /// Used when the change originated from storage itself (another tab).
    pub fn set_quiet(&self, token: Option<String>) {
        self.write(|slot| slot.token = token);
    }

    pub fn set_persist_hook(&self, hook: impl Fn(Option<&str>) + Send + Sync + 'static) {
        self.write(|slot| slot.persist = Some(Arc::new(hook)));
    }

    fn read<R>(&self, f: impl FnOnce(&Slot) -> R) -> R {
        let slot = self.slot.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&slot)
    }

    fn write<R>(&self, f: impl FnOnce(&mut Slot) -> R) -> R {
        let mut slot = self.slot.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut slot)
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("present", &self.is_present())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_set_and_clear() {
        let session = SessionToken::default();
        assert_eq!(session.get(), None);
        session.set(Some("abc".into()));
        assert_eq!(session.get().as_deref(), Some("abc"));
        session.set(None);
        assert!(!session.is_present());
    }

    #[test]
    fn test_rotate_requires_token() {
        let session = SessionToken::default();
        assert!(!session.rotate("new"));
        assert_eq!(session.get(), None);

        session.set(Some("old".into()));
        assert!(session.rotate("new"));
        assert_eq!(session.get().as_deref(), Some("new"));
        assert!(!session.rotate("new"));
        assert!(!session.rotate("   "));
    }

    #[test]
    fn test_persist_hook_mirrors_changes() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let session = SessionToken::default();
        session.set_persist_hook(move |token| {
            sink.lock().unwrap().push(token.map(str::to_string));
        });

        session.set(Some("a".into()));
        session.rotate("b");
        session.set_quiet(Some("c".into()));
        session.set(None);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Some("a".to_string()), Some("b".to_string()), None]
        );
    }
}
