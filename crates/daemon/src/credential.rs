use engine::CredentialState;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// Backend API key, threaded explicitly into every adapter call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Arc<str>);

impl Credential {
    /// `None` for a blank key.
    pub fn new(key: &str) -> Option<Self> {
        let key = key.trim();
        if key.is_empty() {
            None
        } else {
            Some(Credential(Arc::from(key)))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

struct GateInner {
    state: CredentialState,
    credential: Option<Credential>,
}

/// Tracks whether a usable credential is selected and hands it out only while Present.
pub struct CredentialGate {
    inner: Mutex<GateInner>,
}

impl Default for CredentialGate {
    fn default() -> Self {
        CredentialGate::new()
    }
}

impl CredentialGate {
    pub fn new() -> Self {
        CredentialGate {
            inner: Mutex::new(GateInner {
                state: CredentialState::Unknown,
                credential: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> CredentialState {
        self.lock().state
    }

    /// One-time boot check. Later calls are ignored once the state left Unknown.
    pub fn resolve_existence(&self, discovered: Option<Credential>) -> CredentialState {
        let mut inner = self.lock();
        if inner.state != CredentialState::Unknown {
            return inner.state;
        }
        inner.state = inner.state.resolved(discovered.is_some());
        inner.credential = discovered;
        info!("[Gate] Credential check resolved: {:?}", inner.state);
        inner.state
    }

    /// User-driven selection. A blank or missing key is a cancelled selection:
    /// it is logged and the state is left as it was.
    pub fn select(&self, key: Option<&str>) -> CredentialState {
        let mut inner = self.lock();
        if inner.state == CredentialState::Unknown {
            warn!("[Gate] Selection attempted before the credential check resolved");
            return inner.state;
        }
        match key.and_then(Credential::new) {
            Some(credential) => {
                inner.state = inner.state.selected();
                inner.credential = Some(credential);
                info!("[Gate] Credential selected");
            }
            None => {
                warn!("[Gate] Credential selection cancelled; state unchanged");
            }
        }
        inner.state
    }

    /// The credential, if one is Present; otherwise the current state.
    pub fn credential(&self) -> Result<Credential, CredentialState> {
        let inner = self.lock();
        match (&inner.state, &inner.credential) {
            (CredentialState::Present, Some(credential)) => Ok(credential.clone()),
            (state, _) => Err(*state),
        }
    }

    /// Present -> Absent after the backend reported the credential missing.
    pub fn revoke(&self) -> CredentialState {
        let mut inner = self.lock();
        inner.state = inner.state.revoked();
        if inner.state == CredentialState::Absent {
            inner.credential = None;
        }
        warn!("[Gate] Credential revoked; re-selection required");
        inner.state
    }

    /// Revokes only while `stale` is still the selected credential. A key chosen
    /// after `stale` was handed out survives.
    pub fn revoke_if(&self, stale: &Credential) -> CredentialState {
        let current = self.lock().credential.clone();
        if current.as_ref() == Some(stale) {
            self.revoke()
        } else {
            info!("[Gate] Rejected credential already replaced; keeping the new selection");
            self.state()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_no_credential() {
        assert!(Credential::new("   ").is_none());
        assert_eq!(Credential::new(" abc ").unwrap().expose(), "abc");
        assert!(!format!("{:?}", Credential::new("secret").unwrap()).contains("secret"));
    }

    #[test]
    fn test_gate_blocks_until_resolved() {
        let gate = CredentialGate::new();
        assert_eq!(gate.credential(), Err(CredentialState::Unknown));
        assert_eq!(gate.select(Some("key")), CredentialState::Unknown);

        assert_eq!(gate.resolve_existence(None), CredentialState::Absent);
        assert_eq!(gate.credential(), Err(CredentialState::Absent));
    }

    #[test]
    fn test_boot_check_runs_once() {
        let gate = CredentialGate::new();
        gate.resolve_existence(Credential::new("env-key"));
        assert_eq!(gate.state(), CredentialState::Present);
        assert_eq!(gate.resolve_existence(None), CredentialState::Present);
        assert_eq!(gate.credential().unwrap().expose(), "env-key");
    }

    #[test]
    fn test_cancelled_selection_keeps_state() {
        let gate = CredentialGate::new();
        gate.resolve_existence(None);
        assert_eq!(gate.select(None), CredentialState::Absent);
        assert_eq!(gate.select(Some("")), CredentialState::Absent);
        assert_eq!(gate.select(Some("picked")), CredentialState::Present);
        assert_eq!(gate.credential().unwrap().expose(), "picked");
    }

    #[test]
    fn test_revoke_forces_reselection() {
        let gate = CredentialGate::new();
        gate.resolve_existence(Credential::new("stale"));
        assert_eq!(gate.revoke(), CredentialState::Absent);
        assert_eq!(gate.credential(), Err(CredentialState::Absent));

        gate.select(Some("fresh"));
        assert_eq!(gate.credential().unwrap().expose(), "fresh");
    }

    #[test]
    fn test_revoke_if_spares_a_newer_selection() {
        let gate = CredentialGate::new();
        gate.resolve_existence(Credential::new("old"));
        let handed_out = gate.credential().unwrap();

        gate.select(Some("new"));
        assert_eq!(gate.revoke_if(&handed_out), CredentialState::Present);
        assert_eq!(gate.credential().unwrap().expose(), "new");

        let current = gate.credential().unwrap();
        assert_eq!(gate.revoke_if(&current), CredentialState::Absent);
    }
}
