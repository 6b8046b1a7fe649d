use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialState {
    /// Boot-time default, before the existence check resolves.
    Unknown,
    Absent,
    Present,
}

impl CredentialState {
    /// Outcome of the one-time existence check. Only meaningful while `Unknown`.
    pub fn resolved(self, exists: bool) -> Self {
        match self {
            CredentialState::Unknown if exists => CredentialState::Present,
            CredentialState::Unknown => CredentialState::Absent,
            other => other,
        }
    }

    /// A successful user-driven selection. Nothing is selectable before the boot check.
    pub fn selected(self) -> Self {
        match self {
            CredentialState::Unknown => CredentialState::Unknown,
            CredentialState::Absent | CredentialState::Present => CredentialState::Present,
        }
    }

    /// The backend reported the credential (or the resource behind it) as missing.
    pub fn revoked(self) -> Self {
        match self {
            CredentialState::Present => CredentialState::Absent,
            other => other,
        }
    }

    pub fn allows_generation(&self) -> bool {
        matches!(self, CredentialState::Present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_check() {
        assert_eq!(CredentialState::Unknown.resolved(true), CredentialState::Present);
        assert_eq!(CredentialState::Unknown.resolved(false), CredentialState::Absent);
        // a second check does not override later transitions
        assert_eq!(CredentialState::Absent.resolved(true), CredentialState::Absent);
    }

    #[test]
    fn test_selection_and_revocation() {
        assert_eq!(CredentialState::Unknown.selected(), CredentialState::Unknown);
        assert_eq!(CredentialState::Absent.selected(), CredentialState::Present);
        assert_eq!(CredentialState::Present.revoked(), CredentialState::Absent);
        assert_eq!(CredentialState::Unknown.revoked(), CredentialState::Unknown);
    }

    #[test]
    fn test_only_present_allows_generation() {
        assert!(CredentialState::Present.allows_generation());
        assert!(!CredentialState::Absent.allows_generation());
        assert!(!CredentialState::Unknown.allows_generation());
    }
}
