//! Status enumeration contract with explicit transition tables.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Closed lifecycle enumeration of one record kind.
///
/// # Invariants
/// - `ALL` lists every variant once, in dashboard display order.
/// - `as_str` matches the serde representation.
/// - A status never lists itself in `allowed_next`.
pub trait Status: Copy + Eq + Hash + Debug + Serialize + DeserializeOwned + 'static {
    const ALL: &'static [Self];

    /// Status assigned to freshly created records.
    fn initial() -> Self;

    /// Stable storage string.
    fn as_str(self) -> &'static str;

    /// Human-readable dashboard label.
    fn label(self) -> &'static str;

    /// Statuses reachable in one transition from `self`.
    fn allowed_next(self) -> &'static [Self];

    fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next().contains(&next)
    }

    fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }

    /// Resolves a storage string or label (label match is case-insensitive).
    fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim();
        Self::ALL.iter().copied().find(|status| {
            status.as_str() == normalized || status.label().eq_ignore_ascii_case(normalized)
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::Status;

    /// Shared table checks run by every status enum's tests.
    pub(crate) fn assert_table_is_well_formed<S: Status>() {
        assert!(S::ALL.contains(&S::initial()));
        for status in S::ALL {
            assert!(
                !status.allowed_next().contains(status),
                "{status:?} must not transition to itself"
            );
            assert_eq!(S::parse(status.as_str()), Some(*status));
            assert_eq!(S::parse(&status.label().to_ascii_uppercase()), Some(*status));
            let encoded = serde_json::to_string(status).expect("status should serialize");
            assert_eq!(encoded, format!("\"{}\"", status.as_str()));
        }
        assert_eq!(S::parse("no such status"), None);
    }
}
