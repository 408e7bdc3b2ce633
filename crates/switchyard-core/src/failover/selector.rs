use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

use super::{candidate::Ranked, errors::SelectionError};

/// Ordering policy applied to the enabled candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionPolicy {
    /// Ascending priority, ties kept in insertion order.
    #[default]
    Priority,
    /// Insertion order. No rotation state is carried between calls.
    RoundRobin,
    /// Uniformly shuffled.
    Random,
}

impl SelectionPolicy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::RoundRobin => "round-robin",
            Self::Random => "random",
        }
    }

    /// Parses a policy name. Unknown names fall back to [`SelectionPolicy::Priority`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "round-robin" | "round_robin" | "roundrobin" => Self::RoundRobin,
            "random" => Self::Random,
            _ => Self::Priority,
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionPolicy {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl Serialize for SelectionPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SelectionPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_name(&raw))
    }
}

/// Orders the enabled subset of `items` according to `policy`.
///
/// # Errors
///
/// Returns [`SelectionError::EmptyCandidateSet`] if no item is enabled.
pub fn select<T: Ranked + Clone>(
    items: &[T],
    policy: SelectionPolicy,
) -> Result<Vec<T>, SelectionError> {
    let mut enabled: Vec<T> = items.iter().filter(|item| item.is_enabled()).cloned().collect();

    if enabled.is_empty() {
        return Err(SelectionError::EmptyCandidateSet);
    }

    match policy {
        // sort_by_key is stable: equal priorities keep insertion order
        SelectionPolicy::Priority => enabled.sort_by_key(|item| item.priority()),
        SelectionPolicy::RoundRobin => {}
        SelectionPolicy::Random => enabled.shuffle(&mut rand::rng()),
    }

    tracing::trace!(policy = %policy, candidates = enabled.len(), "candidates ordered");
    Ok(enabled)
}

/// Returns the enabled item with the lowest priority (first inserted on ties).
#[must_use]
pub fn first_by_priority<T: Ranked>(items: &[T]) -> Option<&T> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_enabled())
        .min_by_key(|(index, item)| (item.priority(), *index))
        .map(|(_, item)| item)
}
