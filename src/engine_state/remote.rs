//! Other players, as reported by the host's network layer.
//!
//! Remote entities are display-only. The engine stores whatever the transport last said
//! about them and never feeds them back into collision or interaction.

use std::collections::BTreeMap;

use log::debug;
use serde::Deserialize;

/// Last known state of a remote entity.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RemoteEntityState {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub name: Option<String>,
}

impl RemoteEntityState {
    /// Name shown above the entity.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Player")
    }
}

/// Remote entities keyed by their network id. Iteration is in id order so drawing is
/// stable between frames.
#[derive(Debug, Default)]
pub struct RemoteEntities {
    entities: BTreeMap<String, RemoteEntityState>,
}

impl RemoteEntities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the latest state of `id`. Updates with a non-finite position are dropped.
    pub fn update(&mut self, id: &str, state: RemoteEntityState) {
        if !(state.x.is_finite() && state.y.is_finite()) {
            debug!("Dropping non-finite update for remote entity {}", id);
            return;
        }
        self.entities.insert(id.to_string(), state);
    }

    pub fn remove(&mut self, id: &str) -> Option<RemoteEntityState> {
        self.entities.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&RemoteEntityState> {
        self.entities.get(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RemoteEntityState)> {
        self.entities.iter().map(|(id, state)| (id.as_str(), state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_replace_and_remove() {
        let mut remotes = RemoteEntities::new();
        let state: RemoteEntityState = serde_json::from_str(r#"{ "x": 10.0, "y": -4.5 }"#).unwrap();
        assert_eq!(state.display_name(), "Player");

        remotes.update("b", state);
        remotes.update(
            "a",
            RemoteEntityState {
                x: 1.0,
                y: 2.0,
                name: Some("ana".to_string()),
            },
        );
        remotes.update(
            "b",
            RemoteEntityState {
                x: 11.0,
                y: -4.5,
                name: None,
            },
        );
        assert_eq!(remotes.len(), 2);
        assert_eq!(remotes.get("b").map(|s| s.x), Some(11.0));
        assert_eq!(remotes.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec!["a", "b"]);

        assert!(remotes.remove("a").is_some());
        assert!(remotes.remove("a").is_none());
        assert_eq!(remotes.len(), 1);
    }

    #[test]
    fn non_finite_updates_are_ignored() {
        let mut remotes = RemoteEntities::new();
        remotes.update(
            "x",
            RemoteEntityState {
                x: f32::NAN,
                y: 0.0,
                name: None,
            },
        );
        assert!(remotes.is_empty());
    }
}
