use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Room labels offered when no catalog is configured.
pub const DEFAULT_ROOM_LABELS: [&str; 5] = ["Room 01", "Room 02", "Room 03", "Room 04", "Room 05"];

/// A room label that was accepted by a [`RoomCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomNo(String);

impl RoomNo {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wraps a label read back from storage, where it was validated on the way in.
    pub fn from_stored(label: String) -> Self {
        Self(label)
    }
}

impl fmt::Display for RoomNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed set of room labels a landlord can assign tenants to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomCatalog {
    labels: Vec<String>,
}

impl RoomCatalog {
    pub fn new<I, S>(labels: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into().trim().to_string();
            if label.is_empty() {
                return Err(CoreError::Configuration("Room label cannot be empty".into()));
            }
            if seen.contains(&label) {
                return Err(CoreError::Configuration(format!(
                    "Duplicate room label: {}",
                    label
                )));
            }
            seen.push(label);
        }
        if seen.is_empty() {
            return Err(CoreError::Configuration(
                "At least one room label is required".into(),
            ));
        }
        Ok(Self { labels: seen })
    }

    pub fn parse(&self, label: &str) -> Result<RoomNo, CoreError> {
        let label = label.trim();
        self.labels
            .iter()
            .find(|known| known.as_str() == label)
            .map(|known| RoomNo(known.clone()))
            .ok_or_else(|| CoreError::Validation(format!("Unknown room: {}", label)))
    }

    pub fn rooms(&self) -> impl Iterator<Item = RoomNo> + '_ {
        self.labels.iter().cloned().map(RoomNo)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for RoomCatalog {
    fn default() -> Self {
        Self {
            labels: DEFAULT_ROOM_LABELS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_five_rooms() {
        let catalog = RoomCatalog::default();
        assert_eq!(catalog.len(), 5);
        let labels: Vec<String> = catalog.rooms().map(|r| r.to_string()).collect();
        assert_eq!(labels.first().map(String::as_str), Some("Room 01"));
        assert_eq!(labels.last().map(String::as_str), Some("Room 05"));
    }

    #[test]
    fn parse_accepts_known_label_and_trims() {
        let catalog = RoomCatalog::default();
        let room = catalog.parse("  Room 02 ").unwrap();
        assert_eq!(room.as_str(), "Room 02");
    }

    #[test]
    fn parse_rejects_unknown_label() {
        let catalog = RoomCatalog::default();
        match catalog.parse("Room 99") {
            Err(CoreError::Validation(msg)) => assert!(msg.contains("Room 99")),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn new_rejects_empty_and_duplicate_labels() {
        assert!(matches!(
            RoomCatalog::new(Vec::<String>::new()),
            Err(CoreError::Configuration(_))
        ));
        assert!(matches!(
            RoomCatalog::new(["A", " "]),
            Err(CoreError::Configuration(_))
        ));
        assert!(matches!(
            RoomCatalog::new(["A", "A"]),
            Err(CoreError::Configuration(_))
        ));
    }

    #[test]
    fn custom_catalog_only_accepts_its_labels() {
        let catalog = RoomCatalog::new(["Annex A", "Annex B"]).unwrap();
        assert!(catalog.parse("Annex B").is_ok());
        assert!(catalog.parse("Room 01").is_err());
    }
}
