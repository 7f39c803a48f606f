//! Static track catalog
//!
//! The catalog is a read-only reference list of `{id, name}` pairs refreshed
//! out-of-band (the vendor ships it as a JSON file keyed by track id). The
//! session core only consults it for name→id resolution; track existence on
//! the device is never pre-validated against it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::StateError;

/// One drawable pattern known to the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Stable numeric identifier understood by the device
    pub id: u32,
    /// Human-readable label, unique within the catalog
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    name: String,
}

/// Read-only id↔name lookup table
#[derive(Debug, Clone, Default)]
pub struct TrackCatalog {
    by_id: HashMap<u32, String>,
    /// Lowercased name → id, for case-insensitive resolution
    by_name: HashMap<String, u32>,
}

impl TrackCatalog {
    /// Build a catalog from a list of tracks
    pub fn new(tracks: impl IntoIterator<Item = Track>) -> Self {
        let mut catalog = Self::default();
        for track in tracks {
            catalog.by_name.insert(track.name.to_lowercase(), track.id);
            catalog.by_id.insert(track.id, track.name);
        }
        catalog
    }

    /// Parse the vendor catalog format: a JSON object keyed by track id
    pub fn from_json(json: &str) -> Result<Self, StateError> {
        let entries: HashMap<String, CatalogEntry> = serde_json::from_str(json)?;
        let tracks = entries
            .into_iter()
            .map(|(id, entry)| {
                let id = id
                    .parse()
                    .map_err(|_| StateError::Catalog(format!("invalid track id '{id}'")))?;
                Ok(Track {
                    id,
                    name: entry.name,
                })
            })
            .collect::<Result<Vec<_>, StateError>>()?;
        Ok(Self::new(tracks))
    }

    /// Load the catalog from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StateError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Case-insensitive name lookup
    pub fn id_by_name(&self, name: &str) -> Option<u32> {
        self.by_name.get(&name.trim().to_lowercase()).copied()
    }

    /// Name of a track id, if cataloged
    pub fn name(&self, id: u32) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Resolve one user-supplied token to a track id
    ///
    /// A token that parses as an integer is taken as a track id verbatim;
    /// anything else is looked up by name.
    pub fn resolve_token(&self, token: &str) -> Option<u32> {
        token
            .trim()
            .parse()
            .ok()
            .or_else(|| self.id_by_name(token))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> TrackCatalog {
        TrackCatalog::new([
            Track {
                id: 12,
                name: "Turtle".to_string(),
            },
            Track {
                id: 63,
                name: "Spiral Dance".to_string(),
            },
        ])
    }

    #[test]
    fn test_name_lookup_is_case_insensitive() {
        let catalog = catalog();
        assert_eq!(catalog.id_by_name("Turtle"), Some(12));
        assert_eq!(catalog.id_by_name("turtle"), Some(12));
        assert_eq!(catalog.id_by_name("TURTLE"), Some(12));
        assert_eq!(catalog.id_by_name("spiral dance"), Some(63));
        assert_eq!(catalog.id_by_name("doesnotexist"), None);
    }

    #[test]
    fn test_resolve_token_numeric_passes_through() {
        let catalog = catalog();
        // Not in the catalog, still accepted as a literal id
        assert_eq!(catalog.resolve_token("999"), Some(999));
        assert_eq!(catalog.resolve_token(" 63 "), Some(63));
    }

    #[test]
    fn test_resolve_token_by_name() {
        let catalog = catalog();
        assert_eq!(catalog.resolve_token("turtle"), Some(12));
        assert_eq!(catalog.resolve_token("doesnotexist"), None);
    }

    #[test]
    fn test_from_json() {
        let catalog = TrackCatalog::from_json(
            r#"{"12":{"name":"Turtle","image":"turtle.webp"},"63":{"name":"Spiral"}}"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.name(12), Some("Turtle"));
        assert_eq!(catalog.id_by_name("spiral"), Some(63));
    }

    #[test]
    fn test_from_json_rejects_bad_id() {
        let result = TrackCatalog::from_json(r#"{"abc":{"name":"Turtle"}}"#);
        assert!(matches!(result, Err(StateError::Catalog(_))));
    }
}
