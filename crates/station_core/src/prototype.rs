//! Entity prototypes — named component recipes for spawning.
//!
//! A prototype declares which families a spawned entity carries and the
//! initial values of their networked fields. Prototype documents are JSON
//! arrays, loaded into a [`PrototypeRegistry`] at startup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::family::ComponentFamily;
use crate::state::ComponentState;

/// Errors raised while loading prototype documents.
#[derive(Debug, Error)]
pub enum PrototypeError {
    /// The document is not valid JSON or does not match the schema.
    #[error("failed to parse prototype document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two prototypes share a name.
    #[error("duplicate prototype name: {0}")]
    Duplicate(String),
}

/// One component declared by a prototype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// The family to instantiate.
    pub family: ComponentFamily,
    /// Initial values for the networked fields, applied on spawn. `None`
    /// keeps the component's defaults.
    #[serde(default)]
    pub initial: Option<ComponentState>,
}

/// A named recipe for spawning an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityPrototype {
    /// Unique prototype name (e.g. `"crate"`, `"wall_lamp"`).
    pub name: String,
    /// Components to attach, in declaration order.
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}

/// Registry of all known prototypes, keyed by name.
#[derive(Debug, Default)]
pub struct PrototypeRegistry {
    prototypes: HashMap<String, EntityPrototype>,
}

impl PrototypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prototypes: HashMap::new(),
        }
    }

    /// Register a prototype.
    ///
    /// # Errors
    ///
    /// Returns [`PrototypeError::Duplicate`] if the name is already taken.
    pub fn insert(&mut self, prototype: EntityPrototype) -> Result<(), PrototypeError> {
        if self.prototypes.contains_key(&prototype.name) {
            return Err(PrototypeError::Duplicate(prototype.name));
        }
        self.prototypes.insert(prototype.name.clone(), prototype);
        Ok(())
    }

    /// Parse a JSON document (an array of prototypes) and register every
    /// entry. Returns the number of prototypes loaded.
    ///
    /// # Errors
    ///
    /// Returns [`PrototypeError::Parse`] on malformed JSON and
    /// [`PrototypeError::Duplicate`] on a name collision.
    pub fn load_json(&mut self, document: &str) -> Result<usize, PrototypeError> {
        let prototypes: Vec<EntityPrototype> = serde_json::from_str(document)?;
        let count = prototypes.len();
        for prototype in prototypes {
            self.insert(prototype)?;
        }
        Ok(count)
    }

    /// Look up a prototype by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&EntityPrototype> {
        self.prototypes.get(name)
    }

    /// Returns the number of registered prototypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    /// Returns `true` if no prototypes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"[
        {
            "name": "crate",
            "components": [
                { "family": "Transform",
                  "initial": { "Transform": { "position": [1.0, 2.0], "rotation": 0.0 } } },
                { "family": "Collidable" }
            ]
        },
        { "name": "marker", "components": [ { "family": "Transform" } ] }
    ]"#;

    #[test]
    fn test_load_json_document() {
        let mut registry = PrototypeRegistry::new();
        let count = registry.load_json(DOC).unwrap();
        assert_eq!(count, 2);

        let proto = registry.get("crate").unwrap();
        assert_eq!(proto.components.len(), 2);
        assert_eq!(proto.components[0].family, ComponentFamily::Transform);
        assert!(proto.components[0].initial.is_some());
        assert!(proto.components[1].initial.is_none());
    }

    #[test]
    fn test_unknown_prototype_is_none() {
        let registry = PrototypeRegistry::new();
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = PrototypeRegistry::new();
        registry
            .insert(EntityPrototype {
                name: "crate".to_string(),
                components: Vec::new(),
            })
            .unwrap();
        let err = registry
            .insert(EntityPrototype {
                name: "crate".to_string(),
                components: Vec::new(),
            })
            .unwrap_err();
        assert!(matches!(err, PrototypeError::Duplicate(_)));
    }

    #[test]
    fn test_malformed_document_rejected() {
        let mut registry = PrototypeRegistry::new();
        assert!(matches!(
            registry.load_json("{ not json"),
            Err(PrototypeError::Parse(_))
        ));
    }
}
