//! Component families — the closed set of component categories.
//!
//! A [`ComponentFamily`] is the unique key for a component within an entity:
//! no two components of the same family coexist on one entity. Families are
//! a fixed, enumerable set so that entities can store components in a dense
//! slot array and message dispatch is a `match`, never runtime type
//! discovery.

use serde::{Deserialize, Serialize};

/// The fixed category tag of a component.
///
/// Every component belongs to exactly one family, and an entity holds at
/// most one component per family. The discriminants double as indices into
/// an entity's slot array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentFamily {
    /// World position and rotation.
    Transform,
    /// Linear and angular velocity.
    Velocity,
    /// Collision shape and behavior.
    Collidable,
    /// Sprite and draw metadata.
    Renderable,
    /// Container of other entities.
    Inventory,
    /// Light emission.
    Light,
    /// Health and death tracking.
    Damageable,
    /// Player control binding.
    Actor,
}

impl ComponentFamily {
    /// Total number of families.
    pub const COUNT: usize = 8;

    /// All families in slot order.
    pub const ALL: [ComponentFamily; Self::COUNT] = [
        ComponentFamily::Transform,
        ComponentFamily::Velocity,
        ComponentFamily::Collidable,
        ComponentFamily::Renderable,
        ComponentFamily::Inventory,
        ComponentFamily::Light,
        ComponentFamily::Damageable,
        ComponentFamily::Actor,
    ];

    /// Returns the dense slot index of this family.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the family's human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ComponentFamily::Transform => "Transform",
            ComponentFamily::Velocity => "Velocity",
            ComponentFamily::Collidable => "Collidable",
            ComponentFamily::Renderable => "Renderable",
            ComponentFamily::Inventory => "Inventory",
            ComponentFamily::Light => "Light",
            ComponentFamily::Damageable => "Damageable",
            ComponentFamily::Actor => "Actor",
        }
    }
}

impl std::fmt::Display for ComponentFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of component families, packed into a bitmask.
///
/// Used for entity queries (required / excluded / any-of) and for routing
/// directed events to subscribers whose family is present on the target
/// entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FamilySet(u16);

impl FamilySet {
    /// The empty set.
    pub const EMPTY: FamilySet = FamilySet(0);

    /// Create a set from a list of families.
    #[must_use]
    pub fn from_families(families: &[ComponentFamily]) -> Self {
        let mut set = Self::EMPTY;
        for &family in families {
            set.insert(family);
        }
        set
    }

    /// Add a family to the set.
    pub fn insert(&mut self, family: ComponentFamily) {
        self.0 |= 1 << family.index();
    }

    /// Remove a family from the set.
    pub fn remove(&mut self, family: ComponentFamily) {
        self.0 &= !(1 << family.index());
    }

    /// Returns `true` if the family is in the set.
    #[must_use]
    pub fn contains(self, family: ComponentFamily) -> bool {
        self.0 & (1 << family.index()) != 0
    }

    /// Returns `true` if every family in `other` is also in `self`.
    #[must_use]
    pub fn contains_all(self, other: FamilySet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if the two sets share at least one family.
    #[must_use]
    pub fn intersects(self, other: FamilySet) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over the families in the set, in slot order.
    pub fn iter(self) -> impl Iterator<Item = ComponentFamily> {
        ComponentFamily::ALL
            .into_iter()
            .filter(move |f| self.contains(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_indices_are_dense() {
        for (i, family) in ComponentFamily::ALL.into_iter().enumerate() {
            assert_eq!(family.index(), i);
        }
    }

    #[test]
    fn test_family_set_insert_contains() {
        let mut set = FamilySet::EMPTY;
        set.insert(ComponentFamily::Transform);
        set.insert(ComponentFamily::Light);
        assert!(set.contains(ComponentFamily::Transform));
        assert!(set.contains(ComponentFamily::Light));
        assert!(!set.contains(ComponentFamily::Inventory));
    }

    #[test]
    fn test_family_set_remove() {
        let mut set = FamilySet::from_families(&[ComponentFamily::Transform]);
        set.remove(ComponentFamily::Transform);
        assert!(set.is_empty());
    }

    #[test]
    fn test_family_set_contains_all() {
        let big = FamilySet::from_families(&[
            ComponentFamily::Transform,
            ComponentFamily::Velocity,
            ComponentFamily::Collidable,
        ]);
        let small = FamilySet::from_families(&[
            ComponentFamily::Transform,
            ComponentFamily::Velocity,
        ]);
        assert!(big.contains_all(small));
        assert!(!small.contains_all(big));
        // Every set contains the empty set.
        assert!(small.contains_all(FamilySet::EMPTY));
    }

    #[test]
    fn test_family_set_iter_order() {
        let set = FamilySet::from_families(&[ComponentFamily::Light, ComponentFamily::Transform]);
        let families: Vec<_> = set.iter().collect();
        assert_eq!(
            families,
            vec![ComponentFamily::Transform, ComponentFamily::Light]
        );
    }

    #[test]
    fn test_family_serialization_roundtrip() {
        let family = ComponentFamily::Damageable;
        let bytes = rmp_serde::to_vec(&family).unwrap();
        let restored: ComponentFamily = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(family, restored);
    }
}
