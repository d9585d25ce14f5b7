//! Entity converters and their registry.
//!
//! A converter turns one source entity into graph nodes through a
//! [`ConversionContext`] and reports which nodes it created, in an order
//! that stays stable from scene to scene (the identity linker pairs them up
//! positionally). The pipeline only ever talks to converters through
//! [`EntityConverter`] and picks them from a [`ConverterRegistry`] by
//! [`EntityKind`].

mod geometry;
mod misc_object;
mod road;
mod road_object;
mod road_user;
mod sign;
mod weather;

use crate::context::ConversionContext;
use crate::entity::{Converted, EntityKind, SourceEntity};
use std::collections::BTreeMap;

pub use misc_object::MiscObjectConverter;
pub use road::{LaneConverter, LateralMarkingConverter, RoadConverter};
pub use road_object::{RoadObjectConverter, StructuralObjectConverter};
pub use road_user::RoadUserConverter;
pub use sign::{SignConverter, SignalStateConverter};
pub use weather::WeatherConverter;

/// Converts entities of one kind.
pub trait EntityConverter {
    fn kind(&self) -> EntityKind;

    /// Create the nodes for `source` and return them per source entity.
    fn convert(
        &self,
        source: SourceEntity<'_>,
        ctx: &mut ConversionContext<'_>,
    ) -> anyhow::Result<Vec<Converted>>;
}

/// Converter lookup keyed by entity kind.
pub struct ConverterRegistry {
    converters: BTreeMap<EntityKind, Box<dyn EntityConverter>>,
}

impl ConverterRegistry {
    /// A registry without any converter.
    pub fn empty() -> Self {
        Self {
            converters: BTreeMap::new(),
        }
    }

    /// A registry with the built-in converter for every kind.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(RoadConverter));
        registry.register(Box::new(LaneConverter));
        registry.register(Box::new(LateralMarkingConverter));
        registry.register(Box::new(StructuralObjectConverter));
        registry.register(Box::new(RoadObjectConverter));
        registry.register(Box::new(SignConverter));
        registry.register(Box::new(RoadUserConverter));
        registry.register(Box::new(MiscObjectConverter));
        registry.register(Box::new(SignalStateConverter));
        registry.register(Box::new(WeatherConverter));
        registry
    }

    /// Register `converter` for its kind, returning the one it replaces.
    pub fn register(
        &mut self,
        converter: Box<dyn EntityConverter>,
    ) -> Option<Box<dyn EntityConverter>> {
        self.converters.insert(converter.kind(), converter)
    }

    pub fn get(&self, kind: EntityKind) -> Option<&dyn EntityConverter> {
        self.converters.get(&kind).map(|c| c.as_ref())
    }

    pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.converters.keys().copied()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("kinds", &self.converters.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Error for a converter handed an entity of another kind.
fn wrong_kind(expected: EntityKind, source: &SourceEntity<'_>) -> anyhow::Error {
    anyhow::anyhow!(
        "{expected:?} converter cannot convert {} ({:?})",
        source.key,
        source.kind()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_kind() {
        let registry = ConverterRegistry::with_defaults();
        assert_eq!(registry.kinds().collect::<Vec<_>>(), EntityKind::ALL.to_vec());
        for kind in EntityKind::ALL {
            assert_eq!(registry.get(kind).map(|c| c.kind()), Some(kind));
        }
    }

    #[test]
    fn register_replaces_by_kind() {
        let mut registry = ConverterRegistry::empty();
        assert!(registry.get(EntityKind::Weather).is_none());
        assert!(registry.register(Box::new(WeatherConverter)).is_none());
        assert!(registry.register(Box::new(WeatherConverter)).is_some());
    }
}
