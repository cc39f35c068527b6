//! Bin registry: lifecycle commands for the bin fleet.
//!
//! Bins are entities with a [`Bin`] component; [`BinRegistry`] keeps the
//! id → entity index so commands and systems can address a bin by id.
//! All mutation is last-writer-wins.

use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, Resource, World};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::ecs::{clamp_fill_level, Bin, BinId};
use crate::error::{Result, SimError};

#[derive(Debug, Default, Resource)]
pub struct BinRegistry {
    entities: HashMap<BinId, Entity>,
}

impl BinRegistry {
    pub fn entity(&self, id: &BinId) -> Option<Entity> {
        self.entities.get(id).copied()
    }

    pub fn contains(&self, id: &BinId) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Registered ids in lexicographic order.
    pub fn ids(&self) -> Vec<BinId> {
        let mut ids: Vec<BinId> = self.entities.keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// Register a bin. Rejects duplicates and malformed bins; fill is clamped.
pub fn add_bin(world: &mut World, bin: Bin) -> Result<Entity> {
    let bin = bin.validated()?;
    if world
        .get_resource::<BinRegistry>()
        .is_some_and(|registry| registry.contains(&bin.id))
    {
        return Err(SimError::DuplicateBin(bin.id));
    }
    let id = bin.id.clone();
    let entity = world.spawn(bin).id();
    world
        .get_resource_or_insert_with(BinRegistry::default)
        .entities
        .insert(id.clone(), entity);
    debug!(bin = %id, "bin registered");
    Ok(entity)
}

/// Remove a bin, returning its last state. `BinNotFound` if absent.
pub fn remove_bin(world: &mut World, id: &BinId) -> Result<Bin> {
    let entity = world
        .get_resource_mut::<BinRegistry>()
        .and_then(|mut registry| registry.entities.remove(id))
        .ok_or_else(|| SimError::BinNotFound(id.clone()))?;
    let bin = world.get::<Bin>(entity).cloned();
    world.despawn(entity);
    debug!(bin = %id, "bin removed");
    bin.ok_or_else(|| SimError::BinNotFound(id.clone()))
}

/// Override the fill level; finite values are clamped to `[0, 100]`.
pub fn set_manual_fill_level(world: &mut World, id: &BinId, value: f64) -> Result<f64> {
    let level = clamp_fill_level(value)?;
    let mut bin = bin_mut(world, id)?;
    bin.fill_level = level;
    Ok(level)
}

/// Empty a bin and stamp its collection time. Returns the liters removed.
pub fn empty_bin(world: &mut World, id: &BinId, at: DateTime<Utc>) -> Result<f64> {
    let mut bin = bin_mut(world, id)?;
    let removed = bin.waste_volume_liters();
    bin.empty_at(at);
    Ok(removed)
}

pub fn get_bin<'w>(world: &'w World, id: &BinId) -> Option<&'w Bin> {
    let entity = world.get_resource::<BinRegistry>()?.entity(id)?;
    world.get::<Bin>(entity)
}

/// Read-only copy of every registered bin, ordered by id.
pub fn snapshot(world: &World) -> Vec<Bin> {
    let Some(registry) = world.get_resource::<BinRegistry>() else {
        return Vec::new();
    };
    let mut bins: Vec<Bin> = registry
        .entities
        .values()
        .filter_map(|entity| world.get::<Bin>(*entity).cloned())
        .collect();
    bins.sort_by(|a, b| a.id.cmp(&b.id));
    bins
}

/// Despawn every bin and clear the index.
pub fn clear_bins(world: &mut World) {
    let entities: Vec<Entity> = match world.get_resource_mut::<BinRegistry>() {
        Some(mut registry) => registry.entities.drain().map(|(_, e)| e).collect(),
        None => return,
    };
    for entity in entities {
        world.despawn(entity);
    }
}

fn bin_mut<'w>(world: &'w mut World, id: &BinId) -> Result<bevy_ecs::world::Mut<'w, Bin>> {
    let entity = world
        .get_resource::<BinRegistry>()
        .and_then(|registry| registry.entity(id))
        .ok_or_else(|| SimError::BinNotFound(id.clone()))?;
    world
        .get_mut::<Bin>(entity)
        .ok_or_else(|| SimError::BinNotFound(id.clone()))
}
