//! Enemy spawning
//!
//! One spawn attempt per frame while the level is below both its quota and
//! its concurrency limit. Placement is rejection-sampled; when every sample
//! fails the drawn pool entry goes back and the next frame tries again.

use glam::{Vec2, Vec3};
use rand::Rng;

use super::collision::spheres_overlap;
use super::state::{EnemyKind, World};
use crate::consts::*;

/// Placement constraints for new enemies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRules {
    /// Candidates are drawn this far inside the walls
    pub margin: f32,
    /// Minimum distance from the player
    pub player_clearance: f32,
    /// Minimum distance from every live enemy
    pub enemy_clearance: f32,
    /// Candidates tried before giving up for this frame
    pub max_attempts: u32,
}

impl Default for SpawnRules {
    fn default() -> Self {
        Self {
            margin: 7.0,
            player_clearance: 15.0,
            enemy_clearance: 5.0,
            max_attempts: 20,
        }
    }
}

/// What a spawn attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// A new enemy with this id is live
    Spawned { id: u32, kind: EnemyKind },
    /// No valid spot found; the entry went back into the pool
    Deferred(EnemyKind),
    /// Quota reached or nothing eligible left to draw
    Nothing,
}

/// Spawn if the level is under both its concurrency limit and its quota
pub fn maintain_population(world: &mut World) -> SpawnOutcome {
    let level = world.active_level();
    let live = world.enemies.len() as u32;
    if live < level.max_concurrent && world.spawned_this_level < level.total_enemies {
        spawn_one(world)
    } else {
        SpawnOutcome::Nothing
    }
}

/// Try to put exactly one enemy into the arena
pub fn spawn_one(world: &mut World) -> SpawnOutcome {
    spawn_with_rules(world, &SpawnRules::default())
}

pub fn spawn_with_rules(world: &mut World, rules: &SpawnRules) -> SpawnOutcome {
    if world.spawned_this_level >= world.active_level().total_enemies {
        return SpawnOutcome::Nothing;
    }

    let Some(kind) = choose_kind(world) else {
        return SpawnOutcome::Nothing;
    };

    match find_spot(world, kind, rules) {
        Some(spot) => {
            let id = world.spawn_enemy_at(kind, spot);
            log::debug!(
                "Spawned {} #{} ({}/{})",
                kind.def().name,
                id,
                world.spawned_this_level,
                world.active_level().total_enemies
            );
            SpawnOutcome::Spawned { id, kind }
        }
        None => {
            world.active_level_mut().pool.give_back(kind);
            log::debug!("No room for {}, retrying next frame", kind.def().name);
            SpawnOutcome::Deferred(kind)
        }
    }
}

/// Take the next kind out of the pool. The boss jumps the queue whenever it
/// is pending and not already on the field.
fn choose_kind(world: &mut World) -> Option<EnemyKind> {
    let boss_alive = world.boss_id.is_some();
    let World { levels, level, rng, .. } = world;
    let config = &mut levels[(*level - 1) as usize];

    if !config.is_boss_level {
        let kind = config.fixed_kind()?;
        return config.pool.take(kind).then_some(kind);
    }
    if !boss_alive && config.pool.take(EnemyKind::Boss) {
        return Some(EnemyKind::Boss);
    }
    config.pool.draw_ordinary(rng)
}

fn find_spot(world: &mut World, kind: EnemyKind, rules: &SpawnRules) -> Option<Vec2> {
    let half_height = kind.def().model_height / 2.0;
    for _ in 0..rules.max_attempts {
        let x = world.rng.random_range(rules.margin..=ARENA_SIZE_X - rules.margin);
        let z = world.rng.random_range(rules.margin..=ARENA_SIZE_Z - rules.margin);
        let candidate = Vec3::new(x, half_height, z);

        let clear_of_player =
            !spheres_overlap(candidate, rules.player_clearance, world.player.pos, 0.0);
        let clear_of_enemies = world
            .enemies
            .iter()
            .all(|e| !spheres_overlap(candidate, rules.enemy_clearance, e.pos, 0.0));
        if clear_of_player && clear_of_enemies {
            return Some(Vec2::new(x, z));
        }
    }
    None
}
