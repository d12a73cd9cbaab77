//! Level table, spawn pools, themes and obstacle layout

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{EnemyKind, Obstacle, ObstacleShape};
use crate::consts::*;

/// Obstacle layouts are seeded with this plus the level number
pub const OBSTACLE_SEED_BASE: u64 = 1000;
/// Obstacles never spawn this close to the player spawn point
const OBSTACLE_CENTER_CLEARANCE: f32 = 10.0;
/// Obstacles stay this far from the walls
const OBSTACLE_WALL_MARGIN: f32 = 8.0;

/// Visual theme for a group of levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Earth,
    Mud,
    Heaven,
    Hell,
}

impl Theme {
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=3 => Theme::Earth,
            4..=6 => Theme::Mud,
            7..=9 => Theme::Heaven,
            _ => Theme::Hell,
        }
    }

    /// Body colors for tier 1, 2 and 3 enemies
    pub fn tier_colors(self) -> [[f32; 3]; 3] {
        match self {
            Theme::Earth => [[0.20, 0.85, 0.30], [0.10, 0.70, 0.25], [0.06, 0.55, 0.18]],
            Theme::Mud => [[0.75, 0.55, 0.30], [0.60, 0.40, 0.20], [0.45, 0.30, 0.15]],
            Theme::Heaven => [[0.85, 0.95, 1.00], [0.70, 0.85, 1.00], [0.60, 0.80, 0.98]],
            Theme::Hell => [[0.90, 0.20, 0.15], [0.80, 0.12, 0.10], [0.70, 0.08, 0.06]],
        }
    }

    pub fn obstacle_color(self) -> [f32; 3] {
        match self {
            Theme::Earth => [0.12, 0.35, 0.18],
            Theme::Mud => [0.45, 0.32, 0.18],
            Theme::Heaven => [0.12, 0.22, 0.42],
            Theme::Hell => [0.45, 0.08, 0.45],
        }
    }
}

/// Kinds that live in the ordinary (randomly drawn) part of a pool
const ORDINARY_KINDS: [EnemyKind; 4] = [
    EnemyKind::Tier1,
    EnemyKind::Tier2,
    EnemyKind::Tier3,
    EnemyKind::MiniBoss,
];

fn ordinary_slot(kind: EnemyKind) -> Option<usize> {
    ORDINARY_KINDS.iter().position(|&k| k == kind)
}

/// Enemies still to be spawned for a level.
///
/// Ordinary kinds are a counted multiset; the boss has its own priority slot
/// so it is always offered before anything else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPool {
    ordinary: [u32; 4],
    boss_pending: bool,
}

impl SpawnPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add `count` enemies of `kind`
    pub fn with(mut self, kind: EnemyKind, count: u32) -> Self {
        match ordinary_slot(kind) {
            Some(i) => self.ordinary[i] += count,
            None => self.boss_pending |= count > 0,
        }
        self
    }

    /// Entries left, boss included
    pub fn len(&self) -> u32 {
        self.ordinary.iter().sum::<u32>() + u32::from(self.boss_pending)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, kind: EnemyKind) -> u32 {
        match ordinary_slot(kind) {
            Some(i) => self.ordinary[i],
            None => u32::from(self.boss_pending),
        }
    }

    pub fn boss_pending(&self) -> bool {
        self.boss_pending
    }

    /// Remove one entry of `kind`; false if there is none
    pub fn take(&mut self, kind: EnemyKind) -> bool {
        match ordinary_slot(kind) {
            Some(i) if self.ordinary[i] > 0 => {
                self.ordinary[i] -= 1;
                true
            }
            Some(_) => false,
            None => std::mem::take(&mut self.boss_pending),
        }
    }

    /// Draw one ordinary entry, uniformly over everything that remains
    pub fn draw_ordinary<R: Rng>(&mut self, rng: &mut R) -> Option<EnemyKind> {
        let total: u32 = self.ordinary.iter().sum();
        if total == 0 {
            return None;
        }
        let mut pick = rng.random_range(0..total);
        for (i, count) in self.ordinary.iter_mut().enumerate() {
            if pick < *count {
                *count -= 1;
                return Some(ORDINARY_KINDS[i]);
            }
            pick -= *count;
        }
        None
    }

    /// Return an entry taken by a spawn that could not be placed. The boss goes
    /// back to its priority slot.
    pub fn give_back(&mut self, kind: EnemyKind) {
        match ordinary_slot(kind) {
            Some(i) => self.ordinary[i] += 1,
            None => self.boss_pending = true,
        }
    }
}

/// Per-level spawn rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    pub number: u32,
    /// Quota: enemies this level will ever spawn
    pub total_enemies: u32,
    /// Most enemies alive at once
    pub max_concurrent: u32,
    /// Boss levels draw from a mixed pool; others spawn one fixed kind
    pub is_boss_level: bool,
    template: SpawnPool,
    /// What is left to spawn this attempt
    pub pool: SpawnPool,
}

impl LevelConfig {
    fn new(number: u32, max_concurrent: u32, is_boss_level: bool, template: SpawnPool) -> Self {
        Self {
            number,
            total_enemies: template.len(),
            max_concurrent,
            is_boss_level,
            pool: template.clone(),
            template,
        }
    }

    /// Single-kind level with `quota` copies of `kind`
    fn single(number: u32, quota: u32, max_concurrent: u32, kind: EnemyKind) -> Self {
        Self::new(number, max_concurrent, false, SpawnPool::new().with(kind, quota))
    }

    /// Refill the pool from the template (level entry)
    pub fn reset_pool(&mut self) {
        self.pool = self.template.clone();
    }

    /// The one kind a non-boss level spawns
    pub fn fixed_kind(&self) -> Option<EnemyKind> {
        if self.is_boss_level {
            return None;
        }
        ORDINARY_KINDS
            .into_iter()
            .find(|&k| self.template.count(k) > 0)
    }

    pub fn theme(&self) -> Theme {
        Theme::for_level(self.number)
    }
}

/// The ten levels, index 0 is level 1
pub fn level_table() -> Vec<LevelConfig> {
    use EnemyKind::*;

    let table = vec![
        LevelConfig::single(1, 5, 1, Tier1),
        LevelConfig::single(2, 6, 2, Tier1),
        LevelConfig::single(3, 9, 3, Tier1),
        LevelConfig::single(4, 5, 1, Tier2),
        LevelConfig::new(
            5,
            1,
            true,
            SpawnPool::new().with(Tier1, 3).with(Tier2, 3).with(MiniBoss, 1),
        ),
        LevelConfig::single(6, 9, 3, Tier2),
        LevelConfig::single(7, 5, 1, Tier3),
        LevelConfig::single(8, 6, 2, Tier3),
        LevelConfig::single(9, 9, 3, Tier3),
        LevelConfig::new(
            10,
            1,
            true,
            SpawnPool::new()
                .with(Tier1, 5)
                .with(Tier2, 5)
                .with(Tier3, 5)
                .with(Boss, 1),
        ),
    ];
    debug_assert_eq!(table.len(), MAX_LEVELS as usize);
    table
}

/// Pillars and blocks for a level. Same level, same layout.
pub fn generate_obstacles(level: u32) -> Vec<Obstacle> {
    let mut rng = Pcg32::seed_from_u64(OBSTACLE_SEED_BASE + u64::from(level));
    let color = Theme::for_level(level).obstacle_color();
    let center = Vec2::new(ARENA_SIZE_X / 2.0, ARENA_SIZE_Z / 2.0);
    let count = 8 + level / 2;

    (0..count)
        .filter_map(|i| {
            let pos = Vec2::new(
                rng.random_range(OBSTACLE_WALL_MARGIN..ARENA_SIZE_X - OBSTACLE_WALL_MARGIN),
                rng.random_range(OBSTACLE_WALL_MARGIN..ARENA_SIZE_Z - OBSTACLE_WALL_MARGIN),
            );
            if pos.distance(center) < OBSTACLE_CENTER_CLEARANCE {
                return None;
            }
            let radius = rng.random_range(1.2..2.2);
            let height = rng.random_range(3.0..6.0);
            let shape = if i % 2 == 0 {
                ObstacleShape::Cylinder
            } else {
                ObstacleShape::Box
            };
            Some(Obstacle {
                pos,
                radius,
                height,
                shape,
                color,
            })
        })
        .collect()
}
