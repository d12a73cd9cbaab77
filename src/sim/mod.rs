//! Simulation module
//!
//! All gameplay logic lives here. Rules for this module:
//! - Variable timestep, clamped by the frame driver
//! - Seeded RNG only
//! - Stable iteration order (spawn order for enemies, fire order for bullets)
//! - No rendering or platform dependencies

pub mod collision;
pub mod level;
pub mod perks;
pub mod spawn;
pub mod state;
pub mod tick;

pub use level::{LevelConfig, SpawnPool, Theme, generate_obstacles, level_table};
pub use perks::{PerkKind, Perks};
pub use spawn::{SpawnOutcome, SpawnRules, maintain_population, spawn_one};
pub use state::{
    Bullet, BulletOwner, Camera, CameraMode, Enemy, EnemyDef, EnemyKind, Obstacle, ObstacleShape,
    Player, World,
};
pub use tick::{TickInput, TickOutcome, handle_enemy_death, tick};
