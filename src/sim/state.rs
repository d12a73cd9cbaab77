//! Entity model and the simulation context
//!
//! `World` owns every live entity for the current level plus the level table.
//! It is created once per process and handed to each simulation call.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::level::{LevelConfig, Theme, generate_obstacles, level_table};
use super::perks::{PerkKind, Perks};
use crate::consts::*;
use crate::yaw_forward;

/// Which view the player is using. Movement keys follow the active view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CameraMode {
    FirstPerson,
    #[default]
    ThirdPerson,
}

/// Enemy kinds, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Tier1,
    Tier2,
    Tier3,
    MiniBoss,
    Boss,
}

/// Static stats for an enemy kind
#[derive(Debug)]
pub struct EnemyDef {
    pub name: &'static str,
    pub health: i32,
    pub damage: i32,
    /// Multiplier on `PLAYER_SPEED`
    pub speed_mult: f32,
    pub model_height: f32,
    pub points: u64,
    pub is_boss: bool,
}

const ENEMY_DEFS: [EnemyDef; 5] = [
    EnemyDef {
        name: "Type1Wolf",
        health: 3,
        damage: 5,
        speed_mult: 0.2,
        model_height: 2.0,
        points: 10,
        is_boss: false,
    },
    EnemyDef {
        name: "Type2Wolf",
        health: 4,
        damage: 6,
        speed_mult: 0.3,
        model_height: 3.0,
        points: 15,
        is_boss: false,
    },
    EnemyDef {
        name: "Type3Wolf",
        health: 5,
        damage: 8,
        speed_mult: 0.4,
        model_height: 4.0,
        points: 20,
        is_boss: false,
    },
    EnemyDef {
        name: "MiniBossWolf",
        health: 10,
        damage: 10,
        speed_mult: 0.5,
        model_height: 6.0,
        points: 50,
        is_boss: true,
    },
    EnemyDef {
        name: "BossWolf",
        health: 15,
        damage: 12,
        speed_mult: 0.6,
        model_height: 8.0,
        points: 100,
        is_boss: true,
    },
];

impl EnemyKind {
    pub fn def(self) -> &'static EnemyDef {
        &ENEMY_DEFS[self as usize]
    }

    /// Body color; tiers follow the level theme, bosses are always red
    pub fn color(self, theme: Theme) -> [f32; 3] {
        let tiers = theme.tier_colors();
        match self {
            EnemyKind::Tier1 => tiers[0],
            EnemyKind::Tier2 => tiers[1],
            EnemyKind::Tier3 => tiers[2],
            EnemyKind::MiniBoss => [0.95, 0.15, 0.15],
            EnemyKind::Boss => [1.00, 0.08, 0.05],
        }
    }

    /// Collision radius scales with model height
    pub fn collision_radius(self) -> f32 {
        ENEMY_BASE_COLLISION_RADIUS * (self.def().model_height / PLAYER_TOTAL_HEIGHT)
    }

    /// Seconds between shots; faster kinds reload faster
    pub fn reload_time(self) -> f32 {
        1.5 / (self.def().speed_mult + 0.5)
    }
}

/// The player avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Body center (feet at `pos.y - PLAYER_BODY_Y_OFFSET`)
    pub pos: Vec3,
    /// Facing, radians from +Z toward +X
    pub yaw: f32,
    /// First-person look pitch, radians (positive looks down)
    pub pitch: f32,
    pub health: i32,
    pub score: u64,
    pub speed: f32,
    /// Seconds until the next shot is allowed
    pub shoot_cooldown: f32,
    /// Cooldown applied after each shot (shrinks during rapid fire)
    pub shoot_cooldown_time: f32,
    pub perks: Perks,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Player::spawn_point(),
            yaw: 0.0,
            pitch: 0.0,
            health: PLAYER_MAX_HEALTH,
            score: 0,
            speed: PLAYER_SPEED,
            shoot_cooldown: 0.0,
            shoot_cooldown_time: PLAYER_BASE_SHOOT_COOLDOWN,
            perks: Perks::default(),
        }
    }
}

impl Player {
    /// Arena center, standing on the floor
    pub fn spawn_point() -> Vec3 {
        Vec3::new(ARENA_SIZE_X / 2.0, PLAYER_BODY_Y_OFFSET, ARENA_SIZE_Z / 2.0)
    }

    /// Per-level reset: back to spawn, perks cleared. Health and score carry.
    pub fn reset_for_level(&mut self) {
        self.pos = Self::spawn_point();
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.shoot_cooldown = 0.0;
        self.shoot_cooldown_time = PLAYER_BASE_SHOOT_COOLDOWN;
        self.perks.reset();
    }

    /// Fresh run: full health, zero score
    pub fn reset_run(&mut self) {
        self.health = PLAYER_MAX_HEALTH;
        self.score = 0;
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Where enemy bullets aim and hit
    pub fn torso_center(&self) -> Vec3 {
        Vec3::new(
            self.pos.x,
            self.pos.y - PLAYER_BODY_Y_OFFSET + PLAYER_TOTAL_HEIGHT / 2.0,
            self.pos.z,
        )
    }

    /// Muzzle of the held gun, at shoulder height in front of the body
    pub fn gun_tip(&self) -> Vec3 {
        let forward = yaw_forward(self.yaw);
        let shoulder = PLAYER_LEG_LENGTH + PLAYER_TORSO_HEIGHT * 0.8;
        let reach = PLAYER_GUN_BASE_OFFSET + PLAYER_GUN_LENGTH;
        Vec3::new(
            self.pos.x + forward.x * reach,
            self.pos.y - PLAYER_BODY_Y_OFFSET + shoulder,
            self.pos.z + forward.z * reach,
        )
    }

    /// Subtract damage, never below zero. Returns true if this hit killed.
    pub fn take_damage(&mut self, damage: i32) -> bool {
        let was_alive = self.is_alive();
        self.health = (self.health - damage).clamp(0, PLAYER_MAX_HEALTH);
        was_alive && !self.is_alive()
    }

    /// Spend an unlocked perk; locked perks are ignored
    pub fn activate_perk(&mut self, kind: PerkKind) -> bool {
        if !self.perks.activate(kind) {
            return false;
        }
        if kind == PerkKind::Heal {
            self.health = PLAYER_MAX_HEALTH;
        }
        true
    }
}

/// A live enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    /// Body center (y is half the model height)
    pub pos: Vec3,
    pub yaw: f32,
    pub max_health: i32,
    pub health: i32,
    pub damage: i32,
    pub speed: f32,
    pub reload_time: f32,
    pub shoot_cooldown: f32,
    pub points: u64,
    pub model_height: f32,
    pub collision_radius: f32,
    pub color: [f32; 3],
    pub is_boss: bool,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, floor_pos: Vec2, theme: Theme, shoot_cooldown: f32) -> Self {
        let def = kind.def();
        Self {
            id,
            kind,
            pos: Vec3::new(floor_pos.x, def.model_height / 2.0, floor_pos.y),
            yaw: 0.0,
            max_health: def.health,
            health: def.health,
            damage: def.damage,
            speed: PLAYER_SPEED * def.speed_mult,
            reload_time: kind.reload_time(),
            shoot_cooldown,
            points: def.points,
            model_height: def.model_height,
            collision_radius: kind.collision_radius(),
            color: kind.color(theme),
            is_boss: def.is_boss,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Bullet origin: in front of the face along the current facing
    pub fn muzzle(&self) -> Vec3 {
        let forward = yaw_forward(self.yaw);
        let offset = 0.2 * self.model_height;
        Vec3::new(
            self.pos.x + forward.x * offset,
            self.pos.y,
            self.pos.z + forward.z * offset,
        )
    }
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// A bullet in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec3,
    /// Unit direction of travel
    pub dir: Vec3,
    pub owner: BulletOwner,
    pub damage: i32,
    /// Seconds left before the bullet fizzles
    pub lifespan: f32,
    pub color: [f32; 3],
}

impl Bullet {
    pub fn new(id: u32, pos: Vec3, dir: Vec3, owner: BulletOwner, damage: i32) -> Self {
        let color = match owner {
            BulletOwner::Player => [1.0, 1.0, 0.0],
            BulletOwner::Enemy => [1.0, 0.5, 0.0],
        };
        Self {
            id,
            pos,
            dir: dir.normalize_or_zero(),
            owner,
            damage,
            lifespan: BULLET_LIFESPAN,
            color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleShape {
    Cylinder,
    Box,
}

/// Static level geometry; blocks movement, not bullets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Footprint center (x, z)
    pub pos: Vec2,
    pub radius: f32,
    pub height: f32,
    pub shape: ObstacleShape,
    pub color: [f32; 3],
}

/// View state. Third person orbits the player with its own yaw and pitch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub mode: CameraMode,
    /// Third-person orbit yaw, radians
    pub tp_yaw: f32,
    /// Third-person pitch, radians, in [-89°, 0°]
    pub tp_pitch: f32,
    pub tp_distance: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            mode: CameraMode::ThirdPerson,
            tp_yaw: 0.0,
            tp_pitch: (-30.0f32).to_radians(),
            tp_distance: 8.0,
        }
    }
}

impl Camera {
    /// Floor-plane (forward, left) unit vectors used to resolve movement keys
    pub fn movement_basis(&self, player_yaw: f32) -> (Vec2, Vec2) {
        match self.mode {
            CameraMode::ThirdPerson => {
                let (s, c) = self.tp_yaw.sin_cos();
                (Vec2::new(-s, c), Vec2::new(c, s))
            }
            CameraMode::FirstPerson => {
                let (s, c) = player_yaw.sin_cos();
                (Vec2::new(s, c), Vec2::new(c, -s))
            }
        }
    }

    /// Third-person eye position looking at `focus`
    pub fn third_person_eye(&self, focus: Vec3) -> Vec3 {
        let (sp, cp) = self.tp_pitch.sin_cos();
        let (sy, cy) = self.tp_yaw.sin_cos();
        focus + Vec3::new(self.tp_distance * cp * sy, -self.tp_distance * sp, -self.tp_distance * cp * cy)
    }
}

/// The simulation context: everything one level of play mutates
#[derive(Debug, Clone)]
pub struct World {
    /// Current level number (1-based)
    pub level: u32,
    pub player: Player,
    pub camera: Camera,
    /// Live enemies, in spawn order
    pub enemies: Vec<Enemy>,
    /// Live bullets, in fire order
    pub bullets: Vec<Bullet>,
    pub obstacles: Vec<Obstacle>,
    pub levels: Vec<LevelConfig>,
    pub spawned_this_level: u32,
    pub killed_this_level: u32,
    /// Id of the live boss, if any
    pub boss_id: Option<u32>,
    /// Auto-fire assist plus invulnerability
    pub cheat_mode: bool,
    pub cheat_fire_timer: f32,
    /// Enemy animation clock (seconds since level start)
    pub anim_time: f32,
    /// Keyboard turn rate, radians per second
    pub turn_speed: f32,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl World {
    /// Default turn rate (degrees per second)
    pub const DEFAULT_TURN_SPEED_DEG: f32 = 30.0;

    pub fn new(seed: u64) -> Self {
        Self {
            level: 1,
            player: Player::default(),
            camera: Camera::default(),
            enemies: Vec::new(),
            bullets: Vec::new(),
            obstacles: Vec::new(),
            levels: level_table(),
            spawned_this_level: 0,
            killed_this_level: 0,
            boss_id: None,
            cheat_mode: false,
            cheat_fire_timer: 0.0,
            anim_time: 0.0,
            turn_speed: Self::DEFAULT_TURN_SPEED_DEG.to_radians(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn active_level(&self) -> &LevelConfig {
        &self.levels[(self.level - 1) as usize]
    }

    pub fn active_level_mut(&mut self) -> &mut LevelConfig {
        &mut self.levels[(self.level - 1) as usize]
    }

    pub fn is_final_level(&self) -> bool {
        self.level == MAX_LEVELS
    }

    pub fn theme(&self) -> Theme {
        self.active_level().theme()
    }

    /// Reset everything for `level`: entities cleared, pool refilled, player
    /// recentered, obstacles regenerated. Health and score are left to the
    /// caller.
    pub fn init_level(&mut self, level: u32) {
        debug_assert!((1..=MAX_LEVELS).contains(&level), "level {level} out of range");
        self.level = level;
        self.enemies.clear();
        self.bullets.clear();
        self.boss_id = None;
        self.spawned_this_level = 0;
        self.killed_this_level = 0;
        self.anim_time = 0.0;
        self.player.reset_for_level();
        self.active_level_mut().reset_pool();
        self.obstacles = generate_obstacles(level);
        log::info!(
            "Level {} ({:?}): {} enemies, {} at a time, {} obstacles",
            level,
            self.theme(),
            self.active_level().total_enemies,
            self.active_level().max_concurrent,
            self.obstacles.len()
        );
    }

    /// Put an enemy on the floor at `floor_pos`, counting it toward the quota
    pub fn spawn_enemy_at(&mut self, kind: EnemyKind, floor_pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let cooldown = self.rng.random_range(1.0..3.0);
        let enemy = Enemy::new(id, kind, floor_pos, self.theme(), cooldown);
        self.enemies.push(enemy);
        self.spawned_this_level += 1;
        if kind == EnemyKind::Boss {
            self.boss_id = Some(id);
        }
        id
    }

    pub fn spawn_bullet(&mut self, pos: Vec3, dir: Vec3, owner: BulletOwner, damage: i32) -> u32 {
        let id = self.next_entity_id();
        self.bullets.push(Bullet::new(id, pos, dir, owner, damage));
        id
    }

    /// Fire straight ahead if the cooldown allows. Returns true on a shot.
    pub fn try_fire(&mut self) -> bool {
        if self.player.shoot_cooldown > 0.0 {
            return false;
        }
        self.player.shoot_cooldown = self.player.shoot_cooldown_time;
        let tip = self.player.gun_tip();
        let dir = yaw_forward(self.player.yaw);
        self.spawn_bullet(tip, dir, BulletOwner::Player, 1);
        true
    }

    /// Switch views, carrying the facing across so the screen does not jump
    pub fn toggle_camera(&mut self) {
        self.camera.mode = match self.camera.mode {
            CameraMode::FirstPerson => {
                self.camera.tp_yaw = self.player.yaw;
                CameraMode::ThirdPerson
            }
            CameraMode::ThirdPerson => {
                self.player.yaw = self.camera.tp_yaw;
                CameraMode::FirstPerson
            }
        };
    }

    pub fn set_cheat_mode(&mut self, on: bool) {
        self.cheat_mode = on;
        self.cheat_fire_timer = 0.0;
    }

    pub fn boss(&self) -> Option<&Enemy> {
        let id = self.boss_id?;
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Quota spawned and nobody left standing
    pub fn level_complete(&self) -> bool {
        self.spawned_this_level >= self.active_level().total_enemies && self.enemies.is_empty()
    }
}
