//! Variable timestep simulation tick
//!
//! Advances one level of play by `dt` seconds. Frame order is fixed:
//! player, spawning and enemies, auto-fire, bullets, then the completion check.
//! Collections are walked in insertion order (spawn order for enemies, fire
//! order for bullets); a bullet hits the first enemy in that order it touches.

use glam::Vec2;

use super::collision::{
    blocked_by_obstacles, bullet_hits, clamp_to_arena, in_bullet_bounds, inside_arena, planar,
};
use super::spawn::maintain_population;
use super::state::{BulletOwner, CameraMode, World};
use crate::consts::*;
use crate::{normalize_angle, yaw_toward};

/// Held inputs for one frame. Every axis is in [-1, 1].
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// +1 forward, -1 back
    pub forward: f32,
    /// +1 strafe left, -1 strafe right
    pub strafe: f32,
    /// +1 turns the player toward +X (increasing yaw), -1 the other way
    pub turn: f32,
    /// +1 looks up, -1 looks down
    pub look_pitch: f32,
    /// Third-person only: +1 orbits the camera right, -1 left
    pub look_yaw: f32,
}

/// What happened this frame that the state machine must react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// Health reached zero this frame
    PlayerDied,
    /// Quota spawned and every enemy is dead
    LevelComplete,
}

/// Advance the world by one frame
pub fn tick(world: &mut World, input: &TickInput, dt: f32) -> TickOutcome {
    debug_assert!(dt >= 0.0, "negative dt {dt}");

    update_player(world, input, dt);
    update_enemies(world, dt);
    if world.cheat_mode {
        auto_fire(world, dt);
    }
    let died = update_bullets(world, dt);

    debug_assert!((0..=PLAYER_MAX_HEALTH).contains(&world.player.health));
    debug_assert!(world.player.shoot_cooldown >= 0.0);
    debug_assert!(world.bullets.iter().all(|b| b.lifespan > BULLET_EXPIRY_EPSILON));

    if died {
        TickOutcome::PlayerDied
    } else if world.level_complete() {
        TickOutcome::LevelComplete
    } else {
        TickOutcome::Continue
    }
}

fn update_player(world: &mut World, input: &TickInput, dt: f32) {
    let player = &mut world.player;

    player.perks.advance(dt);
    player.shoot_cooldown_time = if player.perks.rapid_fire_active() {
        PLAYER_RAPID_FIRE_COOLDOWN
    } else {
        PLAYER_BASE_SHOOT_COOLDOWN
    };

    // Move as a whole or not at all
    let (forward, left) = world.camera.movement_basis(player.yaw);
    let delta = (forward * input.forward.clamp(-1.0, 1.0) + left * input.strafe.clamp(-1.0, 1.0))
        * player.speed
        * dt;
    if delta != Vec2::ZERO {
        let target = planar(player.pos) + delta;
        if inside_arena(target, PLAYER_WALL_MARGIN)
            && !blocked_by_obstacles(target, PLAYER_RADIUS, &world.obstacles)
        {
            player.pos.x = target.x;
            player.pos.z = target.y;
        }
    }

    let turn = world.turn_speed * dt;
    player.yaw = normalize_angle(player.yaw + input.turn.clamp(-1.0, 1.0) * turn);

    let pitch_step = input.look_pitch.clamp(-1.0, 1.0) * turn * 0.7;
    let max_pitch = 89.0f32.to_radians();
    match world.camera.mode {
        CameraMode::FirstPerson => {
            player.pitch = (player.pitch - pitch_step).clamp(-max_pitch, max_pitch);
        }
        CameraMode::ThirdPerson => {
            let camera = &mut world.camera;
            camera.tp_pitch = (camera.tp_pitch - pitch_step).clamp(-max_pitch, 0.0);
            camera.tp_yaw = normalize_angle(camera.tp_yaw + input.look_yaw.clamp(-1.0, 1.0) * turn);
        }
    }

    if player.shoot_cooldown > 0.0 {
        player.shoot_cooldown = (player.shoot_cooldown - dt).max(0.0);
    }
}

fn update_enemies(world: &mut World, dt: f32) {
    world.anim_time += dt;
    maintain_population(world);

    let player_pos = world.player.pos;
    let aim_point = world.player.torso_center();
    let mut shots = Vec::new();

    for enemy in &mut world.enemies {
        let distance = enemy.pos.distance(player_pos);
        let to_player = Vec2::new(player_pos.x - enemy.pos.x, player_pos.z - enemy.pos.z);
        enemy.yaw = yaw_toward(to_player.x, to_player.y);

        if distance > ENEMY_MIN_DISTANCE_FROM_PLAYER {
            let next = planar(enemy.pos) + to_player.normalize_or_zero() * enemy.speed * dt;
            if !blocked_by_obstacles(next, enemy.collision_radius, &world.obstacles) {
                enemy.pos.x = next.x;
                enemy.pos.z = next.y;
            }
        }
        enemy.pos = clamp_to_arena(enemy.pos, enemy.collision_radius);

        if enemy.shoot_cooldown > 0.0 {
            enemy.shoot_cooldown -= dt;
        }
        if enemy.shoot_cooldown <= 0.0 && distance < ENEMY_FIRE_RANGE {
            enemy.shoot_cooldown = enemy.reload_time;
            let muzzle = enemy.muzzle();
            shots.push((muzzle, aim_point - muzzle, enemy.damage));
        }
    }

    for (pos, dir, damage) in shots {
        world.spawn_bullet(pos, dir, BulletOwner::Enemy, damage);
    }
}

/// Cheat assist: turn toward the nearest enemy and shoot it on a fixed beat
fn auto_fire(world: &mut World, dt: f32) {
    let origin = planar(world.player.pos);
    let nearest = world
        .enemies
        .iter()
        .min_by(|a, b| {
            let da = planar(a.pos).distance_squared(origin);
            let db = planar(b.pos).distance_squared(origin);
            da.total_cmp(&db)
        })
        .map(|e| e.pos);
    let Some(target) = nearest else {
        return;
    };

    let desired = yaw_toward(target.x - origin.x, target.z - origin.y);
    let diff = normalize_angle(desired - world.player.yaw);
    let max_step = CHEAT_TURN_SPEED_DEG.to_radians() * dt;
    world.player.yaw = normalize_angle(world.player.yaw + diff.clamp(-max_step, max_step));

    world.cheat_fire_timer += dt;
    if world.cheat_fire_timer >= CHEAT_SHOOT_INTERVAL {
        world.cheat_fire_timer = 0.0;
        let tip = world.player.gun_tip();
        world.spawn_bullet(tip, target - tip, BulletOwner::Player, 1);
    }
}

/// Move bullets and resolve hits. Returns true if the player died.
fn update_bullets(world: &mut World, dt: f32) -> bool {
    let mut died = false;
    let mut i = 0;

    while i < world.bullets.len() {
        let bullet = &mut world.bullets[i];
        bullet.pos += bullet.dir * BULLET_SPEED * dt;
        bullet.lifespan -= dt;
        if bullet.lifespan <= BULLET_EXPIRY_EPSILON || !in_bullet_bounds(bullet.pos) {
            world.bullets.remove(i);
            continue;
        }

        let (pos, owner, damage) = (bullet.pos, bullet.owner, bullet.damage);
        let consumed = match owner {
            BulletOwner::Player => {
                let target = world
                    .enemies
                    .iter()
                    .position(|e| bullet_hits(pos, e.pos, e.collision_radius));
                match target {
                    Some(index) => {
                        world.bullets.remove(i);
                        hit_enemy(world, index);
                        true
                    }
                    None => false,
                }
            }
            BulletOwner::Enemy => {
                if bullet_hits(pos, world.player.torso_center(), PLAYER_RADIUS) {
                    world.bullets.remove(i);
                    died |= hit_player(world, damage);
                    true
                } else {
                    false
                }
            }
        };

        if !consumed {
            i += 1;
        }
    }

    died
}

fn hit_enemy(world: &mut World, index: usize) {
    let enemy = &mut world.enemies[index];
    enemy.health -= 1;
    if enemy.is_dead() {
        handle_enemy_death(world, index);
    }
}

/// Pay out, remove the enemy and advance the perk counters
pub fn handle_enemy_death(world: &mut World, index: usize) {
    let enemy = world.enemies.remove(index);
    let reward = enemy.points * world.player.perks.score_multiplier();
    world.player.score += reward;
    if world.boss_id == Some(enemy.id) {
        world.boss_id = None;
        log::info!("{} defeated", enemy.kind.def().name);
    }
    world.killed_this_level += 1;
    world.player.perks.record_kill();
    log::debug!(
        "Killed {} #{} for {} points ({} killed this level)",
        enemy.kind.def().name,
        enemy.id,
        reward,
        world.killed_this_level
    );
}

/// Apply bullet damage unless invulnerable. Returns true if this hit killed.
fn hit_player(world: &mut World, damage: i32) -> bool {
    if world.cheat_mode {
        return false;
    }
    world.player.take_damage(damage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::perks::PerkKind;
    use crate::sim::state::{EnemyKind, Obstacle, ObstacleShape, Player};
    use glam::Vec3;
    use proptest::prelude::*;

    /// Level 1 with obstacles removed and spawning switched off
    fn arena() -> World {
        let mut world = World::new(7);
        world.init_level(1);
        world.obstacles.clear();
        world
    }

    fn freeze_spawns(world: &mut World) {
        world.spawned_this_level = world.active_level().total_enemies;
    }

    #[test]
    fn test_bullets_expire_by_lifespan() {
        for dt in [MAX_FRAME_DT, FALLBACK_FRAME_DT, 0.05, 0.125, 0.0625, 0.03125] {
            let mut world = arena();
            world.spawn_bullet(Vec3::new(1.0, 1.0, 80.0), Vec3::X, BulletOwner::Player, 1);
            let limit = (BULLET_LIFESPAN / dt).ceil() as usize;
            for _ in 0..limit {
                update_bullets(&mut world, dt);
                assert!(world.bullets.iter().all(|b| b.lifespan > BULLET_EXPIRY_EPSILON));
            }
            assert!(world.bullets.is_empty(), "bullet outlived {limit} ticks at dt={dt}");
        }
    }

    #[test]
    fn test_bullets_leave_arena() {
        let mut world = arena();
        world.spawn_bullet(Vec3::new(99.0, 1.0, 80.0), Vec3::X, BulletOwner::Enemy, 5);
        update_bullets(&mut world, 0.1);
        assert!(world.bullets.is_empty());
        assert_eq!(world.player.health, PLAYER_MAX_HEALTH);
    }

    #[test]
    fn test_multiplier_kill_pays_double() {
        let mut world = arena();
        let id = world.spawn_enemy_at(EnemyKind::Tier1, Vec2::new(50.0, 70.0));
        world.enemies[0].health = 1;
        for _ in 0..4 {
            world.player.perks.record_kill();
        }
        assert!(world.player.activate_perk(PerkKind::ScoreMultiplier));

        world.spawn_bullet(Vec3::new(50.0, 1.0, 69.5), Vec3::Z, BulletOwner::Player, 1);
        update_bullets(&mut world, 0.01);

        assert!(world.enemies.iter().all(|e| e.id != id));
        assert!(world.bullets.is_empty());
        assert_eq!(world.player.score, 20);
        assert_eq!(world.killed_this_level, 1);
        assert_eq!(world.player.perks.kills(PerkKind::ScoreMultiplier), 1);
        assert_eq!(world.player.perks.kills(PerkKind::Heal), 5);
    }

    #[test]
    fn test_bullet_hits_first_enemy_only() {
        let mut world = arena();
        world.spawn_enemy_at(EnemyKind::Tier1, Vec2::new(50.0, 70.0));
        world.spawn_enemy_at(EnemyKind::Tier1, Vec2::new(50.2, 70.0));
        world.spawn_bullet(Vec3::new(50.1, 1.0, 69.8), Vec3::Z, BulletOwner::Player, 1);
        update_bullets(&mut world, 0.001);

        assert_eq!(world.enemies[0].health, 2);
        assert_eq!(world.enemies[1].health, 3);
        assert!(world.bullets.is_empty());
        assert_eq!(world.player.score, 0);
    }

    #[test]
    fn test_boss_death_clears_reference() {
        let mut world = arena();
        world.init_level(10);
        world.obstacles.clear();
        world.spawn_enemy_at(EnemyKind::Boss, Vec2::new(20.0, 20.0));
        world.enemies[0].health = 0;
        handle_enemy_death(&mut world, 0);
        assert!(world.boss_id.is_none());
        assert_eq!(world.player.score, 100);
    }

    #[test]
    fn test_enemy_bullet_damages_player() {
        let mut world = arena();
        let torso = world.player.torso_center();
        world.spawn_bullet(torso - Vec3::Z * 0.5, Vec3::Z, BulletOwner::Enemy, 8);
        assert!(!update_bullets(&mut world, 0.01));
        assert_eq!(world.player.health, PLAYER_MAX_HEALTH - 8);
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_cheat_mode_is_invulnerable() {
        let mut world = arena();
        world.set_cheat_mode(true);
        let torso = world.player.torso_center();
        world.spawn_bullet(torso, Vec3::Z, BulletOwner::Enemy, 50);
        update_bullets(&mut world, 0.01);
        assert_eq!(world.player.health, PLAYER_MAX_HEALTH);
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_lethal_hit_reports_death() {
        let mut world = arena();
        world.player.health = 5;
        let torso = world.player.torso_center();
        world.spawn_bullet(torso, Vec3::Z, BulletOwner::Enemy, 6);
        world.spawn_bullet(torso, Vec3::X, BulletOwner::Enemy, 6);
        assert!(update_bullets(&mut world, 0.01));
        assert_eq!(world.player.health, 0);
    }

    #[test]
    fn test_movement_blocked_by_obstacle() {
        let mut world = arena();
        world.camera.mode = CameraMode::FirstPerson;
        let start = world.player.pos;
        world.obstacles.push(Obstacle {
            pos: Vec2::new(start.x, start.z + 1.6),
            radius: 1.2,
            height: 4.0,
            shape: ObstacleShape::Box,
            color: [0.0; 3],
        });
        let input = TickInput {
            forward: 1.0,
            ..Default::default()
        };
        update_player(&mut world, &input, 0.1);
        assert_eq!(world.player.pos, start);

        world.obstacles.clear();
        update_player(&mut world, &input, 0.1);
        assert!((world.player.pos.z - (start.z + 0.5)).abs() < 1e-4);
        assert_eq!(world.player.pos.x, start.x);
    }

    #[test]
    fn test_movement_rejected_at_wall_without_slide() {
        let mut world = arena();
        world.camera.mode = CameraMode::FirstPerson;
        world.player.pos.x = PLAYER_WALL_MARGIN + 0.05;
        let start = world.player.pos;
        let input = TickInput {
            forward: 1.0,
            strafe: -1.0,
            ..Default::default()
        };
        update_player(&mut world, &input, 0.1);
        assert_eq!(world.player.pos, start);
    }

    #[test]
    fn test_third_person_moves_along_camera() {
        let mut world = arena();
        world.camera.tp_yaw = std::f32::consts::FRAC_PI_2;
        world.player.yaw = 0.0;
        let start = world.player.pos;
        let input = TickInput {
            forward: 1.0,
            ..Default::default()
        };
        update_player(&mut world, &input, 0.2);
        assert!((world.player.pos.x - (start.x - 1.0)).abs() < 1e-4);
        assert!((world.player.pos.z - start.z).abs() < 1e-4);
    }

    #[test]
    fn test_turn_and_pitch_limits() {
        let mut world = arena();
        let input = TickInput {
            turn: 1.0,
            look_pitch: 1.0,
            ..Default::default()
        };
        for _ in 0..1000 {
            update_player(&mut world, &input, 0.1);
        }
        assert!((-89.0f32.to_radians()..=0.0).contains(&world.camera.tp_pitch));
        assert!((world.camera.tp_pitch + 89.0f32.to_radians()).abs() < 1e-4);
        assert!((-std::f32::consts::PI..std::f32::consts::PI).contains(&world.player.yaw));
    }

    #[test]
    fn test_rapid_fire_collapses_cooldown() {
        let mut world = arena();
        for _ in 0..5 {
            world.player.perks.record_kill();
        }
        world.player.activate_perk(PerkKind::RapidFire);
        update_player(&mut world, &TickInput::default(), 0.1);
        assert_eq!(world.player.shoot_cooldown_time, PLAYER_RAPID_FIRE_COOLDOWN);

        for _ in 0..50 {
            update_player(&mut world, &TickInput::default(), 0.1);
        }
        assert_eq!(world.player.shoot_cooldown_time, PLAYER_BASE_SHOOT_COOLDOWN);
    }

    #[test]
    fn test_shoot_cooldown_never_negative() {
        let mut world = arena();
        assert!(world.try_fire());
        update_player(&mut world, &TickInput::default(), 0.25);
        update_player(&mut world, &TickInput::default(), 0.1);
        assert_eq!(world.player.shoot_cooldown, 0.0);
        assert!(world.try_fire());
    }

    #[test]
    fn test_enemy_approaches_and_faces_player() {
        let mut world = arena();
        freeze_spawns(&mut world);
        world.spawn_enemy_at(EnemyKind::Tier1, Vec2::new(50.0, 70.0));
        world.enemies[0].shoot_cooldown = 10.0;

        update_enemies(&mut world, 1.0);
        let enemy = &world.enemies[0];
        assert!((enemy.pos.z - 69.0).abs() < 1e-4);
        assert!((enemy.yaw.abs() - std::f32::consts::PI).abs() < 1e-4);
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_enemy_holds_inside_keepout() {
        let mut world = arena();
        freeze_spawns(&mut world);
        world.spawn_enemy_at(EnemyKind::Tier1, Vec2::new(50.0, 52.0));
        world.enemies[0].shoot_cooldown = 10.0;
        let before = world.enemies[0].pos;
        update_enemies(&mut world, 0.5);
        assert_eq!(world.enemies[0].pos, before);
    }

    #[test]
    fn test_enemy_fires_only_in_range() {
        let mut world = arena();
        freeze_spawns(&mut world);
        world.spawn_enemy_at(EnemyKind::Tier2, Vec2::new(50.0, 70.0));
        world.spawn_enemy_at(EnemyKind::Tier2, Vec2::new(50.0, 95.0));
        for enemy in &mut world.enemies {
            enemy.shoot_cooldown = 0.0;
        }
        update_enemies(&mut world, 0.01);

        assert_eq!(world.bullets.len(), 1);
        let bullet = &world.bullets[0];
        assert_eq!(bullet.owner, BulletOwner::Enemy);
        assert_eq!(bullet.damage, 6);
        assert!(bullet.dir.z < 0.0);
        assert!((world.enemies[0].shoot_cooldown - world.enemies[0].reload_time).abs() < 1e-6);
    }

    #[test]
    fn test_auto_fire_turns_and_shoots() {
        let mut world = arena();
        freeze_spawns(&mut world);
        world.set_cheat_mode(true);
        world.spawn_enemy_at(EnemyKind::Tier1, Vec2::new(60.0, 50.0));
        world.enemies[0].shoot_cooldown = 10.0;

        auto_fire(&mut world, 0.1);
        assert!(world.bullets.is_empty());
        assert!(world.player.yaw > 0.0);
        auto_fire(&mut world, 0.1);
        assert_eq!(world.bullets.len(), 1);
        assert_eq!(world.bullets[0].owner, BulletOwner::Player);
    }

    #[test]
    fn test_level_completion_outcome() {
        let mut world = arena();
        freeze_spawns(&mut world);
        assert_eq!(tick(&mut world, &TickInput::default(), 0.016), TickOutcome::LevelComplete);
    }

    #[test]
    fn test_tick_spawns_up_to_concurrency() {
        let mut world = arena();
        for _ in 0..10 {
            tick(&mut world, &TickInput::default(), 0.016);
        }
        assert_eq!(world.enemies.len(), 1);
        assert_eq!(world.spawned_this_level, 1);
        assert!(world.anim_time > 0.15);
    }

    proptest! {
        #[test]
        fn prop_health_stays_in_bounds(hits in prop::collection::vec(0i32..40, 1..30)) {
            let mut world = arena();
            let mut deaths = 0;
            for damage in hits {
                if hit_player(&mut world, damage) {
                    deaths += 1;
                }
                prop_assert!((0..=PLAYER_MAX_HEALTH).contains(&world.player.health));
            }
            prop_assert!(deaths <= 1);
        }

        #[test]
        fn prop_spawns_within_quota(level in 1u32..=10, frames in 1usize..400) {
            let mut world = arena();
            world.init_level(level);
            for _ in 0..frames {
                tick(&mut world, &TickInput::default(), 0.05);
                let config = world.active_level();
                prop_assert!(world.spawned_this_level <= config.total_enemies);
                prop_assert!(world.enemies.len() as u32 <= config.max_concurrent);
                prop_assert!(world.player.health >= 0);
                if world.player.health == 0 {
                    break;
                }
            }
        }
    }

    #[test]
    fn test_player_torso_is_body_center() {
        let p = Player::default();
        assert_eq!(p.torso_center(), p.pos);
    }
}
