//! Screen and level state machine
//!
//! `Game` is what a frame driver talks to. It owns the simulation context and
//! the hall of fame, decides when the simulation runs, and routes input
//! intents and UI button actions to the right place for the active screen.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::highscores::HighScores;
use crate::settings::Settings;
use crate::sim::{CameraMode, PerkKind, TickInput, TickOutcome, World, tick};
use crate::{Error, Result, clamp_frame_dt};

/// Overlay tint while advancing to the next level
pub const LEVEL_TRANSITION_COLOR: [f32; 3] = [0.0, 1.0, 0.0];
/// Overlay tint while restarting after a death
pub const GAME_OVER_TRANSITION_COLOR: [f32; 3] = [1.0, 0.0, 0.0];

/// Active screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    MainMenu,
    LevelSelect,
    HallOfFame,
    /// Simulation running
    Playing,
    /// Simulation suspended, pause menu shown
    Paused,
    /// Level cleared, counting down to the next one
    LevelTransition,
    /// Player died, counting down to a restart of the same level
    GameOverTransition,
    /// Final level cleared
    YouWin,
}

impl Screen {
    fn is_menu(self) -> bool {
        matches!(self, Screen::MainMenu | Screen::LevelSelect | Screen::HallOfFame)
    }
}

/// Timed full-screen overlay between levels or after a death
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transition {
    /// Seconds until the overlay ends
    pub remaining: f32,
    pub color: [f32; 3],
}

impl Transition {
    fn new(color: [f32; 3]) -> Self {
        Self {
            remaining: TRANSITION_DURATION,
            color,
        }
    }
}

/// A UI button, identified by its symbolic action name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    MenuStart,
    MenuSelectLevel,
    MenuHallOfFame,
    MenuExit,
    BackToMain,
    SelectLevel(u32),
    PauseResume,
    PauseRetry,
    PauseToMain,
    WinToMain,
    WinExit,
}

impl UiAction {
    /// Whether the button exists on `screen`
    pub fn available_in(self, screen: Screen) -> bool {
        match self {
            UiAction::MenuStart
            | UiAction::MenuSelectLevel
            | UiAction::MenuHallOfFame
            | UiAction::MenuExit => screen == Screen::MainMenu,
            UiAction::BackToMain => matches!(screen, Screen::LevelSelect | Screen::HallOfFame),
            UiAction::SelectLevel(_) => screen == Screen::LevelSelect,
            UiAction::PauseResume | UiAction::PauseRetry | UiAction::PauseToMain => {
                screen == Screen::Paused
            }
            UiAction::WinToMain | UiAction::WinExit => screen == Screen::YouWin,
        }
    }
}

impl FromStr for UiAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let action = match s {
            "menu_start" => UiAction::MenuStart,
            "menu_select_level" => UiAction::MenuSelectLevel,
            "menu_hof" => UiAction::MenuHallOfFame,
            "menu_exit" => UiAction::MenuExit,
            "back_to_main" => UiAction::BackToMain,
            "pause_resume" => UiAction::PauseResume,
            "pause_retry" => UiAction::PauseRetry,
            "pause_to_main" => UiAction::PauseToMain,
            "win_to_main" => UiAction::WinToMain,
            "win_exit" => UiAction::WinExit,
            other => {
                let level = other
                    .strip_prefix("level_")
                    .and_then(|n| n.parse::<u32>().ok())
                    .ok_or_else(|| Error::UnknownAction(other.to_string()))?;
                check_level(level)?;
                UiAction::SelectLevel(level)
            }
        };
        Ok(action)
    }
}

impl fmt::Display for UiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiAction::MenuStart => f.write_str("menu_start"),
            UiAction::MenuSelectLevel => f.write_str("menu_select_level"),
            UiAction::MenuHallOfFame => f.write_str("menu_hof"),
            UiAction::MenuExit => f.write_str("menu_exit"),
            UiAction::BackToMain => f.write_str("back_to_main"),
            UiAction::SelectLevel(n) => write!(f, "level_{n}"),
            UiAction::PauseResume => f.write_str("pause_resume"),
            UiAction::PauseRetry => f.write_str("pause_retry"),
            UiAction::PauseToMain => f.write_str("pause_to_main"),
            UiAction::WinToMain => f.write_str("win_to_main"),
            UiAction::WinExit => f.write_str("win_exit"),
        }
    }
}

fn check_level(level: u32) -> Result<()> {
    if (1..=MAX_LEVELS).contains(&level) {
        Ok(())
    } else {
        Err(Error::InvalidLevel {
            level,
            max: MAX_LEVELS,
        })
    }
}

/// One perk as the HUD shows it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerkStatus {
    pub kind: PerkKind,
    pub available: bool,
    pub kills: u32,
    pub threshold: u32,
    /// Seconds of effect left (zero for heal)
    pub time_left: f32,
}

/// Read-only view of everything the HUD and menus display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub screen: Screen,
    pub level: u32,
    pub health: i32,
    pub max_health: i32,
    pub score: u64,
    pub perks: Vec<PerkStatus>,
    pub cheat_mode: bool,
    pub camera_mode: CameraMode,
    pub transition: Option<Transition>,
    pub enemies_alive: usize,
    /// Quota minus kills so far
    pub enemies_remaining: u32,
    /// (health, max) of the live boss
    pub boss_health: Option<(i32, i32)>,
    /// Hall of fame scores, best first
    pub high_scores: Vec<u64>,
}

/// The game: screens, level flow and the hall of fame around one `World`
#[derive(Debug, Clone)]
pub struct Game {
    screen: Screen,
    world: World,
    highscores: HighScores,
    transition: Option<Transition>,
    exit_requested: bool,
}

impl Game {
    pub fn new(settings: &Settings) -> Self {
        let mut world = World::new(settings.seed);
        world.camera.mode = settings.camera_mode;
        world.camera.tp_distance = settings.tp_camera_distance;
        world.camera.tp_pitch = settings.tp_camera_pitch();
        world.turn_speed = settings.turn_speed();
        world.set_cheat_mode(settings.cheat_mode);

        Self {
            screen: Screen::MainMenu,
            world,
            highscores: HighScores::new(),
            transition: None,
            exit_requested: false,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn highscores(&self) -> &HighScores {
        &self.highscores
    }

    pub fn transition(&self) -> Option<Transition> {
        self.transition
    }

    /// Set once an exit was accepted; the driver should stop after this frame
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Run one host frame. Returns the clamped delta actually applied.
    pub fn frame(&mut self, raw_dt: f32, input: &TickInput) -> f32 {
        let dt = clamp_frame_dt(raw_dt);
        match self.screen {
            Screen::Playing => match tick(&mut self.world, input, dt) {
                TickOutcome::Continue => {}
                TickOutcome::PlayerDied => self.on_player_died(),
                TickOutcome::LevelComplete => self.on_level_complete(),
            },
            Screen::LevelTransition | Screen::GameOverTransition => self.advance_transition(dt),
            _ => {}
        }
        dt
    }

    /// Fresh run from level 1
    pub fn start_new_game(&mut self) {
        self.world.player.reset_run();
        self.begin_level(1);
    }

    /// Fresh run from any level
    pub fn start_level(&mut self, level: u32) -> Result<()> {
        check_level(level)?;
        self.world.player.reset_run();
        self.begin_level(level);
        Ok(())
    }

    /// Restart the current level with full health and zero score
    pub fn retry_level(&mut self) {
        self.world.player.reset_run();
        self.begin_level(self.world.level);
    }

    /// Playing <-> Paused; ignored on every other screen
    pub fn toggle_pause(&mut self) {
        self.screen = match self.screen {
            Screen::Playing => Screen::Paused,
            Screen::Paused => Screen::Playing,
            other => other,
        };
    }

    pub fn toggle_camera(&mut self) {
        if self.screen == Screen::Playing {
            self.world.toggle_camera();
        }
    }

    pub fn toggle_cheat(&mut self) {
        let on = !self.world.cheat_mode;
        self.world.set_cheat_mode(on);
        log::info!("Cheat mode {}", if on { "on" } else { "off" });
    }

    /// Manual fire. Returns true if a bullet left the gun.
    pub fn fire(&mut self) -> bool {
        self.screen == Screen::Playing && self.world.try_fire()
    }

    /// Spend a perk. Locked perks and non-playing screens are ignored.
    pub fn activate_perk(&mut self, kind: PerkKind) -> bool {
        self.screen == Screen::Playing && self.world.player.activate_perk(kind)
    }

    /// Perform a UI action. Returns false if the button is not on this screen.
    pub fn dispatch(&mut self, action: UiAction) -> bool {
        if !action.available_in(self.screen) {
            log::warn!("Ignoring {} on {:?}", action, self.screen);
            return false;
        }
        match action {
            UiAction::MenuStart => self.start_new_game(),
            UiAction::MenuSelectLevel => self.screen = Screen::LevelSelect,
            UiAction::MenuHallOfFame => self.screen = Screen::HallOfFame,
            UiAction::MenuExit | UiAction::WinExit => self.exit(),
            UiAction::BackToMain | UiAction::PauseToMain | UiAction::WinToMain => {
                self.return_to_main_menu()
            }
            UiAction::SelectLevel(level) => {
                if let Err(e) = self.start_level(level) {
                    log::warn!("{e}");
                    return false;
                }
            }
            UiAction::PauseResume => self.screen = Screen::Playing,
            UiAction::PauseRetry => self.retry_level(),
        }
        true
    }

    /// Parse and perform a UI action by name. Unknown names change nothing.
    pub fn dispatch_action_name(&mut self, name: &str) -> Result<bool> {
        match name.parse::<UiAction>() {
            Ok(action) => Ok(self.dispatch(action)),
            Err(e) => {
                log::warn!("{e}");
                Err(e)
            }
        }
    }

    /// Exit intent. Honored on menu screens and while playing.
    pub fn request_exit(&mut self) -> bool {
        if self.screen.is_menu() || self.screen == Screen::Playing {
            self.exit();
            true
        } else {
            false
        }
    }

    /// Commit the run's score (once) and go back to the main menu
    pub fn return_to_main_menu(&mut self) {
        self.highscores.record(self.world.player.score);
        self.transition = None;
        self.screen = Screen::MainMenu;
    }

    pub fn snapshot(&self) -> Hud {
        let world = &self.world;
        let player = &world.player;
        let level = world.active_level();

        let perks = PerkKind::ALL
            .iter()
            .map(|&kind| PerkStatus {
                kind,
                available: player.perks.is_available(kind),
                kills: player.perks.kills(kind),
                threshold: kind.kill_threshold(),
                time_left: match kind {
                    PerkKind::Heal => 0.0,
                    PerkKind::ScoreMultiplier => player.perks.score_multiplier_time,
                    PerkKind::RapidFire => player.perks.rapid_fire_time,
                },
            })
            .collect();

        Hud {
            screen: self.screen,
            level: world.level,
            health: player.health,
            max_health: PLAYER_MAX_HEALTH,
            score: player.score,
            perks,
            cheat_mode: world.cheat_mode,
            camera_mode: world.camera.mode,
            transition: self.transition,
            enemies_alive: world.enemies.len(),
            enemies_remaining: level.total_enemies.saturating_sub(world.killed_this_level),
            boss_health: world.boss().map(|b| (b.health, b.max_health)),
            high_scores: self.highscores.top_three().iter().map(|e| e.score).collect(),
        }
    }

    fn exit(&mut self) {
        self.highscores.record(self.world.player.score);
        self.exit_requested = true;
        log::info!("Exit requested");
    }

    /// Every level start opens a new high-score session
    fn begin_level(&mut self, level: u32) {
        self.world.init_level(level);
        self.highscores.begin_session();
        self.transition = None;
        self.screen = Screen::Playing;
    }

    fn on_player_died(&mut self) {
        log::info!(
            "Player died on level {} with {} points",
            self.world.level,
            self.world.player.score
        );
        self.highscores.record(self.world.player.score);
        self.transition = Some(Transition::new(GAME_OVER_TRANSITION_COLOR));
        self.screen = Screen::GameOverTransition;
    }

    fn on_level_complete(&mut self) {
        if self.world.is_final_level() {
            log::info!("All levels cleared with {} points", self.world.player.score);
            self.highscores.record(self.world.player.score);
            self.screen = Screen::YouWin;
        } else {
            log::info!("Level {} complete", self.world.level);
            self.transition = Some(Transition::new(LEVEL_TRANSITION_COLOR));
            self.screen = Screen::LevelTransition;
        }
    }

    fn advance_transition(&mut self, dt: f32) {
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        transition.remaining -= dt;
        if transition.remaining > 0.0 {
            return;
        }

        match self.screen {
            Screen::LevelTransition => self.begin_level(self.world.level + 1),
            Screen::GameOverTransition => {
                self.world.player.reset_run();
                self.begin_level(self.world.level);
            }
            _ => {}
        }
    }
}
