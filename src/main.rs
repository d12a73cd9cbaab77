//! Arena Doom - headless frame driver
//!
//! Runs the game without a window: the auto-fire assist plays from the
//! configured start level, spending perks as they unlock, until the run is
//! won or the frame budget is used up. The final HUD is printed as JSON.
//!
//! Usage: `arena-doom [settings.json]` (or set `ARENA_DOOM_SETTINGS`).
//! `RUST_LOG=debug` shows spawns and perk activity.

#[cfg(not(target_arch = "wasm32"))]
use arena_doom::{Game, Screen, Settings, sim::PerkKind, sim::TickInput};

/// Simulated frame length (seconds)
#[cfg(not(target_arch = "wasm32"))]
const FRAME_DT: f32 = 1.0 / 60.0;

/// Give up after this many frames (30 simulated minutes)
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES: u64 = 60 * 60 * 30;

#[cfg(not(target_arch = "wasm32"))]
fn load_settings() -> Settings {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ARENA_DOOM_SETTINGS").ok());
    let Some(path) = path else {
        log::info!("No settings file given, using defaults");
        return Settings::default();
    };
    match Settings::load_from(&path) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("{e}; using default settings");
            Settings::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Arena Doom (headless) starting...");

    let settings = load_settings();
    let mut game = Game::new(&settings);
    if !game.world().cheat_mode {
        game.toggle_cheat();
    }
    if let Err(e) = game.start_level(settings.start_level) {
        log::warn!("{e}; starting from level 1");
        game.start_new_game();
    }

    let input = TickInput::default();
    let mut frames = 0;
    while frames < MAX_FRAMES && game.screen() != Screen::YouWin && !game.exit_requested() {
        for kind in PerkKind::ALL {
            if game.world().player.perks.is_available(kind) {
                game.activate_perk(kind);
            }
        }
        game.frame(FRAME_DT, &input);
        frames += 1;
    }

    if game.screen() == Screen::YouWin {
        log::info!("Won after {:.1} simulated seconds", frames as f32 * FRAME_DT);
    } else {
        log::warn!("Stopped after {} frames on level {}", frames, game.world().level);
        game.return_to_main_menu();
    }

    match serde_json::to_string_pretty(&game.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to encode HUD: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web
}
