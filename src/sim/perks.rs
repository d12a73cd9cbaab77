//! Kill-gated perks
//!
//! Every kill advances all three perk counters. A perk unlocks once its
//! counter reaches the threshold and stays unlocked until the player spends
//! it; spending resets that counter only.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// The three consumable perks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerkKind {
    /// Restore health to maximum
    Heal,
    /// Double kill rewards for a while
    ScoreMultiplier,
    /// Near-zero shoot cooldown for a while
    RapidFire,
}

impl PerkKind {
    pub const ALL: [PerkKind; 3] = [PerkKind::Heal, PerkKind::ScoreMultiplier, PerkKind::RapidFire];

    /// Kills since last use needed to unlock
    pub fn kill_threshold(self) -> u32 {
        match self {
            PerkKind::Heal => 3,
            PerkKind::ScoreMultiplier => 4,
            PerkKind::RapidFire => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PerkKind::Heal => "Heal",
            PerkKind::ScoreMultiplier => "Score x2",
            PerkKind::RapidFire => "Rapid Fire",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Perk counters, unlock flags and active timers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Perks {
    kills: [u32; 3],
    available: [bool; 3],
    /// Seconds of double score left
    pub score_multiplier_time: f32,
    /// Seconds of rapid fire left
    pub rapid_fire_time: f32,
}

impl Perks {
    /// Clear everything (level start, retry, death restart)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Kills counted toward `kind` since it was last used
    pub fn kills(&self, kind: PerkKind) -> u32 {
        self.kills[kind.index()]
    }

    pub fn is_available(&self, kind: PerkKind) -> bool {
        self.available[kind.index()]
    }

    /// Count one kill toward every perk and unlock those that reached their
    /// threshold
    pub fn record_kill(&mut self) {
        for kind in PerkKind::ALL {
            let i = kind.index();
            self.kills[i] += 1;
            if !self.available[i] && self.kills[i] >= kind.kill_threshold() {
                self.available[i] = true;
                log::debug!("{} perk ready", kind.as_str());
            }
        }
    }

    /// Spend a perk. Returns false (and changes nothing) if it is locked.
    ///
    /// Healing is applied by the owner; timed perks (re)start here.
    pub fn activate(&mut self, kind: PerkKind) -> bool {
        let i = kind.index();
        if !self.available[i] {
            return false;
        }
        self.available[i] = false;
        self.kills[i] = 0;
        match kind {
            PerkKind::Heal => {}
            PerkKind::ScoreMultiplier => self.score_multiplier_time = PERK_SCORE_MULTIPLIER_DURATION,
            PerkKind::RapidFire => self.rapid_fire_time = PERK_RAPID_FIRE_DURATION,
        }
        log::debug!("{} perk activated", kind.as_str());
        true
    }

    /// Count down the timed perks
    pub fn advance(&mut self, dt: f32) {
        self.score_multiplier_time = (self.score_multiplier_time - dt).max(0.0);
        self.rapid_fire_time = (self.rapid_fire_time - dt).max(0.0);
    }

    /// Factor applied to kill rewards
    pub fn score_multiplier(&self) -> u64 {
        if self.score_multiplier_time > 0.0 { 2 } else { 1 }
    }

    pub fn rapid_fire_active(&self) -> bool {
        self.rapid_fire_time > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_kills(n: u32) -> Perks {
        let mut perks = Perks::default();
        for _ in 0..n {
            perks.record_kill();
        }
        perks
    }

    #[test]
    fn test_heal_threshold() {
        assert!(!with_kills(2).is_available(PerkKind::Heal));
        assert!(with_kills(3).is_available(PerkKind::Heal));
    }

    #[test]
    fn test_thresholds_are_3_4_5() {
        let perks = with_kills(4);
        assert!(perks.is_available(PerkKind::Heal));
        assert!(perks.is_available(PerkKind::ScoreMultiplier));
        assert!(!perks.is_available(PerkKind::RapidFire));
        assert!(with_kills(5).is_available(PerkKind::RapidFire));
    }

    #[test]
    fn test_unlock_does_not_reset_counter() {
        let perks = with_kills(7);
        assert_eq!(perks.kills(PerkKind::Heal), 7);
        assert!(perks.is_available(PerkKind::Heal));
    }

    #[test]
    fn test_locked_activation_is_ignored() {
        let mut perks = with_kills(2);
        let before = perks.clone();
        assert!(!perks.activate(PerkKind::ScoreMultiplier));
        assert_eq!(perks, before);
    }

    #[test]
    fn test_activation_consumes_and_starts_timer() {
        let mut perks = with_kills(5);
        assert!(perks.activate(PerkKind::RapidFire));
        assert!(!perks.is_available(PerkKind::RapidFire));
        assert_eq!(perks.kills(PerkKind::RapidFire), 0);
        // Other counters keep running
        assert_eq!(perks.kills(PerkKind::Heal), 5);
        assert!(perks.rapid_fire_active());
        assert!(!perks.activate(PerkKind::RapidFire));
    }

    #[test]
    fn test_timers_expire_and_clamp() {
        let mut perks = with_kills(4);
        perks.activate(PerkKind::ScoreMultiplier);
        assert_eq!(perks.score_multiplier(), 2);
        perks.advance(4.9);
        assert_eq!(perks.score_multiplier(), 2);
        perks.advance(0.5);
        assert_eq!(perks.score_multiplier(), 1);
        assert_eq!(perks.score_multiplier_time, 0.0);
        assert_eq!(perks.rapid_fire_time, 0.0);
    }
}
