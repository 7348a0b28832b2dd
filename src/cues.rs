//! Sound cues for presentation layers
//!
//! Maps simulation events to the sample a front end should play and at what
//! gain. Nothing here touches an audio API; the browser shell owns playback.

use serde::Serialize;

use crate::recent_hits::HitOutcome;
use crate::sim::events::{EventSink, GameEvent};
use crate::sim::slots::Slot;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoundCue {
    /// Drop accepted, balls released
    BallDrop,
    /// Ball crossed a multiplier line
    LineHit,
    /// Ball landed on the free-drops slot
    FreeDrops,
    /// Landing on a 0.5x, 1x or 2x slot
    WinLow,
    /// Landing on a 5x or 10x slot
    WinMid,
    /// Landing on a 50x, 100x or 1000x slot
    WinHigh,
}

impl SoundCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::BallDrop => "ball_drop",
            SoundCue::LineHit => "line_hit",
            SoundCue::FreeDrops => "free_drops",
            SoundCue::WinLow => "win_low",
            SoundCue::WinMid => "win_mid",
            SoundCue::WinHigh => "win_high",
        }
    }
}

/// A cue with its base gain
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CuePlay {
    pub cue: SoundCue,
    pub volume: f32,
}

/// Win cue and gain for a slot multiplier. Multipliers outside the base
/// table stay silent.
pub fn win_cue(slot_multiplier: f64) -> Option<CuePlay> {
    let cue = match slot_multiplier {
        m if m == 0.5 || m == 1.0 || m == 2.0 => SoundCue::WinLow,
        m if m == 5.0 || m == 10.0 => SoundCue::WinMid,
        m if m == 50.0 || m == 100.0 || m == 1000.0 => SoundCue::WinHigh,
        _ => return None,
    };
    let volume = if slot_multiplier >= 100.0 {
        0.9
    } else if slot_multiplier >= 10.0 {
        0.8
    } else {
        0.7
    };
    Some(CuePlay { cue, volume })
}

/// Cue for a simulation event, if it makes a sound
pub fn cue_for(event: &GameEvent) -> Option<CuePlay> {
    match event {
        GameEvent::DropStarted { .. } => Some(CuePlay {
            cue: SoundCue::BallDrop,
            volume: 0.7,
        }),
        GameEvent::LineHit { .. } => Some(CuePlay {
            cue: SoundCue::LineHit,
            volume: 0.4,
        }),
        GameEvent::BallLanded { slot, outcome, .. } => match (slot, outcome) {
            (Slot::Multiplier(m), HitOutcome::Win { .. }) => win_cue(*m),
            (_, HitOutcome::FreeDrops { .. }) => Some(CuePlay {
                cue: SoundCue::FreeDrops,
                volume: 0.6,
            }),
            _ => None,
        },
        _ => None,
    }
}

/// Collects cues from the event stream and applies the master gain
#[derive(Debug, Clone)]
pub struct CueMixer {
    master_volume: f32,
    muted: bool,
    queued: Vec<CuePlay>,
}

impl Default for CueMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl CueMixer {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            muted: false,
            queued: Vec::new(),
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all cues
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    /// Take the cues queued since the last call
    pub fn drain(&mut self) -> Vec<CuePlay> {
        std::mem::take(&mut self.queued)
    }
}

impl EventSink for CueMixer {
    fn handle(&mut self, event: &GameEvent) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        if let Some(play) = cue_for(event) {
            self.queued.push(CuePlay {
                cue: play.cue,
                volume: play.volume * vol,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::DropKind;
    use glam::Vec2;

    fn landed(slot: Slot, outcome: HitOutcome) -> GameEvent {
        GameEvent::BallLanded {
            ball_id: 1,
            slot_index: 0,
            slot,
            outcome,
        }
    }

    #[test]
    fn test_win_tiers() {
        assert_eq!(win_cue(0.5).map(|p| p.cue), Some(SoundCue::WinLow));
        assert_eq!(win_cue(2.0).map(|p| p.volume), Some(0.7));
        assert_eq!(win_cue(5.0).map(|p| (p.cue, p.volume)), Some((SoundCue::WinMid, 0.7)));
        assert_eq!(win_cue(10.0).map(|p| (p.cue, p.volume)), Some((SoundCue::WinMid, 0.8)));
        assert_eq!(win_cue(50.0).map(|p| (p.cue, p.volume)), Some((SoundCue::WinHigh, 0.8)));
        assert_eq!(win_cue(1000.0).map(|p| (p.cue, p.volume)), Some((SoundCue::WinHigh, 0.9)));
        assert_eq!(win_cue(3.0), None);
    }

    #[test]
    fn test_event_cues() {
        let drop = GameEvent::DropStarted {
            kind: DropKind::Manual,
            balls: 1,
            cost: 1.0,
            free_drops_remaining: 0,
        };
        assert_eq!(cue_for(&drop).map(|p| p.cue), Some(SoundCue::BallDrop));

        let free = landed(Slot::FreeDrops { base: 2 }, HitOutcome::FreeDrops { awarded: 2 });
        assert_eq!(cue_for(&free).map(|p| p.volume), Some(0.6));

        let win = landed(
            Slot::Multiplier(100.0),
            HitOutcome::Win {
                multiplier: 100.0,
                amount: 100.0,
            },
        );
        assert_eq!(cue_for(&win).map(|p| p.cue), Some(SoundCue::WinHigh));

        assert_eq!(cue_for(&GameEvent::Reset), None);
        assert_eq!(
            cue_for(&GameEvent::PegHit {
                peg: 0,
                pos: Vec2::ZERO,
                boosted: false
            }),
            None
        );
    }

    #[test]
    fn test_mixer_applies_master_volume() {
        let mut mixer = CueMixer::new();
        mixer.set_master_volume(0.5);
        let line = GameEvent::LineHit {
            line: crate::sim::board::LineId { row: 3, start: 0 },
            ball_id: 1,
            line_multiplier: 2,
            new_multiplier: 2.0,
        };
        mixer.handle_all(&[line.clone(), GameEvent::Reset]);
        let cues = mixer.drain();
        assert_eq!(cues.len(), 1);
        assert!((cues[0].volume - 0.2).abs() < 1e-6);

        mixer.set_muted(true);
        mixer.handle(&line);
        assert!(mixer.drain().is_empty());
    }
}
