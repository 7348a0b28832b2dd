//! Browser binding
//!
//! The page owns the canvas, DOM and audio; it calls `frame` from
//! requestAnimationFrame and renders from `snapshot_json`.

use wasm_bindgen::prelude::*;

use crate::cues::CueMixer;
use crate::platform::FrameClock;
use crate::sim::{EventSink, GameEvent, GameState, Snapshot, TickInput, tick};
use crate::tuning::Tuning;

/// Events and sound cues produced by one frame
#[derive(serde::Serialize)]
struct FrameOutput<'a> {
    events: &'a [GameEvent],
    cues: Vec<crate::cues::CuePlay>,
}

#[wasm_bindgen]
pub struct WebGame {
    state: GameState,
    clock: FrameClock,
    input: TickInput,
    cues: CueMixer,
}

#[wasm_bindgen]
impl WebGame {
    /// Create a game. A seed of 0 picks one from `Math.random`.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> WebGame {
        console_error_panic_hook::set_once();
        // A second instance finds the logger already installed
        let _ = console_log::init_with_level(log::Level::Info);

        let seed = if seed == 0 {
            (js_sys::Math::random() * u64::MAX as f64) as u64
        } else {
            seed
        };
        log::info!("Cosmic Plinko starting (seed {seed})");

        WebGame {
            state: GameState::new(seed),
            clock: FrameClock::new(),
            input: TickInput::default(),
            cues: CueMixer::new(),
        }
    }

    /// Create a game with tuning loaded from JSON
    pub fn with_tuning(seed: u64, tuning_json: &str) -> Result<WebGame, JsError> {
        let tuning = Tuning::from_json(tuning_json)?;
        let mut game = WebGame::new(seed);
        game.state = GameState::with_tuning(game.state.seed, tuning);
        Ok(game)
    }

    /// Advance to `time_ms` and return the frame's events and cues as JSON
    pub fn frame(&mut self, time_ms: f64) -> String {
        let substeps = self.clock.advance(time_ms);
        for _ in 0..substeps {
            let input = std::mem::take(&mut self.input);
            tick(&mut self.state, &input);
        }

        let events = self.state.drain_events();
        self.cues.handle_all(&events);
        let output = FrameOutput {
            events: &events,
            cues: self.cues.drain(),
        };
        serde_json::to_string(&output).unwrap_or_else(|e| {
            log::warn!("Failed to encode frame events: {e}");
            String::from(r#"{"events":[],"cues":[]}"#)
        })
    }

    /// Queue a drop for the next tick
    pub fn request_drop(&mut self) {
        self.input.drop = true;
    }

    pub fn can_drop_ball(&self) -> bool {
        self.state.can_drop_ball()
    }

    pub fn set_bet_amount(&mut self, amount: f64) -> Result<(), JsError> {
        self.state.set_bet_amount(amount)?;
        Ok(())
    }

    pub fn set_ball_count(&mut self, count: u32) -> Result<(), JsError> {
        self.state.set_ball_count(count)?;
        Ok(())
    }

    pub fn toggle_turbo(&mut self) {
        self.input.toggle_turbo = true;
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.input = TickInput::default();
        self.clock.reset();
    }

    /// Dismiss the award or summary modal
    pub fn acknowledge(&mut self) {
        self.input.acknowledge = true;
    }

    /// Pause or resume (modal open, tab hidden)
    pub fn set_paused(&mut self, paused: bool) {
        if self.state.paused != paused {
            self.state.set_paused(paused);
            self.clock.reset();
            log::info!("{}", if paused { "Paused" } else { "Resumed" });
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.cues.set_master_volume(volume);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.cues.set_muted(muted);
    }

    pub fn snapshot_json(&self) -> Result<String, JsError> {
        Ok(Snapshot::capture(&self.state).to_json()?)
    }
}
