//! Cosmic Plinko entry point
//!
//! On the web the page drives `cosmic_plinko::web::WebGame`. Natively this
//! runs a headless seeded session: `cosmic-plinko [seed] [drops] [tuning.json]`.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cosmic_plinko::sim::{EventSink, GamePhase, GameState, LogSink, TickInput, tick};
    use cosmic_plinko::Tuning;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let drops: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(10);
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Failed to load tuning from {path}: {e}");
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };

    log::info!("Cosmic Plinko (native) starting: seed {seed}, {drops} drop(s)");
    let mut state = GameState::with_tuning(seed, tuning);
    let mut sink = LogSink;
    let start_balance = state.balance;
    let mut played = 0;

    // Hard stop in case a run never settles
    let max_ticks = u64::from(drops.max(1)) * 120 * 600;
    while state.time_ticks < max_ticks {
        let mut input = TickInput::default();
        if state.pending_ack.is_some() {
            input.acknowledge = true;
        } else if played < drops && state.phase() == GamePhase::Idle && state.can_drop_ball() {
            input.drop = true;
            played += 1;
        }

        tick(&mut state, &input);
        sink.handle_all(&state.drain_events());

        if played >= drops && state.phase() == GamePhase::Idle {
            break;
        }
        if played < drops && state.phase() == GamePhase::Idle && !state.can_drop_ball() {
            // Out of money: stop once cooldown cannot be the reason
            if state.balance < state.total_bet() {
                log::info!("Out of balance after {played} drop(s)");
                break;
            }
        }
    }

    log::info!(
        "Finished after {} ticks: balance ${:.2} (started ${:.2}), {} recent hit(s)",
        state.time_ticks,
        state.balance,
        start_balance,
        state.recent_hits.len()
    );
    for hit in state.recent_hits.entries() {
        log::debug!("tick {}: {:?}", hit.tick, hit.outcome);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is WebGame, this is just to satisfy the compiler
}
