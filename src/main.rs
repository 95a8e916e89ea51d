//! Bubble Burst headless runner
//!
//! Usage: `bubble-burst [seed] [stage] [frames]`
//! Plays a scripted session (periodic taps and flicks on live bubbles) and
//! logs the outcome. Set `RUST_LOG=debug` for per-event output.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), bubble_burst::SimError> {
    use bubble_burst::StagePreset;
    use bubble_burst::consts::FRAME_DT_MS;
    use bubble_burst::sim::{BubbleSim, NotificationLog, PlayerVitals, PointerEvent, SimConfig, TickInput};
    use glam::Vec2;

    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = match args.first() {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Seed `{raw}` is not a number, using 1");
            1
        }),
        None => 1,
    };
    let stage = StagePreset::from_name(args.get(1).map(String::as_str).unwrap_or("normal"))?;
    let frames: u64 = args.get(2).and_then(|raw| raw.parse().ok()).unwrap_or(3600);

    let mut sim = BubbleSim::new(SimConfig {
        seed,
        ..Default::default()
    })?;
    sim.apply_stage(&stage)?;
    log::info!("Bubble Burst (headless) seed={seed} stage={} frames={frames}", stage.id);

    let mut sink = NotificationLog::new();
    let mut player = PlayerVitals::default();
    let mut score: u64 = 0;
    let mut popped = 0usize;
    let mut burst = 0usize;

    for frame in 0..frames {
        let target = sim.bubbles().iter().find(|b| b.is_alive()).map(|b| b.pos);
        let events = match target {
            Some(pos) if frame % 30 == 0 => vec![PointerEvent::Down(pos), PointerEvent::Up(pos)],
            Some(pos) if frame % 90 == 45 => vec![
                PointerEvent::Down(pos),
                PointerEvent::Move(pos + Vec2::new(20.0, -10.0)),
                PointerEvent::Up(pos + Vec2::new(60.0, -30.0)),
            ],
            _ => Vec::new(),
        };
        let input = TickInput {
            pointer: target,
            events,
        };
        let report = sim.tick(&input, FRAME_DT_MS, &mut sink, &mut player);
        score += u64::from(report.score);
        popped += report.popped.len();
        burst += report.burst.len();

        if player.is_dead() {
            log::info!("Player out of health at frame {frame}");
            break;
        }
    }

    let stats = sim.performance_stats();
    log::info!(
        "Finished: score={score} popped={popped} burst={burst} hp={:.0}/{:.0} live={}",
        player.hp,
        player.max_hp,
        sim.live_count()
    );
    log::info!(
        "Physics: collisions(last)={} forces={} avg_speed={:.1} special_effects={} damage_taken={:.0}",
        stats.active_collisions,
        stats.total_forces,
        stats.average_speed,
        sink.special_effects().count(),
        sink.total_damage()
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web
}
