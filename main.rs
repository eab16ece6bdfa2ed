//! main.rs - Desktop simulator for the particle engine
//! Drives the engine at the device resolution and maps keys and mouse
//! clicks onto the firmware command surface.

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::Rgb565,
    prelude::*,
    text::{Baseline, Text},
};
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use std::thread;
use std::time::{Duration, Instant};

use ada_particles::{AdaParticles, Formation, Settings, MAX_PARTICLES};

const TARGET_FPS: u32 = 30;
const COUNT_STEP: usize = 25;

// (name, valence, arousal)
const MOODS: [(&str, f32, f32); 5] = [
    ("neutral", 0.0, 0.3),
    ("happy", 0.8, 0.8),
    ("sad", -0.7, 0.3),
    ("calm", 0.3, 0.1),
    ("tense", -0.3, 0.9),
];

struct UiState {
    mood_index: usize,
    disconnected: bool,
    particle_count: usize,
    show_status: bool,
}

fn draw_overlay(display: &mut SimulatorDisplay<Rgb565>, system: &AdaParticles, ui: &UiState) {
    if !ui.show_status {
        return;
    }
    let style = MonoTextStyle::new(&FONT_6X10, Rgb565::new(0, 40, 20));
    let status = system.status();
    let mood = format!("mood: {}", MOODS[ui.mood_index].0);

    // Inside the round panel's visible area
    Text::with_baseline(status.as_str(), Point::new(120, 60), style, Baseline::Top)
        .draw(display)
        .unwrap();
    Text::with_baseline(&mood, Point::new(120, 72), style, Baseline::Top)
        .draw(display)
        .unwrap();
}

fn digit_formation(key: &str) -> Option<Formation> {
    let digit = key.strip_prefix("num").or_else(|| key.strip_prefix("kp"))?;
    let n: usize = digit.parse().ok()?;
    (1..=9).contains(&n).then(|| Formation::ALL[n - 1])
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::default();
    let mut display: SimulatorDisplay<Rgb565> =
        SimulatorDisplay::new(Size::new(settings.screen_width as u32, settings.screen_height as u32));
    let output_settings = OutputSettingsBuilder::new().scale(1).build();
    let mut window = Window::new("Ada Particles", &output_settings);

    let mut system = match AdaParticles::new(settings) {
        Ok(system) => system,
        Err(err) => {
            log::error!("particle system init failed: {}", err);
            std::process::exit(1);
        }
    };
    let mut ui = UiState {
        mood_index: 0,
        disconnected: false,
        particle_count: settings.default_particle_count,
        show_status: true,
    };

    let frame_duration = Duration::from_secs_f32(1.0 / TARGET_FPS as f32);
    let mut last_update = Instant::now();

    println!("=== Ada Particles - Simulator ===");
    println!("Controls:");
    println!("  1-9: Formation (idle, cloud, sun, rain, snow, heart, thinking, wave, disconnected)");
    println!("  M: Cycle mood");
    println!("  D: Toggle disconnected");
    println!("  +/-: Particle count");
    println!("  S: Toggle status overlay");
    println!("  Click: Touch");
    println!("  Q: Quit");

    'main_loop: loop {
        let now = Instant::now();
        let dt = now.duration_since(last_update).as_secs_f32();
        last_update = now;

        system.update(dt);
        system.render(&mut display).unwrap();
        draw_overlay(&mut display, &system, &ui);
        window.update(&display);

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'main_loop,
                SimulatorEvent::MouseButtonDown { point, .. } => {
                    system.on_touch(point.x, point.y);
                }
                SimulatorEvent::KeyDown { keycode, .. } => {
                    let key = format!("{:?}", keycode).to_lowercase();
                    if let Some(formation) = digit_formation(&key) {
                        system.set_formation(formation, settings.default_transition_ms);
                        continue;
                    }
                    match key.as_str() {
                        "m" => {
                            ui.mood_index = (ui.mood_index + 1) % MOODS.len();
                            let (name, valence, arousal) = MOODS[ui.mood_index];
                            system.set_mood(valence, arousal);
                            log::info!("mood: {} ({:.1}, {:.1})", name, valence, arousal);
                        }
                        "d" => {
                            ui.disconnected = !ui.disconnected;
                            system.set_disconnected(ui.disconnected);
                        }
                        "plus" | "equals" | "kpplus" => {
                            ui.particle_count = (ui.particle_count + COUNT_STEP).min(MAX_PARTICLES);
                            system.set_particle_count(ui.particle_count);
                            log::info!("particles: {}", system.target_particle_count());
                        }
                        "minus" | "kpminus" => {
                            ui.particle_count = ui
                                .particle_count
                                .saturating_sub(COUNT_STEP)
                                .max(settings.min_particle_count);
                            system.set_particle_count(ui.particle_count);
                            log::info!("particles: {}", system.target_particle_count());
                        }
                        "s" => ui.show_status = !ui.show_status,
                        "q" => break 'main_loop,
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        // Frame rate limiting
        let elapsed = now.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
    }

    log::info!("simulator closed: {}", system.status());
}
