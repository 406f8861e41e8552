//! Skyburst headless runner
//!
//! Runs a celebration without a window and logs what the simulation does.
//! Usage: `skyburst [settings.json] [--seconds N] [--seed N] [--preset desktop|mobile]`
//! (`RUST_LOG=debug` shows launches, bursts and evictions).

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use skyburst::renderer::FrameBuffers;
    use skyburst::sim::{FireworkShow, FrameInput, LaunchRequest, tick};
    use skyburst::{DevicePreset, PerformanceGovernor, Settings};

    const FRAME_DT: f32 = 1.0 / 60.0;

    /// Celebration captions for user-triggered bursts
    const CAPTIONS: [&str; 6] = [
        "Happy New Year!",
        "Make a wish",
        "Sparkle on",
        "Here's to the year ahead",
        "Shine bright",
        "Cheers!",
    ];

    struct Options {
        settings_path: Option<String>,
        seconds: f32,
        seed: u64,
        preset: Option<DevicePreset>,
    }

    fn parse_args() -> Options {
        let mut options = Options {
            settings_path: None,
            seconds: 20.0,
            seed: 2026,
            preset: None,
        };
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seconds" => match args.next().and_then(|v| v.parse().ok()) {
                    Some(s) => options.seconds = s,
                    None => log::warn!("--seconds expects a number"),
                },
                "--seed" => match args.next().and_then(|v| v.parse().ok()) {
                    Some(s) => options.seed = s,
                    None => log::warn!("--seed expects an integer"),
                },
                "--preset" => match args.next().as_deref().and_then(DevicePreset::parse) {
                    Some(p) => options.preset = Some(p),
                    None => log::warn!("--preset expects desktop or mobile"),
                },
                path => options.settings_path = Some(path.to_string()),
            }
        }
        options
    }

    fn load_settings(options: &Options) -> Settings {
        let mut settings = match &options.settings_path {
            Some(path) => Settings::load(path).unwrap_or_else(|e| {
                log::error!("Failed to load {path}: {e}; using defaults");
                Settings::default()
            }),
            None => Settings::default(),
        };
        if let Some(preset) = options.preset {
            settings.apply_preset(preset);
        }
        settings
    }

    /// Stand-in for GPU cost: a fixed base plus a per-instance charge, scaled
    /// by the square of the render scale (pixel count)
    fn synthetic_frame_ms(instances: usize, scale: f32) -> f32 {
        6.0 + instances as f32 * 0.0025 * scale * scale
    }

    pub fn run() {
        let options = parse_args();
        let settings = load_settings(&options);
        log::info!(
            "Skyburst: {:.0}s celebration, seed {}, {} preset",
            options.seconds,
            options.seed,
            settings.preset.as_str()
        );

        let mut governor = PerformanceGovernor::new(&settings.governor, 2.0);
        let mut show = FireworkShow::new(settings, options.seed);
        let mut buffers = FrameBuffers::new();
        show.start_celebration();

        let frames = (options.seconds.max(0.0) / FRAME_DT).round() as u64;
        let mut captions = 0usize;
        let mut bursts_this_second = 0usize;

        for frame in 1..=frames {
            // A "tap" every three seconds on top of the automatic show
            let input = if frame % 180 == 0 {
                FrameInput {
                    launches: vec![LaunchRequest::user(Vec2::new(-0.6, 0.4))],
                }
            } else {
                FrameInput::default()
            };

            for event in tick(&mut show, &input, FRAME_DT) {
                bursts_this_second += 1;
                if event.user_triggered {
                    let caption = CAPTIONS[captions % CAPTIONS.len()];
                    captions += 1;
                    log::debug!(
                        "\"{caption}\" over ({:.2}, {:.2}, {:.2}) [{}]",
                        event.position.x,
                        event.position.y,
                        event.position.z,
                        event.pattern
                    );
                }
            }

            buffers.rebuild(&show);
            governor.observe(synthetic_frame_ms(buffers.instance_count(), governor.scale()));

            if frame % 60 == 0 {
                log::info!(
                    "t={:5.1}s rockets={} bursts={} particles={} embers={} bursts/s={} scale={:.2}",
                    show.time,
                    show.rockets.len(),
                    show.bursts.len(),
                    show.bursts.particle_count(),
                    show.embers.live_count(),
                    bursts_this_second,
                    governor.scale()
                );
                bursts_this_second = 0;
            }
        }

        show.stop_celebration();
        log::info!(
            "Done: {} rockets launched, {} bursts ({} secondary), {} bursts evicted, {} captions",
            show.rockets.launched_total(),
            show.bursts.spawned_total(),
            show.bursts.secondary_total(),
            show.bursts.evicted_total(),
            captions
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the embedding page on the web
}
