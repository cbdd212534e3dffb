use anaglyph_common::StereoMode;
use anaglyph_input::{Action, AppConfig, AppState};
use anaglyph_render::{DebugTextRenderer, EyeFrame, EyeFrames, RecordingBackend, composite};
use anaglyph_scene::DEFAULT_SEED;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "anaglyph-cli", about = "Inspect stereo eye math and frame plans without a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print per-eye positions and view-projection matrices
    Eyes {
        #[command(flatten)]
        view: ViewArgs,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the clear/mask/draw sequence for one frame
    Plan {
        #[command(flatten)]
        view: ViewArgs,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the generated box transforms
    Scene {
        /// Number of boxes
        #[arg(short, long, default_value_t = 1)]
        boxes: usize,
        /// RNG seed for box placement
        #[arg(short, long, default_value_t = DEFAULT_SEED)]
        seed: u64,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Camera and stereo settings shared by the frame-level subcommands.
#[derive(Args)]
struct ViewArgs {
    /// Stereo mode: none, toe-in or asymmetric
    #[arg(short, long, default_value = "asymmetric")]
    mode: StereoMode,
    /// Interocular distance
    #[arg(long, default_value_t = 20.0)]
    ipd: f32,
    /// Number of boxes in the scene
    #[arg(short, long, default_value_t = 1)]
    boxes: usize,
    /// RNG seed for box placement
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Viewport width used for the aspect ratio
    #[arg(long, default_value_t = 1024)]
    width: u32,
    /// Viewport height used for the aspect ratio
    #[arg(long, default_value_t = 768)]
    height: u32,
    /// Orbit steps to the right (negative for left), as if pressing the arrow keys
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    orbit_right: i32,
    /// Orbit steps up (negative for down)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    orbit_up: i32,
}

impl ViewArgs {
    fn state(&self) -> AppState {
        let mut state = AppState::new(&AppConfig {
            box_count: self.boxes,
            seed: self.seed,
            ipd: self.ipd,
            mode: self.mode,
            width: self.width,
            height: self.height,
            ..AppConfig::default()
        });

        let horizontal = if self.orbit_right >= 0 {
            Action::OrbitRight
        } else {
            Action::OrbitLeft
        };
        let vertical = if self.orbit_up >= 0 {
            Action::OrbitUp
        } else {
            Action::OrbitDown
        };
        for _ in 0..self.orbit_right.unsigned_abs() {
            state.apply(horizontal);
        }
        for _ in 0..self.orbit_up.unsigned_abs() {
            state.apply(vertical);
        }
        state
    }
}

fn print_eye(name: &str, eye: &EyeFrame) {
    let p = eye.position;
    println!("{name}: eye=({:.4}, {:.4}, {:.4})", p.x, p.y, p.z);
    let vp = eye.view_projection();
    for row in 0..4 {
        let r = vp.row(row);
        println!(
            "  [{:>10.5} {:>10.5} {:>10.5} {:>10.5}]",
            r.x, r.y, r.z, r.w
        );
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("anaglyph-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", anaglyph_render::crate_info());
            let modes: Vec<_> = StereoMode::ALL.iter().map(|m| m.label()).collect();
            println!("stereo modes: {}", modes.join(", "));
        }
        Commands::Eyes { view, json } => {
            let state = view.state();
            let eyes = state.eye_frames();
            if json {
                println!("{}", serde_json::to_string_pretty(&eyes)?);
                return Ok(());
            }
            println!(
                "mode={} ipd={:.2} aspect={:.4}",
                state.stereo.mode,
                state.stereo.ipd(),
                state.aspect()
            );
            match &eyes {
                EyeFrames::Mono(eye) => print_eye("center", eye),
                EyeFrames::Stereo { left, right } => {
                    print_eye("left", left);
                    print_eye("right", right);
                }
            }
        }
        Commands::Plan { view, json } => {
            let state = view.state();
            if json {
                let mut backend = RecordingBackend::new();
                composite(&state.eye_frames(), state.instances(), &mut backend);
                let plan = backend.into_plan();
                tracing::debug!("{} draws across {} passes", plan.draw_count(), plan.passes().len());
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                let text = DebugTextRenderer::new().render(
                    &state.camera,
                    &state.stereo,
                    state.aspect(),
                    state.instances(),
                );
                print!("{text}");
            }
        }
        Commands::Scene { boxes, seed, json } => {
            let scene = anaglyph_scene::Scene::with_seed(seed, boxes);
            if json {
                println!("{}", serde_json::to_string_pretty(scene.instances())?);
                return Ok(());
            }
            println!("Scene: seed={seed}, boxes={}", scene.instances().len());
            for (i, instance) in scene.instances().iter().enumerate() {
                let (scale, rotation, translation) = instance.model.to_scale_rotation_translation();
                let (axis, angle) = rotation.to_axis_angle();
                println!(
                    "  [{i:>3}] pos=({:.2}, {:.2}, {:.2}) scale={:.1} rot={:.3} rad about ({:.2}, {:.2}, {:.2})",
                    translation.x,
                    translation.y,
                    translation.z,
                    scale.x,
                    angle,
                    axis.x,
                    axis.y,
                    axis.z
                );
            }
        }
    }

    Ok(())
}
