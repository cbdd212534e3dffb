use crate::action::Action;
use anaglyph_common::{SceneInstance, StereoMode, StereoParameters};
use anaglyph_render::{EyeFrames, ORBIT_NUDGE, OrbitCamera, eye_frames};
use anaglyph_scene::{DEFAULT_SEED, Scene};

/// Startup settings for [`AppState`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub box_count: usize,
    pub seed: u64,
    pub ipd: f32,
    pub mode: StereoMode,
    pub fov_degrees: f32,
    pub width: u32,
    pub height: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            box_count: 1,
            seed: DEFAULT_SEED,
            ipd: StereoParameters::default().ipd(),
            mode: StereoMode::None,
            fov_degrees: OrbitCamera::default().fov_degrees,
            width: 1024,
            height: 768,
        }
    }
}

/// What the main loop should do after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

/// Everything that changes between frames: camera, stereo settings, and scene.
pub struct AppState {
    pub camera: OrbitCamera,
    pub stereo: StereoParameters,
    pub scene: Scene,
    aspect: f32,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let camera = OrbitCamera {
            fov_degrees: config.fov_degrees,
            ..OrbitCamera::default()
        };
        Self {
            camera,
            stereo: StereoParameters::new(config.ipd, config.mode),
            scene: Scene::with_seed(config.seed, config.box_count),
            aspect: aspect_ratio(config.width, config.height),
        }
    }

    /// Projection aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn instances(&self) -> &[SceneInstance] {
        self.scene.instances()
    }

    /// Advance time-based state by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.camera.advance(dt);
    }

    /// Eye transforms for the current frame.
    pub fn eye_frames(&self) -> EyeFrames {
        eye_frames(&self.camera, &self.stereo, self.aspect)
    }

    pub fn log_mode(&self) {
        tracing::info!("Anaglyph mode: {}", self.stereo.mode);
    }

    /// Apply one action and report whether the loop should keep running.
    pub fn apply(&mut self, action: Action) -> Control {
        match action {
            Action::ToggleOrbit => {
                let orbiting = self.camera.toggle_orbit();
                tracing::info!("orbit {}", if orbiting { "on" } else { "off" });
            }
            Action::ResetCamera => {
                self.camera.reset();
                tracing::info!("Reset.");
            }
            Action::CycleStereoMode => {
                self.stereo.cycle_mode();
                self.log_mode();
            }
            Action::DecreaseIpd => {
                let ipd = self.stereo.decrease_ipd();
                tracing::info!("IPD: {ipd}");
            }
            Action::IncreaseIpd => {
                let ipd = self.stereo.increase_ipd();
                tracing::info!("IPD: {ipd}");
            }
            Action::SetBoxCount(count) => {
                self.scene.set_box_count(count);
                tracing::info!("scene regenerated with {count} boxes");
            }
            Action::OrbitUp => self.camera.nudge_polar(-ORBIT_NUDGE),
            Action::OrbitDown => self.camera.nudge_polar(ORBIT_NUDGE),
            Action::OrbitLeft => self.camera.nudge_azimuth(-ORBIT_NUDGE),
            Action::OrbitRight => self.camera.nudge_azimuth(ORBIT_NUDGE),
            Action::Quit => return Control::Exit,
        }
        Control::Continue
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    fn state() -> AppState {
        AppState::new(&AppConfig::default())
    }

    #[test]
    fn defaults_match_startup_settings() {
        let state = state();
        assert_eq!(state.stereo.mode, StereoMode::None);
        assert_eq!(state.stereo.ipd(), 20.0);
        assert_eq!(state.instances().len(), 1);
        assert!((state.aspect() - 1024.0 / 768.0).abs() < 1e-6);
        assert!(!state.eye_frames().is_stereo());
    }

    #[test]
    fn cycling_four_times_advances_one_mode() {
        let mut state = state();
        for _ in 0..3 {
            assert_eq!(state.apply(Action::CycleStereoMode), Control::Continue);
        }
        assert_eq!(state.stereo.mode, StereoMode::None);
        state.apply(Action::CycleStereoMode);
        assert_eq!(state.stereo.mode, StereoMode::ToeIn);
        assert!(state.eye_frames().is_stereo());
    }

    #[test]
    fn ipd_never_goes_negative() {
        let mut state = AppState::new(&AppConfig {
            ipd: 0.25,
            ..AppConfig::default()
        });
        for _ in 0..10 {
            state.apply(Action::DecreaseIpd);
        }
        assert_eq!(state.stereo.ipd(), 0.0);
        state.apply(Action::IncreaseIpd);
        assert!((state.stereo.ipd() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn box_count_actions_regenerate() {
        let mut state = state();
        state.apply(Action::SetBoxCount(100));
        assert_eq!(state.instances().len(), 100);
        state.apply(Action::SetBoxCount(1));
        assert_eq!(state.instances().len(), 1);
        assert_eq!(
            state.instances()[0].model,
            Mat4::from_scale(Vec3::splat(16.0))
        );
    }

    #[test]
    fn orbit_toggle_and_reset() {
        let mut state = state();
        state.apply(Action::ToggleOrbit);
        state.update(0.25);
        state.apply(Action::OrbitUp);
        state.apply(Action::OrbitRight);
        assert_ne!(state.camera.eye, OrbitCamera::HOME_EYE);

        state.apply(Action::ResetCamera);
        assert!(!state.camera.orbiting);
        assert_eq!(state.camera.eye, OrbitCamera::HOME_EYE);

        state.update(1.0);
        assert_eq!(state.camera.eye, OrbitCamera::HOME_EYE);
    }

    #[test]
    fn orbit_nudges_move_the_expected_axes() {
        let mut state = state();
        state.apply(Action::OrbitDown);
        assert!(state.camera.eye.y < 0.0);
        state.apply(Action::OrbitLeft);
        assert!(state.camera.eye.x > 0.0);
    }

    #[test]
    fn quit_exits() {
        let mut state = state();
        assert_eq!(state.apply(Action::Quit), Control::Exit);
    }

    #[test]
    fn viewport_changes_aspect() {
        let mut state = state();
        state.set_viewport(800, 800);
        assert_eq!(state.aspect(), 1.0);
        state.set_viewport(0, 0);
        assert_eq!(state.aspect(), 1.0);
    }
}
