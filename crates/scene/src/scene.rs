use anaglyph_common::SceneInstance;
use glam::{Mat4, Quat, Vec3};
use rand::{Rng, SeedableRng as _};
use rand_xoshiro::Xoshiro256Plus;
use std::f32::consts::TAU;

/// Seed used when none is given, so runs are repeatable by default.
pub const DEFAULT_SEED: u64 = 2024;

/// Box count bound to the "many boxes" key.
pub const MANY_BOXES: usize = 100;

/// Uniform scale of the lone box in a single-box scene.
const DEBUG_BOX_SCALE: f32 = 16.0;

/// Random boxes are placed inside a cube of this edge length centered on the origin.
const FIELD_EXTENT: f32 = 100.0;

/// The set of boxes to draw, each represented only by its model transform.
///
/// The generator keeps one RNG for its whole lifetime, so regenerating with the
/// same count yields a fresh arrangement rather than repeating the last one.
pub struct Scene {
    seed: u64,
    rng: Xoshiro256Plus,
    box_count: usize,
    instances: Vec<SceneInstance>,
}

impl Scene {
    /// Create a scene with `box_count` boxes, drawing randomness from `seed`.
    pub fn with_seed(seed: u64, box_count: usize) -> Self {
        let mut scene = Self {
            seed,
            rng: Xoshiro256Plus::seed_from_u64(seed),
            box_count,
            instances: Vec::new(),
        };
        scene.regenerate();
        scene
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn box_count(&self) -> usize {
        self.box_count
    }

    /// Read-only access to the current instances, in draw order.
    pub fn instances(&self) -> &[SceneInstance] {
        &self.instances
    }

    /// Set the box count and rebuild the scene from scratch.
    pub fn set_box_count(&mut self, box_count: usize) {
        self.box_count = box_count;
        self.regenerate();
    }

    /// Discard every instance and generate a new list for the current count.
    pub fn regenerate(&mut self) {
        let _span = tracing::debug_span!("scene_regenerate", count = self.box_count).entered();

        self.instances = match self.box_count {
            1 => vec![SceneInstance::new(debug_box())],
            n => (0..n)
                .map(|_| SceneInstance::new(random_box(&mut self.rng)))
                .collect(),
        };

        tracing::debug!("generated {} box instances", self.instances.len());
    }
}

/// One large box at the origin, useful for checking the stereo math by eye.
fn debug_box() -> Mat4 {
    Mat4::from_translation(Vec3::ZERO) * Mat4::from_scale(Vec3::splat(DEBUG_BOX_SCALE))
}

fn random_box(rng: &mut impl Rng) -> Mat4 {
    let position = FIELD_EXTENT * (random_vec3(rng) - 0.5);
    let scale = rng.random_range(1..=4u32) as f32;
    let angle = rng.random::<f32>() * TAU;
    let axis = (random_vec3(rng) - 0.5).try_normalize().unwrap_or(Vec3::Y);

    Mat4::from_translation(position)
        * Mat4::from_quat(Quat::from_axis_angle(axis, angle))
        * Mat4::from_scale(Vec3::splat(scale))
}

fn random_vec3(rng: &mut impl Rng) -> Vec3 {
    Vec3::new(rng.random(), rng.random(), rng.random())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_box_is_deterministic() {
        let expected =
            Mat4::from_translation(Vec3::ZERO) * Mat4::from_scale(Vec3::new(16.0, 16.0, 16.0));

        for seed in [0, 1, DEFAULT_SEED, u64::MAX] {
            let scene = Scene::with_seed(seed, 1);
            assert_eq!(scene.instances().len(), 1);
            assert_eq!(scene.instances()[0].model, expected);
        }
    }

    #[test]
    fn many_boxes_stay_in_range() {
        let scene = Scene::with_seed(DEFAULT_SEED, MANY_BOXES);
        assert_eq!(scene.instances().len(), MANY_BOXES);

        for instance in scene.instances() {
            let (scale, rotation, translation) = instance.model.to_scale_rotation_translation();

            assert!(translation.cmpge(Vec3::splat(-50.0)).all(), "{translation}");
            assert!(translation.cmplt(Vec3::splat(50.0)).all(), "{translation}");

            let s = scale.x.round();
            assert!((1.0..=4.0).contains(&s), "scale {scale}");
            assert!(scale.abs_diff_eq(Vec3::splat(s), 1e-4), "non-uniform {scale}");

            assert!(rotation.is_normalized());
        }
    }

    #[test]
    fn same_seed_same_scene() {
        let a = Scene::with_seed(7, 25);
        let b = Scene::with_seed(7, 25);
        assert_eq!(a.instances(), b.instances());

        let c = Scene::with_seed(8, 25);
        assert_ne!(a.instances(), c.instances());
    }

    #[test]
    fn regeneration_replaces_wholesale() {
        let mut scene = Scene::with_seed(DEFAULT_SEED, MANY_BOXES);
        let first: Vec<_> = scene.instances().to_vec();

        scene.set_box_count(1);
        assert_eq!(scene.box_count(), 1);
        assert_eq!(scene.instances().len(), 1);

        scene.set_box_count(MANY_BOXES);
        assert_eq!(scene.instances().len(), MANY_BOXES);
        // The RNG has advanced, so the new field differs from the first one.
        assert_ne!(scene.instances(), first.as_slice());
    }

    #[test]
    fn zero_boxes_is_empty() {
        let scene = Scene::with_seed(DEFAULT_SEED, 0);
        assert!(scene.instances().is_empty());
    }
}
