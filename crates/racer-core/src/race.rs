//! Race start rules and AI car placement.

use glam::Vec3;
use rand::Rng;

use crate::backend::RgbColor;

/// Where and how an AI car is placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AiSpawn {
    pub position: Vec3,
    pub color: RgbColor,
}

/// Square spawn region for AI cars, centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRegion {
    /// Cars spawn in `[-half_extent, half_extent)` on X and Z.
    pub half_extent: f32,
    /// Fixed spawn height.
    pub height: f32,
}

impl SpawnRegion {
    pub fn contains(&self, position: Vec3) -> bool {
        let in_range = |v: f32| v >= -self.half_extent && v <= self.half_extent;
        in_range(position.x) && in_range(position.z) && position.y == self.height
    }

    /// Draw one spawn point with a random colour.
    pub fn sample(&self, rng: &mut impl Rng) -> AiSpawn {
        let h = self.half_extent;
        let x = rng.random::<f32>() * 2.0 * h - h;
        let z = rng.random::<f32>() * 2.0 * h - h;
        AiSpawn {
            position: Vec3::new(x, self.height, z),
            color: RgbColor::from_hex(rng.random_range(0..=0x00ff_ffff)),
        }
    }

    /// Draw `count` spawn points.
    pub fn sample_batch(&self, rng: &mut impl Rng, count: usize) -> Vec<AiSpawn> {
        (0..count).map(|_| self.sample(rng)).collect()
    }
}
