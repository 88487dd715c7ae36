//! Bounded hex grid topology

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::hex::{hex_to_world, world_to_hex, HexCoord, Point};

/// Grid shape and geometry
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HexGridConfig {
    /// Grid radius (hexagon-shaped grid)
    pub radius: i32,
    /// Outer radius of each hex in world units
    pub hex_size: f32,
}

impl Default for HexGridConfig {
    fn default() -> Self {
        Self {
            radius: 10,
            hex_size: 32.0,
        }
    }
}

/// Immutable set of valid coordinates plus world geometry
#[derive(Clone, Debug)]
pub struct HexGrid {
    config: HexGridConfig,
    coords: Vec<HexCoord>,
    valid: FxHashSet<HexCoord>,
}

impl HexGrid {
    /// Hexagon of `config.radius` around the origin
    pub fn new(config: HexGridConfig) -> Self {
        let radius = config.radius.max(0);
        let mut coords = Vec::new();
        for q in -radius..=radius {
            let r1 = (-radius).max(-q - radius);
            let r2 = radius.min(-q + radius);
            for r in r1..=r2 {
                coords.push(HexCoord::new(q, r));
            }
        }
        let valid = coords.iter().copied().collect();
        Self { config, coords, valid }
    }

    /// Irregular landmass from an explicit coordinate list.
    ///
    /// Duplicates are dropped; first occurrence keeps its position.
    pub fn from_coords(coords: impl IntoIterator<Item = HexCoord>, hex_size: f32) -> Self {
        let mut valid = FxHashSet::default();
        let coords: Vec<HexCoord> = coords.into_iter().filter(|c| valid.insert(*c)).collect();
        let radius = coords.iter().map(|c| c.distance_to_center()).max().unwrap_or(0);
        Self {
            config: HexGridConfig { radius, hex_size },
            coords,
            valid,
        }
    }

    pub fn is_valid(&self, coord: HexCoord) -> bool {
        self.valid.contains(&coord)
    }

    /// Valid neighbors of a coordinate (at most 6)
    pub fn neighbors(&self, coord: HexCoord) -> impl Iterator<Item = HexCoord> + '_ {
        coord.neighbors().into_iter().filter(move |n| self.is_valid(*n))
    }

    pub fn coords(&self) -> &[HexCoord] {
        &self.coords
    }

    pub fn hex_count(&self) -> usize {
        self.coords.len()
    }

    pub fn config(&self) -> &HexGridConfig {
        &self.config
    }

    pub fn radius(&self) -> i32 {
        self.config.radius
    }

    pub fn hex_size(&self) -> f32 {
        self.config.hex_size
    }

    pub fn hex_to_world(&self, coord: HexCoord) -> Point {
        hex_to_world(coord, self.config.hex_size)
    }

    pub fn world_to_hex(&self, pos: Point) -> HexCoord {
        world_to_hex(pos, self.config.hex_size)
    }

    /// Lower-left corner of the world bounding box
    pub fn world_min(&self) -> Point {
        if self.coords.is_empty() {
            return Point::default();
        }
        let (x, y) = self
            .coords
            .iter()
            .map(|&c| self.hex_to_world(c))
            .fold((f32::MAX, f32::MAX), |(x, y), p| (x.min(p.x), y.min(p.y)));
        Point::new(x - self.config.hex_size, y - self.config.hex_size)
    }

    /// Upper-right corner of the world bounding box
    pub fn world_max(&self) -> Point {
        if self.coords.is_empty() {
            return Point::default();
        }
        let (x, y) = self
            .coords
            .iter()
            .map(|&c| self.hex_to_world(c))
            .fold((f32::MIN, f32::MIN), |(x, y), p| (x.max(p.x), y.max(p.y)));
        Point::new(x + self.config.hex_size, y + self.config.hex_size)
    }

    pub fn world_center(&self) -> Point {
        let min = self.world_min();
        let max = self.world_max();
        Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0)
    }
}
