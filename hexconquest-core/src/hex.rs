//! Hex coordinates with axial (q, r) addressing and pointy-top geometry

use serde::{Deserialize, Serialize};

const SQRT3: f32 = 1.732_050_8;

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

/// Direction vectors in axial coordinates (dq, dr)
/// Index: 0=E, 1=NE, 2=NW, 3=W, 4=SW, 5=SE
pub const HEX_DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),   // E
    (1, -1),  // NE
    (0, -1),  // NW
    (-1, 0),  // W
    (-1, 1),  // SW
    (0, 1),   // SE
];

impl HexCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub const fn cube_x(&self) -> i32 {
        self.q
    }

    pub const fn cube_y(&self) -> i32 {
        -self.q - self.r
    }

    pub const fn cube_z(&self) -> i32 {
        self.r
    }

    /// Distance between two hexes in steps
    pub fn distance_to(&self, other: HexCoord) -> i32 {
        ((self.cube_x() - other.cube_x()).abs()
            + (self.cube_y() - other.cube_y()).abs()
            + (self.cube_z() - other.cube_z()).abs())
            / 2
    }

    /// Distance from the origin
    pub fn distance_to_center(&self) -> i32 {
        self.distance_to(HexCoord::new(0, 0))
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: usize) -> HexCoord {
        let (dq, dr) = HEX_DIRECTIONS[direction % 6];
        HexCoord::new(self.q + dq, self.r + dr)
    }

    /// All six neighbors, valid or not
    pub fn neighbors(&self) -> [HexCoord; 6] {
        std::array::from_fn(|dir| self.neighbor(dir))
    }
}

/// A point in world space
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Center of a hex in world space.
///
/// `hex_size` is the outer radius (center to corner).
pub fn hex_to_world(coord: HexCoord, hex_size: f32) -> Point {
    let q = coord.q as f32;
    let r = coord.r as f32;
    Point::new(
        hex_size * (SQRT3 * q + SQRT3 / 2.0 * r),
        hex_size * (1.5 * r),
    )
}

/// Nearest hex to a world position.
///
/// Rounds each cube component, then recomputes the component with the
/// largest rounding error so that `x + y + z == 0` still holds.
pub fn world_to_hex(pos: Point, hex_size: f32) -> HexCoord {
    let fq = (SQRT3 / 3.0 * pos.x - pos.y / 3.0) / hex_size;
    let fr = (2.0 / 3.0 * pos.y) / hex_size;

    let x = fq;
    let z = fr;
    let y = -x - z;

    let mut rx = x.round();
    let ry = y.round();
    let mut rz = z.round();

    let x_diff = (rx - x).abs();
    let y_diff = (ry - y).abs();
    let z_diff = (rz - z).abs();

    if x_diff > y_diff && x_diff > z_diff {
        rx = -ry - rz;
    } else if y_diff <= z_diff {
        rz = -rx - ry;
    }

    HexCoord::new(rx as i32, rz as i32)
}
