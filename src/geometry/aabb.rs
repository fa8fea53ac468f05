//! Axis-aligned bounding boxes.

use cgmath::{EuclideanSpace, InnerSpace, Point3, Quaternion, Vector3};

/// Cardinal directions used to classify which wall of an enclosing box a
/// moving box has crossed. `In` points towards positive z, `Out` away from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compass {
    North,
    South,
    East,
    West,
    In,
    Out,
    NoDirection,
}

impl Compass {
    /// Unit vector for the direction.
    pub fn rose(self) -> Vector3<f32> {
        match self {
            Compass::North => Vector3::unit_y(),
            Compass::South => -Vector3::unit_y(),
            Compass::East => Vector3::unit_x(),
            Compass::West => -Vector3::unit_x(),
            Compass::In => Vector3::unit_z(),
            Compass::Out => -Vector3::unit_z(),
            Compass::NoDirection => Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

/// Axis-aligned bounding box kept as min/max corners.
///
/// The box is allowed to be degenerate (zero extent on any axis). All
/// constructors normalise the corners so `min <= max` holds per component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    min: Point3<f32>,
    max: Point3<f32>,
}

impl Aabb {
    pub fn new(a: Point3<f32>, b: Point3<f32>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Smallest box enclosing every point. Returns `None` for an empty set.
    pub fn enclosing(points: impl IntoIterator<Item = Point3<f32>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bb = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bb.min.x = bb.min.x.min(p.x);
            bb.min.y = bb.min.y.min(p.y);
            bb.min.z = bb.min.z.min(p.z);
            bb.max.x = bb.max.x.max(p.x);
            bb.max.y = bb.max.y.max(p.y);
            bb.max.z = bb.max.z.max(p.z);
        }
        Some(bb)
    }

    /// Smallest box enclosing every box.
    pub fn enclosing_boxes(boxes: &[Aabb]) -> Option<Self> {
        Self::enclosing(boxes.iter().flat_map(|b| [b.min, b.max]))
    }

    pub fn min(&self) -> Point3<f32> {
        self.min
    }

    pub fn max(&self) -> Point3<f32> {
        self.max
    }

    pub fn center(&self) -> Point3<f32> {
        self.min.midpoint(self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Half extent on each axis.
    pub fn extents(&self) -> Vector3<f32> {
        self.size() / 2.0
    }

    pub fn translate(&mut self, v: Vector3<f32>) {
        self.min += v;
        self.max += v;
    }

    /// Move the box so its center lands on `center`.
    pub fn move_to(&mut self, center: Point3<f32>) {
        let delta = center - self.center();
        self.translate(delta);
    }

    /// Scale the box about its own center. The corners are re-normalised,
    /// so a negative factor leaves the box the size of its absolute value.
    pub fn scale(&mut self, factor: f32) {
        let center = self.center();
        let half = self.extents() * factor;
        *self = Self::new(center - half, center + half);
    }

    /// Overlap test with strict inequalities. Boxes that merely touch along
    /// a face, edge or corner do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Which wall of `outer` this box has crossed, if any. Checked in the
    /// order east, west, north, south, in, out; the first crossing wins.
    pub fn escape_direction(&self, outer: &Aabb) -> Compass {
        if self.max.x > outer.max.x {
            Compass::East
        } else if self.min.x < outer.min.x {
            Compass::West
        } else if self.max.y > outer.max.y {
            Compass::North
        } else if self.min.y < outer.min.y {
            Compass::South
        } else if self.max.z > outer.max.z {
            Compass::In
        } else if self.min.z < outer.min.z {
            Compass::Out
        } else {
            Compass::NoDirection
        }
    }

    /// Bounds of this box after rotating it about its own center.
    ///
    /// The result re-bounds the eight rotated corners, so repeated calls on
    /// a non-axis-aligned shape are conservative rather than exact. A
    /// near-identity rotation returns the box unchanged.
    pub fn bounds_if_rotated(&self, rotation: Quaternion<f32>) -> Aabb {
        if rotation.v.magnitude2() < 1e-12 {
            return *self;
        }
        let center = self.center();
        let corners = self.corners();
        let rotated = corners
            .iter()
            .map(|c| center + rotation * (c - center));
        Self::enclosing(rotated).unwrap_or(*self)
    }

    /// The eight corners, min first and max last.
    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (n, x) = (self.min, self.max);
        [
            Point3::new(n.x, n.y, n.z),
            Point3::new(x.x, n.y, n.z),
            Point3::new(n.x, x.y, n.z),
            Point3::new(x.x, x.y, n.z),
            Point3::new(n.x, n.y, x.z),
            Point3::new(x.x, n.y, x.z),
            Point3::new(n.x, x.y, x.z),
            Point3::new(x.x, x.y, x.z),
        ]
    }

    /// The six faces as quads with outward counter-clockwise winding,
    /// ordered west, east, south, north, out, in. Handy for visualising
    /// bounds with a line or triangle batch.
    pub fn surfaces(&self) -> Vec<[Vector3<f32>; 4]> {
        let (n, x) = (self.min.to_vec(), self.max.to_vec());
        vec![
            // west (-x)
            [
                Vector3::new(n.x, n.y, n.z),
                Vector3::new(n.x, n.y, x.z),
                Vector3::new(n.x, x.y, x.z),
                Vector3::new(n.x, x.y, n.z),
            ],
            // east (+x)
            [
                Vector3::new(x.x, n.y, x.z),
                Vector3::new(x.x, n.y, n.z),
                Vector3::new(x.x, x.y, n.z),
                Vector3::new(x.x, x.y, x.z),
            ],
            // south (-y)
            [
                Vector3::new(n.x, n.y, n.z),
                Vector3::new(x.x, n.y, n.z),
                Vector3::new(x.x, n.y, x.z),
                Vector3::new(n.x, n.y, x.z),
            ],
            // north (+y)
            [
                Vector3::new(n.x, x.y, x.z),
                Vector3::new(x.x, x.y, x.z),
                Vector3::new(x.x, x.y, n.z),
                Vector3::new(n.x, x.y, n.z),
            ],
            // out (-z)
            [
                Vector3::new(x.x, n.y, n.z),
                Vector3::new(n.x, n.y, n.z),
                Vector3::new(n.x, x.y, n.z),
                Vector3::new(x.x, x.y, n.z),
            ],
            // in (+z)
            [
                Vector3::new(n.x, n.y, x.z),
                Vector3::new(x.x, n.y, x.z),
                Vector3::new(x.x, x.y, x.z),
                Vector3::new(n.x, x.y, x.z),
            ],
        ]
    }
}
