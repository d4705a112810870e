//! pcdiff-core — labeled point cloud data model and shared types.

use std::fmt;
use std::str::FromStr;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

mod classes;

pub use classes::{class_color, class_name, KNOWN_CLASSES};

/// A classified 3D sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPoint")]
pub struct Point {
    pub class_id: i64,
    /// Always `class_name(class_id)`. Serialized for readers, recomputed on deserialize.
    class_name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Wire form accepted on deserialize; any incoming name is ignored.
#[derive(Deserialize)]
struct RawPoint { class_id: i64, x: f64, y: f64, z: f64 }

impl From<RawPoint> for Point {
    fn from(r: RawPoint) -> Self { Point::new(r.class_id, r.x, r.y, r.z) }
}

impl Point {
    pub fn new(class_id: i64, x: f64, y: f64, z: f64) -> Self {
        Self { class_id, class_name: class_name(class_id).into_owned(), x, y, z }
    }
    pub fn class_name(&self) -> &str { &self.class_name }
    pub fn position(&self) -> Point3<f64> { Point3::new(self.x, self.y, self.z) }
}

/// Axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds { pub min: Point3<f64>, pub max: Point3<f64> }

impl Bounds {
    /// `[0,0,0]–[1,1,1]`, used when there is nothing to bound.
    pub fn unit() -> Self {
        Self { min: Point3::origin(), max: Point3::new(1.0, 1.0, 1.0) }
    }

    /// Single linear min/max scan. Falls back to [`Bounds::unit`] for an empty slice.
    pub fn from_points(points: &[Point]) -> Self {
        if points.is_empty() { return Self::unit(); }
        let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x); min.y = min.y.min(p.y); min.z = min.z.min(p.z);
            max.x = max.x.max(p.x); max.y = max.y.max(p.y); max.z = max.z.max(p.z);
        }
        Self { min, max }
    }

    /// Midpoint of the two corners (not the centroid of the points).
    pub fn center(&self) -> Point3<f64> { nalgebra::center(&self.min, &self.max) }

    pub fn extent(&self) -> [f64; 3] {
        let d = self.max - self.min;
        [d.x, d.y, d.z]
    }

    pub fn contains(&self, p: [f64; 3]) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }
}

impl Default for Bounds {
    fn default() -> Self { Self::unit() }
}

/// Immutable snapshot of one loaded file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub name: String,
    /// Input line order; the comparator aligns clouds by this index.
    pub points: Vec<Point>,
    pub bounds: Bounds,
    pub center: Point3<f64>,
}

impl PointCloud {
    pub fn new(name: impl Into<String>, points: Vec<Point>) -> Self {
        let bounds = Bounds::from_points(&points);
        Self { name: name.into(), points, center: bounds.center(), bounds }
    }
    pub fn len(&self) -> usize { self.points.len() }
    pub fn is_empty(&self) -> bool { self.points.is_empty() }
    pub fn class_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.points.iter().map(|p| p.class_id)
    }
}

/// Which snapshot slot a cloud belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role { Before, After }

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self { Role::Before => "before", Role::After => "after" }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role '{0}' (expected 'before' or 'after')")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before" => Ok(Role::Before),
            "after" => Ok(Role::After),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}
