use parry3d_f64::na;
use parry3d_f64::transformation::try_convex_hull;

use crate::error::{CsgError, Result};
use crate::math::{Plane, Point3};

/// Triangulated convex hull of a point cloud.
#[derive(Debug, Clone, Default)]
pub struct HullMesh {
    pub vertices: Vec<Point3>,
    pub triangles: Vec<[usize; 3]>,
}

impl HullMesh {
    /// Plane of every triangle, in triangle order. Slivers give invalid planes.
    pub fn planes(&self) -> impl Iterator<Item = Plane> + '_ {
        self.triangles.iter().map(|&[a, b, c]| {
            Plane::for_points(&self.vertices[a], &self.vertices[b], &self.vertices[c])
        })
    }
}

/// Drops points closer than `epsilon` to an earlier point.
#[must_use]
pub fn unique_points(points: impl IntoIterator<Item = Point3>, epsilon: f64) -> Vec<Point3> {
    let mut unique: Vec<Point3> = Vec::new();
    for point in points {
        if !unique.iter().any(|q| (q - point).norm() < epsilon) {
            unique.push(point);
        }
    }
    unique
}

/// `true` if the points do not all lie in one plane.
#[must_use]
pub fn spans_volume(points: &[Point3], epsilon: f64) -> bool {
    let Some(origin) = points.first() else {
        return false;
    };
    let Some(far) = points
        .iter()
        .max_by(|a, b| (*a - origin).norm().total_cmp(&(*b - origin).norm()))
    else {
        return false;
    };
    let axis = far - origin;
    if axis.norm() < epsilon {
        return false;
    }
    let Some(normal) = points
        .iter()
        .map(|p| axis.cross(&(p - origin)))
        .max_by(|a, b| a.norm().total_cmp(&b.norm()))
        .and_then(|n| n.try_normalize(epsilon * epsilon))
    else {
        return false;
    };
    points
        .iter()
        .any(|p| normal.dot(&(p - origin)).abs() > epsilon)
}

/// Computes the convex hull of `points`.
///
/// # Errors
///
/// Returns [`CsgError::TooFewPoints`] for fewer than four points and
/// [`CsgError::Hull`] if the points are coplanar or the hull fails.
pub fn convex_hull(points: &[Point3], epsilon: f64) -> Result<HullMesh> {
    if points.len() < 4 {
        return Err(CsgError::TooFewPoints(points.len()).into());
    }
    if !spans_volume(points, epsilon) {
        return Err(CsgError::Hull("points are coplanar".into()).into());
    }
    let input: Vec<na::Point3<f64>> = points
        .iter()
        .map(|p| na::Point3::new(p.x, p.y, p.z))
        .collect();
    let (vertices, indices) =
        try_convex_hull(&input).map_err(|err| CsgError::Hull(format!("{err:?}")))?;
    Ok(HullMesh {
        vertices: vertices
            .iter()
            .map(|p| Point3::new(p.x, p.y, p.z))
            .collect(),
        triangles: indices
            .iter()
            .map(|t| t.map(|i| i as usize))
            .collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::KernelError;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn cube_corners() -> Vec<Point3> {
        let mut corners = Vec::new();
        for x in [0.0, 1.0] {
            for y in [0.0, 1.0] {
                for z in [0.0, 1.0] {
                    corners.push(p(x, y, z));
                }
            }
        }
        corners
    }

    #[test]
    fn cube_hull_has_twelve_triangles() {
        let hull = convex_hull(&cube_corners(), 1e-3).unwrap();
        assert_eq!(hull.vertices.len(), 8);
        assert_eq!(hull.triangles.len(), 12);
        for plane in hull.planes() {
            assert!(plane.is_valid());
        }
    }

    #[test]
    fn coplanar_points_are_rejected() {
        let points = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)];
        assert!(!spans_volume(&points, 1e-3));
        assert!(matches!(
            convex_hull(&points, 1e-3),
            Err(KernelError::Csg(CsgError::Hull(_)))
        ));
    }

    #[test]
    fn too_few_points() {
        let points = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        assert!(matches!(
            convex_hull(&points, 1e-3),
            Err(KernelError::Csg(CsgError::TooFewPoints(3)))
        ));
    }

    #[test]
    fn near_duplicates_collapse() {
        let points = vec![p(0.0, 0.0, 0.0), p(1e-5, 0.0, 0.0), p(1.0, 0.0, 0.0)];
        assert_eq!(unique_points(points, 1e-3).len(), 2);
    }
}
