use super::{Axis, Plane, Point3, Vector3};

/// Compute the area of a 3D polygon (coplanar points).
///
/// Uses the cross-product summation method projected along the polygon normal.
#[must_use]
pub fn polygon_area_3d(points: &[Point3], normal: &Vector3) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    0.5 * polygon_cross_sum(points).dot(normal).abs()
}

/// Newell normal of a polygon, unnormalized; its length is twice the area.
#[must_use]
pub fn polygon_cross_sum(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut cross_sum = Vector3::zeros();
    if n < 3 {
        return cross_sum;
    }
    let o = &points[0];
    for i in 1..n {
        let a = points[i] - o;
        let b = points[(i + 1) % n] - o;
        cross_sum += a.cross(&b);
    }
    cross_sum
}

/// Area-weighted centroid of a planar polygon.
///
/// The polygon is projected onto the coordinate plane perpendicular to the
/// dominant axis of the plane normal, the 2D centroid is found with the
/// shoelace formula, and the remaining coordinate is recovered from the
/// plane equation. Returns `None` for polygons with no area.
#[must_use]
pub fn polygon_centroid(points: &[Point3], plane: &Plane) -> Option<Point3> {
    if points.len() < 3 {
        return None;
    }
    let z = Axis::dominant(&plane.normal).index();
    let x = (z + 1) % 3;
    let y = (z + 2) % 3;

    let n = points.len();
    let mut area2 = 0.0;
    let mut x_sum = 0.0;
    let mut y_sum = 0.0;
    let mut i = n - 1;
    for j in 0..n {
        let (pi, pj) = (&points[i], &points[j]);
        let a = pi[x] * pj[y] - pj[x] * pi[y];
        area2 += a;
        x_sum += (pi[x] + pj[x]) * a;
        y_sum += (pi[y] + pj[y]) * a;
        i = j;
    }
    if area2.abs() < f64::EPSILON {
        return None;
    }

    let mut centroid = Point3::origin();
    centroid[x] = x_sum / (3.0 * area2);
    centroid[y] = y_sum / (3.0 * area2);
    // Solve the plane equation for the projected-away coordinate.
    let nz = plane.normal[z];
    centroid[z] = (plane.dist - plane.normal[x] * centroid[x] - plane.normal[y] * centroid[y]) / nz;
    Some(centroid)
}

/// Arithmetic mean of the points.
#[must_use]
pub fn vertex_average(points: &[Point3]) -> Option<Point3> {
    if points.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let inv_n = 1.0 / points.len() as f64;
    let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum * inv_n))
}
