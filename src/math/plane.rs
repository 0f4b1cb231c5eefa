use super::{Axis, Matrix4, Point3, Vector3, NORMAL_LENGTH_TOLERANCE};

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    Front,
    Back,
    On,
}

/// A half-space boundary `normal . x = dist`.
///
/// Points with `normal . x > dist` are in front (outside the brush); a brush
/// is the intersection of the back sides of its planes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plane {
    /// Outward unit normal.
    pub normal: Vector3,
    /// Signed distance from the origin along `normal`.
    pub dist: f64,
}

impl Plane {
    /// Creates a plane from a normal and distance without normalizing.
    #[must_use]
    pub fn new(normal: Vector3, dist: f64) -> Self {
        Self { normal, dist }
    }

    /// Creates a plane through `point` with the given normal direction.
    ///
    /// A zero-length normal yields an invalid plane.
    #[must_use]
    pub fn from_point_normal(point: &Point3, normal: &Vector3) -> Self {
        let normal = normal.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
        Self {
            normal,
            dist: normal.dot(&point.coords),
        }
    }

    /// Plane through three points, counter-clockwise when viewed from the
    /// front.
    ///
    /// Collinear input produces a zero normal, which [`Plane::is_valid`]
    /// rejects.
    #[must_use]
    pub fn for_points(p0: &Point3, p1: &Point3, p2: &Point3) -> Self {
        let cross = (p1 - p0).cross(&(p2 - p0));
        Self::from_point_normal(p0, &cross)
    }

    /// `true` if the normal is unit length.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.dist.is_finite()
            && (self.normal.dot(&self.normal) - 1.0).abs() < NORMAL_LENGTH_TOLERANCE
    }

    /// The same plane facing the other way.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            dist: -self.dist,
        }
    }

    /// The plane moved by `amount` along its own normal.
    #[must_use]
    pub fn offset(&self, amount: f64) -> Self {
        Self {
            normal: self.normal,
            dist: self.dist + amount,
        }
    }

    /// Signed distance from the plane to `point`.
    #[must_use]
    pub fn distance_to(&self, point: &Point3) -> f64 {
        self.normal.dot(&point.coords) - self.dist
    }

    /// Classifies a signed distance against `epsilon`.
    #[must_use]
    pub fn classify_distance(distance: f64, epsilon: f64) -> PlaneSide {
        if distance > epsilon {
            PlaneSide::Front
        } else if distance < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::On
        }
    }

    /// Classifies `point` against this plane.
    #[must_use]
    pub fn classify(&self, point: &Point3, epsilon: f64) -> PlaneSide {
        Self::classify_distance(self.distance_to(point), epsilon)
    }

    /// Equality with separate tolerances for direction and distance.
    ///
    /// Normals are compared per component.
    #[must_use]
    pub fn equals(&self, other: &Self, normal_epsilon: f64, dist_epsilon: f64) -> bool {
        self.normal_equals(other, normal_epsilon) && (self.dist - other.dist).abs() < dist_epsilon
    }

    /// `true` if `other` is this plane flipped.
    #[must_use]
    pub fn opposes(&self, other: &Self, normal_epsilon: f64, dist_epsilon: f64) -> bool {
        self.equals(&other.flipped(), normal_epsilon, dist_epsilon)
    }

    /// Per-component normal comparison.
    #[must_use]
    pub fn normal_equals(&self, other: &Self, epsilon: f64) -> bool {
        (self.normal - other.normal).iter().all(|c| c.abs() < epsilon)
    }

    /// Closest point on the plane to the origin.
    #[must_use]
    pub fn origin(&self) -> Point3 {
        Point3::from(self.normal * self.dist)
    }

    /// Two unit vectors spanning the plane with `u x v == normal`.
    ///
    /// The reference axis is picked from the dominant normal component so
    /// the basis stays well conditioned.
    #[must_use]
    pub fn basis(&self) -> (Vector3, Vector3) {
        let reference = match Axis::dominant(&self.normal) {
            Axis::X | Axis::Y => Vector3::z(),
            Axis::Z => Vector3::x(),
        };
        let up = (reference - self.normal * reference.dot(&self.normal))
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::y);
        let right = up.cross(&self.normal);
        (right, up)
    }

    /// Intersection of segment `a -> b` with the plane, if it crosses.
    #[must_use]
    pub fn intersect_segment(&self, a: &Point3, b: &Point3) -> Option<Point3> {
        let da = self.distance_to(a);
        let db = self.distance_to(b);
        let denom = da - db;
        if denom.abs() <= f64::EPSILON || da * db > 0.0 {
            return None;
        }
        Some(a + (b - a) * (da / denom))
    }

    /// The single point shared by three planes, if their normals are
    /// linearly independent.
    #[must_use]
    pub fn intersect_three(a: &Self, b: &Self, c: &Self) -> Option<Point3> {
        let det = a.normal.dot(&b.normal.cross(&c.normal));
        if det.abs() < 1e-12 {
            return None;
        }
        let v = b.normal.cross(&c.normal) * a.dist
            + c.normal.cross(&a.normal) * b.dist
            + a.normal.cross(&b.normal) * c.dist;
        Some(Point3::from(v / det))
    }

    /// Applies an affine transform.
    ///
    /// The normal goes through the inverse transpose of the linear part, so
    /// orientation survives mirroring. Returns `None` for a singular matrix.
    #[must_use]
    pub fn transformed(&self, matrix: &Matrix4) -> Option<Self> {
        let linear = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear.try_inverse()?.transpose();
        let normal = (normal_matrix * self.normal).try_normalize(0.0)?;
        let point = matrix.transform_point(&self.origin());
        Some(Self {
            normal,
            dist: normal.dot(&point.coords),
        })
    }
}
