use tracing::{debug, trace, warn};

use crate::config::KernelConfig;
use crate::math::{Aabb, Plane};
use crate::topology::{
    next_edge, next_vertex, repair_connectivity, unique_rings, BRep, DegenerateReason,
    FaceVertexId, TopologyIssue, TopologyStatus, UniqueEdge,
};
use crate::winding::Winding;

/// Builds the boundary representation of the solid bounded by `planes`.
///
/// Every face is clipped against the others, the adjacency graph is
/// repaired, and shared edges and vertices are collapsed into unique lists.
/// A brush that encloses no volume yields a degenerate snapshot with empty
/// windings rather than an error.
#[must_use]
pub fn build_brep(planes: &[Plane], config: &KernelConfig) -> BRep {
    let face_count = planes.len();
    let invalid_faces: Vec<usize> = planes
        .iter()
        .enumerate()
        .filter(|(_, plane)| !plane.is_valid())
        .map(|(i, _)| i)
        .collect();

    let unique: Vec<bool> = (0..face_count)
        .map(|i| plane_unique(planes, i, config))
        .collect();
    let mut windings: Vec<Winding> = (0..face_count)
        .map(|i| face_winding(planes, &unique, i, config))
        .collect();

    if let Some(reason) = open_reason(&windings) {
        debug!(faces = face_count, ?reason, "brush is degenerate");
        return BRep::degenerate(face_count, reason, invalid_faces);
    }

    let report = repair_connectivity(&mut windings, config.degenerate_edge_epsilon);
    if !report.is_clean() {
        trace!(?report, "repaired brush connectivity");
    }
    if let Some(reason) = degenerate_reason(&windings) {
        debug!(faces = face_count, ?reason, "brush is degenerate after repair");
        return BRep::degenerate(face_count, reason, invalid_faces);
    }

    let mut brep = connect(windings, config.max_faces);
    brep.invalid_faces = invalid_faces;
    brep.centroids = brep
        .windings
        .iter()
        .zip(planes)
        .map(|(winding, plane)| {
            if winding.contributes() {
                winding.centroid(plane)
            } else {
                None
            }
        })
        .collect();
    brep.bounds = Aabb::from_points(brep.all_points());

    debug!(
        faces = brep.contributing_faces(),
        vertices = brep.vertices.len(),
        edges = brep.edges.len(),
        "rebuilt brush"
    );
    brep
}

/// `false` if another face has the same normal and a plane that is at least
/// as tight, which makes the face at `index` redundant.
///
/// Exact distance ties go to the lower index.
#[must_use]
pub fn plane_unique(planes: &[Plane], index: usize, config: &KernelConfig) -> bool {
    let plane = &planes[index];
    planes.iter().enumerate().all(|(j, other)| {
        if j == index || !plane.normal_equals(other, config.plane_normal_epsilon) {
            return true;
        }
        #[allow(clippy::float_cmp)]
        let tied = plane.dist == other.dist;
        if tied {
            index < j
        } else {
            plane.dist < other.dist
        }
    })
}

/// Clips the seed polygon of face `index` against every other face.
fn face_winding(planes: &[Plane], unique: &[bool], index: usize, config: &KernelConfig) -> Winding {
    let plane = &planes[index];
    if !plane.is_valid() || !unique[index] {
        return Winding::new();
    }

    let mut winding = Winding::infinite(plane, config.infinite_extent());
    for (i, clip) in planes.iter().enumerate() {
        if i == index
            || !clip.is_valid()
            || !unique[i]
            || config.planes_equal(clip, plane)
            || config.planes_opposing(plane, clip)
        {
            continue;
        }
        // The solid is on the back of each face, which is the front of its flip.
        winding = winding.clip(&clip.flipped(), i, config.clip_epsilon);
        if winding.is_empty() {
            break;
        }
    }
    winding
}

/// Face count and boundedness. Clipping can leave one-point windings where
/// a plane touches a single corner, so vertex parity waits for repair.
fn open_reason(windings: &[Winding]) -> Option<DegenerateReason> {
    let contributing = windings.iter().filter(|w| w.contributes()).count();
    if contributing < 4 {
        return Some(DegenerateReason::TooFewFaces { contributing });
    }
    if windings
        .iter()
        .filter(|w| w.contributes())
        .any(|w| !w.is_bounded())
    {
        return Some(DegenerateReason::Unbounded);
    }
    None
}

fn degenerate_reason(windings: &[Winding]) -> Option<DegenerateReason> {
    if let Some(reason) = open_reason(windings) {
        return Some(reason);
    }
    let count: usize = windings.iter().map(Winding::len).sum();
    if count % 2 != 0 {
        return Some(DegenerateReason::OddVertexCount { count });
    }
    None
}

/// Collapses winding corners into unique edges and vertices.
fn connect(windings: Vec<Winding>, ring_bound: usize) -> BRep {
    let mut offsets = Vec::with_capacity(windings.len());
    let mut corners = Vec::new();
    for (face, winding) in windings.iter().enumerate() {
        offsets.push(corners.len());
        corners.extend((0..winding.len()).map(|vertex| FaceVertexId::new(face, vertex)));
    }
    let flat = |corner: FaceVertexId| offsets[corner.face] + corner.vertex;

    let edge_successor: Vec<Option<usize>> = corners
        .iter()
        .map(|&corner| next_edge(&windings, corner).map(flat))
        .collect();
    let vertex_successor: Vec<Option<usize>> = corners
        .iter()
        .map(|&corner| next_vertex(&windings, corner).map(flat))
        .collect();
    let edge_rings = unique_rings(&edge_successor, ring_bound);
    let vertex_rings = unique_rings(&vertex_successor, ring_bound);

    let mut issues = Vec::new();
    for (i, successor) in edge_successor.iter().enumerate() {
        if successor.is_none() {
            issues.push(TopologyIssue::MissingBackReference { at: corners[i] });
        }
    }
    for &i in edge_rings.unclosed.iter().chain(&vertex_rings.unclosed) {
        let issue = TopologyIssue::RingNotClosed { at: corners[i] };
        if edge_successor[i].is_some() && !issues.contains(&issue) {
            issues.push(issue);
        }
    }

    let vertices = vertex_rings
        .representatives
        .iter()
        .map(|&i| windings[corners[i].face][corners[i].vertex].point)
        .collect();
    let edges = edge_rings
        .representatives
        .iter()
        .map(|&i| {
            let start = corners[i];
            let winding = &windings[start.face];
            let other = winding[start.vertex].adjacent.unwrap_or(start.face);
            UniqueEdge {
                faces: (start.face, other),
                midpoint: winding.edge_midpoint(start.vertex),
                start,
            }
        })
        .collect();
    let per_face = |classes: &[usize]| -> Vec<Vec<usize>> {
        windings
            .iter()
            .enumerate()
            .map(|(face, winding)| {
                (0..winding.len())
                    .map(|vertex| classes[offsets[face] + vertex])
                    .collect()
            })
            .collect()
    };
    let face_vertex_ids = per_face(&vertex_rings.class_of);
    let face_edge_ids = per_face(&edge_rings.class_of);

    let mut brep = BRep {
        windings,
        vertices,
        edges,
        face_vertex_ids,
        face_edge_ids,
        ..BRep::default()
    };

    if brep.euler_characteristic() != 2 {
        issues.push(TopologyIssue::EulerMismatch {
            vertices: brep.vertices.len(),
            faces: brep.contributing_faces(),
            edges: brep.edges.len(),
        });
    }
    if !issues.is_empty() {
        warn!(count = issues.len(), first = ?issues[0], "brush topology is inconsistent");
        brep.topology = TopologyStatus::Inconsistent(issues);
    }
    brep
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::polygon_3d::polygon_cross_sum;
    use crate::math::{Point3, Vector3};
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn config() -> KernelConfig {
        KernelConfig::default()
    }

    fn cube_planes(half: f64) -> Vec<Plane> {
        vec![
            Plane::new(Vector3::x(), half),
            Plane::new(-Vector3::x(), half),
            Plane::new(Vector3::y(), half),
            Plane::new(-Vector3::y(), half),
            Plane::new(Vector3::z(), half),
            Plane::new(-Vector3::z(), half),
        ]
    }

    fn unit(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z).normalize()
    }

    // ── basic shapes ──

    #[test]
    fn six_planes_make_a_cube() {
        let brep = build_brep(&cube_planes(1.0), &config());
        assert!(!brep.is_degenerate());
        assert_eq!(brep.contributing_faces(), 6);
        assert_eq!(brep.vertices.len(), 8);
        assert_eq!(brep.edges.len(), 12);
        assert!(brep.topology.is_consistent());
        for winding in &brep.windings {
            assert_eq!(winding.len(), 4);
            assert!(winding.is_bounded());
        }
        let bounds = brep.bounds.unwrap();
        assert_abs_diff_eq!(bounds.min, Point3::new(-1.0, -1.0, -1.0), epsilon = 1e-9);
        assert_abs_diff_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0), epsilon = 1e-9);
    }

    #[test]
    fn centroids_sit_on_face_centres() {
        let planes = cube_planes(2.0);
        let brep = build_brep(&planes, &config());
        for (centroid, plane) in brep.centroids.iter().zip(&planes) {
            let expected = Point3::from(plane.normal * 2.0);
            assert_abs_diff_eq!(centroid.unwrap(), expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn windings_are_ccw_from_outside() {
        let planes = cube_planes(1.0);
        let brep = build_brep(&planes, &config());
        for (winding, plane) in brep.windings.iter().zip(&planes) {
            let points: Vec<Point3> = winding.points().copied().collect();
            let twice_area = polygon_cross_sum(&points).dot(&plane.normal);
            assert_abs_diff_eq!(twice_area, 8.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn unique_edges_pair_adjacent_faces() {
        let brep = build_brep(&cube_planes(1.0), &config());
        for edge in &brep.edges {
            let (a, b) = edge.faces;
            assert_ne!(a, b);
            // Opposite cube faces never share an edge.
            assert_ne!(a / 2, b / 2);
        }
        for (face, ids) in brep.face_edge_ids.iter().enumerate() {
            for &id in ids {
                let (a, b) = brep.edges[id].faces;
                assert!(a == face || b == face);
            }
        }
    }

    #[test]
    fn corner_slice_adds_a_triangle() {
        let mut planes = cube_planes(1.0);
        planes.push(Plane::new(unit(1.0, 1.0, 1.0), 2.0 / 3f64.sqrt()));
        let brep = build_brep(&planes, &config());
        assert!(!brep.is_degenerate());
        assert_eq!(brep.contributing_faces(), 7);
        assert_eq!(brep.vertices.len(), 10);
        assert_eq!(brep.edges.len(), 15);
        assert_eq!(brep.windings[6].len(), 3);
        assert!(brep.topology.is_consistent());
    }

    // ── degenerate input ──

    #[test]
    fn open_brush_is_unbounded() {
        let planes = &cube_planes(1.0)[..5];
        let brep = build_brep(planes, &config());
        assert_eq!(brep.degenerate, Some(DegenerateReason::Unbounded));
        assert!(brep.windings.iter().all(Winding::is_empty));
        assert!(brep.bounds.is_none());
    }

    #[test]
    fn three_planes_are_too_few() {
        let planes = &cube_planes(1.0)[..3];
        let brep = build_brep(planes, &config());
        assert!(matches!(
            brep.degenerate,
            Some(DegenerateReason::TooFewFaces { .. })
        ));
    }

    #[test]
    fn opposing_plane_collapses_the_brush() {
        let mut planes = cube_planes(1.0);
        planes.push(Plane::new(Vector3::x(), 1.0).flipped());
        let brep = build_brep(&planes, &config());
        assert!(brep.is_degenerate());
        assert_eq!(brep.contributing_faces(), 0);
        assert!(brep.vertices.is_empty());
        assert!(brep.edges.is_empty());
    }

    #[test]
    fn invalid_plane_is_skipped() {
        let mut planes = cube_planes(1.0);
        planes.insert(2, Plane::new(Vector3::zeros(), 0.0));
        let brep = build_brep(&planes, &config());
        assert!(!brep.is_degenerate());
        assert_eq!(brep.invalid_faces, vec![2]);
        assert!(brep.windings[2].is_empty());
        assert_eq!(brep.vertices.len(), 8);
    }

    // ── duplicate planes ──

    #[test]
    fn lower_index_wins_exact_duplicate() {
        let mut planes = cube_planes(1.0);
        planes.push(planes[0]);
        let brep = build_brep(&planes, &config());
        assert_eq!(brep.windings[0].len(), 4);
        assert!(brep.windings[6].is_empty());
        assert_eq!(brep.edges.len(), 12);

        // Moving the original to the end hands ownership to the copy.
        let mut reordered = planes.clone();
        let original = reordered.remove(0);
        reordered.push(original);
        let brep = build_brep(&reordered, &config());
        assert_eq!(brep.windings[5].len(), 4);
        assert!(brep.windings[6].is_empty());
    }

    #[test]
    fn tighter_parallel_plane_wins() {
        let mut planes = cube_planes(1.0);
        planes.push(Plane::new(Vector3::x(), 0.5));
        let brep = build_brep(&planes, &config());
        assert!(brep.windings[0].is_empty());
        assert_eq!(brep.windings[6].len(), 4);
        let bounds = brep.bounds.unwrap();
        assert_abs_diff_eq!(bounds.max.x, 0.5, epsilon = 1e-9);
        assert!(plane_unique(&planes, 6, &config()));
        assert!(!plane_unique(&planes, 0, &config()));
    }

    // ── knife edges ──

    fn grazing_plane() -> Plane {
        // Touches the cube only along the edge x = y = 1.
        Plane::new(unit(1.0, 1.0, 0.0), 2f64.sqrt())
    }

    #[test]
    fn grazing_plane_appended_is_ignored() {
        let mut planes = cube_planes(1.0);
        planes.push(grazing_plane());
        let brep = build_brep(&planes, &config());
        assert_eq!(brep.contributing_faces(), 6);
        assert!(brep.windings[6].is_empty());
        assert_eq!(brep.vertices.len(), 8);
        assert_eq!(brep.edges.len(), 12);
        assert!(brep.topology.is_consistent());
    }

    #[test]
    fn grazing_plane_first_is_spliced_out() {
        let mut planes = vec![grazing_plane()];
        planes.extend(cube_planes(1.0));
        let brep = build_brep(&planes, &config());
        assert_eq!(brep.contributing_faces(), 6);
        assert!(brep.windings[0].is_empty());
        assert_eq!(brep.vertices.len(), 8);
        assert_eq!(brep.edges.len(), 12);
        assert!(brep.topology.is_consistent());
        // The +x and +y faces now reference each other directly.
        assert!(brep.windings[1].find_adjacent(3).is_some());
        assert!(brep.windings[3].find_adjacent(1).is_some());
        assert!(brep.windings.iter().all(|w| w.find_adjacent(0).is_none()));
    }

    // ── cuts through existing corners ──

    /// Enclosed volume from the windings, by the divergence theorem.
    fn brep_volume(brep: &BRep, planes: &[Plane]) -> f64 {
        brep.contributing_face_indices()
            .map(|i| planes[i].dist * brep.windings[i].area(&planes[i]) / 3.0)
            .sum()
    }

    fn assert_shape(brep: &BRep, vertices: usize, edges: usize, faces: usize) {
        assert!(!brep.is_degenerate(), "{:?}", brep.degenerate);
        assert_eq!(brep.vertices.len(), vertices);
        assert_eq!(brep.edges.len(), edges);
        assert_eq!(brep.contributing_faces(), faces);
        assert!(brep.topology.is_consistent(), "{:?}", brep.topology);
    }

    #[test]
    fn diagonal_cut_through_two_edges_leaves_a_prism() {
        crate::init_test_tracing();
        // x + y <= 0 runs through the vertical edges at (1, -1) and (-1, 1),
        // leaving the +x and +y faces as knife edges.
        let mut planes = cube_planes(1.0);
        planes.push(Plane::new(unit(1.0, 1.0, 0.0), 0.0));
        let brep = build_brep(&planes, &config());
        assert_shape(&brep, 6, 9, 5);
        assert!(!brep.windings[0].contributes());
        assert!(!brep.windings[2].contributes());
        assert_abs_diff_eq!(brep_volume(&brep, &planes), 4.0, epsilon = 1e-7);
    }

    #[test]
    fn cut_through_three_corners_leaves_a_tetrahedron() {
        // x + y + z <= -1 touches the +x, +y and +z faces at one corner each.
        let mut planes = cube_planes(1.0);
        planes.push(Plane::new(unit(1.0, 1.0, 1.0), -1.0 / 3f64.sqrt()));
        let brep = build_brep(&planes, &config());
        assert_shape(&brep, 4, 6, 4);
        assert_abs_diff_eq!(brep_volume(&brep, &planes), 4.0 / 3.0, epsilon = 1e-7);
        let bounds = brep.bounds.unwrap();
        assert_abs_diff_eq!(bounds.min, Point3::new(-1.0, -1.0, -1.0), epsilon = 1e-7);
        assert_abs_diff_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0), epsilon = 1e-7);
    }

    #[test]
    fn pyramid_apex_joins_four_faces() {
        let side = |x: f64, y: f64| Plane::new(unit(x, y, 1.0), 1.0 / 2f64.sqrt());
        let planes = vec![
            Plane::new(-Vector3::z(), 0.0),
            side(1.0, 0.0),
            side(-1.0, 0.0),
            side(0.0, 1.0),
            side(0.0, -1.0),
        ];
        let brep = build_brep(&planes, &config());
        assert_shape(&brep, 5, 8, 5);
        assert_eq!(brep.windings[0].len(), 4);
        assert!(brep.windings[1..].iter().all(|w| w.len() == 3));
        assert!(brep
            .vertices
            .iter()
            .any(|v| (v - Point3::new(0.0, 0.0, 1.0)).norm() < 1e-7));
        assert_abs_diff_eq!(brep_volume(&brep, &planes), 4.0 / 3.0, epsilon = 1e-7);
    }

    #[test]
    fn cut_through_two_opposite_edges_halves_the_cube() {
        // y + z <= 0 contains the edges at (y, z) = (1, -1) and (-1, 1).
        let mut planes = cube_planes(1.0);
        planes.push(Plane::new(unit(0.0, 1.0, 1.0), 0.0));
        let brep = build_brep(&planes, &config());
        assert_shape(&brep, 6, 9, 5);
        assert_abs_diff_eq!(brep_volume(&brep, &planes), 4.0, epsilon = 1e-7);
    }

    // ── randomized convexity ──

    /// Corners of the solid by brute force over plane triples, merged when
    /// they coincide.
    fn solid_corners(planes: &[Plane]) -> Vec<Point3> {
        let mut corners: Vec<Point3> = Vec::new();
        for a in 0..planes.len() {
            for b in a + 1..planes.len() {
                for c in b + 1..planes.len() {
                    let Some(p) = Plane::intersect_three(&planes[a], &planes[b], &planes[c]) else {
                        continue;
                    };
                    if planes.iter().any(|plane| plane.distance_to(&p) > 1e-7) {
                        continue;
                    }
                    if corners.iter().any(|q| (q - p).norm() < 1e-6) {
                        continue;
                    }
                    corners.push(p);
                }
            }
        }
        corners
    }

    /// `None` when the arrangement is not simple: a corner touched by more
    /// than three planes or two corners nearly coincident.
    fn brute_force_corners(planes: &[Plane]) -> Option<Vec<Point3>> {
        let corners = solid_corners(planes);
        for corner in &corners {
            let touching = planes
                .iter()
                .filter(|plane| plane.distance_to(corner).abs() < 1e-2)
                .count();
            if touching != 3 {
                return None;
            }
        }
        for (i, p) in corners.iter().enumerate() {
            if corners[i + 1..].iter().any(|q| (q - p).norm() < 1e-2) {
                return None;
            }
        }
        Some(corners)
    }

    /// Face count and volume of the solid from the corners on each plane.
    fn faces_and_volume(planes: &[Plane], corners: &[Point3]) -> (usize, f64) {
        let mut faces = 0;
        let mut volume = 0.0;
        for plane in planes {
            let on: Vec<Point3> = corners
                .iter()
                .filter(|p| plane.distance_to(p).abs() < 1e-7)
                .copied()
                .collect();
            if on.len() < 3 {
                continue;
            }
            faces += 1;
            #[allow(clippy::cast_precision_loss)]
            let centre = on.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / on.len() as f64;
            let (u, v) = plane.basis();
            let mut ring: Vec<(f64, Point3)> = on
                .iter()
                .map(|p| {
                    let d = p.coords - centre;
                    (d.dot(&v).atan2(d.dot(&u)), *p)
                })
                .collect();
            ring.sort_by(|a, b| a.0.total_cmp(&b.0));
            let ring: Vec<Point3> = ring.into_iter().map(|(_, p)| p).collect();
            let area = polygon_cross_sum(&ring).dot(&plane.normal).abs() / 2.0;
            volume += plane.dist * area / 3.0;
        }
        (faces, volume)
    }

    #[test]
    fn random_convex_brushes_satisfy_euler() {
        crate::init_test_tracing();
        let mut rng = StdRng::seed_from_u64(0x6272_7573_68);
        let mut checked = 0;
        for _ in 0..200 {
            let mut planes = cube_planes(3.0);
            for _ in 0..8 {
                let normal = Vector3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                );
                if normal.norm() < 0.1 {
                    continue;
                }
                planes.push(Plane::new(normal.normalize(), rng.gen_range(1.0..2.9)));
            }
            let Some(corners) = brute_force_corners(&planes) else {
                continue;
            };
            let brep = build_brep(&planes, &config());
            assert!(!brep.is_degenerate());
            assert_eq!(brep.vertices.len(), corners.len());
            assert_eq!(brep.euler_characteristic(), 2);
            assert!(brep.topology.is_consistent());
            let (faces, volume) = faces_and_volume(&planes, &corners);
            assert_eq!(brep.contributing_faces(), faces);
            assert_abs_diff_eq!(brep_volume(&brep, &planes), volume, epsilon = 1e-6);
            checked += 1;
        }
        assert!(checked > 20);
    }

    #[test]
    fn random_cuts_through_existing_vertices() {
        crate::init_test_tracing();
        let mut rng = StdRng::seed_from_u64(0x636f_726e_6572);
        for _ in 0..100 {
            let mut planes = cube_planes(1.0);
            for _ in 0..2 {
                let brep = build_brep(&planes, &config());
                let vertices = &brep.vertices;
                let a = rng.gen_range(0..vertices.len());
                let b = rng.gen_range(0..vertices.len());
                let c = rng.gen_range(0..vertices.len());
                let mut cut = Plane::for_points(&vertices[a], &vertices[b], &vertices[c]);
                if !cut.is_valid()
                    || planes
                        .iter()
                        .any(|plane| plane.normal.dot(&cut.normal).abs() > 1.0 - 1e-6)
                {
                    continue;
                }
                if rng.gen_bool(0.5) {
                    cut = cut.flipped();
                }
                planes.push(cut);
            }

            // Every cut passes through the interior, so a solid always remains.
            let corners = solid_corners(&planes);
            let (faces, volume) = faces_and_volume(&planes, &corners);
            let brep = build_brep(&planes, &config());
            assert!(!brep.is_degenerate(), "{planes:?}");
            assert_eq!(brep.vertices.len(), corners.len(), "{planes:?}");
            assert_eq!(brep.contributing_faces(), faces, "{planes:?}");
            assert_eq!(brep.euler_characteristic(), 2, "{planes:?}");
            assert!(brep.topology.is_consistent(), "{planes:?}");
            assert_abs_diff_eq!(brep_volume(&brep, &planes), volume, epsilon = 1e-6);
        }
    }
}
