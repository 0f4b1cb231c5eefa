use tracing::{debug, trace};

use crate::brush::Brush;
use crate::config::KernelConfig;
use crate::error::Result;

/// What a subtraction did to its target.
#[derive(Debug, Clone)]
pub enum SubtractOutcome {
    /// The cutter does not reach into the target.
    Untouched,
    /// The target lies entirely inside the cutter.
    Consumed,
    /// The part of the target outside the cutter, as convex pieces.
    Fragmented(Vec<Brush>),
}

impl SubtractOutcome {
    /// The fragments, empty unless the target was fragmented.
    #[must_use]
    pub fn fragments(&self) -> &[Brush] {
        match self {
            Self::Fragmented(fragments) => fragments,
            Self::Untouched | Self::Consumed => &[],
        }
    }
}

/// Removes the volume of `cutter` from `target`.
///
/// Each cutter face that straddles what is left of the target splits off
/// the part in front of it as a new brush; the remainder behind it carries
/// on to the next face. Neither input is modified.
pub struct Subtract<'a> {
    target: &'a Brush,
    cutter: &'a Brush,
}

impl<'a> Subtract<'a> {
    /// Creates a new `Subtract` operation (target - cutter).
    #[must_use]
    pub fn new(target: &'a Brush, cutter: &'a Brush) -> Self {
        Self { target, cutter }
    }

    /// Executes the subtraction.
    ///
    /// Fragments that end up with no volume, slivers thinner than the clip
    /// tolerance, are dropped.
    ///
    /// # Errors
    ///
    /// Returns a capacity error if a fragment would need more faces than
    /// allowed.
    pub fn execute(&self, config: &KernelConfig) -> Result<SubtractOutcome> {
        let target = self.target.share_faces(config);
        let cutter = self.cutter.share_faces(config);

        let (Some(target_bounds), Some(cutter_bounds)) = (target.bounds(), cutter.bounds()) else {
            return Ok(SubtractOutcome::Untouched);
        };
        if !target_bounds.intersects(&cutter_bounds, -config.clip_epsilon) {
            return Ok(SubtractOutcome::Untouched);
        }

        let cutter_brep = cutter.brep();
        let mut back = target;
        let mut fragments = Vec::new();
        for (face, winding) in cutter.faces().iter().zip(&cutter_brep.windings) {
            if !winding.contributes() {
                continue;
            }
            let counts = back.classify_plane(&face.plane());
            if counts.straddles() {
                let mut fragment = back.clone();
                fragment.add_face(face.flipped())?;
                fragments.push(fragment);
                back.add_face((**face).clone())?;
            } else if counts.back == 0 {
                return Ok(SubtractOutcome::Untouched);
            }
        }

        let fragments = solid_fragments(fragments);
        if fragments.is_empty() {
            debug!("subtraction consumed the target");
            return Ok(SubtractOutcome::Consumed);
        }
        debug!(fragments = fragments.len(), "subtraction fragmented the target");
        Ok(SubtractOutcome::Fragmented(fragments))
    }
}

/// Strips empty faces from each fragment and drops those left without volume.
fn solid_fragments(fragments: Vec<Brush>) -> Vec<Brush> {
    let count = fragments.len();
    let solid: Vec<Brush> = fragments
        .into_iter()
        .filter_map(|mut fragment| {
            fragment.remove_empty_faces();
            fragment.has_contributing_faces().then_some(fragment)
        })
        .collect();
    if solid.len() < count {
        trace!(dropped = count - solid.len(), "dropped empty fragments");
    }
    solid
}
