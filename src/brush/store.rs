use slotmap::SlotMap;
use tracing::debug;

use crate::config::KernelConfig;
use crate::error::{Result, TopologyError};

use super::{Brush, FaceSnapshot};

slotmap::new_key_type! {
    /// Handle to a brush in a [`BrushStore`].
    pub struct BrushId;
}

/// Receives the previous face list of a brush before the store changes it.
///
/// An empty snapshot means the brush did not exist yet.
pub trait UndoSink {
    fn save(&mut self, id: BrushId, previous: FaceSnapshot);
}

/// Discards snapshots.
impl UndoSink for () {
    fn save(&mut self, _id: BrushId, _previous: FaceSnapshot) {}
}

/// Collects snapshots in order.
impl UndoSink for Vec<(BrushId, FaceSnapshot)> {
    fn save(&mut self, id: BrushId, previous: FaceSnapshot) {
        self.push((id, previous));
    }
}

/// Arena that owns the brushes of a scene.
///
/// Every mutation goes through the store so the undo collaborator sees the
/// previous face list first, and failed edits leave brushes as they were.
#[derive(Debug, Default)]
pub struct BrushStore {
    brushes: SlotMap<BrushId, Brush>,
    config: KernelConfig,
}

impl BrushStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(config: KernelConfig) -> Self {
        Self {
            brushes: SlotMap::with_key(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.brushes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brushes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BrushId, &Brush)> {
        self.brushes.iter()
    }

    /// Inserts a brush and returns its ID.
    pub fn insert(&mut self, brush: Brush, undo: &mut impl UndoSink) -> BrushId {
        let id = self.brushes.insert(brush);
        undo.save(id, FaceSnapshot::default());
        id
    }

    /// Returns the brush, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the brush is not in the store.
    pub fn brush(&self, id: BrushId) -> Result<&Brush> {
        self.brushes
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("brush".into()).into())
    }

    /// Removes a brush and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the brush is not in the store.
    pub fn remove(&mut self, id: BrushId, undo: &mut impl UndoSink) -> Result<Brush> {
        let brush = self
            .brushes
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("brush".into()))?;
        undo.save(id, brush.snapshot());
        Ok(brush)
    }

    /// Runs `edit` on one brush.
    ///
    /// On success the previous face list goes to `undo`; on failure the
    /// brush is restored and `undo` sees nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the brush is not in the store, or whatever `edit`
    /// returns.
    pub fn edit<T>(
        &mut self,
        id: BrushId,
        undo: &mut impl UndoSink,
        edit: impl FnOnce(&mut Brush) -> Result<T>,
    ) -> Result<T> {
        let brush = self
            .brushes
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("brush".into()))?;
        let previous = brush.snapshot();
        match edit(brush) {
            Ok(value) => {
                undo.save(id, previous);
                Ok(value)
            }
            Err(err) => {
                brush.restore(previous);
                Err(err)
            }
        }
    }

    /// Removes `consumed` and inserts `results`, the way a CSG operator
    /// commits its output.
    ///
    /// Nothing changes unless every consumed brush exists.
    ///
    /// # Errors
    ///
    /// Returns an error if any consumed brush is not in the store.
    pub fn replace(
        &mut self,
        consumed: &[BrushId],
        results: Vec<Brush>,
        undo: &mut impl UndoSink,
    ) -> Result<Vec<BrushId>> {
        let mut unique: Vec<BrushId> = Vec::with_capacity(consumed.len());
        for &id in consumed {
            self.brush(id)?;
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        for id in unique {
            self.remove(id, undo)?;
        }
        let ids: Vec<BrushId> = results
            .into_iter()
            .map(|brush| self.insert(brush, undo))
            .collect();
        debug!(consumed = consumed.len(), created = ids.len(), "replaced brushes");
        Ok(ids)
    }
}
