//! Whole-unit comment table conversion, performed once per unit.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::comment::RenderedComment;
use crate::host::{Comment, CommentTable, CompilationUnit, UnitId};

/// Converts every comment of a unit the first time the unit is seen.
///
/// The gate for each unit is a [`OnceCell`] held in a concurrent map keyed by
/// [`UnitId`]. Callers racing on the same unit block until the single
/// conversion finishes; different units convert independently. A failed
/// conversion leaves the gate empty, so the next request tries again.
///
/// Gates are never evicted: the map keeps one entry per unit seen for as
/// long as the converter lives. That is one documentation run, so it grows
/// with the number of compilation units and no further.
#[derive(Debug, Default)]
pub struct CommentTableConverter {
    gates: DashMap<UnitId, Arc<OnceCell<()>>>,
}

impl CommentTableConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts the comment table of `unit` unless that already happened.
    ///
    /// Every entry not yet rendered is passed to `convert` and the unit's
    /// table is replaced with the converted copy in one step. Returns whether
    /// this call performed the conversion.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `convert`; the unit's table is
    /// left untouched in that case.
    pub fn convert<F, E>(&self, unit: &CompilationUnit, mut convert: F) -> Result<bool, E>
    where
        F: FnMut(&dyn Comment) -> Result<RenderedComment, E>,
    {
        // Clone the gate out so the map shard is not locked while rendering.
        let gate = Arc::clone(&self.gates.entry(unit.id()).or_default());

        let mut converted_now = false;
        gate.get_or_try_init(|| {
            let source = unit.comments();
            let mut rendered = CommentTable::new();
            for (node, comment) in source.iter() {
                if comment.is_rendered() {
                    rendered.insert_shared(node, Arc::clone(comment));
                } else {
                    rendered.insert(node, convert(comment.as_ref())?);
                }
            }

            debug!(unit = unit.name(), comments = rendered.len(), "Converted comment table");
            unit.replace_comments(rendered);
            converted_now = true;
            Ok::<(), E>(())
        })?;

        Ok(converted_now)
    }

    /// Number of units this converter holds a gate for.
    pub fn tracked_units(&self) -> usize {
        self.gates.len()
    }

    /// Whether `unit` has been converted by this converter.
    pub fn is_converted(&self, unit: &CompilationUnit) -> bool {
        self.gates
            .get(&unit.id())
            .is_some_and(|gate| gate.get().is_some())
    }
}
