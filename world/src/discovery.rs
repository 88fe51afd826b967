//! Budgeted incremental discovery of unknown cells.

use terrain_knowledge_core::{Observer, RoomCoord};

use crate::TerrainMap;

/// Lookup budget used when the caller does not choose one.
pub const DEFAULT_MAX_LOOKUPS: usize = 20;

/// Controls a single discovery scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanOptions {
    /// Re-observe cells that are already known.
    pub force_update: bool,
    /// Maximum number of observations the scan may perform.
    pub max_lookups: usize,
    /// Row-major index of the first cell to consider.
    pub first_cell: usize,
}

impl ScanOptions {
    /// Scans unknown cells with the provided budget.
    #[must_use]
    pub const fn with_budget(max_lookups: usize) -> Self {
        Self {
            force_update: false,
            max_lookups,
            first_cell: 0,
        }
    }

    /// Re-observes every cell with the provided budget.
    #[must_use]
    pub const fn forced(max_lookups: usize) -> Self {
        Self {
            force_update: true,
            max_lookups,
            first_cell: 0,
        }
    }

    /// Skips every cell before the provided row-major index.
    ///
    /// Lets a caller resume a forced rescan where the previous one stopped.
    #[must_use]
    pub const fn starting_at(mut self, first_cell: usize) -> Self {
        self.first_cell = first_cell;
        self
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::with_budget(DEFAULT_MAX_LOOKUPS)
    }
}

impl TerrainMap {
    /// Observes cells in row-major order until the budget is spent.
    ///
    /// Only unknown cells are observed unless `force_update` is set. The scan
    /// stops before the lookup that would exceed `max_lookups` and returns the
    /// number of lookups performed. Every cell update is complete on its own,
    /// so a later scan simply picks up the cells that are still unknown.
    pub fn scan<O>(&mut self, observer: &O, options: ScanOptions) -> usize
    where
        O: Observer + ?Sized,
    {
        let mut lookups = 0;
        for cell in RoomCoord::all().skip(options.first_cell) {
            if !options.force_update && !self.code(cell).is_unknown() {
                continue;
            }
            if lookups == options.max_lookups {
                break;
            }
            lookups += 1;
            let _ = self.discover(cell, observer);
        }

        log::debug!(
            "scanned {lookups} cells in room {} ({} of {} known)",
            self.room(),
            self.known_cells(),
            self.codes().len()
        );
        lookups
    }
}
