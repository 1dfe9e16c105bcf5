//! Board state: committed strokes, undo stack, and the drawing state machine.

use std::sync::Arc;

use log::{debug, error, info};

use crate::config::Config;
use crate::draw::{Color, Frame, Stroke, WHITE};
use crate::input::path_builder::PathBuilder;
use crate::input::events::PointerKind;
use crate::pen::PenService;
use crate::storage::{PersistenceGateway, RecordId, StorageError};

pub const DEFAULT_MAX_STROKES: usize = 500;
pub const DEFAULT_MAX_UNDO: usize = 20;

/// Current drawing mode state machine.
///
/// Tracks whether the user is idle or actively drawing a stroke.
/// State transitions occur based on pointer events.
#[derive(Debug)]
pub enum DrawingState {
    /// Not actively drawing - waiting for a pointer down
    Idle,
    /// Pointer is down and geometry is accumulating
    Drawing {
        /// Device that started the stroke, if reported
        kind: Option<PointerKind>,
        /// Geometry built so far
        builder: PathBuilder,
    },
}

/// Per-board limits and appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardSettings {
    /// Board background; eraser strokes paint in this color
    pub background: Color,
    /// Committed strokes kept in memory (oldest dropped first)
    pub max_strokes: usize,
    /// Undone strokes available for redo (oldest dropped first)
    pub max_undo: usize,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            background: WHITE,
            max_strokes: DEFAULT_MAX_STROKES,
            max_undo: DEFAULT_MAX_UNDO,
        }
    }
}

impl BoardSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            background: config.board.background_color.to_color(),
            max_strokes: config.history.max_strokes,
            max_undo: config.history.max_undo,
        }
    }
}

/// Annotation board for one scoring record.
///
/// Holds the committed strokes (insertion order is z-order within a tool
/// group) and the undo stack (most recently undone last). All mutation goes
/// through `commit`, `undo`, `redo` and `clear`, each of which schedules a
/// debounced save when the board is backed by a [`PersistenceGateway`].
pub struct Board {
    record: RecordId,
    pub(super) settings: BoardSettings,
    pub(super) pen: Arc<PenService>,
    gateway: Option<PersistenceGateway>,
    pub(super) committed: Frame,
    pub(super) undo_stack: Vec<Stroke>,
    /// Current drawing mode state machine
    pub state: DrawingState,
    /// Whether the display needs to be redrawn
    pub needs_redraw: bool,
}

impl Board {
    /// Creates an empty board that is not persisted.
    pub fn new(record: impl Into<RecordId>, settings: BoardSettings, pen: Arc<PenService>) -> Self {
        Self {
            record: record.into(),
            settings,
            pen,
            gateway: None,
            committed: Frame::new(),
            undo_stack: Vec::new(),
            state: DrawingState::Idle,
            needs_redraw: true,
        }
    }

    /// Loads the stored board for `record` and attaches it to `gateway`.
    ///
    /// Missing records start empty. A store read failure is returned rather
    /// than replaced by an empty board, so a later save cannot overwrite an
    /// unreadable record.
    pub fn open(
        record: impl Into<RecordId>,
        settings: BoardSettings,
        pen: Arc<PenService>,
        gateway: PersistenceGateway,
    ) -> Result<Self, StorageError> {
        let record = record.into();
        let strokes = gateway.load(&record)?;
        let loaded = strokes.len();
        let committed = Frame::from_strokes(strokes, settings.max_strokes);
        if committed.len() < loaded {
            info!(
                "Record {} holds {} strokes; keeping the newest {}",
                record,
                loaded,
                committed.len()
            );
        }

        Ok(Self {
            record,
            settings,
            pen,
            gateway: Some(gateway),
            committed,
            undo_stack: Vec::new(),
            state: DrawingState::Idle,
            needs_redraw: true,
        })
    }

    /// Discards any in-progress stroke and synchronously writes a pending save.
    pub fn close(mut self) -> Result<(), StorageError> {
        self.cancel();
        let Some(gateway) = self.gateway.take() else {
            return Ok(());
        };
        match gateway.flush(&self.record) {
            Ok(written) => {
                debug!(
                    "Closed board for record {} (flushed: {})",
                    self.record, written
                );
                Ok(())
            }
            Err(err) => {
                error!("Failed to flush board for record {}: {}", self.record, err);
                Err(err)
            }
        }
    }

    pub fn record(&self) -> &RecordId {
        &self.record
    }

    pub fn settings(&self) -> &BoardSettings {
        &self.settings
    }

    pub fn pen(&self) -> &Arc<PenService> {
        &self.pen
    }

    /// Committed strokes, oldest first.
    pub fn strokes(&self) -> &[Stroke] {
        self.committed.strokes()
    }

    /// Undone strokes, most recently undone last.
    pub fn undo_stack(&self) -> &[Stroke] {
        &self.undo_stack
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawingState::Drawing { .. })
    }

    /// Hands the current committed list to the gateway.
    pub(super) fn schedule_save(&self) {
        if let Some(gateway) = &self.gateway {
            gateway.schedule(&self.record, self.committed.strokes().to_vec());
        }
    }
}
