//! Shared pen configuration.
//!
//! A single [`PenService`] is shared by every open board. It owns the current
//! color, width and tool, applies the tool switching rules (eraser width
//! save/restore, normal pen color restore), and writes the Normal-pen values
//! through a [`PenStore`] on every change.

mod store;

pub use store::{FilePenStore, MemoryPenStore, PenStore};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::config::DrawingConfig;
use crate::draw::{BLACK, Color};
use crate::input::ToolMode;

pub const DEFAULT_PEN_WIDTH: f64 = 2.0;
pub const MIN_PEN_WIDTH: f64 = 1.0;
pub const MAX_PEN_WIDTH: f64 = 50.0;
pub const DEFAULT_MAX_ERASER_WIDTH: f64 = 20.0;

/// Pen state read by the style resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenConfig {
    pub color: Color,
    pub stroke_width: f64,
    pub tool_mode: ToolMode,
}

impl Default for PenConfig {
    fn default() -> Self {
        Self {
            color: BLACK,
            stroke_width: DEFAULT_PEN_WIDTH,
            tool_mode: ToolMode::Normal,
        }
    }
}

/// Partial pen change; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PenUpdate {
    pub color: Option<Color>,
    pub stroke_width: Option<f64>,
    pub tool_mode: Option<ToolMode>,
}

impl PenUpdate {
    pub fn tool(mode: ToolMode) -> Self {
        Self {
            tool_mode: Some(mode),
            ..Self::default()
        }
    }

    pub fn color(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    pub fn width(width: f64) -> Self {
        Self {
            stroke_width: Some(width),
            ..Self::default()
        }
    }
}

/// Width bounds applied by the pen service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenLimits {
    pub min_width: f64,
    pub max_width: f64,
    /// Ceiling applied to the pen width while the eraser is active
    pub max_eraser_width: f64,
}

impl Default for PenLimits {
    fn default() -> Self {
        Self {
            min_width: MIN_PEN_WIDTH,
            max_width: MAX_PEN_WIDTH,
            max_eraser_width: DEFAULT_MAX_ERASER_WIDTH,
        }
    }
}

impl PenLimits {
    pub fn from_config(drawing: &DrawingConfig) -> Self {
        Self {
            max_eraser_width: drawing.max_eraser_width,
            ..Self::default()
        }
    }

    fn clamp(&self, width: f64, mode: ToolMode) -> f64 {
        let max = if mode == ToolMode::Eraser {
            self.max_eraser_width.min(self.max_width)
        } else {
            self.max_width
        };
        width.clamp(self.min_width, max.max(self.min_width))
    }
}

#[derive(Debug)]
struct PenState {
    current: PenConfig,
    /// Color restored when returning to the Normal pen
    normal_pen_color: Color,
    /// Width restored when returning to the Normal pen
    normal_pen_width: f64,
    /// Width saved when the eraser was activated
    previous_width: Option<f64>,
}

impl PenState {
    fn new(normal: PenConfig) -> Self {
        Self {
            current: PenConfig {
                tool_mode: ToolMode::Normal,
                ..normal
            },
            normal_pen_color: normal.color,
            normal_pen_width: normal.stroke_width,
            previous_width: None,
        }
    }

    fn switch_tool(&mut self, mode: ToolMode, limits: &PenLimits) {
        let from = self.current.tool_mode;
        if from == mode {
            return;
        }

        if from == ToolMode::Eraser {
            if let Some(width) = self.previous_width.take() {
                self.current.stroke_width = width;
            }
        }

        match mode {
            ToolMode::Eraser => {
                self.previous_width = Some(self.current.stroke_width);
                self.current.stroke_width =
                    self.current.stroke_width.min(limits.max_eraser_width);
            }
            ToolMode::Normal => {
                self.current.color = self.normal_pen_color;
                self.current.stroke_width = self.normal_pen_width;
            }
            ToolMode::Telestrator | ToolMode::Highlighter => {}
        }

        self.current.tool_mode = mode;
        debug!("Pen tool {from} -> {mode}");
    }

    /// Values written to the global pen store: always the Normal-pen ones.
    fn persisted(&self) -> PenConfig {
        PenConfig {
            color: self.normal_pen_color,
            stroke_width: self.normal_pen_width,
            tool_mode: self.current.tool_mode,
        }
    }
}

/// Shared pen configuration with immediate persistence.
pub struct PenService {
    store: Arc<dyn PenStore>,
    limits: PenLimits,
    state: Mutex<PenState>,
}

impl PenService {
    /// Loads the persisted pen, falling back to `defaults` when nothing was saved.
    ///
    /// A store read failure is logged and the defaults are used.
    pub fn new(store: Arc<dyn PenStore>, limits: PenLimits, defaults: PenConfig) -> Self {
        let saved = match store.load() {
            Ok(saved) => saved,
            Err(err) => {
                warn!("Failed to load pen configuration, using defaults: {err}");
                None
            }
        };

        let initial = saved.unwrap_or(defaults);
        let mut state = PenState::new(PenConfig {
            color: initial.color.quantized(),
            stroke_width: limits.clamp(initial.stroke_width, ToolMode::Normal),
            ..initial
        });
        state.switch_tool(initial.tool_mode, &limits);

        Self {
            store,
            limits,
            state: Mutex::new(state),
        }
    }

    /// Pen service with no persisted state, built from config defaults.
    pub fn in_memory(limits: PenLimits, defaults: PenConfig) -> Self {
        Self::new(Arc::new(MemoryPenStore::new()), limits, defaults)
    }

    fn lock(&self) -> MutexGuard<'_, PenState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self) -> PenConfig {
        self.lock().current
    }

    pub fn limits(&self) -> PenLimits {
        self.limits
    }

    /// Color used by the Normal pen, kept while other tools are active.
    pub fn normal_pen_color(&self) -> Color {
        self.lock().normal_pen_color
    }

    /// Width used by the Normal pen, kept while other tools are active.
    pub fn normal_pen_width(&self) -> f64 {
        self.lock().normal_pen_width
    }

    /// Width to restore when leaving the eraser.
    pub fn previous_width(&self) -> Option<f64> {
        self.lock().previous_width
    }

    /// Merges `update` into the pen and persists it.
    ///
    /// A tool change is applied first, so a color or width in the same update
    /// targets the new tool.
    pub fn update(&self, update: PenUpdate) -> PenConfig {
        let (current, persisted) = {
            let mut state = self.lock();

            if let Some(mode) = update.tool_mode {
                state.switch_tool(mode, &self.limits);
            }

            if let Some(color) = update.color {
                let color = color.quantized();
                state.current.color = color;
                if state.current.tool_mode == ToolMode::Normal {
                    state.normal_pen_color = color;
                }
            }

            if let Some(width) = update.stroke_width {
                if width.is_finite() {
                    let mode = state.current.tool_mode;
                    state.current.stroke_width = self.limits.clamp(width, mode);
                    if mode == ToolMode::Normal {
                        state.normal_pen_width = state.current.stroke_width;
                    }
                } else {
                    warn!("Ignoring non-finite pen width {width}");
                }
            }

            (state.current, state.persisted())
        };

        if let Err(err) = self.store.save(&persisted) {
            error!("Failed to persist pen configuration: {err}");
        }
        current
    }

    pub fn select_tool(&self, mode: ToolMode) -> PenConfig {
        self.update(PenUpdate::tool(mode))
    }

    pub fn set_color(&self, color: Color) -> PenConfig {
        self.update(PenUpdate::color(color))
    }

    pub fn set_width(&self, width: f64) -> PenConfig {
        self.update(PenUpdate::width(width))
    }
}

impl std::fmt::Debug for PenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PenService")
            .field("limits", &self.limits)
            .field("state", &*self.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{BLUE, GREEN, RED};
    use crate::storage::StorageError;

    struct FailingPenStore;

    impl PenStore for FailingPenStore {
        fn load(&self) -> Result<Option<PenConfig>, StorageError> {
            Err(StorageError::Backend("offline".into()))
        }

        fn save(&self, _pen: &PenConfig) -> Result<(), StorageError> {
            Err(StorageError::Backend("offline".into()))
        }
    }

    fn service() -> (PenService, Arc<MemoryPenStore>) {
        let store = Arc::new(MemoryPenStore::new());
        let service = PenService::new(store.clone(), PenLimits::default(), PenConfig::default());
        (service, store)
    }

    #[test]
    fn defaults_when_never_set() {
        let (service, store) = service();
        assert_eq!(service.get(), PenConfig::default());
        assert!(store.saved().is_none());
    }

    #[test]
    fn update_merges_and_persists_immediately() {
        let (service, store) = service();
        service.update(PenUpdate {
            color: Some(BLUE),
            stroke_width: Some(6.0),
            tool_mode: None,
        });
        assert_eq!(service.get().color, BLUE);
        assert_eq!(service.get().stroke_width, 6.0);
        assert_eq!(store.saved().unwrap().color, BLUE);
        assert_eq!(store.saved().unwrap().stroke_width, 6.0);
    }

    #[test]
    fn eraser_saves_and_restores_width() {
        let (service, store) = service();
        service.set_width(5.0);
        service.select_tool(ToolMode::Eraser);
        assert_eq!(service.get().stroke_width, 5.0);
        assert_eq!(service.previous_width(), Some(5.0));

        service.set_width(12.0);
        assert_eq!(service.get().stroke_width, 12.0);
        assert_eq!(store.saved().unwrap().stroke_width, 5.0);

        service.select_tool(ToolMode::Normal);
        assert_eq!(service.get().stroke_width, 5.0);
        assert_eq!(service.previous_width(), None);
    }

    #[test]
    fn eraser_caps_width_at_configured_maximum() {
        let (service, _) = service();
        service.set_width(40.0);
        service.select_tool(ToolMode::Eraser);
        assert_eq!(service.get().stroke_width, DEFAULT_MAX_ERASER_WIDTH);
        service.set_width(45.0);
        assert_eq!(service.get().stroke_width, DEFAULT_MAX_ERASER_WIDTH);
        service.select_tool(ToolMode::Highlighter);
        assert_eq!(service.get().stroke_width, 40.0);
    }

    #[test]
    fn normal_color_survives_other_tools() {
        let (service, store) = service();
        service.set_color(GREEN);
        service.select_tool(ToolMode::Highlighter);
        service.set_color(RED);
        assert_eq!(service.normal_pen_color(), GREEN);
        assert_eq!(store.saved().unwrap().color, GREEN);

        service.select_tool(ToolMode::Normal);
        assert_eq!(service.get().color, GREEN);
    }

    #[test]
    fn normal_width_survives_other_tools() {
        let (service, store) = service();
        service.set_width(3.0);
        service.select_tool(ToolMode::Highlighter);
        service.set_width(12.0);
        assert_eq!(service.get().stroke_width, 12.0);
        assert_eq!(service.normal_pen_width(), 3.0);
        assert_eq!(store.saved().unwrap().stroke_width, 3.0);

        service.select_tool(ToolMode::Normal);
        assert_eq!(service.get().stroke_width, 3.0);
        assert_eq!(store.saved().unwrap().stroke_width, 3.0);
    }

    #[test]
    fn off_grid_colors_are_snapped_to_eight_bits() {
        let (service, _) = service();
        let pen = service.set_color(Color::new(0.3, 0.3, 0.3, 1.0));
        assert_eq!(pen.color, Color::from_rgb8(77, 77, 77));
    }

    #[test]
    fn width_is_clamped() {
        let (service, _) = service();
        assert_eq!(service.set_width(0.1).stroke_width, MIN_PEN_WIDTH);
        assert_eq!(service.set_width(500.0).stroke_width, MAX_PEN_WIDTH);
        assert_eq!(service.set_width(f64::NAN).stroke_width, MAX_PEN_WIDTH);
    }

    #[test]
    fn restores_persisted_eraser_state() {
        let store = Arc::new(MemoryPenStore::with_pen(PenConfig {
            color: BLUE,
            stroke_width: 30.0,
            tool_mode: ToolMode::Eraser,
        }));
        let service = PenService::new(store, PenLimits::default(), PenConfig::default());
        let pen = service.get();
        assert_eq!(pen.tool_mode, ToolMode::Eraser);
        assert_eq!(pen.stroke_width, DEFAULT_MAX_ERASER_WIDTH);
        assert_eq!(service.previous_width(), Some(30.0));
        assert_eq!(service.normal_pen_color(), BLUE);
    }

    #[test]
    fn store_failures_keep_memory_state() {
        let service = PenService::new(
            Arc::new(FailingPenStore),
            PenLimits::default(),
            PenConfig::default(),
        );
        assert_eq!(service.get(), PenConfig::default());
        service.set_color(RED);
        assert_eq!(service.get().color, RED);
    }
}
