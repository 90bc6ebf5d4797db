//! Reorder gestures as an explicit state machine.
//!
//! A gesture is short-lived and single-owner: Idle until a canvas item
//! is grabbed, Dragging while no drop zone has been entered, Hovering
//! once one has. Hover fires repeatedly as the pointer (or selection)
//! moves across items; the last target wins. Nothing is mutated until
//! the gesture commits.
//!
//! Palette drops are not reorders and never pass through here; they
//! always append to the end of the canvas.

/// Gesture state. At most one gesture is in flight per builder session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: usize,
    },
    Hovering {
        source: usize,
        target: usize,
    },
}

#[derive(Debug, Default)]
pub struct DragReorder {
    state: DragState,
}

impl DragReorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != DragState::Idle
    }

    /// Index being dragged, if a gesture is in flight.
    pub fn source(&self) -> Option<usize> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { source } | DragState::Hovering { source, .. } => Some(source),
        }
    }

    /// Current drop target, if the gesture has entered one.
    pub fn target(&self) -> Option<usize> {
        match self.state {
            DragState::Hovering { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Start a gesture over the item at `source`. Ignored while another
    /// gesture is in flight.
    pub fn begin(&mut self, source: usize) {
        if self.state == DragState::Idle {
            self.state = DragState::Dragging { source };
        }
    }

    /// The gesture entered item `target`'s drop zone.
    pub fn hover(&mut self, target: usize) {
        match self.state {
            DragState::Dragging { source } | DragState::Hovering { source, .. } => {
                self.state = DragState::Hovering { source, target };
            }
            DragState::Idle => {}
        }
    }

    /// Abort without mutating (dropped outside any item).
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// End the gesture. Returns `Some((source, target))` only when both
    /// ends are known and differ; otherwise the gesture was a no-op.
    pub fn commit(&mut self) -> Option<(usize, usize)> {
        let result = match self.state {
            DragState::Hovering { source, target } if source != target => Some((source, target)),
            _ => None,
        };
        self.state = DragState::Idle;
        result
    }
}

/// Move the item at `source` to `target`, shifting everything between
/// by one slot. A splice, not a swap. Out-of-range or equal indices
/// leave the list untouched.
pub fn splice_move<T>(items: &mut Vec<T>, source: usize, target: usize) {
    if source == target || source >= items.len() || target >= items.len() {
        return;
    }
    let item = items.remove(source);
    items.insert(target, item);
}
