//! Gesture tracking over registered surfaces
//!
//! Mouse and touch input are normalized at the boundary into one
//! [`GestureEvent`] shape; everything downstream of [`normalize`] has a
//! single code path regardless of the input source. The tracker itself is a
//! two-state machine (Idle / Active) with exactly one gesture alive at a
//! time, pinned to the surface it started on.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use super::mapping::{SurfacePoint, map_to_surface};
use crate::surface::{SurfaceId, SurfaceRegistry};

/// A single touch contact in viewport cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchPoint {
    pub column: u16,
    pub row: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
    Started,
    Moved,
    Ended,
}

/// Raw touch event; only the first contact participates in a gesture
#[derive(Clone, Debug)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub points: Vec<TouchPoint>,
}

/// Tagged union over the supported input sources.
///
/// Normalized once at the boundary; nothing downstream branches on the
/// variant.
#[derive(Clone, Debug)]
pub enum PointerInput {
    Mouse(MouseEvent),
    Touch(TouchEvent),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    Start,
    Move,
    End,
}

/// The one internal event shape gestures are driven by
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureEvent {
    pub phase: GesturePhase,
    pub column: u16,
    pub row: u16,
}

/// Translate a raw pointer input into the internal gesture event.
///
/// Returns `None` for inputs that are not part of a selection gesture
/// (scroll wheel, right button, hover moves, a touch event with no
/// contacts). A touch end without contacts still ends the gesture; its
/// position is irrelevant because release coordinates never affect the
/// completed selection.
#[must_use]
pub fn normalize(input: &PointerInput) -> Option<GestureEvent> {
    match input {
        PointerInput::Mouse(m) => {
            let phase = match m.kind {
                MouseEventKind::Down(MouseButton::Left) => GesturePhase::Start,
                MouseEventKind::Drag(MouseButton::Left) => GesturePhase::Move,
                MouseEventKind::Up(MouseButton::Left) => GesturePhase::End,
                _ => return None,
            };
            Some(GestureEvent {
                phase,
                column: m.column,
                row: m.row,
            })
        }
        PointerInput::Touch(t) => {
            let phase = match t.phase {
                TouchPhase::Started => GesturePhase::Start,
                TouchPhase::Moved => GesturePhase::Move,
                TouchPhase::Ended => GesturePhase::End,
            };
            match t.points.first() {
                Some(p) => Some(GestureEvent {
                    phase,
                    column: p.column,
                    row: p.row,
                }),
                // touchend often carries no contacts
                None if phase == GesturePhase::End => Some(GestureEvent {
                    phase,
                    column: 0,
                    row: 0,
                }),
                None => None,
            }
        }
    }
}

/// A completed selection gesture, handed off exactly once per release
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    pub surface: SurfaceId,
    pub anchor: SurfacePoint,
    pub current: SurfacePoint,
}

/// In-progress gesture visible to the overlay renderer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveGesture {
    pub surface: SurfaceId,
    pub anchor: SurfacePoint,
    pub current: SurfacePoint,
}

/// Tracks the single system-wide selection gesture.
///
/// Policy for a second gesture start while one is active: ignored. The
/// first gesture keeps its surface and anchor until its own release.
#[derive(Debug, Default)]
pub struct GestureTracker {
    state: Option<ActiveGesture>,
}

impl GestureTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a gesture is currently in progress
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// The in-progress gesture, for overlay rendering
    #[must_use]
    pub fn active(&self) -> Option<ActiveGesture> {
        self.state
    }

    /// Drop any in-progress gesture without completing it
    pub fn cancel(&mut self) {
        self.state = None;
    }

    /// Advance the state machine with one gesture event.
    ///
    /// Returns the completed [`Selection`] on the Active -> Idle transition,
    /// `None` otherwise.
    pub fn handle(
        &mut self,
        event: GestureEvent,
        registry: &SurfaceRegistry,
    ) -> Option<Selection> {
        match (self.state, event.phase) {
            (None, GesturePhase::Start) => {
                let id = registry.surface_at(event.column, event.row)?;
                let surface = registry.get(id)?;
                let anchor = map_to_surface(surface, event.column, event.row);
                self.state = Some(ActiveGesture {
                    surface: id,
                    anchor,
                    current: anchor,
                });
                None
            }

            // One gesture at a time: a second start is dropped
            (Some(_), GesturePhase::Start) => None,

            (Some(mut active), GesturePhase::Move) => {
                // Pinned to the surface the gesture started on
                if registry.surface_at(event.column, event.row) != Some(active.surface) {
                    return None;
                }
                let surface = registry.get(active.surface)?;
                active.current = map_to_surface(surface, event.column, event.row);
                self.state = Some(active);
                None
            }

            (Some(active), GesturePhase::End) => {
                self.state = None;
                // A handle from a discarded document yields no selection
                registry.get(active.surface)?;
                Some(Selection {
                    surface: active.surface,
                    anchor: active.anchor,
                    current: active.current,
                })
            }

            (None, GesturePhase::Move | GesturePhase::End) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{RgbBitmap, Surface, SurfaceRegistry};
    use crossterm::event::KeyModifiers;
    use ratatui::layout::Rect;

    fn registry_with_two_surfaces() -> (SurfaceRegistry, SurfaceId, SurfaceId) {
        let mut registry = SurfaceRegistry::new();
        let a = registry.register(Surface::new(
            RgbBitmap::new(200, 300),
            Rect::new(0, 0, 20, 15),
        ));
        let b = registry.register(Surface::new(
            RgbBitmap::new(200, 300),
            Rect::new(0, 16, 20, 15),
        ));
        (registry, a, b)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> PointerInput {
        PointerInput::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::empty(),
        })
    }

    fn touch(phase: TouchPhase, column: u16, row: u16) -> PointerInput {
        PointerInput::Touch(TouchEvent {
            phase,
            points: vec![TouchPoint { column, row }],
        })
    }

    fn ev(phase: GesturePhase, column: u16, row: u16) -> GestureEvent {
        GestureEvent { phase, column, row }
    }

    #[test]
    fn mouse_and_touch_normalize_identically() {
        let down = normalize(&mouse(MouseEventKind::Down(MouseButton::Left), 7, 3)).unwrap();
        let start = normalize(&touch(TouchPhase::Started, 7, 3)).unwrap();
        assert_eq!(down, start);

        let drag = normalize(&mouse(MouseEventKind::Drag(MouseButton::Left), 9, 4)).unwrap();
        let moved = normalize(&touch(TouchPhase::Moved, 9, 4)).unwrap();
        assert_eq!(drag, moved);
    }

    #[test]
    fn touch_and_mouse_produce_identical_gesture_state() {
        let (registry, _, _) = registry_with_two_surfaces();

        let mut via_mouse = GestureTracker::new();
        via_mouse.handle(
            normalize(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 6)).unwrap(),
            &registry,
        );

        let mut via_touch = GestureTracker::new();
        via_touch.handle(
            normalize(&touch(TouchPhase::Started, 10, 6)).unwrap(),
            &registry,
        );

        assert_eq!(via_mouse.active(), via_touch.active());
    }

    #[test]
    fn non_gesture_inputs_are_filtered() {
        assert!(normalize(&mouse(MouseEventKind::Moved, 1, 1)).is_none());
        assert!(normalize(&mouse(MouseEventKind::ScrollDown, 1, 1)).is_none());
        assert!(
            normalize(&mouse(MouseEventKind::Down(MouseButton::Right), 1, 1)).is_none()
        );
        assert!(
            normalize(&PointerInput::Touch(TouchEvent {
                phase: TouchPhase::Started,
                points: vec![],
            }))
            .is_none()
        );
    }

    #[test]
    fn first_touch_point_wins() {
        let input = PointerInput::Touch(TouchEvent {
            phase: TouchPhase::Started,
            points: vec![
                TouchPoint { column: 3, row: 4 },
                TouchPoint { column: 9, row: 9 },
            ],
        });
        let event = normalize(&input).unwrap();
        assert_eq!((event.column, event.row), (3, 4));
    }

    #[test]
    fn moves_on_other_surface_are_ignored() {
        let (registry, a, _) = registry_with_two_surfaces();
        let mut tracker = GestureTracker::new();

        tracker.handle(ev(GesturePhase::Start, 5, 5), &registry);
        let before = tracker.active().unwrap();
        assert_eq!(before.surface, a);

        // Move lands on surface B: pinned gesture is untouched
        tracker.handle(ev(GesturePhase::Move, 5, 20), &registry);
        assert_eq!(tracker.active().unwrap(), before);

        // Move over the gap between surfaces: also ignored
        tracker.handle(ev(GesturePhase::Move, 5, 15), &registry);
        assert_eq!(tracker.active().unwrap(), before);
    }

    #[test]
    fn second_start_is_ignored_while_active() {
        let (registry, a, _) = registry_with_two_surfaces();
        let mut tracker = GestureTracker::new();

        tracker.handle(ev(GesturePhase::Start, 5, 5), &registry);
        let first = tracker.active().unwrap();

        // A press on surface B while A's gesture is live is dropped
        assert!(
            tracker
                .handle(ev(GesturePhase::Start, 5, 20), &registry)
                .is_none()
        );
        assert_eq!(tracker.active().unwrap(), first);
        assert_eq!(tracker.active().unwrap().surface, a);
    }

    #[test]
    fn completed_gesture_reports_anchor_and_current() {
        let (registry, a, _) = registry_with_two_surfaces();
        let mut tracker = GestureTracker::new();

        tracker.handle(ev(GesturePhase::Start, 1, 1), &registry);
        tracker.handle(ev(GesturePhase::Move, 10, 7), &registry);
        let selection = tracker
            .handle(ev(GesturePhase::End, 10, 7), &registry)
            .expect("release should complete the gesture");

        assert_eq!(selection.surface, a);
        // 200px / 20 cells = 10 px per column, 300px / 15 cells = 20 px per row
        assert_eq!(selection.anchor, SurfacePoint::new(10.0, 20.0));
        assert_eq!(selection.current, SurfacePoint::new(100.0, 140.0));
        assert!(!tracker.is_active());
    }

    #[test]
    fn start_outside_any_surface_stays_idle() {
        let (registry, _, _) = registry_with_two_surfaces();
        let mut tracker = GestureTracker::new();

        assert!(
            tracker
                .handle(ev(GesturePhase::Start, 50, 50), &registry)
                .is_none()
        );
        assert!(!tracker.is_active());
        // Stray move/end in idle are no-ops
        assert!(
            tracker
                .handle(ev(GesturePhase::Move, 5, 5), &registry)
                .is_none()
        );
        assert!(
            tracker
                .handle(ev(GesturePhase::End, 5, 5), &registry)
                .is_none()
        );
    }

    #[test]
    fn reload_during_gesture_yields_no_selection() {
        let (mut registry, _, _) = registry_with_two_surfaces();
        let mut tracker = GestureTracker::new();

        tracker.handle(ev(GesturePhase::Start, 5, 5), &registry);
        registry.clear();

        assert!(
            tracker
                .handle(ev(GesturePhase::End, 5, 5), &registry)
                .is_none()
        );
        assert!(!tracker.is_active());
    }
}
