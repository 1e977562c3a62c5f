//! Display Resolver — which monitor is the user pointing at?
//!
//! Works on a fresh snapshot of the display layout every time. Monitors can
//! be plugged, unplugged or rescaled between two captures, so nothing here
//! is cached.

use serde::{Deserialize, Serialize};

/// One physical display as seen in the global logical desktop space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Display {
    pub id: u32,
    /// Logical origin. May be negative for displays left of / above the primary.
    pub x: i32,
    pub y: i32,
    /// Logical size (DIPs).
    pub width: u32,
    pub height: u32,
    /// Physical pixels per logical pixel (1.0, 1.25, 1.5, 2.0, ...).
    pub scale_factor: f64,
    pub is_primary: bool,
}

/// A pointer position in global logical desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Display {
    /// Stand-in used when the platform reports no displays at all.
    ///
    /// Its id matches no capture source, so a capture attempted against it
    /// fails with `SourceNotFound` instead of grabbing an arbitrary monitor.
    pub fn placeholder_primary() -> Self {
        Self {
            id: 0,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            scale_factor: 1.0,
            is_primary: true,
        }
    }

    fn left(&self) -> f64 {
        f64::from(self.x)
    }

    fn top(&self) -> f64 {
        f64::from(self.y)
    }

    fn right(&self) -> f64 {
        f64::from(self.x) + f64::from(self.width)
    }

    fn bottom(&self) -> f64 {
        f64::from(self.y) + f64::from(self.height)
    }

    /// Half-open containment: the right and bottom edges belong to the
    /// neighbouring display.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }

    /// Euclidean distance from `p` to the nearest point of this display's
    /// rectangle (0 when inside or on the edge).
    pub fn distance_to(&self, p: Point) -> f64 {
        let dx = (self.left() - p.x).max(p.x - self.right()).max(0.0);
        let dy = (self.top() - p.y).max(p.y - self.bottom()).max(0.0);
        dx.hypot(dy)
    }
}

/// Return the display under the cursor.
///
/// Resolution order: the display containing the point, else the nearest one
/// (first in enumeration order on ties), else the placeholder primary when
/// the enumeration is empty. Always returns something usable.
pub fn resolve_active_display(displays: &[Display], cursor: Point) -> Display {
    if let Some(hit) = displays.iter().find(|d| d.contains(cursor)) {
        return hit.clone();
    }

    let nearest = displays.iter().fold(None::<(&Display, f64)>, |best, d| {
        let dist = d.distance_to(cursor);
        match best {
            Some((_, best_dist)) if best_dist <= dist => best,
            _ => Some((d, dist)),
        }
    });

    match nearest {
        Some((d, dist)) => {
            log::debug!(
                "[CAPTURE] Cursor ({:.0},{:.0}) outside all displays — nearest is {} ({:.1}px away)",
                cursor.x, cursor.y, d.id, dist
            );
            d.clone()
        }
        None => {
            log::warn!("[CAPTURE] Display enumeration empty — using placeholder primary");
            Display::placeholder_primary()
        }
    }
}

/// Convert a pointer position reported in physical pixels to logical
/// coordinates.
///
/// Each display's scale factor is tried in enumeration order; the first
/// reading that falls inside that same display wins. Otherwise the
/// primary's scale is used (1.0 with no displays).
pub fn physical_to_logical(displays: &[Display], x: f64, y: f64) -> Point {
    for d in displays {
        let candidate = Point::new(x / d.scale_factor, y / d.scale_factor);
        if d.contains(candidate) {
            return candidate;
        }
    }
    let scale = displays
        .iter()
        .find(|d| d.is_primary)
        .or_else(|| displays.first())
        .map_or(1.0, |d| d.scale_factor);
    Point::new(x / scale, y / scale)
}

/// Rebuild a layout reported in physical pixels (Windows) as logical space.
///
/// The primary keeps its origin divided by its own scale. Every other display
/// is sized by its own scale and placed against the primary: a display wholly
/// right of (or below) the primary starts at the primary's logical edge plus
/// its own scaled gap, one wholly left of (or above) it ends there, and an
/// overlapping axis is offset at the primary's scale.
pub fn logical_layout(physical: &[Display]) -> Vec<Display> {
    let Some(anchor) = physical.iter().find(|d| d.is_primary).or_else(|| physical.first()) else {
        return Vec::new();
    };
    let anchor_scale = anchor.scale_factor;

    physical
        .iter()
        .map(|d| {
            let scale = d.scale_factor;
            Display {
                x: logical_origin(d.x, d.width, scale, anchor.x, anchor.width, anchor_scale),
                y: logical_origin(d.y, d.height, scale, anchor.y, anchor.height, anchor_scale),
                width: (f64::from(d.width) / scale).floor() as u32,
                height: (f64::from(d.height) / scale).floor() as u32,
                ..d.clone()
            }
        })
        .collect()
}

fn logical_origin(
    start: i32,
    extent: u32,
    scale: f64,
    anchor_start: i32,
    anchor_extent: u32,
    anchor_scale: f64,
) -> i32 {
    let start = f64::from(start);
    let anchor_start = f64::from(anchor_start);
    let anchor_end = anchor_start + f64::from(anchor_extent);
    let logical_anchor_start = (anchor_start / anchor_scale).floor();

    let logical = if start >= anchor_end {
        logical_anchor_start
            + (f64::from(anchor_extent) / anchor_scale).floor()
            + ((start - anchor_end) / scale).floor()
    } else if start + f64::from(extent) <= anchor_start {
        logical_anchor_start - ((anchor_start - start) / scale).floor()
    } else {
        logical_anchor_start + ((start - anchor_start) / anchor_scale).floor()
    };
    logical as i32
}

/// Map a physical pointer position through a physical layout into the
/// logical space built by [`logical_layout`].
pub fn physical_point_in_layout(physical: &[Display], x: f64, y: f64) -> Point {
    let logical = logical_layout(physical);
    let point = Point::new(x, y);
    match physical.iter().zip(&logical).find(|(p, _)| p.contains(point)) {
        Some((p, l)) => Point::new(
            f64::from(l.x) + (x - f64::from(p.x)) / p.scale_factor,
            f64::from(l.y) + (y - f64::from(p.y)) / p.scale_factor,
        ),
        None => physical_to_logical(&logical, x, y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(id: u32, x: i32, y: i32, width: u32, height: u32, scale: f64) -> Display {
        Display {
            id,
            x,
            y,
            width,
            height,
            scale_factor: scale,
            is_primary: id == 1,
        }
    }

    fn side_by_side() -> Vec<Display> {
        vec![
            display(1, 0, 0, 1920, 1080, 1.0),
            display(2, 1920, 0, 1920, 1080, 1.5),
        ]
    }

    #[test]
    fn cursor_on_second_display_resolves_to_it() {
        let active = resolve_active_display(&side_by_side(), Point::new(2500.0, 50.0));
        assert_eq!(active.id, 2);
        assert_eq!(active.x, 1920);
    }

    #[test]
    fn interior_points_resolve_to_their_display() {
        let displays = side_by_side();
        for &(x, y, expected) in &[
            (1.0, 1.0, 1),
            (960.0, 540.0, 1),
            (1919.5, 1079.5, 1),
            (1920.5, 0.5, 2),
            (3839.0, 1079.0, 2),
        ] {
            assert_eq!(
                resolve_active_display(&displays, Point::new(x, y)).id,
                expected,
                "point ({x},{y})"
            );
        }
    }

    #[test]
    fn shared_edge_belongs_to_right_neighbour() {
        let active = resolve_active_display(&side_by_side(), Point::new(1920.0, 10.0));
        assert_eq!(active.id, 2);
    }

    #[test]
    fn point_in_gap_picks_nearest_display() {
        // Second display sits below and to the right with a dead zone between.
        let displays = vec![
            display(1, 0, 0, 1920, 1080, 1.0),
            display(7, 2000, 1200, 1280, 1024, 2.0),
        ];
        let active = resolve_active_display(&displays, Point::new(1990.0, 1190.0));
        assert_eq!(active.id, 7);

        let active = resolve_active_display(&displays, Point::new(1925.0, 500.0));
        assert_eq!(active.id, 1);
    }

    #[test]
    fn negative_origin_display_is_resolved() {
        let displays = vec![
            display(1, 0, 0, 1920, 1080, 1.0),
            display(3, -1440, -200, 1440, 900, 2.0),
        ];
        let active = resolve_active_display(&displays, Point::new(-10.0, 0.0));
        assert_eq!(active.id, 3);
    }

    #[test]
    fn equidistant_point_prefers_enumeration_order() {
        let displays = vec![
            display(4, 0, 0, 100, 100, 1.0),
            display(5, 200, 0, 100, 100, 1.0),
        ];
        let active = resolve_active_display(&displays, Point::new(150.0, 50.0));
        assert_eq!(active.id, 4);
    }

    #[test]
    fn empty_enumeration_falls_back_to_placeholder_primary() {
        let active = resolve_active_display(&[], Point::new(10.0, 10.0));
        assert_eq!(active, Display::placeholder_primary());
        assert!(active.is_primary);
        assert_eq!(active.scale_factor, 1.0);
    }

    #[test]
    fn physical_pointer_maps_through_matching_display_scale() {
        let displays = vec![
            display(1, 0, 0, 1440, 900, 2.0),
            display(2, 1440, 0, 1920, 1080, 1.0),
        ];
        assert_eq!(physical_to_logical(&displays, 200.0, 100.0), Point::new(100.0, 50.0));
        assert_eq!(physical_to_logical(&displays, 3000.0, 10.0), Point::new(3000.0, 10.0));
    }

    /// Windows reports positions and sizes in physical pixels.
    fn windows_snapshot() -> Vec<Display> {
        vec![
            display(1, 0, 0, 2880, 1620, 1.5),
            display(2, 2880, 0, 1920, 1080, 1.0),
        ]
    }

    #[test]
    fn physical_layout_is_rebuilt_as_logical() {
        let logical = logical_layout(&windows_snapshot());
        assert_eq!((logical[0].x, logical[0].y, logical[0].width, logical[0].height), (0, 0, 1920, 1080));
        assert_eq!((logical[1].x, logical[1].y, logical[1].width, logical[1].height), (1920, 0, 1920, 1080));
        assert_eq!(logical[1].scale_factor, 1.0);
    }

    #[test]
    fn logical_cursor_on_scaled_windows_secondary_resolves_to_it() {
        let logical = logical_layout(&windows_snapshot());
        assert_eq!(resolve_active_display(&logical, Point::new(2020.0, 50.0)).id, 2);
        assert_eq!(resolve_active_display(&logical, Point::new(1900.0, 50.0)).id, 1);
    }

    #[test]
    fn displays_left_of_and_below_the_primary_stay_adjacent() {
        let logical = logical_layout(&[
            display(1, 0, 0, 2880, 1620, 1.5),
            display(2, -1920, 0, 1920, 1080, 1.0),
            display(3, 0, 1620, 2560, 1440, 2.0),
        ]);
        assert_eq!((logical[1].x, logical[1].width), (-1920, 1920));
        assert_eq!((logical[2].x, logical[2].y, logical[2].width), (0, 1080, 1280));
    }

    #[test]
    fn physical_pointer_maps_into_rebuilt_layout() {
        let physical = windows_snapshot();
        assert_eq!(physical_point_in_layout(&physical, 1500.0, 300.0), Point::new(1000.0, 200.0));
        let on_secondary = physical_point_in_layout(&physical, 3000.0, 50.0);
        assert_eq!(on_secondary, Point::new(2040.0, 50.0));
        let logical = logical_layout(&physical);
        assert_eq!(resolve_active_display(&logical, on_secondary).id, 2);
    }

    #[test]
    fn empty_physical_layout_stays_empty() {
        assert!(logical_layout(&[]).is_empty());
        assert_eq!(physical_point_in_layout(&[], 42.0, 7.0), Point::new(42.0, 7.0));
    }

    #[test]
    fn physical_pointer_without_displays_is_unscaled() {
        assert_eq!(physical_to_logical(&[], 42.0, 7.0), Point::new(42.0, 7.0));
    }
}
