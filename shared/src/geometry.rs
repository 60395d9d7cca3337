//! Playfield layout and bounding boxes.
//!
//! The field spans [-1, 1] on both axes. Team 0 cannons sit on the bottom
//! baseline and fire upward, team 1 cannons hang from the top edge and fire
//! downward. Positions are normalized to [0, 1] across the usable width.

pub const FIELD_MIN_X: f32 = -1.0;
pub const FIELD_MAX_X: f32 = 1.0;
pub const FIELD_TOP: f32 = 1.0;
pub const CANNON_BASELINE: f32 = -1.0;

pub const CANNON_WIDTH: f32 = 0.1;
pub const CANNON_HEIGHT: f32 = 0.1;
pub const MISSILE_WIDTH: f32 = 0.03;
pub const MISSILE_HEIGHT: f32 = 0.07;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    /// Boxes overlap unless an axis separates them. Touching edges overlap.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.x1 > other.x2 || other.x1 > self.x2 || self.y1 > other.y2 || other.y1 > self.y2)
    }
}

/// Box of a cannon at normalized position `x`. `top` selects the team 1 edge.
pub fn cannon_box(x: f32, top: bool) -> Rect {
    let x1 = x * (FIELD_MAX_X - CANNON_WIDTH - FIELD_MIN_X) + FIELD_MIN_X;
    let y1 = if top {
        FIELD_TOP - CANNON_HEIGHT
    } else {
        CANNON_BASELINE
    };
    Rect {
        x1,
        y1,
        x2: x1 + CANNON_WIDTH,
        y2: y1 + CANNON_HEIGHT,
    }
}

/// Box of a missile at normalized position `x` and travel progress `y`.
///
/// Missiles are centered on their launcher. Upward missiles travel from just
/// above the bottom cannons to the top edge; downward missiles from just
/// below the top cannons to the baseline.
pub fn missile_box(x: f32, y: f32, up: bool) -> Rect {
    let min_x = FIELD_MIN_X + 0.5 * CANNON_WIDTH - 0.5 * MISSILE_WIDTH;
    let max_x = FIELD_MAX_X - 0.5 * CANNON_WIDTH - 0.5 * MISSILE_WIDTH;
    let x1 = x * (max_x - min_x) + min_x;

    let y1 = if up {
        let min_y = CANNON_BASELINE + CANNON_HEIGHT;
        let max_y = FIELD_TOP - MISSILE_HEIGHT;
        y * (max_y - min_y) + min_y
    } else {
        let min_y = CANNON_BASELINE;
        let max_y = FIELD_TOP - CANNON_HEIGHT;
        y * (min_y - max_y) + max_y
    };

    Rect {
        x1,
        y1,
        x2: x1 + MISSILE_WIDTH,
        y2: y1 + MISSILE_HEIGHT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn rect(x1: f32, y1: f32, x2: f32, y2: f32) -> Rect {
        Rect { x1, y1, x2, y2 }
    }

    #[test]
    fn test_disjoint_boxes_do_not_intersect() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(2.0, 2.0, 3.0, 3.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_touching_edges_intersect() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(1.0, 0.0, 2.0, 1.0);
        assert!(a.intersects(&b));
        let c = rect(0.0, 1.0, 1.0, 2.0);
        assert!(a.intersects(&c));
    }

    #[test]
    fn test_intersection_is_symmetric() {
        let boxes = [
            rect(0.0, 0.0, 1.0, 1.0),
            rect(0.5, 0.5, 1.5, 1.5),
            rect(1.0, -1.0, 2.0, 0.0),
            rect(-3.0, -3.0, -2.0, -2.0),
            rect(0.2, 0.2, 0.3, 0.3),
            rect(-1.0, 0.4, 3.0, 0.6),
        ];
        for a in &boxes {
            for b in &boxes {
                assert_eq!(a.intersects(b), b.intersects(a), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_cannon_box_spans_usable_width() {
        let left = cannon_box(0.0, false);
        assert_approx_eq!(left.x1, FIELD_MIN_X, 1e-6);
        assert_approx_eq!(left.y1, CANNON_BASELINE, 1e-6);

        let right = cannon_box(1.0, true);
        assert_approx_eq!(right.x2, FIELD_MAX_X, 1e-6);
        assert_approx_eq!(right.y2, FIELD_TOP, 1e-6);
    }

    #[test]
    fn test_missile_is_centered_on_cannon() {
        for x in [0.0, 0.3, 0.5, 1.0] {
            let cannon = cannon_box(x, false);
            let missile = missile_box(x, 0.0, true);
            let cannon_center = (cannon.x1 + cannon.x2) / 2.0;
            let missile_center = (missile.x1 + missile.x2) / 2.0;
            assert_approx_eq!(cannon_center, missile_center, 1e-5);
        }
    }

    #[test]
    fn test_upward_missile_reaches_top_cannon() {
        let target = cannon_box(0.5, true);
        assert!(!missile_box(0.5, 0.0, true).intersects(&target));
        assert!(missile_box(0.5, 1.0, true).intersects(&target));
        assert!(!missile_box(0.0, 1.0, true).intersects(&target));
    }

    #[test]
    fn test_downward_missile_reaches_bottom_cannon() {
        let target = cannon_box(0.5, false);
        assert!(!missile_box(0.5, 0.0, false).intersects(&target));
        assert!(missile_box(0.5, 1.0, false).intersects(&target));
    }
}
