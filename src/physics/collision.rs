//! AABB Collision
//!
//! Pairwise rectangle overlap and a center-distance side classifier.
//!
//! The classifier here is a general directional hint. Tile impacts use a
//! different edge-proximity rule, see [`crate::physics::tilemap`].

use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::rect::Rect;
use crate::physics::entity::{EntityId, RigidEntity};

/// Edge of a reference box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Upper edge
    Top,
    /// Right edge
    Right,
    /// Lower edge
    Bottom,
    /// Left edge
    Left,
}

impl Side {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check if two boxes overlap.
///
/// Intervals are closed: boxes that only share an edge overlap.
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    // Any one of these means the boxes are apart on that axis
    let top = a.y > b.y + b.h;
    let left = a.x > b.x + b.w;
    let right = a.x + a.w < b.x;
    let bottom = a.y + a.h < b.y;

    !(top || left || right || bottom)
}

/// Which side of `a` the box `b` lies against, by center distance.
///
/// Works whether or not the boxes overlap. When `dx² == dy²` the vertical
/// branch wins.
pub fn classify_side(a: &Rect, b: &Rect) -> Side {
    let dx = a.center_x() - b.center_x();
    let dy = a.center_y() - b.center_y();

    if dx * dx > dy * dy {
        if dx > 0.0 {
            Side::Right
        } else {
            Side::Left
        }
    } else if dy > 0.0 {
        Side::Bottom
    } else {
        Side::Top
    }
}

/// Result of an entity-vs-entity overlap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityOverlap {
    /// Reference entity (lower id)
    pub a: EntityId,
    /// Other entity
    pub b: EntityId,
    /// `classify_side(a, b)`
    pub side: Side,
}

/// Check all entity pairs in deterministic (id) order.
///
/// Flat O(n²) sweep over every pair `(i, j)` with `i < j`.
pub fn check_all_entity_overlaps(entities: &BTreeMap<EntityId, RigidEntity>) -> Vec<EntityOverlap> {
    let mut overlaps_found = Vec::new();

    // BTreeMap iterates in sorted key order
    let boxes: Vec<(EntityId, Rect)> = entities
        .iter()
        .map(|(id, entity)| (*id, entity.rect()))
        .collect();

    for i in 0..boxes.len() {
        for j in (i + 1)..boxes.len() {
            let (id_a, rect_a) = &boxes[i];
            let (id_b, rect_b) = &boxes[j];

            if overlaps(rect_a, rect_b) {
                overlaps_found.push(EntityOverlap {
                    a: *id_a,
                    b: *id_b,
                    side: classify_side(rect_a, rect_b),
                });
            }
        }
    }

    overlaps_found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vector2;
    use proptest::prelude::*;

    #[test]
    fn test_overlaps() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(overlaps(&a, &Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!overlaps(&a, &Rect::new(20.0, 20.0, 5.0, 5.0)));
    }

    #[test]
    fn test_overlaps_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(overlaps(&a, &Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(overlaps(&a, &Rect::new(0.0, 10.0, 5.0, 5.0)));
        // Corner contact counts too
        assert!(overlaps(&a, &Rect::new(10.0, 10.0, 5.0, 5.0)));
        assert!(!overlaps(&a, &Rect::new(10.5, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn test_overlaps_containment() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 2.0, 2.0);
        assert!(overlaps(&outer, &inner));
        assert!(overlaps(&inner, &outer));
    }

    #[test]
    fn test_classify_side_horizontal() {
        let a = Rect::new(-5.0, -5.0, 10.0, 10.0);
        // b strictly to the right of a: dx < 0
        let b = Rect::new(20.0, -5.0, 10.0, 10.0);
        assert_eq!(classify_side(&a, &b), Side::Left);
        assert_eq!(classify_side(&b, &a), Side::Right);
    }

    #[test]
    fn test_classify_side_vertical() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 30.0, 10.0, 10.0);
        assert_eq!(classify_side(&a, &below), Side::Top);
        assert_eq!(classify_side(&below, &a), Side::Bottom);
    }

    #[test]
    fn test_classify_side_tie_goes_vertical() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Diagonal neighbours: |dx| == |dy| == 10
        let down_right = Rect::new(10.0, 10.0, 10.0, 10.0);
        let up_left = Rect::new(-10.0, -10.0, 10.0, 10.0);
        let up_right = Rect::new(10.0, -10.0, 10.0, 10.0);

        assert_eq!(classify_side(&a, &down_right), Side::Top);
        assert_eq!(classify_side(&a, &up_left), Side::Bottom);
        assert_eq!(classify_side(&a, &up_right), Side::Bottom);

        // Identical centers also fall through to the vertical branch
        assert_eq!(classify_side(&a, &a), Side::Top);
    }

    #[test]
    fn test_classify_side_without_overlap() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let far = Rect::new(-500.0, 2.0, 1.0, 1.0);
        assert!(!overlaps(&a, &far));
        assert_eq!(classify_side(&a, &far), Side::Right);
    }

    #[test]
    fn test_check_all_entity_overlaps() {
        let mut entities = BTreeMap::new();
        entities.insert(EntityId(2), RigidEntity::at(Vector2::new(8.0, 0.0), 10.0, 10.0));
        entities.insert(EntityId(1), RigidEntity::at(Vector2::new(0.0, 0.0), 10.0, 10.0));
        entities.insert(EntityId(3), RigidEntity::at(Vector2::new(100.0, 100.0), 10.0, 10.0));

        let found = check_all_entity_overlaps(&entities);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].a, EntityId(1));
        assert_eq!(found[0].b, EntityId(2));
        assert_eq!(found[0].side, Side::Left);
    }

    fn int_rect() -> impl Strategy<Value = Rect> {
        (-200i32..200, -200i32..200, 0i32..100, 0i32..100)
            .prop_map(|(x, y, w, h)| Rect::new(x as f64, y as f64, w as f64, h as f64))
    }

    proptest! {
        #[test]
        fn prop_overlaps_is_symmetric(a in int_rect(), b in int_rect()) {
            prop_assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
        }

        #[test]
        fn prop_box_overlaps_itself(a in int_rect()) {
            prop_assert!(overlaps(&a, &a));
        }
    }
}
