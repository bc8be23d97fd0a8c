//! Geometry resolution
//!
//! This module converts normalized landmarks into pixel-space points of
//! interest: fingertip points, the mouth center, the hair-region anchor, and
//! the upper/lower face zones. It is a pure per-frame computation with no
//! side effects.

use crate::schema::{NormalizedPoint, RawFrame};
use crate::types::{FaceZone, FaceZones, Point, ResolvedGeometry};

/// Fingertip landmark indices in a 21-point hand landmark set:
/// thumb, index, middle, ring, pinky.
pub const FINGER_TIP_IDS: [usize; 5] = [4, 8, 12, 16, 20];

/// Upper mouth margin landmark index in the face mesh.
pub const MOUTH_TOP: usize = 13;
/// Lower mouth margin landmark index in the face mesh.
pub const MOUTH_BOTTOM: usize = 14;
/// Forehead (top of face oval) landmark index.
pub const FOREHEAD: usize = 10;
/// Chin (bottom of face oval) landmark index.
pub const CHIN: usize = 152;
/// Eyebrow-level landmark index, used to measure head height.
pub const EYEBROW: usize = 105;
/// Left face margin landmark index.
pub const FACE_LEFT: usize = 234;
/// Right face margin landmark index.
pub const FACE_RIGHT: usize = 454;

/// Resolver for converting raw frame landmarks to pixel-space geometry
pub struct GeometryResolver;

impl GeometryResolver {
    /// Resolve all points of interest for a frame.
    ///
    /// A missing hand yields an empty fingertip set; a missing face yields
    /// `None` for the mouth center, hair anchor, and zones.
    pub fn resolve(frame: &RawFrame) -> ResolvedGeometry {
        let finger_tips = frame
            .hand
            .as_deref()
            .map(|hand| resolve_finger_tips(hand, frame.width, frame.height))
            .unwrap_or_default();

        match frame.face.as_deref() {
            Some(face) => ResolvedGeometry {
                finger_tips,
                mouth_center: Some(resolve_mouth_center(face, frame.width, frame.height)),
                hair_anchor: Some(resolve_hair_anchor(face, frame.width, frame.height)),
                zones: Some(resolve_zones(face, frame.width, frame.height)),
            },
            None => ResolvedGeometry {
                finger_tips,
                mouth_center: None,
                hair_anchor: None,
                zones: None,
            },
        }
    }
}

/// Scale a normalized landmark to integer pixel coordinates.
fn scale(point: NormalizedPoint, width: u32, height: u32) -> Point {
    Point::new(
        (point.x * width as f64) as i32,
        (point.y * height as f64) as i32,
    )
}

fn resolve_finger_tips(hand: &[NormalizedPoint], width: u32, height: u32) -> Vec<Point> {
    FINGER_TIP_IDS
        .iter()
        .map(|&id| scale(hand[id], width, height))
        .collect()
}

/// Mouth center: midpoint of the two mouth-margin landmarks.
fn resolve_mouth_center(face: &[NormalizedPoint], width: u32, height: u32) -> Point {
    let top = face[MOUTH_TOP];
    let bottom = face[MOUTH_BOTTOM];
    Point::new(
        ((top.x + bottom.x) / 2.0 * width as f64) as i32,
        ((top.y + bottom.y) / 2.0 * height as f64) as i32,
    )
}

/// Hair anchor: the forehead landmark extended upward by one head-height,
/// where head-height is the forehead-to-eyebrow distance. Same x-coordinate
/// as the forehead.
fn resolve_hair_anchor(face: &[NormalizedPoint], width: u32, height: u32) -> Point {
    let forehead = scale(face[FOREHEAD], width, height);
    let eyebrow = scale(face[EYEBROW], width, height);
    let head_height = forehead.distance_to(eyebrow);
    Point::new(forehead.x, forehead.y - head_height as i32)
}

/// Face zones: the upper zone spans from the forehead to the vertical midpoint
/// between forehead and chin, the lower zone from that midpoint to the chin;
/// both span the full left-to-right face width.
fn resolve_zones(face: &[NormalizedPoint], width: u32, height: u32) -> FaceZones {
    let forehead = scale(face[FOREHEAD], width, height);
    let chin = scale(face[CHIN], width, height);
    let left = scale(face[FACE_LEFT], width, height);
    let right = scale(face[FACE_RIGHT], width, height);

    let mid_y = (forehead.y + chin.y) / 2;

    FaceZones {
        upper: FaceZone {
            top: forehead.y,
            bottom: mid_y,
            left: left.x,
            right: right.x,
        },
        lower: FaceZone {
            top: mid_y,
            bottom: chin.y,
            left: left.x,
            right: right.x,
        },
    }
}
