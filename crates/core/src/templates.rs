//! Outline templates for common countertop shapes
//!
//! A template yields ordered corner positions inside a bounding box. The
//! engine places them as pins and closes the cycle, after which the user drags
//! corners onto the photo. L and U shapes close by the same rule as any
//! polygon; nothing downstream special-cases their pin counts.

use crate::geometry::Point;

/// Predefined outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ShapeTemplate {
    /// 4 corners
    Rectangle,
    /// 6 corners; the notch takes the bottom-right quarter
    LShape,
    /// 8 corners; a centered notch opens at the bottom, a third wide and
    /// two thirds deep
    UShape,
}

impl ShapeTemplate {
    /// Number of corners the template produces
    pub fn corner_count(self) -> usize {
        match self {
            ShapeTemplate::Rectangle => 4,
            ShapeTemplate::LShape => 6,
            ShapeTemplate::UShape => 8,
        }
    }

    /// Corners in connection order, clockwise on screen (Y down)
    pub fn corners(self, origin: Point, width: f64, height: f64) -> Vec<Point> {
        let at = |fx: f64, fy: f64| Point::new(origin.x + fx * width, origin.y + fy * height);
        match self {
            ShapeTemplate::Rectangle => {
                vec![at(0.0, 0.0), at(1.0, 0.0), at(1.0, 1.0), at(0.0, 1.0)]
            }
            ShapeTemplate::LShape => vec![
                at(0.0, 0.0),
                at(1.0, 0.0),
                at(1.0, 0.5),
                at(0.5, 0.5),
                at(0.5, 1.0),
                at(0.0, 1.0),
            ],
            ShapeTemplate::UShape => vec![
                at(0.0, 0.0),
                at(1.0, 0.0),
                at(1.0, 1.0),
                at(2.0 / 3.0, 1.0),
                at(2.0 / 3.0, 1.0 / 3.0),
                at(1.0 / 3.0, 1.0 / 3.0),
                at(1.0 / 3.0, 1.0),
                at(0.0, 1.0),
            ],
        }
    }
}
