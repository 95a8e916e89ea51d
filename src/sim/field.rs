//! Play field bounds

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::EnvironmentError;

/// Rectangular play field with its origin at the top-left corner (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayField {
    pub width: f32,
    pub height: f32,
}

impl PlayField {
    /// Validate and build a play field
    pub fn new(width: f32, height: f32) -> Result<Self, EnvironmentError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(EnvironmentError::InvalidPlayField { width, height });
        }
        Ok(Self { width, height })
    }

    /// Require a play field that may not have been provided yet
    pub fn require(field: Option<PlayField>) -> Result<PlayField, EnvironmentError> {
        field.ok_or(EnvironmentError::MissingPlayField)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() / 2.0
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }

    /// Loose bound for caller-supplied positions: one field extent past each edge
    pub fn within_sanity_bound(&self, point: Vec2) -> bool {
        point.is_finite()
            && point.x >= -self.width
            && point.x <= self.width * 2.0
            && point.y >= -self.height
            && point.y <= self.height * 2.0
    }

    /// Spawn margin shrunk so the inset rectangle never inverts
    pub fn inset_margin(&self, margin: f32) -> (f32, f32) {
        let mx = margin.min(self.width / 2.0);
        let my = margin.min(self.height / 2.0);
        (mx, my)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_degenerate_field() {
        assert!(PlayField::new(800.0, 600.0).is_ok());
        assert!(matches!(
            PlayField::new(0.0, 600.0),
            Err(EnvironmentError::InvalidPlayField { .. })
        ));
        assert!(PlayField::new(f32::NAN, 600.0).is_err());
        assert!(matches!(
            PlayField::require(None),
            Err(EnvironmentError::MissingPlayField)
        ));
    }

    #[test]
    fn test_sanity_bound() {
        let field = PlayField::new(800.0, 600.0).unwrap();
        assert!(field.within_sanity_bound(Vec2::new(-100.0, 700.0)));
        assert!(!field.within_sanity_bound(Vec2::new(5000.0, 0.0)));
        assert!(!field.within_sanity_bound(Vec2::new(f32::INFINITY, 0.0)));
    }

    #[test]
    fn test_inset_margin_on_tiny_field() {
        let field = PlayField::new(60.0, 600.0).unwrap();
        assert_eq!(field.inset_margin(50.0), (30.0, 50.0));
    }
}
