//! Render contract
//!
//! Per-bubble instance data in a GPU-friendly layout. The renderer lives
//! outside this crate; it uploads `as_bytes(&build_instances(..))` as an
//! instance buffer and draws one circle per entry.

use bytemuck::{Pod, Zeroable};

use crate::sim::bubble::Bubble;

/// Lifetime fraction after which a bubble starts tinting toward `colors::DANGER`
pub const DANGER_THRESHOLD: f32 = 0.7;

/// One bubble instance
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BubbleInstance {
    pub position: [f32; 2],
    pub radius: f32,
    pub health: f32,
    pub color: [f32; 4],
    pub age: f32,
    pub _pad: [f32; 3],
}

impl BubbleInstance {
    pub fn from_bubble(bubble: &Bubble) -> Self {
        let age = bubble.age_ratio();
        Self {
            position: bubble.pos.to_array(),
            radius: bubble.radius(),
            health: bubble.health_ratio(),
            color: danger_tint(hex_to_rgba(bubble.kind.profile().color), age),
            age,
            _pad: [0.0; 3],
        }
    }
}

/// Colors used by the render contract
pub mod colors {
    pub const DANGER: [f32; 4] = [1.0, 0.15, 0.1, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.05, 1.0];
}

/// 0xRRGGBB to normalized RGBA
pub fn hex_to_rgba(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
    [channel(16), channel(8), channel(0), 1.0]
}

fn danger_tint(color: [f32; 4], age_ratio: f32) -> [f32; 4] {
    if age_ratio <= DANGER_THRESHOLD {
        return color;
    }
    let t = ((age_ratio - DANGER_THRESHOLD) / (1.0 - DANGER_THRESHOLD)).clamp(0.0, 1.0);
    let mut out = color;
    for (c, d) in out.iter_mut().zip(colors::DANGER) {
        *c += (d - *c) * t;
    }
    out
}

/// Instances for every live bubble, in collection order
pub fn build_instances(bubbles: &[Bubble]) -> Vec<BubbleInstance> {
    bubbles
        .iter()
        .filter(|b| b.is_alive())
        .map(BubbleInstance::from_bubble)
        .collect()
}

pub fn as_bytes(instances: &[BubbleInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bubble::{BubbleType, PopCause};
    use glam::Vec2;

    #[test]
    fn test_hex_to_rgba() {
        assert_eq!(hex_to_rgba(0xFF0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(hex_to_rgba(0x0000FF), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_dead_bubbles_are_skipped() {
        let mut bubbles = vec![
            Bubble::new(1, BubbleType::Normal, Vec2::new(10.0, 20.0)),
            Bubble::new(2, BubbleType::Boss, Vec2::new(30.0, 40.0)),
        ];
        bubbles[0].terminate(PopCause::Player);
        let instances = build_instances(&bubbles);
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].position, [30.0, 40.0]);
        assert_eq!(instances[0].radius, 45.0);
        assert_eq!(instances[0].health, 1.0);
        assert_eq!(as_bytes(&instances).len(), std::mem::size_of::<BubbleInstance>());
    }

    #[test]
    fn test_old_bubbles_tint_toward_danger() {
        let mut bubble = Bubble::new(1, BubbleType::Pink, Vec2::ZERO);
        let base = BubbleInstance::from_bubble(&bubble).color;

        bubble.age = bubble.max_age * 0.6;
        assert_eq!(BubbleInstance::from_bubble(&bubble).color, base);

        bubble.age = bubble.max_age;
        let expired = BubbleInstance::from_bubble(&bubble);
        for (c, d) in expired.color.iter().zip(colors::DANGER) {
            assert!((c - d).abs() < 1e-5);
        }
        assert_eq!(expired.age, 1.0);
    }
}
