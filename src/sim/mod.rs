//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Explicit frame delta and clock, no wall time
//! - Seeded RNG only
//! - Stable iteration order (collection order)
//! - No rendering or platform dependencies

pub mod bubble;
pub mod drag;
pub mod effects;
pub mod field;
pub mod hooks;
pub mod physics;
pub mod scheduler;
pub mod spawner;
pub mod tick;

pub use bubble::{Bubble, BubbleId, BubbleProfile, BubbleType, MotionState, PopCause, SlowModifier};
pub use drag::{DragRelease, DragSettings, DragState, DragSystem, flick_strength};
pub use effects::{EffectContext, EffectProcessor, EffectRecord, EffectSettings};
pub use field::PlayField;
pub use hooks::{DamageSource, NotificationLog, NotificationSink, NullSink, PlayerHealth, PlayerVitals};
pub use physics::{PerformanceStats, PhysicsEngine, PhysicsSettings, PhysicsSettingsUpdate};
pub use scheduler::{PopScheduler, PopTicket, ScheduledPop};
pub use spawner::{SpawnConfig, SpawnPolicy, Spawner, TypeChance};
pub use tick::{BubbleSim, FrameReport, PointerEvent, SimConfig, TickInput};
