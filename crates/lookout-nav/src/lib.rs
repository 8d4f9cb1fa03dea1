pub mod engine;
pub mod navigator;
pub mod promote;
pub mod snapshot;

pub use engine::{DeliveryEngine, RefreshOutcome, StreamFlags};
pub use navigator::{Direction, NavMode, NavOrigin, NavigationState, Navigator};
pub use promote::{HostSurface, Promotion, PromotionGate, PromotionTracker};
pub use snapshot::{DisplayPosition, NavSnapshot, SnapshotArena, SnapshotId};
