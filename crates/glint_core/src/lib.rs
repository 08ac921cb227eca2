//! Glint Core
//!
//! Foundational primitives for the Glint motion engine:
//!
//! - **Motion Values**: Observable scalars with ordered, synchronous notification
//! - **Derived Values**: Pure mappings of motion values, recomputed on read
//! - **Host Events**: The pointer/lifecycle/visibility event contract
//!
//! # Example
//!
//! ```rust
//! use glint_core::{DerivedValue, MotionValue, RangeMap};
//!
//! let pointer_y = MotionValue::new(0.0);
//! let rotate_x = DerivedValue::remap(&pointer_y, RangeMap::new([-0.5, 0.5], [4.0, -4.0]));
//!
//! pointer_y.set(-0.5);
//! assert_eq!(rotate_x.get(), 4.0);
//! ```

pub mod derived;
pub mod events;
pub mod motion_value;

pub use derived::{format_percent_pair, DerivedValue, Point2, RangeMap};
pub use events::{HostEvent, PointerSample};
pub use motion_value::{MotionValue, Subscriber, Subscription};
