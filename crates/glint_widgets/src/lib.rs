//! Glint Widgets
//!
//! Host-facing motion components built on the animation system.
//!
//! Every component follows the same lifecycle: construct it with its options,
//! [`mount`](Component::mount) it on a scheduler, feed it [`HostEvent`]s, and
//! read its style each frame. Unmounting releases every scheduler
//! registration and subscription the component holds.
//!
//! # Example
//!
//! ```rust
//! use glint_animation::FrameScheduler;
//! use glint_core::HostEvent;
//! use glint_widgets::{Component, GlowCard};
//!
//! let scheduler = FrameScheduler::new();
//! let mut card = GlowCard::default();
//! card.mount(&scheduler).unwrap();
//!
//! card.handle_event(&HostEvent::pointer_move(300.0, 0.0, 300.0, 200.0));
//! scheduler.run_until_idle(1.0 / 60.0, 600);
//!
//! let style = card.style();
//! assert_eq!(style.rotate_x, 4.0);
//! assert_eq!(style.rotate_y, 4.0);
//! ```

pub mod glow_card;
pub mod gradient;
pub mod orbs;
pub mod reveal;

pub use glow_card::{CardStyle, GlassCard, GlassCardOptions, GlowCard, GlowCardOptions, GlowColor};
pub use gradient::{AnimatedGradient, GradientOptions, GradientStyle, GradientVariant};
pub use orbs::{FloatingOrbs, OrbSpec, OrbStyle};
pub use reveal::{EntranceStyle, FadeIn, FadeInOptions, StaggerContainer, StaggerOptions};

use glint_animation::{FrameScheduler, Result};
use glint_core::HostEvent;

/// Lifecycle shared by all motion components
pub trait Component {
    /// Create the component's springs and tickables on `scheduler`
    ///
    /// Mounting an already mounted component is a no-op.
    fn mount(&mut self, scheduler: &FrameScheduler) -> Result<()>;

    /// Release every tickable and subscription. Idempotent.
    fn unmount(&mut self);

    fn is_mounted(&self) -> bool;

    /// React to pointer and visibility events
    fn handle_event(&mut self, event: &HostEvent);

    /// Route any host event, including mount and unmount
    fn dispatch(&mut self, scheduler: &FrameScheduler, event: &HostEvent) -> Result<()> {
        match event {
            HostEvent::Mount => self.mount(scheduler),
            HostEvent::Unmount => {
                self.unmount();
                Ok(())
            }
            other => {
                self.handle_event(other);
                Ok(())
            }
        }
    }
}
