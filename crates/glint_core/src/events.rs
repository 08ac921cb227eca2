//! Host event contract
//!
//! Events the host UI layer feeds into the motion engine. Pointer positions
//! arrive in element-local pixels and are normalized here before they reach
//! any motion value.

/// An inbound event from the host
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    /// Pointer moved inside the element
    PointerMove {
        /// Pointer x relative to the element's left edge (px)
        local_x: f32,
        /// Pointer y relative to the element's top edge (px)
        local_y: f32,
        width: f32,
        height: f32,
    },
    PointerEnter,
    PointerLeave,
    Mount,
    Unmount,
    /// The element scrolled into the viewport
    ViewportEnter,
}

impl HostEvent {
    /// Create a pointer move event
    pub fn pointer_move(local_x: f32, local_y: f32, width: f32, height: f32) -> Self {
        HostEvent::PointerMove {
            local_x,
            local_y,
            width,
            height,
        }
    }

    /// Normalized pointer position, for pointer move events
    pub fn pointer_sample(&self) -> Option<PointerSample> {
        match *self {
            HostEvent::PointerMove {
                local_x,
                local_y,
                width,
                height,
            } => Some(PointerSample::normalize(local_x, local_y, width, height)),
            _ => None,
        }
    }
}

/// Pointer position normalized to `[-0.5, 0.5]` on each axis
///
/// `(0, 0)` is the element centre, `(0.5, -0.5)` the top-right corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    pub const CENTER: PointerSample = PointerSample { x: 0.0, y: 0.0 };

    /// Normalize element-local pixel coordinates
    ///
    /// An axis with a non-positive or non-finite size normalizes to the
    /// centre on that axis.
    pub fn normalize(local_x: f32, local_y: f32, width: f32, height: f32) -> Self {
        Self {
            x: normalize_axis(local_x, width),
            y: normalize_axis(local_y, height),
        }
    }
}

fn normalize_axis(local: f32, extent: f32) -> f32 {
    if !(extent.is_finite() && extent > 0.0) || !local.is_finite() {
        return 0.0;
    }
    local / extent - 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_center() {
        let sample = PointerSample::normalize(150.0, 100.0, 300.0, 200.0);
        assert_eq!(sample, PointerSample::CENTER);
    }

    #[test]
    fn test_normalize_top_right() {
        let sample = PointerSample::normalize(300.0, 0.0, 300.0, 200.0);
        assert_eq!(sample, PointerSample { x: 0.5, y: -0.5 });
    }

    #[test]
    fn test_normalize_zero_sized_element() {
        let sample = PointerSample::normalize(10.0, 10.0, 0.0, 0.0);
        assert_eq!(sample, PointerSample::CENTER);
    }

    #[test]
    fn test_pointer_sample_only_for_moves() {
        let event = HostEvent::pointer_move(0.0, 200.0, 300.0, 200.0);
        assert_eq!(
            event.pointer_sample(),
            Some(PointerSample { x: -0.5, y: 0.5 })
        );
        assert_eq!(HostEvent::PointerLeave.pointer_sample(), None);
    }
}
