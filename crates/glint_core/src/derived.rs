//! Derived values
//!
//! A [`DerivedValue`] maps one or more [`MotionValue`]s to an output through
//! a pure function. Input notifications only mark the value dirty; the map
//! runs when the value is read, with every input read at the same moment.
//! A composite of two springs therefore never shows one spring's new value
//! next to the other's old one.
//!
//! Derived values only read their inputs and expose no setter, so the
//! observer graph cannot contain cycles.

use crate::motion_value::{MotionValue, Subscription};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type Inputs = SmallVec<[MotionValue; 2]>;

/// A pure, read-only function of one or more motion values
pub struct DerivedValue<T> {
    inputs: Inputs,
    map: Box<dyn Fn(&[f32]) -> T>,
    cached: RefCell<Option<T>>,
    dirty: Rc<Cell<bool>>,
    _subscriptions: SmallVec<[Subscription; 2]>,
}

impl<T: Clone> DerivedValue<T> {
    /// Create a derived value over `inputs`
    ///
    /// `map` receives the current input values in the order given.
    pub fn new<F>(inputs: &[MotionValue], map: F) -> Self
    where
        F: Fn(&[f32]) -> T + 'static,
    {
        let dirty = Rc::new(Cell::new(true));
        let subscriptions = inputs
            .iter()
            .map(|input| {
                let dirty = dirty.clone();
                input.subscribe(move |_| dirty.set(true))
            })
            .collect();

        Self {
            inputs: inputs.iter().cloned().collect(),
            map: Box::new(map),
            cached: RefCell::new(None),
            dirty,
            _subscriptions: subscriptions,
        }
    }

    /// Combine several sources into a structured value
    pub fn combine<F>(sources: &[MotionValue], combine: F) -> Self
    where
        F: Fn(&[f32]) -> T + 'static,
    {
        Self::new(sources, combine)
    }

    /// Get the current mapped value
    pub fn get(&self) -> T {
        let stale = self.dirty.replace(false) || self.cached.borrow().is_none();
        if stale {
            let next = (self.map)(&self.input_values());
            *self.cached.borrow_mut() = Some(next.clone());
            return next;
        }

        self.cached
            .borrow()
            .clone()
            .unwrap_or_else(|| (self.map)(&self.input_values()))
    }

    /// Whether an input changed since the last read
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// The inputs, in order
    pub fn inputs(&self) -> &[MotionValue] {
        &self.inputs
    }

    fn input_values(&self) -> SmallVec<[f32; 4]> {
        self.inputs.iter().map(MotionValue::get).collect()
    }
}

impl DerivedValue<f32> {
    /// Linear range remap of a single source
    pub fn remap(source: &MotionValue, range: RangeMap) -> Self {
        Self::new(std::slice::from_ref(source), move |values| range.apply(values[0]))
    }
}

impl<T: fmt::Debug> fmt::Debug for DerivedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedValue")
            .field("inputs", &self.inputs.len())
            .field("cached", &self.cached.borrow())
            .field("dirty", &self.dirty.get())
            .finish()
    }
}

// ============================================================================
// Range remap
// ============================================================================

/// Affine map from an input domain `[a, b]` to an output range `[c, d]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeMap {
    pub from: [f32; 2],
    pub to: [f32; 2],
    /// Clamp the output to the output range
    pub clamp: bool,
}

impl RangeMap {
    /// Create an unclamped map. Inputs outside `from` extrapolate linearly.
    pub fn new(from: [f32; 2], to: [f32; 2]) -> Self {
        Self {
            from,
            to,
            clamp: false,
        }
    }

    /// Clamp outputs to the output range
    pub fn clamped(mut self) -> Self {
        self.clamp = true;
        self
    }

    /// Apply the map
    ///
    /// A degenerate domain (`a == b`) maps everything to `c`.
    pub fn apply(&self, x: f32) -> f32 {
        let [a, b] = self.from;
        let [c, d] = self.to;
        let span = b - a;
        if span == 0.0 {
            return c;
        }

        let mapped = c + (x - a) / span * (d - c);
        if self.clamp {
            mapped.clamp(c.min(d), c.max(d))
        } else {
            mapped
        }
    }

    /// The inverse map (`to` back to `from`)
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            clamp: self.clamp,
        }
    }
}

// ============================================================================
// Composite values
// ============================================================================

/// A 2-D value, used for gradient centres and background positions
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Format as a CSS-style percentage pair (`"12.5% 50%"`)
    pub fn to_percent_pair(&self) -> String {
        format_percent_pair(self.x, self.y)
    }
}

/// Format two numbers as a percentage pair (`"{x}% {y}%"`)
pub fn format_percent_pair(x: f32, y: f32) -> String {
    format!("{}% {}%", x, y)
}
