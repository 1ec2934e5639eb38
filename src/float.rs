use ndarray::ScalarOperand;
use num_traits::{FromPrimitive, NumAssignOps, NumCast};

use std::fmt;
use std::iter::Sum;

/// Floating point numbers
///
/// This trait bound multiplexes to the most common assumption of floating point number and
/// implement them for 32bit and 64bit floating points. Channels of an exemplar store hold
/// elements of this type.
pub trait Float:
    FromPrimitive
    + num_traits::Float
    + PartialOrd
    + Sync
    + Send
    + Default
    + fmt::Display
    + fmt::Debug
    + Sum
    + NumAssignOps
    + ScalarOperand
    + approx::AbsDiffEq
{
    /// Converts from any primitive number, falling back to NaN when the value is not
    /// representable
    fn cast<T: NumCast>(x: T) -> Self {
        NumCast::from(x).unwrap_or_else(Self::nan)
    }
}

impl Float for f32 {}

impl Float for f64 {}
