//! Rhai Scripting Engine for Array Expressions
//!
//! The `ArrayCalculator` filter evaluates a Rhai expression once per array
//! element. Expressions are compiled once and cached by source text.
//!
//! ## Variables
//!
//! - `value` - The current element, as a float
//! - `index` - The element's position in the flat array
//!
//! ## Helper Functions
//!
//! - `clamp(x, lo, hi)` - Limit `x` to `[lo, hi]`
//! - `lerp(a, b, t)` - Linear interpolation between `a` and `b`
//! - `map_range(x, in_lo, in_hi, out_lo, out_hi)` - Rescale `x` between ranges
//! - `deg2rad(x)` / `rad2deg(x)` - Angle conversion
//! - The usual math functions: `abs`, `sqrt`, `pow`, `exp`, `ln`, `log10`,
//!   `sin`, `cos`, `tan`, `floor`, `ceil`, `round`, `min`, `max`
//!
//! ## Example Expressions
//!
//! Rescaling an 8-bit image to `[0, 1]`:
//! ```rhai
//! value / 255.0
//! ```
//!
//! Thresholding:
//! ```rhai
//! if value > 128.0 { 1.0 } else { 0.0 }
//! ```

mod engine;

pub use engine::ScriptEngine;

use rhai::AST;

/// A compiled expression ready for repeated evaluation
#[derive(Clone)]
pub struct CompiledExpression {
    ast: AST,
    source: String,
}

impl CompiledExpression {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn ast(&self) -> &AST {
        &self.ast
    }
}

impl std::fmt::Debug for CompiledExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledExpression")
            .field("source", &self.source)
            .finish()
    }
}
