//! Rhai Script Engine Implementation

use super::CompiledExpression;
use crate::error::{EngineError, Result, ResultExt};
use rhai::{Dynamic, Engine, Scope};
use std::collections::HashMap;

/// Maximum number of compiled expressions kept in the cache
const MAX_CACHED_EXPRESSIONS: usize = 64;

/// Script engine for per-element array expressions
pub struct ScriptEngine {
    engine: Engine,
    cache: HashMap<String, CompiledExpression>,
}

impl ScriptEngine {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        Self::configure_engine(&mut engine);
        Self {
            engine,
            cache: HashMap::new(),
        }
    }

    /// Configure the Rhai engine with helper functions and safety limits
    fn configure_engine(engine: &mut Engine) {
        engine.set_max_expr_depths(64, 64);
        engine.set_max_call_levels(32);
        engine.set_max_operations(10_000);
        engine.set_max_string_size(10_000);
        engine.set_max_array_size(1_000);
        engine.set_max_map_size(1_000);

        engine.register_fn("clamp", |x: f64, lo: f64, hi: f64| -> f64 { x.max(lo).min(hi) });
        engine.register_fn("lerp", |a: f64, b: f64, t: f64| -> f64 { a + (b - a) * t });
        engine.register_fn(
            "map_range",
            |x: f64, in_lo: f64, in_hi: f64, out_lo: f64, out_hi: f64| -> f64 {
                if in_hi == in_lo {
                    out_lo
                } else {
                    out_lo + (x - in_lo) * (out_hi - out_lo) / (in_hi - in_lo)
                }
            },
        );
        engine.register_fn("deg2rad", |x: f64| x.to_radians());
        engine.register_fn("rad2deg", |x: f64| x.to_degrees());

        engine.register_fn("abs", |x: f64| x.abs());
        engine.register_fn("sqrt", |x: f64| x.sqrt());
        engine.register_fn("pow", |x: f64, y: f64| x.powf(y));
        engine.register_fn("exp", |x: f64| x.exp());
        engine.register_fn("ln", |x: f64| x.ln());
        engine.register_fn("log10", |x: f64| x.log10());
        engine.register_fn("sin", |x: f64| x.sin());
        engine.register_fn("cos", |x: f64| x.cos());
        engine.register_fn("tan", |x: f64| x.tan());
        engine.register_fn("floor", |x: f64| x.floor());
        engine.register_fn("ceil", |x: f64| x.ceil());
        engine.register_fn("round", |x: f64| x.round());
        engine.register_fn("min", |a: f64, b: f64| a.min(b));
        engine.register_fn("max", |a: f64, b: f64| a.max(b));
    }

    /// Compile `source`, reusing a cached compilation when available
    pub fn compile(&mut self, source: &str) -> Result<CompiledExpression> {
        if let Some(compiled) = self.cache.get(source) {
            return Ok(compiled.clone());
        }
        if source.trim().is_empty() {
            return Err(EngineError::Script("Expression is empty".to_string()));
        }
        let ast = self
            .engine
            .compile(source)
            .map_err(EngineError::from_parse_error)
            .with_context(|| format!("Failed to compile '{}'", source))?;
        let compiled = CompiledExpression {
            ast,
            source: source.to_string(),
        };
        if self.cache.len() >= MAX_CACHED_EXPRESSIONS {
            self.cache.clear();
        }
        self.cache.insert(source.to_string(), compiled.clone());
        Ok(compiled)
    }

    /// Evaluate `expression` for one element
    pub fn evaluate(&self, expression: &CompiledExpression, value: f64, index: usize) -> Result<f64> {
        let mut scope = Scope::new();
        scope.push("value", value);
        scope.push("index", index as i64);
        let result: Dynamic = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, expression.ast())
            .context("Expression evaluation failed")?;
        dynamic_to_f64(&result).ok_or_else(|| {
            EngineError::Script(format!(
                "Expression returned {} instead of a number",
                result.type_name()
            ))
        })
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

fn dynamic_to_f64(value: &Dynamic) -> Option<f64> {
    if let Ok(v) = value.as_float() {
        Some(v)
    } else if let Ok(v) = value.as_int() {
        Some(v as f64)
    } else if let Ok(v) = value.as_bool() {
        Some(if v { 1.0 } else { 0.0 })
    } else {
        None
    }
}

impl Default for ScriptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScriptEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptEngine")
            .field("cached", &self.cache.len())
            .finish()
    }
}
