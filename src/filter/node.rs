//! Filter abstraction.
//!
//! Two-layer design:
//! - **`FilterPlugin` trait** for filters supplied from outside the crate.
//! - **`BuiltinFilter` enum** for the filters shipped with microflow, so the
//!   common case dispatches through a `match`.
//!
//! `AnyFilter` wraps either variant so pipelines handle both uniformly.

use super::context::FilterContext;
use super::Filter;
use super::parameter::{FilterParameter, ParameterValue};
use crate::filters::{
    ArrayCalculator, CreateDataArray, EmmpmFilter, EmptyFilter, MultiEmmpmFilter, ReadImage,
    RenameAttributeArray, RgbToGray,
};

/// Contract every filter implements.
///
/// `data_check` validates prerequisites and declares outputs without
/// computing values; `execute` performs the work. The wrapping
/// [`Filter`](super::Filter) always runs `data_check` before `execute` and
/// skips `execute` when the check reports an error.
pub trait FilterPlugin: Send {
    /// Class name used in pipeline documents and the registry
    fn filter_name(&self) -> &str;

    fn human_label(&self) -> &str;

    fn group_name(&self) -> &str {
        "Unsupported"
    }

    fn sub_group_name(&self) -> &str {
        "Misc"
    }

    /// Parameter descriptors with their defaults
    fn setup_parameters(&self) -> Vec<FilterParameter>;

    /// Current value of parameter `name`
    fn parameter(&self, name: &str) -> Option<ParameterValue>;

    /// Update parameter `name`; returns `false` for unknown names or
    /// mismatched value types
    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> bool;

    fn data_check(&mut self, ctx: &mut FilterContext<'_>);

    fn execute(&mut self, ctx: &mut FilterContext<'_>);
}

/// Enum dispatch for built-in filters
#[derive(Debug)]
pub enum BuiltinFilter {
    ReadImage(ReadImage),
    RgbToGray(RgbToGray),
    Emmpm(EmmpmFilter),
    MultiEmmpm(MultiEmmpmFilter),
    CreateDataArray(CreateDataArray),
    RenameAttributeArray(RenameAttributeArray),
    ArrayCalculator(ArrayCalculator),
    Empty(EmptyFilter),
}

macro_rules! dispatch {
    ($self:expr, $f:ident => $body:expr) => {
        match $self {
            BuiltinFilter::ReadImage($f) => $body,
            BuiltinFilter::RgbToGray($f) => $body,
            BuiltinFilter::Emmpm($f) => $body,
            BuiltinFilter::MultiEmmpm($f) => $body,
            BuiltinFilter::CreateDataArray($f) => $body,
            BuiltinFilter::RenameAttributeArray($f) => $body,
            BuiltinFilter::ArrayCalculator($f) => $body,
            BuiltinFilter::Empty($f) => $body,
        }
    };
}

impl BuiltinFilter {
    pub fn filter_name(&self) -> &str {
        dispatch!(self, f => f.filter_name())
    }

    pub fn human_label(&self) -> &str {
        dispatch!(self, f => f.human_label())
    }

    pub fn group_name(&self) -> &str {
        dispatch!(self, f => f.group_name())
    }

    pub fn sub_group_name(&self) -> &str {
        dispatch!(self, f => f.sub_group_name())
    }

    pub fn setup_parameters(&self) -> Vec<FilterParameter> {
        dispatch!(self, f => f.setup_parameters())
    }

    pub fn parameter(&self, name: &str) -> Option<ParameterValue> {
        dispatch!(self, f => f.parameter(name))
    }

    pub fn set_parameter(&mut self, name: &str, value: ParameterValue) -> bool {
        dispatch!(self, f => f.set_parameter(name, value))
    }

    pub fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        dispatch!(self, f => f.data_check(ctx))
    }

    pub fn execute(&mut self, ctx: &mut FilterContext<'_>) {
        dispatch!(self, f => f.execute(ctx))
    }
}

macro_rules! impl_from_builtin {
    ($($t:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for BuiltinFilter {
                fn from(filter: $t) -> Self {
                    BuiltinFilter::$variant(filter)
                }
            }

            impl From<$t> for AnyFilter {
                fn from(filter: $t) -> Self {
                    AnyFilter::Builtin(BuiltinFilter::$variant(filter))
                }
            }

            impl From<$t> for Filter {
                fn from(filter: $t) -> Self {
                    Filter::new(filter)
                }
            }
        )*
    };
}

impl_from_builtin! {
    ReadImage => ReadImage,
    RgbToGray => RgbToGray,
    EmmpmFilter => Emmpm,
    MultiEmmpmFilter => MultiEmmpm,
    CreateDataArray => CreateDataArray,
    RenameAttributeArray => RenameAttributeArray,
    ArrayCalculator => ArrayCalculator,
    EmptyFilter => Empty,
}

/// Wrapper that holds either a built-in filter (enum dispatch) or a plugin (trait object)
pub enum AnyFilter {
    Builtin(BuiltinFilter),
    Plugin(Box<dyn FilterPlugin>),
}

impl AnyFilter {
    pub fn plugin(filter: impl FilterPlugin + 'static) -> Self {
        AnyFilter::Plugin(Box::new(filter))
    }

    pub fn filter_name(&self) -> &str {
        match self {
            AnyFilter::Builtin(f) => f.filter_name(),
            AnyFilter::Plugin(f) => f.filter_name(),
        }
    }

    pub fn human_label(&self) -> &str {
        match self {
            AnyFilter::Builtin(f) => f.human_label(),
            AnyFilter::Plugin(f) => f.human_label(),
        }
    }

    pub fn group_name(&self) -> &str {
        match self {
            AnyFilter::Builtin(f) => f.group_name(),
            AnyFilter::Plugin(f) => f.group_name(),
        }
    }

    pub fn sub_group_name(&self) -> &str {
        match self {
            AnyFilter::Builtin(f) => f.sub_group_name(),
            AnyFilter::Plugin(f) => f.sub_group_name(),
        }
    }

    pub fn setup_parameters(&self) -> Vec<FilterParameter> {
        match self {
            AnyFilter::Builtin(f) => f.setup_parameters(),
            AnyFilter::Plugin(f) => f.setup_parameters(),
        }
    }

    pub fn parameter(&self, name: &str) -> Option<ParameterValue> {
        match self {
            AnyFilter::Builtin(f) => f.parameter(name),
            AnyFilter::Plugin(f) => f.parameter(name),
        }
    }

    pub fn set_parameter(&mut self, name: &str, value: ParameterValue) -> bool {
        match self {
            AnyFilter::Builtin(f) => f.set_parameter(name, value),
            AnyFilter::Plugin(f) => f.set_parameter(name, value),
        }
    }

    pub fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        match self {
            AnyFilter::Builtin(f) => f.data_check(ctx),
            AnyFilter::Plugin(f) => f.data_check(ctx),
        }
    }

    pub fn execute(&mut self, ctx: &mut FilterContext<'_>) {
        match self {
            AnyFilter::Builtin(f) => f.execute(ctx),
            AnyFilter::Plugin(f) => f.execute(ctx),
        }
    }

    /// The placeholder standing in for an unresolved document entry, if any
    pub fn as_placeholder(&self) -> Option<&EmptyFilter> {
        match self {
            AnyFilter::Builtin(BuiltinFilter::Empty(f)) => Some(f),
            _ => None,
        }
    }
}

impl From<BuiltinFilter> for AnyFilter {
    fn from(filter: BuiltinFilter) -> Self {
        AnyFilter::Builtin(filter)
    }
}

impl std::fmt::Debug for AnyFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnyFilter::Builtin(b) => f.debug_tuple("Builtin").field(b).finish(),
            AnyFilter::Plugin(p) => f.debug_tuple("Plugin").field(&p.filter_name()).finish(),
        }
    }
}
