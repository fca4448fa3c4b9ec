//! Inert placeholder standing in for a document entry that could not be resolved.

use crate::filter::{codes, FilterContext, FilterParameter, FilterPlugin, ParameterValue};

#[derive(Debug, Clone, Default)]
pub struct EmptyFilter {
    original_filter_name: String,
    human_label: String,
    code: i32,
}

impl EmptyFilter {
    pub const NAME: &'static str = "EmptyFilter";

    /// Placeholder for `name`, which failed to resolve with `code`
    pub fn unknown(name: impl Into<String>, code: i32) -> Self {
        let name = name.into();
        let human_label = if code == codes::MISSING_FILTER_NAME {
            "MISSING FILTER: ".to_string()
        } else {
            format!("UNKNOWN FILTER: {}", name)
        };
        Self {
            original_filter_name: name,
            human_label,
            code,
        }
    }

    /// Name the document asked for
    pub fn original_filter_name(&self) -> &str {
        &self.original_filter_name
    }

    pub fn code(&self) -> i32 {
        self.code
    }
}

impl FilterPlugin for EmptyFilter {
    fn filter_name(&self) -> &str {
        Self::NAME
    }

    fn human_label(&self) -> &str {
        if self.human_label.is_empty() {
            "Empty Filter"
        } else {
            &self.human_label
        }
    }

    fn group_name(&self) -> &str {
        "Core"
    }

    fn setup_parameters(&self) -> Vec<FilterParameter> {
        Vec::new()
    }

    fn parameter(&self, _name: &str) -> Option<ParameterValue> {
        None
    }

    fn set_parameter(&mut self, _name: &str, _value: ParameterValue) -> bool {
        false
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        let code = if self.code < 0 { self.code } else { codes::UNKNOWN_FILTER };
        let text = if self.original_filter_name.is_empty() {
            "This filter is a placeholder and cannot run".to_string()
        } else {
            format!(
                "The filter '{}' could not be located and cannot run",
                self.original_filter_name
            )
        };
        ctx.error(code, text);
    }

    fn execute(&mut self, _ctx: &mut FilterContext<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataContainerArray;
    use crate::filter::Filter;
    use crate::message::ObserverSet;

    #[test]
    fn test_labels() {
        let unknown = EmptyFilter::unknown("FindEllipsoidError", codes::UNKNOWN_FILTER);
        assert_eq!(unknown.human_label(), "UNKNOWN FILTER: FindEllipsoidError");
        assert_eq!(unknown.original_filter_name(), "FindEllipsoidError");

        let missing = EmptyFilter::unknown("", codes::MISSING_FILTER_NAME);
        assert_eq!(missing.human_label(), "MISSING FILTER: ");
        assert_eq!(EmptyFilter::default().human_label(), "Empty Filter");
    }

    #[test]
    fn test_never_passes_preflight() {
        let mut dca = DataContainerArray::new();
        let mut filter = Filter::new(EmptyFilter::unknown("", codes::MISSING_FILTER_NAME));
        filter.execute(&mut dca, &mut ObserverSet::new());
        assert_eq!(filter.error_condition(), codes::MISSING_FILTER_NAME);
        assert!(dca.is_empty());

        let mut filter = Filter::new(EmptyFilter::default());
        filter.preflight(&mut dca, &mut ObserverSet::new());
        assert_eq!(filter.error_condition(), codes::UNKNOWN_FILTER);
    }
}
