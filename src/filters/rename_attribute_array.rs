//! Renames an array inside its attribute matrix.
//!
//! The rename is structural, so it happens during the data check: later
//! filters of the same pass already see the new name.

use crate::data::DataArrayPath;
use crate::filter::{codes, FilterContext, FilterParameter, FilterPlugin, ParameterValue};

#[derive(Debug, Clone, Default)]
pub struct RenameAttributeArray {
    selected_array_path: DataArrayPath,
    new_array_name: String,
}

impl RenameAttributeArray {
    pub const NAME: &'static str = "RenameAttributeArray";

    pub fn new(path: DataArrayPath, new_name: impl Into<String>) -> Self {
        Self {
            selected_array_path: path,
            new_array_name: new_name.into(),
        }
    }
}

impl FilterPlugin for RenameAttributeArray {
    fn filter_name(&self) -> &str {
        Self::NAME
    }

    fn human_label(&self) -> &str {
        "Rename Attribute Array"
    }

    fn group_name(&self) -> &str {
        "Core"
    }

    fn sub_group_name(&self) -> &str {
        "Memory/Management"
    }

    fn setup_parameters(&self) -> Vec<FilterParameter> {
        vec![
            FilterParameter::path("SelectedArrayPath", "Array to Rename", DataArrayPath::default()),
            FilterParameter::string("NewArrayName", "New Array Name", ""),
        ]
    }

    fn parameter(&self, name: &str) -> Option<ParameterValue> {
        match name {
            "SelectedArrayPath" => Some(ParameterValue::Path(self.selected_array_path.clone())),
            "NewArrayName" => Some(ParameterValue::String(self.new_array_name.clone())),
            _ => None,
        }
    }

    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> bool {
        match (name, value) {
            ("SelectedArrayPath", ParameterValue::Path(v)) => self.selected_array_path = v,
            ("NewArrayName", ParameterValue::String(v)) => self.new_array_name = v,
            _ => return false,
        }
        true
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        if !ctx.require_name("new array name", &self.new_array_name)
            || ctx.require_array(&self.selected_array_path, None, &[]).is_none()
        {
            return;
        }
        let path = &self.selected_array_path;
        let renamed = ctx
            .data
            .attribute_matrix_mut(path.data_container_name(), path.attribute_matrix_name())
            .map(|matrix| matrix.rename_array(path.data_array_name(), &self.new_array_name));
        match renamed {
            Some(Ok(())) => {}
            Some(Err(e)) => ctx.error(codes::CREATE_CONFLICT, e.to_string()),
            None => ctx.error(
                codes::ATTRIBUTE_MATRIX_NOT_FOUND,
                format!("The attribute matrix of '{}' vanished", path),
            ),
        }
    }

    fn execute(&mut self, _ctx: &mut FilterContext<'_>) {}
}
