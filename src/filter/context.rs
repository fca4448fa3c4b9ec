//! The view a filter gets of the data model while it runs.
//!
//! Data checks use the `require_*` helpers to validate prerequisites and the
//! `create_*` helpers to declare outputs. Every failed check emits an error
//! message and lowers the filter's error condition, then returns so the
//! filter can keep checking and report all problems in one pass.

use super::codes;
use super::FilterStatus;
use crate::data::{
    ArrayShape, AttributeMatrixType, DataArrayPath, DataContainerArray, Geometry, GeometryKind,
    TypedArray,
};
use crate::message::{ObserverSet, PipelineEvent, PipelineMessage};
use crate::types::ElementType;

/// Which pass a filter is running in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Structure only: arrays are allocated zero-filled and never populated
    Preflight,
    Execute,
}

/// Context passed to a filter's data check and execute
pub struct FilterContext<'a> {
    /// The data model shared by all filters of the pass
    pub data: &'a mut DataContainerArray,
    status: &'a mut FilterStatus,
    observers: &'a mut ObserverSet,
    filter_name: &'a str,
    human_label: &'a str,
    pipeline_index: Option<usize>,
    phase: RunPhase,
}

impl<'a> FilterContext<'a> {
    pub fn new(
        data: &'a mut DataContainerArray,
        status: &'a mut FilterStatus,
        observers: &'a mut ObserverSet,
        filter_name: &'a str,
        human_label: &'a str,
        pipeline_index: Option<usize>,
        phase: RunPhase,
    ) -> Self {
        Self {
            data,
            status,
            observers,
            filter_name,
            human_label,
            pipeline_index,
            phase,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_preflight(&self) -> bool {
        self.phase == RunPhase::Preflight
    }

    pub fn error_condition(&self) -> i32 {
        self.status.error_condition()
    }

    pub fn has_errors(&self) -> bool {
        self.status.error_condition() < 0
    }

    /// Lower the error condition to `code` if it is more negative
    pub fn set_error_condition(&mut self, code: i32) {
        self.status.record_error(code);
    }

    // ==================== Messages ====================

    fn message(&self, message: PipelineMessage) -> PipelineMessage {
        match self.pipeline_index {
            Some(index) => message.with_pipeline_index(index),
            None => message,
        }
    }

    fn emit(&mut self, message: PipelineMessage) {
        self.status.push(message.clone());
        self.observers.notify(&PipelineEvent::Message(message));
    }

    pub fn error(&mut self, code: i32, text: impl Into<String>) {
        self.status.record_error(code);
        let message = self.message(PipelineMessage::error(
            self.filter_name,
            self.human_label,
            text,
            code,
        ));
        self.emit(message);
    }

    pub fn warning(&mut self, code: i32, text: impl Into<String>) {
        self.status.record_warning(code);
        let message = self.message(PipelineMessage::warning(
            self.filter_name,
            self.human_label,
            text,
            code,
        ));
        self.emit(message);
    }

    pub fn status(&mut self, text: impl Into<String>) {
        let message = self.message(PipelineMessage::status(
            self.filter_name,
            self.human_label,
            text,
        ));
        self.emit(message);
    }

    pub fn progress(&mut self, percent: u8, text: impl Into<String>) {
        let message = self.message(PipelineMessage::progress(
            self.filter_name,
            self.human_label,
            text,
            percent,
        ));
        self.emit(message);
    }

    // ==================== Prerequisites ====================

    /// Check that a non-empty name was given
    pub fn require_name(&mut self, parameter: &str, value: &str) -> bool {
        if value.is_empty() {
            self.error(codes::EMPTY_NAME, format!("The {} must be set", parameter));
            return false;
        }
        true
    }

    pub fn require_data_container(&mut self, name: &str) -> bool {
        if name.is_empty() {
            self.error(codes::EMPTY_PATH, "The data container name is empty");
            return false;
        }
        if !self.data.contains_data_container(name) {
            self.error(
                codes::DATA_CONTAINER_NOT_FOUND,
                format!("The data container '{}' does not exist", name),
            );
            return false;
        }
        true
    }

    pub fn require_attribute_matrix(&mut self, container: &str, matrix: &str) -> bool {
        if !self.require_data_container(container) {
            return false;
        }
        if matrix.is_empty() {
            self.error(codes::EMPTY_PATH, "The attribute matrix name is empty");
            return false;
        }
        if self.data.attribute_matrix(container, matrix).is_none() {
            self.error(
                codes::ATTRIBUTE_MATRIX_NOT_FOUND,
                format!(
                    "The attribute matrix '{}' does not exist in data container '{}'",
                    matrix, container
                ),
            );
            return false;
        }
        true
    }

    /// Check that `path` names an existing array with the given element type
    /// (when `Some`) and component dimensions (when non-empty).
    pub fn require_array(
        &mut self,
        path: &DataArrayPath,
        element_type: Option<ElementType>,
        component_dims: &[usize],
    ) -> Option<ArrayShape> {
        if !path.is_complete() {
            self.error(
                codes::EMPTY_PATH,
                format!("The data array path '{}' is incomplete", path),
            );
            return None;
        }
        if !self.require_attribute_matrix(path.data_container_name(), path.attribute_matrix_name())
        {
            return None;
        }
        let Some(shape) = self.data.array(path).map(TypedArray::shape) else {
            self.error(
                codes::ARRAY_NOT_FOUND,
                format!("The array '{}' does not exist", path),
            );
            return None;
        };
        if let Some(expected) = element_type {
            if shape.element_type != expected {
                self.error(
                    codes::TYPE_MISMATCH,
                    format!(
                        "The array '{}' holds {} values but {} values are required",
                        path, shape.element_type, expected
                    ),
                );
                return None;
            }
        }
        if !component_dims.is_empty() && shape.component_dims != component_dims {
            self.error(
                codes::COMPONENTS_DONT_MATCH,
                format!(
                    "The number of components of the array '{}' is {:?} but {:?} is required",
                    path, shape.component_dims, component_dims
                ),
            );
            return None;
        }
        Some(shape)
    }

    /// Check that `container` has a geometry of `kind` whose element counts
    /// agree with the container's attribute matrices.
    pub fn require_geometry(&mut self, container: &str, kind: GeometryKind) -> bool {
        if !self.require_data_container(container) {
            return false;
        }
        let Some(dc) = self.data.data_container(container) else {
            return false;
        };
        let actual = dc.geometry().map(Geometry::kind);
        match actual {
            None => {
                self.error(
                    codes::GEOMETRY_MISSING,
                    format!("The data container '{}' has no geometry", container),
                );
                false
            }
            Some(actual) if actual != kind => {
                self.error(
                    codes::GEOMETRY_WRONG_KIND,
                    format!(
                        "The data container '{}' has a {} but a {} is required",
                        container, actual, kind
                    ),
                );
                false
            }
            Some(_) => self.require_geometry_consistency(container),
        }
    }

    /// Check that every default attribute matrix of `container` agrees with
    /// its geometry's element count. Containers without geometry pass.
    pub fn require_geometry_consistency(&mut self, container: &str) -> bool {
        let Some(mismatches) = self
            .data
            .data_container(container)
            .map(|dc| dc.geometry_mismatches())
        else {
            return self.require_data_container(container);
        };
        for mismatch in &mismatches {
            self.error(
                codes::GEOMETRY_TUPLE_MISMATCH,
                format!(
                    "The attribute matrix '{}' has {} tuples but the geometry of '{}' defines {}",
                    mismatch.matrix, mismatch.actual, container, mismatch.expected
                ),
            );
        }
        mismatches.is_empty()
    }

    // ==================== Creation ====================

    /// Ensure a data container named `name` exists
    pub fn create_data_container(&mut self, name: &str) -> bool {
        if !self.require_name("data container name", name) {
            return false;
        }
        if !self.data.contains_data_container(name) {
            if let Err(e) = self.data.create_data_container(name) {
                self.error(codes::CREATE_FAILED, e.to_string());
                return false;
            }
        }
        true
    }

    /// Ensure an attribute matrix exists with the given tuple dimensions.
    ///
    /// An existing matrix of the same type is resized to `tuple_dims`.
    pub fn create_attribute_matrix(
        &mut self,
        container: &str,
        matrix: &str,
        tuple_dims: &[usize],
        matrix_type: AttributeMatrixType,
    ) -> bool {
        if !self.require_data_container(container)
            || !self.require_name("attribute matrix name", matrix)
        {
            return false;
        }
        let Some(dc) = self.data.data_container_mut(container) else {
            return false;
        };
        let result = match dc.attribute_matrix_mut(matrix) {
            Some(existing) if existing.matrix_type() != matrix_type => Err((
                codes::CREATE_CONFLICT,
                format!(
                    "The attribute matrix '{}' already exists as a {} matrix",
                    matrix,
                    existing.matrix_type()
                ),
            )),
            Some(existing) if existing.tuple_dims() != tuple_dims => existing
                .resize_tuples(tuple_dims)
                .map_err(|e| (codes::CREATE_FAILED, e.to_string())),
            Some(_) => Ok(()),
            None => dc
                .create_attribute_matrix(matrix, tuple_dims, matrix_type)
                .map(|_| ())
                .map_err(|e| (codes::CREATE_CONFLICT, e.to_string())),
        };
        match result {
            Ok(()) => true,
            Err((code, text)) => {
                self.error(code, text);
                false
            }
        }
    }

    /// Ensure a zero-filled array exists at `path`.
    ///
    /// Calling this again with the same type and component dimensions reuses
    /// the existing array; any other existing array at `path` is a conflict.
    pub fn create_array(
        &mut self,
        path: &DataArrayPath,
        element_type: ElementType,
        component_dims: &[usize],
    ) -> Option<ArrayShape> {
        if !path.is_complete() {
            self.error(
                codes::EMPTY_PATH,
                format!("The output array path '{}' is incomplete", path),
            );
            return None;
        }
        if !self.require_attribute_matrix(path.data_container_name(), path.attribute_matrix_name())
        {
            return None;
        }
        if let Some(existing) = self.data.array(path).map(TypedArray::shape) {
            if existing.element_type == element_type && existing.component_dims == component_dims {
                return Some(existing);
            }
            self.error(
                codes::CREATE_CONFLICT,
                format!(
                    "The array '{}' already exists as {} {:?} and cannot be recreated as {} {:?}",
                    path, existing.element_type, existing.component_dims, element_type, component_dims
                ),
            );
            return None;
        }
        let tuple_count = self
            .data
            .attribute_matrix_for(path)
            .map(|m| m.tuple_count())
            .unwrap_or(0);
        let created = TypedArray::new(
            path.data_array_name(),
            element_type,
            tuple_count,
            component_dims,
        )
        .and_then(|array| {
            let shape = array.shape();
            self.data.add_array(path, array).map(|_| shape)
        });
        match created {
            Ok(shape) => Some(shape),
            Err(e) => {
                self.error(codes::CREATE_FAILED, e.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataContainer, ImageGeometry};
    use crate::message::MessageKind;

    fn image_data() -> DataContainerArray {
        let mut dca = DataContainerArray::new();
        let dc = dca.create_data_container("DataContainer").unwrap();
        dc.set_geometry(Geometry::Image(ImageGeometry::with_dimensions([2, 2, 1])));
        let am = dc
            .create_attribute_matrix("CellData", &[2, 2, 1], AttributeMatrixType::Cell)
            .unwrap();
        am.add_array(TypedArray::new("Gray", ElementType::UInt8, 4, &[1]).unwrap())
            .unwrap();
        am.add_array(TypedArray::new("Rgba", ElementType::UInt8, 4, &[4]).unwrap())
            .unwrap();
        dca
    }

    fn with_context<R>(
        dca: &mut DataContainerArray,
        f: impl FnOnce(&mut FilterContext<'_>) -> R,
    ) -> (R, FilterStatus) {
        let mut status = FilterStatus::default();
        let mut observers = ObserverSet::new();
        let result = {
            let mut ctx = FilterContext::new(
                dca,
                &mut status,
                &mut observers,
                "TestFilter",
                "Test Filter",
                Some(0),
                RunPhase::Preflight,
            );
            f(&mut ctx)
        };
        (result, status)
    }

    #[test]
    fn test_require_array_success() {
        let mut dca = image_data();
        let path = DataArrayPath::new("DataContainer", "CellData", "Gray");
        let (shape, status) =
            with_context(&mut dca, |ctx| ctx.require_array(&path, Some(ElementType::UInt8), &[1]));
        assert_eq!(shape.unwrap().tuple_count, 4);
        assert_eq!(status.error_condition(), 0);
        assert!(status.messages().is_empty());
    }

    #[test]
    fn test_require_array_component_mismatch() {
        let mut dca = image_data();
        let path = DataArrayPath::new("DataContainer", "CellData", "Rgba");
        let (shape, status) =
            with_context(&mut dca, |ctx| ctx.require_array(&path, Some(ElementType::UInt8), &[1]));
        assert!(shape.is_none());
        assert_eq!(status.error_condition(), codes::COMPONENTS_DONT_MATCH);
    }

    #[test]
    fn test_require_array_type_mismatch() {
        let mut dca = image_data();
        let path = DataArrayPath::new("DataContainer", "CellData", "Gray");
        let (_, status) =
            with_context(&mut dca, |ctx| ctx.require_array(&path, Some(ElementType::Float32), &[]));
        assert_eq!(status.error_condition(), codes::TYPE_MISMATCH);
    }

    #[test]
    fn test_errors_accumulate_most_negative() {
        let mut dca = image_data();
        let (_, status) = with_context(&mut dca, |ctx| {
            ctx.require_array(&DataArrayPath::default(), None, &[]);
            ctx.require_array(&DataArrayPath::new("DataContainer", "CellData", "Rgba"), None, &[1]);
            ctx.warning(-1, "just a warning");
        });
        assert_eq!(status.error_condition(), codes::EMPTY_PATH);
        assert_eq!(status.warning_condition(), -1);
        assert_eq!(status.messages().len(), 3);
        assert_eq!(status.messages()[0].kind, MessageKind::Error);
        assert_eq!(status.messages()[0].pipeline_index, Some(0));
    }

    #[test]
    fn test_require_geometry() {
        let mut dca = image_data();
        dca.add_data_container(DataContainer::new("Bare")).unwrap();
        let (ok, status) = with_context(&mut dca, |ctx| {
            ctx.require_geometry("DataContainer", GeometryKind::Image)
        });
        assert!(ok);
        assert_eq!(status.error_condition(), 0);

        let (ok, status) = with_context(&mut dca, |ctx| ctx.require_geometry("Bare", GeometryKind::Image));
        assert!(!ok);
        assert_eq!(status.error_condition(), codes::GEOMETRY_MISSING);

        let (ok, status) = with_context(&mut dca, |ctx| {
            ctx.require_geometry("DataContainer", GeometryKind::Edge)
        });
        assert!(!ok);
        assert_eq!(status.error_condition(), codes::GEOMETRY_WRONG_KIND);
    }

    #[test]
    fn test_geometry_consistency() {
        let mut dca = image_data();
        dca.attribute_matrix_mut("DataContainer", "CellData")
            .unwrap()
            .resize_tuples(&[3, 1, 1])
            .unwrap();
        let (ok, status) = with_context(&mut dca, |ctx| {
            ctx.require_geometry("DataContainer", GeometryKind::Image)
        });
        assert!(!ok);
        assert_eq!(status.error_condition(), codes::GEOMETRY_TUPLE_MISMATCH);
        assert!(status.messages()[0].text.contains("CellData"));
    }

    #[test]
    fn test_create_array_is_idempotent() {
        let mut dca = image_data();
        let path = DataArrayPath::new("DataContainer", "CellData", "Out");
        let (first, _) = with_context(&mut dca, |ctx| ctx.create_array(&path, ElementType::Float32, &[3]));
        let before = dca.array_shapes();
        let (second, status) =
            with_context(&mut dca, |ctx| ctx.create_array(&path, ElementType::Float32, &[3]));
        assert_eq!(first, second);
        assert_eq!(before, dca.array_shapes());
        assert_eq!(status.error_condition(), 0);
        assert_eq!(dca.array(&path).unwrap().len(), 12);

        let (conflict, status) =
            with_context(&mut dca, |ctx| ctx.create_array(&path, ElementType::Int32, &[3]));
        assert!(conflict.is_none());
        assert_eq!(status.error_condition(), codes::CREATE_CONFLICT);
    }

    #[test]
    fn test_create_attribute_matrix_resizes_existing() {
        let mut dca = image_data();
        let (ok, _) = with_context(&mut dca, |ctx| {
            ctx.create_data_container("DataContainer")
                && ctx.create_attribute_matrix(
                    "DataContainer",
                    "CellData",
                    &[3, 3, 1],
                    AttributeMatrixType::Cell,
                )
        });
        assert!(ok);
        let gray = dca
            .array(&DataArrayPath::new("DataContainer", "CellData", "Gray"))
            .unwrap();
        assert_eq!(gray.tuple_count(), 9);
    }

    #[test]
    fn test_create_array_too_large_is_an_error() {
        let mut dca = image_data();
        let path = DataArrayPath::new("DataContainer", "CellData", "Huge");
        let (created, status) = with_context(&mut dca, |ctx| {
            ctx.create_array(&path, ElementType::Float64, &[1usize << 62])
        });
        assert!(created.is_none());
        assert_eq!(status.error_condition(), codes::CREATE_FAILED);
        assert!(!dca.contains_array(&path));
    }
}
