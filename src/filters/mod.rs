//! Built-in filter library.

pub mod array_calculator;
pub mod create_data_array;
pub mod emmpm;
pub mod empty_filter;
pub mod multi_emmpm;
pub mod read_image;
pub mod rename_attribute_array;
pub mod rgb_to_gray;
pub mod segmentation;

pub use array_calculator::ArrayCalculator;
pub use create_data_array::CreateDataArray;
pub use emmpm::EmmpmFilter;
pub use empty_filter::EmptyFilter;
pub use multi_emmpm::MultiEmmpmFilter;
pub use read_image::ReadImage;
pub use rename_attribute_array::RenameAttributeArray;
pub use rgb_to_gray::RgbToGray;
pub use segmentation::SegmentationParams;

use crate::filter::{AnyFilter, FilterLibrary, FilterManager};

/// The filters shipped with microflow
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreFilters;

impl FilterLibrary for CoreFilters {
    fn name(&self) -> &str {
        "Core"
    }

    fn register_filters(&self, manager: &mut FilterManager) {
        manager.register_factory(ReadImage::NAME, || AnyFilter::from(ReadImage::new()));
        manager.register_factory(RgbToGray::NAME, || AnyFilter::from(RgbToGray::new()));
        manager.register_factory(EmmpmFilter::NAME, || AnyFilter::from(EmmpmFilter::new()));
        manager.register_factory(MultiEmmpmFilter::NAME, || {
            AnyFilter::from(MultiEmmpmFilter::new())
        });
        manager.register_factory(CreateDataArray::NAME, || {
            AnyFilter::from(CreateDataArray::new())
        });
        manager.register_factory(RenameAttributeArray::NAME, || {
            AnyFilter::from(RenameAttributeArray::default())
        });
        manager.register_factory(ArrayCalculator::NAME, || {
            AnyFilter::from(ArrayCalculator::new())
        });
        manager.register_factory(EmptyFilter::NAME, || AnyFilter::from(EmptyFilter::default()));
    }
}
