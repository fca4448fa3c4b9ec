//! Mock construction helpers

use microflow::filter::{
    AnyFilter, FilterContext, FilterLibrary, FilterManager, FilterParameter, FilterPlugin,
    ParameterValue,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Plugin filter that counts its data checks and executes and fails on demand
#[derive(Debug, Clone, Default)]
pub struct ProbeFilter {
    pub fail_code: i64,
    pub checks: Arc<AtomicUsize>,
    pub executes: Arc<AtomicUsize>,
}

impl ProbeFilter {
    pub const NAME: &'static str = "ProbeFilter";

    pub fn failing(code: i32) -> Self {
        Self {
            fail_code: code as i64,
            ..Self::default()
        }
    }

    pub fn check_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn execute_count(&self) -> usize {
        self.executes.load(Ordering::SeqCst)
    }
}

impl FilterPlugin for ProbeFilter {
    fn filter_name(&self) -> &str {
        Self::NAME
    }

    fn human_label(&self) -> &str {
        "Probe Filter"
    }

    fn group_name(&self) -> &str {
        "Testing"
    }

    fn setup_parameters(&self) -> Vec<FilterParameter> {
        vec![FilterParameter::int("FailCode", "Fail Code", 0, i32::MIN as i64, 0)]
    }

    fn parameter(&self, name: &str) -> Option<ParameterValue> {
        match name {
            "FailCode" => Some(ParameterValue::Int(self.fail_code)),
            _ => None,
        }
    }

    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> bool {
        match (name, value) {
            ("FailCode", ParameterValue::Int(v)) => self.fail_code = v,
            _ => return false,
        }
        true
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if self.fail_code < 0 {
            ctx.error(self.fail_code as i32, "Probe configured to fail");
        }
    }

    fn execute(&mut self, _ctx: &mut FilterContext<'_>) {
        self.executes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Library registering [`ProbeFilter`]
pub struct ProbeLibrary;

impl FilterLibrary for ProbeLibrary {
    fn name(&self) -> &str {
        "Probe"
    }

    fn register_filters(&self, manager: &mut FilterManager) {
        manager.register_factory(ProbeFilter::NAME, || {
            AnyFilter::plugin(ProbeFilter::default())
        });
    }
}

/// Write a `width` x `height` 8-bit grayscale PNG split into a dark left half
/// and a bright right half
pub fn write_gray_png(dir: &Path, width: u32, height: u32) -> PathBuf {
    let path = dir.join("gray.png");
    let img = image::GrayImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            image::Luma([20])
        } else {
            image::Luma([220])
        }
    });
    img.save(&path).unwrap();
    path
}

/// Write a `width` x `height` RGBA PNG
pub fn write_rgba_png(dir: &Path, width: u32, height: u32) -> PathBuf {
    let path = dir.join("rgba.png");
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 100, 50, 255]));
    img.save(&path).unwrap();
    path
}
