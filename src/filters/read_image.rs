//! Reads a 2D image file into a new data container with an image geometry.

use crate::data::{AttributeMatrixType, DataArrayPath, Geometry, ImageGeometry};
use crate::error::{Result, ResultExt};
use crate::filter::{codes, FilterContext, FilterParameter, FilterPlugin, ParameterValue};
use crate::types::ElementType;
use image::{ImageDecoder, ImageReader};
use std::path::{Path, PathBuf};

/// Width, height and channel count of an image file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

/// Read only the header of `path`
pub fn probe_image(path: &Path) -> Result<ImageHeader> {
    let reader = ImageReader::open(path)
        .with_context(|| format!("Opening {}", path.display()))?
        .with_guessed_format()
        .context("Guessing image format")?;
    let decoder = reader.into_decoder()?;
    let (width, height) = decoder.dimensions();
    Ok(ImageHeader {
        width,
        height,
        channels: decoder.color_type().channel_count(),
    })
}

/// Decode `path` into interleaved 8-bit samples with `channels` per pixel
fn decode_image(path: &Path, channels: u8) -> Result<Vec<u8>> {
    let image = image::open(path)?;
    let bytes = match channels {
        1 => image.into_luma8().into_raw(),
        2 => image.into_luma_alpha8().into_raw(),
        3 => image.into_rgb8().into_raw(),
        _ => image.into_rgba8().into_raw(),
    };
    Ok(bytes)
}

#[derive(Debug, Clone)]
pub struct ReadImage {
    input_file: PathBuf,
    data_container_name: String,
    cell_attribute_matrix_name: String,
    image_data_array_name: String,
    origin: [f32; 3],
    resolution: [f32; 3],
    header: Option<ImageHeader>,
}

impl ReadImage {
    pub const NAME: &'static str = "ReadImage";

    pub fn new() -> Self {
        Self {
            input_file: PathBuf::new(),
            data_container_name: "ImageDataContainer".to_string(),
            cell_attribute_matrix_name: "CellData".to_string(),
            image_data_array_name: "ImageData".to_string(),
            origin: [0.0; 3],
            resolution: [1.0; 3],
            header: None,
        }
    }

    pub fn with_input_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_file = path.into();
        self
    }

    pub fn with_data_container_name(mut self, name: impl Into<String>) -> Self {
        self.data_container_name = name.into();
        self
    }

    /// Path of the array this filter creates
    pub fn image_data_path(&self) -> DataArrayPath {
        DataArrayPath::new(
            &self.data_container_name,
            &self.cell_attribute_matrix_name,
            &self.image_data_array_name,
        )
    }
}

impl Default for ReadImage {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterPlugin for ReadImage {
    fn filter_name(&self) -> &str {
        Self::NAME
    }

    fn human_label(&self) -> &str {
        "Read Image"
    }

    fn group_name(&self) -> &str {
        "IO"
    }

    fn sub_group_name(&self) -> &str {
        "Input"
    }

    fn setup_parameters(&self) -> Vec<FilterParameter> {
        vec![
            FilterParameter::input_file("InputFileName", "Input File"),
            FilterParameter::string("DataContainerName", "Data Container", "ImageDataContainer"),
            FilterParameter::string("CellAttributeMatrixName", "Cell Attribute Matrix", "CellData"),
            FilterParameter::string("ImageDataArrayName", "Image Data", "ImageData"),
            FilterParameter::float_vec3("Origin", "Origin", [0.0; 3]),
            FilterParameter::float_vec3("Resolution", "Resolution", [1.0; 3]),
        ]
    }

    fn parameter(&self, name: &str) -> Option<ParameterValue> {
        let value = match name {
            "InputFileName" => {
                ParameterValue::String(self.input_file.to_string_lossy().into_owned())
            }
            "DataContainerName" => ParameterValue::String(self.data_container_name.clone()),
            "CellAttributeMatrixName" => {
                ParameterValue::String(self.cell_attribute_matrix_name.clone())
            }
            "ImageDataArrayName" => ParameterValue::String(self.image_data_array_name.clone()),
            "Origin" => ParameterValue::FloatVec3(self.origin),
            "Resolution" => ParameterValue::FloatVec3(self.resolution),
            _ => return None,
        };
        Some(value)
    }

    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> bool {
        match (name, value) {
            ("InputFileName", ParameterValue::String(v)) => self.input_file = PathBuf::from(v),
            ("DataContainerName", ParameterValue::String(v)) => self.data_container_name = v,
            ("CellAttributeMatrixName", ParameterValue::String(v)) => {
                self.cell_attribute_matrix_name = v
            }
            ("ImageDataArrayName", ParameterValue::String(v)) => self.image_data_array_name = v,
            ("Origin", ParameterValue::FloatVec3(v)) => self.origin = v,
            ("Resolution", ParameterValue::FloatVec3(v)) => self.resolution = v,
            _ => return false,
        }
        true
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) {
        self.header = None;
        if self.input_file.as_os_str().is_empty() {
            ctx.error(codes::INPUT_FILE_NOT_SET, "The input file must be set");
            return;
        }
        if !self.input_file.exists() {
            ctx.error(
                codes::INPUT_FILE_MISSING,
                format!("The input file '{}' does not exist", self.input_file.display()),
            );
            return;
        }
        let header = match probe_image(&self.input_file) {
            Ok(header) => header,
            Err(e) => {
                ctx.error(codes::INPUT_FILE_UNREADABLE, e.to_string());
                return;
            }
        };

        let dims = [header.width as usize, header.height as usize, 1];
        if !ctx.create_data_container(&self.data_container_name) {
            return;
        }
        if let Some(dc) = ctx.data.data_container_mut(&self.data_container_name) {
            dc.set_geometry(Geometry::Image(ImageGeometry::new(
                dims,
                self.resolution,
                self.origin,
            )));
        }
        if !ctx.create_attribute_matrix(
            &self.data_container_name,
            &self.cell_attribute_matrix_name,
            &dims,
            AttributeMatrixType::Cell,
        ) {
            return;
        }
        if ctx
            .create_array(
                &self.image_data_path(),
                ElementType::UInt8,
                &[header.channels as usize],
            )
            .is_some()
        {
            self.header = Some(header);
        }
    }

    fn execute(&mut self, ctx: &mut FilterContext<'_>) {
        let Some(header) = self.header else {
            return;
        };
        ctx.status(format!("Reading {}", self.input_file.display()));
        let bytes = match decode_image(&self.input_file, header.channels) {
            Ok(bytes) => bytes,
            Err(e) => {
                ctx.error(codes::INPUT_FILE_DECODE_FAILED, e.to_string());
                return;
            }
        };
        let path = self.image_data_path();
        let Some(target) = ctx
            .data
            .array_mut(&path)
            .and_then(|a| a.as_mut_slice::<u8>())
        else {
            ctx.error(codes::ARRAY_NOT_FOUND, format!("The array '{}' vanished", path));
            return;
        };
        if target.len() != bytes.len() {
            let expected = target.len();
            ctx.error(
                codes::INPUT_FILE_DECODE_FAILED,
                format!(
                    "Decoded {} samples but the array holds {}",
                    bytes.len(),
                    expected
                ),
            );
            return;
        }
        target.copy_from_slice(&bytes);
        tracing::debug!(
            "Read {}x{} image with {} channels into {}",
            header.width,
            header.height,
            header.channels,
            path
        );
    }
}
