//! ONNX runtime backend for the pest vision model (tract).

use std::path::Path;

use cropwise_core::defaults::IMAGE_SIZE;
use cropwise_core::{Error, Result};
use tracing::info;
use tract_onnx::prelude::*;

use crate::vision::{ImageTensor, PestModel};

type Plan = TypedRunnableModel<TypedModel>;

/// A CNN exported to ONNX with input `[1, 224, 224, 3]` and output `[1, N]`.
pub struct OnnxPestModel {
    plan: Plan,
    input_size: u32,
    output_width: usize,
}

impl OnnxPestModel {
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_size(path, IMAGE_SIZE)
    }

    pub fn load_with_size(path: &Path, input_size: u32) -> Result<Self> {
        let s = input_size as usize;
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| m.with_input_fact(0, f32::fact([1, s, s, 3]).into()))
            .and_then(|m| m.into_optimized())
            .map_err(|e| {
                Error::ModelLoad(format!("Failed to load {}: {:#}", path.display(), e))
            })?;

        let output_width = model
            .output_fact(0)
            .ok()
            .and_then(|f| f.shape.as_concrete().map(|dims| dims.to_vec()))
            .and_then(|dims| match dims.as_slice() {
                [1, n] => Some(*n),
                _ => None,
            })
            .ok_or_else(|| {
                Error::ModelLoad(format!(
                    "Vision model {} must produce a [1, N] output",
                    path.display()
                ))
            })?;

        let plan = model
            .into_runnable()
            .map_err(|e| Error::ModelLoad(format!("Failed to plan vision model: {:#}", e)))?;

        info!(
            subsystem = "predict",
            component = "vision",
            path = %path.display(),
            output_width,
            "Loaded pest vision model"
        );

        Ok(Self {
            plan,
            input_size,
            output_width,
        })
    }
}

impl PestModel for OnnxPestModel {
    fn output_width(&self) -> usize {
        self.output_width
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn infer(&self, input: &ImageTensor) -> Result<Vec<f32>> {
        let shape = input.shape();
        let array = tract_ndarray::Array4::from_shape_vec(
            (shape[0], shape[1], shape[2], shape[3]),
            input.data.clone(),
        )
        .map_err(|e| Error::Inference(format!("Bad input tensor: {}", e)))?;
        let tensor: Tensor = array.into();

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| Error::Inference(format!("Vision model failed: {:#}", e)))?;
        let view = outputs[0]
            .to_array_view::<f32>()
            .map_err(|e| Error::Inference(format!("Unexpected vision output: {:#}", e)))?;

        Ok(view.iter().copied().collect())
    }
}
