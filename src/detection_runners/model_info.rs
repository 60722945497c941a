use std::collections::HashSet;
use std::path::Path;
use anyhow::Result;
use prost::Message;
use regex::Regex;
use crate::common::TensorLayout;
use crate::detection_runners::onnx;

/// Declared I/O of an ONNX model, read without loading it into a runtime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnnxModelInfo {
    pub input_names: Vec<String>,
    /// Symbolic (dynamic) or unset dimensions are recorded as 0.
    pub input_dimss: Vec<Vec<usize>>,
    pub output_names: Vec<String>,
    pub output_dimss: Vec<Vec<usize>>,
    /// Class names from the `names` metadata entry, if the exporter wrote one.
    pub names: Option<Vec<String>>,
}

impl OnnxModelInfo {
    pub fn load<P: AsRef<Path>>(p: P) -> Result<Self> {
        let p = p.as_ref();
        let f = std::fs::read(p)
            .map_err(|e| anyhow::anyhow!("Failed to read ONNX model {}: {}", p.display(), e))?;
        Self::from_bytes(&f)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let model_proto = onnx::ModelProto::decode(bytes)
            .map_err(|e| anyhow::anyhow!("Failed to decode ONNX model: {}", e))?;
        let graph = match &model_proto.graph {
            Some(graph) => graph,
            None => anyhow::bail!("No graph found in this proto. Failed to parse ONNX model."),
        };

        let initializer_names: HashSet<&str> = graph.initializer.iter().map(|t| t.name.as_str()).collect();
        let (input_names, input_dimss) = Self::io_from_onnx_value_info(&initializer_names, &graph.input);
        let (output_names, output_dimss) = Self::io_from_onnx_value_info(&initializer_names, &graph.output);

        let names = model_proto
            .metadata_props
            .iter()
            .find(|p| p.key == "names")
            .map(|p| Self::parse_names(&p.value))
            .transpose()?;

        log::info!(
            "ONNX model | IR: {} | Producer: {} | Inputs: {:?} | Outputs: {:?}",
            model_proto.ir_version,
            model_proto.producer_name,
            input_dimss,
            output_dimss
        );

        Ok(Self {
            input_names,
            input_dimss,
            output_names,
            output_dimss,
            names,
        })
    }

    /// Layout of the first output.
    pub fn output_layout(&self) -> Result<TensorLayout> {
        match self.output_dimss.first() {
            Some(dims) => TensorLayout::from_shape(dims),
            None => anyhow::bail!("ONNX model declares no outputs"),
        }
    }

    fn io_from_onnx_value_info(
        initializer_names: &HashSet<&str>,
        value_info: &[onnx::ValueInfoProto],
    ) -> (Vec<String>, Vec<Vec<usize>>) {
        let mut names: Vec<String> = Vec::new();
        let mut dimss: Vec<Vec<usize>> = Vec::new();
        for v in value_info.iter() {
            if initializer_names.contains(v.name.as_str()) {
                continue;
            }
            let tensor = match v.r#type.as_ref().and_then(|t| t.value.as_ref()) {
                Some(onnx::type_proto::Value::TensorType(tensor)) => tensor,
                None => continue,
            };
            let dims = match &tensor.shape {
                Some(shape) => shape
                    .dim
                    .iter()
                    .map(|d| match d.value.as_ref() {
                        Some(onnx::tensor_shape_proto::dimension::Value::DimValue(x)) => (*x).max(0) as usize,
                        Some(onnx::tensor_shape_proto::dimension::Value::DimParam(_)) | None => 0,
                    })
                    .collect(),
                None => continue,
            };
            names.push(v.name.to_string());
            dimss.push(dims);
        }
        (names, dimss)
    }

    // String format: `{0: '$1', 1: '$2', 2: '$5', ..., 7: '$125'}`
    fn parse_names(raw: &str) -> Result<Vec<String>> {
        let re = Regex::new(r#"(['"])([^'"]*)(['"])"#)?;
        Ok(re
            .captures_iter(raw)
            .map(|x| x.extract::<3>())
            .map(|(_, [_, name, _])| name.to_string())
            .collect())
    }
}
