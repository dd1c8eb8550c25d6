use std::path::PathBuf;

use anyhow::{ensure, Result};
use ltv_ingest::InputFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub top_n: usize,
    pub format: InputFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("input/input.txt"),
            output_path: PathBuf::from("output/output.txt"),
            top_n: 50,
            format: InputFormat::Framed,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.top_n >= 1, "top_n must be at least 1");
        ensure!(
            self.input_path != self.output_path,
            "output path {} would overwrite the input",
            self.output_path.display()
        );
        Ok(())
    }
}
