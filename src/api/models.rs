use serde::{Deserialize, Serialize};

use crate::llm::GenerationParams;

pub const DEFAULT_MAX_LENGTH: u32 = 150;
pub const DEFAULT_MIN_LENGTH: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct TextData {
    pub text: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SummarizationParams {
    #[serde(default = "default_max_length")]
    pub max_length: u32,
    #[serde(default = "default_min_length")]
    pub min_length: u32,
}

fn default_max_length() -> u32 {
    DEFAULT_MAX_LENGTH
}

fn default_min_length() -> u32 {
    DEFAULT_MIN_LENGTH
}

impl From<SummarizationParams> for GenerationParams {
    fn from(params: SummarizationParams) -> Self {
        GenerationParams {
            max_length: params.max_length,
            min_length: params.min_length,
            do_sample: true,
        }
    }
}

/// `POST /test` carries the text and the generation parameters as two
/// separate objects embedded in one body.
#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub text_data: TextData,
    pub params: SummarizationParams,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary_text: String,
}

#[derive(Debug, Deserialize)]
pub struct ArticlesQuery {
    pub keywords: String,
    pub pages: u32,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
}
