//! 后端接口的数据结构
//!
//! 所有端点都返回 `success: bool`，成功时带 `data`，失败时带 `message`。
//! 不符合这个形状的响应一律按传输层错误处理。

use serde::{Deserialize, Serialize};

use crate::error::{BackendRejection, Result, TransportError};

/// 通用响应信封
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// 取出 data，`success:false` 映射为后端拒绝，缺失 data 映射为格式异常
    pub fn into_data(self, endpoint: &str) -> Result<T> {
        if !self.success {
            return Err(BackendRejection {
                endpoint: endpoint.to_string(),
                message: self.message.unwrap_or_else(|| "服务器处理错误".to_string()),
            }
            .into());
        }
        self.data.ok_or_else(|| {
            TransportError::MalformedResponse {
                endpoint: endpoint.to_string(),
                detail: "成功响应缺少 data 字段".to_string(),
            }
            .into()
        })
    }

    /// 只确认 success，不关心 data（发布端点成功时没有负载）
    pub fn ensure_success(self, endpoint: &str) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(BackendRejection {
                endpoint: endpoint.to_string(),
                message: self.message.unwrap_or_else(|| "服务器处理错误".to_string()),
            }
            .into())
        }
    }
}

/// 待处理列表中的一张图片（data 为不带前缀的 base64）
#[derive(Debug, Clone, Deserialize)]
pub struct PendingImage {
    pub filename: String,
    pub size: u64,
    pub data: String,
}

/// 待处理列表响应体
#[derive(Debug, Deserialize)]
pub struct PendingData {
    pub images: Vec<PendingImage>,
}

/// 批量请求中的一张图片（data 为完整 data URI）
#[derive(Debug, Clone, Serialize)]
pub struct BatchImage {
    pub data: String,
    pub filename: String,
}

/// 批量生图请求体
#[derive(Debug, Serialize)]
pub struct GenerateBatchRequest {
    pub images: Vec<BatchImage>,
}

/// 生成产物
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedArtifact {
    pub image: String,
    #[serde(default)]
    pub text_content: String,
    #[serde(default = "default_generated_name")]
    pub filename: String,
}

fn default_generated_name() -> String {
    "generated_image".to_string()
}

/// 批量生图响应中的单条结果
#[derive(Debug, Deserialize)]
pub struct GenerateResultItem {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<GeneratedArtifact>,
}

/// 批量生图响应（results 在顶层，不走通用信封）
#[derive(Debug, Deserialize)]
pub struct GenerateBatchResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<GenerateResultItem>>,
}

/// 单条结果映射到条目上的结局
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    /// 后端处理成功
    Done(GeneratedArtifact),
    /// 后端对该条目返回失败，附原因
    Rejected(String),
}

/// 单张重新生成请求体
#[derive(Debug, Serialize)]
pub struct RegenerateRequest<'a> {
    pub image: &'a str,
    pub index: usize,
}

/// 水印批处理响应体
#[derive(Debug, Deserialize)]
pub struct WatermarkData {
    pub processed_images: Vec<ProcessedImage>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessedImage {
    pub data: String,
}

/// 整理请求体
#[derive(Debug, Serialize)]
pub struct OrganizeRequest<'a> {
    pub image_names: &'a [String],
    pub texts: &'a [String],
}

/// 整理结果
#[derive(Debug, Deserialize)]
pub struct OrganizeData {
    pub total_organized: u64,
    #[serde(default)]
    pub weekdays_used: Vec<String>,
}

/// AI 文案请求体
#[derive(Debug, Serialize)]
pub struct AiTextRequest<'a> {
    pub filename: &'a str,
    pub image_data: &'a str,
}

/// AI 文案结果
#[derive(Debug, Deserialize)]
pub struct AiTextData {
    pub text: String,
}

/// 星期文件夹下的一张图片
#[derive(Debug, Clone, Deserialize)]
pub struct WeekdayImage {
    pub filename: String,
    #[serde(default)]
    pub size_mb: f64,
}

/// 星期文件夹列表响应体
#[derive(Debug, Deserialize)]
pub struct WeekdayImagesData {
    pub images: Vec<WeekdayImage>,
}

/// 文案文件内容
#[derive(Debug, Deserialize)]
pub struct TextContentData {
    pub content: String,
}

/// 清理结果统计
#[derive(Debug, Deserialize)]
pub struct CleanData {
    pub total_files_cleaned: u64,
    pub total_image_files_cleaned: u64,
    pub total_text_files_cleaned: u64,
    pub total_size_cleaned_mb: f64,
}
