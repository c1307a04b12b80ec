//! 处理后端能力 - 业务能力层
//!
//! `ProcessingBackend` 是工作流控制器唯一依赖的接口，
//! 真实实现走 HTTP，测试里用可编程的替身。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::infrastructure::HttpExecutor;
use crate::models::api::{
    BatchImage, BatchOutcome, Envelope, GenerateBatchRequest, GenerateBatchResponse,
    GeneratedArtifact, PendingData, PendingImage, RegenerateRequest, WatermarkData,
};
use crate::models::PageKind;

/// 批处理后端能力
///
/// 职责：
/// - 只处理"一批图片"或"一张图片"的端点调用
/// - 不出现 WorkItem，不关心阶段流转
#[async_trait]
pub trait ProcessingBackend: Send + Sync {
    /// 拉取页面对应的待处理图片列表
    async fn load_pending(&self, page: PageKind) -> Result<Vec<PendingImage>>;

    /// 批量 AI 生成，按输入顺序返回逐条结局
    async fn generate_batch(&self, images: Vec<BatchImage>) -> Result<Vec<BatchOutcome>>;

    /// 重新生成单张图片
    async fn regenerate_one(&self, image: &str, index: usize) -> Result<GeneratedArtifact>;

    /// 批量水印处理，按输入顺序返回处理后的 data URI
    async fn watermark_batch(&self, images: Vec<BatchImage>) -> Result<Vec<String>>;
}

/// 走 HTTP 的真实后端
pub struct HttpBackend {
    executor: Arc<HttpExecutor>,
}

impl HttpBackend {
    pub fn new(executor: Arc<HttpExecutor>) -> Self {
        Self { executor }
    }
}

const ENDPOINT_LOAD_GENERATE: &str = "/api/load-to-generate-imgs";
const ENDPOINT_LOAD_PS: &str = "/api/load-to-ps-imgs";
const ENDPOINT_GENERATE: &str = "/api/ai-generate";
const ENDPOINT_REGENERATE: &str = "/api/regenerate";
const ENDPOINT_WATERMARK: &str = "/api/watermark-process";

#[async_trait]
impl ProcessingBackend for HttpBackend {
    async fn load_pending(&self, page: PageKind) -> Result<Vec<PendingImage>> {
        let endpoint = match page {
            PageKind::Generate => ENDPOINT_LOAD_GENERATE,
            PageKind::Watermark => ENDPOINT_LOAD_PS,
        };
        let envelope: Envelope<PendingData> = self.executor.get(endpoint).await?;
        let data = envelope.into_data(endpoint)?;
        debug!("待处理列表返回 {} 张图片", data.images.len());
        Ok(data.images)
    }

    async fn generate_batch(&self, images: Vec<BatchImage>) -> Result<Vec<BatchOutcome>> {
        let request = GenerateBatchRequest { images };
        let response: GenerateBatchResponse =
            self.executor.post_json(ENDPOINT_GENERATE, &request).await?;

        if !response.success {
            return Err(crate::error::BackendRejection {
                endpoint: ENDPOINT_GENERATE.to_string(),
                message: response
                    .message
                    .unwrap_or_else(|| "服务器处理错误".to_string()),
            }
            .into());
        }

        let results = response.results.ok_or_else(|| TransportError::MalformedResponse {
            endpoint: ENDPOINT_GENERATE.to_string(),
            detail: "成功响应缺少 results 字段".to_string(),
        })?;

        Ok(results
            .into_iter()
            .map(|item| match (item.success, item.data) {
                (true, Some(artifact)) => BatchOutcome::Done(artifact),
                (_, _) => BatchOutcome::Rejected(
                    item.message.unwrap_or_else(|| "未知错误".to_string()),
                ),
            })
            .collect())
    }

    async fn regenerate_one(&self, image: &str, index: usize) -> Result<GeneratedArtifact> {
        let request = RegenerateRequest { image, index };
        let envelope: Envelope<GeneratedArtifact> =
            self.executor.post_json(ENDPOINT_REGENERATE, &request).await?;
        envelope.into_data(ENDPOINT_REGENERATE)
    }

    async fn watermark_batch(&self, images: Vec<BatchImage>) -> Result<Vec<String>> {
        let request = GenerateBatchRequest { images };
        let envelope: Envelope<WatermarkData> =
            self.executor.post_json(ENDPOINT_WATERMARK, &request).await?;
        let data = envelope.into_data(ENDPOINT_WATERMARK)?;
        Ok(data.processed_images.into_iter().map(|p| p.data).collect())
    }
}
