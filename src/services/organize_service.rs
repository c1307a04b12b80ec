//! 整理服务 - 业务能力层
//!
//! 把水印完成的图片和对应文案整理到星期文件夹，
//! 以及调用后端为单张图片生成 AI 文案。

use std::sync::Arc;

use tracing::info;

use crate::error::{InputError, Result};
use crate::infrastructure::HttpExecutor;
use crate::models::api::{AiTextData, AiTextRequest, Envelope, OrganizeData, OrganizeRequest};

const ENDPOINT_ORGANIZE: &str = "/api/organize-images";
const ENDPOINT_AI_TEXT: &str = "/api/generate-ai-text";

/// 整理服务
pub struct OrganizeService {
    executor: Arc<HttpExecutor>,
}

impl OrganizeService {
    pub fn new(executor: Arc<HttpExecutor>) -> Self {
        Self { executor }
    }

    /// 整理图片与文案到星期文件夹
    ///
    /// 本地先校验：两个列表都非空且数量一致，校验失败不发请求。
    pub async fn organize(&self, image_names: &[String], texts: &[String]) -> Result<OrganizeData> {
        if image_names.is_empty() {
            return Err(InputError::NoImages.into());
        }
        if texts.is_empty() {
            return Err(InputError::NoTexts.into());
        }
        if image_names.len() != texts.len() {
            return Err(InputError::CountMismatch {
                images: image_names.len(),
                texts: texts.len(),
            }
            .into());
        }

        let request = OrganizeRequest { image_names, texts };
        let envelope: Envelope<OrganizeData> =
            self.executor.post_json(ENDPOINT_ORGANIZE, &request).await?;
        let data = envelope.into_data(ENDPOINT_ORGANIZE)?;

        info!(
            "✓ 整理完成: 共 {} 个文件，使用文件夹 {:?}",
            data.total_organized, data.weekdays_used
        );
        Ok(data)
    }

    /// 为一张图片生成 AI 文案
    pub async fn generate_caption(&self, filename: &str, image_data: &str) -> Result<String> {
        let request = AiTextRequest {
            filename,
            image_data,
        };
        let envelope: Envelope<AiTextData> =
            self.executor.post_json(ENDPOINT_AI_TEXT, &request).await?;
        Ok(envelope.into_data(ENDPOINT_AI_TEXT)?.text)
    }
}
