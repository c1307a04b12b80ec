//! 发布服务 - 业务能力层
//!
//! 浏览星期文件夹、读取配套文案、把选定的图片和文案发布出去。
//! 发布端点走 multipart 表单，图片以 weekday + 文件名交给后端定位。

use std::sync::Arc;

use reqwest::multipart::Form;
use tracing::warn;

use crate::error::{InputError, Result};
use crate::infrastructure::HttpExecutor;
use crate::models::api::{Envelope, TextContentData, WeekdayImage, WeekdayImagesData};
use crate::models::item::is_valid_weekday;

const ENDPOINT_PUBLISH: &str = "/api/publish";

/// 发布服务
pub struct PublishService {
    executor: Arc<HttpExecutor>,
    caption_limit: usize,
}

impl PublishService {
    pub fn new(executor: Arc<HttpExecutor>, caption_limit: usize) -> Self {
        Self {
            executor,
            caption_limit,
        }
    }

    /// 列出某个星期文件夹下的图片
    pub async fn weekday_images(&self, weekday: &str) -> Result<Vec<WeekdayImage>> {
        Self::check_weekday(weekday)?;
        let endpoint = format!("/api/weekday-images/{}", weekday);
        let envelope: Envelope<WeekdayImagesData> = self.executor.get(&endpoint).await?;
        Ok(envelope.into_data(&endpoint)?.images)
    }

    /// 读取图片对应的文案文件（同名 .txt）
    ///
    /// 文件名可能含多个点（如 2.55.jpg），只去掉最后一段扩展名。
    pub async fn caption_for(&self, weekday: &str, image_file: &str) -> Result<String> {
        Self::check_weekday(weekday)?;
        let base = image_file
            .rsplit_once('.')
            .map(|(base, _)| base)
            .unwrap_or(image_file);
        let endpoint = format!("/api/text-content/{}/{}.txt", weekday, base);
        let envelope: Envelope<TextContentData> = self.executor.get(&endpoint).await?;
        Ok(envelope.into_data(&endpoint)?.content)
    }

    /// 发布一张图片和文案
    ///
    /// 本地先校验：图片与文案都不能为空；超长文案只警告不拦截。
    pub async fn publish(&self, weekday: &str, image_file: &str, content: &str) -> Result<()> {
        Self::check_weekday(weekday)?;
        if image_file.trim().is_empty() {
            return Err(InputError::NoImages.into());
        }
        if content.trim().is_empty() {
            return Err(InputError::NoCaption.into());
        }
        let length = content.chars().count();
        if length > self.caption_limit {
            warn!("⚠️ 文案长度 {} 超过上限 {}，发布可能被平台截断", length, self.caption_limit);
        }

        let form = Form::new()
            .text("weekday", weekday.to_string())
            .text("image_file", image_file.to_string())
            .text("content", content.to_string());

        let envelope: Envelope<serde_json::Value> =
            self.executor.post_form(ENDPOINT_PUBLISH, form).await?;
        envelope.ensure_success(ENDPOINT_PUBLISH)
    }

    fn check_weekday(weekday: &str) -> Result<()> {
        if is_valid_weekday(weekday) {
            Ok(())
        } else {
            Err(InputError::BadWeekday {
                value: weekday.to_string(),
            }
            .into())
        }
    }
}
