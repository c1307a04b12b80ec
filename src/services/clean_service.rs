//! 清理服务 - 业务能力层
//!
//! 让后端清空各个待处理文件夹并返回清理统计。

use std::sync::Arc;

use crate::error::Result;
use crate::infrastructure::HttpExecutor;
use crate::models::api::{CleanData, Envelope};

const ENDPOINT_CLEAN: &str = "/api/clean-temp-files";

/// 清理服务
pub struct CleanService {
    executor: Arc<HttpExecutor>,
}

impl CleanService {
    pub fn new(executor: Arc<HttpExecutor>) -> Self {
        Self { executor }
    }

    /// 清理后端临时文件，返回统计信息
    pub async fn clean(&self) -> Result<CleanData> {
        let envelope: Envelope<CleanData> = self
            .executor
            .post_json(ENDPOINT_CLEAN, &serde_json::json!({}))
            .await?;
        envelope.into_data(ENDPOINT_CLEAN)
    }
}
