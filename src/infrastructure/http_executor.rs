//! HTTP 执行器 - 基础设施层
//!
//! 持有唯一的 reqwest 客户端资源，只暴露"发请求、解信封"的能力

use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, TransportError};

/// HTTP 执行器
///
/// 职责：
/// - 持有唯一的 reqwest::Client
/// - 暴露 get / post_json / post_form 能力
/// - 把传输层失败统一映射为 TransportError
/// - 不认识 WorkItem，不处理业务流程
///
/// 不设置请求超时：后端挂起时调用会一直等待（已知限制）。
pub struct HttpExecutor {
    client: reqwest::Client,
    base_url: String,
}

impl HttpExecutor {
    /// 创建新的 HTTP 执行器
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GET 请求并解码为指定类型
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        debug!("GET {}", endpoint);
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| request_failed(endpoint, e))?;
        Self::decode(endpoint, response).await
    }

    /// POST JSON 请求并解码为指定类型
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        debug!("POST {}", endpoint);
        let response = self
            .client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| request_failed(endpoint, e))?;
        Self::decode(endpoint, response).await
    }

    /// POST multipart 表单并解码为指定类型（发布端点使用）
    pub async fn post_form<T: DeserializeOwned>(&self, endpoint: &str, form: Form) -> Result<T> {
        debug!("POST {} (multipart)", endpoint);
        let response = self
            .client
            .post(self.url(endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_failed(endpoint, e))?;
        Self::decode(endpoint, response).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// 状态码与响应体统一解码
    async fn decode<T: DeserializeOwned>(endpoint: &str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::BadStatus {
                endpoint: endpoint.to_string(),
                status,
            }
            .into());
        }
        response.json::<T>().await.map_err(|e| {
            TransportError::MalformedResponse {
                endpoint: endpoint.to_string(),
                detail: e.to_string(),
            }
            .into()
        })
    }
}

fn request_failed(endpoint: &str, source: reqwest::Error) -> TransportError {
    TransportError::RequestFailed {
        endpoint: endpoint.to_string(),
        source,
    }
}
