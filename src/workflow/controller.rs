//! 批处理工作流控制器 - 流程层
//!
//! 核心职责：管理 WorkItem 集合与阶段流转
//!
//! 阶段顺序：
//! 1. 上传（本地文件解码 / 待处理列表加载）→ Uploaded
//! 2. 批量提交 → Submitted
//! 3. 后端结果映射 → Completed / Failed
//!
//! 控制器自己不做任何图片处理，只调用注入的后端能力。

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info, warn};

use crate::error::{AppError, InputError, Result, TransportError};
use crate::models::api::BatchOutcome;
use crate::models::file_source::{data_uri, data_uri_from_base64, image_mime_from_filename};
use crate::models::{BatchImage, FileSource, ItemId, PageKind, ResultArtifact, Stage, WorkItem};
use crate::services::{NoticeLevel, Notifier, ProcessingBackend};

/// 一次批量提交的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub completed: usize,
    pub failed: usize,
}

/// 批处理工作流控制器
///
/// - 每个页面构造一个实例，持有自己的集合
/// - 通过 `ProcessingBackend` 接缝注入后端，便于测试替身
/// - 所有操作走 `&mut self`，天然保证同一时刻只有一个在途调用
pub struct WorkflowController<B> {
    page: PageKind,
    backend: B,
    notifier: Arc<dyn Notifier>,
    items: Vec<WorkItem>,
    next_id: u64,
}

impl<B: ProcessingBackend> WorkflowController<B> {
    /// 创建新的控制器
    pub fn new(page: PageKind, backend: B, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            page,
            backend,
            notifier,
            items: Vec::new(),
            next_id: 0,
        }
    }

    /// 当前集合（插入顺序即展示顺序）
    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn page(&self) -> PageKind {
        self.page
    }

    /// 从后端加载待处理图片列表，替换当前集合
    ///
    /// 失败时集合保持原状，弹一次通知，不自动重试。
    pub async fn load_pending(&mut self) -> Result<usize> {
        match self.backend.load_pending(self.page).await {
            Ok(images) => {
                self.items.clear();
                for image in images {
                    let source_data = data_uri_from_base64(&image.filename, &image.data);
                    self.push_item(image.filename, image.size, source_data);
                }
                let count = self.items.len();
                if count > 0 {
                    self.notifier.notify(
                        NoticeLevel::Success,
                        &format!("成功加载 {} 张待处理图片！", count),
                    );
                }
                Ok(count)
            }
            Err(e) => {
                self.notify_failure(&e);
                Err(e)
            }
        }
    }

    /// 添加本地文件
    ///
    /// 非图片文件静默过滤；各文件并发解码，
    /// 追加顺序跟随解码完成顺序（接受的非确定性）。
    /// 返回实际加入集合的条目数。
    pub async fn add_from_files<S: FileSource>(&mut self, sources: Vec<S>) -> usize {
        let mut decodes = FuturesUnordered::new();
        for source in sources {
            let Some(mime) = image_mime_from_filename(source.file_name()) else {
                debug!("跳过非图片文件: {}", source.file_name());
                continue;
            };
            decodes.push(async move {
                let name = source.file_name().to_string();
                let size = source.byte_len();
                let bytes = source.read().await;
                (name, size, mime, bytes)
            });
        }

        let mut added = 0;
        while let Some((name, size, mime, bytes)) = decodes.next().await {
            match bytes {
                Ok(bytes) => {
                    let source_data = data_uri(mime, &bytes);
                    self.push_item(name, size, source_data);
                    added += 1;
                }
                Err(e) => warn!("读取图片失败，跳过 {}: {}", name, e),
            }
        }
        added
    }

    /// 移除一个条目（幂等：不存在的 id 不改变集合）
    pub fn remove(&mut self, id: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        before != self.items.len()
    }

    /// 清空集合
    ///
    /// 需要确认回调返回 true 才执行；返回是否真的清空了。
    pub fn clear_all(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if !confirm() {
            return false;
        }
        self.items.clear();
        self.notifier.notify(NoticeLevel::Info, "已清空所有图片");
        true
    }

    /// 批量提交所有 Uploaded 条目
    ///
    /// 整批一次网络调用。结果要么逐条映射回条目（Completed/Failed），
    /// 要么整批回退到 Uploaded 并只弹一次通知，绝不半提交。
    pub async fn submit_batch(&mut self) -> Result<BatchStats> {
        let indices: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.stage == Stage::Uploaded)
            .map(|(i, _)| i)
            .collect();

        if indices.is_empty() {
            let err: AppError = InputError::NoImages.into();
            self.notify_failure(&err);
            return Err(err);
        }

        let payload: Vec<BatchImage> = indices
            .iter()
            .map(|&i| BatchImage {
                data: self.items[i].source_data.clone(),
                filename: self.items[i].display_name.clone(),
            })
            .collect();

        for &i in &indices {
            self.items[i].stage = Stage::Submitted;
        }
        info!("📤 批量提交 {} 张图片", indices.len());

        let outcomes = match self.call_batch(payload).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                self.revert_to_uploaded(&indices);
                self.notify_failure(&e);
                return Err(e);
            }
        };

        if outcomes.len() != indices.len() {
            self.revert_to_uploaded(&indices);
            let err: AppError = TransportError::MalformedResponse {
                endpoint: self.batch_endpoint().to_string(),
                detail: format!("结果数量 {} 与提交数量 {} 不一致", outcomes.len(), indices.len()),
            }
            .into();
            self.notify_failure(&err);
            return Err(err);
        }

        let mut stats = BatchStats::default();
        for (&i, outcome) in indices.iter().zip(outcomes) {
            let item = &mut self.items[i];
            match outcome {
                BatchOutcome::Done(artifact) => {
                    let filename = if artifact.filename.is_empty() {
                        item.display_name.clone()
                    } else {
                        artifact.filename
                    };
                    item.result = Some(ResultArtifact {
                        image: artifact.image,
                        text_content: artifact.text_content,
                        filename,
                    });
                    item.failure = None;
                    item.stage = Stage::Completed;
                    stats.completed += 1;
                }
                BatchOutcome::Rejected(message) => {
                    item.failure = Some(message);
                    item.stage = Stage::Failed;
                    stats.failed += 1;
                }
            }
        }

        let total = stats.completed + stats.failed;
        if stats.failed == 0 {
            self.notifier.notify(
                NoticeLevel::Success,
                &format!("批量处理完成: 成功 {}/{}", stats.completed, total),
            );
        } else {
            self.notifier.notify(
                NoticeLevel::Warning,
                &format!(
                    "批量处理完成: 成功 {}/{}，失败 {}",
                    stats.completed, total, stats.failed
                ),
            );
        }
        Ok(stats)
    }

    /// 重新生成单个条目
    ///
    /// 只替换目标条目的结果；失败时之前的结果原样保留，
    /// 不能让一次失败的重试毁掉已有的成功结果。
    pub async fn regenerate_one(&mut self, id: ItemId) -> Result<()> {
        if self.page != PageKind::Generate {
            let err: AppError = InputError::RegenerateUnsupported.into();
            self.notify_failure(&err);
            return Err(err);
        }

        let Some(position) = self.items.iter().position(|item| item.id == id) else {
            let err: AppError = InputError::UnknownItem { id }.into();
            self.notify_failure(&err);
            return Err(err);
        };

        let Some(previous) = self.items[position].result.clone() else {
            let err: AppError = InputError::NotRegenerable { id }.into();
            self.notify_failure(&err);
            return Err(err);
        };

        self.items[position].stage = Stage::Submitted;
        info!("🔄 正在重新生成条目 {} ...", id);

        match self.backend.regenerate_one(&previous.image, position).await {
            Ok(artifact) => {
                let item = &mut self.items[position];
                item.result = Some(ResultArtifact {
                    image: artifact.image,
                    text_content: artifact.text_content,
                    filename: artifact.filename,
                });
                item.stage = Stage::Completed;
                self.notifier.notify(NoticeLevel::Success, "图片重新生成成功！");
                Ok(())
            }
            Err(e) => {
                // 回到之前的成功状态，旧结果不动
                self.items[position].stage = Stage::Completed;
                self.notify_failure(&e);
                Err(e)
            }
        }
    }

    // ========== 内部辅助 ==========

    fn push_item(&mut self, display_name: String, size: u64, source_data: String) {
        self.next_id += 1;
        self.items
            .push(WorkItem::new(ItemId(self.next_id), display_name, size, source_data));
    }

    async fn call_batch(&self, payload: Vec<BatchImage>) -> Result<Vec<BatchOutcome>> {
        match self.page {
            PageKind::Generate => self.backend.generate_batch(payload).await,
            PageKind::Watermark => {
                let processed = self.backend.watermark_batch(payload).await?;
                Ok(processed
                    .into_iter()
                    .map(|data| {
                        BatchOutcome::Done(crate::models::GeneratedArtifact {
                            image: data,
                            text_content: String::new(),
                            filename: String::new(),
                        })
                    })
                    .collect())
            }
        }
    }

    fn batch_endpoint(&self) -> &'static str {
        match self.page {
            PageKind::Generate => "/api/ai-generate",
            PageKind::Watermark => "/api/watermark-process",
        }
    }

    fn revert_to_uploaded(&mut self, indices: &[usize]) {
        for &i in indices {
            self.items[i].stage = Stage::Uploaded;
        }
    }

    /// 失败通知：后端拒绝原样转发消息，其余带上分类前缀
    fn notify_failure(&self, err: &AppError) {
        match err {
            AppError::Backend(rejection) => {
                self.notifier.notify(NoticeLevel::Error, &rejection.message)
            }
            other => self.notifier.notify(NoticeLevel::Error, &other.to_string()),
        }
    }
}
