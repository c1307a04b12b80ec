//! 工作流控制器的行为测试
//!
//! 用可编程的后端替身和记录式通知器验证阶段流转的关键性质：
//! 整批成功或整批回退、重试不毁旧结果、通知消息原样转发。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use ins_content_pipeline::error::{AppError, BackendRejection, InputError, Result, TransportError};
use ins_content_pipeline::models::api::{BatchImage, BatchOutcome, GeneratedArtifact, PendingImage};
use ins_content_pipeline::models::{FileSource, ItemId, PageKind, Stage};
use ins_content_pipeline::services::{NoticeLevel, Notifier, ProcessingBackend};
use ins_content_pipeline::workflow::{render_preview, WorkflowController};

// ========== 测试替身 ==========

#[derive(Default)]
struct MockState {
    pending: Mutex<VecDeque<Result<Vec<PendingImage>>>>,
    generate: Mutex<VecDeque<Result<Vec<BatchOutcome>>>>,
    regenerate: Mutex<VecDeque<Result<GeneratedArtifact>>>,
    watermark: Mutex<VecDeque<Result<Vec<String>>>>,
    generate_calls: AtomicUsize,
    last_regenerate: Mutex<Option<(String, usize)>>,
}

/// 可编程的后端替身，测试里通过共享的 state 预置响应
#[derive(Clone, Default)]
struct MockBackend {
    state: Arc<MockState>,
}

#[async_trait]
impl ProcessingBackend for MockBackend {
    async fn load_pending(&self, _page: PageKind) -> Result<Vec<PendingImage>> {
        self.state
            .pending
            .lock()
            .unwrap()
            .pop_front()
            .expect("测试未预置 load_pending 响应")
    }

    async fn generate_batch(&self, _images: Vec<BatchImage>) -> Result<Vec<BatchOutcome>> {
        self.state.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.state
            .generate
            .lock()
            .unwrap()
            .pop_front()
            .expect("测试未预置 generate_batch 响应")
    }

    async fn regenerate_one(&self, image: &str, index: usize) -> Result<GeneratedArtifact> {
        *self.state.last_regenerate.lock().unwrap() = Some((image.to_string(), index));
        self.state
            .regenerate
            .lock()
            .unwrap()
            .pop_front()
            .expect("测试未预置 regenerate_one 响应")
    }

    async fn watermark_batch(&self, _images: Vec<BatchImage>) -> Result<Vec<String>> {
        self.state
            .watermark
            .lock()
            .unwrap()
            .pop_front()
            .expect("测试未预置 watermark_batch 响应")
    }
}

/// 记录所有通知，供断言消息文本
#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    fn last_error(&self) -> Option<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(level, _)| *level == NoticeLevel::Error)
            .map(|(_, message)| message.clone())
    }

    fn error_count(&self) -> usize {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, _)| *level == NoticeLevel::Error)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

/// 可控延迟的内存文件来源，用来制造不同的解码完成顺序
struct MemorySource {
    name: String,
    len: u64,
    bytes: Vec<u8>,
    delay_ms: u64,
}

impl MemorySource {
    fn new(name: &str, len: u64) -> Self {
        Self {
            name: name.to_string(),
            len,
            bytes: vec![1, 2, 3],
            delay_ms: 0,
        }
    }

    fn with_delay(name: &str, len: u64, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::new(name, len)
        }
    }
}

#[async_trait]
impl FileSource for MemorySource {
    fn file_name(&self) -> &str {
        &self.name
    }

    fn byte_len(&self) -> u64 {
        self.len
    }

    async fn read(&self) -> Result<Vec<u8>> {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        Ok(self.bytes.clone())
    }
}

// ========== 测试脚手架 ==========

struct Harness {
    backend: MockBackend,
    notifier: Arc<RecordingNotifier>,
    controller: WorkflowController<MockBackend>,
}

fn harness(page: PageKind) -> Harness {
    let backend = MockBackend::default();
    let notifier = Arc::new(RecordingNotifier::default());
    let controller =
        WorkflowController::new(page, backend.clone(), notifier.clone() as Arc<dyn Notifier>);
    Harness {
        backend,
        notifier,
        controller,
    }
}

fn artifact(image: &str, text: &str, filename: &str) -> GeneratedArtifact {
    GeneratedArtifact {
        image: image.to_string(),
        text_content: text.to_string(),
        filename: filename.to_string(),
    }
}

fn transport_500(endpoint: &str) -> AppError {
    TransportError::BadStatus {
        endpoint: endpoint.to_string(),
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
    }
    .into()
}

fn rejection(endpoint: &str, message: &str) -> AppError {
    BackendRejection {
        endpoint: endpoint.to_string(),
        message: message.to_string(),
    }
    .into()
}

async fn add_images(harness: &mut Harness, names: &[&str]) {
    let sources = names
        .iter()
        .map(|name| MemorySource::new(name, 1024))
        .collect();
    harness.controller.add_from_files(sources).await;
}

// ========== 上传阶段 ==========

#[tokio::test(start_paused = true)]
async fn test_collection_size_independent_of_decode_order() {
    let mut h = harness(PageKind::Generate);

    // 完成顺序与传入顺序相反
    let added = h
        .controller
        .add_from_files(vec![
            MemorySource::with_delay("slow.png", 1024, 30),
            MemorySource::with_delay("medium.jpg", 1024, 20),
            MemorySource::with_delay("fast.webp", 1024, 10),
        ])
        .await;
    assert_eq!(added, 3);
    assert_eq!(h.controller.items().len(), 3);

    // 追加顺序跟随解码完成顺序
    let names: Vec<&str> = h
        .controller
        .items()
        .iter()
        .map(|item| item.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["fast.webp", "medium.jpg", "slow.png"]);

    // 多次调用累积计数
    h.controller
        .add_from_files(vec![MemorySource::new("d.png", 1024)])
        .await;
    assert_eq!(h.controller.items().len(), 4);

    // id 唯一
    let mut ids: Vec<ItemId> = h.controller.items().iter().map(|item| item.id).collect();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[tokio::test]
async fn test_non_image_files_filtered_silently() {
    let mut h = harness(PageKind::Generate);

    let added = h
        .controller
        .add_from_files(vec![
            MemorySource::new("a.png", 1200),
            MemorySource::new("b.jpg", 2_097_152),
            MemorySource::new("c.pdf", 4096),
        ])
        .await;

    // c.pdf 被静默过滤，不算错误
    assert_eq!(added, 2);
    assert_eq!(h.controller.items().len(), 2);
    assert_eq!(h.notifier.error_count(), 0);

    let b = h
        .controller
        .items()
        .iter()
        .find(|item| item.display_name == "b.jpg")
        .unwrap();
    assert_eq!(b.size_label, "2.00 MB");
    assert!(b.source_data.starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn test_load_pending_seeds_collection() {
    let mut h = harness(PageKind::Generate);
    h.backend.state.pending.lock().unwrap().push_back(Ok(vec![PendingImage {
        filename: "pending.png".to_string(),
        size: 524_288,
        data: "QUJD".to_string(),
    }]));

    let count = h.controller.load_pending().await.unwrap();
    assert_eq!(count, 1);

    let item = &h.controller.items()[0];
    assert_eq!(item.stage, Stage::Uploaded);
    assert_eq!(item.size_label, "512.00 KB");
    // 裸 base64 被包装成 data URI
    assert_eq!(item.source_data, "data:image/png;base64,QUJD");
}

#[tokio::test]
async fn test_load_pending_http_500_leaves_collection_empty() {
    let mut h = harness(PageKind::Generate);
    h.backend
        .state
        .pending
        .lock()
        .unwrap()
        .push_back(Err(transport_500("/api/load-to-generate-imgs")));

    let result = h.controller.load_pending().await;
    assert!(matches!(result, Err(AppError::Transport(_))));
    assert!(h.controller.items().is_empty());

    // 传输错误弹一次通知
    let message = h.notifier.last_error().unwrap();
    assert!(message.contains("网络错误"));
}

// ========== 移除与清空 ==========

#[tokio::test]
async fn test_remove_is_idempotent() {
    let mut h = harness(PageKind::Generate);
    add_images(&mut h, &["a.png", "b.png"]).await;

    let target = h.controller.items()[0].id;
    assert!(h.controller.remove(target));
    assert_eq!(h.controller.items().len(), 1);

    // 不存在的 id 不改变集合
    assert!(!h.controller.remove(target));
    assert!(!h.controller.remove(ItemId(9999)));
    assert_eq!(h.controller.items().len(), 1);
    assert_eq!(h.controller.items()[0].display_name, "b.png");
}

#[tokio::test]
async fn test_clear_all_requires_confirmation() {
    let mut h = harness(PageKind::Generate);
    add_images(&mut h, &["a.png", "b.png"]).await;

    // 拒绝确认：原样保留
    assert!(!h.controller.clear_all(|| false));
    assert_eq!(h.controller.items().len(), 2);

    // 确认后彻底清空，后续渲染不再出现任何旧条目
    assert!(h.controller.clear_all(|| true));
    assert!(h.controller.items().is_empty());
    assert!(!render_preview(h.controller.items()).visible);
}

// ========== 批量提交 ==========

#[tokio::test]
async fn test_submit_batch_maps_results_in_input_order() {
    let mut h = harness(PageKind::Generate);
    add_images(&mut h, &["a.png", "b.png", "c.png"]).await;

    h.backend.state.generate.lock().unwrap().push_back(Ok(vec![
        BatchOutcome::Done(artifact("data:image/png;base64,AA", "文案A", "gen_a.png")),
        BatchOutcome::Rejected("内容违规".to_string()),
        BatchOutcome::Done(artifact("data:image/png;base64,CC", "文案C", "gen_c.png")),
    ]));

    let stats = h.controller.submit_batch().await.unwrap();
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.failed, 1);

    let items = h.controller.items();
    assert_eq!(items[0].stage, Stage::Completed);
    assert_eq!(items[0].result.as_ref().unwrap().filename, "gen_a.png");
    assert_eq!(items[1].stage, Stage::Failed);
    assert_eq!(items[1].failure.as_deref(), Some("内容违规"));
    assert_eq!(items[2].stage, Stage::Completed);
    assert_eq!(items[2].result.as_ref().unwrap().text_content, "文案C");
}

#[tokio::test]
async fn test_submit_batch_rejection_keeps_items_uploaded() {
    let mut h = harness(PageKind::Generate);
    add_images(&mut h, &["a.png", "b.png"]).await;

    h.backend
        .state
        .generate
        .lock()
        .unwrap()
        .push_back(Err(rejection("/api/ai-generate", "quota exceeded")));

    let result = h.controller.submit_batch().await;
    assert!(matches!(result, Err(AppError::Backend(_))));

    // 整批回退：条目保持 Uploaded 而不是 Failed
    for item in h.controller.items() {
        assert_eq!(item.stage, Stage::Uploaded);
        assert!(item.result.is_none());
    }

    // 后端消息原样转发
    assert_eq!(h.notifier.last_error().as_deref(), Some("quota exceeded"));
    assert_eq!(h.notifier.error_count(), 1);
}

#[tokio::test]
async fn test_submit_batch_transport_failure_is_all_or_nothing() {
    let mut h = harness(PageKind::Generate);
    add_images(&mut h, &["a.png", "b.png", "c.png"]).await;

    h.backend
        .state
        .generate
        .lock()
        .unwrap()
        .push_back(Err(transport_500("/api/ai-generate")));

    assert!(h.controller.submit_batch().await.is_err());
    assert!(h
        .controller
        .items()
        .iter()
        .all(|item| item.stage == Stage::Uploaded));
    assert_eq!(h.notifier.error_count(), 1);
}

#[tokio::test]
async fn test_submit_batch_count_mismatch_is_malformed() {
    let mut h = harness(PageKind::Generate);
    add_images(&mut h, &["a.png", "b.png", "c.png"]).await;

    // 后端少回了一条结果
    h.backend.state.generate.lock().unwrap().push_back(Ok(vec![
        BatchOutcome::Done(artifact("data:image/png;base64,AA", "", "gen_a.png")),
        BatchOutcome::Done(artifact("data:image/png;base64,BB", "", "gen_b.png")),
    ]));

    let result = h.controller.submit_batch().await;
    assert!(matches!(
        result,
        Err(AppError::Transport(TransportError::MalformedResponse { .. }))
    ));
    assert!(h
        .controller
        .items()
        .iter()
        .all(|item| item.stage == Stage::Uploaded));
}

#[tokio::test]
async fn test_submit_empty_collection_blocked_before_network() {
    let mut h = harness(PageKind::Generate);

    let result = h.controller.submit_batch().await;
    assert!(matches!(
        result,
        Err(AppError::Input(InputError::NoImages))
    ));
    // 没发任何网络请求
    assert_eq!(h.backend.state.generate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_watermark_batch_fills_results() {
    let mut h = harness(PageKind::Watermark);
    add_images(&mut h, &["a.png", "b.jpg"]).await;

    h.backend.state.watermark.lock().unwrap().push_back(Ok(vec![
        "data:image/png;base64,WA==".to_string(),
        "data:image/jpeg;base64,WB==".to_string(),
    ]));

    let stats = h.controller.submit_batch().await.unwrap();
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.failed, 0);

    let items = h.controller.items();
    let result = items[0].result.as_ref().unwrap();
    assert_eq!(result.image, "data:image/png;base64,WA==");
    assert!(result.text_content.is_empty());
    // 水印结果没有输出文件名，沿用原名
    assert_eq!(result.filename, "a.png");
}

// ========== 单张重新生成 ==========

async fn completed_pair(h: &mut Harness) {
    add_images(h, &["a.png", "b.png"]).await;
    h.backend.state.generate.lock().unwrap().push_back(Ok(vec![
        BatchOutcome::Done(artifact("data:image/png;base64,AA", "文案A", "gen_a.png")),
        BatchOutcome::Done(artifact("data:image/png;base64,BB", "文案B", "gen_b.png")),
    ]));
    h.controller.submit_batch().await.unwrap();
}

#[tokio::test]
async fn test_regenerate_changes_only_target_item() {
    let mut h = harness(PageKind::Generate);
    completed_pair(&mut h).await;

    let sibling_before = h.controller.items()[1].result.clone().unwrap();
    let target = h.controller.items()[0].id;

    h.backend
        .state
        .regenerate
        .lock()
        .unwrap()
        .push_back(Ok(artifact("data:image/png;base64,AA2", "新文案", "regen_a.png")));

    h.controller.regenerate_one(target).await.unwrap();

    // 请求携带旧结果图与条目位置
    let (sent_image, sent_index) = h.backend.state.last_regenerate.lock().unwrap().clone().unwrap();
    assert_eq!(sent_image, "data:image/png;base64,AA");
    assert_eq!(sent_index, 0);

    // 只有目标条目被替换
    let items = h.controller.items();
    assert_eq!(items[0].result.as_ref().unwrap().image, "data:image/png;base64,AA2");
    assert_eq!(items[0].stage, Stage::Completed);
    assert_eq!(items[1].result.as_ref().unwrap(), &sibling_before);
}

#[tokio::test]
async fn test_regenerate_failure_preserves_previous_result() {
    let mut h = harness(PageKind::Generate);
    completed_pair(&mut h).await;

    let before = h.controller.items()[0].result.clone().unwrap();
    let target = h.controller.items()[0].id;

    h.backend
        .state
        .regenerate
        .lock()
        .unwrap()
        .push_back(Err(transport_500("/api/regenerate")));

    assert!(h.controller.regenerate_one(target).await.is_err());

    // 失败的重试不能毁掉已有的成功结果
    let item = &h.controller.items()[0];
    assert_eq!(item.stage, Stage::Completed);
    assert_eq!(item.result.as_ref().unwrap(), &before);
    assert_eq!(h.notifier.error_count(), 1);
}

#[tokio::test]
async fn test_regenerate_rejected_on_watermark_page() {
    let mut h = harness(PageKind::Watermark);
    add_images(&mut h, &["a.png"]).await;

    let target = h.controller.items()[0].id;
    assert!(matches!(
        h.controller.regenerate_one(target).await,
        Err(AppError::Input(InputError::RegenerateUnsupported))
    ));
}

#[tokio::test]
async fn test_regenerate_unknown_item_is_input_error() {
    let mut h = harness(PageKind::Generate);
    add_images(&mut h, &["a.png"]).await;

    assert!(matches!(
        h.controller.regenerate_one(ItemId(404)).await,
        Err(AppError::Input(InputError::UnknownItem { .. }))
    ));
}
