//! 工作条目数据模型
//!
//! 一张图片在流水线中的完整状态：上传 → 提交 → 完成/失败

use std::fmt::Display;

/// 条目唯一标识
///
/// 按生成顺序递增，在控制器生命周期内保证唯一。
/// 移除条目不会导致其他条目的 id 变化。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 条目所处的阶段
///
/// 只允许向前流转：Uploaded → Submitted → Completed / Failed。
/// 重新生成会把单个条目重置回 Submitted，不影响其他条目。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// 已上传，等待提交
    Uploaded,
    /// 已随批次提交，等待后端结果
    Submitted,
    /// 后端处理成功
    Completed,
    /// 后端对该条目返回失败
    Failed,
}

/// 后端返回的处理产物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultArtifact {
    /// 结果图片（data URI）
    pub image: String,
    /// 生成的文案（水印处理没有文案，为空字符串）
    pub text_content: String,
    /// 后端给出的输出文件名
    pub filename: String,
}

/// 一张图片及其处理状态
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub id: ItemId,
    /// 原始文件名
    pub display_name: String,
    /// 创建时格式化一次的大小标签（如 "512.00 KB"），之后不再重算
    pub size_label: String,
    /// 图片内容的 data URI，既用于预览渲染也用于请求体
    pub source_data: String,
    pub stage: Stage,
    /// 仅在 Completed 时有值
    pub result: Option<ResultArtifact>,
    /// 仅在 Failed 时有值，保存后端的失败原因
    pub failure: Option<String>,
}

impl WorkItem {
    pub fn new(id: ItemId, display_name: String, size: u64, source_data: String) -> Self {
        Self {
            id,
            display_name,
            size_label: crate::models::file_source::format_file_size(size),
            source_data,
            stage: Stage::Uploaded,
            result: None,
            failure: None,
        }
    }
}

/// 批处理页面类型
///
/// 生图页与 P 图页共用同一个工作流控制器，仅后端端点不同。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// 生图页：AI 生成 + 单张重新生成
    Generate,
    /// P 图页：批量水印处理
    Watermark,
}

/// 发布用的星期文件夹（与后端目录结构一致）
pub const WEEKDAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// 检查是否是合法的星期文件夹名
pub fn is_valid_weekday(value: &str) -> bool {
    WEEKDAYS.contains(&value)
}
