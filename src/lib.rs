//! # Ins Content Pipeline
//!
//! 社媒内容流水线的命令行客户端：把一批图片依次推过
//! 上传 → 提交 → 完成/失败 的阶段，实际处理（AI 生成、水印、
//! 整理、发布）全部由 `localhost:5000` 的后端完成。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（reqwest 客户端），只暴露能力
//! - `HttpExecutor` - 唯一的 HTTP 客户端 owner，提供请求/解信封能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `ProcessingBackend` - 批量生成 / 水印 / 重新生成能力（可注入替身）
//! - `OrganizeService` / `PublishService` / `CleanService` - 非批量端点
//! - `Notifier` - 用户可见的临时通知能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一批图片"的完整处理流程
//! - `WorkflowController` - 集合管理与阶段流转（整批成功或整批回退）
//! - `view` - 预览/结果网格的纯渲染函数
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/App` - 每个子命令组装一个页面流程并输出统计

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, Result};
pub use infrastructure::HttpExecutor;
pub use models::{ItemId, PageKind, Stage, WorkItem};
pub use orchestrator::{App, Command};
pub use workflow::{BatchStats, WorkflowController};
