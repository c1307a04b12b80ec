//! 编排层（Orchestration Layer）
//!
//! 负责把配置、基础设施、服务和工作流控制器组装成完整的页面流程，
//! 是整个客户端的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (子命令 → 页面流程)
//!     ↓
//! workflow::WorkflowController (管理 Vec<WorkItem> 的阶段流转)
//!     ↓
//! services (能力层：backend / organize / publish / clean / notify)
//!     ↓
//! infrastructure::HttpExecutor (唯一的 HTTP 客户端资源)
//! ```

pub mod app;

pub use app::{App, Command};
