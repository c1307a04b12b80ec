//! 通知能力 - 业务能力层
//!
//! 对应页面右上角的临时通知条：每次网络操作的结果都要让用户看到，
//! 不允许只进日志就吞掉。

use tracing::{error, info, warn};

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
    Warning,
}

/// 通知能力
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// 写进日志的默认通知实现
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success => info!("✅ {}", message),
            NoticeLevel::Error => error!("❌ {}", message),
            NoticeLevel::Info => info!("💡 {}", message),
            NoticeLevel::Warning => warn!("⚠️ {}", message),
        }
    }
}
