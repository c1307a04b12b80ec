pub mod backend;
pub mod clean_service;
pub mod notifier;
pub mod organize_service;
pub mod publish_service;

pub use backend::{HttpBackend, ProcessingBackend};
pub use clean_service::CleanService;
pub use notifier::{LogNotifier, NoticeLevel, Notifier};
pub use organize_service::OrganizeService;
pub use publish_service::PublishService;
