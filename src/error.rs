//! 应用程序错误类型
//!
//! 错误分类：
//! - `Transport`：网络不可达、非 2xx 状态、响应格式异常
//! - `Backend`：后端返回 `success:false`，原样保留后端消息
//! - `Input`：本地校验失败（没有图片、没有文案等），发生在任何网络调用之前
//! - `File` / `Config`：本地文件与配置问题
//!
//! 任何错误都不会让程序进入不可恢复状态；批量操作失败时集合
//! 会回到之前的有效状态，不会出现半提交。

use thiserror::Error;

/// 统一的 Result 别名
pub type Result<T> = std::result::Result<T, AppError>;

/// 应用程序错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error("网络错误: {0}")]
    Transport(#[from] TransportError),

    #[error("{0}")]
    Backend(#[from] BackendRejection),

    #[error("输入错误: {0}")]
    Input(#[from] InputError),

    #[error("文件错误: {0}")]
    File(#[from] FileError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 传输层错误
#[derive(Debug, Error)]
pub enum TransportError {
    /// 请求发不出去（连接拒绝、DNS 失败等）
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// 后端返回了非 2xx 状态码
    #[error("HTTP 状态异常 ({endpoint}): {status}")]
    BadStatus {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    /// 响应不是约定的信封形状
    #[error("响应格式异常 ({endpoint}): {detail}")]
    MalformedResponse { endpoint: String, detail: String },
}

/// 后端拒绝
///
/// 结构合法但 `success:false`，消息原样转给用户。
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BackendRejection {
    pub endpoint: String,
    pub message: String,
}

/// 本地输入校验错误
#[derive(Debug, Error)]
pub enum InputError {
    #[error("请先上传图片")]
    NoImages,

    #[error("请输入帖子文案")]
    NoCaption,

    #[error("文案列表不能为空")]
    NoTexts,

    #[error("图片数量({images})与文案数量({texts})不匹配")]
    CountMismatch { images: usize, texts: usize },

    #[error("找不到对应的图片条目: {id}")]
    UnknownItem { id: crate::models::ItemId },

    #[error("该条目还没有可替换的生成结果: {id}")]
    NotRegenerable { id: crate::models::ItemId },

    #[error("当前页面不支持重新生成")]
    RegenerateUnsupported,

    #[error("无效的星期文件夹: {value}")]
    BadWeekday { value: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("解析配置文件失败 ({path}): {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
