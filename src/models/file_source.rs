//! 文件来源抽象与图片编码工具
//!
//! 把"读一个文件"收敛成可等待的 `FileSource` 能力，
//! 控制器只关心解码完成的先后顺序，不关心字节从哪里来。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{FileError, Result};

/// 文件来源
///
/// 真实实现读磁盘；测试实现可以按受控顺序完成，
/// 用来验证"追加顺序跟随解码完成顺序"这一性质。
#[async_trait]
pub trait FileSource: Send + Sync {
    /// 原始文件名
    fn file_name(&self) -> &str;

    /// 字节大小
    fn byte_len(&self) -> u64;

    /// 异步读出全部字节
    async fn read(&self) -> Result<Vec<u8>>;
}

/// 磁盘文件来源
#[derive(Debug, Clone)]
pub struct DiskFileSource {
    path: PathBuf,
    name: String,
    len: u64,
}

impl DiskFileSource {
    /// 打开一个磁盘文件并记录元信息
    pub async fn open(path: &Path) -> Result<Self> {
        let meta = tokio::fs::metadata(path).await.map_err(|e| FileError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self {
            path: path.to_path_buf(),
            name,
            len: meta.len(),
        })
    }
}

#[async_trait]
impl FileSource for DiskFileSource {
    fn file_name(&self) -> &str {
        &self.name
    }

    fn byte_len(&self) -> u64 {
        self.len
    }

    async fn read(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path).await.map_err(|e| {
            FileError::ReadFailed {
                path: self.path.display().to_string(),
                source: e,
            }
            .into()
        })
    }
}

/// 根据扩展名判断图片 MIME 类型
///
/// 非图片扩展名返回 None，调用方静默过滤。
pub fn image_mime_from_filename(filename: &str) -> Option<&'static str> {
    let extension = filename.rsplit('.').next()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// 把字节编码成 data URI
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// 把待处理端点返回的裸 base64 包装成 data URI
///
/// 扩展名不认识时退回 image/png，与前端页面的处理一致。
pub fn data_uri_from_base64(filename: &str, base64_data: &str) -> String {
    let mime = image_mime_from_filename(filename).unwrap_or("image/png");
    format!("data:{};base64,{}", mime, base64_data)
}

/// 格式化文件大小标签
///
/// 创建条目时计算一次，之后不再重算。
pub fn format_file_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    if bytes < 1024 {
        return format!("{} Bytes", bytes);
    }

    let exponent = ((bytes as f64).ln() / KIB.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len());
    let value = bytes as f64 / KIB.powi(exponent as i32);
    format!("{:.2} {}", value, UNITS[exponent - 1])
}
