//! 应用编排 - 编排层
//!
//! ## 职责
//!
//! 1. **初始化**：构建 HTTP 执行器与通知器
//! 2. **页面流程**：每个子命令构造一个页面的控制器/服务并走完整流程
//! 3. **展示**：把视图模型打印成终端输出
//! 4. **确认**：清空/清理这类破坏性操作先问一遍用户
//!
//! 编排层不做业务判断，只做调度和统计输出。

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Subcommand;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::infrastructure::HttpExecutor;
use crate::models::file_source::data_uri_from_base64;
use crate::models::{DiskFileSource, PageKind};
use crate::services::{
    CleanService, HttpBackend, LogNotifier, Notifier, OrganizeService, ProcessingBackend,
    PublishService,
};
use crate::utils::logging;
use crate::workflow::{render_preview, render_results, PreviewView, ResultTile, ResultsView,
    WorkflowController};

/// 子命令
#[derive(Debug, Subcommand)]
pub enum Command {
    /// 生图页：加载待生成图片 + 本地文件，批量 AI 生成
    Generate {
        /// 额外上传的本地图片
        files: Vec<PathBuf>,
        /// 批量完成后对第 N 个条目重新生成（从 0 开始）
        #[arg(long)]
        regenerate: Option<usize>,
    },
    /// P 图页：加载待处理图片 + 本地文件，批量加水印
    Watermark {
        /// 额外上传的本地图片
        files: Vec<PathBuf>,
    },
    /// 整理页：把处理完的图片和文案分配到星期文件夹
    Organize {
        /// 文案，可多次传入，与图片按顺序配对
        #[arg(long = "text")]
        texts: Vec<String>,
        /// 用第一张图片先生成一条 AI 文案，插到文案列表最前面
        #[arg(long)]
        ai: bool,
    },
    /// 发布页：发布某个星期文件夹里的一张图片
    Publish {
        /// 星期文件夹（Monday..Friday）
        weekday: String,
        /// 图片文件名；省略时只列出该文件夹下的图片
        image: Option<String>,
        /// 文案；省略时读取图片同名的 .txt
        #[arg(long)]
        caption: Option<String>,
    },
    /// 清理后端的所有待处理文件夹
    Clean {
        /// 跳过确认
        #[arg(long)]
        yes: bool,
    },
}

/// 应用主结构
pub struct App {
    config: Config,
    executor: Arc<HttpExecutor>,
    notifier: Arc<dyn Notifier>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Self {
        let executor = Arc::new(HttpExecutor::new(&config));
        Self {
            config,
            executor,
            notifier: Arc::new(LogNotifier),
        }
    }

    /// 运行一个子命令
    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Generate { files, regenerate } => self.run_generate(files, regenerate).await,
            Command::Watermark { files } => self.run_watermark(files).await,
            Command::Organize { texts, ai } => self.run_organize(texts, ai).await,
            Command::Publish {
                weekday,
                image,
                caption,
            } => self.run_publish(&weekday, image, caption).await,
            Command::Clean { yes } => self.run_clean(yes).await,
        }
    }

    // ========== 页面流程 ==========

    async fn run_generate(&self, files: Vec<PathBuf>, regenerate: Option<usize>) -> Result<()> {
        let mut controller = self.controller(PageKind::Generate);

        // 待处理列表加载失败不终止流程，还可以继续用本地文件
        if controller.load_pending().await.is_err() {
            warn!("待生成列表不可用，仅使用本地文件");
        }
        self.add_local_files(&mut controller, files).await;

        print_preview(&render_preview(controller.items()));

        logging::log_batch_start(controller.items().len());
        let stats = controller.submit_batch().await?;

        if let Some(index) = regenerate {
            match controller.items().get(index).map(|item| item.id) {
                Some(id) => {
                    // 重试失败不吞掉已有结果，也不终止流程
                    if controller.regenerate_one(id).await.is_err() {
                        warn!("条目 {} 重新生成失败，保留原结果", id);
                    }
                }
                None => warn!("重新生成索引超出范围: {}", index),
            }
        }

        print_results(&render_results(PageKind::Generate, controller.items()));
        logging::print_final_stats(stats.completed, stats.failed, controller.items().len());
        Ok(())
    }

    async fn run_watermark(&self, files: Vec<PathBuf>) -> Result<()> {
        let mut controller = self.controller(PageKind::Watermark);

        if controller.load_pending().await.is_err() {
            warn!("待处理列表不可用，仅使用本地文件");
        }
        self.add_local_files(&mut controller, files).await;

        print_preview(&render_preview(controller.items()));

        logging::log_batch_start(controller.items().len());
        let stats = controller.submit_batch().await?;

        print_results(&render_results(PageKind::Watermark, controller.items()));
        logging::print_final_stats(stats.completed, stats.failed, controller.items().len());
        Ok(())
    }

    async fn run_organize(&self, mut texts: Vec<String>, ai: bool) -> Result<()> {
        let backend = HttpBackend::new(self.executor.clone());
        let service = OrganizeService::new(self.executor.clone());

        info!("📁 正在加载待整理的图片列表...");
        let pending = backend.load_pending(PageKind::Watermark).await?;
        let image_names: Vec<String> = pending.iter().map(|p| p.filename.clone()).collect();
        for (index, name) in image_names.iter().enumerate() {
            info!("  {}. {}", index + 1, name);
        }

        if ai {
            if let Some(first) = pending.first() {
                info!("🤖 正在为 {} 生成 AI 文案...", first.filename);
                let image_data = data_uri_from_base64(&first.filename, &first.data);
                let caption = service.generate_caption(&first.filename, &image_data).await?;
                info!("✓ AI 文案: {}", logging::truncate_text(&caption, 60));
                texts.insert(0, caption);
            }
        }

        let data = service.organize(&image_names, &texts).await?;
        info!(
            "✅ 整理成功！共 {} 个文件 → {:?}",
            data.total_organized, data.weekdays_used
        );
        Ok(())
    }

    async fn run_publish(
        &self,
        weekday: &str,
        image: Option<String>,
        caption: Option<String>,
    ) -> Result<()> {
        let service = PublishService::new(self.executor.clone(), self.config.caption_limit);

        let Some(image_file) = image else {
            // 只列出可发布的图片
            let images = service.weekday_images(weekday).await?;
            if images.is_empty() {
                info!("📂 {} 文件夹暂无图片", weekday);
            } else {
                info!("📂 {} 文件夹下的图片:", weekday);
                for entry in images {
                    info!("  {} ({}MB)", entry.filename, entry.size_mb);
                }
            }
            return Ok(());
        };

        let content = match caption {
            Some(content) => content,
            None => {
                info!("📄 正在加载 {} 对应的文案...", image_file);
                service.caption_for(weekday, &image_file).await?
            }
        };

        info!(
            "📤 正在发布 {}/{}（文案 {} 字）...",
            weekday,
            image_file,
            content.chars().count()
        );
        service.publish(weekday, &image_file, &content).await?;
        info!("✅ 发布成功！");
        Ok(())
    }

    async fn run_clean(&self, yes: bool) -> Result<()> {
        if !yes && !confirm("确定要清理所有待处理文件夹吗？") {
            info!("已取消清理");
            return Ok(());
        }

        let data = CleanService::new(self.executor.clone()).clean().await?;
        info!("🧹 清理完成:");
        info!("  文件总数: {}", data.total_files_cleaned);
        info!("  图片文件: {}", data.total_image_files_cleaned);
        info!("  文案文件: {}", data.total_text_files_cleaned);
        info!("  释放空间: {:.2} MB", data.total_size_cleaned_mb);
        Ok(())
    }

    // ========== 内部辅助 ==========

    fn controller(&self, page: PageKind) -> WorkflowController<HttpBackend> {
        WorkflowController::new(
            page,
            HttpBackend::new(self.executor.clone()),
            self.notifier.clone(),
        )
    }

    /// 打开本地文件并交给控制器；单个文件打不开只警告，不拖垮整批
    async fn add_local_files(
        &self,
        controller: &mut WorkflowController<HttpBackend>,
        files: Vec<PathBuf>,
    ) {
        let mut sources = Vec::new();
        for path in files {
            match DiskFileSource::open(&path).await {
                Ok(source) => sources.push(source),
                Err(e) => warn!("{}", e),
            }
        }
        if !sources.is_empty() {
            let added = controller.add_from_files(sources).await;
            info!("✓ 已添加 {} 张本地图片", added);
        }
    }
}

/// 终端确认
fn confirm(prompt: &str) -> bool {
    print!("{} (y/N) ", prompt);
    let _ = std::io::stdout().flush();
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

/// 打印预览网格
fn print_preview(view: &PreviewView) {
    if !view.visible {
        return;
    }
    info!("\n🖼️ 预览 ({} 张):", view.tiles.len());
    for tile in &view.tiles {
        info!("  {} {} ({})", tile.id, tile.name, tile.size_label);
    }
}

/// 打印结果网格
fn print_results(view: &ResultsView) {
    if !view.visible {
        return;
    }
    info!("\n📋 处理结果:");
    for tile in &view.tiles {
        match tile {
            ResultTile::Pending { id, name } => info!("  ⏳ {} {} 处理中", id, name),
            ResultTile::Done {
                id,
                filename,
                caption,
                ..
            } => {
                if caption.is_empty() {
                    info!("  ✓ {} {}", id, filename);
                } else {
                    info!(
                        "  ✓ {} {} | {}",
                        id,
                        filename,
                        logging::truncate_text(caption, 40)
                    );
                }
            }
            ResultTile::Failed { id, message } => info!("  ❌ {} {}", id, message),
        }
    }
}
