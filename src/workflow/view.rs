//! 视图模型 - 纯渲染函数
//!
//! 预览网格和结果网格都是集合状态的纯函数，
//! 这里只产出视图模型，打印/绘制由外层决定。

use crate::models::{ItemId, PageKind, Stage, WorkItem};
use crate::utils::logging::truncate_text;

/// 预览网格里文件名的最大展示长度
const NAME_DISPLAY_LEN: usize = 15;

/// 预览网格
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    /// 集合为空时预览区收起
    pub visible: bool,
    /// 有图片才允许提交
    pub submit_enabled: bool,
    pub tiles: Vec<PreviewTile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTile {
    pub id: ItemId,
    /// 截断后的展示名
    pub name: String,
    pub size_label: String,
    pub image: String,
}

/// 结果网格
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    /// 没有任何条目进入提交阶段时结果区收起
    pub visible: bool,
    pub tiles: Vec<ResultTile>,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultTile {
    /// 已提交，等待后端结果
    Pending { id: ItemId, name: String },
    /// 处理成功
    Done {
        id: ItemId,
        image: String,
        caption: String,
        filename: String,
        can_regenerate: bool,
    },
    /// 处理失败
    Failed { id: ItemId, message: String },
}

/// 渲染预览网格
pub fn render_preview(items: &[WorkItem]) -> PreviewView {
    let tiles: Vec<PreviewTile> = items
        .iter()
        .map(|item| PreviewTile {
            id: item.id,
            name: truncate_text(&item.display_name, NAME_DISPLAY_LEN),
            size_label: item.size_label.clone(),
            image: item.source_data.clone(),
        })
        .collect();

    PreviewView {
        visible: !tiles.is_empty(),
        submit_enabled: items.iter().any(|item| item.stage == Stage::Uploaded),
        tiles,
    }
}

/// 渲染结果网格
///
/// 只有进入过提交阶段的条目才出现在结果区；
/// 重新生成按钮只在生图页的成功条目上出现。
pub fn render_results(page: PageKind, items: &[WorkItem]) -> ResultsView {
    let mut tiles = Vec::new();
    let mut completed = 0;
    let mut failed = 0;

    for item in items {
        match item.stage {
            Stage::Uploaded => {}
            Stage::Submitted => tiles.push(ResultTile::Pending {
                id: item.id,
                name: item.display_name.clone(),
            }),
            Stage::Completed => {
                completed += 1;
                let result = item.result.as_ref();
                tiles.push(ResultTile::Done {
                    id: item.id,
                    image: result.map(|r| r.image.clone()).unwrap_or_default(),
                    caption: result.map(|r| r.text_content.clone()).unwrap_or_default(),
                    filename: result.map(|r| r.filename.clone()).unwrap_or_default(),
                    can_regenerate: page == PageKind::Generate,
                });
            }
            Stage::Failed => {
                failed += 1;
                tiles.push(ResultTile::Failed {
                    id: item.id,
                    message: item
                        .failure
                        .clone()
                        .unwrap_or_else(|| "未知错误".to_string()),
                });
            }
        }
    }

    ResultsView {
        visible: !tiles.is_empty(),
        tiles,
        completed,
        failed,
    }
}
