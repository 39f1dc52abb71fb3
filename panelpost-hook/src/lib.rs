pub mod pipeline;

pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum HookError {
        #[error("panel substrate bounding box is empty")]
        EmptySubstrate,
        #[error("panel bounding box is empty")]
        EmptyPanel,
    }
}

pub mod annotate {
    //! 拼板后处理的三个步骤：版本标注、杂散尺寸清理、外形尺寸线。
    //! 步骤严格顺序执行，任一失败即中止，不做恢复。

    use tracing::debug;

    use panelpost_core::board::{
        AlignedDimension, DimPrecision, DimUnits, Drawing, DrawingId, HJustify, Layer,
    };
    use panelpost_core::geometry::Vector;
    use panelpost_core::panel::{Anchor, Panel};
    use panelpost_core::units::from_mm;

    use crate::errors::HookError;

    /// 版本标注设置。偏移沿 +y 方向施加，把文本推到基板
    /// 下缘之外的底部工艺边上。
    #[derive(Debug, Clone)]
    pub struct StampSettings {
        pub text: String,
        pub offset: i64,
        pub h_justify: HJustify,
    }

    impl Default for StampSettings {
        fn default() -> Self {
            Self {
                text: "Rev: ${REVISION} [${ISSUE_DATE}]".to_string(),
                offset: from_mm(2.5),
                h_justify: HJustify::Center,
            }
        }
    }

    /// 杂散尺寸清理设置。
    #[derive(Debug, Clone)]
    pub struct SweepSettings {
        pub layer: Layer,
    }

    impl Default for SweepSettings {
        fn default() -> Self {
            Self {
                layer: Layer::CmtsUser,
            }
        }
    }

    /// 拼板外形尺寸线设置。`offset` 取绝对值后由各条尺寸线
    /// 决定符号：顶边用负号画在拼板上方，左边用正号画在左侧。
    #[derive(Debug, Clone)]
    pub struct EdgeDimSettings {
        pub layer: Layer,
        pub offset: i64,
        pub units: DimUnits,
        pub precision: DimPrecision,
    }

    impl Default for EdgeDimSettings {
        fn default() -> Self {
            Self {
                layer: Layer::CmtsUser,
                offset: from_mm(2.5),
                units: DimUnits::Millimetres,
                precision: DimPrecision::OneDecimal,
            }
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct AnnotateSettings {
        pub stamp: StampSettings,
        pub sweep: SweepSettings,
        pub edge_dims: EdgeDimSettings,
    }

    /// 一次完整后处理的结果。
    #[derive(Debug, Clone, Copy)]
    pub struct AnnotateReport {
        pub stamp: DrawingId,
        pub removed_dimensions: usize,
        pub top_dimension: DrawingId,
        pub left_dimension: DrawingId,
    }

    /// 步骤 A：在基板边界框的底边中点沿 +y 偏移处放置版本文本。
    /// 文本内容保留 `${REVISION}`/`${ISSUE_DATE}` 占位符。
    pub fn stamp_revision(
        panel: &mut Panel,
        settings: &StampSettings,
    ) -> Result<DrawingId, HookError> {
        let substrate = panel.substrate_bbox();
        if substrate.is_empty() {
            return Err(HookError::EmptySubstrate);
        }
        let position = Anchor::MiddleBottom
            .resolve(&substrate)
            .translate(Vector::new(0, settings.offset));
        let id = panel.add_text(settings.text.clone(), position, settings.h_justify);
        debug!(
            id = id.get(),
            x = position.x(),
            y = position.y(),
            "已添加版本标注文本"
        );
        Ok(id)
    }

    /// 步骤 B：单遍删除目标层上的全部尺寸标注，其余层和其余
    /// 种类的元素不受影响。返回删除数量。
    pub fn sweep_dimensions(panel: &mut Panel, settings: &SweepSettings) -> usize {
        let layer = settings.layer;
        let removed = panel.board_mut().remove_where(|drawing| {
            matches!(drawing, Drawing::Dimension(dimension) if dimension.layer == layer)
        });
        debug!(removed, layer = layer.name(), "已清理杂散尺寸标注");
        removed
    }

    /// 步骤 C：沿拼板整体边界框的顶边与左边各画一条对齐尺寸线。
    /// 顶边从左上角到右上角，偏移取负（画在拼板外侧上方）；
    /// 左边从左上角到左下角，偏移取正（画在拼板外侧左方）。
    pub fn edge_dimensions(
        panel: &mut Panel,
        settings: &EdgeDimSettings,
    ) -> Result<(DrawingId, DrawingId), HookError> {
        let bbox = panel.panel_bbox();
        if bbox.is_empty() {
            return Err(HookError::EmptyPanel);
        }
        let tl = Anchor::TopLeft.resolve(&bbox);
        let tr = Anchor::TopRight.resolve(&bbox);
        let bl = Anchor::BottomLeft.resolve(&bbox);
        let offset = settings.offset.abs();

        let top = panel.board_mut().add_dimension(AlignedDimension {
            start: tl,
            end: tr,
            height: -offset,
            units: settings.units,
            precision: settings.precision,
            layer: settings.layer,
        });
        let left = panel.board_mut().add_dimension(AlignedDimension {
            start: tl,
            end: bl,
            height: offset,
            units: settings.units,
            precision: settings.precision,
            layer: settings.layer,
        });
        debug!(
            top = top.get(),
            left = left.get(),
            "已添加拼板外形尺寸线"
        );
        Ok((top, left))
    }

    /// 按固定顺序执行 A→B→C，第一处错误直接上抛。
    /// 注意：该流程不是幂等的——每次执行都会新增一条版本文本；
    /// 尺寸线则先被步骤 B 清掉再重画，数量保持稳定。
    pub fn annotate_panel(
        panel: &mut Panel,
        settings: &AnnotateSettings,
    ) -> Result<AnnotateReport, HookError> {
        let stamp = stamp_revision(panel, &settings.stamp)?;
        let removed_dimensions = sweep_dimensions(panel, &settings.sweep);
        let (top_dimension, left_dimension) = edge_dimensions(panel, &settings.edge_dims)?;
        Ok(AnnotateReport {
            stamp,
            removed_dimensions,
            top_dimension,
            left_dimension,
        })
    }

}

pub mod demo {
    //! 供 CLI 与测试使用的内置示例拼板：两块板体、四周工艺边、
    //! 丝印标签，以及两条来自原始单板的杂散尺寸标注。

    use tracing::debug;

    use panelpost_core::board::{
        AlignedDimension, Board, DimPrecision, DimUnits, GraphicRect, HJustify, Layer,
    };
    use panelpost_core::geometry::{Bounds, Point};
    use panelpost_core::panel::Panel;
    use panelpost_core::units::from_mm;

    fn mm_point(x: f64, y: f64) -> Point {
        Point::new(from_mm(x), from_mm(y))
    }

    pub fn demo_panel() -> Panel {
        let substrate = Bounds::new(mm_point(0.0, 0.0), mm_point(100.0, 50.0));
        let frame = Bounds::new(mm_point(-5.0, -5.0), mm_point(105.0, 55.0));

        let mut board = Board::new();
        let outline_width = from_mm(0.1);
        board.add_rect(GraphicRect {
            min: frame.min(),
            max: frame.max(),
            width: outline_width,
            layer: Layer::EdgeCuts,
        });
        board.add_rect(GraphicRect {
            min: mm_point(0.0, 0.0),
            max: mm_point(47.5, 50.0),
            width: outline_width,
            layer: Layer::EdgeCuts,
        });
        board.add_rect(GraphicRect {
            min: mm_point(52.5, 0.0),
            max: mm_point(100.0, 50.0),
            width: outline_width,
            layer: Layer::EdgeCuts,
        });

        // 单板设计里留下的审查用尺寸，拼板后属于杂散标注
        board.add_dimension(AlignedDimension {
            start: mm_point(0.0, 0.0),
            end: mm_point(47.5, 0.0),
            height: from_mm(-1.5),
            units: DimUnits::Millimetres,
            precision: DimPrecision::TwoDecimals,
            layer: Layer::CmtsUser,
        });
        board.add_dimension(AlignedDimension {
            start: mm_point(52.5, 0.0),
            end: mm_point(52.5, 50.0),
            height: from_mm(1.5),
            units: DimUnits::Millimetres,
            precision: DimPrecision::TwoDecimals,
            layer: Layer::CmtsUser,
        });
        // 制造图纸层的尺寸不归后处理清理
        board.add_dimension(AlignedDimension {
            start: mm_point(0.0, 50.0),
            end: mm_point(100.0, 50.0),
            height: from_mm(2.0),
            units: DimUnits::Millimetres,
            precision: DimPrecision::OneDecimal,
            layer: Layer::DwgsUser,
        });

        let mut panel = Panel::with_board(board, substrate, Some(frame));
        panel.add_text("PNL-DEMO", mm_point(50.0, 25.0), HJustify::Center);

        debug!(
            drawings = panel.board().drawing_count(),
            "已构建演示拼板"
        );
        panel
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use panelpost_core::board::Drawing;

        #[test]
        fn demo_panel_carries_stray_dimensions() {
            let panel = demo_panel();
            let stray = panel
                .board()
                .drawings()
                .filter(|(_, drawing)| {
                    matches!(drawing, Drawing::Dimension(dim) if dim.layer == Layer::CmtsUser)
                })
                .count();
            assert_eq!(stray, 2);
            assert!(!panel.substrate_bbox().is_empty());
            assert!(!panel.panel_bbox().is_empty());
        }
    }
}
