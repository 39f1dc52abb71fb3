pub mod units {
    //! 内部定点单位（IU）。与主机 CAD 的整数坐标保持同一比例：
    //! 1 mm = 1_000_000 IU（纳米）。

    pub const IU_PER_MM: i64 = 1_000_000;

    /// 毫米转内部单位。乘以比例因子后向零截断，
    /// 与主机端 `int()` 的取整规则一致，不得改为四舍五入。
    #[inline]
    pub fn from_mm(mm: f64) -> i64 {
        (mm * IU_PER_MM as f64) as i64
    }

    /// 内部单位转毫米，仅用于显示与序列化。
    #[inline]
    pub fn to_mm(iu: i64) -> f64 {
        iu as f64 / IU_PER_MM as f64
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn from_mm_truncates_toward_zero() {
            assert_eq!(from_mm(2.5), 2_500_000);
            assert_eq!(from_mm(0.000_000_9), 0);
            assert_eq!(from_mm(-0.000_000_9), 0);
            assert_eq!(from_mm(-2.5), -2_500_000);
            assert_eq!(from_mm(1.234_567_89), 1_234_567);
        }

        #[test]
        fn to_mm_round_trips_exact_values() {
            assert!((to_mm(52_500_000) - 52.5).abs() < 1e-12);
            assert!((to_mm(from_mm(100.0)) - 100.0).abs() < 1e-12);
        }
    }
}

pub mod geometry {
    use glam::I64Vec2;
    use serde::{Deserialize, Serialize};

    /// 板面坐标点，内部以 `glam::I64Vec2` 表示（定点 IU）。
    /// 坐标系与主机一致：y 轴向下增长，板的上边缘是 min y。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Point(pub I64Vec2);

    impl Point {
        #[inline]
        pub fn new(x: i64, y: i64) -> Self {
            Self(I64Vec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: I64Vec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> i64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> i64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn as_vec(self) -> I64Vec2 {
            self.0
        }
    }

    impl From<I64Vec2> for Point {
        fn from(value: I64Vec2) -> Self {
            Self::from_vec(value)
        }
    }

    /// 板面位移向量。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Vector(pub I64Vec2);

    impl Vector {
        #[inline]
        pub fn new(x: i64, y: i64) -> Self {
            Self(I64Vec2::new(x, y))
        }

        #[inline]
        pub fn from_points(start: Point, end: Point) -> Self {
            Self(end.0 - start.0)
        }

        #[inline]
        pub fn x(self) -> i64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> i64 {
            self.0.y
        }

        /// 向量长度（IU），结果四舍五入到最近整数单位。
        #[inline]
        pub fn length(self) -> i64 {
            let dx = self.0.x as f64;
            let dy = self.0.y as f64;
            (dx * dx + dy * dy).sqrt().round() as i64
        }

        #[inline]
        pub fn as_vec(self) -> I64Vec2 {
            self.0
        }
    }

    impl From<I64Vec2> for Vector {
        fn from(value: I64Vec2) -> Self {
            Self(value)
        }
    }

    /// 轴对齐边界框，用于基板范围与拼板整体范围。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Bounds {
        min: Point,
        max: Point,
    }

    impl Bounds {
        #[inline]
        pub fn new(min: Point, max: Point) -> Self {
            Self { min, max }
        }

        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point::new(i64::MAX, i64::MAX),
                max: Point::new(i64::MIN, i64::MIN),
            }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        #[inline]
        pub fn min(&self) -> Point {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point {
            self.max
        }

        #[inline]
        pub fn width(&self) -> i64 {
            self.max.x() - self.min.x()
        }

        #[inline]
        pub fn height(&self) -> i64 {
            self.max.y() - self.min.y()
        }

        pub fn include_point(&mut self, point: Point) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            self.min = Point::from_vec(self.min.as_vec().min(point.as_vec()));
            self.max = Point::from_vec(self.max.as_vec().max(point.as_vec()));
        }

        pub fn include_bounds(&mut self, other: &Bounds) {
            if other.is_empty() {
                return;
            }
            self.include_point(other.min);
            self.include_point(other.max);
        }

        /// 中心点。整数坐标下取整除，与主机的 `width // 2` 一致。
        #[inline]
        pub fn center(&self) -> Point {
            debug_assert!(!self.is_empty());
            Point::new(
                self.min.x() + self.width() / 2,
                self.min.y() + self.height() / 2,
            )
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn bounds_grow_and_center() {
            let mut bounds = Bounds::empty();
            assert!(bounds.is_empty());

            bounds.include_point(Point::new(0, 0));
            bounds.include_point(Point::new(100, 50));
            assert!(!bounds.is_empty());
            assert_eq!(bounds.width(), 100);
            assert_eq!(bounds.height(), 50);
            assert_eq!(bounds.center(), Point::new(50, 25));

            let mut other = Bounds::empty();
            other.include_point(Point::new(-5, -5));
            bounds.include_bounds(&other);
            assert_eq!(bounds.min(), Point::new(-5, -5));
            assert_eq!(bounds.max(), Point::new(100, 50));
        }

        #[test]
        fn including_empty_bounds_is_a_no_op() {
            let mut bounds = Bounds::empty();
            bounds.include_point(Point::new(1, 2));
            let before = bounds;
            bounds.include_bounds(&Bounds::empty());
            assert_eq!(bounds, before);
        }
    }
}

pub mod board {
    use serde::{Deserialize, Serialize};

    use crate::geometry::{Bounds, Point, Vector};
    use crate::units;

    /// 板层。主机端以字符串名称查询层，这里改为枚举，
    /// 名称取主机 6.x 之后的规范写法。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum Layer {
        #[serde(rename = "F.Cu")]
        FCu,
        #[serde(rename = "B.Cu")]
        BCu,
        #[serde(rename = "F.Silkscreen")]
        FSilk,
        #[serde(rename = "B.Silkscreen")]
        BSilk,
        #[serde(rename = "F.Mask")]
        FMask,
        #[serde(rename = "B.Mask")]
        BMask,
        #[serde(rename = "Edge.Cuts")]
        EdgeCuts,
        #[serde(rename = "Margin")]
        Margin,
        #[serde(rename = "User.Comments")]
        CmtsUser,
        #[serde(rename = "User.Drawings")]
        DwgsUser,
        #[serde(rename = "User.Eco1")]
        Eco1User,
        #[serde(rename = "User.Eco2")]
        Eco2User,
        #[serde(rename = "F.Fab")]
        FFab,
        #[serde(rename = "B.Fab")]
        BFab,
    }

    impl Layer {
        pub fn name(self) -> &'static str {
            match self {
                Layer::FCu => "F.Cu",
                Layer::BCu => "B.Cu",
                Layer::FSilk => "F.Silkscreen",
                Layer::BSilk => "B.Silkscreen",
                Layer::FMask => "F.Mask",
                Layer::BMask => "B.Mask",
                Layer::EdgeCuts => "Edge.Cuts",
                Layer::Margin => "Margin",
                Layer::CmtsUser => "User.Comments",
                Layer::DwgsUser => "User.Drawings",
                Layer::Eco1User => "User.Eco1",
                Layer::Eco2User => "User.Eco2",
                Layer::FFab => "F.Fab",
                Layer::BFab => "B.Fab",
            }
        }

        /// 按规范名称解析层，未知名称返回 None。
        pub fn from_name(name: &str) -> Option<Layer> {
            const ALL: [Layer; 14] = [
                Layer::FCu,
                Layer::BCu,
                Layer::FSilk,
                Layer::BSilk,
                Layer::FMask,
                Layer::BMask,
                Layer::EdgeCuts,
                Layer::Margin,
                Layer::CmtsUser,
                Layer::DwgsUser,
                Layer::Eco1User,
                Layer::Eco2User,
                Layer::FFab,
                Layer::BFab,
            ];
            ALL.into_iter().find(|layer| layer.name() == name)
        }
    }

    /// 文本水平对齐。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum HJustify {
        Left,
        Center,
        Right,
    }

    /// 文本垂直对齐。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum VJustify {
        Top,
        Center,
        Bottom,
    }

    /// 尺寸标注的显示单位。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DimUnits {
        Millimetres,
        Inches,
        Mils,
    }

    impl DimUnits {
        pub fn suffix(self) -> &'static str {
            match self {
                DimUnits::Millimetres => "mm",
                DimUnits::Inches => "in",
                DimUnits::Mils => "mils",
            }
        }

        /// 把 IU 换算为该单位下的数值。
        pub fn value_from_iu(self, iu: i64) -> f64 {
            match self {
                DimUnits::Millimetres => iu as f64 / units::IU_PER_MM as f64,
                DimUnits::Inches => iu as f64 / (25.4 * units::IU_PER_MM as f64),
                DimUnits::Mils => iu as f64 / (0.025_4 * units::IU_PER_MM as f64),
            }
        }
    }

    /// 尺寸标注数字的小数位数。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DimPrecision {
        Whole,
        OneDecimal,
        TwoDecimals,
        ThreeDecimals,
        FourDecimals,
    }

    impl DimPrecision {
        #[inline]
        pub fn decimals(self) -> usize {
            match self {
                DimPrecision::Whole => 0,
                DimPrecision::OneDecimal => 1,
                DimPrecision::TwoDecimals => 2,
                DimPrecision::ThreeDecimals => 3,
                DimPrecision::FourDecimals => 4,
            }
        }

        /// 按小数位数解析，超出支持范围返回 None。
        pub fn from_decimals(decimals: u8) -> Option<DimPrecision> {
            match decimals {
                0 => Some(DimPrecision::Whole),
                1 => Some(DimPrecision::OneDecimal),
                2 => Some(DimPrecision::TwoDecimals),
                3 => Some(DimPrecision::ThreeDecimals),
                4 => Some(DimPrecision::FourDecimals),
                _ => None,
            }
        }
    }

    /// 文本图元。内容允许携带未展开的 `${VAR}` 占位符，
    /// 展开由导出环节负责。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct TextItem {
        pub content: String,
        pub position: Point,
        pub orientation: f64,
        pub width: i64,
        pub height: i64,
        pub thickness: i64,
        pub h_justify: HJustify,
        pub v_justify: VJustify,
        pub layer: Layer,
    }

    /// 对齐尺寸标注。`height` 是尺寸线相对测量段的垂直偏移，
    /// 符号决定画在哪一侧。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct AlignedDimension {
        pub start: Point,
        pub end: Point,
        pub height: i64,
        pub units: DimUnits,
        pub precision: DimPrecision,
        pub layer: Layer,
    }

    impl AlignedDimension {
        /// 测量值（IU），即两端点的欧氏距离。
        #[inline]
        pub fn measurement_iu(&self) -> i64 {
            Vector::from_points(self.start, self.end).length()
        }

        /// 渲染数字标签，例如 "110.0 mm"。
        pub fn format_label(&self) -> String {
            let value = self.units.value_from_iu(self.measurement_iu());
            format!(
                "{value:.prec$} {suffix}",
                prec = self.precision.decimals(),
                suffix = self.units.suffix()
            )
        }
    }

    /// 图形线段（板框、辅助线等）。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct GraphicLine {
        pub start: Point,
        pub end: Point,
        pub width: i64,
        pub layer: Layer,
    }

    /// 图形矩形，用于工艺边等轮廓。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct GraphicRect {
        pub min: Point,
        pub max: Point,
        pub width: i64,
        pub layer: Layer,
    }

    /// 绘图元素的和类型。主机端靠运行时类型判断元素种类，
    /// 这里改为对变体打标签后做模式匹配。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum Drawing {
        Text(TextItem),
        Dimension(AlignedDimension),
        Line(GraphicLine),
        Rect(GraphicRect),
    }

    impl Drawing {
        #[inline]
        pub fn layer(&self) -> Layer {
            match self {
                Drawing::Text(text) => text.layer,
                Drawing::Dimension(dimension) => dimension.layer,
                Drawing::Line(line) => line.layer,
                Drawing::Rect(rect) => rect.layer,
            }
        }

        /// 元素的轴对齐范围，文本退化为锚点。
        pub fn bounds(&self) -> Option<Bounds> {
            let mut bounds = Bounds::empty();
            match self {
                Drawing::Text(text) => {
                    bounds.include_point(text.position);
                }
                Drawing::Dimension(dimension) => {
                    bounds.include_point(dimension.start);
                    bounds.include_point(dimension.end);
                }
                Drawing::Line(line) => {
                    bounds.include_point(line.start);
                    bounds.include_point(line.end);
                }
                Drawing::Rect(rect) => {
                    bounds.include_point(rect.min);
                    bounds.include_point(rect.max);
                }
            }
            if bounds.is_empty() { None } else { Some(bounds) }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DrawingId(u64);

    impl DrawingId {
        #[inline]
        pub fn new(raw: u64) -> Self {
            Self(raw)
        }

        #[inline]
        pub fn get(self) -> u64 {
            self.0
        }
    }

    /// 板对象：持有绘图元素集合并负责其生命周期。
    #[derive(Debug, Default, Clone, Serialize, Deserialize)]
    pub struct Board {
        drawings: Vec<(DrawingId, Drawing)>,
        next_drawing_id: u64,
    }

    impl Board {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_text(&mut self, text: TextItem) -> DrawingId {
            self.add_drawing(Drawing::Text(text))
        }

        pub fn add_dimension(&mut self, dimension: AlignedDimension) -> DrawingId {
            self.add_drawing(Drawing::Dimension(dimension))
        }

        pub fn add_line(&mut self, line: GraphicLine) -> DrawingId {
            self.add_drawing(Drawing::Line(line))
        }

        pub fn add_rect(&mut self, rect: GraphicRect) -> DrawingId {
            self.add_drawing(Drawing::Rect(rect))
        }

        pub fn add_drawing(&mut self, drawing: Drawing) -> DrawingId {
            let id = self.next_id();
            self.drawings.push((id, drawing));
            id
        }

        #[inline]
        pub fn drawing(&self, id: DrawingId) -> Option<&Drawing> {
            self.drawings
                .iter()
                .find_map(|(drawing_id, drawing)| (*drawing_id == id).then_some(drawing))
        }

        #[inline]
        pub fn drawings(&self) -> impl Iterator<Item = &(DrawingId, Drawing)> {
            self.drawings.iter()
        }

        #[inline]
        pub fn drawing_count(&self) -> usize {
            self.drawings.len()
        }

        /// 移除指定元素，返回被移除的元素。
        pub fn remove(&mut self, id: DrawingId) -> Option<Drawing> {
            let index = self
                .drawings
                .iter()
                .position(|(drawing_id, _)| *drawing_id == id)?;
            Some(self.drawings.remove(index).1)
        }

        /// 单遍过滤删除：移除所有满足谓词的元素，返回删除数量。
        /// 删除即时生效，没有撤销。
        pub fn remove_where<F>(&mut self, mut predicate: F) -> usize
        where
            F: FnMut(&Drawing) -> bool,
        {
            let before = self.drawings.len();
            self.drawings.retain(|(_, drawing)| !predicate(drawing));
            before - self.drawings.len()
        }

        pub fn bounds(&self) -> Option<Bounds> {
            let mut bounds = Bounds::empty();
            let mut has = false;
            for (_, drawing) in &self.drawings {
                if let Some(drawing_bounds) = drawing.bounds() {
                    bounds.include_bounds(&drawing_bounds);
                    has = true;
                }
            }
            if has { Some(bounds) } else { None }
        }

        #[inline]
        fn next_id(&mut self) -> DrawingId {
            let id = self.next_drawing_id;
            self.next_drawing_id += 1;
            DrawingId::new(id)
        }
    }

}

pub mod panel {
    use serde::{Deserialize, Serialize};

    use crate::board::{Board, DrawingId, HJustify, Layer, TextItem, VJustify};
    use crate::geometry::{Bounds, Point};

    // 拼板工具给文本的默认外观：1.5 mm 字高、0.3 mm 笔宽。
    const TEXT_SIZE_IU: i64 = 1_500_000;
    const TEXT_THICKNESS_IU: i64 = 300_000;

    /// 边界框上的命名锚点，对应主机端的 tl/tr/bl/br/mt/mb/ml/mr/c。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Anchor {
        TopLeft,
        TopRight,
        BottomLeft,
        BottomRight,
        MiddleTop,
        MiddleBottom,
        MiddleLeft,
        MiddleRight,
        Center,
    }

    impl Anchor {
        /// 在边界框上解析锚点坐标。y 轴向下，顶边是 min y。
        pub fn resolve(self, bounds: &Bounds) -> Point {
            let min = bounds.min();
            let max = bounds.max();
            let mid_x = min.x() + bounds.width() / 2;
            let mid_y = min.y() + bounds.height() / 2;
            match self {
                Anchor::TopLeft => Point::new(min.x(), min.y()),
                Anchor::TopRight => Point::new(max.x(), min.y()),
                Anchor::BottomLeft => Point::new(min.x(), max.y()),
                Anchor::BottomRight => Point::new(max.x(), max.y()),
                Anchor::MiddleTop => Point::new(mid_x, min.y()),
                Anchor::MiddleBottom => Point::new(mid_x, max.y()),
                Anchor::MiddleLeft => Point::new(min.x(), mid_y),
                Anchor::MiddleRight => Point::new(max.x(), mid_y),
                Anchor::Center => Point::new(mid_x, mid_y),
            }
        }
    }

    /// 拼板聚合体：装配完成的板、基板范围与可选的外框范围。
    /// 本 crate 不负责拼板生成，只在其结果上做注记。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Panel {
        board: Board,
        substrate: Bounds,
        frame: Option<Bounds>,
    }

    impl Panel {
        pub fn new(substrate: Bounds) -> Self {
            Self {
                board: Board::new(),
                substrate,
                frame: None,
            }
        }

        pub fn with_board(board: Board, substrate: Bounds, frame: Option<Bounds>) -> Self {
            Self {
                board,
                substrate,
                frame,
            }
        }

        /// 基板（板体加工艺边）的边界框。
        #[inline]
        pub fn substrate_bbox(&self) -> Bounds {
            self.substrate
        }

        /// 拼板整体边界框：基板与外框的并集。
        pub fn panel_bbox(&self) -> Bounds {
            let mut bounds = Bounds::empty();
            bounds.include_bounds(&self.substrate);
            if let Some(frame) = &self.frame {
                bounds.include_bounds(frame);
            }
            bounds
        }

        #[inline]
        pub fn frame_bbox(&self) -> Option<Bounds> {
            self.frame
        }

        #[inline]
        pub fn board(&self) -> &Board {
            &self.board
        }

        #[inline]
        pub fn board_mut(&mut self) -> &mut Board {
            &mut self.board
        }

        /// 以拼板工具的默认外观添加文本：正面丝印层、水平放置、
        /// 垂直居中。
        pub fn add_text(
            &mut self,
            content: impl Into<String>,
            position: Point,
            h_justify: HJustify,
        ) -> DrawingId {
            self.board.add_text(TextItem {
                content: content.into(),
                position,
                orientation: 0.0,
                width: TEXT_SIZE_IU,
                height: TEXT_SIZE_IU,
                thickness: TEXT_THICKNESS_IU,
                h_justify,
                v_justify: VJustify::Center,
                layer: Layer::FSilk,
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::units::from_mm;

        #[test]
        fn anchors_resolve_with_y_down() {
            let mut bounds = Bounds::empty();
            bounds.include_point(Point::new(0, 0));
            bounds.include_point(Point::new(100, 50));

            assert_eq!(Anchor::TopLeft.resolve(&bounds), Point::new(0, 0));
            assert_eq!(Anchor::TopRight.resolve(&bounds), Point::new(100, 0));
            assert_eq!(Anchor::BottomLeft.resolve(&bounds), Point::new(0, 50));
            assert_eq!(Anchor::MiddleBottom.resolve(&bounds), Point::new(50, 50));
            assert_eq!(Anchor::Center.resolve(&bounds), Point::new(50, 25));
        }

        #[test]
        fn panel_bbox_unions_substrate_and_frame() {
            let substrate = Bounds::new(
                Point::new(0, 0),
                Point::new(from_mm(100.0), from_mm(50.0)),
            );
            let frame = Bounds::new(
                Point::new(from_mm(-5.0), from_mm(-5.0)),
                Point::new(from_mm(105.0), from_mm(55.0)),
            );
            let panel = Panel::with_board(Board::new(), substrate, Some(frame));

            assert_eq!(panel.substrate_bbox(), substrate);
            let bbox = panel.panel_bbox();
            assert_eq!(bbox.min(), Point::new(from_mm(-5.0), from_mm(-5.0)));
            assert_eq!(bbox.max(), Point::new(from_mm(105.0), from_mm(55.0)));
        }

        #[test]
        fn add_text_uses_silkscreen_defaults() {
            let substrate = Bounds::new(Point::new(0, 0), Point::new(10, 10));
            let mut panel = Panel::new(substrate);
            let id = panel.add_text("Rev: ${REVISION}", Point::new(5, 5), HJustify::Center);

            match panel.board().drawing(id) {
                Some(crate::board::Drawing::Text(text)) => {
                    assert_eq!(text.content, "Rev: ${REVISION}");
                    assert_eq!(text.layer, Layer::FSilk);
                    assert_eq!(text.h_justify, HJustify::Center);
                    assert_eq!(text.v_justify, VJustify::Center);
                    assert_eq!(text.height, from_mm(1.5));
                    assert_eq!(text.thickness, 300_000); // 0.3 mm
                }
                other => panic!("unexpected drawing lookup result: {other:?}"),
            }
        }
    }
}

pub mod vars {
    //! `${VAR}` 占位符展开。主机端在导出阶段做同样的事，
    //! 这里提供一个等价实现供预览使用。

    use std::collections::HashMap;

    /// 展开文本中的 `${VAR}` 占位符；未知变量原样保留，
    /// 交由更晚的导出环节处理。
    pub fn expand(text: &str, variables: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let name = &after[..end];
                    match variables.get(name) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("${");
                            result.push_str(name);
                            result.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    // 没有闭合括号，剩余部分按字面输出
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
            pairs
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect()
        }

        #[test]
        fn known_tokens_are_replaced() {
            let variables = vars(&[("REVISION", "C2"), ("ISSUE_DATE", "2026-08-23")]);
            assert_eq!(
                expand("Rev: ${REVISION} [${ISSUE_DATE}]", &variables),
                "Rev: C2 [2026-08-23]"
            );
        }

        #[test]
        fn unknown_tokens_survive() {
            let variables = vars(&[("REVISION", "C2")]);
            assert_eq!(
                expand("Rev: ${REVISION} [${ISSUE_DATE}]", &variables),
                "Rev: C2 [${ISSUE_DATE}]"
            );
        }

        #[test]
        fn unterminated_token_is_literal() {
            let variables = vars(&[("REVISION", "C2")]);
            assert_eq!(expand("Rev: ${REVISION", &variables), "Rev: ${REVISION");
        }
    }
}
