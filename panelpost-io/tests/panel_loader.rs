use std::io::Write;

use panelpost_core::board::{
    AlignedDimension, Board, DimPrecision, DimUnits, Drawing, HJustify, Layer, TextItem, VJustify,
};
use panelpost_core::geometry::{Bounds, Point};
use panelpost_core::panel::Panel;
use panelpost_core::units::from_mm;
use panelpost_io::{IoError, JsonFacade, PanelLoader, PanelSaver};

fn write_temp(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(json.as_bytes()).expect("write fixture");
    file
}

#[test]
fn load_basic_panel_description() {
    let file = write_temp(
        r#"{
            "substrate": { "min": [0.0, 0.0], "max": [100.0, 50.0] },
            "frame": { "min": [-5.0, -5.0], "max": [105.0, 55.0] },
            "drawings": [
                {
                    "kind": "text",
                    "content": "PNL-A",
                    "position": [50.0, 25.0],
                    "h_justify": "center",
                    "layer": "F.Silkscreen"
                },
                {
                    "kind": "dimension",
                    "start": [0.0, 0.0],
                    "end": [47.5, 0.0],
                    "height_mm": -1.5,
                    "precision": "two_decimals",
                    "layer": "User.Comments"
                },
                {
                    "kind": "line",
                    "start": [0.0, 0.0],
                    "end": [100.0, 0.0],
                    "width_mm": 0.1,
                    "layer": "Edge.Cuts"
                }
            ]
        }"#,
    );

    let panel = JsonFacade::new().load(file.path()).expect("读取拼板描述失败");

    let substrate = panel.substrate_bbox();
    assert_eq!(substrate.min(), Point::new(0, 0));
    assert_eq!(substrate.max(), Point::new(from_mm(100.0), from_mm(50.0)));
    let bbox = panel.panel_bbox();
    assert_eq!(bbox.min(), Point::new(from_mm(-5.0), from_mm(-5.0)));

    assert_eq!(panel.board().drawing_count(), 3);

    let mut texts = panel.board().drawings().filter_map(|(_, drawing)| match drawing {
        Drawing::Text(text) => Some(text),
        _ => None,
    });
    let text = texts.next().expect("未找到文本元素");
    assert!(texts.next().is_none(), "期望仅有一个文本元素");
    assert_eq!(text.content, "PNL-A");
    assert_eq!(text.h_justify, HJustify::Center);
    assert_eq!(text.v_justify, VJustify::Center);
    // 未给出的字段落到默认外观
    assert_eq!(text.width, from_mm(1.5));
    assert_eq!(text.thickness, from_mm(0.3));
    assert_eq!(text.layer, Layer::FSilk);

    let mut dims = panel.board().drawings().filter_map(|(_, drawing)| match drawing {
        Drawing::Dimension(dimension) => Some(dimension),
        _ => None,
    });
    let dimension = dims.next().expect("未找到尺寸标注");
    assert_eq!(dimension.start, Point::new(0, 0));
    assert_eq!(dimension.end, Point::new(from_mm(47.5), 0));
    assert_eq!(dimension.height, from_mm(-1.5));
    assert_eq!(dimension.units, DimUnits::Millimetres);
    assert_eq!(dimension.precision, DimPrecision::TwoDecimals);
    assert_eq!(dimension.layer, Layer::CmtsUser);
}

#[test]
fn degenerate_substrate_is_rejected() {
    let file = write_temp(
        r#"{ "substrate": { "min": [10.0, 0.0], "max": [0.0, 50.0] } }"#,
    );

    let err = JsonFacade::new().load(file.path()).unwrap_err();
    assert!(matches!(err, IoError::InvalidPanel(_)));
}

#[test]
fn unknown_layer_name_is_a_parse_error() {
    let file = write_temp(
        r#"{
            "substrate": { "min": [0.0, 0.0], "max": [10.0, 10.0] },
            "drawings": [
                {
                    "kind": "line",
                    "start": [0.0, 0.0],
                    "end": [1.0, 0.0],
                    "width_mm": 0.1,
                    "layer": "Comments"
                }
            ]
        }"#,
    );

    let err = JsonFacade::new().load(file.path()).unwrap_err();
    assert!(matches!(err, IoError::ParseError { .. }));
}

#[test]
fn save_then_load_preserves_the_panel() {
    let mut board = Board::new();
    board.add_dimension(AlignedDimension {
        start: Point::new(from_mm(-5.0), from_mm(-5.0)),
        end: Point::new(from_mm(105.0), from_mm(-5.0)),
        height: from_mm(-2.5),
        units: DimUnits::Millimetres,
        precision: DimPrecision::OneDecimal,
        layer: Layer::CmtsUser,
    });
    // 线宽与笔宽取二进制可精确表示的毫米值，避免定点截断
    // 在往返换算中漂移
    board.add_text(TextItem {
        content: "Rev: ${REVISION}".to_string(),
        position: Point::new(from_mm(50.0), from_mm(52.5)),
        orientation: 0.0,
        width: from_mm(1.5),
        height: from_mm(1.5),
        thickness: from_mm(0.25),
        h_justify: HJustify::Center,
        v_justify: VJustify::Center,
        layer: Layer::FSilk,
    });
    let substrate = Bounds::new(Point::new(0, 0), Point::new(from_mm(100.0), from_mm(50.0)));
    let frame = Bounds::new(
        Point::new(from_mm(-5.0), from_mm(-5.0)),
        Point::new(from_mm(105.0), from_mm(55.0)),
    );
    let panel = Panel::with_board(board, substrate, Some(frame));

    let file = tempfile::NamedTempFile::new().expect("create temp file");
    let facade = JsonFacade::new();
    facade.save(&panel, file.path()).expect("保存拼板描述失败");
    let loaded = facade.load(file.path()).expect("重新读取失败");

    assert_eq!(loaded.substrate_bbox(), panel.substrate_bbox());
    assert_eq!(loaded.frame_bbox(), panel.frame_bbox());
    assert_eq!(loaded.board().drawing_count(), panel.board().drawing_count());

    let originals: Vec<_> = panel.board().drawings().map(|(_, d)| d.clone()).collect();
    let round_tripped: Vec<_> = loaded.board().drawings().map(|(_, d)| d.clone()).collect();
    assert_eq!(originals, round_tripped);
}
