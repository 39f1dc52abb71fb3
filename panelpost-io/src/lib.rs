//! 拼板描述文件的读写。磁盘格式以毫米为单位，加载时按
//! 定点比例换算为内部 IU，保存时换算回毫米。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use panelpost_core::board::{
    AlignedDimension, Board, DimPrecision, DimUnits, Drawing, GraphicLine, GraphicRect, HJustify,
    Layer, TextItem, VJustify,
};
use panelpost_core::geometry::{Bounds, Point};
use panelpost_core::panel::Panel;
use panelpost_core::units::{from_mm, to_mm};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse panel description {path:?}: {source}")]
    ParseError {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid panel description: {0}")]
    InvalidPanel(String),
}

pub trait PanelLoader {
    fn load(&self, path: &Path) -> Result<Panel, IoError>;
}

pub trait PanelSaver {
    fn save(&self, panel: &Panel, path: &Path) -> Result<(), IoError>;
}

/// JSON 拼板描述的读写门面。
pub struct JsonFacade;

impl JsonFacade {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelLoader for JsonFacade {
    fn load(&self, path: &Path) -> Result<Panel, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let file: PanelFile =
            serde_json::from_str(&data).map_err(|source| IoError::ParseError {
                path: path.to_path_buf(),
                source,
            })?;
        file.into_panel()
    }
}

impl PanelSaver for JsonFacade {
    fn save(&self, panel: &Panel, path: &Path) -> Result<(), IoError> {
        let file = PanelFile::from_panel(panel);
        let data = serde_json::to_string_pretty(&file).map_err(|source| IoError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, data).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// 磁盘上的拼板描述。坐标与长度均为毫米浮点数。
#[derive(Debug, Serialize, Deserialize)]
struct PanelFile {
    substrate: BoundsSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    frame: Option<BoundsSpec>,
    #[serde(default)]
    drawings: Vec<DrawingSpec>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BoundsSpec {
    min: [f64; 2],
    max: [f64; 2],
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum DrawingSpec {
    Text {
        content: String,
        position: [f64; 2],
        #[serde(default)]
        orientation: f64,
        #[serde(default = "default_text_size_mm")]
        width_mm: f64,
        #[serde(default = "default_text_size_mm")]
        height_mm: f64,
        #[serde(default = "default_text_thickness_mm")]
        thickness_mm: f64,
        #[serde(default = "default_h_justify")]
        h_justify: HJustify,
        #[serde(default = "default_v_justify")]
        v_justify: VJustify,
        layer: Layer,
    },
    Dimension {
        start: [f64; 2],
        end: [f64; 2],
        height_mm: f64,
        #[serde(default = "default_dim_units")]
        units: DimUnits,
        #[serde(default = "default_dim_precision")]
        precision: DimPrecision,
        layer: Layer,
    },
    Line {
        start: [f64; 2],
        end: [f64; 2],
        width_mm: f64,
        layer: Layer,
    },
    Rect {
        min: [f64; 2],
        max: [f64; 2],
        width_mm: f64,
        layer: Layer,
    },
}

fn default_text_size_mm() -> f64 {
    1.5
}

fn default_text_thickness_mm() -> f64 {
    0.3
}

fn default_h_justify() -> HJustify {
    HJustify::Left
}

fn default_v_justify() -> VJustify {
    VJustify::Center
}

fn default_dim_units() -> DimUnits {
    DimUnits::Millimetres
}

fn default_dim_precision() -> DimPrecision {
    DimPrecision::OneDecimal
}

fn point_from_mm(pair: [f64; 2]) -> Point {
    Point::new(from_mm(pair[0]), from_mm(pair[1]))
}

fn point_to_mm(point: Point) -> [f64; 2] {
    [to_mm(point.x()), to_mm(point.y())]
}

impl BoundsSpec {
    fn into_bounds(self, what: &str) -> Result<Bounds, IoError> {
        let min = point_from_mm(self.min);
        let max = point_from_mm(self.max);
        if min.x() > max.x() || min.y() > max.y() {
            return Err(IoError::InvalidPanel(format!(
                "{what} bounding box is degenerate: min={:?} max={:?}",
                self.min, self.max
            )));
        }
        Ok(Bounds::new(min, max))
    }

    fn from_bounds(bounds: &Bounds) -> Self {
        Self {
            min: point_to_mm(bounds.min()),
            max: point_to_mm(bounds.max()),
        }
    }
}

impl DrawingSpec {
    fn into_drawing(self) -> Drawing {
        match self {
            DrawingSpec::Text {
                content,
                position,
                orientation,
                width_mm,
                height_mm,
                thickness_mm,
                h_justify,
                v_justify,
                layer,
            } => Drawing::Text(TextItem {
                content,
                position: point_from_mm(position),
                orientation,
                width: from_mm(width_mm),
                height: from_mm(height_mm),
                thickness: from_mm(thickness_mm),
                h_justify,
                v_justify,
                layer,
            }),
            DrawingSpec::Dimension {
                start,
                end,
                height_mm,
                units,
                precision,
                layer,
            } => Drawing::Dimension(AlignedDimension {
                start: point_from_mm(start),
                end: point_from_mm(end),
                height: from_mm(height_mm),
                units,
                precision,
                layer,
            }),
            DrawingSpec::Line {
                start,
                end,
                width_mm,
                layer,
            } => Drawing::Line(GraphicLine {
                start: point_from_mm(start),
                end: point_from_mm(end),
                width: from_mm(width_mm),
                layer,
            }),
            DrawingSpec::Rect {
                min,
                max,
                width_mm,
                layer,
            } => Drawing::Rect(GraphicRect {
                min: point_from_mm(min),
                max: point_from_mm(max),
                width: from_mm(width_mm),
                layer,
            }),
        }
    }

    fn from_drawing(drawing: &Drawing) -> Self {
        match drawing {
            Drawing::Text(text) => DrawingSpec::Text {
                content: text.content.clone(),
                position: point_to_mm(text.position),
                orientation: text.orientation,
                width_mm: to_mm(text.width),
                height_mm: to_mm(text.height),
                thickness_mm: to_mm(text.thickness),
                h_justify: text.h_justify,
                v_justify: text.v_justify,
                layer: text.layer,
            },
            Drawing::Dimension(dimension) => DrawingSpec::Dimension {
                start: point_to_mm(dimension.start),
                end: point_to_mm(dimension.end),
                height_mm: to_mm(dimension.height),
                units: dimension.units,
                precision: dimension.precision,
                layer: dimension.layer,
            },
            Drawing::Line(line) => DrawingSpec::Line {
                start: point_to_mm(line.start),
                end: point_to_mm(line.end),
                width_mm: to_mm(line.width),
                layer: line.layer,
            },
            Drawing::Rect(rect) => DrawingSpec::Rect {
                min: point_to_mm(rect.min),
                max: point_to_mm(rect.max),
                width_mm: to_mm(rect.width),
                layer: rect.layer,
            },
        }
    }
}

impl PanelFile {
    fn into_panel(self) -> Result<Panel, IoError> {
        let substrate = self.substrate.into_bounds("substrate")?;
        let frame = match self.frame {
            Some(spec) => Some(spec.into_bounds("frame")?),
            None => None,
        };
        let mut board = Board::new();
        for spec in self.drawings {
            board.add_drawing(spec.into_drawing());
        }
        Ok(Panel::with_board(board, substrate, frame))
    }

    fn from_panel(panel: &Panel) -> Self {
        Self {
            substrate: BoundsSpec::from_bounds(&panel.substrate_bbox()),
            frame: panel
                .frame_bbox()
                .as_ref()
                .map(BoundsSpec::from_bounds),
            drawings: panel
                .board()
                .drawings()
                .map(|(_, drawing)| DrawingSpec::from_drawing(drawing))
                .collect(),
        }
    }
}
