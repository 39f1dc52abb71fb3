use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 应用配置的根结构。
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub stamp: StampConfig,
    #[serde(default)]
    pub dimensions: DimensionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            stamp: StampConfig::default(),
            dimensions: DimensionConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 自动发现配置文件：优先读取环境变量 `PANELPOST_CONFIG`，
    /// 否则寻找 `./config/default.toml`。若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os("PANELPOST_CONFIG") {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 版本标注配置。`${REVISION}`/`${ISSUE_DATE}` 占位符由
/// 导出环节展开，这里原样保留。
#[derive(Debug, Clone, Deserialize)]
pub struct StampConfig {
    #[serde(default = "StampConfig::default_text")]
    pub text: String,
    #[serde(default = "StampConfig::default_offset_mm")]
    pub offset_mm: f64,
    #[serde(default = "StampConfig::default_justify")]
    pub justify: String,
}

impl StampConfig {
    fn default_text() -> String {
        "Rev: ${REVISION} [${ISSUE_DATE}]".to_string()
    }

    fn default_offset_mm() -> f64 {
        2.5
    }

    fn default_justify() -> String {
        "center".to_string()
    }
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            text: Self::default_text(),
            offset_mm: Self::default_offset_mm(),
            justify: Self::default_justify(),
        }
    }
}

/// 外形尺寸线与杂散标注清理共用的配置。
#[derive(Debug, Clone, Deserialize)]
pub struct DimensionConfig {
    #[serde(default = "DimensionConfig::default_layer")]
    pub layer: String,
    #[serde(default = "DimensionConfig::default_offset_mm")]
    pub offset_mm: f64,
    #[serde(default = "DimensionConfig::default_precision")]
    pub precision: u8,
    #[serde(default = "DimensionConfig::default_units")]
    pub units: String,
}

impl DimensionConfig {
    fn default_layer() -> String {
        "User.Comments".to_string()
    }

    fn default_offset_mm() -> f64 {
        2.5
    }

    fn default_precision() -> u8 {
        1
    }

    fn default_units() -> String {
        "mm".to_string()
    }
}

impl Default for DimensionConfig {
    fn default() -> Self {
        Self {
            layer: Self::default_layer(),
            offset_mm: Self::default_offset_mm(),
            precision: Self::default_precision(),
            units: Self::default_units(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}
