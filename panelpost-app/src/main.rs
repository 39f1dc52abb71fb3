use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use panelpost_config::{AppConfig, ConfigError};
use panelpost_core::board::{DimPrecision, DimUnits, Drawing, HJustify, Layer};
use panelpost_core::panel::Panel;
use panelpost_core::units::{from_mm, to_mm};
use panelpost_core::vars;
use panelpost_hook::annotate::{AnnotateSettings, EdgeDimSettings, StampSettings, SweepSettings};
use panelpost_hook::demo::demo_panel;
use panelpost_hook::pipeline::{HookContext, HookPipeline};
use panelpost_io::{JsonFacade, PanelLoader, PanelSaver};

fn main() {
    let mut args = std::env::args().skip(1);
    let mut panel_path: Option<PathBuf> = None;
    let mut out_path: Option<PathBuf> = None;
    let mut config_override: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--panel" => {
                let Some(path) = args.next() else {
                    eprintln!("`--panel` 需要提供拼板描述文件路径");
                    std::process::exit(1);
                };
                panel_path = Some(PathBuf::from(path));
            }
            "--out" => {
                let Some(path) = args.next() else {
                    eprintln!("`--out` 需要提供输出文件路径");
                    std::process::exit(1);
                };
                out_path = Some(PathBuf::from(path));
            }
            "--config" => {
                let Some(path) = args.next() else {
                    eprintln!("`--config` 需要提供配置文件路径");
                    std::process::exit(1);
                };
                config_override = Some(PathBuf::from(path));
            }
            other => {
                eprintln!("未知参数：{other}");
                std::process::exit(1);
            }
        }
    }

    let config = load_configuration(config_override);
    init_logging(&config);
    info!("启动拼板后处理");

    let settings = match build_settings(&config) {
        Ok(settings) => settings,
        Err(message) => {
            error!("配置无效：{message}");
            std::process::exit(1);
        }
    };

    let mut panel = load_panel(panel_path);

    let pipeline = HookPipeline::standard();
    let mut context = HookContext {
        panel: &mut panel,
        settings: &settings,
    };
    let responses = pipeline.run_all(&mut context);
    let mut failed = false;
    for response in &responses {
        match &response.message {
            Some(message) if response.success => println!("[{}] {message}", response.hook),
            Some(message) => {
                error!(hook = response.hook, "钩子执行失败：{message}");
                failed = true;
            }
            None => {}
        }
    }
    if failed {
        std::process::exit(1);
    }

    print_summary(&panel, &settings);

    if let Some(path) = out_path {
        let saver = JsonFacade::new();
        if let Err(err) = saver.save(&panel, &path) {
            error!(path = %path.display(), error = %err, "保存注记结果失败");
            std::process::exit(1);
        }
        println!("注记结果已写入：{}", path.display());
    }
}

fn load_panel(path: Option<PathBuf>) -> Panel {
    match path {
        Some(path) => {
            let loader = JsonFacade::new();
            match loader.load(&path) {
                Ok(panel) => {
                    info!(path = %path.display(), "从描述文件加载拼板成功");
                    panel
                }
                Err(err) => {
                    error!(path = %path.display(), error = %err, "加载拼板描述失败");
                    std::process::exit(1);
                }
            }
        }
        None => {
            info!("未指定拼板描述，使用内置演示拼板");
            demo_panel()
        }
    }
}

fn build_settings(config: &AppConfig) -> Result<AnnotateSettings, String> {
    let h_justify = match config.stamp.justify.as_str() {
        "left" => HJustify::Left,
        "center" => HJustify::Center,
        "right" => HJustify::Right,
        other => return Err(format!("未知的文本对齐方式：{other}")),
    };
    let layer = Layer::from_name(&config.dimensions.layer)
        .ok_or_else(|| format!("未知的板层名称：{}", config.dimensions.layer))?;
    let precision = DimPrecision::from_decimals(config.dimensions.precision)
        .ok_or_else(|| format!("不支持的小数位数：{}", config.dimensions.precision))?;
    let units = match config.dimensions.units.as_str() {
        "mm" => DimUnits::Millimetres,
        "in" => DimUnits::Inches,
        "mils" => DimUnits::Mils,
        other => return Err(format!("未知的尺寸单位：{other}")),
    };

    Ok(AnnotateSettings {
        stamp: StampSettings {
            text: config.stamp.text.clone(),
            offset: from_mm(config.stamp.offset_mm),
            h_justify,
        },
        sweep: SweepSettings { layer },
        edge_dims: EdgeDimSettings {
            layer,
            offset: from_mm(config.dimensions.offset_mm),
            units,
            precision,
        },
    })
}

fn print_summary(panel: &Panel, settings: &AnnotateSettings) {
    let mut texts = 0usize;
    let mut dimensions = 0usize;
    let mut graphics = 0usize;
    for (_, drawing) in panel.board().drawings() {
        match drawing {
            Drawing::Text(_) => texts += 1,
            Drawing::Dimension(_) => dimensions += 1,
            Drawing::Line(_) | Drawing::Rect(_) => graphics += 1,
        }
    }
    info!(texts, dimensions, graphics, "拼板注记统计");

    println!("拼板后处理摘要：");
    let substrate = panel.substrate_bbox();
    let bbox = panel.panel_bbox();
    println!(
        "  基板范围：({:.2}, {:.2}) - ({:.2}, {:.2}) mm",
        to_mm(substrate.min().x()),
        to_mm(substrate.min().y()),
        to_mm(substrate.max().x()),
        to_mm(substrate.max().y())
    );
    println!(
        "  拼板范围：({:.2}, {:.2}) - ({:.2}, {:.2}) mm",
        to_mm(bbox.min().x()),
        to_mm(bbox.min().y()),
        to_mm(bbox.max().x()),
        to_mm(bbox.max().y())
    );
    println!("  文本 {texts} 个，尺寸标注 {dimensions} 个，图形 {graphics} 个");

    // 预览版本文本：占位符由导出环节展开，这里用环境变量模拟
    let variables = stamp_variables();
    let preview = vars::expand(&settings.stamp.text, &variables);
    println!("  版本标注预览：{preview}");

    println!("  尺寸标注：");
    for (id, drawing) in panel.board().drawings() {
        if let Drawing::Dimension(dimension) = drawing {
            println!(
                "    - #{} [{}] {} (偏移 {:.2} mm)",
                id.get(),
                dimension.layer.name(),
                dimension.format_label(),
                to_mm(dimension.height)
            );
        }
    }
}

fn stamp_variables() -> HashMap<String, String> {
    let mut variables = HashMap::new();
    if let Ok(revision) = std::env::var("PANELPOST_REVISION") {
        variables.insert("REVISION".to_string(), revision);
    }
    if let Ok(date) = std::env::var("PANELPOST_ISSUE_DATE") {
        variables.insert("ISSUE_DATE".to_string(), date);
    }
    variables
}

fn load_configuration(override_path: Option<PathBuf>) -> AppConfig {
    match override_path {
        Some(path) => AppConfig::from_file(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "加载指定配置失败，使用默认配置");
            AppConfig::default()
        }),
        None => match AppConfig::discover() {
            Ok(cfg) => cfg,
            Err(err) => {
                match &err {
                    ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
                        warn!(path = %path.display(), error = %err, "加载默认配置失败，使用内建默认值");
                    }
                    ConfigError::Context { .. } => {
                        warn!(error = %err, "加载默认配置失败，使用内建默认值");
                    }
                }
                AppConfig::default()
            }
        },
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
