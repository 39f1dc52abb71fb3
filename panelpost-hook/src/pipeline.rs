use panelpost_core::panel::Panel;

use crate::annotate::{
    AnnotateSettings, edge_dimensions, stamp_revision, sweep_dimensions,
};

/// 单个钩子的执行结果。
#[derive(Debug, Clone)]
pub struct HookResponse {
    pub hook: &'static str,
    pub success: bool,
    pub message: Option<String>,
}

impl HookResponse {
    pub fn ok(hook: &'static str, message: impl Into<String>) -> Self {
        Self {
            hook,
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn err(hook: &'static str, message: impl Into<String>) -> Self {
        Self {
            hook,
            success: false,
            message: Some(message.into()),
        }
    }
}

pub trait PanelHook: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, context: &mut HookContext<'_>) -> HookResponse;
}

pub struct HookContext<'a> {
    pub panel: &'a mut Panel,
    pub settings: &'a AnnotateSettings,
}

/// 后处理流水线：按注册顺序执行钩子，遇到第一处失败即停止。
pub struct HookPipeline {
    hooks: Vec<Box<dyn PanelHook>>,
}

impl HookPipeline {
    /// 空流水线，由调用方自行注册钩子。
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// 标准流水线：版本标注 → 杂散尺寸清理 → 外形尺寸线。
    pub fn standard() -> Self {
        let mut pipeline = Self::new();
        pipeline.register(RevisionStampHook);
        pipeline.register(DimensionSweepHook);
        pipeline.register(EdgeDimensionHook);
        pipeline
    }

    pub fn register<H: PanelHook + 'static>(&mut self, hook: H) {
        self.hooks.push(Box::new(hook));
    }

    pub fn run_all(&self, context: &mut HookContext<'_>) -> Vec<HookResponse> {
        let mut responses = Vec::with_capacity(self.hooks.len());
        for hook in &self.hooks {
            let response = hook.apply(context);
            let failed = !response.success;
            responses.push(response);
            if failed {
                break;
            }
        }
        responses
    }

    pub fn available_hooks(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.hooks.iter().map(|hook| hook.name())
    }
}

impl Default for HookPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

struct RevisionStampHook;

impl PanelHook for RevisionStampHook {
    fn name(&self) -> &'static str {
        "revision_stamp"
    }

    fn apply(&self, context: &mut HookContext<'_>) -> HookResponse {
        match stamp_revision(context.panel, &context.settings.stamp) {
            Ok(id) => HookResponse::ok(
                self.name(),
                format!("已添加版本标注文本 (id={})", id.get()),
            ),
            Err(err) => HookResponse::err(self.name(), err.to_string()),
        }
    }
}

struct DimensionSweepHook;

impl PanelHook for DimensionSweepHook {
    fn name(&self) -> &'static str {
        "dimension_sweep"
    }

    fn apply(&self, context: &mut HookContext<'_>) -> HookResponse {
        let removed = sweep_dimensions(context.panel, &context.settings.sweep);
        HookResponse::ok(self.name(), format!("已移除 {removed} 个杂散尺寸标注"))
    }
}

struct EdgeDimensionHook;

impl PanelHook for EdgeDimensionHook {
    fn name(&self) -> &'static str {
        "edge_dimensions"
    }

    fn apply(&self, context: &mut HookContext<'_>) -> HookResponse {
        match edge_dimensions(context.panel, &context.settings.edge_dims) {
            Ok((top, left)) => HookResponse::ok(
                self.name(),
                format!("已添加外形尺寸线 (top={}, left={})", top.get(), left.get()),
            ),
            Err(err) => HookResponse::err(self.name(), err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_panel;
    use panelpost_core::geometry::Bounds;
    use panelpost_core::panel::Panel;

    #[test]
    fn standard_pipeline_runs_hooks_in_order() {
        let pipeline = HookPipeline::standard();
        let names: Vec<_> = pipeline.available_hooks().collect();
        assert_eq!(
            names,
            vec!["revision_stamp", "dimension_sweep", "edge_dimensions"]
        );

        let mut panel = demo_panel();
        let settings = AnnotateSettings::default();
        let mut context = HookContext {
            panel: &mut panel,
            settings: &settings,
        };
        let responses = pipeline.run_all(&mut context);
        assert_eq!(responses.len(), 3);
        assert!(responses.iter().all(|response| response.success));
    }

    #[test]
    fn pipeline_stops_at_first_failure() {
        let pipeline = HookPipeline::standard();
        let mut panel = Panel::new(Bounds::empty());
        let settings = AnnotateSettings::default();
        let mut context = HookContext {
            panel: &mut panel,
            settings: &settings,
        };

        let responses = pipeline.run_all(&mut context);
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].hook, "revision_stamp");
        assert!(!responses[0].success);
    }
}
