//! Fixed-order execution of the cost modules for one scenario.

use tracing::debug;

use super::inputs::ScenarioContext;
use super::modules::management::BOS_SUBTOTAL;
use super::modules::{
    Collection, CostModule, Development, Erection, Foundation, GridConnection, Management,
    ModuleError, OutputMap, SitePreparation, Substation,
};
use crate::error::PipelineError;

/// Plant value including overheads, written after the last stage.
pub const PROJECT_VALUE: &str = "project_value_usd";

/// Runs the direct cost modules, then the overhead module, against one context.
///
/// Holds trait objects so a stage can be swapped for a stub in tests; the
/// order itself never changes at run time.
pub struct Manager {
    direct: Vec<Box<dyn CostModule>>,
    overhead: Box<dyn CostModule>,
}

impl Manager {
    /// Creates a manager from an explicit stage list.
    ///
    /// # Arguments
    ///
    /// * `direct` - Direct cost modules, run in the given order
    /// * `overhead` - Module priced on the direct subtotal, run last
    pub fn new(direct: Vec<Box<dyn CostModule>>, overhead: Box<dyn CostModule>) -> Self {
        Self { direct, overhead }
    }

    /// The standard eight-stage pipeline.
    pub fn standard() -> Self {
        Self::new(
            vec![
                Box::new(Development),
                Box::new(SitePreparation),
                Box::new(Foundation),
                Box::new(Erection),
                Box::new(Collection),
                Box::new(Substation),
                Box::new(GridConnection),
            ],
            Box::new(Management),
        )
    }

    /// Stage names in execution order.
    pub fn stages(&self) -> Vec<&'static str> {
        self.direct
            .iter()
            .map(|m| m.name())
            .chain(std::iter::once(self.overhead.name()))
            .collect()
    }

    /// Executes every stage and returns the shared output map.
    ///
    /// Callers are expected to skip scenarios whose error map is non-empty;
    /// this method does not look at it.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Module` when a stage fails and
    /// `PipelineError::MissingOutput` when a stage leaves a declared output unwritten.
    pub fn execute(&self, ctx: &ScenarioContext) -> Result<OutputMap, PipelineError> {
        let mut out = OutputMap::new();

        // 1. Direct costs
        for module in &self.direct {
            run_stage(module.as_ref(), ctx, &mut out)?;
        }

        // 2. Subtotal for the overhead stage
        let subtotal: f64 = self
            .direct
            .iter()
            .filter_map(|m| out.get(m.total_key()))
            .sum();
        out.insert(BOS_SUBTOTAL.to_string(), subtotal);

        // 3. Overheads and plant value
        run_stage(self.overhead.as_ref(), ctx, &mut out)?;
        let management = out
            .get(self.overhead.total_key())
            .copied()
            .unwrap_or_default();
        out.insert(PROJECT_VALUE.to_string(), subtotal + management);

        Ok(out)
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::standard()
    }
}

fn run_stage(
    module: &dyn CostModule,
    ctx: &ScenarioContext,
    out: &mut OutputMap,
) -> Result<(), PipelineError> {
    let fail = |source| PipelineError::Module {
        module: module.name(),
        project: ctx.project_id.clone(),
        source,
    };

    if let Some(key) = module
        .required_inputs()
        .iter()
        .find(|k| ctx.number(k).is_none())
    {
        return Err(fail(ModuleError::MissingInput(*key)));
    }

    debug!(project_id = %ctx.project_id, module = module.name(), "running cost module");
    module.run(ctx, out).map_err(fail)?;

    if let Some(missing) = module.outputs().iter().find(|k| !out.contains_key(**k)) {
        return Err(PipelineError::MissingOutput {
            key: (*missing).to_string(),
            project: ctx.project_id.clone(),
        });
    }
    Ok(())
}
