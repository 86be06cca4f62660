use crate::core::io::binary::BinaryLibraryFile;
use crate::core::io::traits::LibraryFile;
use crate::core::library::xs_library::XsLibrary;
use crate::core::models::block::Block;
use crate::core::models::ids::XsId;
use crate::core::models::reactor::{Core, Reactor};
use crate::engine::backend::LatticePhysicsBackend;
use crate::engine::config::{ConfigError, DEFAULT_BU_GROUPS, LatticePhysicsConfig};
use crate::engine::error::EngineError;
use crate::engine::grouping::XsGroupManager;
use crate::engine::interface::{CoupledOutcome, LatticePhysicsInterface};
use crate::engine::progress::{Progress, ProgressReporter};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

pub const CONF_N_CYCLES: &str = "nCycles";
pub const CONF_BURN_STEPS: &str = "burnSteps";
pub const CONF_COUPLING_ITERATIONS: &str = "couplingIterations";

/// Everything needed to drive one simulated run.
#[derive(Debug, Clone)]
pub struct CaseSetup {
    pub name: String,
    pub lattice: LatticePhysicsConfig,
    pub n_cycles: u32,
    /// Depletion steps per cycle; each cycle has `burn_steps + 1` time nodes.
    pub burn_steps: u32,
    pub coupling_iterations: u32,
    pub bu_groups: Vec<f64>,
    pub blocks: Vec<Block>,
    pub initial_library: Option<PathBuf>,
}

#[derive(Default)]
pub struct CaseSetupBuilder {
    name: Option<String>,
    lattice: Option<LatticePhysicsConfig>,
    n_cycles: Option<u32>,
    burn_steps: Option<u32>,
    coupling_iterations: Option<u32>,
    bu_groups: Option<Vec<f64>>,
    blocks: Vec<Block>,
    initial_library: Option<PathBuf>,
}

impl CaseSetupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
    pub fn lattice(mut self, config: LatticePhysicsConfig) -> Self {
        self.lattice = Some(config);
        self
    }
    pub fn n_cycles(mut self, cycles: u32) -> Self {
        self.n_cycles = Some(cycles);
        self
    }
    pub fn burn_steps(mut self, steps: u32) -> Self {
        self.burn_steps = Some(steps);
        self
    }
    pub fn coupling_iterations(mut self, iterations: u32) -> Self {
        self.coupling_iterations = Some(iterations);
        self
    }
    pub fn bu_groups(mut self, bounds: Vec<f64>) -> Self {
        self.bu_groups = Some(bounds);
        self
    }
    pub fn block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }
    pub fn blocks(mut self, blocks: impl IntoIterator<Item = Block>) -> Self {
        self.blocks.extend(blocks);
        self
    }
    pub fn initial_library(mut self, path: Option<PathBuf>) -> Self {
        self.initial_library = path;
        self
    }

    pub fn build(self) -> Result<CaseSetup, ConfigError> {
        if self.blocks.is_empty() {
            return Err(ConfigError::MissingParameter("blocks"));
        }
        let n_cycles = self.n_cycles.unwrap_or(1);
        if n_cycles == 0 {
            return Err(ConfigError::InvalidValue {
                setting: CONF_N_CYCLES,
                reason: "at least one cycle is required".to_string(),
            });
        }
        let coupling_iterations = self.coupling_iterations.unwrap_or(1);
        if coupling_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                setting: CONF_COUPLING_ITERATIONS,
                reason: "at least one coupled iteration is required".to_string(),
            });
        }
        let bu_groups = crate::engine::config::validate_bu_groups(
            &self.bu_groups.unwrap_or_else(|| DEFAULT_BU_GROUPS.to_vec()),
        )?;

        Ok(CaseSetup {
            name: self.name.unwrap_or_else(|| "reactor".to_string()),
            lattice: self.lattice.unwrap_or_default(),
            n_cycles,
            burn_steps: self.burn_steps.unwrap_or(0),
            coupling_iterations,
            bu_groups,
            blocks: self.blocks,
            initial_library: self.initial_library,
        })
    }
}

/// One coupled iteration of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub cycle: u32,
    pub time_node: u32,
    pub iteration: u32,
    pub outcome: CoupledOutcome,
}

impl StepRecord {
    pub fn regenerated(&self) -> usize {
        self.outcome
            .update()
            .and_then(|u| u.regenerated())
            .map_or(0, |ids| ids.len())
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub steps: Vec<StepRecord>,
    pub final_library: Option<Arc<XsLibrary>>,
    pub old_xs_ids_and_burnup: BTreeMap<XsId, f64>,
}

impl RunSummary {
    /// Total number of identifiers generated over the run.
    pub fn regenerations(&self) -> usize {
        self.steps.iter().map(StepRecord::regenerated).sum()
    }
}

/// Drives the lattice physics interface through every cycle, time node and coupled
/// iteration of a case, depleting the blocks after each time node.
#[instrument(skip_all, name = "operate_workflow")]
pub fn run(
    case: &CaseSetup,
    backend: Box<dyn LatticePhysicsBackend>,
    reporter: &ProgressReporter,
) -> Result<RunSummary, EngineError> {
    info!(
        case = %case.name,
        cycles = case.n_cycles,
        nodes = case.burn_steps + 1,
        "Starting run."
    );

    let mut core = Core::new("core");
    for block in &case.blocks {
        core.add_block(block.clone());
    }
    if let Some(path) = &case.initial_library {
        let library = BinaryLibraryFile::read_from_path(path)?;
        info!(
            "Loaded initial library `{}` with {} XS ID(s).",
            library.name(),
            library.len()
        );
        core.lib.replace(library);
    }
    let mut reactor = Reactor::new(&case.name, core);

    let mut groups = XsGroupManager::new(&case.bu_groups)?;
    let mut interface = LatticePhysicsInterface::new(case.lattice.clone(), backend)?;
    let mut steps = Vec::new();

    for cycle in 0..case.n_cycles {
        for node in 0..=case.burn_steps {
            reactor.cycle = cycle;
            reactor.time_node = node;
            reporter.report(Progress::TimeNode { cycle, node });

            if case.lattice.enabled {
                groups.update(&mut reactor.core)?;
                for iteration in 0..case.coupling_iterations {
                    let outcome =
                        interface.interact_coupled(iteration, &mut reactor, &groups, reporter)?;
                    steps.push(StepRecord {
                        cycle,
                        time_node: node,
                        iteration,
                        outcome,
                    });
                }
            }

            reactor.core.deplete();
        }
    }

    let summary = RunSummary {
        steps,
        final_library: reactor.core.lib.snapshot(),
        old_xs_ids_and_burnup: interface.old_xs_ids_and_burnup().clone(),
    };
    info!(
        steps = summary.steps.len(),
        regenerations = summary.regenerations(),
        "Run complete."
    );
    Ok(summary)
}
