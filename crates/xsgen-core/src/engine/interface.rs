//! The lattice physics interface: keeps the reactor's cross-section library current.
//!
//! [`LatticePhysicsInterface`] is driven once per coupled iteration. At the first time
//! node of a cycle it asks the decision engine whether the attached library covers the
//! identifiers the reactor needs, runs the lattice physics jobs for whatever is missing,
//! and attaches the result as a new library. At every other node the library is left
//! untouched.

use super::backend::{LatticeJob, LatticePhysicsBackend};
use super::config::{ConfigError, LatticePhysicsConfig, RunType};
use super::decision::{self, Decision, DecisionReason};
use super::dispatch;
use super::error::EngineError;
use super::grouping::CrossSectionGroups;
use super::progress::{Progress, ProgressReporter};
use crate::core::io::binary::cycle_library_file_name;
use crate::core::models::block::Block;
use crate::core::models::ids::XsId;
use crate::core::models::reactor::Reactor;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// What one call to [`LatticePhysicsInterface::update_xs_library`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub decision: Decision,
    /// A library from an earlier run was attached before deciding.
    pub loaded_existing: bool,
}

impl UpdateOutcome {
    /// The identifiers whose cross sections were generated, if any.
    pub fn regenerated(&self) -> Option<&BTreeSet<XsId>> {
        self.decision.regenerate.then_some(&self.decision.targets)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoupledOutcome {
    /// Not the first time node of the cycle; nothing was evaluated.
    Skipped { time_node: u32 },
    Evaluated {
        /// The library was detached before the decision.
        reset: bool,
        update: UpdateOutcome,
    },
}

impl CoupledOutcome {
    pub fn update(&self) -> Option<&UpdateOutcome> {
        match self {
            Self::Skipped { .. } => None,
            Self::Evaluated { update, .. } => Some(update),
        }
    }
}

pub struct LatticePhysicsInterface {
    config: LatticePhysicsConfig,
    backend: Box<dyn LatticePhysicsBackend>,
    executable: Option<PathBuf>,
    old_xs_ids_and_burnup: BTreeMap<XsId, f64>,
}

impl LatticePhysicsInterface {
    /// Creates the interface and resolves the backend's executable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ExecutableNotFound`] if the interface is enabled and the
    /// executable cannot be resolved.
    pub fn new(
        config: LatticePhysicsConfig,
        backend: Box<dyn LatticePhysicsBackend>,
    ) -> Result<Self, ConfigError> {
        let executable = match backend.executable_path() {
            Ok(path) => {
                info!(
                    backend = backend.name(),
                    "Using lattice physics executable {}",
                    path.display()
                );
                Some(path)
            }
            Err(e) if config.enabled => return Err(e),
            Err(e) => {
                debug!("Lattice physics interface is disabled; ignoring: {}", e);
                None
            }
        };
        Ok(Self {
            config,
            backend,
            executable,
            old_xs_ids_and_burnup: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &LatticePhysicsConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn executable_path(&self) -> Option<&Path> {
        self.executable.as_deref()
    }

    /// The directory holding the executable.
    pub fn executable_root(&self) -> Option<&Path> {
        self.executable.as_deref().and_then(Path::parent)
    }

    /// Burnup (% FIMA) of the representative block at the last successful generation of each identifier.
    pub fn old_xs_ids_and_burnup(&self) -> &BTreeMap<XsId, f64> {
        &self.old_xs_ids_and_burnup
    }

    /// Collects the representative blocks and the identifiers the reactor needs.
    ///
    /// Identifiers are rebuilt from each block's type code and burnup group.
    pub fn blocks_and_xs_ids(
        &self,
        groups: &dyn CrossSectionGroups,
    ) -> Result<(Vec<(XsId, Block)>, BTreeSet<XsId>), EngineError> {
        let mut representatives = Vec::new();
        let mut required = BTreeSet::new();
        for (_, block) in groups.representative_blocks() {
            let xs_id = block.xs_id().map_err(|source| EngineError::InvalidXsId {
                block: block.name.clone(),
                source,
            })?;
            if required.insert(xs_id.clone()) {
                representatives.push((xs_id, block));
            }
        }
        Ok((representatives, required))
    }

    /// Whether generation is requested on `cycle`, honoring `skipCycles`.
    pub fn generation_requested(&self, cycle: u32) -> bool {
        let requested = self.config.gen_xs.is_enabled();
        if requested && cycle < self.config.skip_cycles {
            debug!(
                cycle,
                skip_cycles = self.config.skip_cycles,
                "Generation request ignored on skipped cycle."
            );
            return false;
        }
        requested
    }

    /// Decides whether a new library must be created on `cycle`.
    ///
    /// The coverage rule runs first. If it finds the library complete and a burnup
    /// tolerance is set, identifiers whose burnup drifted past it are regenerated.
    pub fn new_library_should_be_created(
        &self,
        cycle: u32,
        representatives: &[(XsId, Block)],
        required: &BTreeSet<XsId>,
        reactor: &Reactor,
    ) -> Decision {
        let baseline = decision::should_regenerate(
            cycle,
            required,
            reactor.core.lib.get(),
            self.generation_requested(cycle),
        );
        let Some(tolerance) = self.config.burnup_tolerance else {
            return baseline;
        };
        if baseline.reason != DecisionReason::CoverageComplete {
            return baseline;
        }
        let changes =
            decision::stale_by_burnup(representatives, &self.old_xs_ids_and_burnup, tolerance);
        if changes.is_empty() {
            baseline
        } else {
            decision::burnup_decision(cycle, &changes)
        }
    }

    /// Runs the interface for one coupled iteration.
    ///
    /// The library is only evaluated at time node 0. Snapshot runs, or any run with
    /// `resetLibraryOnCoupling`, detach the library first.
    #[instrument(skip_all, fields(cycle = reactor.cycle, node = reactor.time_node, iteration = iteration))]
    pub fn interact_coupled(
        &mut self,
        iteration: u32,
        reactor: &mut Reactor,
        groups: &dyn CrossSectionGroups,
        reporter: &ProgressReporter,
    ) -> Result<CoupledOutcome, EngineError> {
        let reset = self.reset_for_time_node(reactor);
        if reactor.time_node != 0 {
            debug!("Cross sections are only evaluated at time node 0.");
            return Ok(CoupledOutcome::Skipped {
                time_node: reactor.time_node,
            });
        }
        let cycle = reactor.cycle;
        let update = self.update(cycle, reactor, groups, reporter, !reset)?;
        Ok(CoupledOutcome::Evaluated { reset, update })
    }

    /// Evaluates the library at the beginning of a cycle, for drivers without coupled iterations.
    #[instrument(skip_all, fields(cycle = cycle))]
    pub fn interact_boc(
        &mut self,
        cycle: u32,
        reactor: &mut Reactor,
        groups: &dyn CrossSectionGroups,
        reporter: &ProgressReporter,
    ) -> Result<UpdateOutcome, EngineError> {
        let reset = self.reset_for_time_node(reactor);
        self.update(cycle, reactor, groups, reporter, !reset)
    }

    /// Brings the attached library up to date for `cycle`, generating cross sections if needed.
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::ExternalCalculation`] if any lattice physics job fails;
    /// the attached library and the burnup bookkeeping are then left as they were.
    pub fn update_xs_library(
        &mut self,
        cycle: u32,
        reactor: &mut Reactor,
        groups: &dyn CrossSectionGroups,
        reporter: &ProgressReporter,
    ) -> Result<UpdateOutcome, EngineError> {
        self.update(cycle, reactor, groups, reporter, true)
    }

    fn reset_for_time_node(&self, reactor: &mut Reactor) -> bool {
        if reactor.time_node != 0 {
            return false;
        }
        let reset = self.config.run_type == RunType::Snapshots
            || self.config.reset_library_on_coupling;
        if reset && reactor.core.lib.clear().is_some() {
            info!(
                run_type = %self.config.run_type,
                "Detached the cross-section library before re-evaluating it."
            );
        }
        reset
    }

    fn update(
        &mut self,
        cycle: u32,
        reactor: &mut Reactor,
        groups: &dyn CrossSectionGroups,
        reporter: &ProgressReporter,
        read_existing: bool,
    ) -> Result<UpdateOutcome, EngineError> {
        let (representatives, required) = self.blocks_and_xs_ids(groups)?;

        let mut loaded_existing = false;
        if read_existing && reactor.core.lib.is_empty() {
            let existing = self
                .backend
                .read_existing_libraries(cycle)
                .map_err(|source| self.backend_error(source))?;
            if let Some(library) = existing {
                info!(
                    cycle,
                    "Attached existing cross-section library `{}`.",
                    library.name()
                );
                reactor.core.lib.replace(library);
                loaded_existing = true;
            }
        }

        let decision =
            self.new_library_should_be_created(cycle, &representatives, &required, reactor);
        reporter.report(Progress::Message(decision.message.clone()));

        if decision.regenerate {
            self.regenerate(cycle, reactor, &representatives, &decision.targets, reporter)?;
        } else if let Some(library) = reactor.core.lib.get() {
            let missing = library.missing_from(&required);
            if !missing.is_empty() {
                return Err(EngineError::MissingData {
                    missing: missing.into_iter().collect(),
                });
            }
        }

        Ok(UpdateOutcome {
            decision,
            loaded_existing,
        })
    }

    fn regenerate(
        &mut self,
        cycle: u32,
        reactor: &mut Reactor,
        representatives: &[(XsId, Block)],
        targets: &BTreeSet<XsId>,
        reporter: &ProgressReporter,
    ) -> Result<(), EngineError> {
        if self.config.clear_xs {
            self.backend
                .clear()
                .map_err(|source| self.backend_error(source))?;
        }

        let kind = self.config.gen_xs.kind();
        let jobs: Vec<LatticeJob> = representatives
            .iter()
            .filter(|(xs_id, _)| targets.contains(xs_id))
            .map(|(xs_id, block)| LatticeJob::new(cycle, xs_id.clone(), block, kind))
            .collect();

        let generated = dispatch::run_jobs(self.backend.as_ref(), &jobs, reporter)?;

        let library = match reactor.core.lib.get() {
            Some(existing) => existing.merged_with(&generated),
            None => {
                let mut library = generated;
                library.set_name(&cycle_library_file_name(cycle));
                library
            }
        };
        if let Err(source) = self.backend.persist_library(cycle, &library) {
            warn!(cycle, "Generated library could not be stored: {}", source);
            return Err(self.backend_error(source));
        }
        reactor.core.lib.replace(library);

        for (xs_id, block) in representatives {
            if targets.contains(xs_id) {
                self.old_xs_ids_and_burnup
                    .insert(xs_id.clone(), block.percent_bu);
            }
        }
        info!(
            cycle,
            count = jobs.len(),
            "Attached regenerated cross-section library."
        );
        Ok(())
    }

    fn backend_error(&self, source: super::backend::BackendError) -> EngineError {
        EngineError::Backend {
            backend: self.backend.name().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::library::xs_library::{XsData, XsLibrary};
    use crate::core::models::reactor::Core;
    use crate::engine::backend::BackendError;
    use crate::engine::config::{LatticePhysicsConfigBuilder, XsGenRequest, XsKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MockState {
        computed: Mutex<Vec<String>>,
        persisted: Mutex<Vec<(u32, Vec<String>)>>,
        clears: AtomicUsize,
        existing: Mutex<Option<XsLibrary>>,
        fail: Mutex<BTreeSet<String>>,
    }

    struct MockBackend {
        state: Arc<MockState>,
        executable: Option<&'static str>,
    }

    impl LatticePhysicsBackend for MockBackend {
        fn name(&self) -> &str {
            "mock"
        }

        fn executable_path(&self) -> Result<PathBuf, ConfigError> {
            self.executable
                .map(PathBuf::from)
                .ok_or_else(|| ConfigError::ExecutableNotFound {
                    path: "missing".to_string(),
                })
        }

        fn read_existing_libraries(&self, _cycle: u32) -> Result<Option<XsLibrary>, BackendError> {
            Ok(self.state.existing.lock().unwrap().clone())
        }

        fn compute(&self, job: &LatticeJob) -> Result<XsLibrary, BackendError> {
            self.state
                .computed
                .lock()
                .unwrap()
                .push(job.xs_id.to_string());
            if self.state.fail.lock().unwrap().contains(job.xs_id.as_str()) {
                return Err(BackendError::Other("lattice code crashed".to_string()));
            }
            let payload = format!("{}@{}", job.xs_id, job.percent_bu).into_bytes();
            Ok(XsLibrary::new("").with_entry(job.xs_id.clone(), XsData::new(payload)))
        }

        fn clear(&self) -> Result<(), BackendError> {
            self.state.clears.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn persist_library(&self, cycle: u32, library: &XsLibrary) -> Result<(), BackendError> {
            let ids = library.xs_ids().map(|id| id.to_string()).collect();
            self.state.persisted.lock().unwrap().push((cycle, ids));
            Ok(())
        }
    }

    fn id(s: &str) -> XsId {
        s.parse().unwrap()
    }

    fn interface_with(config: LatticePhysicsConfig) -> (LatticePhysicsInterface, Arc<MockState>) {
        let state = Arc::new(MockState::default());
        let backend = MockBackend {
            state: Arc::clone(&state),
            executable: Some("/tmp/fake_path"),
        };
        (
            LatticePhysicsInterface::new(config, Box::new(backend)).unwrap(),
            state,
        )
    }

    fn requested(run_type: RunType) -> LatticePhysicsConfig {
        LatticePhysicsConfigBuilder::new()
            .run_type(run_type)
            .gen_xs(XsGenRequest::EnabledFor(XsKind::Neutron))
            .build()
            .unwrap()
    }

    fn reactor_at(cycle: u32, node: u32, library: Option<XsLibrary>) -> Reactor {
        let mut core = Core::new("core");
        if let Some(library) = library {
            core.lib.replace(library);
        }
        Reactor::new("reactor", core).at(cycle, node)
    }

    fn groups(list: &[(&str, f64)]) -> Vec<(XsId, Block)> {
        list.iter()
            .map(|(s, bu)| {
                let xs_id = id(s);
                let mut block = Block::new(&format!("block-{}", s), xs_id.xs_type());
                block.bu_group = xs_id.bu_group();
                block.percent_bu = *bu;
                (xs_id, block)
            })
            .collect()
    }

    fn library(name: &str, list: &[&str]) -> XsLibrary {
        list.iter().fold(XsLibrary::new(name), |lib, s| {
            lib.with_entry(id(s), XsData::new(vec![0xAA]))
        })
    }

    fn lib_ids(reactor: &Reactor) -> Vec<String> {
        reactor
            .core
            .lib
            .get()
            .map(|lib| lib.xs_ids().map(|id| id.to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn construction_resolves_executable_and_starts_without_bookkeeping() {
        let (interface, _) = interface_with(LatticePhysicsConfig::default());
        assert_eq!(interface.executable_path(), Some(Path::new("/tmp/fake_path")));
        assert_eq!(interface.executable_root(), Some(Path::new("/tmp")));
        assert!(interface.old_xs_ids_and_burnup().is_empty());
        assert_eq!(interface.backend_name(), "mock");
    }

    #[test]
    fn unresolved_executable_fails_only_when_enabled() {
        let backend = || {
            Box::new(MockBackend {
                state: Arc::default(),
                executable: None,
            })
        };
        let err = LatticePhysicsInterface::new(LatticePhysicsConfig::default(), backend())
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::ExecutableNotFound { .. }));

        let disabled = LatticePhysicsConfigBuilder::new().enabled(false).build().unwrap();
        let interface = LatticePhysicsInterface::new(disabled, backend()).unwrap();
        assert_eq!(interface.executable_path(), None);
        assert_eq!(interface.executable_root(), None);
    }

    #[test]
    fn later_time_nodes_never_touch_the_library() {
        let (mut interface, state) = interface_with(requested(RunType::Snapshots));
        let mut reactor = reactor_at(1, 1, Some(library("Nonsense", &[])));
        let sentinel = reactor.core.lib.snapshot().unwrap();

        let outcome = interface
            .interact_coupled(0, &mut reactor, &groups(&[("AA", 1.0)]), &ProgressReporter::new())
            .unwrap();

        assert_eq!(outcome, CoupledOutcome::Skipped { time_node: 1 });
        assert!(reactor.core.lib.holds(&sentinel));
        assert!(state.computed.lock().unwrap().is_empty());
    }

    #[test]
    fn snapshots_detach_the_library_at_time_node_zero() {
        let config = LatticePhysicsConfigBuilder::new()
            .run_type(RunType::Snapshots)
            .build()
            .unwrap();
        let (mut interface, state) = interface_with(config);
        *state.existing.lock().unwrap() = Some(library("ISOTXS-c0", &["AA"]));
        let mut reactor = reactor_at(0, 0, Some(library("Nonsense", &["AA"])));

        let outcome = interface
            .interact_coupled(0, &mut reactor, &groups(&[("AA", 0.0)]), &ProgressReporter::new())
            .unwrap();

        let CoupledOutcome::Evaluated { reset, update } = outcome else {
            panic!("expected an evaluation at node 0");
        };
        assert!(reset);
        assert!(!update.loaded_existing);
        assert_eq!(update.decision.reason, DecisionReason::NoLibraryNoRequest);
        assert_eq!(
            update.decision.message,
            "Cross sections will not be generated on cycle 0."
        );
        assert!(reactor.core.lib.is_empty());
    }

    #[test]
    fn standard_runs_keep_a_complete_library() {
        let (mut interface, state) = interface_with(requested(RunType::Standard));
        let mut reactor = reactor_at(0, 0, Some(library("ISOAA", &["AA", "AB"])));
        let sentinel = reactor.core.lib.snapshot().unwrap();

        let outcome = interface
            .interact_coupled(
                0,
                &mut reactor,
                &groups(&[("AA", 1.0), ("AB", 12.0)]),
                &ProgressReporter::new(),
            )
            .unwrap();

        let update = outcome.update().unwrap();
        assert_eq!(update.decision.reason, DecisionReason::CoverageComplete);
        assert_eq!(update.regenerated(), None);
        assert!(reactor.core.lib.holds(&sentinel));
        assert!(state.computed.lock().unwrap().is_empty());
    }

    #[test]
    fn reset_on_coupling_clears_in_every_run_type() {
        let config = LatticePhysicsConfigBuilder::new()
            .run_type(RunType::Standard)
            .reset_library_on_coupling(true)
            .build()
            .unwrap();
        let (mut interface, _) = interface_with(config);
        let mut reactor = reactor_at(2, 0, Some(library("Nonsense", &["AA"])));

        let outcome = interface
            .interact_coupled(0, &mut reactor, &groups(&[("AA", 1.0)]), &ProgressReporter::new())
            .unwrap();

        assert!(matches!(outcome, CoupledOutcome::Evaluated { reset: true, .. }));
        assert!(reactor.core.lib.is_empty());
    }

    #[test]
    fn missing_ids_are_generated_without_a_request_and_merged() {
        let (mut interface, state) = interface_with(LatticePhysicsConfig::default());
        let mut reactor = reactor_at(1, 0, Some(library("ISOAA", &["AA"])));
        let before = reactor.core.lib.snapshot().unwrap();

        let outcome = interface
            .update_xs_library(
                1,
                &mut reactor,
                &groups(&[("AA", 1.0), ("BA", 2.5)]),
                &ProgressReporter::new(),
            )
            .unwrap();

        assert_eq!(outcome.decision.reason, DecisionReason::MissingForcedRegen);
        assert_eq!(
            outcome.regenerated().unwrap().iter().map(XsId::as_str).collect::<Vec<_>>(),
            vec!["BA"]
        );
        assert_eq!(*state.computed.lock().unwrap(), vec!["BA".to_string()]);
        assert_eq!(lib_ids(&reactor), vec!["AA", "BA"]);
        assert_eq!(reactor.core.lib.get().unwrap().name(), "ISOAA");
        assert_eq!(
            reactor.core.lib.get().unwrap().get(&id("AA")),
            before.get(&id("AA"))
        );
        assert!(!reactor.core.lib.holds(&before));
        assert_eq!(interface.old_xs_ids_and_burnup().get(&id("BA")), Some(&2.5));
        assert_eq!(interface.old_xs_ids_and_burnup().get(&id("AA")), None);
    }

    #[test]
    fn requested_generation_without_library_builds_every_id() {
        let (mut interface, state) = interface_with(requested(RunType::Standard));
        let mut reactor = reactor_at(3, 0, None);

        let outcome = interface
            .interact_coupled(
                0,
                &mut reactor,
                &groups(&[("BA", 4.0), ("AA", 1.0), ("AA", 9.0)]),
                &ProgressReporter::new(),
            )
            .unwrap();

        let update = outcome.update().unwrap();
        assert_eq!(update.decision.reason, DecisionReason::NoLibraryRequested);
        assert_eq!(
            update.decision.message,
            "Cross sections will be generated on cycle 3 for the following XS IDs: ['AA', 'BA']."
        );
        assert_eq!(lib_ids(&reactor), vec!["AA", "BA"]);
        assert_eq!(reactor.core.lib.get().unwrap().name(), "ISOTXS-c3");
        assert_eq!(
            *state.persisted.lock().unwrap(),
            vec![(3, vec!["AA".to_string(), "BA".to_string()])]
        );
        // The first representative of a duplicated identifier is used.
        assert_eq!(interface.old_xs_ids_and_burnup().get(&id("AA")), Some(&1.0));
        assert_eq!(interface.old_xs_ids_and_burnup().len(), 2);
    }

    #[test]
    fn failed_job_publishes_nothing() {
        let (mut interface, state) = interface_with(requested(RunType::Standard));
        state.fail.lock().unwrap().insert("BA".to_string());
        let mut reactor = reactor_at(0, 0, Some(library("Nonsense", &["AA"])));
        let sentinel = reactor.core.lib.snapshot().unwrap();

        let err = interface
            .interact_coupled(
                0,
                &mut reactor,
                &groups(&[("AA", 1.0), ("BA", 1.0), ("CA", 1.0)]),
                &ProgressReporter::new(),
            )
            .unwrap_err();

        match err {
            EngineError::ExternalCalculation { xs_ids, .. } => assert_eq!(xs_ids, vec![id("BA")]),
            other => panic!("expected ExternalCalculation, got {:?}", other),
        }
        assert!(reactor.core.lib.holds(&sentinel));
        assert!(interface.old_xs_ids_and_burnup().is_empty());
        assert!(state.persisted.lock().unwrap().is_empty());
    }

    #[test]
    fn existing_library_on_disk_is_attached_before_deciding() {
        let (mut interface, state) = interface_with(requested(RunType::Standard));
        *state.existing.lock().unwrap() = Some(library("ISOTXS-c2", &["AA"]));
        let mut reactor = reactor_at(2, 0, None);

        let outcome = interface
            .interact_coupled(0, &mut reactor, &groups(&[("AA", 1.0)]), &ProgressReporter::new())
            .unwrap();

        let update = outcome.update().unwrap();
        assert!(update.loaded_existing);
        assert_eq!(update.decision.reason, DecisionReason::CoverageComplete);
        assert_eq!(reactor.core.lib.get().unwrap().name(), "ISOTXS-c2");
        assert!(state.computed.lock().unwrap().is_empty());
    }

    #[test]
    fn skipped_cycles_ignore_the_request() {
        let config = LatticePhysicsConfigBuilder::new()
            .gen_xs(XsGenRequest::EnabledFor(XsKind::NeutronAndGamma))
            .skip_cycles(2)
            .build()
            .unwrap();
        let (mut interface, _) = interface_with(config);
        assert!(!interface.generation_requested(1));
        assert!(interface.generation_requested(2));

        let mut reactor = reactor_at(1, 0, None);
        let outcome = interface
            .update_xs_library(1, &mut reactor, &groups(&[("AA", 1.0)]), &ProgressReporter::new())
            .unwrap();
        assert_eq!(outcome.decision.reason, DecisionReason::NoLibraryNoRequest);
        assert!(reactor.core.lib.is_empty());
    }

    #[test]
    fn burnup_drift_past_tolerance_regenerates_covered_ids() {
        let config = LatticePhysicsConfigBuilder::new()
            .gen_xs(XsGenRequest::EnabledFor(XsKind::Neutron))
            .burnup_tolerance(1.0)
            .clear_xs(true)
            .build()
            .unwrap();
        let (mut interface, state) = interface_with(config);
        let mut reactor = reactor_at(0, 0, None);
        let reporter = ProgressReporter::new();

        interface
            .update_xs_library(0, &mut reactor, &groups(&[("AA", 1.0), ("BA", 1.0)]), &reporter)
            .unwrap();
        let drifted = groups(&[("AA", 1.5), ("BA", 3.0)]);
        let small = interface
            .update_xs_library(1, &mut reactor, &groups(&[("AA", 1.5), ("BA", 1.5)]), &reporter)
            .unwrap();
        assert_eq!(small.decision.reason, DecisionReason::CoverageComplete);

        let outcome = interface
            .update_xs_library(1, &mut reactor, &drifted, &reporter)
            .unwrap();

        assert_eq!(outcome.decision.reason, DecisionReason::BurnupChanged);
        assert_eq!(outcome.regenerated().unwrap().len(), 1);
        assert_eq!(interface.old_xs_ids_and_burnup().get(&id("BA")), Some(&3.0));
        assert_eq!(interface.old_xs_ids_and_burnup().get(&id("AA")), Some(&1.0));
        assert_eq!(state.clears.load(Ordering::SeqCst), 2);
        assert_eq!(
            reactor.core.lib.get().unwrap().get(&id("BA")).unwrap().payload,
            b"BA@3".to_vec()
        );
    }

    #[test]
    fn beginning_of_cycle_evaluation_applies_the_snapshot_reset() {
        let (mut interface, _) = interface_with(requested(RunType::Snapshots));
        let mut reactor = reactor_at(4, 0, Some(library("Nonsense", &["AA"])));

        let outcome = interface
            .interact_boc(4, &mut reactor, &groups(&[("AA", 1.0)]), &ProgressReporter::new())
            .unwrap();

        assert_eq!(outcome.decision.reason, DecisionReason::NoLibraryRequested);
        let lib = reactor.core.lib.get().unwrap();
        assert_eq!(lib.name(), "ISOTXS-c4");
        assert_eq!(lib.get(&id("AA")).unwrap().payload, b"AA@1".to_vec());
    }

    #[test]
    fn invalid_block_type_code_is_reported() {
        let (mut interface, _) = interface_with(LatticePhysicsConfig::default());
        let bad = vec![(id("AA"), Block::new("odd", "A_"))];
        let err = interface
            .update_xs_library(0, &mut reactor_at(0, 0, None), &bad, &ProgressReporter::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidXsId { .. }));
    }
}
