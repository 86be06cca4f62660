use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;
use xsgen::core::models::block::Block;
use xsgen::engine::config::{
    self as core_config, ExecutableConfig, LatticePhysicsConfigBuilder, RunType, XsGenRequest,
};
use xsgen::workflows::operate::{CaseSetup, CaseSetupBuilder};

const DEFAULT_WORKING_DIRECTORY: &str = "lattice-physics";

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialSettings {
    #[serde(rename = "runType")]
    run_type: Option<String>,
    #[serde(rename = "genXS")]
    gen_xs: Option<String>,
    #[serde(rename = "skipCycles")]
    skip_cycles: Option<u32>,
    #[serde(rename = "tolerateBurnupChange")]
    tolerate_burnup_change: Option<f64>,
    #[serde(rename = "clearXS")]
    clear_xs: Option<bool>,
    #[serde(rename = "resetLibraryOnCoupling")]
    reset_library_on_coupling: Option<bool>,
    #[serde(rename = "nCycles")]
    n_cycles: Option<u32>,
    #[serde(rename = "burnSteps")]
    burn_steps: Option<u32>,
    #[serde(rename = "couplingIterations")]
    coupling_iterations: Option<u32>,
    #[serde(rename = "buGroups")]
    bu_groups: Option<Vec<f64>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialLatticePhysics {
    executable: Option<PathBuf>,
    #[serde(rename = "working-directory")]
    working_directory: Option<PathBuf>,
    enabled: Option<bool>,
    parallel: Option<bool>,
    #[serde(rename = "initial-library")]
    initial_library: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct PartialBlock {
    name: String,
    #[serde(rename = "xs-type")]
    xs_type: String,
    #[serde(rename = "percent-bu", default)]
    percent_bu: f64,
    #[serde(rename = "burnup-rate", default)]
    burnup_rate: f64,
}

impl From<PartialBlock> for Block {
    fn from(p: PartialBlock) -> Self {
        Block::new(&p.name, &p.xs_type)
            .with_burnup(p.percent_bu)
            .with_burnup_rate(p.burnup_rate)
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialCaseConfig {
    name: Option<String>,
    settings: Option<PartialSettings>,
    #[serde(rename = "lattice-physics")]
    lattice_physics: Option<PartialLatticePhysics>,
    #[serde(default)]
    blocks: Vec<PartialBlock>,
}

/// A fully resolved case: the workflow input plus the backend settings.
#[derive(Debug, Clone)]
pub struct CaseConfig {
    pub setup: CaseSetup,
    pub executable: ExecutableConfig,
    pub parallel: bool,
}

impl PartialCaseConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading case from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies CLI overrides and resolves relative paths against `base_dir`, the
    /// directory of the case file.
    pub fn merge_with_cli(mut self, args: &RunArgs, base_dir: &Path) -> Result<CaseConfig> {
        self.apply_set_values(&args.set_values)?;

        let settings = self.settings.take().unwrap_or_default();
        let lattice = self.lattice_physics.take().unwrap_or_default();
        let config_err = |e: core_config::ConfigError| CliError::Config(e.to_string());

        let mut builder = LatticePhysicsConfigBuilder::new()
            .enabled(lattice.enabled.unwrap_or(true))
            .clear_xs(settings.clear_xs.unwrap_or(false))
            .reset_library_on_coupling(settings.reset_library_on_coupling.unwrap_or(false))
            .skip_cycles(settings.skip_cycles.unwrap_or(0))
            .burnup_tolerance(settings.tolerate_burnup_change.unwrap_or(0.0));
        if let Some(run_type) = &settings.run_type {
            builder = builder.run_type(RunType::from_str(run_type).map_err(config_err)?);
        }
        if let Some(gen_xs) = args.gen_xs.as_ref().or(settings.gen_xs.as_ref()) {
            builder = builder.gen_xs(XsGenRequest::from_str(gen_xs).map_err(config_err)?);
        }
        let lattice_config = builder.build().map_err(config_err)?;

        // A disabled interface never resolves its executable, so an empty path stands in.
        let executable = match args.executable.clone().or(lattice.executable) {
            Some(path) => path,
            None if !lattice_config.enabled => PathBuf::new(),
            None => {
                return Err(CliError::Config(
                    "`lattice-physics.executable` is required in the case file or via --executable."
                        .to_string(),
                ));
            }
        };
        let working_directory = args
            .working_directory
            .clone()
            .or(lattice.working_directory)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKING_DIRECTORY));

        let setup = CaseSetupBuilder::new()
            .name(self.name.as_deref().unwrap_or("reactor"))
            .lattice(lattice_config)
            .n_cycles(settings.n_cycles.unwrap_or(1))
            .burn_steps(settings.burn_steps.unwrap_or(0))
            .coupling_iterations(settings.coupling_iterations.unwrap_or(1))
            .bu_groups(
                settings
                    .bu_groups
                    .unwrap_or_else(|| core_config::DEFAULT_BU_GROUPS.to_vec()),
            )
            .blocks(self.blocks.into_iter().map(Block::from))
            .initial_library(lattice.initial_library.map(|p| resolve_path(base_dir, p)))
            .build()
            .map_err(config_err)?;

        Ok(CaseConfig {
            setup,
            executable: ExecutableConfig {
                executable: resolve_executable_path(base_dir, executable),
                working_directory: resolve_path(base_dir, working_directory),
            },
            parallel: lattice.parallel.unwrap_or(true),
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let settings = self.settings.get_or_insert_with(Default::default);

            match key {
                "runType" => settings.run_type = Some(value_str.to_string()),
                "genXS" => settings.gen_xs = Some(value_str.to_string()),
                "skipCycles" => settings.skip_cycles = Some(parse_value(key, value_str)?),
                "tolerateBurnupChange" => {
                    settings.tolerate_burnup_change = Some(parse_value(key, value_str)?)
                }
                "clearXS" => settings.clear_xs = Some(parse_value(key, value_str)?),
                "resetLibraryOnCoupling" => {
                    settings.reset_library_on_coupling = Some(parse_value(key, value_str)?)
                }
                "nCycles" => settings.n_cycles = Some(parse_value(key, value_str)?),
                "burnSteps" => settings.burn_steps = Some(parse_value(key, value_str)?),
                "couplingIterations" => {
                    settings.coupling_iterations = Some(parse_value(key, value_str)?)
                }
                "buGroups" => {
                    settings.bu_groups = Some(
                        value_str
                            .split(',')
                            .map(|v| parse_value(key, v.trim()))
                            .collect::<Result<Vec<f64>>>()?,
                    )
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: '{}'", key, value))
    })
}

fn resolve_path(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

/// Bare executable names stay as given so they are looked up on `PATH`.
fn resolve_executable_path(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.components().count() > 1 {
        resolve_path(base_dir, path)
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use xsgen::engine::config::XsKind;

    const CASE: &str = r#"
name = "demo-core"

[settings]
runType = "Equilibrium"
genXS = "Neutron"
skipCycles = 1
nCycles = 3
burnSteps = 2
buGroups = [5.0, 100.0]

[lattice-physics]
executable = "bin/lattice.sh"
initial-library = "ISOTXS-c0"
parallel = false

[[blocks]]
name = "fuel-1"
xs-type = "A"
percent-bu = 1.5
burnup-rate = 0.5

[[blocks]]
name = "reflector"
xs-type = "R"
"#;

    fn run_args(config: &Path, extra: &[&str]) -> RunArgs {
        let mut args = vec!["xsgen", "run", "-c", config.to_str().unwrap()];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Run(args) => args,
            _ => panic!("Expected 'run' subcommand"),
        }
    }

    fn write_case(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("case.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn case_file_is_loaded_and_paths_are_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_case(dir.path(), CASE);
        let args = run_args(&path, &[]);

        let case = PartialCaseConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args, dir.path())
            .unwrap();

        let setup = &case.setup;
        assert_eq!(setup.name, "demo-core");
        assert_eq!(setup.lattice.run_type, RunType::Equilibrium);
        assert_eq!(setup.lattice.gen_xs, XsGenRequest::EnabledFor(XsKind::Neutron));
        assert_eq!(setup.lattice.skip_cycles, 1);
        assert_eq!(setup.lattice.burnup_tolerance, None);
        assert_eq!((setup.n_cycles, setup.burn_steps, setup.coupling_iterations), (3, 2, 1));
        assert_eq!(setup.bu_groups, vec![5.0, 100.0]);
        assert_eq!(setup.blocks.len(), 2);
        assert_eq!(setup.blocks[0].percent_bu, 1.5);
        assert_eq!(setup.blocks[1].burnup_rate, 0.0);
        assert_eq!(setup.initial_library, Some(dir.path().join("ISOTXS-c0")));
        assert_eq!(case.executable.executable, dir.path().join("bin/lattice.sh"));
        assert_eq!(
            case.executable.working_directory,
            dir.path().join(DEFAULT_WORKING_DIRECTORY)
        );
        assert!(!case.parallel);
    }

    #[test]
    fn cli_arguments_and_set_values_override_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_case(dir.path(), CASE);
        let args = run_args(
            &path,
            &[
                "--executable",
                "lattice-code",
                "--gen-xs",
                "Neutron and Gamma",
                "-S",
                "nCycles=5",
                "-S",
                "tolerateBurnupChange=0.25",
                "-S",
                "buGroups=10, 50, 100",
            ],
        );

        let case = PartialCaseConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args, dir.path())
            .unwrap();

        assert_eq!(case.executable.executable, PathBuf::from("lattice-code"));
        assert_eq!(
            case.setup.lattice.gen_xs,
            XsGenRequest::EnabledFor(XsKind::NeutronAndGamma)
        );
        assert_eq!(case.setup.n_cycles, 5);
        assert_eq!(case.setup.lattice.burnup_tolerance, Some(0.25));
        assert_eq!(case.setup.bu_groups, vec![10.0, 50.0, 100.0]);
    }

    #[test]
    fn invalid_option_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_case(dir.path(), &CASE.replace("Equilibrium", "Snapshot"));
        let args = run_args(&path, &[]);

        let err = PartialCaseConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args, dir.path())
            .unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("runType")));

        let args = run_args(&write_case(dir.path(), CASE), &["-S", "genXS=Gamma"]);
        let err = PartialCaseConfig::from_toml(CASE)
            .unwrap()
            .merge_with_cli(&args, dir.path())
            .unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("genXS")));
    }

    #[test]
    fn unknown_fields_and_keys_are_rejected() {
        assert!(PartialCaseConfig::from_toml("[settings]\nrunTypo = \"Standard\"\n").is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = write_case(dir.path(), CASE);
        for bad in ["nCycles", "unknownKey=1", "skipCycles=-1"] {
            let args = run_args(&path, &["-S", bad]);
            let result = PartialCaseConfig::from_file(&path)
                .unwrap()
                .merge_with_cli(&args, dir.path());
            assert!(matches!(result, Err(CliError::Config(_))), "{}", bad);
        }
    }

    #[test]
    fn case_without_blocks_or_executable_is_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_case(dir.path(), "[lattice-physics]\nexecutable = \"code\"\n");
        let err = PartialCaseConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&run_args(&path, &[]), dir.path())
            .unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("blocks")));

        let path = write_case(dir.path(), "[[blocks]]\nname = \"f\"\nxs-type = \"A\"\n");
        let err = PartialCaseConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&run_args(&path, &[]), dir.path())
            .unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("executable")));
    }

    #[test]
    fn disabled_interface_does_not_need_an_executable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_case(
            dir.path(),
            "[lattice-physics]\nenabled = false\n\n[[blocks]]\nname = \"f\"\nxs-type = \"A\"\n",
        );

        let case = PartialCaseConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&run_args(&path, &[]), dir.path())
            .unwrap();

        assert!(!case.setup.lattice.enabled);
        assert_eq!(case.executable.executable, PathBuf::new());
        assert_eq!(case.setup.blocks.len(), 1);
    }
}
