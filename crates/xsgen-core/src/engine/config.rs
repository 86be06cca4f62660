use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const CONF_RUN_TYPE: &str = "runType";
pub const CONF_GEN_XS: &str = "genXS";
pub const CONF_SKIP_CYCLES: &str = "skipCycles";
pub const CONF_TOLERATE_BURNUP_CHANGE: &str = "tolerateBurnupChange";
pub const CONF_CLEAR_XS: &str = "clearXS";
pub const CONF_RESET_LIBRARY_ON_COUPLING: &str = "resetLibraryOnCoupling";
pub const CONF_BU_GROUPS: &str = "buGroups";

pub const DEFAULT_BU_GROUPS: [f64; 4] = [10.0, 20.0, 30.0, 100.0];

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value '{value}' for setting `{setting}`; expected one of {options:?}")]
    InvalidOption {
        setting: &'static str,
        value: String,
        options: &'static [&'static str],
    },

    #[error("Invalid value for setting `{setting}`: {reason}")]
    InvalidValue { setting: &'static str, reason: String },

    #[error("Lattice physics executable could not be resolved: {path}")]
    ExecutableNotFound { path: String },
}

/// The kind of run being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunType {
    #[default]
    Standard,
    Equilibrium,
    /// Snapshot analyses reload reactor states from earlier runs.
    Snapshots,
}

impl RunType {
    pub const OPTIONS: &'static [&'static str] = &["Standard", "Equilibrium", "Snapshots"];
}

impl FromStr for RunType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Standard" => Ok(Self::Standard),
            "Equilibrium" => Ok(Self::Equilibrium),
            "Snapshots" => Ok(Self::Snapshots),
            other => Err(ConfigError::InvalidOption {
                setting: CONF_RUN_TYPE,
                value: other.to_string(),
                options: Self::OPTIONS,
            }),
        }
    }
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Standard => "Standard",
            Self::Equilibrium => "Equilibrium",
            Self::Snapshots => "Snapshots",
        };
        f.write_str(s)
    }
}

/// Which particle cross sections a generation request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XsKind {
    Neutron,
    NeutronAndGamma,
}

impl XsKind {
    pub fn includes_gamma(self) -> bool {
        matches!(self, Self::NeutronAndGamma)
    }

    pub fn as_setting(self) -> &'static str {
        match self {
            Self::Neutron => "Neutron",
            Self::NeutronAndGamma => "Neutron and Gamma",
        }
    }
}

/// The `genXS` setting: whether cross-section generation is explicitly requested.
///
/// A disabled request does not forbid generation. Missing identifiers still force it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XsGenRequest {
    #[default]
    Disabled,
    EnabledFor(XsKind),
}

impl XsGenRequest {
    pub const OPTIONS: &'static [&'static str] = &["", "Neutron", "Neutron and Gamma"];

    pub fn is_enabled(self) -> bool {
        matches!(self, Self::EnabledFor(_))
    }

    /// The kinds to generate. A forced generation under a disabled request is neutron-only.
    pub fn kind(self) -> XsKind {
        match self {
            Self::EnabledFor(kind) => kind,
            Self::Disabled => XsKind::Neutron,
        }
    }
}

impl FromStr for XsGenRequest {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(Self::Disabled),
            "Neutron" => Ok(Self::EnabledFor(XsKind::Neutron)),
            "Neutron and Gamma" => Ok(Self::EnabledFor(XsKind::NeutronAndGamma)),
            other => Err(ConfigError::InvalidOption {
                setting: CONF_GEN_XS,
                value: other.to_string(),
                options: Self::OPTIONS,
            }),
        }
    }
}

impl fmt::Display for XsGenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str(""),
            Self::EnabledFor(kind) => f.write_str(kind.as_setting()),
        }
    }
}

/// Settings the lattice physics interface reads.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticePhysicsConfig {
    pub run_type: RunType,
    pub gen_xs: XsGenRequest,
    /// Generation requests are ignored on cycles before this one.
    pub skip_cycles: u32,
    /// Regenerate covered IDs whose burnup moved by more than this (% FIMA). `None` disables the check.
    pub burnup_tolerance: Option<f64>,
    pub clear_xs: bool,
    /// Clear the library at time node 0 in every run type, not only snapshot runs.
    pub reset_library_on_coupling: bool,
    /// A disabled interface does not require its executable to resolve.
    pub enabled: bool,
}

impl Default for LatticePhysicsConfig {
    fn default() -> Self {
        Self {
            run_type: RunType::Standard,
            gen_xs: XsGenRequest::Disabled,
            skip_cycles: 0,
            burnup_tolerance: None,
            clear_xs: false,
            reset_library_on_coupling: false,
            enabled: true,
        }
    }
}

/// Settings for the bundled external-executable backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutableConfig {
    pub executable: PathBuf,
    pub working_directory: PathBuf,
}

#[derive(Default)]
pub struct LatticePhysicsConfigBuilder {
    run_type: Option<RunType>,
    gen_xs: Option<XsGenRequest>,
    skip_cycles: Option<u32>,
    burnup_tolerance: Option<f64>,
    clear_xs: Option<bool>,
    reset_library_on_coupling: Option<bool>,
    enabled: Option<bool>,
}

impl LatticePhysicsConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_type(mut self, run_type: RunType) -> Self {
        self.run_type = Some(run_type);
        self
    }
    pub fn gen_xs(mut self, request: XsGenRequest) -> Self {
        self.gen_xs = Some(request);
        self
    }
    pub fn skip_cycles(mut self, cycles: u32) -> Self {
        self.skip_cycles = Some(cycles);
        self
    }
    pub fn burnup_tolerance(mut self, tolerance: f64) -> Self {
        self.burnup_tolerance = Some(tolerance);
        self
    }
    pub fn clear_xs(mut self, clear: bool) -> Self {
        self.clear_xs = Some(clear);
        self
    }
    pub fn reset_library_on_coupling(mut self, reset: bool) -> Self {
        self.reset_library_on_coupling = Some(reset);
        self
    }
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Applies defaults for unset values and validates the result.
    ///
    /// A burnup tolerance of zero turns the burnup check off.
    pub fn build(self) -> Result<LatticePhysicsConfig, ConfigError> {
        let defaults = LatticePhysicsConfig::default();
        let burnup_tolerance = match self.burnup_tolerance {
            Some(t) if !t.is_finite() || t < 0.0 => {
                return Err(ConfigError::InvalidValue {
                    setting: CONF_TOLERATE_BURNUP_CHANGE,
                    reason: format!("must be a non-negative number, got {}", t),
                });
            }
            Some(t) if t > 0.0 => Some(t),
            _ => None,
        };
        Ok(LatticePhysicsConfig {
            run_type: self.run_type.unwrap_or(defaults.run_type),
            gen_xs: self.gen_xs.unwrap_or(defaults.gen_xs),
            skip_cycles: self.skip_cycles.unwrap_or(defaults.skip_cycles),
            burnup_tolerance,
            clear_xs: self.clear_xs.unwrap_or(defaults.clear_xs),
            reset_library_on_coupling: self
                .reset_library_on_coupling
                .unwrap_or(defaults.reset_library_on_coupling),
            enabled: self.enabled.unwrap_or(defaults.enabled),
        })
    }
}

/// Validates burnup-group upper bounds: ascending, within (0, 100] % FIMA, and at most 26 groups.
pub fn validate_bu_groups(bounds: &[f64]) -> Result<Vec<f64>, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        setting: CONF_BU_GROUPS,
        reason,
    };
    if bounds.is_empty() {
        return Err(invalid("at least one burnup group is required".to_string()));
    }
    if bounds.len() > 26 {
        return Err(invalid(format!(
            "{} groups given, but group codes only run from A to Z",
            bounds.len()
        )));
    }
    for &bound in bounds {
        if !(bound > 0.0 && bound <= 100.0) {
            return Err(invalid(format!("{} is outside (0, 100]", bound)));
        }
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(invalid("bounds must be strictly ascending".to_string()));
    }
    Ok(bounds.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_type_parses_the_three_options() {
        assert_eq!("Standard".parse::<RunType>().unwrap(), RunType::Standard);
        assert_eq!("Equilibrium".parse::<RunType>().unwrap(), RunType::Equilibrium);
        assert_eq!("Snapshots".parse::<RunType>().unwrap(), RunType::Snapshots);
    }

    #[test]
    fn run_type_outside_options_is_a_configuration_error() {
        let err = "snapshots".parse::<RunType>().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidOption { setting: CONF_RUN_TYPE, ref value, .. } if value == "snapshots"
        ));
    }

    #[test]
    fn gen_xs_empty_string_means_disabled() {
        assert_eq!("".parse::<XsGenRequest>().unwrap(), XsGenRequest::Disabled);
        assert!(!XsGenRequest::Disabled.is_enabled());
        assert_eq!(
            "Neutron".parse::<XsGenRequest>().unwrap(),
            XsGenRequest::EnabledFor(XsKind::Neutron)
        );
        let both: XsGenRequest = "Neutron and Gamma".parse().unwrap();
        assert!(both.is_enabled());
        assert!(both.kind().includes_gamma());
        assert_eq!(both.to_string(), "Neutron and Gamma");
    }

    #[test]
    fn gen_xs_unknown_kind_is_rejected() {
        assert!(matches!(
            "Gamma".parse::<XsGenRequest>(),
            Err(ConfigError::InvalidOption { setting: CONF_GEN_XS, .. })
        ));
    }

    #[test]
    fn builder_applies_defaults() {
        let config = LatticePhysicsConfigBuilder::new().build().unwrap();
        assert_eq!(config, LatticePhysicsConfig::default());
        assert!(config.enabled);
        assert_eq!(config.burnup_tolerance, None);
    }

    #[test]
    fn builder_treats_zero_tolerance_as_disabled_and_rejects_negative() {
        let config = LatticePhysicsConfigBuilder::new()
            .burnup_tolerance(0.0)
            .build()
            .unwrap();
        assert_eq!(config.burnup_tolerance, None);

        let config = LatticePhysicsConfigBuilder::new()
            .burnup_tolerance(2.5)
            .build()
            .unwrap();
        assert_eq!(config.burnup_tolerance, Some(2.5));

        let err = LatticePhysicsConfigBuilder::new()
            .burnup_tolerance(-1.0)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { setting: CONF_TOLERATE_BURNUP_CHANGE, .. }
        ));
    }

    #[test]
    fn bu_groups_must_be_ascending_and_bounded() {
        assert_eq!(validate_bu_groups(&DEFAULT_BU_GROUPS).unwrap().len(), 4);
        assert!(validate_bu_groups(&[]).is_err());
        assert!(validate_bu_groups(&[20.0, 10.0]).is_err());
        assert!(validate_bu_groups(&[0.0, 10.0]).is_err());
        assert!(validate_bu_groups(&[10.0, 120.0]).is_err());
    }
}
