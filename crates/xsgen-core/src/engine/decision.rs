//! Decides whether the cross-section library must be (re)generated.
//!
//! The baseline rule compares the identifiers the reactor currently needs with the
//! entries of the attached library:
//!
//! | library  | missing IDs | requested | result                                  |
//! |----------|-------------|-----------|-----------------------------------------|
//! | none     | n/a         | no        | skip ([`DecisionReason::NoLibraryNoRequest`])    |
//! | none     | n/a         | yes       | generate all ([`DecisionReason::NoLibraryRequested`]) |
//! | present  | none        | any       | skip ([`DecisionReason::CoverageComplete`])      |
//! | present  | some        | no        | generate missing ([`DecisionReason::MissingForcedRegen`]) |
//! | present  | some        | yes       | generate missing ([`DecisionReason::MissingRequestedRegen`]) |
//!
//! Complete coverage always wins over an explicit request. Every branch logs one line
//! whose leading text is stable, since operators and tests key on it.

use crate::core::library::xs_library::XsLibrary;
use crate::core::models::block::Block;
use crate::core::models::ids::{XsId, format_xs_ids};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    NoLibraryNoRequest,
    NoLibraryRequested,
    CoverageComplete,
    MissingForcedRegen,
    MissingRequestedRegen,
    /// Covered identifiers whose burnup drifted past the configured tolerance.
    BurnupChanged,
}

/// The outcome of one regeneration check.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub regenerate: bool,
    pub reason: DecisionReason,
    /// The identifiers to generate; empty when `regenerate` is false.
    pub targets: BTreeSet<XsId>,
    /// The diagnostic line logged for this decision.
    pub message: String,
}

impl Decision {
    fn skip(reason: DecisionReason, message: String) -> Self {
        Self {
            regenerate: false,
            reason,
            targets: BTreeSet::new(),
            message,
        }
    }

    fn generate(reason: DecisionReason, targets: BTreeSet<XsId>, message: String) -> Self {
        Self {
            regenerate: true,
            reason,
            targets,
            message,
        }
    }
}

/// Decides whether cross sections must be generated on `cycle`.
///
/// When a library is present, only the identifiers it lacks become targets.
/// The check is pure; calling it twice with the same inputs yields the same decision
/// and the same log line.
pub fn should_regenerate(
    cycle: u32,
    required: &BTreeSet<XsId>,
    existing: Option<&XsLibrary>,
    generation_requested: bool,
) -> Decision {
    let Some(library) = existing else {
        if generation_requested {
            let message = format!(
                "Cross sections will be generated on cycle {} for the following XS IDs: {}.",
                cycle,
                format_xs_ids(required)
            );
            info!(cycle, reason = ?DecisionReason::NoLibraryRequested, "{}", message);
            return Decision::generate(
                DecisionReason::NoLibraryRequested,
                required.clone(),
                message,
            );
        }
        let message = format!("Cross sections will not be generated on cycle {}.", cycle);
        info!(cycle, reason = ?DecisionReason::NoLibraryNoRequest, "{}", message);
        return Decision::skip(DecisionReason::NoLibraryNoRequest, message);
    };

    let missing = library.missing_from(required);
    if missing.is_empty() {
        let message = "The generation of XS will be skipped.".to_string();
        info!(cycle, reason = ?DecisionReason::CoverageComplete, "{}", message);
        return Decision::skip(DecisionReason::CoverageComplete, message);
    }

    if generation_requested {
        let message = format!(
            "Cross sections will be generated for the following XS IDs: {}. These will be generated on cycle {}.",
            format_xs_ids(&missing),
            cycle
        );
        info!(cycle, reason = ?DecisionReason::MissingRequestedRegen, "{}", message);
        Decision::generate(DecisionReason::MissingRequestedRegen, missing, message)
    } else {
        let message = format!(
            "The loaded library `{}` does not contain cross sections for the following XS IDs: {}. \
             Cross section generation is not enabled, but will be run to generate these missing cross sections.",
            library.name(),
            format_xs_ids(&missing)
        );
        warn!(cycle, reason = ?DecisionReason::MissingForcedRegen, "{}", message);
        Decision::generate(DecisionReason::MissingForcedRegen, missing, message)
    }
}

/// A representative block whose burnup moved since its cross sections were generated.
#[derive(Debug, Clone, PartialEq)]
pub struct BurnupChange {
    pub xs_id: XsId,
    pub generated_at: f64,
    pub current: f64,
}

/// Finds identifiers whose burnup changed by more than `tolerance` since generation.
///
/// Identifiers never generated by this interface are not reported; the baseline
/// coverage check handles them. The bookkeeping map is only read.
pub fn stale_by_burnup(
    representatives: &[(XsId, Block)],
    generated_burnup: &BTreeMap<XsId, f64>,
    tolerance: f64,
) -> Vec<BurnupChange> {
    representatives
        .iter()
        .filter_map(|(xs_id, block)| {
            let generated_at = *generated_burnup.get(xs_id)?;
            ((block.percent_bu - generated_at).abs() > tolerance).then(|| BurnupChange {
                xs_id: xs_id.clone(),
                generated_at,
                current: block.percent_bu,
            })
        })
        .collect()
}

/// Turns a set of burnup changes into a regeneration decision, logging each change.
pub fn burnup_decision(cycle: u32, changes: &[BurnupChange]) -> Decision {
    for change in changes {
        info!(
            cycle,
            xs_id = %change.xs_id,
            "Burnup has changed in XS ID {} from {} to {}. Recalculating cross sections.",
            change.xs_id,
            change.generated_at,
            change.current
        );
    }
    let targets: BTreeSet<XsId> = changes.iter().map(|c| c.xs_id.clone()).collect();
    let message = format!(
        "Cross sections for XS IDs {} are stale and will be regenerated on cycle {}.",
        format_xs_ids(&targets),
        cycle
    );
    Decision::generate(DecisionReason::BurnupChanged, targets, message)
}
