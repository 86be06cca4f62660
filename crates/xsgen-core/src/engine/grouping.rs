use super::config::{ConfigError, DEFAULT_BU_GROUPS, validate_bu_groups};
use super::error::EngineError;
use crate::core::models::block::Block;
use crate::core::models::ids::{BlockId, XsId};
use crate::core::models::reactor::Core;
use std::collections::BTreeMap;
use tracing::debug;

/// A source of representative blocks, one per cross-section identifier.
pub trait CrossSectionGroups {
    /// Representative blocks ordered by identifier.
    fn representative_blocks(&self) -> Vec<(XsId, Block)>;
}

impl CrossSectionGroups for Vec<(XsId, Block)> {
    fn representative_blocks(&self) -> Vec<(XsId, Block)> {
        self.clone()
    }
}

/// Bins blocks into burnup groups and picks a representative block per identifier.
///
/// Group `A` holds burnups up to the first bound, `B` up to the second, and so on.
/// Burnups above the last bound fall into the last group.
#[derive(Debug, Clone)]
pub struct XsGroupManager {
    bounds: Vec<f64>,
    representatives: BTreeMap<XsId, (BlockId, Block)>,
}

impl Default for XsGroupManager {
    fn default() -> Self {
        Self {
            bounds: DEFAULT_BU_GROUPS.to_vec(),
            representatives: BTreeMap::new(),
        }
    }
}

impl XsGroupManager {
    pub fn new(bounds: &[f64]) -> Result<Self, ConfigError> {
        Ok(Self {
            bounds: validate_bu_groups(bounds)?,
            representatives: BTreeMap::new(),
        })
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// The group code for a burnup in % FIMA.
    pub fn group_for(&self, percent_bu: f64) -> char {
        let index = self
            .bounds
            .iter()
            .position(|&upper| percent_bu <= upper)
            .unwrap_or(self.bounds.len() - 1);
        (b'A' + index as u8) as char
    }

    /// Writes burnup groups onto every block of `core` and recomputes the representatives.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidXsId`] if a block's type code and group do not form a
    /// valid identifier.
    pub fn update(&mut self, core: &mut Core) -> Result<(), EngineError> {
        for (_, block) in core.blocks_iter_mut() {
            block.bu_group = self.group_for(block.percent_bu);
        }

        let mut members: BTreeMap<XsId, Vec<(BlockId, &Block)>> = BTreeMap::new();
        for (id, block) in core.blocks_iter() {
            let xs_id = block.xs_id().map_err(|source| EngineError::InvalidXsId {
                block: block.name.clone(),
                source,
            })?;
            members.entry(xs_id).or_default().push((id, block));
        }

        self.representatives = members
            .into_iter()
            .filter_map(|(xs_id, blocks)| {
                let mean =
                    blocks.iter().map(|(_, b)| b.percent_bu).sum::<f64>() / blocks.len() as f64;
                let (id, block) = blocks.iter().copied().min_by(|(_, a), (_, b)| {
                    (a.percent_bu - mean)
                        .abs()
                        .total_cmp(&(b.percent_bu - mean).abs())
                })?;
                debug!(
                    xs_id = %xs_id,
                    block = %block.name,
                    members = blocks.len(),
                    "Representative block selected."
                );
                Some((xs_id, (id, block.clone())))
            })
            .collect();
        Ok(())
    }

    pub fn representative_id(&self, xs_id: &XsId) -> Option<BlockId> {
        self.representatives.get(xs_id).map(|(id, _)| *id)
    }
}

impl CrossSectionGroups for XsGroupManager {
    fn representative_blocks(&self) -> Vec<(XsId, Block)> {
        self.representatives
            .iter()
            .map(|(xs_id, (_, block))| (xs_id.clone(), block.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_codes_follow_the_bounds() {
        let manager = XsGroupManager::default();
        assert_eq!(manager.group_for(0.0), 'A');
        assert_eq!(manager.group_for(10.0), 'A');
        assert_eq!(manager.group_for(10.5), 'B');
        assert_eq!(manager.group_for(25.0), 'C');
        assert_eq!(manager.group_for(99.0), 'D');
        assert_eq!(manager.group_for(140.0), 'D');
    }

    #[test]
    fn invalid_bounds_are_rejected() {
        assert!(matches!(
            XsGroupManager::new(&[20.0, 10.0]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(XsGroupManager::new(&[]).is_err());
    }

    #[test]
    fn update_assigns_groups_and_picks_block_nearest_the_mean() {
        let mut core = Core::new("core");
        let low = core.add_block(Block::new("f1", "A").with_burnup(1.0));
        let mid = core.add_block(Block::new("f2", "A").with_burnup(4.0));
        core.add_block(Block::new("f3", "A").with_burnup(8.0));
        let burned = core.add_block(Block::new("f4", "A").with_burnup(15.0));
        let other = core.add_block(Block::new("r1", "B").with_burnup(2.0));

        let mut manager = XsGroupManager::default();
        manager.update(&mut core).unwrap();

        assert_eq!(core.block(low).unwrap().bu_group, 'A');
        assert_eq!(core.block(burned).unwrap().bu_group, 'B');

        let reps = manager.representative_blocks();
        let ids: Vec<&str> = reps.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["AA", "AB", "BA"]);
        assert_eq!(manager.representative_id(&"AA".parse().unwrap()), Some(mid));
        assert_eq!(manager.representative_id(&"AB".parse().unwrap()), Some(burned));
        assert_eq!(manager.representative_id(&"BA".parse().unwrap()), Some(other));
    }

    #[test]
    fn update_regroups_after_depletion() {
        let mut core = Core::new("core");
        let id = core.add_block(Block::new("f1", "C").with_burnup(9.5).with_burnup_rate(1.0));
        let mut manager = XsGroupManager::default();

        manager.update(&mut core).unwrap();
        assert_eq!(manager.representative_blocks()[0].0.as_str(), "CA");

        core.deplete();
        manager.update(&mut core).unwrap();
        assert_eq!(core.block(id).unwrap().bu_group, 'B');
        assert_eq!(manager.representative_blocks()[0].0.as_str(), "CB");
    }

    #[test]
    fn invalid_type_code_is_reported_with_the_block_name() {
        let mut core = Core::new("core");
        core.add_block(Block::new("bad", "A-"));
        let err = XsGroupManager::default().update(&mut core).unwrap_err();
        assert!(matches!(err, EngineError::InvalidXsId { ref block, .. } if block == "bad"));
    }
}
