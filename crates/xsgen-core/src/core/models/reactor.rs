use super::block::Block;
use super::ids::BlockId;
use crate::core::library::slot::LibrarySlot;
use slotmap::SlotMap;

/// The reactor core: its blocks and the cross-section library attached to it.
#[derive(Debug, Clone, Default)]
pub struct Core {
    pub name: String,
    blocks: SlotMap<BlockId, Block>,
    /// The active cross-section library. Only the lattice physics interface writes it.
    pub lib: LibrarySlot,
}

impl Core {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn add_block(&mut self, block: Block) -> BlockId {
        self.blocks.insert(block)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(id)
    }

    pub fn blocks_iter(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks.iter()
    }

    pub fn blocks_iter_mut(&mut self) -> impl Iterator<Item = (BlockId, &mut Block)> {
        self.blocks.iter_mut()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Advances every block's burnup by one time node.
    pub fn deplete(&mut self) {
        for (_, block) in self.blocks.iter_mut() {
            block.advance_burnup();
        }
    }
}

/// The simulated reactor and the time point the simulation is at.
#[derive(Debug, Clone, Default)]
pub struct Reactor {
    pub name: String,
    pub cycle: u32,
    /// Node within the current cycle; node 0 is the beginning of the cycle.
    pub time_node: u32,
    pub core: Core,
}

impl Reactor {
    pub fn new(name: &str, core: Core) -> Self {
        Self {
            name: name.to_string(),
            cycle: 0,
            time_node: 0,
            core,
        }
    }

    pub fn at(mut self, cycle: u32, time_node: u32) -> Self {
        self.cycle = cycle;
        self.time_node = time_node;
        self
    }
}
