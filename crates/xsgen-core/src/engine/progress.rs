use crate::core::models::ids::XsId;

/// Progress events emitted while driving the simulation and running lattice physics jobs.
#[derive(Debug, Clone)]
pub enum Progress {
    /// A new time point of the simulation is being processed.
    TimeNode { cycle: u32, node: u32 },

    /// A batch of lattice physics jobs is about to run, one per identifier.
    JobsStart { xs_ids: Vec<XsId> },
    /// One lattice physics job finished.
    JobFinished { xs_id: XsId, succeeded: bool },
    JobsFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
