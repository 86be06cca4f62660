use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};
use xsgen::core::models::ids::{XsId, format_xs_ids};
use xsgen::engine::progress::{Progress, ProgressCallback};

const SPINNER_TICK_MS: u64 = 100;

/// Terminal display of a run: a spinner per time node and a job bar per regeneration.
#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<RunDisplay>>,
}

struct RunDisplay {
    bar: ProgressBar,
    pending: Vec<XsId>,
    failed: Vec<XsId>,
    time_nodes: u64,
    jobs: u64,
}

impl RunDisplay {
    fn apply(&mut self, event: Progress) {
        match event {
            Progress::TimeNode { cycle, node } => {
                self.time_nodes += 1;
                self.bar.reset();
                self.bar.set_style(spinner_style());
                self.bar.set_prefix(format!("cycle {} node {}", cycle, node));
                self.bar.set_message("coupling");
                self.bar
                    .enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
            }
            Progress::JobsStart { xs_ids } => {
                self.bar.disable_steady_tick();
                self.bar.reset();
                self.bar.set_style(job_bar_style());
                self.bar.set_length(xs_ids.len() as u64);
                self.bar
                    .set_message(format!("generating {}", format_xs_ids(&xs_ids)));
                self.pending = xs_ids;
                self.failed.clear();
            }
            Progress::JobFinished { xs_id, succeeded } => {
                self.jobs += 1;
                self.bar.inc(1);
                self.pending.retain(|id| *id != xs_id);
                if !succeeded {
                    self.failed.push(xs_id);
                }
                if !self.pending.is_empty() {
                    self.bar
                        .set_message(format!("waiting on {}", format_xs_ids(&self.pending)));
                }
            }
            Progress::JobsFinish => {
                if self.failed.is_empty() {
                    self.bar.finish_with_message("cross sections generated");
                } else {
                    self.failed.sort();
                    self.bar
                        .abandon_with_message(format!("failed for {}", format_xs_ids(&self.failed)));
                }
            }
            Progress::Message(msg) => self.bar.println(format!("  {}", msg)),
        }
    }
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(None, target);
        Self {
            state: Arc::new(Mutex::new(RunDisplay {
                bar,
                pending: Vec::new(),
                failed: Vec::new(),
                time_nodes: 0,
                jobs: 0,
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = Arc::clone(&self.state);
        Box::new(move |event: Progress| match state.lock() {
            Ok(mut display) => display.apply(event),
            Err(_) => warn!("Progress display mutex was poisoned; dropping event."),
        })
    }

    /// Clears the display once the run is over.
    pub fn finish(&self) {
        if let Ok(run) = self.state.lock() {
            run.bar.disable_steady_tick();
            run.bar.finish_and_clear();
            debug!(
                time_nodes = run.time_nodes,
                jobs = run.jobs,
                "Progress display closed."
            );
        }
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {prefix:.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn job_bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:.bold} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}
