use std::time::Duration;

/// What the coordinator observed during a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunReport {
    /// Global population after each generation; `counts[0]` follows the
    /// first update.
    pub counts: Vec<u64>,
    /// Wall-clock time spent in the generation loop.
    pub elapsed: Duration,
}

impl RunReport {
    /// Population after the last generation, or `None` for a run of zero
    /// generations.
    pub fn final_population(&self) -> Option<u64> {
        self.counts.last().copied()
    }

    /// The per-generation line printed by the coordinator; `generation` is
    /// 1-based.
    pub fn generation_line(generation: u64, alive: u64) -> String {
        format!("Generation {}: {}", generation, alive)
    }

    pub fn elapsed_line(&self) -> String {
        format!("Elapsed: {:.6} secs", self.elapsed.as_secs_f64())
    }
}
