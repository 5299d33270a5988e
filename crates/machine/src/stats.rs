//! Run statistics collection and reporting.
//!
//! Tracks what a run actually did, for front ends and tests:
//! 1. **Clock:** ticks and dispatched micro-operations.
//! 2. **Instructions:** decoded count and branch outcomes.
//! 3. **Memory and I/O:** reads, writes, and device transfers.

use std::time::Instant;

/// Counters for one run. Reset by `load_program`.
#[derive(Clone)]
pub struct RunStats {
    start_time: Instant,
    /// Clock ticks, counting both the high and the idle low phase.
    pub ticks: u64,
    /// Micro-operations dispatched.
    pub micro_ops: u64,
    /// Instructions decoded.
    pub instructions: u64,
    /// Bytes read from memory over the data bus.
    pub mem_reads: u64,
    /// Bytes written to memory over the data bus.
    pub mem_writes: u64,
    /// Output instructions completed (device callbacks).
    pub io_outputs: u64,
    /// Input instructions completed.
    pub io_inputs: u64,
    /// Conditional branches that jumped.
    pub branches_taken: u64,
    /// Conditional branches that fell through.
    pub branches_not_taken: u64,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            ticks: 0,
            micro_ops: 0,
            instructions: 0,
            mem_reads: 0,
            mem_writes: 0,
            io_outputs: 0,
            io_inputs: 0,
            branches_taken: 0,
            branches_not_taken: 0,
        }
    }
}

impl RunStats {
    /// Zeroes every counter and restarts the wall clock.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Wall-clock seconds since the counters were reset.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Prints the end-of-run report to stdout.
    pub fn print(&self) {
        let secs = self.elapsed_secs();
        println!("--- run statistics ---");
        println!("  ticks:          {}", self.ticks);
        println!("  micro-ops:      {}", self.micro_ops);
        println!("  instructions:   {}", self.instructions);
        println!(
            "  memory:         {} reads, {} writes",
            self.mem_reads, self.mem_writes
        );
        println!(
            "  i/o:            {} out, {} in",
            self.io_outputs, self.io_inputs
        );
        println!(
            "  branches:       {} taken, {} not taken",
            self.branches_taken, self.branches_not_taken
        );
        if secs > 0.0 {
            println!(
                "  speed:          {:.0} micro-ops/s over {:.3}s",
                self.micro_ops as f64 / secs,
                secs
            );
        }
    }
}
