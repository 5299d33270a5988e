//! The machine: single owner of every component.
//!
//! [`Machine`] replaces the source's top-level mutable globals with one
//! owned context: control unit plus datapath plus device plus statistics.
//! Hosts drive it through four surfaces:
//! 1. **Program loading:** pre-encoded instruction bit patterns.
//! 2. **Clocking:** single ticks, budgeted run slices, pause/resume.
//! 3. **Inspection:** register snapshot, statistics, memory access.
//! 4. **I/O:** device attachment and host-side input staging.

use tracing::info;

use crate::common::{Fault, ProgramError};
use crate::config::Config;
use crate::core::control::{ControlUnit, RunState};
use crate::core::micro::MicroOp;
use crate::core::registers::Snapshot;
use crate::core::Datapath;
use crate::sim::loader;
use crate::soc::bus::ControlLines;
use crate::soc::io::{IoDevice, NullDevice};
use crate::soc::memory::Memory;
use crate::stats::RunStats;

/// A complete machine instance. One per run.
pub struct Machine {
    config: Config,
    datapath: Datapath,
    control: ControlUnit,
    device: Box<dyn IoDevice>,
    stats: RunStats,
}

impl Machine {
    /// Creates a machine with no attached device (output is discarded).
    pub fn new(config: Config) -> Self {
        Self::with_device(config, Box::new(NullDevice))
    }

    /// Creates a machine with the given I/O device attached.
    pub fn with_device(config: Config, device: Box<dyn IoDevice>) -> Self {
        let mode = config.mode;
        Self {
            config,
            datapath: Datapath::new(mode),
            control: ControlUnit::new(mode),
            device,
            stats: RunStats::default(),
        }
    }

    /// Replaces the attached I/O device.
    pub fn attach_device(&mut self, device: Box<dyn IoDevice>) {
        self.device = device;
    }

    /// The machine's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Loads a program of pre-encoded instruction bit patterns at address 0,
    /// resetting every component, and queues the first fetch.
    ///
    /// # Errors
    ///
    /// [`ProgramError`] for a structurally invalid image; the previous
    /// machine state is preserved in that case.
    pub fn load_program<S: AsRef<str>>(&mut self, program: &[S]) -> Result<(), ProgramError> {
        let image = loader::assemble(program, self.config.mode)?;
        let limit = self.config.mode.memory_limit();
        self.datapath = Datapath::new(self.config.mode);
        self.control.reset();
        self.stats.reset();
        for (addr, byte) in image.iter().enumerate() {
            self.datapath
                .memory
                .write(addr as u64, *byte)
                .map_err(|_| ProgramError::TooLarge {
                    bytes: image.len() as u64,
                    limit,
                })?;
        }
        self.control.start();
        info!(
            instructions = program.len(),
            bytes = image.len(),
            mode = ?self.config.mode,
            "program loaded"
        );
        Ok(())
    }

    /// Advances the clock by one tick (one phase; micro-operations dispatch
    /// on the high phase only).
    ///
    /// # Errors
    ///
    /// The fault that halted the clock.
    pub fn tick(&mut self) -> Result<RunState, Fault> {
        self.control
            .tick(&mut self.datapath, self.device.as_mut(), &mut self.stats)
    }

    /// Dispatches up to `budget` micro-operations, then yields.
    ///
    /// This is the cooperative run loop: the caller decides how often to
    /// regain control. Idle low phases do not count against the budget.
    /// Returns [`RunState::Running`] when the budget is exhausted or the
    /// machine has nothing to dispatch (paused or not started).
    ///
    /// # Errors
    ///
    /// The fault that halted the clock.
    pub fn run(&mut self, budget: usize) -> Result<RunState, Fault> {
        let mut dispatched = 0;
        while dispatched < budget {
            if self.control.is_halted() {
                return Ok(RunState::Halted);
            }
            if self.control.is_idle() {
                return Ok(RunState::Running);
            }
            let before = self.stats.micro_ops;
            let state = self.tick()?;
            if self.stats.micro_ops > before {
                dispatched += 1;
            }
            if state == RunState::Halted {
                return Ok(RunState::Halted);
            }
        }
        Ok(RunState::Running)
    }

    /// Runs in `step_budget` slices until the program ends.
    ///
    /// Returns immediately if the machine is paused or was never started.
    ///
    /// # Errors
    ///
    /// The fault that halted the clock.
    pub fn run_to_halt(&mut self) -> Result<(), Fault> {
        let budget = self.config.step_budget.max(1);
        loop {
            if self.control.is_idle() {
                return Ok(());
            }
            if self.run(budget)? == RunState::Halted {
                info!("run complete");
                return Ok(());
            }
        }
    }

    /// Detaches the pending micro-operation queue for later resumption.
    pub fn pause(&mut self) {
        self.control.pause();
    }

    /// Restores a queue detached by [`Machine::pause`], verbatim.
    pub fn resume(&mut self) {
        self.control.resume();
    }

    /// Whether the run has finished through `end` or a fault.
    pub fn is_halted(&self) -> bool {
        self.control.is_halted()
    }

    /// The pending micro-operations, front of the queue first.
    pub fn pending_micro_ops(&self) -> impl Iterator<Item = &MicroOp> {
        self.control.pending()
    }

    /// Stages an input byte from the host, raising the I/O request line on
    /// the device's behalf.
    pub fn receive_input(&mut self, byte: u8) {
        self.datapath.buses.receive_input(byte);
    }

    /// Reads a memory byte with mode-aware bounds checking.
    ///
    /// # Errors
    ///
    /// [`Fault::AddressOutOfRange`] outside the mode's address space.
    pub fn read_memory(&self, addr: u64) -> Result<u8, Fault> {
        self.datapath.memory.read(addr)
    }

    /// Writes a memory byte with mode-aware bounds checking.
    ///
    /// # Errors
    ///
    /// [`Fault::AddressOutOfRange`] outside the mode's address space.
    pub fn write_memory(&mut self, addr: u64, byte: u8) -> Result<(), Fault> {
        self.datapath.memory.write(addr, byte)
    }

    /// The backing memory, for display walks over materialized cells.
    pub fn memory(&self) -> &Memory {
        &self.datapath.memory
    }

    /// A point-in-time copy of every register and flag.
    pub fn snapshot(&self) -> Snapshot {
        self.datapath.registers.snapshot()
    }

    /// The control-bus lines, for display front ends.
    pub fn control_lines(&self) -> ControlLines {
        self.datapath.buses.control.clone()
    }

    /// Counters for the current run.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }
}
