//! Buses, memory, and the I/O device boundary.
//!
//! This module holds everything outside the CPU proper:
//! 1. **Buses:** Address/data/I-O value lanes plus the control-bus handshake
//!    lines ([`bus::Buses`]).
//! 2. **Memory:** The dense standard-mode store and the sparse expanded-mode
//!    store behind one type ([`memory::Memory`]).
//! 3. **I/O:** The pluggable device trait and stock implementations
//!    ([`io::IoDevice`]).

/// Bus lanes and control-line handshake state.
pub mod bus;
/// Pluggable I/O device trait and stock devices.
pub mod io;
/// Mode-dependent byte-addressable memory.
pub mod memory;

pub use bus::{Buses, ControlLines};
pub use io::{BufferDevice, IoDevice, NullDevice};
pub use memory::Memory;
