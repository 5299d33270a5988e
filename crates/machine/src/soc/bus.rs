//! Shared buses and the control-line handshake.
//!
//! The machine has three value lanes and one set of handshake lines:
//! 1. **ADDRESSBUS:** 8 bits standard / 32 bits expanded.
//! 2. **DATABUS:** 8 bits in both modes.
//! 3. **IOBUS:** 8 bits, written under the I/O grant.
//! 4. **CONTROLBUS:** independent one-bit request/grant/read/write/clock and
//!    I/O lines, plus the flag signal that drives STATUS updates.
//!
//! Arbitration is a logical protocol: the control unit sequences a two-phase
//! request/grant pair around every data-bus transfer, so at most one master
//! is ever mid-transfer. Externally staged input is deferred — the byte only
//! reaches the IOBUS when the grant line actually rises.

use tracing::debug;

use crate::common::constants::BYTE_BITS;
use crate::common::{Flag, Word};
use crate::config::MachineMode;

/// The control bus: independent one-bit lines plus the flag signal.
#[derive(Clone, Debug, Default)]
pub struct ControlLines {
    /// Data-bus request, asserted by the control unit before a transfer.
    pub request: bool,
    /// Data-bus grant, asserted once the request is honored.
    pub grant: bool,
    /// Memory read strobe.
    pub read: bool,
    /// Memory write strobe.
    pub write: bool,
    /// The clock line; micro-operations dispatch on the high phase.
    pub clock: bool,
    /// I/O request, asserted by the CPU for output or by a device staging input.
    pub io_request: bool,
    /// I/O grant; input bytes transfer onto the IOBUS when this rises.
    pub io_grant: bool,
    /// The most recent flag signal: which STATUS bit to set, and to what.
    pub flag_signal: Option<(Flag, bool)>,
}

/// The machine's bus set: three value lanes plus control lines.
pub struct Buses {
    /// Address lane; width follows the machine mode.
    pub address: Word,
    /// Data lane; 8 bits in both modes.
    pub data: Word,
    /// I/O lane; 8 bits in both modes.
    pub io: Word,
    /// Handshake and strobe lines.
    pub control: ControlLines,
    pending_input: Option<u8>,
}

impl Buses {
    /// Creates the bus set for the given mode, all lanes zero and all lines low.
    pub fn new(mode: MachineMode) -> Self {
        Self {
            address: Word::zero(mode.address_bits()),
            data: Word::zero(BYTE_BITS),
            io: Word::zero(BYTE_BITS),
            control: ControlLines::default(),
            pending_input: None,
        }
    }

    /// Copies a register onto the address lane, tail-aligned.
    pub fn stage_address(&mut self, reg: &Word) {
        self.address.copy_from(reg);
    }

    /// Copies a register onto the data lane, tail-aligned. A wider source
    /// contributes only its tail byte.
    pub fn stage_data(&mut self, reg: &Word) {
        self.data.copy_from(reg);
    }

    /// Copies a register onto the I/O lane, tail-aligned.
    pub fn stage_io(&mut self, reg: &Word) {
        self.io.copy_from(reg);
    }

    /// Asserts the data-bus request line.
    pub fn request_data(&mut self) {
        self.control.request = true;
    }

    /// Asserts the data-bus grant line.
    pub fn grant_data(&mut self) {
        self.control.grant = true;
    }

    /// Drops both halves of the data-bus handshake.
    pub fn release_data(&mut self) {
        self.control.request = false;
        self.control.grant = false;
    }

    /// Sets the memory read strobe.
    pub fn set_read(&mut self, value: bool) {
        self.control.read = value;
    }

    /// Sets the memory write strobe.
    pub fn set_write(&mut self, value: bool) {
        self.control.write = value;
    }

    /// Sets the I/O request line. A staged input keeps the line asserted
    /// until the transfer is granted, so an output sequence's trailing
    /// release cannot drop a device's still-unserviced request.
    pub fn set_io_request(&mut self, value: bool) {
        self.control.io_request = value || self.pending_input.is_some();
    }

    /// Sets the I/O grant line.
    ///
    /// On assertion, a pending input byte (staged by [`Buses::receive_input`])
    /// is placed on the IOBUS, the pending slot cleared, and the request line
    /// dropped — the device's write was deferred until the bus was actually
    /// granted.
    pub fn set_io_grant(&mut self, value: bool) {
        self.control.io_grant = value;
        if value {
            if let Some(byte) = self.pending_input.take() {
                self.io = Word::from_u64(u64::from(byte), BYTE_BITS);
                self.control.io_request = false;
                debug!(value = byte, "input transferred to io bus");
            }
        }
    }

    /// Records the flag signal on the control bus. The register file applies
    /// it to STATUS in the same micro-operation.
    pub fn signal_flag(&mut self, flag: Flag, value: bool) {
        self.control.flag_signal = Some((flag, value));
    }

    /// Stages an externally supplied input byte and raises the I/O request
    /// on the device's behalf. The actual transfer happens when granted.
    pub fn receive_input(&mut self, value: u8) {
        self.pending_input = Some(value);
        self.control.io_request = true;
        debug!(value, "input staged, io request raised");
    }

    /// Whether an input byte is staged and waiting for a grant.
    pub fn has_pending_input(&self) -> bool {
        self.pending_input.is_some()
    }
}
