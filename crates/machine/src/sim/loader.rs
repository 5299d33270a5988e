//! Program-image assembly.
//!
//! Programs arrive as pre-encoded instruction bit patterns, one string of
//! '0'/'1' characters per instruction (the format the external assembler
//! emits). The loader packs them into the byte image the fetch sequence
//! expects:
//! 1. **Standard:** every pattern is 14 bits, packed into two bytes with the
//!    second byte's top two bits zero.
//! 2. **Expanded:** every pattern is a header byte plus the operand bytes
//!    the header's length field announces.
//!
//! Structural problems are rejected here, before memory is touched; an
//! illegal operand length inside a well-formed pattern is left for the
//! decoder's fault path.

use crate::common::constants::{BYTE_BITS, EXPANDED_LEN_BITS, OPCODE_BITS, STANDARD_INSTR_BITS};
use crate::common::{ProgramError, Word};
use crate::config::MachineMode;

/// Packs instruction bit patterns into a memory image starting at address 0.
///
/// # Errors
///
/// [`ProgramError`] for an empty program, a non-binary character, a pattern
/// whose length does not match its encoding, or an image larger than the
/// mode's memory.
pub fn assemble<S: AsRef<str>>(
    program: &[S],
    mode: MachineMode,
) -> Result<Vec<u8>, ProgramError> {
    if program.is_empty() {
        return Err(ProgramError::Empty);
    }
    let min_bits = match mode {
        MachineMode::Standard => STANDARD_INSTR_BITS,
        MachineMode::Expanded => BYTE_BITS,
    };
    let mut image = Vec::new();
    for (index, pattern) in program.iter().enumerate() {
        let pattern = pattern.as_ref();
        let word = parse_pattern(index, pattern, min_bits)?;
        match mode {
            MachineMode::Standard => pack_standard(index, &word, &mut image)?,
            MachineMode::Expanded => pack_expanded(index, &word, &mut image)?,
        }
    }
    let limit = mode.memory_limit();
    if image.len() as u64 > limit {
        return Err(ProgramError::TooLarge {
            bytes: image.len() as u64,
            limit,
        });
    }
    Ok(image)
}

fn parse_pattern(index: usize, pattern: &str, min_bits: usize) -> Result<Word, ProgramError> {
    if let Some(found) = pattern.chars().find(|c| *c != '0' && *c != '1') {
        return Err(ProgramError::InvalidBit { index, found });
    }
    Word::parse(pattern).ok_or(ProgramError::BadLength {
        index,
        expected: min_bits,
        found: 0,
    })
}

fn pack_standard(index: usize, word: &Word, image: &mut Vec<u8>) -> Result<(), ProgramError> {
    if word.width() != STANDARD_INSTR_BITS {
        return Err(ProgramError::BadLength {
            index,
            expected: STANDARD_INSTR_BITS,
            found: word.width(),
        });
    }
    // First byte carries bits 0..8; the second byte's top two bits are padding.
    image.push(word.field(0, BYTE_BITS) as u8);
    image.push(word.field(BYTE_BITS, STANDARD_INSTR_BITS - BYTE_BITS) as u8);
    Ok(())
}

fn pack_expanded(index: usize, word: &Word, image: &mut Vec<u8>) -> Result<(), ProgramError> {
    if word.width() < BYTE_BITS {
        return Err(ProgramError::BadLength {
            index,
            expected: BYTE_BITS,
            found: word.width(),
        });
    }
    let declared = word.field(OPCODE_BITS + 1, EXPANDED_LEN_BITS) as usize;
    let expected = BYTE_BITS * (1 + declared);
    if word.width() != expected {
        return Err(ProgramError::BadLength {
            index,
            expected,
            found: word.width(),
        });
    }
    for byte in 0..word.width() / BYTE_BITS {
        image.push(word.field(byte * BYTE_BITS, BYTE_BITS) as u8);
    }
    Ok(())
}
