/*
    gcrfdc

    Copyright 2024 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    src/gcr/mod.rs

    The GCR codec ROM shared by the read and write paths.
*/

//! The codec is a 2048 x 8 ROM addressed by an 11-bit input.
//!
//! In read mode (address bit 10 set) bits 9..0 are the read shift register, holding two 5-bit
//! GCR codes. The ROM returns bits 3, 1 and 0 of each decoded nibble plus a VALID bit:
//!
//! ```text
//!  7   6   5   4   3     2   1   0
//!  -  H3  H1  H0  VALID L3  L1  L0
//! ```
//!
//! Bit 2 of each nibble is the middle bit of its code and is taken directly from the shift
//! register. See [decode_byte].
//!
//! In write mode (address bit 10 clear) bit 9 selects write-sync, bit 8 selects erase and
//! bits 7..0 hold the write data byte. The ROM returns eight of the ten bits of the encoded
//! word. The two middle code bits come from the write data. See [encode_word].

use crate::FdcError;
use bit_vec::BitVec;

pub const GCR_ROM_SIZE: usize = 2048;

/// Address bit selecting read (decode) mode.
pub const GCR_READ: u16 = 0x400;
/// Address bit selecting write-sync mode.
pub const GCR_WRITE_SYNC: u16 = 0x200;
/// Address bit selecting erase mode.
pub const GCR_ERASE: u16 = 0x100;
/// Output bit set when both codes in the read shift register are valid.
pub const GCR_VALID: u8 = 0x08;
/// Ten consecutive one cells. No pair of valid codes can produce it.
pub const SYNC_WORD: u16 = 0x3FF;
pub const WORD_MASK: u16 = 0x3FF;
pub const WORD_BITS: usize = 10;

/// 4-to-5 GCR code for each nibble value.
pub const GCR_CODES: [u8; 16] = [
    0b01010, 0b01011, 0b10010, 0b10011, 0b01110, 0b01111, 0b10110, 0b10111, 0b01001, 0b11001, 0b11010, 0b11011,
    0b01101, 0b11101, 0b11110, 0b10101,
];

const fn code_to_nibble(code: u8) -> Option<u8> {
    let mut n = 0;
    while n < 16 {
        if GCR_CODES[n] == code {
            return Some(n as u8);
        }
        n += 1;
    }
    None
}

const fn read_entry(word: u16) -> u8 {
    let hi = code_to_nibble(((word >> 5) & 0x1F) as u8);
    let lo = code_to_nibble((word & 0x1F) as u8);

    let mut entry = 0;
    if let Some(h) = hi {
        entry |= ((h >> 3) & 1) << 6 | ((h >> 1) & 1) << 5 | (h & 1) << 4;
    }
    if let Some(l) = lo {
        entry |= ((l >> 3) & 1) << 2 | ((l >> 1) & 1) << 1 | (l & 1);
    }
    if hi.is_some() && lo.is_some() {
        entry |= GCR_VALID;
    }
    entry
}

const fn write_entry(address: u16) -> u8 {
    if address & GCR_WRITE_SYNC != 0 {
        return 0xFF;
    }
    if address & GCR_ERASE != 0 {
        return 0x00;
    }
    let data = (address & 0xFF) as u8;
    let word = (GCR_CODES[(data >> 4) as usize] as u16) << 5 | GCR_CODES[(data & 0x0F) as usize] as u16;
    (((word >> 2) & 0xC0) | ((word >> 1) & 0x3C) | (word & 0x03)) as u8
}

const fn build_table() -> [u8; GCR_ROM_SIZE] {
    let mut table = [0; GCR_ROM_SIZE];
    let mut i = 0;
    while i < GCR_ROM_SIZE {
        let address = i as u16;
        table[i] = if address & GCR_READ != 0 {
            read_entry(address & WORD_MASK)
        }
        else {
            write_entry(address)
        };
        i += 1;
    }
    table
}

static REFERENCE_TABLE: [u8; GCR_ROM_SIZE] = build_table();

/// The codec ROM. The default table follows the layout described in the module documentation;
/// a dump of a physical ROM with the same layout may be loaded with [GcrRom::from_bytes].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GcrRom {
    table: Box<[u8]>,
}

impl Default for GcrRom {
    fn default() -> Self {
        GcrRom {
            table: Box::new(REFERENCE_TABLE),
        }
    }
}

impl GcrRom {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FdcError> {
        if bytes.len() != GCR_ROM_SIZE {
            return Err(FdcError::InvalidRomSize(bytes.len()));
        }
        Ok(GcrRom { table: bytes.into() })
    }

    /// Look up an 11-bit input. Bits above bit 10 are ignored.
    #[inline]
    pub fn lookup(&self, input: u16) -> u8 {
        self.table[(input & 0x7FF) as usize]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.table
    }
}

/// Build the read mode ROM address for the read shift register.
#[inline]
pub fn read_address(shift_reg: u16) -> u16 {
    GCR_READ | (shift_reg & WORD_MASK)
}

/// Build the write mode ROM address for a write data byte and the write-sync and erase gates.
#[inline]
pub fn write_address(data: u8, write_sync: bool, erase: bool) -> u16 {
    let mut address = data as u16;
    if write_sync {
        address |= GCR_WRITE_SYNC;
    }
    if erase {
        address |= GCR_ERASE;
    }
    address
}

/// Assemble the 10-bit word to shift out from a write mode ROM output `e` and its address.
pub fn encode_word(e: u8, address: u16) -> u16 {
    let (mid_hi, mid_lo) = if address & GCR_WRITE_SYNC != 0 {
        (1, 1)
    }
    else if address & GCR_ERASE != 0 {
        (0, 0)
    }
    else {
        ((address >> 6) & 1, (address >> 2) & 1)
    };

    let e = e as u16;
    (e & 0xC0) << 2 | mid_hi << 7 | (e & 0x3C) << 1 | mid_lo << 2 | (e & 0x03)
}

/// Assemble the decoded byte from a read mode ROM output `e` and its address.
pub fn decode_byte(e: u8, address: u16) -> u8 {
    let mid_hi = ((address >> 7) & 1) as u8;
    let mid_lo = ((address >> 2) & 1) as u8;
    (e & 0x40) << 1 | mid_hi << 6 | (e & 0x30) | (e & 0x04) << 1 | mid_lo << 2 | (e & 0x03)
}

/// Decode a 10-bit GCR word directly, returning `None` if either code is invalid.
pub fn decode_word(word: u16) -> Option<u8> {
    let hi = code_to_nibble(((word >> 5) & 0x1F) as u8)?;
    let lo = code_to_nibble((word & 0x1F) as u8)?;
    Some(hi << 4 | lo)
}

/// Encode a byte as a 10-bit GCR word.
pub fn encode_byte(byte: u8) -> u16 {
    (GCR_CODES[(byte >> 4) as usize] as u16) << 5 | GCR_CODES[(byte & 0x0F) as usize] as u16
}

/// Encode a byte slice as a GCR cell stream, ten cells per byte, most significant bit first.
pub fn encode_stream(data: &[u8]) -> BitVec {
    let mut bitvec = BitVec::with_capacity(data.len() * WORD_BITS);
    for &byte in data {
        let word = encode_byte(byte);
        for i in (0..WORD_BITS).rev() {
            bitvec.push(word & (1 << i) != 0);
        }
    }
    bitvec
}

/// Return a stream of `cells` one cells, as written under write-sync.
pub fn sync_stream(cells: usize) -> BitVec {
    BitVec::from_elem(cells, true)
}
