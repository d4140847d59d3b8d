//! CRC-32 (Castagnoli) checksums
//!
//! The lookup table is built on first use and shared, read-only, for the
//! life of the process.

use std::sync::OnceLock;

/// Castagnoli polynomial, bit-reversed.
const CASTAGNOLI: u32 = 0x82F6_3B78;

static CASTAGNOLI_TABLE: OnceLock<[u32; 256]> = OnceLock::new();

fn make_table(poly: u32) -> [u32; 256] {
    let mut table = [0u32; 256];
    for (i, slot) in table.iter_mut().enumerate() {
        let mut crc = i as u32;
        for _ in 0..8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ poly } else { crc >> 1 };
        }
        *slot = crc;
    }
    table
}

/// Process-wide Castagnoli lookup table
pub fn castagnoli_table() -> &'static [u32; 256] {
    CASTAGNOLI_TABLE.get_or_init(|| make_table(CASTAGNOLI))
}

/// Incremental CRC-32C computation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32cHasher {
    state: u32,
}

impl Crc32cHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        let table = castagnoli_table();
        let mut crc = !self.state;
        for &b in data {
            crc = table[((crc ^ b as u32) & 0xFF) as usize] ^ (crc >> 8);
        }
        self.state = !crc;
    }

    pub fn finalize(self) -> u32 {
        self.state
    }
}

/// CRC-32C of `data`.
pub fn crc32c(data: &[u8]) -> u32 {
    let mut hasher = Crc32cHasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Whether `data` has the CRC-32C `expected`.
pub fn verify_crc32c(data: &[u8], expected: u32) -> bool {
    crc32c(data) == expected
}
