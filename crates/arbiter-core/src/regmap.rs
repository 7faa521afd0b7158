//! Byte-wide register map in front of the arbiter.
//!
//! Addresses are masked to 4 bits and data to 8 bits, like the peripheral
//! bus this front-end mirrors.
//!
//! | addr      | write                      | read                          |
//! |-----------|----------------------------|-------------------------------|
//! | 0x2..=0x5 | stage weight 0..3 (& 0x7)  | staged weight                 |
//! | 0x6       | bit 0 set: commit          | 0                             |
//! | 0xE       | read-only                  | `{5'b0, busy, grant_idx[1:0]}` |
//! | 0xF       | read-only                  | `{4'b0, grant_vec[3:0]}`       |

use crate::arbiter::{Arbiter, GrantStatus};
use crate::error::{ArbiterError, ArbiterResult};
use crate::types::{GrantVector, RequesterId, Weight};

pub const WEIGHT_0: u8 = 0x2;
pub const WEIGHT_3: u8 = 0x5;
pub const COMMIT: u8 = 0x6;
pub const STATUS: u8 = 0xE;
pub const GRANT_VECTOR: u8 = 0xF;

const ADDR_MASK: u8 = 0xF;
const BUSY_BIT: u8 = 1 << 2;

/// Pack the status register.
pub fn encode_status(status: GrantStatus) -> u8 {
    let busy = if status.busy { BUSY_BIT } else { 0 };
    busy | status.grant_index.index() as u8
}

/// Unpack the status register.
pub fn decode_status(raw: u8) -> GrantStatus {
    GrantStatus {
        grant_index: RequesterId::wrapping(usize::from(raw & 0x3)),
        busy: raw & BUSY_BIT != 0,
    }
}

impl Arbiter {
    pub fn write_reg(&mut self, addr: u8, value: u8) -> ArbiterResult<()> {
        let addr = addr & ADDR_MASK;
        match addr {
            WEIGHT_0..=WEIGHT_3 => {
                let id = RequesterId::wrapping(usize::from(addr - WEIGHT_0));
                self.set_weight(id.index(), Weight::masked(value).get())
            }
            COMMIT => {
                if value & 0x1 != 0 {
                    self.commit_weights();
                }
                Ok(())
            }
            STATUS | GRANT_VECTOR => Err(ArbiterError::ReadOnlyRegister(addr)),
            _ => Err(ArbiterError::UnmappedRegister(addr)),
        }
    }

    /// Side-effect free. Unmapped addresses read as zero.
    pub fn read_reg(&self, addr: u8) -> u8 {
        match addr & ADDR_MASK {
            a @ WEIGHT_0..=WEIGHT_3 => self.weights().shadow()[usize::from(a - WEIGHT_0)].get(),
            STATUS => encode_status(self.read_status()),
            GRANT_VECTOR => self.read_grant_vector().bits(),
            _ => 0,
        }
    }

    /// Status and grant vector as seen over the bus.
    pub fn read_back(&self) -> (GrantStatus, GrantVector) {
        (
            decode_status(self.read_reg(STATUS)),
            GrantVector::from_raw(self.read_reg(GRANT_VECTOR)),
        )
    }
}
