// SPDX-License-Identifier: AGPL-3.0-only

//! Register handshake polling
//!
//! Backends whose raw word access goes through a busy/ready handshake use
//! [`wait_until`] to sample a status register until a masked compare
//! succeeds or the timeout runs out.

use crate::error::Result;
use atheep_chip::regs::{TIME_QUANTUM_US, WAIT_TIMEOUT_US};
use std::time::Duration;

/// 32-bit register access used beneath register-polled backends
pub trait RegisterIo {
    /// Read a 32-bit register
    ///
    /// # Errors
    ///
    /// Returns error if the register cannot be accessed.
    fn read32(&self, reg: u32) -> Result<u32>;

    /// Write a 32-bit register
    ///
    /// # Errors
    ///
    /// Returns error if the register cannot be accessed.
    fn write32(&mut self, reg: u32, value: u32) -> Result<()>;
}

/// Timing of a register handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Give up after this long
    pub timeout: Duration,
    /// Sleep between samples
    pub quantum: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_micros(WAIT_TIMEOUT_US),
            quantum: Duration::from_micros(TIME_QUANTUM_US),
        }
    }
}

impl PollConfig {
    /// Default quantum with a custom timeout
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Number of samples taken before giving up (at least one)
    #[must_use]
    pub fn attempts(&self) -> u128 {
        let quantum = self.quantum.as_nanos().max(1);
        (self.timeout.as_nanos() / quantum).max(1)
    }
}

/// Poll `reg` until `(value & mask) == expected`
///
/// A failed register read counts as a non-matching sample; polling goes on
/// until the timeout. Returns `false` on timeout.
pub fn wait_until<R: RegisterIo + ?Sized>(
    regs: &R,
    reg: u32,
    mask: u32,
    expected: u32,
    poll: &PollConfig,
) -> bool {
    for _ in 0..poll.attempts() {
        match regs.read32(reg) {
            Ok(value) if value & mask == expected => return true,
            Ok(value) => tracing::trace!("poll {reg:#06x}: {value:#010x} & {mask:#x} != {expected:#x}"),
            Err(e) => tracing::trace!("poll {reg:#06x}: read failed: {e}"),
        }

        std::thread::sleep(poll.quantum);
    }

    tracing::debug!(
        "Timeout after {}us waiting for {reg:#06x} & {mask:#x} == {expected:#x}",
        poll.timeout.as_micros()
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EepromError;
    use std::cell::Cell;

    /// Status register that reports busy for a number of reads, then ready
    struct CountdownReg {
        busy_reads: Cell<u32>,
        reads: Cell<u32>,
        fail_reads: bool,
    }

    impl CountdownReg {
        fn new(busy_reads: u32) -> Self {
            Self {
                busy_reads: Cell::new(busy_reads),
                reads: Cell::new(0),
                fail_reads: false,
            }
        }
    }

    impl RegisterIo for CountdownReg {
        fn read32(&self, _reg: u32) -> Result<u32> {
            self.reads.set(self.reads.get() + 1);
            if self.fail_reads {
                return Err(EepromError::map_failed("bus error"));
            }
            let left = self.busy_reads.get();
            if left == 0 {
                Ok(0x0000_1234)
            } else {
                self.busy_reads.set(left - 1);
                Ok(0x0001_0000)
            }
        }

        fn write32(&mut self, _reg: u32, _value: u32) -> Result<()> {
            Ok(())
        }
    }

    fn fast() -> PollConfig {
        PollConfig {
            timeout: Duration::from_micros(500),
            quantum: Duration::from_micros(10),
        }
    }

    #[test]
    fn succeeds_once_ready() {
        let reg = CountdownReg::new(3);
        assert!(wait_until(&reg, 0x407C, 0x0001_0000, 0, &fast()));
        assert_eq!(reg.reads.get(), 4);
    }

    #[test]
    fn times_out_when_never_ready() {
        let reg = CountdownReg::new(u32::MAX);
        assert!(!wait_until(&reg, 0x407C, 0x0001_0000, 0, &fast()));
        assert_eq!(u128::from(reg.reads.get()), fast().attempts());
    }

    #[test]
    fn read_errors_keep_polling() {
        let mut reg = CountdownReg::new(0);
        reg.fail_reads = true;
        assert!(!wait_until(&reg, 0x407C, 0xFFFF_FFFF, 0, &fast()));
        assert_eq!(u128::from(reg.reads.get()), fast().attempts());
    }

    #[test]
    fn attempts_follow_timeout_over_quantum() {
        assert_eq!(PollConfig::default().attempts(), 10_000);
        let zero = PollConfig {
            timeout: Duration::ZERO,
            quantum: Duration::ZERO,
        };
        assert_eq!(zero.attempts(), 1);
    }
}
