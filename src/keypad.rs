use crate::error::{Error, Result};
use std::sync::atomic::{AtomicU16, Ordering};

pub const KEY_COUNT: u8 = 16;

/// The 16-key hex keypad.
///
/// State is a single atomic bit mask, so one handle can be shared between the
/// input source and the machine without a lock.
#[derive(Debug, Default)]
pub struct Keypad {
    mask: AtomicU16,
}

impl Keypad {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn press(&self, key: u8) -> Result<()> {
        let bit = Self::bit(key)?;
        self.mask.fetch_or(bit, Ordering::AcqRel);
        Ok(())
    }

    pub fn release(&self, key: u8) -> Result<()> {
        let bit = Self::bit(key)?;
        self.mask.fetch_and(!bit, Ordering::AcqRel);
        Ok(())
    }

    /// Keys outside of 0x0..=0xF are never down.
    pub fn is_down(&self, key: u8) -> bool {
        match Self::bit(key) {
            Ok(bit) => self.mask.load(Ordering::Acquire) & bit != 0,
            Err(_) => false,
        }
    }

    /// Currently pressed keys in ascending order.
    pub fn pressed_keys(&self) -> Vec<u8> {
        let mask = self.mask.load(Ordering::Acquire);
        (0..KEY_COUNT).filter(|k| mask & (1 << k) != 0).collect()
    }

    pub fn first_pressed(&self) -> Option<u8> {
        match self.mask.load(Ordering::Acquire) {
            0 => None,
            mask => Some(mask.trailing_zeros() as u8),
        }
    }

    fn bit(key: u8) -> Result<u16> {
        if key < KEY_COUNT {
            Ok(1 << key)
        } else {
            Err(Error::InvalidKey(key))
        }
    }
}
