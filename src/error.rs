use thiserror::Error;

/// Conditions the machine reports instead of corrupting its own state.
///
/// Whenever one of these is returned from [`Machine::step`](crate::Machine::step)
/// the machine is left exactly as it was before the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("address {address:#05X} is outside of memory")]
    OutOfMemory { address: usize },

    #[error("unknown opcode {opcode:04X} at {address:#05X}")]
    UnknownOpcode { opcode: u16, address: u16 },

    #[error("call at {address:#05X} exceeds the stack depth")]
    StackOverflow { address: u16 },

    #[error("return at {address:#05X} with an empty stack")]
    StackUnderflow { address: u16 },

    #[error("key {0:#X} is not on the keypad")]
    InvalidKey(u8),
}

pub type Result<T> = std::result::Result<T, Error>;
