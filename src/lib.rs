macro_rules! wrapper {
    ($($name:ident => [$ty:ty; $size:expr]),*) => {
        $(
            #[derive(Debug, Clone, PartialEq, Eq)]
            struct $name([$ty; $size]);

            impl Default for $name {
                fn default() -> Self {
                    Self([0; $size])
                }
            }

            impl std::ops::Deref for $name {
                type Target = [$ty; $size];

                fn deref(&self) -> &Self::Target {
                    &self.0
                }
            }

            impl std::ops::DerefMut for $name {
                fn deref_mut(&mut self) -> &mut Self::Target {
                    &mut self.0
                }
            }
        )*
    };
}

pub mod cli;
pub mod display;
mod error;
pub mod font;
pub mod framebuffer;
pub mod input;
mod instruction;
pub mod keypad;
mod machine;

pub use error::{Error, Result};
pub use framebuffer::Framebuffer;
pub use instruction::Instruction;
pub use keypad::Keypad;
pub use machine::{Machine, MEMORY_SIZE, PROGRAM_START, REGISTER_COUNT, STACK_DEPTH};
