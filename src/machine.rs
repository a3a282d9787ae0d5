use crate::error::{Error, Result};
use crate::font;
use crate::framebuffer::{Framebuffer, SIZE, WIDTH};
use crate::instruction::Instruction;
use crate::keypad::Keypad;
use log::{debug, info, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Arc;

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: usize = 0x200;
pub const REGISTER_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;

/// Largest address the index register may point at without overflowing.
const INDEX_LIMIT: u16 = 0xFFF;
const FLAG: usize = 0xF;

wrapper! {
    Memory => [u8; MEMORY_SIZE],
    RegisterArray => [u8; REGISTER_COUNT],
    Stack => [u16; STACK_DEPTH]
}

/// Memory, registers, stack, timers and framebuffer. The keypad is only read.
#[derive(Debug)]
pub struct Machine {
    i: u16,                   // Index register
    pc: u16,                  // Program counter
    sp: usize,                // Number of return addresses on the stack
    opcode: u16,              // Last fetched opcode
    stack: Stack,             // Return addresses
    memory: Memory,           // Memory
    delay: u8,                // Delay timer
    sound: u8,                // Sound timer
    registers: RegisterArray, // Variable registers (V0..=VF)
    framebuffer: Framebuffer,
    keypad: Arc<Keypad>,
    rng: StdRng,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A machine whose random draws are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut machine = Self {
            i: 0,
            pc: 0,
            sp: 0,
            opcode: 0,
            stack: Stack::default(),
            memory: Memory::default(),
            delay: 0,
            sound: 0,
            registers: RegisterArray::default(),
            framebuffer: Framebuffer::new(),
            keypad: Arc::new(Keypad::new()),
            rng,
        };
        machine.reset();
        machine
    }

    /// Clears memory, registers, stack and timers, reinstalls the font and
    /// points the program counter at the start of the program area.
    ///
    /// The keypad handle stays valid across resets.
    pub fn reset(&mut self) {
        self.i = 0;
        self.pc = PROGRAM_START as u16;
        self.sp = 0;
        self.opcode = 0;
        self.stack = Stack::default();
        self.memory = Memory::default();
        self.delay = 0;
        self.sound = 0;
        self.registers = RegisterArray::default();
        self.framebuffer.clear();

        self.memory[font::MEMORY_RANGE].copy_from_slice(font::FONT);
    }

    /// Copies a program image into memory at [`PROGRAM_START`].
    ///
    /// An image that doesn't fit is rejected before anything is written.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > MEMORY_SIZE - PROGRAM_START {
            return Err(Error::OutOfMemory {
                address: PROGRAM_START + program.len() - 1,
            });
        }
        self.memory[PROGRAM_START..PROGRAM_START + program.len()].copy_from_slice(program);
        info!("Loaded program [size: {}]", program.len());
        Ok(())
    }

    pub fn keypad(&self) -> Arc<Keypad> {
        Arc::clone(&self.keypad)
    }

    /// Reads the opcode the program counter points at.
    pub fn fetch(&self) -> Result<u16> {
        let pc = self.pc as usize;
        if pc + 1 >= MEMORY_SIZE {
            return Err(Error::OutOfMemory { address: pc + 1 });
        }
        Ok(u16::from_be_bytes([self.memory[pc], self.memory[pc + 1]]))
    }

    /// Runs a single fetch-decode-execute cycle.
    ///
    /// On error nothing but the last fetched opcode has changed, so the caller
    /// can inspect the machine and decide whether to [`skip`](Self::skip) or
    /// stop.
    pub fn step(&mut self) -> Result<Instruction> {
        let opcode = self.fetch()?;
        self.opcode = opcode;
        let inst = Instruction::decode(opcode).ok_or(Error::UnknownOpcode {
            opcode,
            address: self.pc,
        })?;
        debug!("Processing instruction [{:#05X}: {}]", self.pc, inst);
        self.execute(inst)?;
        Ok(inst)
    }

    /// Steps over the current opcode without executing it.
    pub fn skip(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    /// Counts both timers down by one. Returns `true` when the sound timer
    /// has just run out and a tone should sound.
    pub fn tick(&mut self) -> bool {
        self.delay = self.delay.saturating_sub(1);
        let tone = self.sound == 1;
        self.sound = self.sound.saturating_sub(1);
        trace!("Ticked timers [delay: {}] [sound: {}]", self.delay, self.sound);
        tone
    }

    pub fn execute(&mut self, inst: Instruction) -> Result<()> {
        use Instruction::*;

        match inst {
            Clear => {
                self.framebuffer.clear();
                self.next();
            }
            Return => self.ret()?,
            Jump(addr) => self.pc = addr,
            Call(addr) => self.call(addr)?,
            SkipEq { x, nn } => self.skip_if(self.v(x) == nn),
            SkipNe { x, nn } => self.skip_if(self.v(x) != nn),
            SkipRegEq { x, y } => self.skip_if(self.v(x) == self.v(y)),
            Load { x, nn } => self.set(x, nn),
            Add { x, nn } => self.set(x, self.v(x).wrapping_add(nn)),
            Move { x, y } => self.set(x, self.v(y)),
            Or { x, y } => self.set(x, self.v(x) | self.v(y)),
            And { x, y } => self.set(x, self.v(x) & self.v(y)),
            Xor { x, y } => self.set(x, self.v(x) ^ self.v(y)),
            AddReg { x, y } => {
                let (sum, carry) = self.v(x).overflowing_add(self.v(y));
                self.set_with_flag(x, sum, carry);
            }
            Sub { x, y } => {
                let (vx, vy) = (self.v(x), self.v(y));
                self.set_with_flag(x, vx.wrapping_sub(vy), vx > vy);
            }
            ShiftRight { x } => {
                let vx = self.v(x);
                self.set_with_flag(x, vx >> 1, bits::set(0, vx));
            }
            SubN { x, y } => {
                let (vx, vy) = (self.v(x), self.v(y));
                self.set_with_flag(x, vy.wrapping_sub(vx), vy > vx);
            }
            ShiftLeft { x } => {
                let vx = self.v(x);
                self.set_with_flag(x, vx << 1, bits::set(7, vx));
            }
            SkipRegNe { x, y } => self.skip_if(self.v(x) != self.v(y)),
            SetIndex(addr) => {
                self.i = addr;
                self.next();
            }
            JumpOffset(addr) => self.pc = addr + u16::from(self.v(0)),
            Random { x, nn } => {
                let value = self.rng.gen::<u8>() & nn;
                self.set(x, value);
            }
            Draw { x, y, n } => self.draw_sprite(x, y, n)?,
            SkipKey { x } => self.skip_if(self.keypad.is_down(self.v(x))),
            SkipNotKey { x } => self.skip_if(!self.keypad.is_down(self.v(x))),
            GetDelay { x } => self.set(x, self.delay),
            WaitKey { x } => {
                // Leaving PC alone re-runs this opcode on the next step.
                if let Some(key) = self.keypad.first_pressed() {
                    self.set(x, key);
                }
            }
            SetDelay { x } => {
                self.delay = self.v(x);
                self.next();
            }
            SetSound { x } => {
                self.sound = self.v(x);
                self.next();
            }
            AddIndex { x } => {
                let sum = u32::from(self.i) + u32::from(self.v(x));
                self.registers[FLAG] = u8::from(sum > u32::from(INDEX_LIMIT));
                self.i = sum as u16;
                self.next();
            }
            Glyph { x } => {
                self.i = u16::from(self.v(x)) * font::GLYPH_SIZE as u16;
                self.next();
            }
            Bcd { x } => {
                let start = self.span(3)?;
                let vx = self.v(x);
                self.memory[start..start + 3]
                    .copy_from_slice(&[vx / 100, vx / 10 % 10, vx % 10]);
                self.next();
            }
            Store { x } => {
                let len = x as usize + 1;
                let start = self.span(len)?;
                self.memory[start..start + len].copy_from_slice(&self.registers[..len]);
                self.next();
            }
            Restore { x } => {
                let len = x as usize + 1;
                let start = self.span(len)?;
                self.registers[..len].copy_from_slice(&self.memory[start..start + len]);
                self.next();
            }
        }
        Ok(())
    }

    fn call(&mut self, addr: u16) -> Result<()> {
        if self.sp == STACK_DEPTH {
            return Err(Error::StackOverflow { address: self.pc });
        }
        self.stack[self.sp] = self.pc;
        self.sp += 1;
        self.pc = addr;
        trace!("Called {addr:#05X} [depth: {}]", self.sp);
        Ok(())
    }

    fn ret(&mut self) -> Result<()> {
        if self.sp == 0 {
            return Err(Error::StackUnderflow { address: self.pc });
        }
        self.sp -= 1;
        self.pc = self.stack[self.sp].wrapping_add(2);
        Ok(())
    }

    /// XORs an `n`-row sprite read from memory at I into the framebuffer at
    /// (Vx, Vy). Pixels wrap through the flattened index, so a sprite leaving
    /// the right edge continues on the next row.
    fn draw_sprite(&mut self, x: u8, y: u8, height: u8) -> Result<()> {
        // An empty sprite reads nothing, so I may point anywhere.
        let rows = match height as usize {
            0 => 0..0,
            len => {
                let start = self.span(len)?;
                start..start + len
            }
        };
        let (x, y) = (self.v(x) as usize, self.v(y) as usize);
        let mut collided = false;
        for (row, &sprite) in self.memory[rows].iter().enumerate() {
            for col in 0..8 {
                if !bits::set(7 - col as u8, sprite) {
                    continue;
                }
                let idx = (x + col + (y + row) * WIDTH) % SIZE;
                trace!("Drawing pixel [idx: {idx}] at ({}, {})", x + col, y + row);
                collided |= self.framebuffer.toggle(idx);
            }
        }
        self.registers[FLAG] = u8::from(collided);
        self.next();
        Ok(())
    }

    /// Checks that `len` bytes starting at I lie in memory, returning I as an
    /// index.
    fn span(&self, len: usize) -> Result<usize> {
        let start = self.i as usize;
        if start + len > MEMORY_SIZE {
            return Err(Error::OutOfMemory {
                address: start + len - 1,
            });
        }
        Ok(start)
    }

    fn v(&self, register: u8) -> u8 {
        self.registers[register as usize]
    }

    fn set(&mut self, register: u8, value: u8) {
        self.registers[register as usize] = value;
        self.next();
    }

    /// Writes VF before Vx so that when x is F the result wins.
    fn set_with_flag(&mut self, register: u8, value: u8, flag: bool) {
        self.registers[FLAG] = u8::from(flag);
        self.set(register, value);
    }

    fn next(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    fn skip_if(&mut self, cond: bool) {
        self.pc = self.pc.wrapping_add(if cond { 4 } else { 2 });
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    /// Number of return addresses currently on the stack.
    pub fn stack_depth(&self) -> usize {
        self.sp
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }

    pub fn memory(&self) -> &[u8; MEMORY_SIZE] {
        &self.memory
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// The bitmap, if it changed since the last call.
    pub fn frame(&mut self) -> Option<&[bool; SIZE]> {
        if self.framebuffer.take_dirty() {
            Some(self.framebuffer.pixels())
        } else {
            None
        }
    }

    /// Clears the screen on behalf of the host.
    pub fn clear_screen(&mut self) {
        self.framebuffer.clear();
    }
}

mod bits {
    pub const fn set(n: u8, bits: u8) -> bool {
        (bits & (1 << n)) != 0
    }
}
