use crate::display::Display;
use crate::input::{forward_keys, Layout};
use crate::{Error, Instruction, Machine, PROGRAM_START};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info, warn};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use winit::event::{Event, VirtualKeyCode};
use winit::event_loop::{ControlFlow, EventLoop};
use winit_input_helper::WinitInputHelper;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity of debug logging
    #[arg(short, long, value_enum, global = true)]
    debug: Option<DebugMode>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a program in a window
    Run {
        /// The path to the program image
        path: PathBuf,

        #[command(flatten)]
        config: RunConfig,
    },
    /// Write a listing of a program image
    Disassemble {
        /// The path to the program image
        path: PathBuf,

        /// Where to output the listing
        #[arg(short, long)]
        output_file: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Copy, PartialEq)]
pub struct RunConfig {
    /// Instructions executed per timer tick
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub steps_per_tick: u32,

    /// Timer ticks per second
    #[arg(short, long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    pub tick_rate: u32,

    /// Window pixels per display cell
    #[arg(long, default_value_t = 10.0)]
    pub scale: f64,

    /// What to do when an opcode can't be decoded
    #[arg(long, value_enum, default_value_t = OnUnknown::Skip)]
    pub on_unknown: OnUnknown,

    /// Keyboard layout mapped onto the keypad
    #[arg(long, value_enum, default_value_t = Layout::Qwerty)]
    pub layout: Layout,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps_per_tick: 1,
            tick_rate: 60,
            scale: 10.0,
            on_unknown: OnUnknown::Skip,
            layout: Layout::Qwerty,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OnUnknown {
    /// Log the opcode and move on to the next one
    Skip,
    /// Stop executing but keep the window open
    Halt,
}

#[derive(Copy, Clone, ValueEnum)]
enum DebugMode {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for DebugMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(level)
    }
}

pub fn init() -> Cli {
    let cli = Cli::parse();
    std::env::set_var(
        "RUST_LOG",
        format!("etch8={}", cli.debug.unwrap_or(DebugMode::Warn)),
    );

    env_logger::init();

    cli
}

/// Frames the driver may replay in one go before giving up on the backlog.
const MAX_CATCH_UP: u32 = 4;

/// Paces a machine: each frame runs a batch of steps followed by one timer
/// tick.
pub struct Driver {
    machine: Machine,
    config: RunConfig,
    halted: bool,
}

impl Driver {
    pub fn new(machine: Machine, config: RunConfig) -> Self {
        Self {
            machine,
            config,
            halted: false,
        }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.config.tick_rate))
    }

    /// Works out how many frames are due at `now` and moves `next_frame` past
    /// them. A backlog longer than [`MAX_CATCH_UP`] is dropped.
    pub fn frames_due(&self, next_frame: &mut Instant, now: Instant) -> u32 {
        let interval = self.interval();
        let mut due = 0;
        while *next_frame <= now {
            if due == MAX_CATCH_UP {
                warn!("Running behind, dropping frames");
                *next_frame = now + interval;
                break;
            }
            due += 1;
            *next_frame += interval;
        }
        due
    }

    /// Runs one frame. Returns `true` if the tone should sound.
    pub fn frame(&mut self) -> bool {
        for _ in 0..self.config.steps_per_tick {
            if self.halted {
                break;
            }
            match self.machine.step() {
                Ok(_) => {}
                Err(e @ Error::UnknownOpcode { .. })
                    if self.config.on_unknown == OnUnknown::Skip =>
                {
                    warn!("Skipping {e}");
                    self.machine.skip();
                }
                Err(e) => {
                    error!("Halted: {e}");
                    self.halted = true;
                }
            }
        }

        let tone = self.machine.tick();
        if tone {
            info!("Beep");
        }
        tone
    }
}

pub fn run(path: &Path, config: RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    let rom = fs::read(path)?;
    let mut machine = Machine::new();
    machine.load_program(&rom)?;
    info!("Running {} [config: {:?}]", path.display(), config);

    let keypad = machine.keypad();
    let mut driver = Driver::new(machine, config);

    let event_loop = EventLoop::new();
    let mut display = Display::new(&event_loop, config.scale)?;
    let mut input = WinitInputHelper::new();
    let mut next_frame = Instant::now();

    event_loop.run(move |event, _, control_flow| {
        if let Event::RedrawRequested(_) = event {
            if let Err(e) = display.render() {
                error!("Render failed: {e}");
                *control_flow = ControlFlow::Exit;
                return;
            }
        }

        if !input.update(&event) {
            return;
        }

        if input.key_pressed(VirtualKeyCode::Escape) || input.quit() {
            *control_flow = ControlFlow::Exit;
            return;
        }

        if let Some(size) = input.window_resized() {
            if let Err(e) = display.resize(size) {
                error!("Resize failed: {e}");
                *control_flow = ControlFlow::Exit;
                return;
            }
        }

        forward_keys(
            config.layout,
            &keypad,
            |code| input.key_pressed(code),
            |code| input.key_released(code),
        );

        for _ in 0..driver.frames_due(&mut next_frame, Instant::now()) {
            driver.frame();
        }

        if let Some(frame) = driver.machine_mut().frame() {
            display.present(frame);
        }

        *control_flow = ControlFlow::WaitUntil(next_frame);
    })
}

/// Decodes a program image two bytes at a time, one line per word.
pub fn listing(rom: &[u8]) -> Vec<String> {
    let mut lines: Vec<String> = rom
        .chunks_exact(2)
        .enumerate()
        .map(|(n, chunk)| {
            let address = PROGRAM_START + n * 2;
            let opcode = u16::from_be_bytes([chunk[0], chunk[1]]);
            match Instruction::decode(opcode) {
                Some(inst) => format!("{address:03X}  {opcode:04X}  {inst}"),
                None => format!("{address:03X}  {opcode:04X}  DW {opcode:#06X}"),
            }
        })
        .collect();

    if let Some(last) = rom.chunks_exact(2).remainder().first() {
        let address = PROGRAM_START + rom.len() - 1;
        lines.push(format!("{address:03X}  {last:02X}    DB {last:#04X}"));
    }
    lines
}

pub fn disassemble(
    path: &Path,
    output_file: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(mut f) = output_file.clone() {
        if f.extension().is_none() {
            return Err(format!("{} is not a file", f.display()).into());
        }
        f.pop();
        fs::create_dir_all(f)?;
    }

    let output = output_file.unwrap_or_else(|| PathBuf::from("output.txt"));
    let mut file = fs::File::create(&output)?;
    let rom = fs::read(path)?;

    writeln!(file, "== {} ==", path.display())?;
    for line in listing(&rom) {
        writeln!(file, "{line}")?;
    }

    file.flush()?;

    info!("Wrote listing to {}", output.display());

    Ok(())
}
