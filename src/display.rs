use crate::framebuffer::{HEIGHT, SIZE, WIDTH};
use log::info;
use pixels::{Pixels, SurfaceTexture};
use std::error::Error;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

const ON: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];
const OFF: [u8; 4] = [0x00, 0x00, 0x00, 0xFF];

/// A window presenting framebuffer snapshots. It never touches machine state.
pub struct Display {
    window: Window,
    pixels: Pixels,
}

impl Display {
    pub fn new(event_loop: &EventLoop<()>, scale: f64) -> Result<Self, Box<dyn Error>> {
        let window = {
            let size = LogicalSize::new(WIDTH as u32, HEIGHT as u32);
            let scaled_size = LogicalSize::new(WIDTH as f64 * scale, HEIGHT as f64 * scale);
            WindowBuilder::new()
                .with_title("etch8")
                .with_inner_size(scaled_size)
                .with_min_inner_size(size)
                .build(event_loop)?
        };

        let pixels = {
            let size = window.inner_size();
            let texture = SurfaceTexture::new(size.width, size.height, &window);
            Pixels::new(WIDTH as u32, HEIGHT as u32, texture)?
        };

        info!("Attached display [scale: {scale}]");
        Ok(Self { window, pixels })
    }

    /// Copies a snapshot into the pixel buffer and asks for a redraw.
    pub fn present(&mut self, frame: &[bool; SIZE]) {
        paint(self.pixels.get_frame_mut(), frame);
        self.window.request_redraw();
    }

    pub fn render(&mut self) -> Result<(), pixels::Error> {
        self.pixels.render()
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) -> Result<(), Box<dyn Error>> {
        self.pixels.resize_surface(size.width, size.height)?;
        Ok(())
    }
}

fn paint(rgba: &mut [u8], frame: &[bool; SIZE]) {
    for (pixel, &on) in rgba.chunks_exact_mut(4).zip(frame.iter()) {
        pixel.copy_from_slice(if on { &ON } else { &OFF });
    }
}
