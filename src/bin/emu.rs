use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use pixels::{Pixels, SurfaceTexture};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, KeyCode, NamedKey, PhysicalKey},
    window::{Window, WindowId},
};

use chip8_vm::{
    emu::{
        Chip8, Chip8Runner, DEFAULT_CPU_HZ, DISPLAY_X, DISPLAY_Y, IndexIncrement, Quirks,
        RunnerStatus,
    },
    u4,
};

const PIXEL_ON: [u8; 4] = [0xE8, 0xE8, 0xE8, 0xFF];
const PIXEL_OFF: [u8; 4] = [0x10, 0x10, 0x10, 0xFF];

/// Physical keys for the CHIP-8 hex keypad (0x0-0xF), laid out as
/// 1 2 3 C / 4 5 6 D / 7 8 9 E / A 0 B F on the left of a QWERTY keyboard.
const KEY_MAP: [KeyCode; 16] = [
    KeyCode::KeyX,   // 0x0
    KeyCode::Digit1, // 0x1
    KeyCode::Digit2, // 0x2
    KeyCode::Digit3, // 0x3
    KeyCode::KeyQ,   // 0x4
    KeyCode::KeyW,   // 0x5
    KeyCode::KeyE,   // 0x6
    KeyCode::KeyA,   // 0x7
    KeyCode::KeyS,   // 0x8
    KeyCode::KeyD,   // 0x9
    KeyCode::KeyZ,   // 0xA
    KeyCode::KeyC,   // 0xB
    KeyCode::Digit4, // 0xC
    KeyCode::KeyR,   // 0xD
    KeyCode::KeyF,   // 0xE
    KeyCode::KeyV,   // 0xF
];

/// Window and surface, created once the event loop is running.
struct Surface {
    window: Arc<Window>,
    pixels: Pixels<'static>,
}

struct App {
    surface: Option<Surface>,
    scale: u32,

    runner: Chip8Runner,
    /// Used for delta time calculation.
    last_frame_instant: Instant,
    beeping: bool,

    /// Stores the result of the application to be returned from main.
    exit_result: anyhow::Result<()>,
}

impl App {
    fn new(runner: Chip8Runner, scale: u32) -> Self {
        Self {
            surface: None,
            scale,
            runner,
            last_frame_instant: Instant::now(),
            beeping: false,
            exit_result: Ok(()),
        }
    }

    fn try_resumed(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        if self.surface.is_some() {
            return Ok(());
        }

        let size = LogicalSize::new(DISPLAY_X as u32 * self.scale, DISPLAY_Y as u32 * self.scale);
        let min_size = LogicalSize::new(DISPLAY_X as u32, DISPLAY_Y as u32);
        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title("chip8-vm")
                        .with_inner_size(size)
                        .with_min_inner_size(min_size),
                )
                .context("Failed to create window")?,
        );

        let window_size = window.inner_size();
        let surface_texture =
            SurfaceTexture::new(window_size.width, window_size.height, window.clone());
        let pixels = Pixels::new(DISPLAY_X as u32, DISPLAY_Y as u32, surface_texture)
            .context("Failed to create pixels surface")?;

        window.request_redraw();
        self.surface = Some(Surface { window, pixels });

        // Avoid large dt on first frame
        self.last_frame_instant = Instant::now();
        Ok(())
    }

    fn redraw(&mut self) -> anyhow::Result<bool> {
        let now = Instant::now();
        let dt = (now - self.last_frame_instant).as_secs_f32();
        self.last_frame_instant = now;

        let status = self.runner.update(dt).context("Chip8 execution error")?;

        let beeping = self.runner.should_beep();
        if beeping != self.beeping {
            log::debug!("Sound {}", if beeping { "on" } else { "off" });
            self.beeping = beeping;
        }

        let Some(surface) = self.surface.as_mut() else {
            return Ok(true);
        };

        for (i, pxl) in surface.pixels.frame_mut().chunks_exact_mut(4).enumerate() {
            let lit = self.runner.pixel(i % DISPLAY_X, i / DISPLAY_X);
            pxl.copy_from_slice(if lit { &PIXEL_ON } else { &PIXEL_OFF });
        }
        surface.pixels.render().context("Pixels render error")?;

        if status == RunnerStatus::Halted {
            log::info!("Program halted");
            return Ok(false);
        }

        surface.window.request_redraw();
        Ok(true)
    }

    fn try_window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        event: WindowEvent,
    ) -> anyhow::Result<()> {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        ..
                    },
                ..
            } => {
                self.runner.chip8_mut().halt();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(surface) = self.surface.as_mut() {
                    surface
                        .pixels
                        .resize_surface(size.width, size.height)
                        .context("Failed to resize pixels surface")?;
                }
            }

            WindowEvent::RedrawRequested => {
                if !self.redraw()? {
                    event_loop.exit();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return Ok(());
                };
                if let Some(key) = KEY_MAP.iter().position(|&k| k == code) {
                    let pressed = event.state == ElementState::Pressed;
                    self.runner.set_key(u4::new(key as u8), pressed);
                }
            }

            _ => (),
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.try_resumed(event_loop) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Err(e) = self.try_window_event(event_loop, event) {
            self.exit_result = Err(e);
            event_loop.exit();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Release the surface before the window it renders into
        self.surface = None;
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum IndexIncrementArg {
    ByOne,
    ByCount,
    Unchanged,
}

impl From<IndexIncrementArg> for IndexIncrement {
    fn from(arg: IndexIncrementArg) -> Self {
        match arg {
            IndexIncrementArg::ByOne => IndexIncrement::ByOne,
            IndexIncrementArg::ByCount => IndexIncrement::ByCount,
            IndexIncrementArg::Unchanged => IndexIncrement::Unchanged,
        }
    }
}

/// CHIP-8 interpreter.
///
/// Keys 1-4, Q-R, A-F, Z-V map to the CHIP-8 keypad.
/// Escape is used to exit. Set RUST_LOG=debug (or trace) for diagnostics.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Path to the CHIP-8 ROM file
    rom_path: PathBuf,

    /// Instructions executed per second
    #[arg(long, default_value_t = DEFAULT_CPU_HZ)]
    cpu_hz: f32,

    /// Window scale factor
    #[arg(long, default_value_t = 10)]
    scale: u32,

    /// 8xy6/8xyE shift Vx in place instead of loading Vy first
    #[arg(long)]
    shift_in_place: bool,

    /// Bnnn jumps to nnn + Vx instead of nnn + V0
    #[arg(long)]
    jump_vx: bool,

    /// 8xy1/8xy2/8xy3 leave VF untouched
    #[arg(long)]
    no_vf_reset: bool,

    /// How Fx55/Fx65 move the index register
    #[arg(long, value_enum, default_value_t = IndexIncrementArg::ByOne)]
    index_increment: IndexIncrementArg,
}

impl Args {
    fn quirks(&self) -> Quirks {
        Quirks {
            shift_loads_vy: !self.shift_in_place,
            jump_offset_uses_vx: self.jump_vx,
            logic_resets_vf: !self.no_vf_reset,
            index_increment: self.index_increment.into(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut chip8 = Chip8::with_quirks(args.quirks());
    chip8
        .load_rom_file(&args.rom_path)
        .context("Failed to load ROM")?;
    let runner = Chip8Runner::with_cpu_hz(chip8, args.cpu_hz).context("Invalid --cpu-hz")?;

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(runner, args.scale.max(1));
    event_loop
        .run_app(&mut app)
        .context("Error occurred during event loop execution")?;

    // Return the result captured during the event loop
    app.exit_result
}
