//! Fullscreen raymarched tunnel drawn with WebGL2 from WebAssembly.
//!
//! The browser-facing pieces (context setup, the animation-frame loop) only
//! exist on `wasm32`. Canvas sizing, the frame driver and a CPU copy of the
//! fragment shader are plain Rust so they can be unit tested on the host.

pub mod config;
pub mod error;
pub mod frame;
pub mod quad;
pub mod shader;
pub mod tunnel;
pub mod viewport;

pub use config::TunnelConfig;
pub use error::{RenderError, ShaderStage};
pub use frame::{FrameDriver, FrameTarget, FrameUniforms, LoopState, TickOutcome};
pub use viewport::{PixelScale, Viewport};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use wasm_bindgen::prelude::*;

    mod app;
    pub mod program;
    mod render;

    pub use app::{run, Tunnel};
    pub use render::{context, Renderer};

    #[wasm_bindgen(start)]
    pub fn main() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialised".into());
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::{run, Tunnel};
