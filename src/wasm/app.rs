use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{error, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, Window};

use super::render::Renderer;
use crate::config::TunnelConfig;
use crate::error::RenderError;
use crate::frame::{FrameDriver, TickOutcome};
use crate::viewport::Viewport;

// The animation-frame closure reschedules itself, so it has to be reachable from
// inside its own body. `stop` takes it out of the cell to break the cycle.
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

struct Shared {
    window: Window,
    config: TunnelConfig,
    renderer: Renderer,
    driver: RefCell<FrameDriver>,
    pending: Cell<Option<i32>>,
}

/// Handle to a running tunnel. Dropping it (or `free()` from JS) stops the loop.
#[wasm_bindgen]
pub struct Tunnel {
    shared: Rc<Shared>,
    frame: FrameCallback,
    on_resize: Option<Closure<dyn FnMut()>>,
}

fn window_viewport(window: &Window, config: &TunnelConfig) -> Result<Viewport, RenderError> {
    let width = window
        .inner_width()?
        .as_f64()
        .ok_or(RenderError::MissingGlobal("innerWidth"))?;
    let height = window
        .inner_height()?
        .as_f64()
        .ok_or(RenderError::MissingGlobal("innerHeight"))?;
    Ok(Viewport::from_window(
        width,
        height,
        window.device_pixel_ratio(),
        config,
    ))
}

fn resize(shared: &Shared) -> Result<Viewport, RenderError> {
    let viewport = window_viewport(&shared.window, &shared.config)?;
    shared.renderer.resize(viewport);
    Ok(viewport)
}

fn request_frame(window: &Window, frame: &FrameCallback) -> Result<i32, RenderError> {
    let borrowed = frame.borrow();
    let callback = borrowed.as_ref().ok_or(RenderError::AlreadyStopped)?;
    Ok(window.request_animation_frame(callback.as_ref().unchecked_ref())?)
}

fn step(shared: &Shared, frame: &FrameCallback, now: f64) {
    let outcome =
        shared
            .driver
            .borrow_mut()
            .tick(&shared.renderer, now, shared.renderer.viewport());
    shared.pending.set(None);
    if outcome == TickOutcome::Halt {
        return;
    }
    match request_frame(&shared.window, frame) {
        Ok(id) => shared.pending.set(Some(id)),
        Err(err) => {
            error!("could not schedule next frame: {err}");
            shared.driver.borrow_mut().stop();
        }
    }
}

fn find_canvas(window: &Window, id: &str) -> Result<HtmlCanvasElement, RenderError> {
    let document = window
        .document()
        .ok_or(RenderError::MissingGlobal("document"))?;
    document
        .get_element_by_id(id)
        .ok_or_else(|| RenderError::CanvasNotFound(id.to_string()))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| RenderError::CanvasNotFound(id.to_string()))
}

impl Tunnel {
    /// Builds GPU resources, sizes the canvas and starts the frame loop.
    pub fn launch(config: TunnelConfig) -> Result<Self, RenderError> {
        config.validate()?;
        let window = web_sys::window().ok_or(RenderError::MissingGlobal("window"))?;
        let canvas = find_canvas(&window, &config.canvas_id)?;
        let renderer = Renderer::new(canvas, &config)?;

        let shared = Rc::new(Shared {
            window,
            config,
            renderer,
            driver: RefCell::new(FrameDriver::new()),
            pending: Cell::new(None),
        });
        let viewport = resize(&shared)?;
        info!(
            "canvas #{} sized to {}x{}",
            shared.config.canvas_id, viewport.width, viewport.height
        );

        let on_resize = {
            let shared = shared.clone();
            Closure::wrap(Box::new(move || {
                if let Err(err) = resize(&shared) {
                    error!("resize failed: {err}");
                }
            }) as Box<dyn FnMut()>)
        };
        shared
            .window
            .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;

        let frame: FrameCallback = Rc::new(RefCell::new(None));
        {
            let shared = shared.clone();
            let next = frame.clone();
            *frame.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
                step(&shared, &next, now);
            }) as Box<dyn FnMut(f64)>));
        }

        shared.driver.borrow_mut().start()?;
        step(&shared, &frame, 0.0);

        Ok(Self {
            shared,
            frame,
            on_resize: Some(on_resize),
        })
    }

    pub fn renderer(&self) -> &Renderer {
        &self.shared.renderer
    }
}

#[wasm_bindgen]
impl Tunnel {
    /// Halts the loop, cancels the pending frame and detaches the resize listener.
    pub fn stop(&mut self) {
        self.shared.driver.borrow_mut().stop();
        if let Some(id) = self.shared.pending.take() {
            if let Err(err) = self.shared.window.cancel_animation_frame(id) {
                error!("cancelAnimationFrame failed: {err:?}");
            }
        }
        if let Some(callback) = self.on_resize.take() {
            let removed = self
                .shared
                .window
                .remove_event_listener_with_callback("resize", callback.as_ref().unchecked_ref());
            if let Err(err) = removed {
                error!("removing resize listener failed: {err:?}");
            }
        }
        self.frame.borrow_mut().take();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.shared.driver.borrow().is_running()
    }

    #[wasm_bindgen(js_name = frameCount)]
    pub fn frame_count(&self) -> f64 {
        self.shared.driver.borrow().frames() as f64
    }

    /// Re-reads the window size, as a `resize` event would.
    #[wasm_bindgen(js_name = resize)]
    pub fn resize_now(&self) -> Result<(), JsValue> {
        resize(&self.shared)?;
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.shared.renderer.viewport().width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.shared.renderer.viewport().height
    }
}

impl Drop for Tunnel {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Starts the tunnel on `#canvas_id` (default `canvas`).
#[wasm_bindgen]
pub fn run(canvas_id: Option<String>) -> Result<Tunnel, JsValue> {
    let config = match canvas_id {
        Some(id) => TunnelConfig::default().with_canvas_id(id),
        None => TunnelConfig::default(),
    };
    Tunnel::launch(config).map_err(|err| {
        error!("tunnel setup failed: {err}");
        err.into()
    })
}
