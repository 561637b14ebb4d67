use std::cell::Cell;

use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use super::program;
use crate::config::TunnelConfig;
use crate::error::RenderError;
use crate::frame::{FrameTarget, FrameUniforms};
use crate::quad::{COMPONENTS, FULLSCREEN_QUAD};
use crate::shader::{
    FRAGMENT_SOURCE, POSITION_ATTRIBUTE, RESOLUTION_UNIFORM, TIME_UNIFORM, VERTEX_SOURCE,
};
use crate::viewport::Viewport;

/// Acquires the WebGL2 context of `canvas`.
pub fn context(canvas: &HtmlCanvasElement) -> Result<GL, RenderError> {
    canvas
        .get_context("webgl2")?
        .ok_or(RenderError::ContextUnavailable)?
        .dyn_into::<GL>()
        .map_err(|_| RenderError::ContextUnavailable)
}

/// GPU resources for the tunnel pass, created once and reused every frame.
pub struct Renderer {
    gl: GL,
    canvas: HtmlCanvasElement,
    program: WebGlProgram,
    buffer: WebGlBuffer,
    vao: WebGlVertexArrayObject,
    time: Option<WebGlUniformLocation>,
    resolution: Option<WebGlUniformLocation>,
    clear_color: [f32; 4],
    viewport: Cell<Viewport>,
}

impl Renderer {
    /// Builds the tunnel program and uploads the quad.
    pub fn new(canvas: HtmlCanvasElement, config: &TunnelConfig) -> Result<Self, RenderError> {
        Self::with_sources(canvas, config, VERTEX_SOURCE, FRAGMENT_SOURCE)
    }

    /// Same as [`Renderer::new`] with caller-supplied shader sources.
    pub fn with_sources(
        canvas: HtmlCanvasElement,
        config: &TunnelConfig,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, RenderError> {
        let gl = context(&canvas)?;
        let program = program::build_program(&gl, vertex_source, fragment_source)?;

        let vao = gl
            .create_vertex_array()
            .ok_or(RenderError::ResourceCreation("vertex array"))?;
        gl.bind_vertex_array(Some(&vao));

        let buffer = gl
            .create_buffer()
            .ok_or(RenderError::ResourceCreation("vertex buffer"))?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        let vertices = js_sys::Float32Array::from(&FULLSCREEN_QUAD[..]);
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &vertices, GL::STATIC_DRAW);

        let position = u32::try_from(gl.get_attrib_location(&program, POSITION_ATTRIBUTE))
            .map_err(|_| RenderError::ResourceCreation("position attribute"))?;
        gl.enable_vertex_attrib_array(position);
        gl.vertex_attrib_pointer_with_i32(position, COMPONENTS, GL::FLOAT, false, 0, 0);
        gl.bind_vertex_array(None);

        let time = uniform(&gl, &program, TIME_UNIFORM);
        let resolution = uniform(&gl, &program, RESOLUTION_UNIFORM);

        info!("tunnel program linked");
        Ok(Self {
            gl,
            canvas,
            program,
            buffer,
            vao,
            time,
            resolution,
            clear_color: config.clear_color,
            viewport: Cell::new(Viewport::default()),
        })
    }

    pub fn gl(&self) -> &GL {
        &self.gl
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    /// Sizes the canvas backing store and GL viewport to `viewport`.
    pub fn resize(&self, viewport: Viewport) {
        self.canvas.set_width(viewport.width);
        self.canvas.set_height(viewport.height);
        self.gl.viewport(
            0,
            0,
            clamp_i32(viewport.width),
            clamp_i32(viewport.height),
        );
        self.viewport.set(viewport);
        debug!("resized to {}x{}", viewport.width, viewport.height);
    }
}

fn clamp_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

fn uniform(gl: &GL, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
    let location = gl.get_uniform_location(program, name);
    if location.is_none() {
        warn!("uniform `{name}` is not active; writes to it are dropped");
    }
    location
}

impl FrameTarget for Renderer {
    fn clear(&self) {
        let [r, g, b, a] = self.clear_color;
        self.gl.clear_color(r, g, b, a);
        self.gl.clear(GL::COLOR_BUFFER_BIT);
    }

    fn bind(&self) {
        self.gl.use_program(Some(&self.program));
        self.gl.bind_vertex_array(Some(&self.vao));
    }

    fn set_uniforms(&self, uniforms: &FrameUniforms) {
        let [w, h] = uniforms.resolution;
        self.gl.uniform1f(self.time.as_ref(), uniforms.time);
        self.gl.uniform2f(self.resolution.as_ref(), w, h);
    }

    fn draw_triangles(&self, vertex_count: i32) {
        self.gl.draw_arrays(GL::TRIANGLES, 0, vertex_count);
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(Some(&self.vao));
        self.gl.delete_buffer(Some(&self.buffer));
        self.gl.delete_program(Some(&self.program));
    }
}
