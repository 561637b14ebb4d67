#![cfg(target_arch = "wasm32")]

use glam::Vec2;
use js_sys::Promise;
use tunnel_wasm::shader::{FRAGMENT_SOURCE, VERTEX_SOURCE};
use tunnel_wasm::tunnel::shade;
use tunnel_wasm::wasm::{context, program::build_program, Renderer, Tunnel};
use tunnel_wasm::{FrameDriver, RenderError, ShaderStage, TunnelConfig, Viewport};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext as GL};

wasm_bindgen_test_configure!(run_in_browser);

const BROKEN_FRAGMENT: &str = "#version 300 es
precision highp float;
out vec4 fragColor;
void main(void) {
    fragColor = vec4(1.0;
}
";

fn mount_canvas(id: &str) -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    if let Some(existing) = document.get_element_by_id(id) {
        return existing.dyn_into().unwrap();
    }
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .unwrap()
        .dyn_into()
        .unwrap();
    canvas.set_id(id);
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

fn expected_viewport(config: &TunnelConfig) -> Viewport {
    let window = web_sys::window().unwrap();
    Viewport::from_window(
        window.inner_width().unwrap().as_f64().unwrap(),
        window.inner_height().unwrap().as_f64().unwrap(),
        window.device_pixel_ratio(),
        config,
    )
}

async fn next_frames(count: usize) {
    let window = web_sys::window().unwrap();
    for _ in 0..count {
        let promise = Promise::new(&mut |resolve, _reject| {
            window.request_animation_frame(&resolve).unwrap();
        });
        JsFuture::from(promise).await.unwrap();
    }
}

fn to_byte(v: f32) -> i32 {
    (v * 255.0).round() as i32
}

#[wasm_bindgen_test]
fn tunnel_program_links() {
    let canvas = mount_canvas("c-link");
    let gl = context(&canvas).expect("webgl2");
    assert!(build_program(&gl, VERTEX_SOURCE, FRAGMENT_SOURCE).is_ok());
}

#[wasm_bindgen_test]
fn broken_fragment_reports_compile_log() {
    let canvas = mount_canvas("c-broken");
    let gl = context(&canvas).expect("webgl2");
    match build_program(&gl, VERTEX_SOURCE, BROKEN_FRAGMENT) {
        Err(RenderError::ShaderCompile { stage, log }) => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(!log.is_empty());
        }
        other => panic!("expected compile failure, got {:?}", other.map(|_| ())),
    }
}

#[wasm_bindgen_test]
fn renderer_refuses_broken_fragment() {
    let canvas = mount_canvas("c-renderer");
    let result = Renderer::with_sources(
        canvas,
        &TunnelConfig::default(),
        VERTEX_SOURCE,
        BROKEN_FRAGMENT,
    );
    assert!(matches!(result, Err(RenderError::ShaderCompile { .. })));
}

#[wasm_bindgen_test]
fn missing_canvas_is_reported() {
    let result = Tunnel::launch(TunnelConfig::default().with_canvas_id("no-such-canvas"));
    assert!(matches!(result, Err(RenderError::CanvasNotFound(id)) if id == "no-such-canvas"));
}

#[wasm_bindgen_test]
fn launch_sizes_canvas_and_draws_first_frame() {
    mount_canvas("c-launch");
    let config = TunnelConfig::default().with_canvas_id("c-launch");
    let mut tunnel = Tunnel::launch(config.clone()).expect("launch");

    assert!(tunnel.is_running());
    assert_eq!(tunnel.frame_count(), 1.0);

    let expected = expected_viewport(&config);
    assert_eq!(tunnel.renderer().viewport(), expected);
    assert_eq!(tunnel.renderer().canvas().width(), expected.width);
    assert_eq!(tunnel.renderer().canvas().height(), expected.height);

    tunnel.stop();
}

#[wasm_bindgen_test]
fn resize_is_idempotent() {
    mount_canvas("c-resize");
    let mut tunnel =
        Tunnel::launch(TunnelConfig::default().with_canvas_id("c-resize")).expect("launch");

    tunnel.resize_now().unwrap();
    let first = (tunnel.width(), tunnel.height());
    tunnel.resize_now().unwrap();
    let second = (tunnel.width(), tunnel.height());
    assert_eq!(first, second);

    tunnel.stop();
}

#[wasm_bindgen_test]
async fn loop_reschedules_itself_until_stopped() {
    mount_canvas("c-stop");
    let mut tunnel =
        Tunnel::launch(TunnelConfig::default().with_canvas_id("c-stop")).expect("launch");
    assert_eq!(tunnel.frame_count(), 1.0);

    next_frames(4).await;
    let running = tunnel.frame_count();
    assert!(running >= 3.0, "only {running} frames drawn");
    assert!(tunnel.is_running());

    tunnel.stop();
    assert!(!tunnel.is_running());
    let stopped = tunnel.frame_count();

    next_frames(4).await;
    assert_eq!(tunnel.frame_count(), stopped);
}

#[wasm_bindgen_test]
fn gpu_pixel_matches_cpu_shade() {
    let canvas = mount_canvas("c-pixels");
    let renderer = Renderer::new(canvas, &TunnelConfig::default()).expect("renderer");
    let viewport = Viewport::new(64, 64);
    renderer.resize(viewport);

    let mut driver = FrameDriver::new();
    driver.start().unwrap();
    driver.tick(&renderer, 0.0, viewport);

    let resolution = Vec2::new(64.0, 64.0);
    // Tunnel-wall hits, away from the rod silhouette.
    for (x, y) in [(4, 4), (59, 8), (8, 56)] {
        let mut pixel = [0u8; 4];
        renderer
            .gl()
            .read_pixels_with_opt_u8_array(
                x,
                y,
                1,
                1,
                GL::RGBA,
                GL::UNSIGNED_BYTE,
                Some(&mut pixel),
            )
            .unwrap();

        let expected = shade(Vec2::new(x as f32 + 0.5, y as f32 + 0.5), resolution, 0.0);
        for (got, want) in pixel.iter().zip(expected.to_array()) {
            let diff = (*got as i32 - to_byte(want)).abs();
            assert!(diff <= 4, "pixel ({x},{y}) = {pixel:?}, cpu = {expected:?}");
        }
    }
}
