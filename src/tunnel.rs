//! CPU evaluation of the tunnel fragment shader.
//!
//! Mirrors `FRAGMENT_SOURCE` in [`crate::shader`] step for step so colours can be
//! sampled without a GPU. Used for golden-value regression tests; the browser
//! never calls into this module.

use glam::{Vec2, Vec3, Vec4};

/// Seconds after which the fly-through wraps around.
pub const LOOP_SECONDS: f32 = 240.0;
/// World units travelled per second.
pub const SPEED: f32 = 10.0;
pub const MAX_STEPS: u32 = 200;
pub const MAX_DIST: f32 = 400.0;
pub const HIT_EPS: f32 = 1e-3;

const TUNNEL_RADIUS: f32 = 2.5;
const ROD_LENGTH: f32 = 10.0;

/// Outcome of marching one camera ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct March {
    /// Where the ray stopped, hit or not.
    pub point: Vec3,
    /// Accumulated distance, clamped to [`MAX_DIST`].
    pub travelled: f32,
    pub steps: u32,
    pub hit: bool,
}

fn smoothstep01(x: f32) -> f32 {
    let t = x.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Distance travelled along the tunnel axis at `time`.
pub fn advance(time: f32) -> f32 {
    time.rem_euclid(LOOP_SECONDS) * SPEED
}

/// Lateral offset of the tunnel centreline at depth `p.z`.
///
/// The centreline eases between integer segments every 50 units so the path
/// holds still and then swings, instead of snaking continuously.
pub fn bend(p: Vec3) -> Vec3 {
    let d = p.z * 0.02;
    let d = (d.floor() + smoothstep01(smoothstep01(fract(d)))) * 1.7;
    Vec3::new(d.sin() * 10.0, (d * 0.7).sin() * 10.0, 0.0)
}

fn rod(mut p: Vec3, radius: f32, length: f32) -> f32 {
    p.z -= p.z.clamp(0.0, length);
    p.length() - radius
}

/// Signed distance to the nearest surface: inside of the tunnel wall or the rod.
pub fn scene_distance(p: Vec3, time: f32) -> f32 {
    let q = p + bend(p);
    let mut r = q - Vec3::new(0.0, 0.0, 4.0);
    r.z += advance(time);

    let wall = Vec2::new(q.x, q.y).length() - TUNNEL_RADIUS;
    let obstacle = 0.5 * rod(r, (r.z * 0.2).max(0.05), ROD_LENGTH);
    (-wall).min(obstacle)
}

/// Centred, aspect-corrected coordinate; the short axis spans [-0.5, 0.5].
pub fn normalized_uv(frag_coord: Vec2, resolution: Vec2) -> Vec2 {
    (frag_coord - 0.5 * resolution) / resolution.x.min(resolution.y)
}

fn camera_ray(uv: Vec2, eye: Vec3, target: Vec3, zoom: f32) -> Vec3 {
    let f = (target - eye).normalize();
    let r = Vec3::Y.cross(f).normalize();
    let u = f.cross(r);
    (f * zoom + uv.x * r + uv.y * u).normalize()
}

/// Camera eye and look-at target at `time`, both following the bent centreline.
pub fn camera(time: f32) -> (Vec3, Vec3) {
    let a = advance(time);
    let eye = Vec3::new(0.0, 0.0, -4.0 - a);
    let target = Vec3::new(0.0, 0.0, -a);
    (eye - bend(eye), target - bend(target))
}

pub fn march(uv: Vec2, time: f32) -> March {
    let (eye, target) = camera(time);
    let dir = camera_ray(uv, eye, target, 1.0);

    let mut p = eye;
    let mut travelled = 0.0;
    let mut hit = false;
    let mut steps = 0;
    while steps < MAX_STEPS {
        let d = scene_distance(p, time);
        if d < HIT_EPS {
            hit = true;
            break;
        }
        if travelled > MAX_DIST {
            travelled = MAX_DIST;
            break;
        }
        p += dir * d;
        travelled += d;
        steps += 1;
    }

    March {
        point: p,
        travelled,
        steps,
        hit,
    }
}

/// Cosine palette keyed on depth.
pub fn palette(a: f32) -> Vec3 {
    let phase = 10.3 * a;
    Vec3::new(
        0.24 + 0.4 * phase.cos(),
        0.24 + 0.4 * (phase + 20.0).cos(),
        0.24 + 0.4 * phase.cos(),
    )
}

/// Raw `fragColor` for `frag_coord`, before the framebuffer clamps it.
///
/// The palette is applied whether or not the ray hit anything, so channels can
/// dip below zero.
pub fn fragment(frag_coord: Vec2, resolution: Vec2, time: f32) -> Vec4 {
    let march = march(normalized_uv(frag_coord, resolution), time);
    palette(march.point.z * 0.05).extend(1.0)
}

/// Colour stored for the pixel at `frag_coord` (window coordinates, origin
/// bottom-left), clamped to the framebuffer's [0, 1] range.
pub fn shade(frag_coord: Vec2, resolution: Vec2, time: f32) -> Vec4 {
    fragment(frag_coord, resolution, time).clamp(Vec4::ZERO, Vec4::ONE)
}
