//! GLSL ES 3.00 sources for the tunnel pass.
//!
//! The fragment body is mirrored on the CPU by [`crate::tunnel`]; any edit to the
//! maths here has to land there too or the golden samples in its tests drift.

/// Name of the `vec2` vertex attribute fed from the quad buffer.
pub const POSITION_ATTRIBUTE: &str = "position";
/// `float` uniform, seconds since the page started.
pub const TIME_UNIFORM: &str = "time";
/// `vec2` uniform, canvas size in device pixels.
pub const RESOLUTION_UNIFORM: &str = "resolution";

pub const VERTEX_SOURCE: &str = r"#version 300 es
precision highp float;

layout(location = 0) in vec2 position;

void main(void) {
    gl_Position = vec4(position, 0.0, 1.0);
}
";

pub const FRAGMENT_SOURCE: &str = r"#version 300 es
precision highp float;

out vec4 fragColor;

uniform vec2 resolution;
uniform float time;

const float LOOP_SECONDS = 240.0;
const float SPEED = 10.0;
const float MAX_STEPS = 200.0;
const float MAX_DIST = 400.0;
const float HIT_EPS = 1e-3;

vec3 palette(float a) {
    return 0.24 + 0.4 * cos(10.3 * a + vec3(0.0, 20.0, 0.0));
}

float advance() {
    return mod(time, LOOP_SECONDS) * SPEED;
}

float rod(vec3 p, vec2 s) {
    p.z -= clamp(p.z, 0.0, s.y);
    return length(p) - s.x;
}

vec3 bend(vec3 p) {
    float d = p.z * 0.02;
    d = floor(d) + smoothstep(0.0, 1.0, smoothstep(0.0, 1.0, fract(d)));
    d *= 1.7;
    return vec3(sin(d) * 10.0, sin(d * 0.7) * 10.0, 0.0);
}

float scene(vec3 p) {
    vec3 q = p + bend(p);
    vec3 r = q - vec3(0.0, 0.0, 4.0);
    r.z += advance();

    float wall = length(q.xy) - 2.5;
    float obstacle = 0.5 * rod(r, vec2(max(0.05, r.z * 0.2), 10.0));
    return min(-wall, obstacle);
}

vec3 camera_ray(vec2 uv, vec3 eye, vec3 target, float zoom) {
    vec3 f = normalize(target - eye);
    vec3 r = normalize(cross(vec3(0.0, 1.0, 0.0), f));
    vec3 u = cross(f, r);
    return normalize(f * zoom + uv.x * r + uv.y * u);
}

void main(void) {
    vec2 uv = (gl_FragCoord.xy - 0.5 * resolution) / min(resolution.x, resolution.y);

    vec3 eye = vec3(0.0, 0.0, -4.0 - advance());
    vec3 target = vec3(0.0, 0.0, -advance());
    eye -= bend(eye);
    target -= bend(target);

    vec3 dir = camera_ray(uv, eye, target, 1.0);
    vec3 p = eye;
    float travelled = 0.0;

    for (float i = 0.0; i < MAX_STEPS; i++) {
        float d = scene(p);
        if (d < HIT_EPS) break;
        if (travelled > MAX_DIST) break;
        p += dir * d;
        travelled += d;
    }

    fragColor = vec4(palette(p.z * 0.05), 1.0);
}
";
