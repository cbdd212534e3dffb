/// WGSL for instanced boxes.
///
/// `eye.view_proj` is bound with a dynamic offset so each eye pass selects its
/// own slot of the shared uniform buffer. Box faces are flat, so the lighting
/// term is evaluated per vertex and passed through.
pub const BOX_SHADER: &str = r#"
struct Eye {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> eye: Eye;

struct Corner {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct Placement {
    @location(2) c0: vec4<f32>,
    @location(3) c1: vec4<f32>,
    @location(4) c2: vec4<f32>,
    @location(5) c3: vec4<f32>,
};

struct Shaded {
    @builtin(position) clip: vec4<f32>,
    @location(0) shade: f32,
};

const SUN: vec3<f32> = vec3<f32>(0.27, 0.89, 0.45);
const AMBIENT: f32 = 0.35;
const GRAY: f32 = 0.85;

@vertex
fn vs_main(corner: Corner, placement: Placement) -> Shaded {
    let model = mat4x4<f32>(placement.c0, placement.c1, placement.c2, placement.c3);
    let n = normalize((model * vec4<f32>(corner.normal, 0.0)).xyz);

    var out: Shaded;
    out.clip = eye.view_proj * model * vec4<f32>(corner.position, 1.0);
    out.shade = AMBIENT + (1.0 - AMBIENT) * max(dot(n, SUN), 0.0);
    return out;
}

// Gray keeps all three channels equal so the red and cyan images match in brightness.
@fragment
fn fs_main(in: Shaded) -> @location(0) vec4<f32> {
    return vec4<f32>(vec3<f32>(GRAY * in.shade), 1.0);
}
"#;
