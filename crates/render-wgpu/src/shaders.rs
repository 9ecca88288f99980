/// WGSL shader for the water plane.
///
/// The vertex stage lifts each vertex by a pair of crossed sine swells minus
/// `small_iterations` octaves of Perlin noise; the fragment stage blends
/// depth and surface colors by that height. Colors arrive in sRGB and are
/// blended there. `fs_water` converts the result to linear for an sRGB
/// target; `fs_water_unorm` writes it unchanged to a non-sRGB target.
/// The octave loop never runs more than six times.
///
/// Uniform packing (see `WaterUniforms`):
/// - `time_big`: time, big elevation, big frequency x, big frequency z
/// - `big_small`: big speed x, big speed z, small elevation, small frequency
/// - `small_color`: small speed, small iterations, color offset, color multiplier
pub const WATER_SHADER: &str = r#"
struct WaterUniforms {
    view_proj: mat4x4<f32>,
    time_big: vec4<f32>,
    big_small: vec4<f32>,
    small_color: vec4<f32>,
    depth_color: vec4<f32>,
    surface_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> u: WaterUniforms;

fn mod289_3(x: vec3<f32>) -> vec3<f32> {
    return x - floor(x / 289.0) * 289.0;
}

fn mod289_4(x: vec4<f32>) -> vec4<f32> {
    return x - floor(x / 289.0) * 289.0;
}

fn permute(x: vec4<f32>) -> vec4<f32> {
    return mod289_4(((x * 34.0) + 1.0) * x);
}

fn taylor_inv_sqrt(r: vec4<f32>) -> vec4<f32> {
    return 1.7928429 - 0.8537347 * r;
}

fn fade(t: vec3<f32>) -> vec3<f32> {
    return t * t * t * (t * (t * 6.0 - 15.0) + 10.0);
}

fn cnoise(p: vec3<f32>) -> f32 {
    let pi0 = mod289_3(floor(p));
    let pi1 = mod289_3(floor(p) + vec3<f32>(1.0));
    let pf0 = fract(p);
    let pf1 = pf0 - vec3<f32>(1.0);
    let ix = vec4<f32>(pi0.x, pi1.x, pi0.x, pi1.x);
    let iy = vec4<f32>(pi0.y, pi0.y, pi1.y, pi1.y);
    let iz0 = vec4<f32>(pi0.z);
    let iz1 = vec4<f32>(pi1.z);

    let ixy = permute(permute(ix) + iy);
    let ixy0 = permute(ixy + iz0);
    let ixy1 = permute(ixy + iz1);

    var gx0 = ixy0 / 7.0;
    var gy0 = fract(floor(gx0) / 7.0) - 0.5;
    gx0 = fract(gx0);
    let gz0 = vec4<f32>(0.5) - abs(gx0) - abs(gy0);
    let sz0 = step(gz0, vec4<f32>(0.0));
    gx0 = gx0 - sz0 * (step(vec4<f32>(0.0), gx0) - 0.5);
    gy0 = gy0 - sz0 * (step(vec4<f32>(0.0), gy0) - 0.5);

    var gx1 = ixy1 / 7.0;
    var gy1 = fract(floor(gx1) / 7.0) - 0.5;
    gx1 = fract(gx1);
    let gz1 = vec4<f32>(0.5) - abs(gx1) - abs(gy1);
    let sz1 = step(gz1, vec4<f32>(0.0));
    gx1 = gx1 - sz1 * (step(vec4<f32>(0.0), gx1) - 0.5);
    gy1 = gy1 - sz1 * (step(vec4<f32>(0.0), gy1) - 0.5);

    var g000 = vec3<f32>(gx0.x, gy0.x, gz0.x);
    var g100 = vec3<f32>(gx0.y, gy0.y, gz0.y);
    var g010 = vec3<f32>(gx0.z, gy0.z, gz0.z);
    var g110 = vec3<f32>(gx0.w, gy0.w, gz0.w);
    var g001 = vec3<f32>(gx1.x, gy1.x, gz1.x);
    var g101 = vec3<f32>(gx1.y, gy1.y, gz1.y);
    var g011 = vec3<f32>(gx1.z, gy1.z, gz1.z);
    var g111 = vec3<f32>(gx1.w, gy1.w, gz1.w);

    let norm0 = taylor_inv_sqrt(vec4<f32>(dot(g000, g000), dot(g100, g100), dot(g010, g010), dot(g110, g110)));
    g000 = g000 * norm0.x;
    g100 = g100 * norm0.y;
    g010 = g010 * norm0.z;
    g110 = g110 * norm0.w;
    let norm1 = taylor_inv_sqrt(vec4<f32>(dot(g001, g001), dot(g101, g101), dot(g011, g011), dot(g111, g111)));
    g001 = g001 * norm1.x;
    g101 = g101 * norm1.y;
    g011 = g011 * norm1.z;
    g111 = g111 * norm1.w;

    let n000 = dot(g000, pf0);
    let n100 = dot(g100, vec3<f32>(pf1.x, pf0.y, pf0.z));
    let n010 = dot(g010, vec3<f32>(pf0.x, pf1.y, pf0.z));
    let n110 = dot(g110, vec3<f32>(pf1.x, pf1.y, pf0.z));
    let n001 = dot(g001, vec3<f32>(pf0.x, pf0.y, pf1.z));
    let n101 = dot(g101, vec3<f32>(pf1.x, pf0.y, pf1.z));
    let n011 = dot(g011, vec3<f32>(pf0.x, pf1.y, pf1.z));
    let n111 = dot(g111, pf1);

    let f = fade(pf0);
    let n_z = mix(vec4<f32>(n000, n100, n010, n110), vec4<f32>(n001, n101, n011, n111), f.z);
    let n_yz = mix(n_z.xy, n_z.zw, f.y);
    return 2.2 * mix(n_yz.x, n_yz.y, f.x);
}

fn srgb_to_linear(c: vec3<f32>) -> vec3<f32> {
    let low = c / 12.92;
    let high = pow((c + 0.055) / 1.055, vec3<f32>(2.4));
    return select(high, low, c <= vec3<f32>(0.04045));
}

struct WaterOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) elevation: f32,
};

@vertex
fn vs_water(@location(0) position: vec3<f32>) -> WaterOutput {
    let time = u.time_big.x;
    var world = position;

    var elevation = sin(world.x * u.time_big.z + time * u.big_small.x)
        * sin(world.z * u.time_big.w + time * u.big_small.y)
        * u.time_big.y;

    let octaves = u32(clamp(u.small_color.y, 0.0, 6.0));
    for (var octave = 1u; octave <= octaves; octave = octave + 1u) {
        let i = f32(octave);
        let p = vec3<f32>(world.xz * u.big_small.w * i, time * u.small_color.x);
        elevation = elevation - abs(cnoise(p) * u.big_small.z / i);
    }
    world.y = world.y + elevation;

    var out: WaterOutput;
    out.clip_position = u.view_proj * vec4<f32>(world, 1.0);
    out.elevation = elevation;
    return out;
}

fn water_color(elevation: f32) -> vec3<f32> {
    let strength = (elevation + u.small_color.z) * u.small_color.w;
    let color = mix(u.depth_color.rgb, u.surface_color.rgb, strength);
    return clamp(color, vec3<f32>(0.0), vec3<f32>(1.0));
}

@fragment
fn fs_water(in: WaterOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(srgb_to_linear(water_color(in.elevation)), 1.0);
}

@fragment
fn fs_water_unorm(in: WaterOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(water_color(in.elevation), 1.0);
}
"#;

/// WGSL shader for the skybox: one fullscreen triangle at the far plane,
/// each pixel looking up the cube texture along its view ray.
pub const SKYBOX_SHADER: &str = r#"
struct SkyUniforms {
    inv_view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> sky: SkyUniforms;
@group(0) @binding(1)
var sky_texture: texture_cube<f32>;
@group(0) @binding(2)
var sky_sampler: sampler;

struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) ndc: vec2<f32>,
};

@vertex
fn vs_sky(@builtin(vertex_index) index: u32) -> SkyOutput {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    let ndc = uv * 2.0 - 1.0;
    var out: SkyOutput;
    out.clip_position = vec4<f32>(ndc, 1.0, 1.0);
    out.ndc = ndc;
    return out;
}

@fragment
fn fs_sky(in: SkyOutput) -> @location(0) vec4<f32> {
    let world = sky.inv_view_proj * vec4<f32>(in.ndc, 1.0, 1.0);
    let dir = normalize(world.xyz / world.w);
    // Faces are authored for a left-handed cube lookup.
    return textureSample(sky_texture, sky_sampler, vec3<f32>(-dir.x, dir.y, dir.z));
}
"#;

/// WGSL shader that stretches the reduced-resolution scene over the
/// swapchain with a fullscreen triangle.
pub const UPSCALE_SHADER: &str = r#"
@group(0) @binding(0)
var scene_texture: texture_2d<f32>;
@group(0) @binding(1)
var scene_sampler: sampler;

struct UpscaleOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_upscale(@builtin(vertex_index) index: u32) -> UpscaleOutput {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: UpscaleOutput;
    out.clip_position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}

@fragment
fn fs_upscale(in: UpscaleOutput) -> @location(0) vec4<f32> {
    return textureSample(scene_texture, scene_sampler, in.uv);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(name: &str, source: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("{name} failed to parse:\n{}", e.emit_to_string(source)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap_or_else(|e| panic!("{name} failed validation: {e:?}"));
        module
    }

    fn entry_points(module: &naga::Module) -> Vec<(&str, naga::ShaderStage)> {
        module
            .entry_points
            .iter()
            .map(|ep| (ep.name.as_str(), ep.stage))
            .collect()
    }

    #[test]
    fn water_shader_validates() {
        let module = validate("water", WATER_SHADER);
        let entries = entry_points(&module);
        assert!(entries.contains(&("vs_water", naga::ShaderStage::Vertex)));
        assert!(entries.contains(&("fs_water", naga::ShaderStage::Fragment)));
        assert!(entries.contains(&("fs_water_unorm", naga::ShaderStage::Fragment)));
    }

    #[test]
    fn skybox_shader_validates() {
        let module = validate("skybox", SKYBOX_SHADER);
        let entries = entry_points(&module);
        assert!(entries.contains(&("vs_sky", naga::ShaderStage::Vertex)));
        assert!(entries.contains(&("fs_sky", naga::ShaderStage::Fragment)));
    }

    #[test]
    fn upscale_shader_validates() {
        let module = validate("upscale", UPSCALE_SHADER);
        let entries = entry_points(&module);
        assert!(entries.contains(&("vs_upscale", naga::ShaderStage::Vertex)));
        assert!(entries.contains(&("fs_upscale", naga::ShaderStage::Fragment)));
    }

    #[test]
    fn water_uniform_block_is_144_bytes() {
        let module = validate("water", WATER_SHADER);
        let (_, var) = module
            .global_variables
            .iter()
            .find(|(_, var)| var.space == naga::AddressSpace::Uniform)
            .expect("uniform block");
        let size = module.types[var.ty].inner.size(module.to_ctx());
        assert_eq!(size, 144);
    }

    #[test]
    fn octave_loop_is_capped() {
        assert!(WATER_SHADER.contains("clamp(u.small_color.y, 0.0, 6.0)"));
        assert!(!WATER_SHADER.contains("i = i + 1.0"));
    }

    #[test]
    fn water_uniform_block_matches_host_layout() {
        let fields = [
            "view_proj: mat4x4<f32>",
            "time_big: vec4<f32>",
            "big_small: vec4<f32>",
            "small_color: vec4<f32>",
            "depth_color: vec4<f32>",
            "surface_color: vec4<f32>",
        ];
        let mut cursor = 0;
        for field in fields {
            let at = WATER_SHADER[cursor..]
                .find(field)
                .unwrap_or_else(|| panic!("missing or out of order: {field}"));
            cursor += at + field.len();
        }
    }
}
