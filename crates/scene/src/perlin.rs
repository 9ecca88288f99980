//! Classic 3D Perlin noise in the permute-289 form used by GLSL/WGSL shaders.
//!
//! This is the CPU twin of `cnoise` in the water shader and must stay
//! numerically identical to it (modulo float precision).

use glam::{Vec3, Vec4};

fn map4(v: Vec4, f: impl Fn(f32) -> f32) -> Vec4 {
    Vec4::new(f(v.x), f(v.y), f(v.z), f(v.w))
}

/// Floored modulo, as GLSL `mod`.
fn mod289(x: f32) -> f32 {
    x - (x / 289.0).floor() * 289.0
}

fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// GLSL `step(edge, x)`.
fn step(edge: f32, x: f32) -> f32 {
    if x < edge { 0.0 } else { 1.0 }
}

fn permute(x: Vec4) -> Vec4 {
    map4((x * 34.0 + 1.0) * x, mod289)
}

fn taylor_inv_sqrt(r: Vec4) -> Vec4 {
    Vec4::splat(1.792_842_9) - 0.853_734_7 * r
}

fn fade(t: Vec3) -> Vec3 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Gradients for one z-slice of the lattice cell.
fn gradients(ixy: Vec4) -> [Vec3; 4] {
    let gx = ixy / 7.0;
    let gy = map4(map4(gx, f32::floor) / 7.0, fract) - Vec4::splat(0.5);
    let gx = map4(gx, fract);
    let gz = Vec4::splat(0.5) - gx.abs() - gy.abs();
    let sz = map4(gz, |v| step(v, 0.0));
    let gx = gx - sz * (map4(gx, |v| step(0.0, v)) - 0.5);
    let gy = gy - sz * (map4(gy, |v| step(0.0, v)) - 0.5);
    [
        Vec3::new(gx.x, gy.x, gz.x),
        Vec3::new(gx.y, gy.y, gz.y),
        Vec3::new(gx.z, gy.z, gz.z),
        Vec3::new(gx.w, gy.w, gz.w),
    ]
}

fn normalize(g: [Vec3; 4]) -> [Vec3; 4] {
    let norm = taylor_inv_sqrt(Vec4::new(
        g[0].length_squared(),
        g[1].length_squared(),
        g[2].length_squared(),
        g[3].length_squared(),
    ));
    [g[0] * norm.x, g[1] * norm.y, g[2] * norm.z, g[3] * norm.w]
}

/// Classic Perlin noise. Zero on integer lattice points, roughly in `-1..=1`.
pub fn cnoise(p: Vec3) -> f32 {
    let pi0 = p.floor();
    let pi1 = pi0 + Vec3::ONE;
    let pi0 = Vec3::new(mod289(pi0.x), mod289(pi0.y), mod289(pi0.z));
    let pi1 = Vec3::new(mod289(pi1.x), mod289(pi1.y), mod289(pi1.z));
    let pf0 = p - p.floor();
    let pf1 = pf0 - Vec3::ONE;

    let ix = Vec4::new(pi0.x, pi1.x, pi0.x, pi1.x);
    let iy = Vec4::new(pi0.y, pi0.y, pi1.y, pi1.y);
    let iz0 = Vec4::splat(pi0.z);
    let iz1 = Vec4::splat(pi1.z);

    let ixy = permute(permute(ix) + iy);
    let ixy0 = permute(ixy + iz0);
    let ixy1 = permute(ixy + iz1);

    // Lanes: 000, 100, 010, 110 for z0 and 001, 101, 011, 111 for z1.
    let g0 = normalize(gradients(ixy0));
    let g1 = normalize(gradients(ixy1));

    let n000 = g0[0].dot(pf0);
    let n100 = g0[1].dot(Vec3::new(pf1.x, pf0.y, pf0.z));
    let n010 = g0[2].dot(Vec3::new(pf0.x, pf1.y, pf0.z));
    let n110 = g0[3].dot(Vec3::new(pf1.x, pf1.y, pf0.z));
    let n001 = g1[0].dot(Vec3::new(pf0.x, pf0.y, pf1.z));
    let n101 = g1[1].dot(Vec3::new(pf1.x, pf0.y, pf1.z));
    let n011 = g1[2].dot(Vec3::new(pf0.x, pf1.y, pf1.z));
    let n111 = g1[3].dot(pf1);

    let f = fade(pf0);
    let n_z = Vec4::new(n000, n100, n010, n110).lerp(Vec4::new(n001, n101, n011, n111), f.z);
    let n_yz_x = lerp(n_z.x, n_z.z, f.y);
    let n_yz_y = lerp(n_z.y, n_z.w, f.y);
    2.2 * lerp(n_yz_x, n_yz_y, f.x)
}
