use glam::Vec3;

/// A subdivided plane lying in XZ at y = 0, centered on the origin.
///
/// Rows run from -Z to +Z, which is what an XY plane rotated by -pi/2 about
/// X looks like. The water shader displaces it along +Y.
#[derive(Debug, Clone)]
pub struct PlaneMesh {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub width: f32,
    pub depth: f32,
    pub segments_x: u32,
    pub segments_z: u32,
}

impl PlaneMesh {
    pub const WATER_SIZE: f32 = 50.0;
    pub const WATER_SEGMENTS: u32 = 512;

    /// The 50 x 50 unit, 512 x 512 segment water surface.
    pub fn water() -> Self {
        Self::new(
            Self::WATER_SIZE,
            Self::WATER_SIZE,
            Self::WATER_SEGMENTS,
            Self::WATER_SEGMENTS,
        )
    }

    pub fn new(width: f32, depth: f32, segments_x: u32, segments_z: u32) -> Self {
        let segments_x = segments_x.max(1);
        let segments_z = segments_z.max(1);
        let columns = segments_x + 1;
        let rows = segments_z + 1;

        let mut positions = Vec::with_capacity((columns * rows) as usize);
        for row in 0..rows {
            let v = row as f32 / segments_z as f32;
            let z = (v - 0.5) * depth;
            for col in 0..columns {
                let u = col as f32 / segments_x as f32;
                let x = (u - 0.5) * width;
                positions.push([x, 0.0, z]);
            }
        }

        let mut indices = Vec::with_capacity((segments_x * segments_z * 6) as usize);
        for row in 0..segments_z {
            for col in 0..segments_x {
                let a = row * columns + col;
                let b = a + columns;
                let c = b + 1;
                let d = a + 1;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        tracing::debug!(
            vertices = positions.len(),
            triangles = indices.len() / 3,
            "generated plane mesh"
        );

        Self {
            positions,
            indices,
            width,
            depth,
            segments_x,
            segments_z,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Axis-aligned bounds of the rest plane.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let half = Vec3::new(self.width * 0.5, 0.0, self.depth * 0.5);
        (-half, half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_plane_layout() {
        let mesh = PlaneMesh::new(2.0, 4.0, 2, 1);
        assert_eq!(mesh.vertex_count(), 3 * 2);
        assert_eq!(mesh.index_count(), 2 * 1 * 6);
        assert_eq!(mesh.positions[0], [-1.0, 0.0, -2.0]);
        assert_eq!(*mesh.positions.last().unwrap(), [1.0, 0.0, 2.0]);
    }

    #[test]
    fn indices_in_bounds() {
        let mesh = PlaneMesh::new(10.0, 10.0, 7, 5);
        let count = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn water_plane_dimensions() {
        let mesh = PlaneMesh::water();
        assert_eq!(mesh.vertex_count(), 513 * 513);
        assert_eq!(mesh.index_count(), 512 * 512 * 6);
        assert!(mesh.positions.iter().all(|p| p[1] == 0.0));
        let (min, max) = mesh.bounds();
        assert_eq!(min, Vec3::new(-25.0, 0.0, -25.0));
        assert_eq!(max, Vec3::new(25.0, 0.0, 25.0));
    }

    #[test]
    fn zero_segments_clamped() {
        let mesh = PlaneMesh::new(1.0, 1.0, 0, 0);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_count(), 6);
    }
}
