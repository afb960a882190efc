use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// World-space vertex as uploaded to the geometry pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Linear base color, not premultiplied.
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x4  // color
    ];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }
}

/// Axis-aligned world-space bounds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Radius of the bounding sphere around [`center`](Self::center).
    pub fn radius(&self) -> f32 {
        (self.max - self.min).length() * 0.5
    }

    fn include(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }
}

/// Identity of a loaded scene; lets passes cache uploads per scene.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SceneId(u64);

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(1);

/// Loaded scene graph, flattened.
#[derive(Debug, Clone)]
pub struct Scene {
    id: SceneId,
    meshes: Vec<Mesh>,
    bounds: Option<Bounds>,
}

impl Scene {
    /// Builds a scene, dropping meshes without triangles.
    pub fn new(meshes: Vec<Mesh>) -> Self {
        let meshes: Vec<Mesh> = meshes.into_iter().filter(|m| !m.is_empty()).collect();

        let mut bounds: Option<Bounds> = None;
        for p in meshes.iter().flat_map(|m| &m.vertices).map(|v| Vec3::from(v.position)) {
            match bounds.as_mut() {
                Some(b) => b.include(p),
                None => bounds = Some(Bounds { min: p, max: p }),
            }
        }

        Self {
            id: SceneId(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed)),
            meshes,
            bounds,
        }
    }

    /// Scene with nothing to draw; rendering still clears and draws the UI.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Meshes in draw order.
    pub fn draw_items(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes.iter()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len() / 3).sum()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32, z: f32) -> Vertex {
        Vertex {
            position: [x, y, z],
            normal: [0.0, 1.0, 0.0],
            color: [1.0; 4],
        }
    }

    #[test]
    fn empty_scene_has_no_bounds() {
        let s = Scene::empty();
        assert!(s.is_empty());
        assert!(s.bounds().is_none());
        assert_eq!(s.draw_items().count(), 0);
    }

    #[test]
    fn bounds_cover_all_meshes() {
        let a = Mesh::new("a", vec![v(-1.0, 0.0, 0.0), v(0.0, 2.0, 0.0), v(0.0, 0.0, 1.0)], vec![0, 1, 2]);
        let b = Mesh::new("b", vec![v(3.0, -1.0, 0.0), v(4.0, 0.0, 0.0), v(3.0, 0.0, -2.0)], vec![0, 1, 2]);
        let s = Scene::new(vec![a, b]);

        let bounds = s.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -1.0, -2.0));
        assert_eq!(bounds.max, Vec3::new(4.0, 2.0, 1.0));
        assert_eq!(s.triangle_count(), 2);
    }

    #[test]
    fn meshes_without_triangles_are_dropped() {
        let s = Scene::new(vec![Mesh::new("points", vec![v(0.0, 0.0, 0.0)], vec![])]);
        assert!(s.is_empty());
    }

    #[test]
    fn every_scene_gets_a_fresh_id() {
        assert_ne!(Scene::empty().id(), Scene::empty().id());
    }
}
