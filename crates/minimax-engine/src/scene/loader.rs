use std::path::Path;

use glam::{Mat3, Mat4, Vec3};
use gltf::mesh::Mode;

use crate::error::AssetError;

use super::{Mesh, Scene, Vertex};

/// Loads a glTF 2.0 asset (`.gltf` or `.glb`) into a flattened [`Scene`].
///
/// Only triangle-list primitives are kept. Node transforms are baked into the
/// vertices; the base color comes from the vertex colors when present and from
/// the material's base color factor otherwise.
pub fn load(path: impl AsRef<Path>) -> Result<Scene, AssetError> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path).map_err(|source| AssetError::Import {
        path: path.to_path_buf(),
        source,
    })?;

    let gltf_scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::NoScene {
            path: path.to_path_buf(),
        })?;

    let mut meshes = Vec::new();
    for node in gltf_scene.nodes() {
        visit(&node, Mat4::IDENTITY, &buffers, &mut meshes);
    }

    let scene = Scene::new(meshes);
    log::info!(
        "loaded {} ({} meshes, {} triangles)",
        path.display(),
        scene.draw_items().count(),
        scene.triangle_count()
    );
    Ok(scene)
}

fn visit(node: &gltf::Node<'_>, parent: Mat4, buffers: &[gltf::buffer::Data], out: &mut Vec<Mesh>) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
        let name = mesh
            .name()
            .or(node.name())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("mesh{}", mesh.index()));

        for (i, primitive) in mesh.primitives().enumerate() {
            if primitive.mode() != Mode::Triangles {
                log::debug!("{name}: skipping primitive {i} ({:?})", primitive.mode());
                continue;
            }
            if let Some(m) = read_primitive(&primitive, world, normal_matrix, buffers) {
                out.push(Mesh::new(format!("{name}#{i}"), m.0, m.1));
            }
        }
    }

    for child in node.children() {
        visit(&child, world, buffers, out);
    }
}

fn read_primitive(
    primitive: &gltf::Primitive<'_>,
    world: Mat4,
    normal_matrix: Mat3,
    buffers: &[gltf::buffer::Data],
) -> Option<(Vec<Vertex>, Vec<u32>)> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));

    let positions: Vec<Vec3> = reader.read_positions()?.map(Vec3::from).collect();
    let normals: Vec<Vec3> = match reader.read_normals() {
        Some(it) => it.map(Vec3::from).collect(),
        None => vec![Vec3::Y; positions.len()],
    };
    let base = primitive.material().pbr_metallic_roughness().base_color_factor();
    let colors: Vec<[f32; 4]> = match reader.read_colors(0) {
        Some(it) => it
            .into_rgba_f32()
            .map(|c| [c[0] * base[0], c[1] * base[1], c[2] * base[2], c[3] * base[3]])
            .collect(),
        None => vec![base; positions.len()],
    };

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let n = normals.get(i).copied().unwrap_or(Vec3::Y);
            Vertex {
                position: world.transform_point3(*p).to_array(),
                normal: (normal_matrix * n).normalize_or(Vec3::Y).to_array(),
                color: colors.get(i).copied().unwrap_or(base),
            }
        })
        .collect::<Vec<_>>();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(it) => it.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    // Out-of-range indices would fault on the GPU; drop the primitive instead.
    if indices.iter().any(|&i| i as usize >= vertices.len()) {
        log::warn!("primitive has out-of-range indices; skipped");
        return None;
    }

    // A mirroring transform flips the winding order.
    let mut indices = indices;
    if world.determinant() < 0.0 {
        for tri in indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }

    Some((vertices, indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &[u8]) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("minimax-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::File::create(&path).unwrap().write_all(contents).unwrap();
        path
    }

    /// One triangle translated by +2 on x, with its buffer in `tri.bin`
    /// next to the returned `tri.gltf`.
    fn write_triangle() -> std::path::PathBuf {
        // 3 positions (36 bytes) followed by 3 u16 indices (6 bytes, padded to 8).
        let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let indices: [u16; 4] = [0, 1, 2, 0];
        let mut bytes = bytemuck::cast_slice::<[f32; 3], u8>(positions.as_slice()).to_vec();
        bytes.extend_from_slice(bytemuck::cast_slice::<u16, u8>(indices.as_slice()));
        write_temp("tri.bin", &bytes);

        let json = format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [{{ "mesh": 0, "translation": [2.0, 0.0, 0.0] }}],
  "materials": [{{ "pbrMetallicRoughness": {{ "baseColorFactor": [1.0, 0.5, 0.25, 1.0] }} }}],
  "meshes": [{{ "name": "tri", "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1, "material": 0 }}] }}],
  "buffers": [{{ "byteLength": {len}, "uri": "tri.bin" }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ]
}}"#,
            len = bytes.len(),
        );
        write_temp("tri.gltf", json.as_bytes())
    }

    #[test]
    fn loads_triangle_in_world_space() {
        let scene = load(write_triangle()).unwrap();

        assert_eq!(scene.triangle_count(), 1);
        let mesh = scene.draw_items().next().unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices[1].position, [3.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[0].color, [1.0, 0.5, 0.25, 1.0]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 1.0, 0.0]);

        let bounds = scene.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn missing_file_is_an_import_error() {
        let err = load("/nonexistent/minimax/model.glb").unwrap_err();
        assert!(matches!(err, AssetError::Import { .. }));
    }

    #[test]
    fn garbage_is_an_import_error() {
        let path = write_temp("garbage.gltf", b"not a gltf file");
        assert!(matches!(load(&path), Err(AssetError::Import { .. })));
    }
}
