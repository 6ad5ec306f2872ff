use anyhow::{bail, Context};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use gltf::buffer;
use itertools::izip;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

pub struct ModelPrimitive {
    pub index: usize,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub base_color: [f32; 4],
}

pub struct Model {
    pub name: String,
    pub primitives: Vec<ModelPrimitive>,
}

pub type Buffers<'a> = &'a [buffer::Data];

impl Model {
    pub fn from_gltf(
        name: impl Into<String>,
        mesh: gltf::Mesh,
        buffers: Buffers,
    ) -> anyhow::Result<Model> {
        let mut model = Model {
            name: name.into(),
            primitives: Vec::new(),
        };

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                bail!(
                    "Unsupported primitive mode in {}: {:?}",
                    model.name,
                    primitive.mode()
                );
            }

            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let position_reader = reader
                .read_positions()
                .with_context(|| format!("Primitive without positions in {}", model.name))?;
            let normal_reader = reader
                .read_normals()
                .with_context(|| format!("Primitive without normals in {}", model.name))?;

            let position_count = primitive.get(&gltf::Semantic::Positions).map(|a| a.count());
            let normal_count = primitive.get(&gltf::Semantic::Normals).map(|a| a.count());
            if position_count != normal_count {
                bail!(
                    "Position count {:?} does not match normal count {:?} in {}",
                    position_count,
                    normal_count,
                    model.name
                );
            }

            let vertices = izip!(position_reader, normal_reader)
                .map(|(position, normal)| Vertex {
                    position: Vec3::from(position),
                    normal: Vec3::from(normal),
                })
                .collect::<Vec<Vertex>>();

            let indices = match reader.read_indices() {
                Some(index_reader) => index_reader.into_u32().collect::<Vec<u32>>(),
                None => (0..vertices.len() as u32).collect(),
            };

            if indices.len() % 3 != 0 {
                bail!(
                    "Index count {} of {} is not a multiple of three",
                    indices.len(),
                    model.name
                );
            }

            let base_color = primitive
                .material()
                .pbr_metallic_roughness()
                .base_color_factor();

            model.primitives.push(ModelPrimitive {
                index: primitive.index(),
                vertices,
                indices,
                base_color,
            });
        }

        if model.primitives.is_empty() {
            bail!("Mesh without primitives: {}", model.name);
        }

        Ok(model)
    }

    /// Flat-shaded cube used when the product asset is not available.
    pub fn placeholder_cube(name: impl Into<String>, half_extent: f32, base_color: [f32; 4]) -> Model {
        // (normal, u, v) with u × v = normal, so every face winds counter-clockwise
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u, v) in faces {
            let first = vertices.len() as u32;
            let center = normal * half_extent;
            let (u, v) = (u * half_extent, v * half_extent);

            for corner in [-u - v, u - v, u + v, -u + v] {
                vertices.push(Vertex {
                    position: center + corner,
                    normal,
                });
            }

            indices.extend([first, first + 1, first + 2, first, first + 2, first + 3]);
        }

        Model {
            name: name.into(),
            primitives: vec![ModelPrimitive {
                index: 0,
                vertices,
                indices,
                base_color,
            }],
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    // One triangle, referenced by two nodes ("left" at the origin and "right" at x = 2).
    const TWO_NODE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0, 1] }],
        "nodes": [
            { "name": "left", "mesh": 0 },
            { "name": "right", "mesh": 0, "translation": [2.0, 0.0, 0.0] }
        ],
        "meshes": [{
            "name": "triangle",
            "primitives": [{
                "attributes": { "POSITION": 0, "NORMAL": 1 },
                "material": 0
            }]
        }],
        "materials": [{
            "name": "red",
            "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 1.0] }
        }],
        "buffers": [{
            "byteLength": 72,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/"
        }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 36 }
        ],
        "accessors": [
            {
                "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
            },
            { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3" }
        ]
    }"#;

    pub(crate) fn two_node_gltf() -> (gltf::Document, Vec<buffer::Data>, Vec<gltf::image::Data>) {
        gltf::import_slice(TWO_NODE_GLTF.as_bytes()).expect("test glTF should import")
    }

    #[test]
    fn reads_triangle_mesh_from_gltf() {
        let (document, buffers, _images) = two_node_gltf();
        let mesh = document.meshes().next().unwrap();

        let model = Model::from_gltf("triangle", mesh, &buffers).unwrap();
        let primitive = &model.primitives[0];

        assert_eq!(primitive.vertices.len(), 3);
        assert_eq!(primitive.indices, vec![0, 1, 2]);
        assert_eq!(primitive.base_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(primitive.vertices[1].position, Vec3::X);
        assert_eq!(primitive.vertices[2].normal, Vec3::Z);
    }

    #[test]
    fn rejects_normals_that_do_not_cover_every_position() {
        let short_normals = TWO_NODE_GLTF.replace(
            r#"{ "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3" }"#,
            r#"{ "bufferView": 1, "componentType": 5126, "count": 2, "type": "VEC3" }"#,
        );
        let (document, buffers, _images) = gltf::import_slice(short_normals.as_bytes()).unwrap();
        let mesh = document.meshes().next().unwrap();

        let error = Model::from_gltf("triangle", mesh, &buffers).err().unwrap();

        assert!(error.to_string().contains("does not match normal count"));
    }

    #[test]
    fn placeholder_cube_has_outward_counter_clockwise_faces() {
        let model = Model::placeholder_cube("cube", 0.5, [1.0; 4]);
        let primitive = &model.primitives[0];

        assert_eq!(primitive.vertices.len(), 24);
        assert_eq!(primitive.indices.len(), 36);

        for triangle in primitive.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| primitive.vertices[triangle[i] as usize]);
            let face_normal = (b.position - a.position).cross(c.position - a.position);

            assert!(face_normal.dot(a.normal) > 0.0);
            assert!(a.position.abs().max_element() <= 0.5 + 1e-6);
        }
    }
}
