//! Loading meshes and textures from disk. Failures here are fatal and
//! bubble up as `anyhow` errors at scene construction.

use std::path::Path;

use anyhow::Context as _;
use wgpu::util::DeviceExt;

use crate::data_structures::model::{Material, Mesh, Model, ModelVertex};
use crate::data_structures::texture::Texture;

pub fn load_string(path: impl AsRef<Path>) -> anyhow::Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

pub fn load_binary(path: impl AsRef<Path>) -> anyhow::Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

pub fn load_texture(
    path: impl AsRef<Path>,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let path = path.as_ref();
    let bytes = load_binary(path)?;
    Texture::from_bytes(device, queue, &bytes, &path.display().to_string())
}

/// Load a wavefront obj with its materials. Materials without a diffuse
/// map get a 1x1 texture of the material's diffuse colour; meshes without
/// a material get a plain white one.
pub fn load_model_obj(
    path: impl AsRef<Path>,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture_layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<Model> {
    let path = path.as_ref();
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .with_context(|| format!("loading {}", path.display()))?;
    let obj_materials = materials.unwrap_or_default();

    let mut loaded_materials = Vec::with_capacity(obj_materials.len() + 1);
    for m in &obj_materials {
        let diffuse_texture = match &m.diffuse_texture {
            Some(file) => load_texture(base_dir.join(file), device, queue)?,
            None => {
                let [r, g, b] = m.diffuse.unwrap_or([1.0, 1.0, 1.0]);
                Texture::from_colour(
                    device,
                    queue,
                    [
                        (r * 255.0) as u8,
                        (g * 255.0) as u8,
                        (b * 255.0) as u8,
                        255,
                    ],
                    &m.name,
                )
            }
        };
        loaded_materials.push(Material::new(device, &m.name, diffuse_texture, texture_layout));
    }
    // fallback material for meshes that reference none
    let fallback = loaded_materials.len();
    loaded_materials.push(Material::new(
        device,
        "fallback",
        Texture::from_colour(device, queue, [255, 255, 255, 255], "fallback diffuse"),
        texture_layout,
    ));

    let meshes = models
        .iter()
        .map(|m| {
            let mesh = &m.mesh;
            let vertex_count = mesh.positions.len() / 3;
            let vertices: Vec<ModelVertex> = (0..vertex_count)
                .map(|i| ModelVertex {
                    position: [
                        mesh.positions[i * 3],
                        mesh.positions[i * 3 + 1],
                        mesh.positions[i * 3 + 2],
                    ],
                    tex_coords: if mesh.texcoords.len() >= (i + 1) * 2 {
                        // obj uv origin is bottom left
                        [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
                    } else {
                        [0.0, 0.0]
                    },
                    normal: if mesh.normals.len() >= (i + 1) * 3 {
                        [
                            mesh.normals[i * 3],
                            mesh.normals[i * 3 + 1],
                            mesh.normals[i * 3 + 2],
                        ]
                    } else {
                        [0.0, 1.0, 0.0]
                    },
                })
                .collect();

            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} vertices", m.name)),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} indices", m.name)),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

            Mesh {
                name: m.name.clone(),
                vertex_buffer,
                index_buffer,
                num_elements: mesh.indices.len() as u32,
                material: mesh.material_id.unwrap_or(fallback),
            }
        })
        .collect();

    Ok(Model {
        meshes,
        materials: loaded_materials,
    })
}
