use std::collections::HashMap;

use glam::Mat4;
use id_arena::Arena;

use crate::model::{Buffers, Model};
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::scene_model::{SceneModel, SceneModelId};
use crate::scene_graph::transform::Transform;

pub struct Scene {
    pub objects: Arena<Object3D>,
    pub models: Arena<SceneModel>,
    gltf_mesh_to_model: HashMap<usize, SceneModelId>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            models: Arena::new(),
            gltf_mesh_to_model: HashMap::new(),
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    #[allow(dead_code)]
    pub fn get_object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn add_model(&mut self, model: SceneModel) -> SceneModelId {
        self.models.alloc(model)
    }

    /// Spawns every root node of `scene` under `parent` and returns the spawned roots.
    pub fn spawn_gltf_scene(
        &mut self,
        buffers: Buffers,
        scene: &gltf::Scene,
        parent: Option<ObjectId>,
    ) -> anyhow::Result<Vec<ObjectId>> {
        scene
            .nodes()
            .map(|node| self.spawn_gltf_node(buffers, &node, parent))
            .collect()
    }

    fn spawn_gltf_node(
        &mut self,
        buffers: Buffers,
        node: &gltf::Node,
        parent: Option<ObjectId>,
    ) -> anyhow::Result<ObjectId> {
        let node_name = node.name().unwrap_or("Unnamed").to_string();
        let mut object = Object3D::named(node_name.clone());
        object.transform = Transform::from_gltf(node.transform());

        if let Some(mesh) = node.mesh() {
            let mesh_index = mesh.index();

            let model_id = match self.gltf_mesh_to_model.get(&mesh_index).copied() {
                Some(model_id) => model_id,
                None => {
                    let mesh_name = mesh
                        .name()
                        .map(String::from)
                        .unwrap_or_else(|| format!("{} (Mesh)", node_name));

                    let model = Model::from_gltf(mesh_name, mesh, buffers)?;
                    let model_id = self.add_model(SceneModel::new(model));
                    self.gltf_mesh_to_model.insert(mesh_index, model_id);

                    model_id
                }
            };

            object.model_id = Some(model_id);
        }

        let object_id = self.add_object(object);

        if parent.is_some() {
            self.set_object_parent(object_id, parent);
        }

        for child in node.children() {
            self.spawn_gltf_node(buffers, &child, Some(object_id))?;
        }

        Ok(object_id)
    }

    /// Sets the parent of an object and keeps both child lists in sync
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        let old_parent_id = self.objects.get(child_id).and_then(|child| child.parent_id);

        if let Some(old_parent) = old_parent_id.and_then(|id| self.objects.get_mut(id)) {
            old_parent.child_ids.retain(|&id| id != child_id);
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;
        }

        if let Some(new_parent) = new_parent_id.and_then(|id| self.objects.get_mut(id)) {
            new_parent.child_ids.push(child_id);
        }
    }

    pub fn set_object_transform(&mut self, object_id: ObjectId, transform: Transform) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform = transform;
        }
    }

    #[allow(dead_code)]
    pub fn get_object_transform(&self, object_id: ObjectId) -> Option<&Transform> {
        self.objects.get(object_id).map(|object| &object.transform)
    }

    /// World matrix of every object, parents before children.
    pub fn world_matrices(&self) -> Vec<(ObjectId, Mat4)> {
        let mut matrices = Vec::with_capacity(self.objects.len());

        let roots = self
            .objects
            .iter()
            .filter(|(_, object)| object.parent_id.is_none())
            .map(|(id, _)| id);

        for root_id in roots {
            self.collect_world_matrices(root_id, Mat4::IDENTITY, &mut matrices);
        }

        matrices
    }

    fn collect_world_matrices(
        &self,
        object_id: ObjectId,
        parent_world_matrix: Mat4,
        out: &mut Vec<(ObjectId, Mat4)>,
    ) {
        let Some(object) = self.objects.get(object_id) else {
            return;
        };

        let world_matrix = parent_world_matrix * object.transform.local_matrix();
        out.push((object_id, world_matrix));

        for &child_id in &object.child_ids {
            self.collect_world_matrices(child_id, world_matrix, out);
        }
    }
}
