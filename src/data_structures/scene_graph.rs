//! Arena-backed scene graph.
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeId`], so the
//! graph is a plain data structure without interior mutability or reference
//! counting. Ids stay valid for the lifetime of the graph.

use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::error::EngineError;

/// Index of a node inside its [`SceneGraph`]. Only meaningful for the graph
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
pub struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    scale: Vector3<f32>,
    translate: Vector3<f32>,
    ready: bool,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            parent: None,
            children: Vec::new(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            translate: Vector3::new(0.0, 0.0, 0.0),
            ready: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn local_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
            * Matrix4::from_translation(self.translate)
    }
}

pub struct SceneGraph {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SceneGraph {
    /// A graph always has a root. The root is exempt from the readiness
    /// check during rendering.
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut root = Node::new(root_name.into());
        root.ready = true;
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached node. It takes part in nothing until attached.
    pub fn new_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name.into()));
        id
    }

    /// Create a node and attach it to `parent` in one step.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, EngineError> {
        let id = self.new_node(name);
        self.attach(parent, id)?;
        Ok(id)
    }

    /// Attach `child` under `parent`. A node may only ever have one parent;
    /// re-parenting is not supported.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), EngineError> {
        if self.nodes[child.0].parent.is_some() {
            return Err(EngineError::NodeAlreadyParented(
                self.nodes[child.0].name.clone(),
            ));
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn set_scale(&mut self, id: NodeId, scale: Vector3<f32>) {
        self.nodes[id.0].scale = scale;
    }

    pub fn set_translate(&mut self, id: NodeId, translate: Vector3<f32>) {
        self.nodes[id.0].translate = translate;
    }

    /// Nodes start out not ready and fail [`render`](Self::render) until
    /// marked. Call this once the node's GPU data exists.
    pub fn mark_ready(&mut self, id: NodeId) {
        self.nodes[id.0].ready = true;
    }

    /// Depth first search by name starting at `from`, which itself is a
    /// candidate. First match wins.
    pub fn find(&self, from: NodeId, name: &str) -> Option<NodeId> {
        if self.nodes[from.0].name == name {
            return Some(from);
        }
        for &child in &self.nodes[from.0].children {
            if let Some(found) = self.find(child, name) {
                return Some(found);
            }
        }
        None
    }

    /// Pre-order walk. The visitor returning `false` stops the whole
    /// traversal, not just the current branch.
    pub fn traverse(&self, from: NodeId, visit: &mut dyn FnMut(&Node) -> bool) -> bool {
        if !visit(&self.nodes[from.0]) {
            return false;
        }
        for &child in &self.nodes[from.0].children {
            if !self.traverse(child, visit) {
                return false;
            }
        }
        true
    }

    /// Walk the subtree composing model matrices and hand every node to
    /// `visit` along with its composed matrix. The graph issues no draw
    /// calls itself; attached renderers decide what to do per node.
    ///
    /// A non-root node that has not been marked ready aborts the walk.
    pub fn render(
        &self,
        from: NodeId,
        visit: &mut dyn FnMut(NodeId, &Node, Matrix4<f32>),
    ) -> Result<(), EngineError> {
        self.render_inner(from, Matrix4::identity(), visit)
    }

    fn render_inner(
        &self,
        id: NodeId,
        parent_model: Matrix4<f32>,
        visit: &mut dyn FnMut(NodeId, &Node, Matrix4<f32>),
    ) -> Result<(), EngineError> {
        let node = &self.nodes[id.0];
        if !node.ready && node.parent.is_some() {
            return Err(EngineError::NodeNotReady(node.name.clone()));
        }
        let model = parent_model * node.local_matrix();
        visit(id, node, model);
        for &child in &node.children {
            self.render_inner(child, model, visit)?;
        }
        Ok(())
    }
}
