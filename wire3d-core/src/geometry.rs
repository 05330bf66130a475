/// Wireframe geometry records
use std::collections::HashMap;

use crate::error::GeometryError;
use crate::vector::Vector3;

/// Vertices in object space plus edges as index pairs.
///
/// Indices are not range-checked here; the renderer skips edges that point
/// past the vertex array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<Vector3>,
    pub edges: Vec<[usize; 2]>,
}

impl Geometry {
    pub fn new(vertices: Vec<Vector3>, edges: Vec<[usize; 2]>) -> Self {
        Self { vertices, edges }
    }

    /// Build from a flat index array read two at a time.
    pub fn from_indices(vertices: Vec<Vector3>, indices: &[usize]) -> Result<Self, GeometryError> {
        if indices.len() % 2 != 0 {
            return Err(GeometryError::OddIndexCount(indices.len()));
        }
        let edges = indices.chunks_exact(2).map(|pair| [pair[0], pair[1]]).collect();
        Ok(Self { vertices, edges })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The endpoints of an edge, or `None` if either index is out of range.
    pub fn edge_vertices(&self, edge: [usize; 2]) -> Option<(&Vector3, &Vector3)> {
        Some((self.vertices.get(edge[0])?, self.vertices.get(edge[1])?))
    }

    /// Indices of edges that reference a missing vertex.
    pub fn invalid_edges(&self) -> Vec<usize> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, edge)| self.edge_vertices(**edge).is_none())
            .map(|(i, _)| i)
            .collect()
    }
}

/// Incrementally builds a geometry, merging identical vertices and edges.
#[derive(Debug, Default)]
pub struct GeometryBuilder {
    vertices: Vec<Vector3>,
    edges: Vec<[usize; 2]>,
    vertex_lookup: HashMap<[u32; 3], usize>,
    edge_lookup: HashMap<[usize; 2], usize>,
}

impl GeometryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the vertex at this exact position, adding it if unseen.
    pub fn vertex(&mut self, position: [f32; 3]) -> usize {
        // +0.0 and -0.0 are the same point.
        let key = position.map(|c| if c == 0.0 { 0 } else { c.to_bits() });
        *self.vertex_lookup.entry(key).or_insert_with(|| {
            self.vertices.push(Vector3::from(position));
            self.vertices.len() - 1
        })
    }

    /// Add an undirected edge; duplicates and self-loops are ignored.
    pub fn edge(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let key = [a.min(b), a.max(b)];
        if !self.edge_lookup.contains_key(&key) {
            self.edge_lookup.insert(key, self.edges.len());
            self.edges.push([a, b]);
        }
    }

    /// Add the three edges of a triangle.
    pub fn triangle(&mut self, corners: [[f32; 3]; 3]) {
        let [a, b, c] = corners.map(|p| self.vertex(p));
        self.edge(a, b);
        self.edge(b, c);
        self.edge(c, a);
    }

    pub fn build(self) -> Geometry {
        Geometry::new(self.vertices, self.edges)
    }
}
