//! Geometries attached to data containers.
//!
//! A geometry defines how many cells, vertices or edges a container's
//! attribute matrices are expected to describe.

use super::attribute_matrix::AttributeMatrixType;
use super::error::{DataError, DataResult};
use std::fmt;

/// Kind of geometry, used when a filter requires a particular one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Image,
    Vertex,
    Edge,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryKind::Image => "ImageGeometry",
            GeometryKind::Vertex => "VertexGeometry",
            GeometryKind::Edge => "EdgeGeometry",
        };
        write!(f, "{}", name)
    }
}

/// Regular grid of cells
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGeometry {
    dimensions: [usize; 3],
    resolution: [f32; 3],
    origin: [f32; 3],
}

impl ImageGeometry {
    pub fn new(dimensions: [usize; 3], resolution: [f32; 3], origin: [f32; 3]) -> Self {
        Self {
            dimensions,
            resolution,
            origin,
        }
    }

    /// Grid with unit spacing at the origin
    pub fn with_dimensions(dimensions: [usize; 3]) -> Self {
        Self::new(dimensions, [1.0; 3], [0.0; 3])
    }

    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    pub fn resolution(&self) -> [f32; 3] {
        self.resolution
    }

    pub fn origin(&self) -> [f32; 3] {
        self.origin
    }

    pub fn num_cells(&self) -> usize {
        self.dimensions.iter().product()
    }

    /// Linear cell index; x varies fastest
    pub fn index_of(&self, x: usize, y: usize, z: usize) -> usize {
        let [dx, dy, _] = self.dimensions;
        (z * dy + y) * dx + x
    }

    pub fn coords_of(&self, index: usize) -> [usize; 3] {
        let [dx, dy, _] = self.dimensions;
        let plane = dx * dy;
        [index % dx, (index % plane) / dx, index / plane]
    }

    /// Indices of the face-adjacent cells of `index` that lie inside the grid
    pub fn face_neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let [x, y, z] = self.coords_of(index);
        let [dx, dy, dz] = self.dimensions;
        let candidates = [
            (x > 0).then(|| self.index_of(x - 1, y, z)),
            (x + 1 < dx).then(|| self.index_of(x + 1, y, z)),
            (y > 0).then(|| self.index_of(x, y - 1, z)),
            (y + 1 < dy).then(|| self.index_of(x, y + 1, z)),
            (z > 0).then(|| self.index_of(x, y, z - 1)),
            (z + 1 < dz).then(|| self.index_of(x, y, z + 1)),
        ];
        candidates.into_iter().flatten()
    }
}

/// Unconnected points
#[derive(Debug, Clone, PartialEq)]
pub struct VertexGeometry {
    vertices: Vec<[f32; 3]>,
}

impl VertexGeometry {
    pub fn new(vertices: Vec<[f32; 3]>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Vertices connected by line segments
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGeometry {
    vertices: Vec<[f32; 3]>,
    edges: Vec<[usize; 2]>,
}

impl EdgeGeometry {
    /// Build an edge geometry; every edge must reference existing vertices
    pub fn new(vertices: Vec<[f32; 3]>, edges: Vec<[usize; 2]>) -> DataResult<Self> {
        let geometry = Self { vertices, edges };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn validate(&self) -> DataResult<()> {
        let count = self.vertices.len();
        for (i, edge) in self.edges.iter().enumerate() {
            if edge[0] >= count || edge[1] >= count {
                return Err(DataError::InvalidGeometry(format!(
                    "edge {} references vertex {:?} but only {} vertices exist",
                    i, edge, count
                )));
            }
        }
        Ok(())
    }

    /// For every vertex, the edges that use it
    pub fn find_edges_containing_vertex(&self) -> Vec<Vec<usize>> {
        let mut lists = vec![Vec::new(); self.vertices.len()];
        for (edge_index, edge) in self.edges.iter().enumerate() {
            for &vertex in edge {
                if let Some(list) = lists.get_mut(vertex) {
                    if !list.contains(&edge_index) {
                        list.push(edge_index);
                    }
                }
            }
        }
        lists
    }

    /// For every edge, the other edges sharing at least one vertex with it
    pub fn find_edge_neighbors(&self) -> Vec<Vec<usize>> {
        let by_vertex = self.find_edges_containing_vertex();
        self.edges
            .iter()
            .enumerate()
            .map(|(edge_index, edge)| {
                let mut neighbors: Vec<usize> = edge
                    .iter()
                    .filter_map(|v| by_vertex.get(*v))
                    .flatten()
                    .copied()
                    .filter(|other| *other != edge_index)
                    .collect();
                neighbors.sort_unstable();
                neighbors.dedup();
                neighbors
            })
            .collect()
    }
}

/// Geometry attached to a data container
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Image(ImageGeometry),
    Vertex(VertexGeometry),
    Edge(EdgeGeometry),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Image(_) => GeometryKind::Image,
            Geometry::Vertex(_) => GeometryKind::Vertex,
            Geometry::Edge(_) => GeometryKind::Edge,
        }
    }

    /// Cells for images, vertices for vertex clouds, edges for edge meshes
    pub fn element_count(&self) -> usize {
        match self {
            Geometry::Image(g) => g.num_cells(),
            Geometry::Vertex(g) => g.vertex_count(),
            Geometry::Edge(g) => g.edge_count(),
        }
    }

    pub fn vertex_count(&self) -> Option<usize> {
        match self {
            Geometry::Image(_) => None,
            Geometry::Vertex(g) => Some(g.vertex_count()),
            Geometry::Edge(g) => Some(g.vertex_count()),
        }
    }

    pub fn as_image(&self) -> Option<&ImageGeometry> {
        match self {
            Geometry::Image(g) => Some(g),
            _ => None,
        }
    }

    /// Number of tuples an attribute matrix of `matrix_type` must hold for
    /// this geometry, or `None` if the geometry places no constraint on it.
    pub fn expected_tuples(&self, matrix_type: AttributeMatrixType) -> Option<usize> {
        match (self, matrix_type) {
            (Geometry::Image(g), AttributeMatrixType::Cell) => Some(g.num_cells()),
            (Geometry::Vertex(g), AttributeMatrixType::Vertex) => Some(g.vertex_count()),
            (Geometry::Edge(g), AttributeMatrixType::Vertex) => Some(g.vertex_count()),
            (Geometry::Edge(g), AttributeMatrixType::Edge) => Some(g.edge_count()),
            _ => None,
        }
    }
}
