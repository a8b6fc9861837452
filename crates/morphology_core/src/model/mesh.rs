//! Triangular mesh model.
//!
//! # Responsibility
//! - Hold one triangulated surface as vertex coordinates and face triples.
//! - Normalize heterogeneous producer dtypes into one in-memory shape.
//!
//! # Invariants
//! - Vertices are always `f64`, faces always `u32`.
//! - Face indices are not checked against the vertex count; topology
//!   validation belongs to downstream mesh tooling.

use crate::model::array::{DType, ElementError, NumericArray};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Shape or dtype problems found while building a mesh from raw arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshShapeError {
    /// Vertices are neither `N x 3` nor a flat multiple of three.
    VertexShape(Vec<usize>),
    /// Vertices must be numeric, not boolean.
    VertexDtype(DType),
    /// Flattened face buffer length is not a multiple of three.
    FaceLength(usize),
    /// Face values could not be narrowed to `u32`.
    FaceValues(ElementError),
}

impl Display for MeshShapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VertexShape(shape) => {
                write!(f, "vertices must have shape (N, 3), got {shape:?}")
            }
            Self::VertexDtype(dtype) => write!(f, "vertices must be numeric, got `{dtype}`"),
            Self::FaceLength(len) => {
                write!(f, "faces hold {len} indices, which is not a multiple of 3")
            }
            Self::FaceValues(err) => write!(f, "invalid face indices: {err}"),
        }
    }
}

impl Error for MeshShapeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::FaceValues(err) => Some(err),
            _ => None,
        }
    }
}

/// Triangulated 3D surface.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    vertices: Vec<[f64; 3]>,
    faces: Vec<[u32; 3]>,
}

impl TriangleMesh {
    pub fn new(vertices: Vec<[f64; 3]>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Builds a mesh from raw `vertices` and `faces` arrays.
    ///
    /// Vertices are widened to `f64`; faces are flattened, narrowed to `u32`
    /// and regrouped into triples (`reshape(-1, 3)`).
    pub fn from_arrays(
        vertices: &NumericArray,
        faces: &NumericArray,
    ) -> Result<Self, MeshShapeError> {
        if vertices.dtype() == DType::Bool {
            return Err(MeshShapeError::VertexDtype(DType::Bool));
        }
        let vertex_layout_ok = match vertices.shape() {
            [_, 3] => true,
            [len] => len % 3 == 0,
            _ => false,
        };
        if !vertex_layout_ok {
            return Err(MeshShapeError::VertexShape(vertices.shape().to_vec()));
        }

        if faces.len() % 3 != 0 {
            return Err(MeshShapeError::FaceLength(faces.len()));
        }
        let face_values = faces.to_u32_vec().map_err(MeshShapeError::FaceValues)?;

        let vertices = vertices
            .to_f64_vec()
            .chunks_exact(3)
            .map(|xyz| [xyz[0], xyz[1], xyz[2]])
            .collect();
        let faces = face_values
            .chunks_exact(3)
            .map(|abc| [abc[0], abc[1], abc[2]])
            .collect();

        Ok(Self { vertices, faces })
    }

    pub fn vertices(&self) -> &[[f64; 3]] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Axis-aligned bounding box `(min, max)`; `None` for an empty mesh.
    pub fn bounds(&self) -> Option<([f64; 3], [f64; 3])> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(mut lo, mut hi), v| {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(v[axis]);
                hi[axis] = hi[axis].max(v[axis]);
            }
            (lo, hi)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::{MeshShapeError, TriangleMesh};
    use crate::model::array::NumericArray;

    fn square_vertices() -> NumericArray {
        NumericArray::new(
            vec![4, 3],
            vec![
                0.0f32, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                0.0, 1.0, 0.0,
            ],
        )
        .unwrap()
    }

    #[test]
    fn from_arrays_reshapes_flat_faces_into_triples() {
        let faces = NumericArray::from_vec(vec![0i64, 1, 2, 0, 2, 3]);
        let mesh = TriangleMesh::from_arrays(&square_vertices(), &faces).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.faces()[1], [0, 2, 3]);
        assert_eq!(mesh.vertices()[2], [1.0, 1.0, 0.0]);
    }

    #[test]
    fn from_arrays_accepts_two_dimensional_faces() {
        let faces = NumericArray::new(vec![2, 3], vec![0u16, 1, 2, 0, 2, 3]).unwrap();
        let mesh = TriangleMesh::from_arrays(&square_vertices(), &faces).unwrap();
        assert_eq!(mesh.faces(), &[[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn from_arrays_rejects_wrong_vertex_width() {
        let vertices = NumericArray::new(vec![3, 2], vec![0.0f64; 6]).unwrap();
        let faces = NumericArray::from_vec(vec![0i32, 1, 2]);
        let err = TriangleMesh::from_arrays(&vertices, &faces).unwrap_err();
        assert_eq!(err, MeshShapeError::VertexShape(vec![3, 2]));
    }

    #[test]
    fn from_arrays_rejects_incomplete_face() {
        let faces = NumericArray::from_vec(vec![0i32, 1, 2, 3]);
        let err = TriangleMesh::from_arrays(&square_vertices(), &faces).unwrap_err();
        assert_eq!(err, MeshShapeError::FaceLength(4));
    }

    #[test]
    fn from_arrays_rejects_float_faces() {
        let faces = NumericArray::from_vec(vec![0.0f64, 1.0, 2.0]);
        let err = TriangleMesh::from_arrays(&square_vertices(), &faces).unwrap_err();
        assert!(matches!(err, MeshShapeError::FaceValues(_)));
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let faces = NumericArray::from_vec(vec![0u32, 1, 2]);
        let mesh = TriangleMesh::from_arrays(&square_vertices(), &faces).unwrap();
        assert_eq!(mesh.bounds(), Some(([0.0, 0.0, 0.0], [1.0, 1.0, 0.0])));
        assert_eq!(TriangleMesh::new(Vec::new(), Vec::new()).bounds(), None);
    }
}
