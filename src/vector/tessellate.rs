use bevy::{
    asset::RenderAssetUsages,
    prelude::*,
    render::mesh::{Indices, PrimitiveTopology},
};
use lyon::{
    math::point,
    path::Path,
    tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers},
};

/// Triangulates a polygon ring given in world space. The ring may or may not
/// repeat its first point at the end.
pub fn tessellate_polygon(ring: &[Vec2]) -> Option<VertexBuffers<[f32; 2], u32>> {
    let mut ring = ring.to_vec();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    if ring.len() < 3 {
        return None;
    }

    let mut builder = Path::builder();
    builder.begin(point(ring[0].x, ring[0].y));
    for p in &ring[1..] {
        builder.line_to(point(p.x, p.y));
    }
    builder.end(true);
    let path = builder.build();

    let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();
    tessellator
        .tessellate_path(
            &path,
            &FillOptions::default(),
            &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| vertex.position().to_array()),
        )
        .ok()?;

    if buffers.indices.is_empty() {
        return None;
    }
    Some(buffers)
}

pub fn polygon_mesh(ring: &[Vec2]) -> Option<Mesh> {
    let buffers = tessellate_polygon(ring)?;
    let positions: Vec<[f32; 3]> = buffers.vertices.iter().map(|[x, y]| [*x, *y, 0.0]).collect();
    let normals = vec![[0.0, 0.0, 1.0]; positions.len()];

    Some(
        Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
            .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
            .with_inserted_indices(Indices::U32(buffers.indices)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_is_two_triangles() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(0.0, 0.0),
        ];
        let buffers = tessellate_polygon(&square).unwrap();
        assert_eq!(buffers.vertices.len(), 4);
        assert_eq!(buffers.indices.len(), 6);
    }

    #[test]
    fn too_few_points_have_no_fill() {
        assert!(tessellate_polygon(&[Vec2::ZERO, Vec2::X]).is_none());
        assert!(tessellate_polygon(&[Vec2::ZERO, Vec2::X, Vec2::ZERO]).is_none());
        assert!(polygon_mesh(&[]).is_none());
    }

    #[test]
    fn mesh_carries_every_vertex() {
        let mesh = polygon_mesh(&[Vec2::ZERO, Vec2::X, Vec2::Y]).unwrap();
        assert_eq!(mesh.count_vertices(), 3);
        assert_eq!(mesh.indices().map(|indices| indices.len()), Some(3));
    }
}
