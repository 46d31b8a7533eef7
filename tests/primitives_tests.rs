//! Geometry Primitive Tests
//!
//! Tests for:
//! - Screen quad, unit cube and UV sphere layouts
//! - PrimitiveCache: lazy, build-once slots per kind

use std::cell::Cell;

use prism::renderer::primitives::PrimitiveCache;
use prism::resources::primitives::{
    PrimitiveKind, SPHERE_SEGMENTS, create_screen_quad, create_unit_cube, create_uv_sphere,
};

#[test]
fn quad_is_four_vertex_strip_covering_clip_space() {
    let quad = create_screen_quad();
    assert_eq!(quad.vertices.len(), 4);
    assert_eq!(quad.topology, wgpu::PrimitiveTopology::TriangleStrip);

    for v in &quad.vertices {
        let [x, y, z] = v.position;
        assert_eq!(x.abs(), 1.0);
        assert_eq!(y.abs(), 1.0);
        assert_eq!(z, 0.0);
        // Top of the screen samples v = 0.
        assert_eq!(v.uv[1], if y > 0.0 { 0.0 } else { 1.0 });
    }
}

#[test]
fn cube_spans_unit_extent_with_face_normals() {
    let cube = create_unit_cube();
    assert_eq!(cube.vertices.len(), 24);
    assert_eq!(cube.indices.len(), 36);
    assert_eq!(cube.topology, wgpu::PrimitiveTopology::TriangleList);

    for v in &cube.vertices {
        assert!(v.position.iter().all(|c| c.abs() == 1.0));
        let n = glam::Vec3::from(v.normal);
        assert!((n.length() - 1.0).abs() < 1e-6);
        // The normal points along the face the vertex sits on.
        assert!((glam::Vec3::from(v.position).dot(n) - 1.0).abs() < 1e-6);
    }
}

#[test]
fn cube_faces_wind_outward() {
    let cube = create_unit_cube();
    for tri in cube.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]]
            .map(|i| glam::Vec3::from(cube.vertices[i as usize].position));
        let face_normal = (b - a).cross(c - a);
        let expected = glam::Vec3::from(cube.vertices[tri[0] as usize].normal);
        assert!(face_normal.dot(expected) > 0.0);
    }
}

#[test]
fn probe_sphere_uses_64_segments() {
    let sphere = PrimitiveKind::Sphere.build();
    let expected = create_uv_sphere(SPHERE_SEGMENTS, SPHERE_SEGMENTS);
    assert_eq!(sphere.vertices.len(), expected.vertices.len());
    assert_eq!(sphere.indices, expected.indices);
    assert_eq!(sphere.topology, wgpu::PrimitiveTopology::TriangleStrip);
    assert_eq!(sphere.strip_index_format(), Some(wgpu::IndexFormat::Uint32));
}

#[test]
fn cache_builds_each_kind_once() {
    let builds = Cell::new(0);
    let mut cache: PrimitiveCache<usize> = PrimitiveCache::new();

    for _ in 0..3 {
        for kind in PrimitiveKind::ALL {
            let value = *cache.get_or_insert_with(kind, |k| {
                builds.set(builds.get() + 1);
                k.index()
            });
            assert_eq!(value, kind.index());
        }
    }

    assert_eq!(builds.get(), 3);
}

#[test]
fn cache_is_lazy() {
    let mut cache: PrimitiveCache<&str> = PrimitiveCache::new();
    assert!(PrimitiveKind::ALL.iter().all(|k| !cache.is_built(*k)));

    cache.get_or_insert_with(PrimitiveKind::Cube, PrimitiveKind::label);
    assert!(cache.is_built(PrimitiveKind::Cube));
    assert!(!cache.is_built(PrimitiveKind::Quad));
    assert_eq!(cache.cached(PrimitiveKind::Cube), Some(&"Unit Cube"));
}
