//! Picks a few pixels against the wireframe of a cube and prints the hits.
//!
//! Run with `RUST_LOG=debug cargo run --example pick_demo` to see the
//! material rebuild and geometry warnings.

use thickline::*;

const PRESET: &str = r#"{
    "linewidth": 6.0,
    "resolution": [1280.0, 720.0],
    "dashed": true,
    "dash_size": 0.1,
    "gap_size": 0.05
}"#;

fn cube() -> (Vec<Vec3>, Vec<[u32; 3]>) {
    let vertices = vec![
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
    ];
    let faces = vec![
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [3, 6, 2],
        [3, 7, 6],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];
    (vertices, faces)
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let style = LineStyle::from_json(PRESET)?;
    let viewport = style.resolution;

    let (vertices, faces) = cube();
    // Feature edges drop the face diagonals of the wireframe.
    let geometry = SegmentGeometry::from_edges(&vertices, &faces, 30.0)?;
    log::info!(
        "cube: {} wireframe edges, {} feature edges",
        SegmentGeometry::from_wireframe(&vertices, &faces)?.instance_count(),
        geometry.instance_count()
    );

    let mut lines = ThickLineSegments::new(geometry, LineMaterial::new(style));
    lines.compute_line_distances()?;

    let mut camera = Camera::new(viewport.x / viewport.y);
    if let Some(aabb) = lines.world_bounding_box() {
        camera.look_at_box(&aabb);
    }

    let params = PickParams::with_line_threshold(2.0);
    for pixel in [
        viewport * 0.5,
        Vec2::new(viewport.x * 0.5, viewport.y * 0.3),
        Vec2::new(10.0, 10.0),
    ] {
        let Some(raycaster) = Raycaster::from_screen(&camera, pixel, viewport) else {
            continue;
        };
        let hits = lines.pick(&raycaster.with_params(params));
        match hits.first() {
            Some(hit) => println!(
                "pixel {pixel}: {} hit(s), nearest edge {} at {} (distance {:.3})",
                hits.len(),
                hit.instance_index,
                hit.point_on_line,
                hit.distance
            ),
            None => println!("pixel {pixel}: no hit"),
        }
    }

    let program = lines.material_mut().build()?;
    println!(
        "program generation {}: {} uniforms, {} bytes of WGSL",
        program.generation,
        program.uniforms.len(),
        program.vertex_source.len() + program.fragment_source.len()
    );

    Ok(())
}
