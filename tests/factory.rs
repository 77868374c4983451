use std::path::{Path, PathBuf};

use objmaster::{
    om_format::{Material, TextureSlot, VertexRecord},
    FileAssets, LoadOptions, ModelCache, ObjFactory, ObjMaster,
};
use tempfile::TempDir;

fn models_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/models")
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_factory_round_trip() -> anyhow::Result<()> {
    init_logger();
    let mut cache = ModelCache::new(FileAssets, LoadOptions::default());
    let original = cache.load(&models_dir(), "figure.obj")?;
    let factory = ObjFactory::from_model(cache.model(original)?);

    let tmp = TempDir::new()?;
    let dir = tmp.path();
    factory.save(dir, "figure_copy.obj")?;
    assert!(dir.join("figure_copy.mtl").exists());

    let copy = cache.load(dir, "figure_copy.obj")?;
    assert_ne!(original, copy);
    assert_eq!(cache.model(copy)?.as_ref(), cache.model(original)?.as_ref());

    Ok(())
}

#[test]
fn test_build_from_scratch() -> anyhow::Result<()> {
    init_logger();
    let mut factory = ObjFactory::new();
    let corners = [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 2.0, 0.0], [0.0, 2.0, 0.0]];
    for (i, position) in corners.iter().enumerate() {
        let uv = [(i % 2) as f32, (i / 2) as f32];
        factory.add_vertex(VertexRecord::new(*position, [0.0, 0.0, 1.0], uv));
    }

    factory.add_material(
        Material::new("Tiles")
            .with_diffuse([0.5, 0.5, 0.5])
            .with_texture(TextureSlot::Diffuse, "tiles.png"),
    );
    factory.use_group("Floor");
    factory.use_material("Tiles");
    factory.add_face(0, 1, 2)?;
    factory.use_material("Grout");
    factory.add_face(0, 2, 3)?;

    let tmp = TempDir::new()?;
    let dir = tmp.path();
    factory.save(dir, "floor.obj")?;

    let mut master = ObjMaster::default();
    let handle = master.load_model(dir, "floor.obj");
    assert_eq!(master.mesh_count(handle), 2);
    assert_eq!(master.group_face_name(handle, 0), Some("Floor:mtl:Tiles"));
    assert_eq!(master.group_face_name(handle, 1), Some("Floor:mtl:Grout"));
    assert_eq!(master.indices(handle, 1), Some(&[0, 1, 2][..]));
    assert_eq!(
        master.texture_file_name(handle, 0, TextureSlot::Diffuse),
        Some("tiles.png")
    );
    assert!(master.mesh_material(handle, 1).fields().is_empty());

    let vertices = master.vertex_buffer(handle, 1).unwrap_or_default();
    assert_eq!(vertices[2].position, [0.0, 2.0, 0.0]);
    assert_eq!(vertices[2].uv, [1.0, 1.0]);

    Ok(())
}

#[test]
fn test_facade_factory_from_model() -> anyhow::Result<()> {
    init_logger();
    let mut master = ObjMaster::default();
    let factory = master.create_factory_from_model(models_dir(), "quad.obj");
    assert!(factory >= 0);
    assert!(master.cache().is_empty());

    let tmp = TempDir::new()?;
    let dir = tmp.path();
    assert!(master.factory_use_group(factory, "Extra"));
    assert!(master.save_factory(factory, dir, "quad.obj", true));
    assert!(!master.close_factory(factory));

    let handle = master.load_model(dir, "quad.obj");
    assert_eq!(master.mesh_count(handle), 1);
    assert_eq!(master.vertex_count(handle, 0), 4);
    assert_eq!(
        master.texture_file_name(handle, 0, TextureSlot::Normal),
        Some("skin_normal.png")
    );

    Ok(())
}
