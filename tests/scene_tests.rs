use fdtd_geom::{
    error::BuildError,
    material::{MaterialKind, Property},
    scene::Scene,
    settings,
    sphere::{SphereParams, Smoothing},
};

fn sphere(p1: [f64; 3], r: f64, material_id: &str) -> SphereParams {
    SphereParams {
        p1: Some(p1),
        r: Some(r),
        material_id: Some(material_id.to_string()),
        ..Default::default()
    }
}

fn empty_scene() -> Scene {
    let mut settings = settings::load_default_config().unwrap();
    settings.spheres.clear();
    Scene::new(settings).unwrap()
}

#[test]
fn default_model_builds() {
    let settings = settings::load_default_config().unwrap();
    let num_spheres = settings.spheres.len();
    let mut scene = Scene::new(settings).unwrap();
    scene.build().unwrap();

    assert_eq!(scene.summaries.len(), num_spheres);
    assert_eq!(scene.summaries[0].smoothing, Smoothing::On);
    assert_eq!(scene.summaries[1].smoothing, Smoothing::Off);
    assert_eq!(scene.summaries[2].smoothing, Smoothing::Off); // anisotropic
    assert_eq!(scene.summaries[3].smoothing, Smoothing::Off); // not averagable

    let crystal = scene.registry.find("crystal_x+crystal_y+crystal_z").unwrap();
    assert_eq!(crystal.kind, MaterialKind::DielectricSmoothed);
    assert_eq!(crystal.er, Property::Scalar(4.0));
}

#[test]
fn num_ids_are_dense_after_build() {
    let mut scene = Scene::new(settings::load_default_config().unwrap()).unwrap();
    scene.build().unwrap();
    for (expected, material) in scene.registry.iter().enumerate() {
        assert_eq!(material.num_id as usize, expected);
    }
    let max = *scene.grid.solid.iter().max().unwrap();
    assert!((max as usize) < scene.registry.len());
}

#[test]
fn overlapping_spheres_last_writer_wins() {
    let a = sphere([0.05, 0.06, 0.06], 0.02, "sand");
    let b = sphere([0.07, 0.06, 0.06], 0.02, "water");

    let mut forward = empty_scene();
    forward.add_sphere(a.clone()).unwrap();
    forward.add_sphere(b.clone()).unwrap();

    let mut reverse = empty_scene();
    reverse.add_sphere(b).unwrap();
    reverse.add_sphere(a).unwrap();

    let sand = forward.registry.find("sand").unwrap().num_id;
    let water = forward.registry.find("water").unwrap().num_id;
    // cell 30 is 5 cells from the first centre and 5 from the second
    assert_eq!(forward.grid.solid[[30, 30, 30]], water);
    assert_eq!(reverse.grid.solid[[30, 30, 30]], sand);
    // outside the overlap each sphere keeps its own material
    assert_eq!(forward.grid.solid[[18, 30, 30]], sand);
    assert_eq!(reverse.grid.solid[[42, 30, 30]], water);
}

#[test]
fn repeated_anisotropic_triple_adds_one_material() {
    let mut scene = empty_scene();
    let before = scene.registry.len();
    let triple = SphereParams {
        p1: Some([0.03, 0.03, 0.03]),
        r: Some(0.01),
        material_ids: Some(vec![
            "crystal_x".to_string(),
            "crystal_y".to_string(),
            "crystal_z".to_string(),
        ]),
        averaging: Some(true),
        ..Default::default()
    };
    let first = scene.add_sphere(triple.clone()).unwrap();
    let mut moved = triple;
    moved.p1 = Some([0.09, 0.09, 0.09]);
    scene.add_sphere(moved).unwrap();

    assert_eq!(first.smoothing, Smoothing::Off);
    assert_eq!(scene.registry.len(), before + 1);
}

#[test]
fn invalid_commands_leave_the_grid_untouched() {
    let mut scene = empty_scene();
    let grid = scene.grid.clone();
    let materials = scene.registry.len();

    let err = scene
        .add_sphere(sphere([0.06, 0.06, 0.06], 0.02, "foo"))
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::MaterialNotFound {
            ids: vec!["foo".to_string()]
        }
    );

    let err = scene
        .add_sphere(sphere([0.06, 0.06, 0.06], -0.02, "sand"))
        .unwrap_err();
    assert!(matches!(err, BuildError::Geometry { .. }));

    let err = scene
        .add_sphere(SphereParams {
            p1: Some([0.06, 0.06, 0.06]),
            r: Some(0.02),
            material_ids: Some(vec!["sand".to_string(), "foo".to_string(), "bar".to_string()]),
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::MaterialNotFound {
            ids: vec!["foo".to_string(), "bar".to_string()]
        }
    );

    assert_eq!(scene.grid, grid);
    assert_eq!(scene.registry.len(), materials);
    assert!(scene.summaries.is_empty());
}

#[test]
fn sphere_outside_domain_is_valid() {
    let mut scene = empty_scene();
    let grid = scene.grid.clone();
    let summary = scene
        .add_sphere(sphere([1.0, 1.0, 1.0], 0.01, "sand"))
        .unwrap();
    assert_eq!(summary.cells, 0);
    assert_eq!(scene.grid, grid);
}
