use showroom_ngin::{
    config::{AssetManifest, ShowroomConfig},
    controller::{ApplyOutcome, IgnoreReason},
    data_structures::{
        surface::SurfaceKind,
        texture::{Color, TextureRef},
    },
    errors::ShowroomError,
    resources::loading::LoadProgress,
    scene::{SceneBackend, TeardownReport},
    showroom::Showroom,
    tiling::TileSpec,
    timing::VirtualClock,
    ui::{Sidebar, UiIntent},
};

use crate::common::test_utils::{
    FLOOR, FLOOR_PX, MemorySource, RecordingUi, VIEWPORT, WALL, WALL_PX, catalog, catalog_source,
};

mod common;

type TestShowroom = Showroom<MemorySource, RecordingUi, VirtualClock>;

async fn open(config: &ShowroomConfig, manifest: AssetManifest, source: MemorySource) -> (TestShowroom, RecordingUi, Vec<LoadProgress>) {
    let ui = RecordingUi::new();
    let mut progress = Vec::new();
    let showroom = Showroom::load(
        config,
        manifest,
        source,
        ui.clone(),
        VirtualClock::new(),
        VIEWPORT,
        |p| progress.push(p),
    )
    .await;
    (showroom, ui, progress)
}

#[tokio::test]
async fn startup_joins_every_asset() {
    let (showroom, ui, progress) = open(&ShowroomConfig::default(), catalog(), catalog_source()).await;

    // model + environment + three swatches
    assert_eq!(progress.len(), 5);
    let last = progress.last().unwrap();
    assert!(last.is_done());
    assert_eq!(last.total, 5);
    assert!(last.bytes_loaded > 0);

    assert!(ui.notices().is_empty());
    assert_eq!(showroom.scene().surfaces().len(), 3);
    assert!(showroom.scene().environment().is_some());
    assert!(showroom.texture(&TextureRef::new("textures/oak.png")).is_some());
}

#[tokio::test]
async fn environment_failure_does_not_block_interaction() {
    let manifest = catalog().with_environment("missing.hdr");
    let (mut showroom, ui, progress) = open(&ShowroomConfig::default(), manifest, catalog_source()).await;

    assert!(progress.last().unwrap().is_done());
    assert!(showroom.scene().environment().is_none());
    assert!(matches!(
        ui.notices().as_slice(),
        [ShowroomError::AssetLoadFailed { path, .. }] if path == "missing.hdr"
    ));

    showroom.controller_mut().pointer_down(WALL_PX);
    assert_eq!(showroom.controller().state().selected(), Some(WALL));
}

#[tokio::test]
async fn model_failure_leaves_an_empty_room() {
    let manifest = AssetManifest::new("nowhere.glb");
    let (mut showroom, ui, _) = open(&ShowroomConfig::default(), manifest, catalog_source()).await;

    assert!(showroom.scene().surfaces().is_empty());
    assert_eq!(ui.notices().len(), 1);
    let miss = showroom.controller_mut().pointer_down(WALL_PX);
    assert!(!miss.is_hit());
}

#[tokio::test]
async fn choosing_a_swatch_retextures_the_selection() {
    let (mut showroom, ui, _) = open(&ShowroomConfig::default(), catalog(), catalog_source()).await;
    showroom.controller_mut().pointer_down(WALL_PX);

    let outcome = showroom.dispatch(UiIntent::TextureChosen("brick".into())).await.unwrap();
    assert!(matches!(outcome, Some(ApplyOutcome::Applied { surface, .. }) if surface == WALL));

    let material = showroom.scene().material(WALL.id).unwrap();
    let map = material.map.as_ref().unwrap();
    assert_eq!(map.source, TextureRef::new("textures/brick.png"));
    assert_eq!(map.dimensions(), (8, 4));
    assert!(ui.notices().is_empty());
    assert_eq!(showroom.frame(), vec![WALL.id]);
    assert!(showroom.frame().is_empty());
}

#[tokio::test]
async fn floor_swatch_on_a_wall_is_ignored() {
    let (mut showroom, _, _) = open(&ShowroomConfig::default(), catalog(), catalog_source()).await;
    showroom.controller_mut().pointer_down(WALL_PX);
    showroom.frame();

    let outcome = showroom.choose_texture("oak").await.unwrap();
    assert!(matches!(
        outcome,
        ApplyOutcome::Ignored(IgnoreReason::KindMismatch {
            selected: SurfaceKind::Wall,
            requested: SurfaceKind::Floor
        })
    ));
    assert_eq!(showroom.scene().material(WALL.id).unwrap().map, None);
    assert!(showroom.frame().is_empty());
}

#[tokio::test]
async fn lazy_texture_load_failure_keeps_state() {
    let config = ShowroomConfig::default().with_preload_textures(false);
    let manifest = catalog().with_swatch(showroom_ngin::config::Swatch::new(
        "marble",
        "textures/marble.png",
        SurfaceKind::Floor,
    ));
    let (mut showroom, ui, progress) = open(&config, manifest, catalog_source()).await;
    // Only model and environment were part of the join
    assert_eq!(progress.last().unwrap().total, 2);

    showroom.controller_mut().pointer_down(FLOOR_PX);
    let err = showroom.choose_texture("marble").await.unwrap_err();
    assert!(matches!(err, ShowroomError::TextureLoadFailed { ref path, .. } if path == "textures/marble.png"));
    assert_eq!(ui.notices(), vec![err]);
    assert_eq!(showroom.controller().state().selected(), Some(FLOOR));
    assert_eq!(showroom.scene().material(FLOOR.id).unwrap().map, None);

    // Catalog textures load on demand
    assert!(showroom.choose_texture("oak").await.unwrap().is_applied());
    assert!(showroom.texture(&TextureRef::new("textures/oak.png")).is_some());
}

#[tokio::test]
async fn unknown_swatch_is_reported() {
    let (mut showroom, ui, _) = open(&ShowroomConfig::default(), catalog(), catalog_source()).await;
    let err = showroom.choose_texture("velvet").await.unwrap_err();
    assert_eq!(err, ShowroomError::UnknownSwatch("velvet".into()));
    assert_eq!(ui.notices(), vec![err]);
}

#[tokio::test]
async fn teardown_releases_everything_once() {
    let (mut showroom, _, _) = open(&ShowroomConfig::default(), catalog(), catalog_source()).await;
    showroom.controller_mut().pointer_down(WALL_PX);
    showroom.choose_texture("plaster").await.unwrap();
    showroom.controller_mut().pointer_down(FLOOR_PX);
    showroom.choose_texture("oak").await.unwrap();

    let report = showroom.teardown();
    assert_eq!(
        report,
        TeardownReport {
            geometries: 3,
            materials: 3,
            // plaster and oak bound once each as map and source, plus the environment
            textures: 3,
            framed: 0,
        }
    );
}

#[tokio::test]
async fn teardown_counts_the_cached_frame_once() {
    let (mut showroom, _, _) = open(&ShowroomConfig::default(), catalog(), catalog_source()).await;
    showroom.controller_mut().pointer_down(WALL_PX);
    showroom.choose_texture("plaster").await.unwrap();
    for width_px in 1..=3 {
        let tile = TileSpec::new(200.0, 350.0).with_border(Color::WHITE, width_px);
        showroom.dispatch(UiIntent::TileSpecChosen(tile)).await.unwrap();
    }
    assert_eq!(showroom.controller().engine().cached_variants(), 1);

    let report = showroom.teardown();
    assert_eq!(
        report,
        TeardownReport {
            geometries: 3,
            materials: 3,
            // plaster source, the bound 3px frame (also the cached one), the environment
            textures: 3,
            framed: 1,
        }
    );
}

#[tokio::test]
async fn sidebar_view_model_follows_the_session() {
    let config = ShowroomConfig::default();
    let source = catalog_source();
    let mut showroom = Showroom::load(&config, catalog(), source, Sidebar::new(&config), VirtualClock::new(), VIEWPORT, |_| {}).await;

    assert!(!showroom.ui().is_visible());
    showroom.controller_mut().pointer_down(FLOOR_PX);
    assert!(showroom.ui().is_visible());
    assert_eq!(showroom.ui().panel(), Some(SurfaceKind::Floor));

    showroom.controller_mut().pointer_move(WALL_PX);
    let tooltip = showroom.ui().tooltip().unwrap();
    assert_eq!(tooltip.text, "Wall");
    assert_eq!((tooltip.left, tooltip.top), (WALL_PX.x + 10.0, WALL_PX.y + 10.0));

    showroom.dispatch(UiIntent::ToggleSidebar).await.unwrap();
    assert!(!showroom.ui().is_visible());
    showroom.dispatch(UiIntent::ToggleSidebar).await.unwrap();
    assert!(showroom.ui().is_visible());

    showroom.dispatch(UiIntent::DeselectRequested).await.unwrap();
    assert!(!showroom.ui().is_visible());
    assert_eq!(showroom.scene().emissive(FLOOR.id), showroom.scene().emissive(WALL.id));

    showroom.dispatch(UiIntent::TileSizeChosen { width: -3.0, height: 1.0 }).await.unwrap();
    // Nothing is selected, so the invalid size is never looked at
    assert!(showroom.ui().notices().is_empty());
}

#[test]
fn sidebar_tooltip_uses_the_configured_offset() {
    use showroom_ngin::{pick::ScreenPos, ui::UiSink};

    let config = ShowroomConfig::default().with_tooltip_offset(-4.0, 24.0);
    let mut sidebar = Sidebar::new(&config);
    sidebar.hover_changed(Some(SurfaceKind::Floor), Some(ScreenPos::new(100.0, 50.0)));
    let tooltip = sidebar.tooltip().unwrap();
    assert_eq!(tooltip.text, "Floor");
    assert_eq!((tooltip.left, tooltip.top), (96.0, 74.0));
}
