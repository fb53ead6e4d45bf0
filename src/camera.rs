use bevy::prelude::*;
use bevy_pancam::{DirectionKeys, PanCam, PanCamPlugin};

use crate::{EguiBlockInputState, tiles::TileMapResources};

pub struct CameraSystemPlugin;

impl Plugin for CameraSystemPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PanCamPlugin)
            .add_systems(Startup, setup_camera)
            .add_systems(Update, (center_on_mount.run_if(resource_added::<TileMapResources>), handle_pancam));
    }
}

/// Zooming swaps tile levels instead of scaling the camera, so pancam only pans.
fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Transform::from_xyz(0.0, 0.0, 1.0),
        PanCam {
            grab_buttons: vec![MouseButton::Middle],
            move_keys: DirectionKeys {
                up: vec![KeyCode::ArrowUp],
                down: vec![KeyCode::ArrowDown],
                left: vec![KeyCode::ArrowLeft],
                right: vec![KeyCode::ArrowRight],
            },
            speed: 400.,
            enabled: true,
            zoom_to_cursor: false,
            min_scale: 1.0,
            max_scale: 1.0,
            min_x: f32::NEG_INFINITY,
            max_x: f32::INFINITY,
            min_y: f32::NEG_INFINITY,
            max_y: f32::INFINITY,
        },
    ));
}

fn center_on_mount(res_manager: Res<TileMapResources>, mut camera: Query<&mut Transform, With<Camera2d>>) {
    let Ok(mut transform) = camera.single_mut() else {
        error!("No map camera to center");
        return;
    };
    let starting = res_manager.coord_to_point(res_manager.location_manager.location);
    transform.translation = starting.extend(transform.translation.z);
}

fn handle_pancam(mut query: Query<&mut PanCam>, state: Res<EguiBlockInputState>) {
    if state.is_changed() {
        for mut pancam in &mut query {
            pancam.enabled = !state.block_input;
        }
    }
}
