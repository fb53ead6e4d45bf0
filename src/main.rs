use bevy::{
    log::LogPlugin,
    prelude::*,
    winit::{UpdateMode, WinitSettings},
};

use bevy_egui::EguiPlugin;
use camera::CameraSystemPlugin;
use config::MapConfig;
use debug::DebugPlugin;
use interaction::InteractionSystemPlugin;
use map::MapLifecyclePlugin;
use overlay::OverlayPlugin;
use tiles::TileMapPlugin;
use tools::ToolsPlugin;
use vector::VectorLayerPlugin;

pub mod camera;
pub mod config;
pub mod debug;
pub mod error;
pub mod interaction;
pub mod map;
pub mod overlay;
pub mod tiles;
pub mod tools;
pub mod types;
pub mod vector;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Measure".to_string(),
                        ..Default::default()
                    }),
                    ..Default::default()
                })
                .set(LogPlugin {
                    filter: "wgpu=error,naga=warn".to_string(),
                    ..Default::default()
                }),
        )
        // Loaded after the log plugin so config problems are reported.
        .insert_resource(MapConfig::load())
        .add_plugins(DebugPlugin)
        .add_plugins(EguiPlugin {
            enable_multipass_for_primary_context: false,
        })
        .insert_resource(EguiBlockInputState::default())
        .add_plugins((CameraSystemPlugin, InteractionSystemPlugin))
        .insert_resource(WinitSettings {
            unfocused_mode: UpdateMode::Reactive {
                wait: std::time::Duration::from_secs(1),
                react_to_device_events: true,
                react_to_user_events: true,
                react_to_window_events: true,
            },
            ..Default::default()
        })
        .insert_resource(ClearColor(Color::from(Srgba {
            red: 0.9,
            green: 0.9,
            blue: 0.8,
            alpha: 1.0,
        })))
        .add_plugins(TileMapPlugin)
        .add_plugins(VectorLayerPlugin)
        .add_plugins(OverlayPlugin)
        .add_plugins(ToolsPlugin)
        .add_plugins(MapLifecyclePlugin)
        .add_systems(Update, absorb_egui_inputs.before(interaction::MapInputSet))
        .run();
}

#[derive(Resource, Default)]
pub struct EguiBlockInputState {
    pub block_input: bool,
}

fn absorb_egui_inputs(mut contexts: bevy_egui::EguiContexts, mut state: ResMut<EguiBlockInputState>) {
    let ctx = contexts.ctx_mut();
    let block_input = ctx.wants_pointer_input() || ctx.is_pointer_over_area();
    // Only write on change so pancam reacts to the edge.
    if state.block_input != block_input {
        state.block_input = block_input;
    }
}
