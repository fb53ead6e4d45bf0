use bevy::{
    color::palettes::css::GOLD,
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    prelude::*,
};

use crate::{overlay::Overlay, tools::DrawSession};

pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        if cfg!(debug_assertions) {
            app.add_plugins(FrameTimeDiagnosticsPlugin::default())
                .add_systems(Startup, (debug_draw_fps, debug_draw_session))
                .add_systems(Update, (text_update_fps, count_session));
        }
    }
}

#[derive(Component)]
pub struct FpsText;

#[derive(Component)]
pub struct SessionText;

fn debug_label(commands: &mut Commands, label: &str, node: Node, marker: impl Component) {
    commands
        .spawn((
            Text::new(label),
            TextFont {
                font_size: 21.0,
                ..default()
            },
            node,
        ))
        .with_child((
            TextSpan::default(),
            (
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(GOLD.into()),
            ),
            marker,
        ));
}

pub fn debug_draw_fps(mut commands: Commands) {
    let node = Node {
        position_type: PositionType::Absolute,
        top: Val::Px(5.0),
        right: Val::Px(5.0),
        ..default()
    };
    debug_label(&mut commands, "FPS: ", node, FpsText);
}

pub fn debug_draw_session(mut commands: Commands) {
    let node = Node {
        position_type: PositionType::Absolute,
        bottom: Val::Px(5.0),
        right: Val::Px(5.0),
        ..default()
    };
    debug_label(&mut commands, "Overlays / interactions: ", node, SessionText);
}

pub fn text_update_fps(diagnostics: Res<DiagnosticsStore>, mut query: Query<&mut TextSpan, With<FpsText>>) {
    for mut span in &mut query {
        if let Some(value) = diagnostics
            .get(&FrameTimeDiagnosticsPlugin::FPS)
            .and_then(|fps| fps.smoothed())
        {
            **span = format!("{value:.2}");
        }
    }
}

/// Overlay entities next to attached interactions, a leak shows up as a growing first number.
pub fn count_session(
    overlays: Query<(), With<Overlay>>,
    session: Option<Res<DrawSession>>,
    mut query: Query<&mut TextSpan, With<SessionText>>,
) {
    let interactions = session.map_or(0, |session| session.controller().attached_count());
    for mut span in &mut query {
        **span = format!("{} / {}", overlays.iter().count(), interactions);
    }
}
