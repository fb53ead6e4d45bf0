use std::collections::HashMap;

use bevy::{prelude::*, sprite::Anchor};

use crate::{
    map::MapOwned,
    tiles::TileMapResources,
    tools::{DrawSession, OverlayId, Positioning, Tooltip, TooltipKind},
};

/// Overlays stack above tiles and features, insert-first ones below the rest.
const OVERLAY_Z: f32 = 10.0;

pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, sync_overlays);
    }
}

/// A tooltip shown on the map. The session's tooltip layer is the source of
/// truth, these entities mirror it.
#[derive(Component, Debug, Clone, Copy)]
pub struct Overlay {
    pub id: OverlayId,
    pub kind: TooltipKind,
}

fn anchor_for(positioning: Positioning) -> Anchor {
    match positioning {
        Positioning::CenterLeft => Anchor::CenterLeft,
        Positioning::BottomCenter => Anchor::BottomCenter,
    }
}

fn text_color(kind: TooltipKind) -> TextColor {
    match kind {
        TooltipKind::Help => TextColor(Color::srgb(0.1, 0.1, 0.1)),
        TooltipKind::Measure => TextColor(Color::WHITE),
        TooltipKind::Static => TextColor(Color::srgb(1.0, 0.8, 0.2)),
    }
}

/// Screen offsets grow down, the world grows up.
fn overlay_transform(tooltip: &Tooltip, res_manager: &TileMapResources) -> Transform {
    let offset = Vec2::new(tooltip.options.offset.x, -tooltip.options.offset.y);
    let world = tooltip
        .position
        .map(|coord| res_manager.coord_to_point(coord) + offset)
        .unwrap_or_default();
    let z = if tooltip.options.insert_first { OVERLAY_Z } else { OVERLAY_Z + 1.0 };
    Transform::from_translation(world.extend(z))
}

fn visibility(tooltip: &Tooltip) -> Visibility {
    if tooltip.is_visible() {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    }
}

pub fn sync_overlays(
    mut commands: Commands,
    session: Option<Res<DrawSession>>,
    res_manager: Option<Res<TileMapResources>>,
    mut overlays: Query<(
        Entity,
        &mut Overlay,
        &mut Text2d,
        &mut TextColor,
        &mut Transform,
        &mut Visibility,
        &mut Anchor,
    )>,
) {
    let (Some(session), Some(res_manager)) = (session, res_manager) else {
        for (entity, ..) in &overlays {
            commands.entity(entity).despawn();
        }
        return;
    };

    let mut existing: HashMap<OverlayId, Entity> = HashMap::new();
    for (entity, overlay, ..) in &overlays {
        if session.tooltips().get(overlay.id).is_some() {
            existing.insert(overlay.id, entity);
        } else {
            commands.entity(entity).despawn();
        }
    }

    for tooltip in session.tooltips().iter() {
        let transform = overlay_transform(tooltip, &res_manager);
        match existing.get(&tooltip.id).and_then(|entity| overlays.get_mut(*entity).ok()) {
            Some((_, mut overlay, mut text, mut color, mut current, mut visible, mut anchor)) => {
                overlay.kind = tooltip.kind;
                if text.0 != tooltip.text {
                    text.0.clone_from(&tooltip.text);
                }
                *color = text_color(tooltip.kind);
                *current = transform;
                *visible = visibility(tooltip);
                *anchor = anchor_for(tooltip.options.positioning);
            }
            None => {
                commands.spawn((
                    Text2d::new(tooltip.text.clone()),
                    TextFont {
                        font_size: 14.0,
                        ..default()
                    },
                    text_color(tooltip.kind),
                    anchor_for(tooltip.options.positioning),
                    transform,
                    visibility(tooltip),
                    Overlay {
                        id: tooltip.id,
                        kind: tooltip.kind,
                    },
                    MapOwned,
                ));
            }
        }
    }
}
