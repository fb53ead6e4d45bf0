use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPreUpdateSet, egui};

use super::DrawMode;

pub struct ToolbarUiPlugin;

impl Plugin for ToolbarUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, toolbar_ui.after(EguiPreUpdateSet::InitContexts));
    }
}

/// The selection shown by the geometry type select. It outlives mounts so a
/// remounted map starts in the mode the user left it in.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ToolbarState {
    pub mode: DrawMode,
}

/// Sent whenever the user picks a geometry type.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSelected(pub DrawMode);

fn toolbar_ui(
    mut contexts: EguiContexts,
    toolbar: Res<ToolbarState>,
    mut selected: EventWriter<ModeSelected>,
) {
    let ctx = contexts.ctx_mut();

    let toolbar_width = 260.0;
    let toolbar_height = 40.0;

    let screen_rect = ctx.screen_rect();
    let toolbar_pos = egui::pos2(
        (screen_rect.width() - toolbar_width) / 2.0,
        screen_rect.height() - toolbar_height - 10.0,
    );

    let mut mode = toolbar.mode;

    egui::Area::new("toolbar".into())
        .fixed_pos(toolbar_pos)
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(egui::Color32::from_rgba_premultiplied(30, 30, 30, 220))
                .corner_radius(10.0)
                .shadow(egui::epaint::Shadow {
                    color: egui::Color32::from_black_alpha(60),
                    offset: [5, 5],
                    blur: 10,
                    spread: 5,
                })
                .show(ui, |ui| {
                    ui.set_width(toolbar_width);
                    ui.set_height(toolbar_height);

                    ui.horizontal_centered(|ui| {
                        ui.spacing_mut().item_spacing = egui::vec2(8.0, 0.0);
                        ui.label(egui::RichText::new("Geometry type:").color(egui::Color32::WHITE));
                        egui::ComboBox::from_id_salt("geometry_type")
                            .selected_text(mode.label())
                            .show_ui(ui, |ui| {
                                for option in DrawMode::ALL {
                                    ui.selectable_value(&mut mode, option, option.label());
                                }
                            });
                    });
                });
        });

    if mode != toolbar.mode {
        selected.write(ModeSelected(mode));
    }
}
