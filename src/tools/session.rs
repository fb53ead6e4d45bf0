use bevy::prelude::*;

use crate::{types::Coord, vector::DrawnFeature};

use super::{
    DrawEvent, DrawMode, InteractionController, ModeTransition, SketchGeometry, TooltipLayer,
    help_message,
};

/// State of one mounted drawing session: the attached interaction, the sketch
/// being measured and the tooltips shown for it.
#[derive(Resource, Debug, Default)]
pub struct DrawSession {
    controller: InteractionController,
    sketch: Option<SketchGeometry>,
    tooltips: TooltipLayer,
    mode: DrawMode,
}

/// What tearing a session down released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeardownReport {
    pub interactions: usize,
    pub overlays: usize,
}

impl DrawSession {
    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn tooltips(&self) -> &TooltipLayer {
        &self.tooltips
    }

    pub fn sketch(&self) -> Option<&SketchGeometry> {
        self.sketch.as_ref()
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn select_mode(&mut self, mode: DrawMode) -> ModeTransition {
        self.mode = mode;
        let transition = self.controller.select(mode);

        if let Some(handle) = transition.detached {
            self.sketch = None;
            let released = self.tooltips.release_live();
            debug!("Detached draw interaction {handle:?}, released {released} tooltips");
        }
        if let Some((handle, geometry_type)) = transition.attached {
            self.tooltips.create_measure_tooltip();
            self.tooltips.create_help_tooltip();
            info!("Drawing {geometry_type:?} with interaction {handle:?}");
        }
        transition
    }

    /// Drags pan the map and leave the help tooltip alone.
    pub fn on_pointer_move(&mut self, at: Coord, dragging: bool) {
        if dragging {
            return;
        }
        let event = self
            .controller
            .interaction_mut()
            .and_then(|interaction| interaction.pointer_move(at));
        if let Some(event) = event {
            self.dispatch(event);
        }
        self.tooltips.show_help(help_message(self.sketch.as_ref()), at);
    }

    pub fn on_pointer_leave(&mut self) {
        self.tooltips.hide_help();
    }

    /// Returns the features the click finished.
    pub fn on_click(&mut self, at: Coord, near: impl Fn(Coord) -> bool) -> Vec<DrawnFeature> {
        let Some(interaction) = self.controller.interaction_mut() else {
            return Vec::new();
        };
        let events = interaction.click(at, near);
        events.into_iter().filter_map(|event| self.dispatch(event)).collect()
    }

    pub fn finish_sketch(&mut self) -> Option<DrawnFeature> {
        let event = self.controller.interaction_mut()?.finish()?;
        self.dispatch(event)
    }

    pub fn abort_sketch(&mut self) {
        let event = self
            .controller
            .interaction_mut()
            .and_then(|interaction| interaction.abort());
        if let Some(event) = event {
            self.dispatch(event);
        }
    }

    pub fn remove_last_point(&mut self) {
        let event = self
            .controller
            .interaction_mut()
            .and_then(|interaction| interaction.remove_last_point());
        if let Some(event) = event {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: DrawEvent) -> Option<DrawnFeature> {
        match event {
            DrawEvent::DrawStart { coordinate } => {
                self.on_draw_start(coordinate);
                None
            }
            DrawEvent::Change(geometry) => {
                self.on_geometry_change(geometry);
                None
            }
            DrawEvent::DrawEnd(feature) => {
                self.on_draw_end(&feature);
                Some(feature)
            }
            DrawEvent::DrawAbort => {
                self.sketch = None;
                self.tooltips.reset_measure();
                debug!("Sketch aborted");
                None
            }
        }
    }

    fn on_draw_start(&mut self, coordinate: Coord) {
        self.sketch = self
            .controller
            .interaction()
            .and_then(|interaction| interaction.sketch_geometry());
        debug!("Sketch started at {coordinate:?}");
    }

    fn on_geometry_change(&mut self, geometry: SketchGeometry) {
        self.tooltips.set_measure(geometry.label(), geometry.tooltip_anchor());
        self.sketch = Some(geometry);
    }

    fn on_draw_end(&mut self, feature: &DrawnFeature) {
        if let Some(geometry) = feature.geometry.measurable() {
            let label = geometry.label();
            info!("Finished {:?}: {label}", geometry.geometry_type());
            self.tooltips.finalize_measure(label, geometry.tooltip_anchor());
        }
        self.sketch = None;
    }

    /// Detaches the interaction and drops every overlay.
    pub fn teardown(&mut self) -> TeardownReport {
        self.sketch = None;
        let interactions = usize::from(self.controller.detach().is_some());
        let overlays = self.tooltips.clear();
        TeardownReport {
            interactions,
            overlays,
        }
    }
}
