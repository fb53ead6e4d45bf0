use bevy::math::Vec2;

use crate::types::Coord;

use super::SketchGeometry;

pub const START_MSG: &str = "Click to start drawing";
pub const CONTINUE_POLYGON_MSG: &str = "Click to continue drawing the polygon";
pub const CONTINUE_LINE_MSG: &str = "Click to continue drawing the line";

/// The help text for the sketch currently being drawn.
pub fn help_message(sketch: Option<&SketchGeometry>) -> &'static str {
    match sketch {
        None => START_MSG,
        Some(SketchGeometry::Polygon(_)) => CONTINUE_POLYGON_MSG,
        Some(SketchGeometry::Line(_)) => CONTINUE_LINE_MSG,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipKind {
    Help,
    Measure,
    /// A finished measurement left next to its feature.
    Static,
}

/// Which point of the overlay sits on its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Positioning {
    CenterLeft,
    BottomCenter,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayOptions {
    /// Pixels, screen y grows down.
    pub offset: Vec2,
    pub positioning: Positioning,
    pub stop_event: bool,
    pub insert_first: bool,
}

impl OverlayOptions {
    pub const HELP: OverlayOptions = OverlayOptions {
        offset: Vec2::new(15.0, 0.0),
        positioning: Positioning::CenterLeft,
        stop_event: true,
        insert_first: true,
    };

    pub const MEASURE: OverlayOptions = OverlayOptions {
        offset: Vec2::new(0.0, -15.0),
        positioning: Positioning::BottomCenter,
        stop_event: false,
        insert_first: false,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub id: OverlayId,
    pub kind: TooltipKind,
    pub text: String,
    pub position: Option<Coord>,
    pub hidden: bool,
    pub options: OverlayOptions,
}

impl Tooltip {
    /// An overlay without a position is not placed on the map.
    pub fn is_visible(&self) -> bool {
        !self.hidden && self.position.is_some()
    }
}

/// Every tooltip overlay owned by a drawing session.
///
/// At most one live help and one live measure tooltip exist; finalized
/// measurements stay as static labels until the layer is cleared.
#[derive(Debug, Default)]
pub struct TooltipLayer {
    tooltips: Vec<Tooltip>,
    help: Option<OverlayId>,
    measure: Option<OverlayId>,
    next_id: u64,
}

impl TooltipLayer {
    fn push(&mut self, kind: TooltipKind, hidden: bool, options: OverlayOptions) -> OverlayId {
        let id = OverlayId(self.next_id);
        self.next_id += 1;
        self.tooltips.push(Tooltip {
            id,
            kind,
            text: String::new(),
            position: None,
            hidden,
            options,
        });
        id
    }

    fn get_mut(&mut self, id: OverlayId) -> Option<&mut Tooltip> {
        self.tooltips.iter_mut().find(|tooltip| tooltip.id == id)
    }

    pub fn get(&self, id: OverlayId) -> Option<&Tooltip> {
        self.tooltips.iter().find(|tooltip| tooltip.id == id)
    }

    pub fn help(&self) -> Option<&Tooltip> {
        self.help.and_then(|id| self.get(id))
    }

    pub fn measure(&self) -> Option<&Tooltip> {
        self.measure.and_then(|id| self.get(id))
    }

    pub fn create_help_tooltip(&mut self) -> OverlayId {
        if let Some(id) = self.help {
            return id;
        }
        let id = self.push(TooltipKind::Help, true, OverlayOptions::HELP);
        self.help = Some(id);
        id
    }

    pub fn create_measure_tooltip(&mut self) -> OverlayId {
        if let Some(id) = self.measure {
            return id;
        }
        let id = self.push(TooltipKind::Measure, false, OverlayOptions::MEASURE);
        self.measure = Some(id);
        id
    }

    pub fn show_help(&mut self, message: &str, at: Coord) {
        let Some(id) = self.help else {
            return;
        };
        if let Some(tooltip) = self.get_mut(id) {
            tooltip.text = message.to_string();
            tooltip.position = Some(at);
            tooltip.hidden = false;
        }
    }

    pub fn hide_help(&mut self) {
        let Some(id) = self.help else {
            return;
        };
        if let Some(tooltip) = self.get_mut(id) {
            tooltip.hidden = true;
        }
    }

    pub fn set_measure(&mut self, label: String, at: Option<Coord>) {
        let Some(id) = self.measure else {
            return;
        };
        if let Some(tooltip) = self.get_mut(id) {
            tooltip.text = label;
            tooltip.position = at;
        }
    }

    /// Empties the live measure tooltip after an aborted sketch.
    pub fn reset_measure(&mut self) {
        self.set_measure(String::new(), None);
    }

    /// Pins the live measure tooltip as a static label and starts a fresh one.
    pub fn finalize_measure(&mut self, label: String, at: Option<Coord>) -> Option<OverlayId> {
        let id = self.measure.take()?;
        if let Some(tooltip) = self.get_mut(id) {
            tooltip.kind = TooltipKind::Static;
            tooltip.text = label;
            if at.is_some() {
                tooltip.position = at;
            }
            tooltip.options.offset = Vec2::new(0.0, -7.0);
        }
        self.create_measure_tooltip();
        Some(id)
    }

    /// Drops the help and measure tooltips, static labels stay.
    pub fn release_live(&mut self) -> usize {
        let live = [self.help.take(), self.measure.take()];
        let before = self.tooltips.len();
        self.tooltips.retain(|tooltip| !live.contains(&Some(tooltip.id)));
        before - self.tooltips.len()
    }

    /// Drops every overlay, returning how many there were.
    pub fn clear(&mut self) -> usize {
        self.help = None;
        self.measure = None;
        let released = self.tooltips.len();
        self.tooltips.clear();
        released
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tooltip> {
        self.tooltips.iter()
    }

    pub fn len(&self) -> usize {
        self.tooltips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tooltips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_message_follows_sketch_type() {
        let line = SketchGeometry::line(&[Coord::new(0.0, 0.0), Coord::new(1.0, 1.0)]);
        let polygon = SketchGeometry::polygon(&[Coord::new(0.0, 0.0), Coord::new(1.0, 1.0)]);

        assert_eq!(help_message(None), "Click to start drawing");
        assert_eq!(help_message(Some(&line)), "Click to continue drawing the line");
        assert_eq!(help_message(Some(&polygon)), "Click to continue drawing the polygon");
    }

    #[test]
    fn creation_is_idempotent_and_uses_the_overlay_options() {
        let mut layer = TooltipLayer::default();
        let help = layer.create_help_tooltip();
        assert_eq!(layer.create_help_tooltip(), help);
        let measure = layer.create_measure_tooltip();
        assert_eq!(layer.create_measure_tooltip(), measure);
        assert_eq!(layer.len(), 2);

        let help = layer.help().unwrap();
        assert!(help.hidden);
        assert_eq!(help.options.offset, Vec2::new(15.0, 0.0));
        assert_eq!(help.options.positioning, Positioning::CenterLeft);

        let measure = layer.measure().unwrap();
        assert_eq!(measure.options.offset, Vec2::new(0.0, -15.0));
        assert_eq!(measure.options.positioning, Positioning::BottomCenter);
        assert!(!measure.options.stop_event);
        assert!(!measure.options.insert_first);
    }

    #[test]
    fn missing_tooltips_are_skipped() {
        let mut layer = TooltipLayer::default();
        layer.show_help(START_MSG, Coord::new(1.0, 1.0));
        layer.hide_help();
        layer.set_measure("5 m".into(), None);
        assert_eq!(layer.finalize_measure("5 m".into(), None), None);
        assert!(layer.is_empty());
    }

    #[test]
    fn help_is_shown_at_the_pointer_and_hidden_again() {
        let mut layer = TooltipLayer::default();
        layer.create_help_tooltip();
        layer.show_help(START_MSG, Coord::new(1.0, 2.0));

        let help = layer.help().unwrap();
        assert!(help.is_visible());
        assert_eq!(help.text, START_MSG);
        assert_eq!(help.position, Some(Coord::new(1.0, 2.0)));

        layer.hide_help();
        assert!(!layer.help().unwrap().is_visible());
    }

    #[test]
    fn finalized_measure_becomes_static_and_is_replaced() {
        let mut layer = TooltipLayer::default();
        layer.create_measure_tooltip();
        layer.set_measure("0.15 km".into(), Some(Coord::new(1.0, 1.0)));

        let finished = layer.finalize_measure("0.15 km".into(), None).unwrap();
        let label = layer.get(finished).unwrap();
        assert_eq!(label.kind, TooltipKind::Static);
        assert_eq!(label.position, Some(Coord::new(1.0, 1.0)));

        let fresh = layer.measure().unwrap();
        assert_ne!(fresh.id, finished);
        assert!(fresh.text.is_empty());
        assert_eq!(layer.len(), 2);
    }

    #[test]
    fn releasing_live_tooltips_keeps_static_labels() {
        let mut layer = TooltipLayer::default();
        layer.create_measure_tooltip();
        layer.create_help_tooltip();
        layer.finalize_measure("50 m".into(), Some(Coord::new(0.0, 0.0)));

        assert_eq!(layer.release_live(), 2);
        assert_eq!(layer.len(), 1);
        assert!(layer.help().is_none() && layer.measure().is_none());

        assert_eq!(layer.clear(), 1);
        assert!(layer.is_empty());
    }
}
