use super::DrawInteraction;

/// The value of the geometry type select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawMode {
    #[default]
    None,
    Point,
    LineString,
    Polygon,
}

impl DrawMode {
    pub const ALL: [DrawMode; 4] = [
        DrawMode::None,
        DrawMode::Point,
        DrawMode::LineString,
        DrawMode::Polygon,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DrawMode::None => "None",
            DrawMode::Point => "Point",
            DrawMode::LineString => "LineString",
            DrawMode::Polygon => "Polygon",
        }
    }

    pub fn geometry_type(&self) -> Option<GeometryType> {
        match self {
            DrawMode::None => None,
            DrawMode::Point => Some(GeometryType::Point),
            DrawMode::LineString => Some(GeometryType::LineString),
            DrawMode::Polygon => Some(GeometryType::Polygon),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
}

/// Identifies an attached draw interaction. Detaching reports the handle it released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InteractionHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Inactive,
    Drawing(GeometryType),
}

/// What a mode selection did: the detach always happens before the attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeTransition {
    pub detached: Option<InteractionHandle>,
    pub attached: Option<(InteractionHandle, GeometryType)>,
}

/// Owns the single draw interaction that may be attached to the map.
#[derive(Debug, Default)]
pub struct InteractionController {
    active: Option<DrawInteraction>,
    next_handle: u64,
}

impl InteractionController {
    pub fn state(&self) -> ControllerState {
        match &self.active {
            Some(interaction) => ControllerState::Drawing(interaction.geometry_type()),
            None => ControllerState::Inactive,
        }
    }

    pub fn attached_count(&self) -> usize {
        usize::from(self.active.is_some())
    }

    pub fn interaction(&self) -> Option<&DrawInteraction> {
        self.active.as_ref()
    }

    pub fn interaction_mut(&mut self) -> Option<&mut DrawInteraction> {
        self.active.as_mut()
    }

    pub fn select(&mut self, mode: DrawMode) -> ModeTransition {
        let detached = self.detach();
        let attached = mode.geometry_type().map(|geometry_type| {
            let handle = self.attach(geometry_type);
            (handle, geometry_type)
        });
        ModeTransition { detached, attached }
    }

    pub fn detach(&mut self) -> Option<InteractionHandle> {
        self.active.take().map(|interaction| interaction.handle())
    }

    fn attach(&mut self, geometry_type: GeometryType) -> InteractionHandle {
        debug_assert!(self.active.is_none());
        let handle = InteractionHandle(self.next_handle);
        self.next_handle += 1;
        self.active = Some(DrawInteraction::new(handle, geometry_type));
        handle
    }
}
