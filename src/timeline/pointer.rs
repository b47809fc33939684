use eframe::egui::Pos2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Enter,
    Move,
    Press,
    Release,
    Leave,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub pos: Pos2,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, pos: Pos2) -> Self {
        Self { kind, pos }
    }
}

/// Host-side effects a drag needs while it is active.
///
/// Global tracking delivers move/release events even when the pointer has
/// left the surface the drag began on.
pub trait PointerHost {
    fn attach_global_tracking(&mut self);
    fn detach_global_tracking(&mut self);
    fn set_selection_suppressed(&mut self, suppressed: bool);
}

/// Records host effects; the egui shell reads the flags every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostFlags {
    pub global_tracking: bool,
    pub selection_suppressed: bool,
}

impl PointerHost for HostFlags {
    fn attach_global_tracking(&mut self) {
        self.global_tracking = true;
    }

    fn detach_global_tracking(&mut self) {
        self.global_tracking = false;
    }

    fn set_selection_suppressed(&mut self, suppressed: bool) {
        self.selection_suppressed = suppressed;
    }
}
