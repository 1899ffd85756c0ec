/// Discrete input from the UI surface.
///
/// Values arrive exactly as the controls report them; interpretation
/// (e.g. which color mode a radio value names) belongs to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    StepForward,
    StepBackward,
    /// Slider dragged to a 0-based frame index.
    SliderInput(usize),
    /// Color-mode radio toggled; carries the radio's value.
    ColorMode(String),
}

/// FIFO of pending UI events, drained by the controller.
#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<UiEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: UiEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[UiEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, UiEvent};

    #[test]
    fn keeps_emission_order() {
        let mut bus = EventBus::new();
        bus.emit(UiEvent::StepForward);
        bus.emit(UiEvent::SliderInput(4));
        assert_eq!(
            bus.events(),
            &[UiEvent::StepForward, UiEvent::SliderInput(4)]
        );
    }

    #[test]
    fn drain_clears_events() {
        let mut bus = EventBus::new();
        bus.emit(UiEvent::ColorMode("class".into()));
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert!(bus.events().is_empty());
    }
}
