//! What hooks hand to the view layer: style props, event handlers, and the
//! events those handlers understand.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use crate::animation::{Style, Transition, TransitionSpec};

/// Named keys that matter to motion hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Escape,
    Tab,
    Char(char),
}

impl Key {
    /// Keys that activate a button-like element.
    pub fn activates(&self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}

/// Input forwarded by the view layer to a hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEvent {
    PointerEnter { x: f32, y: f32 },
    PointerLeave,
    PointerMove { x: f32, y: f32 },
    PointerDown { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    /// The pointer was captured elsewhere or the gesture was aborted.
    PointerCancel,
    TouchStart { x: f32, y: f32 },
    TouchMove { x: f32, y: f32 },
    TouchEnd,
    KeyDown { key: Key },
    KeyUp { key: Key },
    FocusIn,
    FocusOut,
}

impl InteractionEvent {
    pub fn coords(&self) -> Option<(f32, f32)> {
        match self {
            InteractionEvent::PointerEnter { x, y }
            | InteractionEvent::PointerMove { x, y }
            | InteractionEvent::PointerDown { x, y }
            | InteractionEvent::PointerUp { x, y }
            | InteractionEvent::TouchStart { x, y }
            | InteractionEvent::TouchMove { x, y } => Some((*x, *y)),
            InteractionEvent::PointerLeave
            | InteractionEvent::PointerCancel
            | InteractionEvent::TouchEnd
            | InteractionEvent::KeyDown { .. }
            | InteractionEvent::KeyUp { .. }
            | InteractionEvent::FocusIn
            | InteractionEvent::FocusOut => None,
        }
    }

    pub fn channel(&self) -> InteractionChannels {
        match self {
            InteractionEvent::PointerEnter { .. }
            | InteractionEvent::PointerLeave
            | InteractionEvent::PointerMove { .. }
            | InteractionEvent::PointerDown { .. }
            | InteractionEvent::PointerUp { .. }
            | InteractionEvent::PointerCancel => InteractionChannels::POINTER,
            InteractionEvent::TouchStart { .. }
            | InteractionEvent::TouchMove { .. }
            | InteractionEvent::TouchEnd => InteractionChannels::TOUCH,
            InteractionEvent::KeyDown { .. } | InteractionEvent::KeyUp { .. } => {
                InteractionChannels::KEYBOARD
            }
            InteractionEvent::FocusIn | InteractionEvent::FocusOut => InteractionChannels::FOCUS,
        }
    }
}

bitflags! {
    /// Input channels a set of handlers wants bound.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct InteractionChannels: u8 {
        const POINTER  = 0b0001;
        const TOUCH    = 0b0010;
        const KEYBOARD = 0b0100;
        const FOCUS    = 0b1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    Ignored,
    Handled,
}

type Handler = Rc<dyn Fn(&InteractionEvent) -> EventResponse>;

/// Event callbacks for the view layer to bind on the animated element.
#[derive(Clone)]
pub struct EventHandlers {
    channels: InteractionChannels,
    handler: Option<Handler>,
}

impl EventHandlers {
    /// Handlers that bind nothing.
    pub fn none() -> Self {
        Self {
            channels: InteractionChannels::empty(),
            handler: None,
        }
    }

    pub fn new(
        channels: InteractionChannels,
        handler: impl Fn(&InteractionEvent) -> EventResponse + 'static,
    ) -> Self {
        Self {
            channels,
            handler: Some(Rc::new(handler)),
        }
    }

    pub fn channels(&self) -> InteractionChannels {
        self.channels
    }

    pub fn listens_to(&self, channel: InteractionChannels) -> bool {
        self.channels.intersects(channel)
    }

    pub fn is_empty(&self) -> bool {
        self.handler.is_none() || self.channels.is_empty()
    }

    /// Deliver `event`. Events on channels the handlers did not ask for
    /// are ignored.
    pub fn dispatch(&self, event: &InteractionEvent) -> EventResponse {
        match &self.handler {
            Some(handler) if self.listens_to(event.channel()) => handler(event),
            _ => EventResponse::Ignored,
        }
    }
}

impl Default for EventHandlers {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlers")
            .field("channels", &self.channels)
            .finish()
    }
}

/// Which end of an animation an element should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Hidden,
    Visible,
}

/// Style data for one animated element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationProps {
    /// Rendered before the first activation.
    pub initial: Style,
    /// The style to animate towards right now.
    pub animate: Style,
    pub variant: Variant,
    pub transition: TransitionSpec,
}

impl AnimationProps {
    /// Props for an element that renders statically in its final state.
    pub fn fixed(style: Style) -> Self {
        Self {
            initial: style,
            animate: style,
            variant: Variant::Visible,
            transition: Transition::instant().to_spec(),
        }
    }
}
