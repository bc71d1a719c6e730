//! Precedence relations between activity events.
//!
//! An [`ActivitySequence`] states that an event (start or finish) of the
//! first activity strictly precedes an event of the second. Relations
//! carry no time lag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An activity event: its first or its last occupied slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    Start,
    Finish,
}

impl Event {
    /// Bit used to address the event inside an activity's node pair.
    #[inline]
    pub(crate) fn bit(self) -> usize {
        match self {
            Event::Start => 0,
            Event::Finish => 1,
        }
    }

    #[inline]
    pub(crate) fn from_bit(bit: usize) -> Self {
        if bit & 1 == 0 {
            Event::Start
        } else {
            Event::Finish
        }
    }
}

/// Kind of a precedence relation, named `<event of 1st>-<event of 2nd>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequenceKind {
    /// `start(a1) < start(a2)`
    #[serde(rename = "SS")]
    StartStart,
    /// `start(a1) < finish(a2)`
    #[serde(rename = "SF")]
    StartFinish,
    /// `finish(a1) < start(a2)`
    #[serde(rename = "FS")]
    FinishStart,
    /// `finish(a1) < finish(a2)`
    #[serde(rename = "FF")]
    FinishFinish,
}

impl SequenceKind {
    /// Event of the first activity.
    pub fn from_event(self) -> Event {
        match self {
            SequenceKind::StartStart | SequenceKind::StartFinish => Event::Start,
            SequenceKind::FinishStart | SequenceKind::FinishFinish => Event::Finish,
        }
    }

    /// Event of the second activity.
    pub fn to_event(self) -> Event {
        match self {
            SequenceKind::StartStart | SequenceKind::FinishStart => Event::Start,
            SequenceKind::StartFinish | SequenceKind::FinishFinish => Event::Finish,
        }
    }

    /// Kind relating the two given events.
    pub fn between(from: Event, to: Event) -> Self {
        match (from, to) {
            (Event::Start, Event::Start) => SequenceKind::StartStart,
            (Event::Start, Event::Finish) => SequenceKind::StartFinish,
            (Event::Finish, Event::Start) => SequenceKind::FinishStart,
            (Event::Finish, Event::Finish) => SequenceKind::FinishFinish,
        }
    }

    /// Whether resolved event times satisfy the relation.
    pub fn holds(self, first: (usize, usize), second: (usize, usize)) -> bool {
        let pick = |times: (usize, usize), event: Event| match event {
            Event::Start => times.0,
            Event::Finish => times.1,
        };
        pick(first, self.from_event()) < pick(second, self.to_event())
    }

    /// Two-letter code (`SS`, `SF`, `FS`, `FF`).
    pub fn code(self) -> &'static str {
        match self {
            SequenceKind::StartStart => "SS",
            SequenceKind::StartFinish => "SF",
            SequenceKind::FinishStart => "FS",
            SequenceKind::FinishFinish => "FF",
        }
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// "Event of `first` strictly precedes event of `second`."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivitySequence {
    pub first: usize,
    pub second: usize,
    pub kind: SequenceKind,
}

impl ActivitySequence {
    pub fn new(first: usize, second: usize, kind: SequenceKind) -> Self {
        Self {
            first,
            second,
            kind,
        }
    }
}

impl fmt::Display for ActivitySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.first, self.second, self.kind)
    }
}
