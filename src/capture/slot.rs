use serde::Serialize;
use std::fmt;

use crate::camera::types::CameraSelector;

/// One camera feed destined for one display surface.
#[derive(Debug, Clone)]
pub struct CameraSlot<V> {
    pub selector: CameraSelector,
    pub surface: V,
}

impl<V> CameraSlot<V> {
    pub fn new(selector: CameraSelector, surface: V) -> Self {
        Self { selector, surface }
    }
}

/// What happened when wiring one slot.
///
/// Every variant except `Wired` is a silent skip: the remaining slots are
/// still wired and nothing attached earlier for this slot is rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotOutcome {
    Wired,
    /// No camera matches the selector.
    SkippedNoDevice,
    /// The camera exists but its input could not be opened.
    SkippedInputUnavailable,
    SkippedRejectedInput,
    /// Input stays attached without connections.
    SkippedRejectedOutput,
    /// Input and output stay attached without connections.
    SkippedRejectedConnection,
    SkippedNoVideoPort,
    SkippedRejectedPreview,
}

impl SlotOutcome {
    pub fn is_wired(self) -> bool {
        self == Self::Wired
    }

    pub fn as_id_str(self) -> &'static str {
        match self {
            Self::Wired => "wired",
            Self::SkippedNoDevice => "skipped_no_device",
            Self::SkippedInputUnavailable => "skipped_input_unavailable",
            Self::SkippedRejectedInput => "skipped_rejected_input",
            Self::SkippedRejectedOutput => "skipped_rejected_output",
            Self::SkippedRejectedConnection => "skipped_rejected_connection",
            Self::SkippedNoVideoPort => "skipped_no_video_port",
            Self::SkippedRejectedPreview => "skipped_rejected_preview",
        }
    }
}

impl fmt::Display for SlotOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_id_str())
    }
}

/// Per-slot outcomes of one wiring pass, in slot order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WiringReport {
    pub outcomes: Vec<(CameraSelector, SlotOutcome)>,
}

impl WiringReport {
    pub fn push(&mut self, selector: CameraSelector, outcome: SlotOutcome) {
        self.outcomes.push((selector, outcome));
    }

    pub fn wired(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_wired()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.wired()
    }

    pub fn outcome_for(&self, selector: CameraSelector) -> Option<SlotOutcome> {
        self.outcomes
            .iter()
            .find(|(s, _)| *s == selector)
            .map(|(_, o)| *o)
    }
}

impl fmt::Display for WiringReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} wired", self.wired(), self.outcomes.len())?;
        for (selector, outcome) in self.outcomes.iter().filter(|(_, o)| !o.is_wired()) {
            write!(f, ", {selector}: {outcome}")?;
        }
        Ok(())
    }
}
