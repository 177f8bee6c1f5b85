//! Wires camera slots into a shared multi-camera session.
//!
//! Each slot gets its own input → output connection plus a preview
//! connection into a layer on the slot's surface. Slots are independent:
//! a slot that fails at any step is skipped and the next one is tried.

use tracing::{debug, info, warn};

use crate::camera::backend::{
    CaptureBackend, DeviceInput, DisplaySurface, InputPort, LayerOf, MultiCamSession,
    PreviewLayer,
};
use crate::camera::error::{CaptureError, Result};
use crate::camera::types::{MediaType, VideoGravity};
use crate::capture::slot::{CameraSlot, SlotOutcome, WiringReport};

/// Configure `session` with one pipeline per slot, in slot order.
///
/// Returns `MultiCamUnsupported` without touching the session when the
/// hardware cannot run cameras concurrently. Otherwise every attach
/// happens inside a single configuration transaction, and each layer
/// that gets connected is added to its surface and appended to
/// `preview_layers`.
pub fn configure_session<B, V>(
    backend: &B,
    session: &mut B::Session,
    slots: &mut [CameraSlot<V>],
    preview_layers: &mut Vec<LayerOf<B>>,
) -> Result<WiringReport>
where
    B: CaptureBackend,
    V: DisplaySurface<Layer = LayerOf<B>>,
{
    if !backend.is_multi_cam_supported() {
        warn!("Multi-camera capture is not supported on this device");
        return Err(CaptureError::MultiCamUnsupported);
    }

    session.begin_configuration();

    let mut report = WiringReport::default();
    for slot in slots.iter_mut() {
        let outcome = wire_slot(backend, session, slot, preview_layers);
        if !outcome.is_wired() {
            debug!("Skipping camera {}: {outcome}", slot.selector);
        }
        report.push(slot.selector, outcome);
    }

    session.commit_configuration();

    info!("Multi-camera session configured: {report}");
    Ok(report)
}

/// Wire a single slot. Attachments made before a failing step stay in
/// the session.
fn wire_slot<B, V>(
    backend: &B,
    session: &mut B::Session,
    slot: &mut CameraSlot<V>,
    preview_layers: &mut Vec<LayerOf<B>>,
) -> SlotOutcome
where
    B: CaptureBackend,
    V: DisplaySurface<Layer = LayerOf<B>>,
{
    let Some(device) = backend.default_device(slot.selector) else {
        return SlotOutcome::SkippedNoDevice;
    };

    let input = match backend.device_input(&device) {
        Ok(input) => input,
        Err(e) => {
            debug!("{e}");
            return SlotOutcome::SkippedInputUnavailable;
        }
    };
    if !session.can_add_input(&input) {
        return SlotOutcome::SkippedRejectedInput;
    }
    session.add_input_with_no_connections(&input);

    let output = session.new_video_output();
    if !session.can_add_output(&output) {
        return SlotOutcome::SkippedRejectedOutput;
    }
    session.add_output_with_no_connections(&output);

    let ports = input.ports();
    let connection = session.output_connection(&ports, &output);
    if !session.can_add_connection(&connection) {
        return SlotOutcome::SkippedRejectedConnection;
    }
    session.add_connection(&connection);

    let mut layer = session.new_preview_layer();
    layer.set_video_gravity(VideoGravity::ResizeAspectFill);
    layer.set_frame(slot.surface.bounds());

    let Some(video_port) = ports.iter().find(|p| p.media_type() == MediaType::Video) else {
        return SlotOutcome::SkippedNoVideoPort;
    };
    let preview = session.preview_connection(video_port, &layer);
    if !session.can_add_connection(&preview) {
        return SlotOutcome::SkippedRejectedPreview;
    }
    session.add_connection(&preview);

    slot.surface.add_sublayer(&layer);
    preview_layers.push(layer);
    SlotOutcome::Wired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::dummy::{
        DummyBackend, DummyConnection, DummyPreviewLayer, DummySession, DummySurface,
    };
    use crate::camera::types::{CameraSelector, DeviceKind, DevicePosition, Rect};

    fn default_slots() -> Vec<CameraSlot<DummySurface>> {
        vec![
            CameraSlot::new(
                CameraSelector::wide_back(),
                DummySurface::new("view1", Rect::sized(390.0, 280.0)),
            ),
            CameraSlot::new(
                CameraSelector::ultra_wide_back(),
                DummySurface::new("view2", Rect::sized(390.0, 280.0)),
            ),
            CameraSlot::new(
                CameraSelector::wide_front(),
                DummySurface::new("view3", Rect::sized(195.0, 140.0)),
            ),
        ]
    }

    struct Wiring {
        result: Result<WiringReport>,
        session: DummySession,
        slots: Vec<CameraSlot<DummySurface>>,
        layers: Vec<DummyPreviewLayer>,
    }

    /// Run the procedure against a fresh session from `backend`.
    fn run(backend: &DummyBackend) -> Wiring {
        let mut session = backend.new_session();
        let mut slots = default_slots();
        let mut layers = Vec::new();
        let result = configure_session(backend, &mut session, &mut slots, &mut layers);
        Wiring {
            result,
            session,
            slots,
            layers,
        }
    }

    fn connections_from(session: &DummySession, selector: CameraSelector) -> usize {
        session
            .committed()
            .connections
            .iter()
            .filter(|c| c.source() == Some(selector))
            .count()
    }

    #[test]
    fn all_cameras_available_wires_every_slot() {
        let Wiring {
            result,
            session,
            slots,
            layers,
        } = run(&DummyBackend::new());
        let report = result.unwrap();

        assert_eq!(report.wired(), 3);
        assert_eq!(layers.len(), 3);
        for slot in &slots {
            assert_eq!(slot.surface.sublayers().len(), 1);
        }

        let graph = session.committed();
        assert_eq!(graph.inputs.len(), 3);
        assert_eq!(graph.outputs.len(), 3);
        assert_eq!(graph.connections.len(), 6);
        assert_eq!(session.commit_count(), 1);
        assert!(!session.is_configuring());
    }

    #[test]
    fn layers_fill_their_surface_with_aspect_fill() {
        let Wiring { slots, layers, .. } = run(&DummyBackend::new());

        for (slot, layer) in slots.iter().zip(&layers) {
            assert_eq!(layer.frame(), slot.surface.bounds());
            assert_eq!(layer.video_gravity(), VideoGravity::ResizeAspectFill);
            assert_eq!(&slot.surface.sublayers()[0], layer);
        }
    }

    #[test]
    fn layer_list_preserves_slot_order() {
        let Wiring {
            session,
            layers,
            ..
        } = run(&DummyBackend::new());

        let preview_sources: Vec<CameraSelector> = layers
            .iter()
            .filter_map(|layer| {
                session.committed().connections.iter().find_map(|c| match c {
                    DummyConnection::Preview { source, layer: id } if *id == layer.id => {
                        Some(*source)
                    }
                    _ => None,
                })
            })
            .collect();

        assert_eq!(
            preview_sources,
            vec![
                CameraSelector::wide_back(),
                CameraSelector::ultra_wide_back(),
                CameraSelector::wide_front()
            ]
        );
    }

    #[test]
    fn missing_camera_skips_only_its_slot() {
        let backend = DummyBackend::new().without_camera(CameraSelector::ultra_wide_back());
        let Wiring {
            result,
            session,
            slots,
            layers,
        } = run(&backend);
        let report = result.unwrap();

        assert_eq!(report.wired(), 2);
        assert_eq!(
            report.outcome_for(CameraSelector::ultra_wide_back()),
            Some(SlotOutcome::SkippedNoDevice)
        );
        assert_eq!(layers.len(), 2);
        assert!(slots[1].surface.sublayers().is_empty());
        assert_eq!(connections_from(&session, CameraSelector::ultra_wide_back()), 0);
        assert_eq!(session.committed().inputs.len(), 2);
    }

    #[test]
    fn unsupported_platform_leaves_session_untouched() {
        let backend = DummyBackend::new().unsupported();
        let Wiring {
            result,
            session,
            slots,
            layers,
        } = run(&backend);

        assert_eq!(result.unwrap_err(), CaptureError::MultiCamUnsupported);
        assert!(!session.is_configuring());
        assert_eq!(session.commit_count(), 0);
        assert!(session.committed().inputs.is_empty());
        assert!(session.committed().outputs.is_empty());
        assert!(session.committed().connections.is_empty());
        assert!(layers.is_empty());
        assert!(slots.iter().all(|s| s.surface.sublayers().is_empty()));
    }

    #[test]
    fn input_failure_is_skipped() {
        let sel = CameraSelector::wide_front();
        let Wiring {
            result,
            session,
            layers,
            ..
        } = run(&DummyBackend::new().with_input_failure(sel));

        assert_eq!(
            result.unwrap().outcome_for(sel),
            Some(SlotOutcome::SkippedInputUnavailable)
        );
        assert_eq!(layers.len(), 2);
        assert_eq!(session.committed().inputs.len(), 2);
    }

    #[test]
    fn rejected_input_is_skipped() {
        let sel = CameraSelector::wide_back();
        let Wiring {
            result,
            session,
            slots,
            ..
        } = run(&DummyBackend::new().rejecting_input(sel));

        assert_eq!(
            result.unwrap().outcome_for(sel),
            Some(SlotOutcome::SkippedRejectedInput)
        );
        assert!(slots[0].surface.sublayers().is_empty());
        assert_eq!(connections_from(&session, sel), 0);
    }

    #[test]
    fn rejected_output_leaves_input_attached_without_connections() {
        let backend = DummyBackend::new().with_output_limit(2);
        let Wiring {
            result,
            session,
            slots,
            layers,
        } = run(&backend);
        let report = result.unwrap();

        assert_eq!(
            report.outcome_for(CameraSelector::wide_front()),
            Some(SlotOutcome::SkippedRejectedOutput)
        );
        assert_eq!(layers.len(), 2);
        assert!(slots[2].surface.sublayers().is_empty());

        let graph = session.committed();
        assert_eq!(graph.inputs.len(), 3);
        assert_eq!(graph.outputs.len(), 2);
        assert_eq!(connections_from(&session, CameraSelector::wide_front()), 0);
    }

    #[test]
    fn rejected_connection_leaves_input_and_output_attached() {
        let sel = CameraSelector::ultra_wide_back();
        let backend = DummyBackend::new().rejecting_output_connection(sel);
        let Wiring {
            result,
            session,
            layers,
            ..
        } = run(&backend);

        assert_eq!(
            result.unwrap().outcome_for(sel),
            Some(SlotOutcome::SkippedRejectedConnection)
        );
        assert_eq!(layers.len(), 2);
        let graph = session.committed();
        assert_eq!(graph.inputs.len(), 3);
        assert_eq!(graph.outputs.len(), 3);
        assert_eq!(connections_from(&session, sel), 0);
    }

    #[test]
    fn input_without_ports_is_refused_its_output_connection() {
        let sel = CameraSelector::wide_front();
        let backend = DummyBackend::new().with_ports(sel, vec![]);
        let Wiring {
            result,
            session,
            slots,
            layers,
        } = run(&backend);

        assert_eq!(
            result.unwrap().outcome_for(sel),
            Some(SlotOutcome::SkippedRejectedConnection)
        );
        assert!(slots[2].surface.sublayers().is_empty());
        assert_eq!(layers.len(), 2);

        let graph = session.committed();
        assert_eq!(graph.inputs.len(), 3);
        assert_eq!(graph.outputs.len(), 3);
        assert_eq!(graph.connections.len(), 4);
        assert_eq!(connections_from(&session, sel), 0);
        assert_eq!(connections_from(&session, CameraSelector::wide_back()), 2);
    }

    #[test]
    fn telephoto_camera_wires_a_fourth_slot() {
        let tele = CameraSelector::new(DeviceKind::Telephoto, DevicePosition::Back);
        let backend = DummyBackend::new().with_camera(tele);
        let mut session = backend.new_session();
        let mut slots = default_slots();
        slots.push(CameraSlot::new(
            tele,
            DummySurface::new("view4", Rect::sized(390.0, 280.0)),
        ));
        let mut layers = Vec::new();

        let report = configure_session(&backend, &mut session, &mut slots, &mut layers).unwrap();

        assert_eq!(report.wired(), 4);
        assert_eq!(report.outcome_for(tele), Some(SlotOutcome::Wired));
        assert_eq!(layers.len(), 4);
        assert_eq!(slots[3].surface.sublayers().len(), 1);
        assert_eq!(session.committed().connections.len(), 8);
        assert_eq!(connections_from(&session, tele), 2);
    }

    #[test]
    fn input_without_video_port_skips_preview() {
        let sel = CameraSelector::wide_back();
        // A metadata-only input still connects to its frame output.
        let backend = DummyBackend::new().with_ports(sel, vec![MediaType::Metadata]);
        let Wiring {
            result,
            session,
            slots,
            layers,
        } = run(&backend);

        assert_eq!(
            result.unwrap().outcome_for(sel),
            Some(SlotOutcome::SkippedNoVideoPort)
        );
        assert!(slots[0].surface.sublayers().is_empty());
        assert_eq!(layers.len(), 2);
        assert_eq!(connections_from(&session, sel), 1);
    }

    #[test]
    fn rejected_preview_keeps_output_connection() {
        let sel = CameraSelector::wide_front();
        let backend = DummyBackend::new().rejecting_preview_connection(sel);
        let Wiring {
            result,
            session,
            slots,
            layers,
        } = run(&backend);

        assert_eq!(
            result.unwrap().outcome_for(sel),
            Some(SlotOutcome::SkippedRejectedPreview)
        );
        assert!(slots[2].surface.sublayers().is_empty());
        assert_eq!(layers.len(), 2);
        assert_eq!(connections_from(&session, sel), 1);
    }

    #[test]
    fn duplicate_selector_is_rejected_on_second_slot() {
        let backend = DummyBackend::new();
        let mut session = backend.new_session();
        let mut slots = vec![
            CameraSlot::new(
                CameraSelector::wide_back(),
                DummySurface::new("a", Rect::sized(10.0, 10.0)),
            ),
            CameraSlot::new(
                CameraSelector::wide_back(),
                DummySurface::new("b", Rect::sized(10.0, 10.0)),
            ),
        ];
        let mut layers = Vec::new();

        let report = configure_session(&backend, &mut session, &mut slots, &mut layers).unwrap();

        assert_eq!(
            report.outcomes,
            vec![
                (CameraSelector::wide_back(), SlotOutcome::Wired),
                (CameraSelector::wide_back(), SlotOutcome::SkippedRejectedInput),
            ]
        );
        assert_eq!(layers.len(), 1);
    }

    #[test]
    fn fresh_sessions_wire_identically() {
        let backend = DummyBackend::new();
        let Wiring {
            result: first,
            layers: first_layers,
            ..
        } = run(&backend);
        let Wiring {
            result: second,
            session: second_session,
            layers: second_layers,
            ..
        } = run(&backend);

        assert_eq!(first.unwrap(), second.unwrap());
        assert_eq!(first_layers.len(), 3);
        assert_eq!(second_layers.len(), 3);
        assert_eq!(second_session.committed().connections.len(), 6);
    }

    #[test]
    fn no_slots_commits_an_empty_configuration() {
        let backend = DummyBackend::new();
        let mut session = backend.new_session();
        let mut slots: Vec<CameraSlot<DummySurface>> = Vec::new();
        let mut layers = Vec::new();

        let report = configure_session(&backend, &mut session, &mut slots, &mut layers).unwrap();

        assert_eq!(report.wired(), 0);
        assert_eq!(session.commit_count(), 1);
        assert!(session.committed().inputs.is_empty());
    }
}
