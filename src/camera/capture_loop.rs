//! Background capture thread implementation.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc::Sender, Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::frame_utils::{convert_to_raster, mirror_horizontal};
use super::types::{CameraError, CameraSettings, Resolution};
use crate::raster::Raster;

/// Keep the latest decoded frame in `buffer` until `stop` is set.
///
/// Reports the negotiated resolution and frame rate (or the open error)
/// on `info_tx` before entering the loop.
pub fn run_capture_loop(
    settings: CameraSettings,
    buffer: Arc<Mutex<Option<Raster>>>,
    stop: Arc<AtomicBool>,
    info_tx: Sender<Result<(Resolution, u32), CameraError>>,
) {
    let index = CameraIndex::Index(settings.device_index);

    let mut camera = match open_camera_with_fallback(&index, &settings) {
        Ok(cam) => cam,
        Err(e) => {
            let _ = info_tx.send(Err(e));
            return;
        }
    };

    if let Err(e) = camera.open_stream() {
        let _ = info_tx.send(Err(CameraError::StreamFailed(e.to_string())));
        return;
    }

    let res = camera.resolution();
    let actual = Resolution {
        width: res.width(),
        height: res.height(),
    };
    let _ = info_tx.send(Ok((actual, camera.frame_rate())));

    let mut dropped = 0u64;
    while !stop.load(Ordering::Relaxed) {
        match camera.frame().ok().and_then(|raw| convert_to_raster(&raw)) {
            Some(mut frame) => {
                if settings.mirror {
                    mirror_horizontal(&mut frame);
                }
                if let Ok(mut slot) = buffer.lock() {
                    *slot = Some(frame);
                }
            }
            None => {
                dropped += 1;
                if dropped % 100 == 1 {
                    log::debug!("Camera frame dropped ({} so far)", dropped);
                }
            }
        }

        thread::sleep(Duration::from_millis(1));
    }

    let _ = camera.stop_stream();
}

/// Open the camera, trying NV12, then MJPEG, then whatever the device offers.
fn open_camera_with_fallback(
    index: &CameraIndex,
    settings: &CameraSettings,
) -> Result<Camera, CameraError> {
    let wanted =
        nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height);
    let closest =
        |format| RequestedFormatType::Closest(CameraFormat::new(wanted, format, settings.fps));
    let attempts = [
        closest(NokhwaFrameFormat::NV12),
        closest(NokhwaFrameFormat::MJPEG),
        RequestedFormatType::AbsoluteHighestResolution,
    ];

    let mut last_error = String::from("no capture format accepted");
    for kind in attempts {
        match Camera::new(index.clone(), RequestedFormat::new::<RgbFormat>(kind)) {
            Ok(cam) => return Ok(cam),
            Err(e) => {
                log::debug!("Camera format rejected: {}", e);
                last_error = e.to_string();
            }
        }
    }

    let msg = last_error.to_lowercase();
    if ["permission", "denied", "authorization", "access"]
        .iter()
        .any(|needle| msg.contains(needle))
    {
        Err(CameraError::PermissionDenied)
    } else {
        Err(CameraError::OpenFailed(last_error))
    }
}
