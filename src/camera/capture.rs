//! Native webcam capture through nokhwa.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::JoinHandle;

use nokhwa::query;
use nokhwa::utils::ApiBackend;

use super::capture_loop::run_capture_loop;
use super::types::{CameraError, CameraInfo, CameraSettings};
use super::CameraProvider;
use crate::raster::Raster;
use crate::source::{FrameSource, SourceKind};

/// List all camera devices. An empty list is not an error.
pub fn list_devices() -> Result<Vec<CameraInfo>, CameraError> {
    let devices = query(ApiBackend::Auto).map_err(|e| CameraError::QueryFailed(e.to_string()))?;

    Ok(devices
        .into_iter()
        .map(|d| CameraInfo {
            index: d.index().as_index().unwrap_or(0),
            name: d.human_name(),
            description: d.description().to_string(),
        })
        .collect())
}

/// Running webcam capture.
///
/// A background thread opens the device and keeps the most recent frame
/// in a shared slot; [`FrameSource::current_frame`] hands out a copy.
pub struct CameraCapture {
    frame_slot: Arc<Mutex<Option<Raster>>>,
    capture_thread: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    settings: CameraSettings,
}

impl std::fmt::Debug for CameraCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCapture")
            .field("settings", &self.settings)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl CameraCapture {
    /// Validate the device index and start capturing.
    ///
    /// Blocks until the capture thread reports that the stream is open.
    ///
    /// # Errors
    /// * `CameraError::DeviceNotFound` - the device index doesn't exist
    /// * `CameraError::PermissionDenied` - camera access was refused
    /// * `CameraError::OpenFailed` / `StreamFailed` - the device would not start
    pub fn start(settings: CameraSettings) -> Result<Self, CameraError> {
        let devices = list_devices()?;
        if devices.is_empty() {
            return Err(CameraError::NoDevices);
        }
        if !devices.iter().any(|d| d.index == settings.device_index) {
            return Err(CameraError::DeviceNotFound(settings.device_index));
        }

        let frame_slot = Arc::new(Mutex::new(None));
        let stop_signal = Arc::new(AtomicBool::new(false));
        let (info_tx, info_rx) = mpsc::channel();

        let handle = {
            let slot = Arc::clone(&frame_slot);
            let stop = Arc::clone(&stop_signal);
            let settings = settings.clone();
            std::thread::spawn(move || run_capture_loop(settings, slot, stop, info_tx))
        };

        let mut capture = Self {
            frame_slot,
            capture_thread: Some(handle),
            stop_signal,
            settings,
        };

        match info_rx.recv() {
            Ok(Ok((res, fps))) => {
                log::info!("Camera streaming at {}x{} @ {} fps", res.width, res.height, fps);
                Ok(capture)
            }
            Ok(Err(e)) => {
                capture.stop();
                Err(e)
            }
            Err(_) => {
                capture.stop();
                Err(CameraError::StreamFailed(
                    "Capture thread terminated unexpectedly".to_string(),
                ))
            }
        }
    }

    /// Signal the capture thread and wait for it to finish.
    pub fn stop(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        if let Some(handle) = self.capture_thread.take() {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.capture_thread
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl FrameSource for CameraCapture {
    fn kind(&self) -> SourceKind {
        SourceKind::Camera
    }

    fn current_frame(&mut self) -> Option<Raster> {
        self.frame_slot.lock().ok()?.clone()
    }

    fn release(&mut self) {
        self.stop();
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Provider opening the system webcam with fixed settings.
#[derive(Debug, Clone, Default)]
pub struct NativeCamera {
    settings: CameraSettings,
}

impl NativeCamera {
    pub fn new(settings: CameraSettings) -> Self {
        Self { settings }
    }
}

impl CameraProvider for NativeCamera {
    fn acquire(&mut self) -> Result<Box<dyn FrameSource>, CameraError> {
        Ok(Box::new(CameraCapture::start(self.settings.clone())?))
    }
}
