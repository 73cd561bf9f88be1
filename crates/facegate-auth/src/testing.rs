//! Fakes for the camera and the face engine.

use crate::config::AuthConfig;
use crate::events::SessionEvent;
use crate::orchestrator::Orchestrator;
use async_trait::async_trait;
use facegate_core::{
    CameraAccess, CaptureError, Descriptor, EngineError, EuclideanMatchIndex, FaceDescription,
    FaceEngine, FaceRegion, Frame, LabeledDescriptors, MatchIndex, RegisteredIdentity,
    VideoSource,
};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

pub(crate) fn identity(number: &str, name: &str, descriptor: Vec<f32>) -> RegisteredIdentity {
    RegisteredIdentity {
        identity_number: number.into(),
        display_name: name.into(),
        descriptor: Descriptor::new(descriptor),
        photo_ref: None,
    }
}

pub(crate) fn asha() -> RegisteredIdentity {
    identity("123456789012", "Asha", vec![0.0, 1.0, 0.0])
}

struct CameraInner {
    access: CameraAccess,
    access_requests: AtomicUsize,
    capture_failing: AtomicBool,
    sequence: AtomicU32,
}

#[derive(Clone)]
pub(crate) struct FakeCamera(Arc<CameraInner>);

impl FakeCamera {
    fn with_access(access: CameraAccess) -> Self {
        Self(Arc::new(CameraInner {
            access,
            access_requests: AtomicUsize::new(0),
            capture_failing: AtomicBool::new(false),
            sequence: AtomicU32::new(0),
        }))
    }

    pub(crate) fn granted() -> Self {
        Self::with_access(CameraAccess::Granted)
    }

    pub(crate) fn denied() -> Self {
        Self::with_access(CameraAccess::Denied)
    }

    pub(crate) fn access_requests(&self) -> usize {
        self.0.access_requests.load(Ordering::SeqCst)
    }

    pub(crate) fn set_capture_failing(&self, failing: bool) {
        self.0.capture_failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl VideoSource for FakeCamera {
    async fn request_access(&self) -> CameraAccess {
        self.0.access_requests.fetch_add(1, Ordering::SeqCst);
        self.0.access
    }

    async fn current_frame(&self) -> Result<Frame, CaptureError> {
        if self.0.capture_failing.load(Ordering::SeqCst) {
            return Err(CaptureError::CaptureFailed("device unplugged".into()));
        }
        let sequence = self.0.sequence.fetch_add(1, Ordering::SeqCst);
        Ok(Frame::from_gray(vec![128u8; 16], 4, 4, sequence)?)
    }
}

#[derive(Default)]
struct EngineState {
    face_count: usize,
    detect_delay: Duration,
    detect_failing: bool,
    probe: Option<Vec<f32>>,
    extract_delay: Duration,
    extract_failing: bool,
    build_delay: Duration,
    build_failing: bool,
}

#[derive(Default)]
struct EngineInner {
    state: Mutex<EngineState>,
    detect_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    extract_calls: AtomicUsize,
    index_builds: AtomicUsize,
}

#[derive(Clone, Default)]
pub(crate) struct FakeEngine(Arc<EngineInner>);

impl FakeEngine {
    /// No faces in view; the still yields Asha's descriptor.
    pub(crate) fn new() -> Self {
        let engine = Self::default();
        engine.set_probe(Some(asha().descriptor.values));
        engine
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut EngineState) -> R) -> R {
        f(&mut *self.0.state.lock().unwrap())
    }

    pub(crate) fn set_face_count(&self, n: usize) {
        self.with_state(|s| s.face_count = n);
    }

    pub(crate) fn set_detect_delay(&self, delay: Duration) {
        self.with_state(|s| s.detect_delay = delay);
    }

    pub(crate) fn set_detect_failing(&self, failing: bool) {
        self.with_state(|s| s.detect_failing = failing);
    }

    pub(crate) fn set_probe(&self, probe: Option<Vec<f32>>) {
        self.with_state(|s| s.probe = probe);
    }

    pub(crate) fn set_extract_delay(&self, delay: Duration) {
        self.with_state(|s| s.extract_delay = delay);
    }

    pub(crate) fn set_extract_failing(&self, failing: bool) {
        self.with_state(|s| s.extract_failing = failing);
    }

    pub(crate) fn set_build_delay(&self, delay: Duration) {
        self.with_state(|s| s.build_delay = delay);
    }

    pub(crate) fn set_build_failing(&self, failing: bool) {
        self.with_state(|s| s.build_failing = failing);
    }

    pub(crate) fn detect_calls(&self) -> usize {
        self.0.detect_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.0.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn extract_calls(&self) -> usize {
        self.0.extract_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn index_builds(&self) -> usize {
        self.0.index_builds.load(Ordering::SeqCst)
    }
}

fn region() -> FaceRegion {
    FaceRegion {
        x: 10.0,
        y: 10.0,
        width: 100.0,
        height: 120.0,
        confidence: 0.9,
        landmarks: None,
    }
}

#[async_trait]
impl FaceEngine for FakeEngine {
    async fn detect_all(&self, _frame: &Frame) -> Result<Vec<FaceRegion>, EngineError> {
        self.0.detect_calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.0.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.0.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let (delay, failing, n) =
            self.with_state(|s| (s.detect_delay, s.detect_failing, s.face_count));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);

        if failing {
            return Err(EngineError::DetectionFailed("model crashed".into()));
        }
        Ok(vec![region(); n])
    }

    async fn detect_single_with_descriptor(
        &self,
        _frame: &Frame,
    ) -> Result<Option<FaceDescription>, EngineError> {
        self.0.extract_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.with_state(|s| s.extract_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let (failing, probe) = self.with_state(|s| (s.extract_failing, s.probe.clone()));
        if failing {
            return Err(EngineError::ExtractionFailed("landmarks missing".into()));
        }
        Ok(probe.map(|values| FaceDescription {
            region: region(),
            descriptor: Descriptor::new(values),
        }))
    }

    async fn build_match_index(
        &self,
        gallery: Vec<LabeledDescriptors>,
        threshold: f32,
    ) -> Result<Arc<dyn MatchIndex>, EngineError> {
        self.0.index_builds.fetch_add(1, Ordering::SeqCst);
        let (delay, failing) = self.with_state(|s| (s.build_delay, s.build_failing));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if failing {
            return Err(EngineError::DetectionFailed("matcher backend unavailable".into()));
        }
        let index: Arc<dyn MatchIndex> = Arc::new(EuclideanMatchIndex::build(gallery, threshold)?);
        Ok(index)
    }
}

pub(crate) fn start(
    camera: &FakeCamera,
    engine: &FakeEngine,
) -> (Orchestrator, mpsc::UnboundedReceiver<SessionEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let orch = Orchestrator::start(
        AuthConfig::default(),
        Arc::new(camera.clone()),
        Arc::new(engine.clone()),
        Arc::new(tx),
    );
    (orch, rx)
}

/// Orchestrator with Asha linked, one face in view and the matcher ready.
pub(crate) async fn ready_orchestrator(
    camera: &FakeCamera,
    engine: &FakeEngine,
) -> (Orchestrator, mpsc::UnboundedReceiver<SessionEvent>) {
    engine.set_face_count(1);
    let (orch, rx) = start(camera, engine);
    orch.on_directory_changed(vec![asha()]).await;
    orch.on_identity_input("1234 5678 9012");
    tokio::time::sleep(Duration::from_millis(10)).await;
    (orch, rx)
}
