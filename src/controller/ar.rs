//! AR viewer readiness gate and placed-animal bookkeeping

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::model::Animal;
use crate::operations::Operations;

pub const CAMERA_PERMISSION_REQUIRED: &str = "Camera permission is required for AR";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArAvailability {
    Supported,
    Unsupported,
    InstallRequired,
}

/// Lifecycle of the runtime's camera session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Closed,
    Running,
    Paused,
}

/// Device-side AR runtime
#[async_trait]
pub trait ArEngine: Send + Sync {
    async fn check_availability(&self) -> Result<ArAvailability>;

    fn has_camera_permission(&self) -> bool;

    /// Ask the device to install the runtime. `Ok(true)` once it is installed,
    /// `Ok(false)` while the install is still pending or was declined.
    async fn request_install(&self) -> Result<bool>;

    /// Open the camera session. Reuses the open one when called twice.
    fn create_session(&self) -> Result<()>;

    fn pause(&self);

    fn resume(&self) -> Result<()>;

    fn close(&self);
}

#[derive(Debug)]
struct SimulatedDevice {
    availability: ArAvailability,
    install_accepted: bool,
    phase: SessionPhase,
}

/// Stand-in runtime with fixed answers
pub struct SimulatedAr {
    device: Mutex<SimulatedDevice>,
    camera_permission: AtomicBool,
}

impl SimulatedAr {
    pub fn new(availability: ArAvailability, camera_permission: bool) -> Self {
        Self {
            device: Mutex::new(SimulatedDevice {
                availability,
                install_accepted: true,
                phase: SessionPhase::Closed,
            }),
            camera_permission: AtomicBool::new(camera_permission),
        }
    }

    pub fn grant_camera(&self) {
        self.camera_permission.store(true, Ordering::SeqCst);
    }

    /// Make later install requests come back declined
    pub fn decline_install(&self) {
        self.device().install_accepted = false;
    }

    pub fn phase(&self) -> SessionPhase {
        self.device().phase
    }

    fn device(&self) -> MutexGuard<'_, SimulatedDevice> {
        self.device.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ArEngine for SimulatedAr {
    async fn check_availability(&self) -> Result<ArAvailability> {
        Ok(self.device().availability)
    }

    fn has_camera_permission(&self) -> bool {
        self.camera_permission.load(Ordering::SeqCst)
    }

    async fn request_install(&self) -> Result<bool> {
        let mut device = self.device();
        match device.availability {
            ArAvailability::Supported => Ok(true),
            ArAvailability::Unsupported => Err(Error::Ar("AR is not supported on this device".to_string())),
            ArAvailability::InstallRequired if device.install_accepted => {
                device.availability = ArAvailability::Supported;
                Ok(true)
            }
            ArAvailability::InstallRequired => Ok(false),
        }
    }

    fn create_session(&self) -> Result<()> {
        let mut device = self.device();
        if device.availability != ArAvailability::Supported {
            return Err(Error::Ar("AR runtime is not installed".to_string()));
        }
        if device.phase == SessionPhase::Closed {
            device.phase = SessionPhase::Running;
        }
        Ok(())
    }

    fn pause(&self) {
        let mut device = self.device();
        if device.phase == SessionPhase::Running {
            device.phase = SessionPhase::Paused;
        }
    }

    fn resume(&self) -> Result<()> {
        let mut device = self.device();
        match device.phase {
            SessionPhase::Closed => Err(Error::Ar("No AR session to resume".to_string())),
            _ => {
                device.phase = SessionPhase::Running;
                Ok(())
            }
        }
    }

    fn close(&self) {
        self.device().phase = SessionPhase::Closed;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ArStatus {
    Initializing,
    CameraPermissionRequired,
    Unsupported,
    InstallRequired,
    Ready,
    Scanning(usize),
    AnimalPlaced(Animal),
    Error(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedAnimal {
    pub animal: Animal,
    pub position: [f32; 3],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArSession {
    pub initialized: bool,
    pub detected_planes: usize,
    pub selected_animal: Option<Animal>,
    pub placed: Vec<PlacedAnimal>,
    pub error: Option<String>,
}

pub struct ArController {
    engine: Arc<dyn ArEngine>,
    ops: Operations,
    status: watch::Sender<ArStatus>,
    session: watch::Sender<ArSession>,
}

impl ArController {
    pub fn new(engine: Arc<dyn ArEngine>, ops: Operations) -> Self {
        let (status, _) = watch::channel(ArStatus::Initializing);
        let (session, _) = watch::channel(ArSession::default());
        Self {
            engine,
            ops,
            status,
            session,
        }
    }

    pub fn status(&self) -> ArStatus {
        self.status.borrow().clone()
    }

    pub fn session(&self) -> ArSession {
        self.session.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ArStatus> {
        self.status.subscribe()
    }

    pub fn subscribe_session(&self) -> watch::Receiver<ArSession> {
        self.session.subscribe()
    }

    /// Leave `Initializing` for the first screen the device can show
    pub async fn initialize(&self) {
        let next = match self.engine.check_availability().await {
            Ok(ArAvailability::Supported) if self.engine.has_camera_permission() => ArStatus::Ready,
            Ok(ArAvailability::Supported) => ArStatus::CameraPermissionRequired,
            Ok(ArAvailability::Unsupported) => {
                tracing::warn!("AR is not supported on this device");
                ArStatus::Unsupported
            }
            Ok(ArAvailability::InstallRequired) => ArStatus::InstallRequired,
            Err(e) => {
                tracing::error!(error = %e, "AR availability check failed");
                ArStatus::Error(e.to_string())
            }
        };
        tracing::debug!(status = ?next, "AR initialized");
        self.status.send_replace(next);
    }

    /// Leave `InstallRequired` once the runtime is installed
    pub async fn request_install(&self) {
        if self.status() != ArStatus::InstallRequired {
            return;
        }
        match self.engine.request_install().await {
            Ok(true) => {
                let next = if self.engine.has_camera_permission() {
                    ArStatus::Ready
                } else {
                    ArStatus::CameraPermissionRequired
                };
                tracing::info!(status = ?next, "AR runtime installed");
                self.status.send_replace(next);
            }
            Ok(false) => tracing::debug!("AR runtime install pending"),
            Err(e) => self.on_session_error(&format!("Failed to install AR: {}", e)),
        }
    }

    pub fn on_permission_granted(&self) {
        tracing::debug!("Camera permission granted, AR ready");
        self.status.send_replace(ArStatus::Ready);
    }

    pub fn on_permission_denied(&self) {
        tracing::warn!("Camera permission denied");
        self.status
            .send_replace(ArStatus::Error(CAMERA_PERMISSION_REQUIRED.to_string()));
    }

    pub fn start_scanning(&self) {
        if !matches!(self.status(), ArStatus::Ready | ArStatus::AnimalPlaced(_)) {
            tracing::debug!(status = ?self.status(), "Cannot scan yet");
            return;
        }
        if let Err(e) = self.engine.create_session() {
            self.on_session_error(&format!("Failed to start AR session: {}", e));
            return;
        }
        self.session.send_modify(|session| session.initialized = true);
        let planes = self.session.borrow().detected_planes;
        self.status.send_replace(ArStatus::Scanning(planes));
        tracing::debug!("AR scanning started");
    }

    pub fn on_plane_detected(&self, plane_count: usize) {
        self.session
            .send_modify(|session| session.detected_planes = plane_count);
        self.status.send_if_modified(|status| match status {
            ArStatus::Scanning(planes) => {
                *planes = plane_count;
                true
            }
            _ => false,
        });
        tracing::trace!(plane_count, "Planes detected");
    }

    /// Select the animal to place next
    pub async fn load_animal(&self, animal_id: &str) -> bool {
        match self.ops.animal_detail(animal_id).await {
            Ok(animal) => {
                tracing::debug!(animal_id, name = %animal.name, "Animal loaded for AR");
                self.session
                    .send_modify(|session| session.selected_animal = Some(animal));
                true
            }
            Err(e) => {
                self.on_session_error(&format!("Failed to load animal: {}", e));
                false
            }
        }
    }

    pub fn place_animal(&self, animal: Animal, x: f32, y: f32, z: f32) {
        tracing::debug!(name = %animal.name, x, y, z, "Animal placed");
        self.session.send_modify(|session| {
            session.placed.push(PlacedAnimal {
                animal: animal.clone(),
                position: [x, y, z],
            });
        });
        self.status.send_replace(ArStatus::AnimalPlaced(animal));
    }

    /// Place the selected animal. Fails when none was loaded.
    pub fn place_selected(&self, x: f32, y: f32, z: f32) -> Result<()> {
        let animal = self
            .session
            .borrow()
            .selected_animal
            .clone()
            .ok_or_else(|| Error::Ar("No animal selected".to_string()))?;
        self.place_animal(animal, x, y, z);
        Ok(())
    }

    pub fn clear_placed(&self) {
        self.session.send_modify(|session| session.placed.clear());
        let planes = self.session.borrow().detected_planes;
        self.status.send_replace(ArStatus::Scanning(planes));
        tracing::debug!("Cleared all placed animals");
    }

    pub fn pause(&self) {
        if self.session.borrow().initialized {
            self.engine.pause();
            tracing::debug!("AR session paused");
        }
    }

    pub fn resume(&self) {
        if !self.session.borrow().initialized {
            return;
        }
        match self.engine.resume() {
            Ok(()) => tracing::debug!("AR session resumed"),
            Err(e) => self.on_session_error(&format!("Failed to resume AR session: {}", e)),
        }
    }

    /// Release the camera session and forget the placed animals
    pub fn close(&self) {
        self.engine.close();
        self.session.send_modify(|session| {
            session.initialized = false;
            session.placed.clear();
        });
        tracing::debug!("AR session closed");
    }

    pub fn on_session_error(&self, message: &str) {
        tracing::error!(message, "AR session error");
        self.session
            .send_modify(|session| session.error = Some(message.to_string()));
        self.status.send_replace(ArStatus::Error(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::InMemoryAuth;
    use crate::store::InMemoryStore;
    use crate::store::seed::{BUNDLED_ANIMALS, seed_animals};

    async fn controller(availability: ArAvailability, camera: bool) -> (Arc<SimulatedAr>, ArController) {
        let store = Arc::new(InMemoryStore::new());
        seed_animals(&*store, BUNDLED_ANIMALS).await.unwrap();
        let ops = Operations::new(store, Arc::new(InMemoryAuth::new()));
        let engine = Arc::new(SimulatedAr::new(availability, camera));
        (engine.clone(), ArController::new(engine, ops))
    }

    #[tokio::test]
    async fn test_gate_outcomes() {
        let (_engine, ar) = controller(ArAvailability::Unsupported, true).await;
        assert_eq!(ar.status(), ArStatus::Initializing);
        ar.initialize().await;
        assert_eq!(ar.status(), ArStatus::Unsupported);

        let (_engine, ar) = controller(ArAvailability::InstallRequired, true).await;
        ar.initialize().await;
        assert_eq!(ar.status(), ArStatus::InstallRequired);

        let (_engine, ar) = controller(ArAvailability::Supported, false).await;
        ar.initialize().await;
        assert_eq!(ar.status(), ArStatus::CameraPermissionRequired);
        ar.on_permission_denied();
        assert_eq!(
            ar.status(),
            ArStatus::Error(CAMERA_PERMISSION_REQUIRED.to_string())
        );
    }

    #[tokio::test]
    async fn test_scan_place_clear() {
        let (_engine, ar) = controller(ArAvailability::Supported, true).await;
        ar.initialize().await;
        assert_eq!(ar.status(), ArStatus::Ready);

        ar.on_plane_detected(1);
        ar.start_scanning();
        assert_eq!(ar.status(), ArStatus::Scanning(1));
        ar.on_plane_detected(3);
        assert_eq!(ar.status(), ArStatus::Scanning(3));

        assert!(ar.place_selected(0.0, 0.0, -1.0).is_err());
        assert!(ar.load_animal("komodo_dragon").await);
        ar.place_selected(0.0, 0.0, -1.0).unwrap();
        assert!(matches!(ar.status(), ArStatus::AnimalPlaced(ref a) if a.id == "komodo_dragon"));
        assert_eq!(ar.session().placed.len(), 1);

        ar.clear_placed();
        assert!(ar.session().placed.is_empty());
        assert_eq!(ar.status(), ArStatus::Scanning(3));
    }

    #[tokio::test]
    async fn test_unknown_animal_is_session_error() {
        let (_engine, ar) = controller(ArAvailability::Supported, true).await;
        ar.initialize().await;
        assert!(!ar.load_animal("dodo").await);
        assert!(matches!(ar.status(), ArStatus::Error(ref m) if m.starts_with("Failed to load animal")));
        assert!(ar.session().error.is_some());
    }

    #[tokio::test]
    async fn test_permission_granted_later() {
        let (engine, ar) = controller(ArAvailability::Supported, false).await;
        ar.initialize().await;
        engine.grant_camera();
        ar.on_permission_granted();
        ar.start_scanning();
        assert_eq!(ar.status(), ArStatus::Scanning(0));
    }

    #[tokio::test]
    async fn test_install_then_ready() {
        let (engine, ar) = controller(ArAvailability::InstallRequired, true).await;
        ar.initialize().await;
        assert_eq!(ar.status(), ArStatus::InstallRequired);

        ar.request_install().await;
        assert_eq!(ar.status(), ArStatus::Ready);
        ar.start_scanning();
        assert_eq!(ar.status(), ArStatus::Scanning(0));
        assert_eq!(engine.phase(), SessionPhase::Running);
    }

    #[tokio::test]
    async fn test_install_without_camera_asks_permission() {
        let (_engine, ar) = controller(ArAvailability::InstallRequired, false).await;
        ar.initialize().await;
        ar.request_install().await;
        assert_eq!(ar.status(), ArStatus::CameraPermissionRequired);
    }

    #[tokio::test]
    async fn test_declined_install_stays_put() {
        let (engine, ar) = controller(ArAvailability::InstallRequired, true).await;
        engine.decline_install();
        ar.initialize().await;
        ar.request_install().await;
        assert_eq!(ar.status(), ArStatus::InstallRequired);

        ar.start_scanning();
        assert_eq!(ar.status(), ArStatus::InstallRequired);
        assert_eq!(engine.phase(), SessionPhase::Closed);
    }

    #[tokio::test]
    async fn test_session_pause_resume_close() {
        let (engine, ar) = controller(ArAvailability::Supported, true).await;
        ar.initialize().await;

        ar.pause();
        assert_eq!(engine.phase(), SessionPhase::Closed);

        ar.start_scanning();
        ar.pause();
        assert_eq!(engine.phase(), SessionPhase::Paused);
        ar.resume();
        assert_eq!(engine.phase(), SessionPhase::Running);

        assert!(ar.load_animal("komodo_dragon").await);
        ar.place_selected(0.0, 0.0, -1.0).unwrap();
        ar.close();
        assert_eq!(engine.phase(), SessionPhase::Closed);
        assert!(!ar.session().initialized);
        assert!(ar.session().placed.is_empty());
    }
}
