//! Controller module - per-screen state machines
//!
//! Every screen publishes its state on a `watch` channel and owns the tasks
//! it spawns. Organized by screen:
//!
//! - `state`: display state with stale-response protection, task ownership
//! - `form`: shared form submission flow
//! - `auth_forms`: login and registration
//! - `account_forms`: change password and edit profile
//! - `dashboard`: catalogue, favorites and filtering
//! - `detail`: animal detail and narration
//! - `profile`: profile view and education level
//! - `ar`: AR readiness gate

mod state;
mod form;
mod auth_forms;
mod account_forms;
mod dashboard;
mod detail;
mod profile;
mod ar;

pub use state::{LoadTicket, ScreenState, ScreenTasks};
pub use form::{FormController, FormState};
pub use auth_forms::{LoginController, LoginFields, RegisterController, RegisterFields};
pub use account_forms::{ChangePasswordController, EditProfileController, PasswordFields, ProfileFields};
pub use dashboard::{Dashboard, DashboardController, DashboardFilter, FilterOption};
pub use detail::{AnimalDetail, DetailController, Narration};
pub use profile::ProfileController;
pub use ar::{
    ArAvailability, ArController, ArEngine, ArSession, ArStatus, CAMERA_PERMISSION_REQUIRED, PlacedAnimal,
    SessionPhase, SimulatedAr,
};
