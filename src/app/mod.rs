//! Terminal front end: screen routing and per-screen UI state
//!
//! - `input`: key event handling

mod input;

use std::sync::Arc;

use faunadex::controller::{
    ArController, ArEngine, ChangePasswordController, Dashboard, DashboardController, DashboardFilter,
    DetailController, EditProfileController, LoginController, ProfileController, RegisterController,
};
use faunadex::model::{Animal, DisplayState};
use faunadex::operations::Operations;
use faunadex::playback::PlaybackManager;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Dashboard,
    Detail,
    Profile,
    EditProfile,
    ChangePassword,
    Ar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
}

pub struct App {
    ops: Operations,
    playback: Arc<PlaybackManager>,
    ar_engine: Arc<dyn ArEngine>,
    pub screen: Screen,
    pub login: LoginController,
    pub login_focus: LoginFocus,
    pub register: Option<RegisterController>,
    pub edit_profile: Option<EditProfileController>,
    pub change_password: Option<ChangePasswordController>,
    /// Focused row of the open form screen
    pub form_focus: usize,
    pub dashboard: Option<DashboardController>,
    pub detail: Option<DetailController>,
    pub profile: Option<ProfileController>,
    pub ar: Option<ArController>,
    pub filter: DashboardFilter,
    pub filter_cursor: usize,
    pub searching: bool,
    pub selected: usize,
    pub detail_tab: usize,
    pub show_help: bool,
    pub notice: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(ops: Operations, playback: Arc<PlaybackManager>, ar_engine: Arc<dyn ArEngine>) -> Self {
        Self {
            login: LoginController::new(ops.clone()),
            ops,
            playback,
            ar_engine,
            screen: Screen::Login,
            login_focus: LoginFocus::Email,
            register: None,
            edit_profile: None,
            change_password: None,
            form_focus: 0,
            dashboard: None,
            detail: None,
            profile: None,
            ar: None,
            filter: DashboardFilter::default(),
            filter_cursor: 0,
            searching: false,
            selected: 0,
            detail_tab: 0,
            show_help: false,
            notice: None,
            should_quit: false,
        }
    }

    pub fn playback(&self) -> &PlaybackManager {
        &self.playback
    }

    pub fn dashboard_state(&self) -> Option<DisplayState<Dashboard>> {
        self.dashboard.as_ref().map(DashboardController::state)
    }

    /// Animals left after the filter, in display order
    pub fn visible_animals(&self) -> Vec<Animal> {
        match self.dashboard_state() {
            Some(DisplayState::Success(dashboard)) => self
                .filter
                .apply(&dashboard.animals, &dashboard.favorites)
                .into_iter()
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn selected_animal(&self) -> Option<Animal> {
        self.visible_animals().into_iter().nth(self.selected)
    }

    fn open_register(&mut self) {
        self.register = Some(RegisterController::new(self.ops.clone()));
        self.form_focus = 0;
        self.screen = Screen::Register;
    }

    fn open_dashboard(&mut self) {
        tracing::info!("Opening dashboard");
        self.dashboard = Some(DashboardController::new(self.ops.clone()));
        self.selected = 0;
        self.screen = Screen::Dashboard;
    }

    fn open_detail(&mut self, animal_id: &str) {
        tracing::info!(animal_id, "Opening animal detail");
        self.detail = Some(DetailController::new(
            self.ops.clone(),
            self.playback.clone(),
            animal_id,
        ));
        self.detail_tab = 0;
        self.screen = Screen::Detail;
    }

    fn close_detail(&mut self) {
        self.playback.stop();
        self.detail = None;
        self.screen = Screen::Dashboard;
        if let Some(dashboard) = &self.dashboard {
            dashboard.retry();
        }
    }

    fn open_profile(&mut self) {
        self.profile = Some(ProfileController::new(self.ops.clone()));
        self.screen = Screen::Profile;
    }

    async fn open_edit_profile(&mut self) {
        let form = EditProfileController::new(self.ops.clone());
        form.prefill().await;
        self.edit_profile = Some(form);
        self.form_focus = 0;
        self.screen = Screen::EditProfile;
    }

    fn open_change_password(&mut self) {
        self.change_password = Some(ChangePasswordController::new(self.ops.clone()));
        self.form_focus = 0;
        self.screen = Screen::ChangePassword;
    }

    /// Close a form opened from the profile screen and reload the profile
    fn back_to_profile(&mut self) {
        self.edit_profile = None;
        self.change_password = None;
        self.screen = Screen::Profile;
        if let Some(profile) = &self.profile {
            profile.retry();
        }
    }

    async fn open_ar(&mut self, animal_id: Option<String>) {
        self.close_ar();
        let ar = ArController::new(self.ar_engine.clone(), self.ops.clone());
        ar.initialize().await;
        if let Some(animal_id) = animal_id {
            ar.load_animal(&animal_id).await;
        }
        self.ar = Some(ar);
        self.screen = Screen::Ar;
    }

    async fn award_xp(&self, amount: i64) {
        let Some(session) = self.ops.current_session() else {
            return;
        };
        match self.ops.add_xp(&session.uid, amount).await {
            Ok(total) => tracing::debug!(uid = %session.uid, amount, total, "Experience awarded"),
            Err(e) => tracing::warn!(uid = %session.uid, error = %e, "Awarding experience failed"),
        }
    }

    /// Release the AR session when the AR screen goes away
    pub fn close_ar(&mut self) {
        if let Some(ar) = self.ar.take() {
            ar.close();
        }
    }

    async fn sign_out(&mut self) {
        if let Some(profile) = self.profile.take() {
            profile.sign_out().await;
        } else {
            self.ops.sign_out().await;
        }
        self.playback.stop();
        self.dashboard = None;
        self.detail = None;
        self.close_ar();
        self.edit_profile = None;
        self.change_password = None;
        self.login = LoginController::new(self.ops.clone());
        self.login_focus = LoginFocus::Email;
        self.screen = Screen::Login;
    }
}
