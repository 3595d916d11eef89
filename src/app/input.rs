//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use faunadex::controller::{FilterOption, Narration};
use faunadex::model::EducationLevel;

use super::{App, LoginFocus, Screen};

const SEEK_STEP_MS: u64 = 5_000;
const AR_PLACEMENT_XP: i64 = 10;

const REGISTER_ROWS: usize = 5;
const EDIT_PROFILE_ROWS: usize = 3;
const CHANGE_PASSWORD_ROWS: usize = 3;

fn edit_text(value: &mut String, code: KeyCode) {
    match code {
        KeyCode::Backspace => {
            value.pop();
        }
        KeyCode::Char(c) => value.push(c),
        _ => {}
    }
}

fn is_text_key(code: KeyCode) -> bool {
    matches!(code, KeyCode::Backspace | KeyCode::Char(_))
}

fn is_cycle_key(code: KeyCode) -> bool {
    matches!(code, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right)
}

impl App {
    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Ok(());
        }

        // Notice blocks all other interactions
        if self.notice.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.notice = None;
            }
            return Ok(());
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
                if let Some(ar) = &self.ar {
                    ar.resume();
                }
            }
            return Ok(());
        }

        match self.screen {
            Screen::Login => self.handle_login_key(key).await,
            Screen::Register => self.handle_register_key(key).await,
            Screen::Dashboard => self.handle_dashboard_key(key).await,
            Screen::Detail => self.handle_detail_key(key).await,
            Screen::Profile => self.handle_profile_key(key).await,
            Screen::EditProfile => self.handle_edit_profile_key(key).await,
            Screen::ChangePassword => self.handle_change_password_key(key).await,
            Screen::Ar => self.handle_ar_key(key).await,
        }

        Ok(())
    }

    async fn handle_login_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.open_register();
            return;
        }

        let fields = self.login.state().fields;
        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.login_focus = match self.login_focus {
                    LoginFocus::Email => LoginFocus::Password,
                    LoginFocus::Password => LoginFocus::Email,
                };
            }
            KeyCode::Enter => {
                if let Some(profile) = self.login.sign_in().await {
                    tracing::info!(uid = %profile.uid, "Signed in from login screen");
                    self.open_dashboard();
                }
            }
            KeyCode::Backspace => match self.login_focus {
                LoginFocus::Email => {
                    let mut email = fields.email;
                    email.pop();
                    self.login.on_email_change(&email);
                }
                LoginFocus::Password => {
                    let mut password = fields.password;
                    password.pop();
                    self.login.on_password_change(&password);
                }
            },
            KeyCode::Char(c) => match self.login_focus {
                LoginFocus::Email => self.login.on_email_change(&format!("{}{}", fields.email, c)),
                LoginFocus::Password => self.login.on_password_change(&format!("{}{}", fields.password, c)),
            },
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    async fn handle_register_key(&mut self, key: KeyEvent) {
        let Some(form) = &self.register else {
            self.screen = Screen::Login;
            return;
        };

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.form_focus = (self.form_focus + 1) % REGISTER_ROWS,
            KeyCode::BackTab | KeyCode::Up => {
                self.form_focus = (self.form_focus + REGISTER_ROWS - 1) % REGISTER_ROWS;
            }
            KeyCode::Enter => {
                if let Some(profile) = form.sign_up().await {
                    tracing::info!(uid = %profile.uid, "Registered from sign-up screen");
                    self.register = None;
                    self.open_dashboard();
                }
            }
            KeyCode::Esc => {
                self.register = None;
                self.screen = Screen::Login;
            }
            code if self.form_focus == REGISTER_ROWS - 1 => {
                if is_cycle_key(code) {
                    let level = form
                        .state()
                        .fields
                        .education_level
                        .map(EducationLevel::next)
                        .unwrap_or(EducationLevel::Sd);
                    form.on_education_level_change(level);
                }
            }
            code if is_text_key(code) => {
                let focus = self.form_focus;
                form.edit(|fields| {
                    let value = match focus {
                        0 => &mut fields.email,
                        1 => &mut fields.username,
                        2 => &mut fields.password,
                        _ => &mut fields.confirm_password,
                    };
                    edit_text(value, code);
                });
            }
            _ => {}
        }
    }

    async fn handle_dashboard_key(&mut self, key: KeyEvent) {
        if self.searching {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.searching = false,
                KeyCode::Backspace => {
                    self.filter.query.pop();
                    self.selected = 0;
                }
                KeyCode::Char(c) => {
                    self.filter.query.push(c);
                    self.selected = 0;
                }
                _ => {}
            }
            return;
        }

        let visible = self.visible_animals().len();
        match key.code {
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < visible {
                    self.selected += 1;
                }
            }
            KeyCode::Left => self.filter_cursor = self.filter_cursor.saturating_sub(1),
            KeyCode::Right => {
                self.filter_cursor = (self.filter_cursor + 1).min(FilterOption::ALL.len() - 1);
            }
            KeyCode::Char(' ') => {
                self.filter.toggle(FilterOption::ALL[self.filter_cursor]);
                self.selected = 0;
            }
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Enter => {
                if let Some(animal) = self.selected_animal() {
                    self.open_detail(&animal.id);
                }
            }
            KeyCode::Char('f') => {
                if let (Some(animal), Some(dashboard)) = (self.selected_animal(), &self.dashboard) {
                    dashboard.toggle_favorite(&animal.id);
                }
            }
            KeyCode::Char('a') => {
                let animal_id = self.selected_animal().map(|animal| animal.id);
                self.open_ar(animal_id).await;
            }
            KeyCode::Char('r') => {
                if let Some(dashboard) = &self.dashboard {
                    dashboard.retry();
                }
            }
            KeyCode::Char('p') => self.open_profile(),
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    async fn handle_detail_key(&mut self, key: KeyEvent) {
        let Some(detail) = &self.detail else {
            self.screen = Screen::Dashboard;
            return;
        };

        match key.code {
            KeyCode::Tab => {
                let tabs = detail.state().success().map(|d| d.tabs().len()).unwrap_or(1);
                self.detail_tab = (self.detail_tab + 1) % tabs.max(1);
            }
            KeyCode::Char('n') => detail.play(Narration::Description),
            KeyCode::Char('m') => detail.play(Narration::FunFact),
            KeyCode::Char(' ') => self.playback.toggle_play_pause(),
            KeyCode::Char('s') => detail.stop_audio(),
            KeyCode::Left => {
                let position = self.playback.snapshot().position_ms;
                self.playback.seek_to(position.saturating_sub(SEEK_STEP_MS));
            }
            KeyCode::Right => {
                let position = self.playback.snapshot().position_ms;
                self.playback.seek_to(position + SEEK_STEP_MS);
            }
            KeyCode::Char('r') => detail.retry(),
            KeyCode::Char('a') => {
                let animal_id = detail.animal_id().to_string();
                self.playback.stop();
                self.open_ar(Some(animal_id)).await;
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Esc | KeyCode::Backspace => self.close_detail(),
            _ => {}
        }
    }

    async fn handle_profile_key(&mut self, key: KeyEvent) {
        let Some(profile) = &self.profile else {
            self.screen = Screen::Dashboard;
            return;
        };

        match key.code {
            KeyCode::Char('l') => {
                if let Some(user) = profile.state().success() {
                    profile.update_education_level(user.effective_level().next());
                }
            }
            KeyCode::Char('r') => profile.retry(),
            KeyCode::Char('e') => self.open_edit_profile().await,
            KeyCode::Char('w') => self.open_change_password(),
            KeyCode::Char('o') => self.sign_out().await,
            KeyCode::Esc | KeyCode::Backspace => {
                self.profile = None;
                self.screen = Screen::Dashboard;
                if let Some(dashboard) = &self.dashboard {
                    dashboard.retry();
                }
            }
            _ => {}
        }
    }

    async fn handle_edit_profile_key(&mut self, key: KeyEvent) {
        let Some(form) = &self.edit_profile else {
            self.back_to_profile();
            return;
        };

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.form_focus = (self.form_focus + 1) % EDIT_PROFILE_ROWS,
            KeyCode::BackTab | KeyCode::Up => {
                self.form_focus = (self.form_focus + EDIT_PROFILE_ROWS - 1) % EDIT_PROFILE_ROWS;
            }
            KeyCode::Enter => {
                if let Some(profile) = form.save().await {
                    tracing::info!(uid = %profile.uid, "Profile saved");
                    self.back_to_profile();
                }
            }
            KeyCode::Esc => self.back_to_profile(),
            code if self.form_focus == EDIT_PROFILE_ROWS - 1 => {
                if is_cycle_key(code) {
                    form.on_education_level_change(form.state().fields.education_level.next());
                }
            }
            code if is_text_key(code) => {
                let fields = form.state().fields;
                if self.form_focus == 0 {
                    let mut username = fields.username;
                    edit_text(&mut username, code);
                    form.on_username_change(&username);
                } else {
                    let mut picture_url = fields.picture_url;
                    edit_text(&mut picture_url, code);
                    form.on_picture_url_change(&picture_url);
                }
            }
            _ => {}
        }
    }

    async fn handle_change_password_key(&mut self, key: KeyEvent) {
        let Some(form) = &self.change_password else {
            self.back_to_profile();
            return;
        };

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.form_focus = (self.form_focus + 1) % CHANGE_PASSWORD_ROWS;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.form_focus = (self.form_focus + CHANGE_PASSWORD_ROWS - 1) % CHANGE_PASSWORD_ROWS;
            }
            KeyCode::Enter => {
                if form.change_password().await {
                    tracing::info!("Password changed from profile screen");
                    self.back_to_profile();
                }
            }
            KeyCode::Esc => self.back_to_profile(),
            code if is_text_key(code) => {
                let focus = self.form_focus;
                form.edit(|fields| {
                    let value = match focus {
                        0 => &mut fields.current_password,
                        1 => &mut fields.new_password,
                        _ => &mut fields.confirm_password,
                    };
                    edit_text(value, code);
                });
            }
            _ => {}
        }
    }

    async fn handle_ar_key(&mut self, key: KeyEvent) {
        let Some(ar) = &self.ar else {
            self.screen = Screen::Dashboard;
            return;
        };

        match key.code {
            KeyCode::Char('i') => ar.request_install().await,
            KeyCode::Char('g') => ar.on_permission_granted(),
            KeyCode::Char('d') => ar.on_permission_denied(),
            KeyCode::Char('s') => ar.start_scanning(),
            KeyCode::Char('p') => ar.on_plane_detected(ar.session().detected_planes + 1),
            KeyCode::Enter => {
                let placed = ar.session().placed.len() as f32;
                match ar.place_selected(placed * 0.5, 0.0, -1.0) {
                    Ok(()) => self.award_xp(AR_PLACEMENT_XP).await,
                    Err(e) => self.notice = Some(e.to_string()),
                }
            }
            KeyCode::Char('c') => ar.clear_placed(),
            KeyCode::Char('?') => {
                ar.pause();
                self.show_help = true;
            }
            KeyCode::Esc | KeyCode::Backspace => {
                self.close_ar();
                self.screen = if self.detail.is_some() {
                    Screen::Detail
                } else {
                    Screen::Dashboard
                };
            }
            _ => {}
        }
    }
}
