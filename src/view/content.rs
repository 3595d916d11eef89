//! Main content area rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};
use ratatui::widgets::Padding;

use faunadex::controller::{AnimalDetail, ArStatus, Dashboard};
use faunadex::model::{DetailTab, DisplayState};

use super::utils::{calculate_animal_column_widths, render_scrollable_list, truncate_string};
use crate::app::{App, LoginFocus};

fn focused_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1))
        .border_style(Style::default().fg(Color::Green))
}

fn render_loading(frame: &mut Frame, area: Rect, title: &str) {
    let loading = Paragraph::new("Loading...")
        .style(Style::default().fg(Color::Yellow))
        .block(focused_block(title));
    frame.render_widget(loading, area);
}

fn render_error(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let text = vec![
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(Span::styled("Press R to retry", Style::default().fg(Color::DarkGray))),
    ];
    let error = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(focused_block(title));
    frame.render_widget(error, area);
}

pub fn render_login(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.login.state();

    let popup_width = 56.min(area.width);
    let popup_height = 12.min(area.height);
    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width) / 2,
        y: area.height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    let field_style = |focus: LoginFocus| {
        if app.login_focus == focus {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        }
    };

    let masked: String = "•".repeat(state.fields.password.chars().count());
    let mut lines = vec![
        Line::from(Span::styled(
            "Explore the animals of Indonesia",
            Style::default().fg(Color::Cyan),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Email: ", field_style(LoginFocus::Email)),
            Span::raw(state.fields.email.clone()),
        ]),
        Line::from(vec![
            Span::styled("Password: ", field_style(LoginFocus::Password)),
            Span::raw(masked),
        ]),
        Line::from(""),
    ];

    if state.is_submitting {
        lines.push(Line::from(Span::styled("Signing in...", Style::default().fg(Color::Yellow))));
    } else if let Some(error) = &state.error {
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    }
    lines.push(Line::from(Span::styled(
        "Tab switch field | Enter sign in | Ctrl+R register | Esc quit",
        Style::default().fg(Color::DarkGray),
    )));

    let login = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(focused_block(" FaunaDex - Sign in "));
    frame.render_widget(login, popup_area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

struct FormRow {
    label: &'static str,
    value: String,
    masked: bool,
}

impl FormRow {
    fn text(label: &'static str, value: &str) -> Self {
        Self { label, value: value.to_string(), masked: false }
    }

    fn secret(label: &'static str, value: &str) -> Self {
        Self { label, value: value.to_string(), masked: true }
    }
}

struct FormView<'a> {
    title: &'a str,
    rows: Vec<FormRow>,
    focus: usize,
    is_submitting: bool,
    error: Option<&'a str>,
    hint: &'a str,
}

fn render_form(frame: &mut Frame, area: Rect, form: FormView<'_>) {
    let label_width = form.rows.iter().map(|row| row.label.len()).max().unwrap_or(0);
    let mut lines = Vec::with_capacity(form.rows.len() + 4);

    for (i, row) in form.rows.iter().enumerate() {
        let style = if i == form.focus {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let value = if row.masked {
            "•".repeat(row.value.chars().count())
        } else {
            row.value.clone()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:>width$}: ", row.label, width = label_width), style),
            Span::raw(value),
        ]));
    }

    lines.push(Line::from(""));
    if form.is_submitting {
        lines.push(Line::from(Span::styled("Saving...", Style::default().fg(Color::Yellow))));
    } else if let Some(error) = form.error {
        lines.push(Line::from(Span::styled(error.to_string(), Style::default().fg(Color::Red))));
    }
    lines.push(Line::from(Span::styled(form.hint.to_string(), Style::default().fg(Color::DarkGray))));

    let height = lines.len() as u16 + 4;
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(focused_block(form.title));
    frame.render_widget(widget, centered(area, 60, height));
}

pub fn render_register(frame: &mut Frame, area: Rect, app: &App) {
    let Some(register) = &app.register else {
        return;
    };
    let state = register.state();
    let level = state
        .fields
        .education_level
        .map(|level| level.to_string())
        .unwrap_or_else(|| "(choose)".to_string());

    render_form(
        frame,
        area,
        FormView {
            title: " FaunaDex - Create account ",
            rows: vec![
                FormRow::text("Email", &state.fields.email),
                FormRow::text("Username", &state.fields.username),
                FormRow::secret("Password", &state.fields.password),
                FormRow::secret("Confirm", &state.fields.confirm_password),
                FormRow::text("Level", &level),
            ],
            focus: app.form_focus,
            is_submitting: state.is_submitting,
            error: state.error.as_deref(),
            hint: "Tab next | Space change level | Enter register | Esc back",
        },
    );
}

pub fn render_edit_profile(frame: &mut Frame, area: Rect, app: &App) {
    let Some(edit) = &app.edit_profile else {
        return;
    };
    let state = edit.state();

    render_form(
        frame,
        area,
        FormView {
            title: " Edit profile ",
            rows: vec![
                FormRow::text("Username", &state.fields.username),
                FormRow::text("Picture URL", &state.fields.picture_url),
                FormRow::text("Level", &state.fields.education_level.to_string()),
            ],
            focus: app.form_focus,
            is_submitting: state.is_submitting,
            error: state.error.as_deref(),
            hint: "Tab next | Space change level | Enter save | Esc back",
        },
    );
}

pub fn render_change_password(frame: &mut Frame, area: Rect, app: &App) {
    let Some(change) = &app.change_password else {
        return;
    };
    let state = change.state();

    render_form(
        frame,
        area,
        FormView {
            title: " Change password ",
            rows: vec![
                FormRow::secret("Current", &state.fields.current_password),
                FormRow::secret("New", &state.fields.new_password),
                FormRow::secret("Confirm", &state.fields.confirm_password),
            ],
            focus: app.form_focus,
            is_submitting: state.is_submitting,
            error: state.error.as_deref(),
            hint: "Tab next | Enter change | Esc back",
        },
    );
}

pub fn render_dashboard(frame: &mut Frame, area: Rect, app: &App, state: Option<&DisplayState<Dashboard>>) {
    let title = " Animals ";
    let dashboard = match state {
        None | Some(DisplayState::Loading) => return render_loading(frame, area, title),
        Some(DisplayState::Error(message)) => return render_error(frame, area, title, message),
        Some(DisplayState::Success(dashboard)) => dashboard,
    };

    let animals = app.filter.apply(&dashboard.animals, &dashboard.favorites);
    if animals.is_empty() {
        let empty = Paragraph::new("No animals match the current filter")
            .style(Style::default().fg(Color::DarkGray))
            .block(focused_block(title));
        frame.render_widget(empty, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let (num_width, fav_width, name_width, scientific_width, status_width) =
        calculate_animal_column_widths(content_width, animals.len());

    let items: Vec<ListItem> = animals
        .iter()
        .enumerate()
        .map(|(i, animal)| {
            let favorite = if dashboard.favorites.contains(&animal.id) { "♥" } else { " " };
            let text = format!(
                " {:>num_width$}   {:<fav_width$}   {}   {}   {:<status_width$}",
                i + 1,
                favorite,
                truncate_string(&animal.name, name_width),
                truncate_string(&animal.scientific_name, scientific_width),
                animal.conservation_status,
            );
            let style = if i == app.selected {
                Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(text).style(style)
        })
        .collect();

    let block_title = format!(
        " Animals ({}) | {} favorites ",
        animals.len(),
        dashboard.favorites.len()
    );
    render_scrollable_list(frame, area, items, app.selected, focused_block(&block_title));
}

pub fn render_detail(frame: &mut Frame, area: Rect, app: &App) {
    let title = " Animal ";
    let Some(controller) = &app.detail else {
        return render_loading(frame, area, title);
    };

    let detail = match controller.state() {
        DisplayState::Loading => return render_loading(frame, area, title),
        DisplayState::Error(message) => return render_error(frame, area, title, &message),
        DisplayState::Success(detail) => detail,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let tabs = detail.tabs();
    let selected_tab = app.detail_tab.min(tabs.len().saturating_sub(1));
    let tab_widget = Tabs::new(tabs.iter().map(|tab| tab.title()))
        .select(selected_tab)
        .highlight_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ({}) ", detail.animal.name, detail.education_level)),
        );
    frame.render_widget(tab_widget, chunks[0]);

    let lines = match tabs.get(selected_tab).copied().unwrap_or(DetailTab::Info) {
        DetailTab::Info => info_lines(&detail),
        DetailTab::Population => population_lines(&detail),
        DetailTab::Habitat => habitat_lines(&detail),
        DetailTab::Taxonomy => taxonomy_lines(&detail),
    };

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(focused_block(" N narrate | M fun fact | A view in AR | Esc back "));
    frame.render_widget(body, chunks[1]);
}

fn label_line(label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:>14}: ", label), Style::default().fg(Color::Cyan)),
        Span::raw(value.into()),
    ])
}

fn info_lines(detail: &AnimalDetail) -> Vec<Line<'static>> {
    let animal = &detail.animal;
    let mut lines = vec![
        Line::from(Span::styled(
            animal.scientific_name.clone(),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        label_line(
            "Status",
            format!("{} ({})", animal.conservation_label(), animal.conservation_status),
        ),
        label_line("Category", animal.category.clone()),
        label_line("Diet", animal.diet.clone()),
        label_line("Lifespan", animal.lifespan.clone()),
        label_line("Size", format!("{} / {}", animal.weight, animal.length)),
        Line::from(""),
        Line::from(detail.description().to_string()),
    ];
    if !animal.fun_fact.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Fun fact: {}", animal.fun_fact),
            Style::default().fg(Color::Yellow),
        )));
    }
    lines
}

fn population_lines(detail: &AnimalDetail) -> Vec<Line<'static>> {
    let population = &detail.animal.population;
    vec![
        label_line("Past", population.past.to_string()),
        label_line("Present", population.present.to_string()),
        label_line("Trend", population.trend.clone()),
        label_line("Decline", format!("{:.1}%", population.decline_percent())),
        label_line("Rarity", detail.animal.rarity_level.clone()),
        label_line(
            "Protected",
            if detail.animal.is_protected {
                detail.animal.protection_type.clone()
            } else {
                "No".to_string()
            },
        ),
    ]
}

fn habitat_lines(detail: &AnimalDetail) -> Vec<Line<'static>> {
    let animal = &detail.animal;
    vec![
        label_line("Habitat", animal.habitat.clone()),
        label_line("Endemic", animal.endemic_status.clone()),
        label_line("Active", animal.activity_period.clone()),
        label_line(
            "Location",
            format!("{}, {}", animal.location.city, animal.location.country),
        ),
        label_line(
            "Coordinates",
            format!("{:.4}, {:.4}", animal.location.latitude, animal.location.longitude),
        ),
    ]
}

fn taxonomy_lines(detail: &AnimalDetail) -> Vec<Line<'static>> {
    let taxonomy = &detail.animal.taxonomy;
    [
        ("Domain", &taxonomy.domain),
        ("Kingdom", &taxonomy.kingdom),
        ("Phylum", &taxonomy.phylum),
        ("Class", &taxonomy.class),
        ("Order", &taxonomy.order),
        ("Family", &taxonomy.family),
        ("Genus", &taxonomy.genus),
        ("Species", &taxonomy.species),
    ]
    .into_iter()
    .map(|(label, value)| label_line(label, value.clone()))
    .collect()
}

pub fn render_profile(frame: &mut Frame, area: Rect, app: &App) {
    let title = " Profile ";
    let Some(controller) = &app.profile else {
        return render_loading(frame, area, title);
    };

    let profile = match controller.state() {
        DisplayState::Loading => return render_loading(frame, area, title),
        DisplayState::Error(message) => return render_error(frame, area, title, &message),
        DisplayState::Success(profile) => profile,
    };

    let joined = profile
        .joined_at
        .map(|at| at.format("%d %B %Y").to_string())
        .unwrap_or_else(|| "-".to_string());

    let lines = vec![
        label_line("Username", profile.username.clone()),
        label_line("Email", profile.email.clone()),
        label_line("Picture", profile.profile_picture_url.clone().unwrap_or_else(|| "-".to_string())),
        label_line("Title", profile.current_title.clone()),
        label_line("Level", profile.effective_level().to_string()),
        label_line("XP", profile.total_xp.to_string()),
        label_line("Favorites", profile.favorites.len().to_string()),
        label_line("Joined", joined),
        Line::from(""),
        Line::from(Span::styled(
            "L level | E edit | W password | O sign out | Esc back",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let body = Paragraph::new(lines).block(focused_block(title));
    frame.render_widget(body, area);
}

pub fn render_ar(frame: &mut Frame, area: Rect, app: &App) {
    let title = " AR Viewer ";
    let Some(ar) = &app.ar else {
        return render_loading(frame, area, title);
    };

    let session = ar.session();
    let (status, color) = match ar.status() {
        ArStatus::Initializing => ("Checking AR support...".to_string(), Color::Yellow),
        ArStatus::CameraPermissionRequired => {
            ("Camera permission needed (G grant, D deny)".to_string(), Color::Yellow)
        }
        ArStatus::Unsupported => ("AR is not supported on this device".to_string(), Color::Red),
        ArStatus::InstallRequired => ("Press I to install the AR runtime".to_string(), Color::Yellow),
        ArStatus::Ready => ("Ready. Press S to scan for surfaces".to_string(), Color::Green),
        ArStatus::Scanning(planes) => (format!("Scanning... {} surface(s) found", planes), Color::Cyan),
        ArStatus::AnimalPlaced(animal) => (format!("{} placed", animal.name), Color::Green),
        ArStatus::Error(message) => (message, Color::Red),
    };

    let mut lines = vec![
        Line::from(Span::styled(status, Style::default().fg(color).add_modifier(Modifier::BOLD))),
        Line::from(""),
        label_line(
            "Selected",
            session
                .selected_animal
                .as_ref()
                .map(|animal| animal.name.clone())
                .unwrap_or_else(|| "-".to_string()),
        ),
        label_line("Surfaces", session.detected_planes.to_string()),
        label_line("Placed", session.placed.len().to_string()),
    ];
    for placed in &session.placed {
        let [x, y, z] = placed.position;
        lines.push(Line::from(format!(
            "  • {} at ({:.1}, {:.1}, {:.1})",
            placed.animal.name, x, y, z
        )));
    }
    if let Some(url) = session.selected_animal.as_ref().and_then(|a| a.ar_model_url.as_ref()) {
        lines.push(Line::from(""));
        lines.push(label_line("Model", url.clone()));
    }

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(focused_block(" P detect surface | Enter place | C clear | Esc back "));
    frame.render_widget(body, area);
}
