use crate::actions::{launch, Spawner};
use crate::dialog::ErrorQueue;
use crate::icons::IconSet;
use crate::lister::load_entries;
use crate::prefs::{configured_dir, PreferenceStore};
use crate::search::filter_entries;
use crate::settings::SettingsFlow;
use crate::ui_model::{clamp_row, match_positions, step_row};
use eframe::egui;
use eframe::egui::load::SizedTexture;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppPhase {
    Running,
    /// A program was started; the window closes and the launcher exits.
    HandedOff(PathBuf),
}

struct IconTextures {
    settings: egui::TextureHandle,
    error: egui::TextureHandle,
}

pub struct RunBoxApp {
    prefs: Box<dyn PreferenceStore>,
    spawner: Box<dyn Spawner>,
    entries: Vec<String>,
    query: String,
    results: Vec<String>,
    current_row: Option<usize>,
    settings: SettingsFlow,
    errors: ErrorQueue<RunBoxApp>,
    phase: AppPhase,
    textures: Option<IconTextures>,
    focus_query_requested: bool,
    scroll_to_current: bool,
}

impl RunBoxApp {
    pub fn new(prefs: Box<dyn PreferenceStore>, spawner: Box<dyn Spawner>, query: String) -> Self {
        let mut app = Self {
            prefs,
            spawner,
            entries: Vec::new(),
            query,
            results: Vec::new(),
            current_row: None,
            settings: SettingsFlow::default(),
            errors: ErrorQueue::default(),
            phase: AppPhase::Running,
            textures: None,
            focus_query_requested: true,
            scroll_to_current: true,
        };
        app.reload_entries();
        app
    }

    pub fn install_icons(&mut self, ctx: &egui::Context, icons: &IconSet) {
        self.textures = Some(IconTextures {
            settings: ctx.load_texture(
                "settings-icon",
                icons.settings.to_color_image(),
                egui::TextureOptions::LINEAR,
            ),
            error: ctx.load_texture(
                "error-icon",
                icons.error.to_color_image(),
                egui::TextureOptions::LINEAR,
            ),
        });
    }

    pub fn phase(&self) -> &AppPhase {
        &self.phase
    }

    /// Re-reads the configured directory. A failure leaves an empty list.
    pub fn reload_entries(&mut self) {
        let configured = configured_dir(self.prefs.as_ref());
        match load_entries(configured.as_deref()) {
            Ok(names) => self.entries = names,
            Err(err) => {
                self.entries.clear();
                self.errors.show_error(err.to_string(), None);
            }
        }
        self.update_results();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.update_results();
    }

    fn update_results(&mut self) {
        self.results = filter_entries(&self.entries, &self.query);
        self.current_row = clamp_row(None, self.results.len());
        self.scroll_to_current = true;
        tracing::debug!(query = %self.query, results = self.results.len(), "filtered");
    }

    fn move_row(&mut self, delta: isize) {
        if self.results.is_empty() {
            return;
        }
        self.current_row = step_row(self.current_row, delta, self.results.len());
        self.scroll_to_current = true;
    }

    fn clear_query(&mut self) {
        self.query.clear();
        self.update_results();
        self.focus_query_requested = true;
    }

    fn is_blocked(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Launches the current row, which is the first result unless the user
    /// moved the selection.
    pub fn submit(&mut self) {
        let Some(name) = self
            .current_row
            .and_then(|row| self.results.get(row))
            .cloned()
        else {
            return;
        };
        self.launch_name(&name);
    }

    fn launch_name(&mut self, name: &str) {
        let configured = configured_dir(self.prefs.as_ref());
        match launch(configured.as_deref(), name, self.spawner.as_mut()) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "handing off to launched program");
                self.phase = AppPhase::HandedOff(path);
            }
            Err(err) => {
                self.errors.show_error(
                    err.to_string(),
                    Some(Box::new(|app: &mut RunBoxApp| {
                        app.focus_query_requested = true;
                    })),
                );
            }
        }
    }

    pub fn open_settings(&mut self) {
        self.settings.open(self.prefs.as_ref());
    }

    pub fn save_settings(&mut self) {
        if let Err(err) = self.settings.save(self.prefs.as_mut()) {
            self.errors.show_error(err.to_string(), None);
        }
    }

    fn browse_settings(&mut self) {
        let start = PathBuf::from(&self.settings.draft);
        let mut dialog = native_dialog::FileDialog::new();
        if start.is_dir() {
            dialog = dialog.set_location(&start);
        }
        match dialog.show_open_single_dir() {
            Ok(Some(dir)) => self.settings.set_draft_path(&dir),
            Ok(None) => {}
            Err(err) => self
                .errors
                .show_error(format!("Browse failed: {err}"), None),
        }
    }

    pub fn dismiss_error(&mut self) {
        if let Some(hook) = self.errors.dismiss() {
            hook(self);
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowDown))
            || ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::N))
        {
            self.move_row(1);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowUp))
            || ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::P))
        {
            self.move_row(-1);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
            self.submit();
            // Enter drops focus from the single-line edit.
            self.focus_query_requested = true;
        }
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Escape)) {
            self.clear_query();
        }
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::F5)) {
            self.reload_entries();
        }
    }

    fn settings_button(&self) -> egui::Button<'static> {
        match &self.textures {
            Some(textures) => egui::Button::image(
                egui::Image::from_texture(SizedTexture::from_handle(&textures.settings))
                    .fit_to_exact_size(egui::vec2(18.0, 18.0)),
            ),
            None => egui::Button::new("⚙"),
        }
    }

    fn result_row_job(&self, name: &str, is_current: bool) -> egui::text::LayoutJob {
        let positions = match_positions(name, &self.query);
        let mut job = egui::text::LayoutJob::default();
        job.append(
            if is_current { "▶ " } else { "  " },
            0.0,
            egui::TextFormat {
                color: egui::Color32::LIGHT_BLUE,
                ..Default::default()
            },
        );
        for (idx, ch) in name.chars().enumerate() {
            let color = if positions.contains(&idx) {
                egui::Color32::from_rgb(245, 158, 11)
            } else if is_current {
                egui::Color32::WHITE
            } else {
                egui::Color32::from_rgb(229, 231, 235)
            };
            job.append(
                &ch.to_string(),
                0.0,
                egui::TextFormat {
                    color,
                    ..Default::default()
                },
            );
        }
        job
    }

    fn draw_search_panel(&mut self, ctx: &egui::Context, interactive: bool) {
        egui::TopBottomPanel::top("search").show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("Search Here:").italics());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add(self.settings_button())
                            .on_hover_text("Settings")
                            .clicked()
                        {
                            self.open_settings();
                        }
                    });
                });

                let output = egui::TextEdit::singleline(&mut self.query)
                    .id(ui.make_persistent_id("query-input"))
                    .desired_width(f32::INFINITY)
                    .hint_text("Keyword ...")
                    .show(ui);
                if self.focus_query_requested && interactive {
                    output.response.request_focus();
                    self.focus_query_requested = false;
                }
                if output.response.changed() {
                    self.update_results();
                }
            });
        });
    }

    fn draw_results(&mut self, ctx: &egui::Context, interactive: bool) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let mut clicked_row: Option<usize> = None;
            let mut launch_row: Option<usize> = None;
            let mut did_scroll_to_current = false;
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for (i, name) in self.results.iter().enumerate() {
                        let is_current = self.current_row == Some(i);
                        let job = self.result_row_job(name, is_current);
                        let response = ui.add_enabled(
                            interactive,
                            egui::Label::new(job)
                                .selectable(false)
                                .sense(egui::Sense::click()),
                        );
                        if self.scroll_to_current && is_current && !did_scroll_to_current {
                            response.scroll_to_me(Some(egui::Align::Center));
                            did_scroll_to_current = true;
                        }
                        if response.double_clicked() {
                            launch_row = Some(i);
                        } else if response.clicked() {
                            clicked_row = Some(i);
                        }
                    }
                });
            if did_scroll_to_current {
                self.scroll_to_current = false;
            }
            if let Some(i) = clicked_row {
                self.current_row = Some(i);
            }
            if let Some(i) = launch_row {
                self.current_row = Some(i);
                self.submit();
            }
        });
    }

    fn draw_settings_window(&mut self, ctx: &egui::Context, interactive: bool) {
        if !self.settings.is_open() {
            return;
        }

        let mut open = true;
        let mut save = false;
        let mut browse = false;
        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.add_enabled_ui(interactive, |ui| {
                    ui.horizontal(|ui| {
                        ui.label("search location:");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.settings.draft)
                                .hint_text("Path..")
                                .desired_width(220.0),
                        );
                        browse = ui.button("Browse...").clicked();
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        save = ui.button("Save").clicked();
                    });
                });
            });

        if browse {
            self.browse_settings();
        }
        if save {
            self.save_settings();
        } else if !open && interactive {
            self.settings.cancel();
        }
    }

    fn draw_error_window(&mut self, ctx: &egui::Context, accept_keys: bool) {
        let Some(message) = self.errors.current().map(|d| d.message().to_string()) else {
            return;
        };

        let mut open = true;
        let mut dismiss = false;
        egui::Window::new("Error")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if let Some(textures) = &self.textures {
                        ui.add(
                            egui::Image::from_texture(SizedTexture::from_handle(&textures.error))
                                .fit_to_exact_size(egui::vec2(24.0, 24.0)),
                        );
                    }
                    ui.label(egui::RichText::new(&message).monospace());
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    dismiss = ui.button("OK").clicked();
                });
            });

        if accept_keys
            && ctx.input(|i| i.key_pressed(egui::Key::Enter) || i.key_pressed(egui::Key::Escape))
        {
            dismiss = true;
        }
        if dismiss || !open {
            self.dismiss_error();
        }
    }
}

impl eframe::App for RunBoxApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let AppPhase::HandedOff(_) = self.phase {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        // Keys that opened an error this frame must not also dismiss it.
        let blocked_at_start = self.is_blocked();
        let search_active = !blocked_at_start && !self.settings.is_open();
        if search_active {
            self.handle_shortcuts(ctx);
        }

        self.draw_search_panel(ctx, search_active);
        self.draw_results(ctx, search_active);
        self.draw_settings_window(ctx, !blocked_at_start);
        self.draw_error_window(ctx, blocked_at_start);

        if self.phase != AppPhase::Running {
            ctx.request_repaint();
        }
    }
}
