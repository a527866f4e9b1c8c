use crate::config::Config;
use crate::dataset::{load_dataset, write_csv_file};
use crate::logic::{build_schedule, ThresholdConfig};
use crate::models::{Dataset, Schedule, Treatment};
use crate::ui::screens::SettingsField;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Schedule,
    Chart,
    Settings,
}

impl Screen {
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Screen::Dashboard),
            '2' => Some(Screen::Schedule),
            '3' => Some(Screen::Chart),
            's' | 'S' => Some(Screen::Settings),
            _ => None,
        }
    }
}

pub struct ScheduleState {
    pub selected_index: usize,
}

impl ScheduleState {
    pub fn new() -> Self {
        Self { selected_index: 0 }
    }

    pub fn next(&mut self, max: usize) {
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }
}

pub struct SettingsState {
    pub focused_field: SettingsField,
    pub editing: bool,
    pub edit_buffer: String,
}

impl SettingsState {
    pub fn new() -> Self {
        Self {
            focused_field: SettingsField::Treatment,
            editing: false,
            edit_buffer: String::new(),
        }
    }

    pub fn next_field(&mut self) {
        self.focused_field = self.focused_field.next();
    }

    pub fn prev_field(&mut self) {
        self.focused_field = self.focused_field.prev();
    }

    pub fn start_editing(&mut self, current_value: &str) {
        self.editing = true;
        self.edit_buffer = current_value.to_string();
    }

    pub fn cancel_editing(&mut self) {
        self.editing = false;
        self.edit_buffer.clear();
    }

    pub fn finish_editing(&mut self) -> String {
        self.editing = false;
        std::mem::take(&mut self.edit_buffer)
    }
}

pub struct App {
    pub screen: Screen,
    pub should_quit: bool,
    pub config: Config,

    // Session state
    pub treatment: Treatment,
    pub thresholds: ThresholdConfig,
    pub dataset: Option<Dataset>,
    pub dataset_path: Option<PathBuf>,
    pub schedule: Option<Schedule>,

    // Screen states
    pub schedule_state: ScheduleState,
    pub settings_state: SettingsState,

    // UI state
    pub status_message: Option<String>,
    pub needs_reload: bool,
}

impl App {
    pub fn new(config: Config, treatment: Treatment) -> Self {
        let thresholds = config.thresholds;
        Self {
            screen: Screen::Dashboard,
            should_quit: false,
            config,
            treatment,
            thresholds,
            dataset: None,
            dataset_path: None,
            schedule: None,
            schedule_state: ScheduleState::new(),
            settings_state: SettingsState::new(),
            status_message: None,
            needs_reload: false,
        }
    }

    pub fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    pub fn request_reload(&mut self) {
        self.needs_reload = true;
        self.set_status("Reloading dataset...");
    }

    /// Read a dataset from disk and rebuild the schedule. Import failures
    /// leave the previous dataset in place and surface in the status line.
    pub fn load_dataset(&mut self, path: &Path) {
        match load_dataset(path) {
            Ok(dataset) => {
                self.dataset_path = Some(path.to_path_buf());
                self.dataset = Some(dataset);
                self.schedule_state.selected_index = 0;
                self.rebuild_schedule();
            }
            Err(e) => {
                tracing::warn!("dataset load failed: {}", e);
                self.set_status(&format!("Load failed: {}", e));
            }
        }
    }

    pub fn reload(&mut self) {
        match self.dataset_path.clone() {
            Some(path) => self.load_dataset(&path),
            None => self.set_status("No dataset loaded - start with --input <file.csv>"),
        }
    }

    /// Re-run the batch over the current dataset with the current treatment
    /// and thresholds. All-or-nothing: on failure no schedule is shown.
    pub fn rebuild_schedule(&mut self) {
        self.schedule = None;
        let Some(dataset) = &self.dataset else {
            return;
        };
        match build_schedule(dataset, self.treatment, &self.thresholds) {
            Ok(schedule) => {
                self.schedule = Some(schedule);
                if self.treatment.is_control() {
                    self.set_status("Control group - no irrigation logic applied");
                } else {
                    self.set_status("Irrigation schedule calculated");
                }
            }
            Err(e) => self.set_status(&format!("Evaluation failed: {}", e)),
        }
    }

    pub fn cycle_treatment(&mut self) {
        self.treatment = self.treatment.next();
        self.schedule_state.selected_index = 0;
        self.rebuild_schedule();
    }

    /// Write the current schedule into the configured export directory.
    pub fn export_schedule(&mut self) {
        let (Some(dataset), Some(schedule)) = (&self.dataset, &self.schedule) else {
            self.set_status("Nothing to export - load a dataset first");
            return;
        };
        let path = self
            .config
            .export
            .directory
            .join(self.treatment.schedule_filename());
        match write_csv_file(dataset, schedule, &path) {
            Ok(()) => self.set_status(&format!("Schedule written to {}", path.display())),
            Err(e) => self.set_status(&format!("Export failed: {}", e)),
        }
    }
}
