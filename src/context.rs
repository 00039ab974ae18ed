//! Top-level wiring: library, editor and simulator behind one API.
//!
//! Editing and simulation never overlap. Starting an edit stops the
//! simulator; playing a track cancels whatever the editor was doing.

use crate::config::SandboxConfig;
use crate::error::{Result, SandboxError};
use crate::input::{InputEvent, InputState};
use crate::render::{CarView, RenderSink, TrackView};
use crate::simulation::Simulator;
use crate::track::{SaveData, TrackEditor};
use bevy::log::info;
use std::path::PathBuf;

pub struct AppContext {
    pub config: SandboxConfig,
    pub library: SaveData,
    pub editor: TrackEditor,
    pub simulator: Simulator,
    input: InputState,
    save_path: Option<PathBuf>,
    editing: bool,
}

impl AppContext {
    pub fn new(config: SandboxConfig) -> Self {
        Self {
            editor: TrackEditor::new(&config),
            simulator: Simulator::new(&config),
            library: SaveData::default(),
            input: InputState::default(),
            save_path: None,
            editing: false,
            config,
        }
    }

    /// Back the library with a file and load the default track, if any,
    /// into the simulator.
    pub fn with_library(config: SandboxConfig, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut context = Self::new(config);
        context.library = SaveData::load(&path)?;
        context.save_path = Some(path);
        if let Some(track) = context.library.default_track(context.editor.builder()) {
            context.simulator.load_track(track);
        }
        Ok(context)
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    fn start_editing(&mut self) {
        if self.simulator.is_running() {
            // only fails when already stopped
            let _ = self.simulator.stop();
        }
        self.input.clear();
        self.editing = true;
        info!("editing started");
    }

    pub fn new_track(&mut self) {
        self.editor.reset();
        self.start_editing();
    }

    pub fn edit_track(&mut self, id: &str) -> Result<()> {
        let track = self.library.get_track(id, self.editor.builder())?;
        self.editor.load_track(track);
        self.start_editing();
        Ok(())
    }

    pub fn cancel_editing(&mut self) {
        if !self.editing {
            return;
        }
        self.editor.cancel_gesture();
        self.editing = false;
        info!("editing cancelled");
    }

    /// Finalize the editor's track, store it and make it the simulator's
    /// track. Writes the library file when there is one.
    pub fn save_track(&mut self) -> Result<String> {
        let mut track = self.editor.save()?;
        let id = self.library.save_track(&mut track);
        if let Some(path) = &self.save_path {
            self.library.save(path)?;
        }
        self.simulator.load_track(track);
        Ok(id)
    }

    pub fn play_track(&mut self, id: &str) -> Result<()> {
        let track = self.library.get_track(id, self.editor.builder())?;
        self.cancel_editing();
        self.simulator.load_track(track);
        if !self.simulator.is_running() {
            self.simulator.start()?;
        }
        Ok(())
    }

    /// Start (or restart) the simulator on whatever track it holds.
    pub fn start_simulation(&mut self) -> Result<()> {
        if self.simulator.track().is_none() {
            return Err(SandboxError::NoTrackLoaded);
        }
        self.cancel_editing();
        self.simulator.start()
    }

    pub fn stop_simulation(&mut self) -> Result<()> {
        self.simulator.stop()
    }

    /// Key state is always tracked; pointer and modifier events only reach
    /// the editor while editing.
    pub fn handle_input(&mut self, event: &InputEvent) -> Result<()> {
        self.input.apply(event);
        if self.editing {
            self.editor.handle_event(event)?;
        }
        Ok(())
    }

    pub fn tick(&mut self) -> bool {
        if self.editing {
            return false;
        }
        self.simulator.set_pilot_controls(self.input.snapshot().pilot);
        self.simulator.tick()
    }

    pub fn render(&self, sink: &mut dyn RenderSink) {
        sink.begin_frame();
        if self.editing {
            sink.draw_track(&TrackView::new(&self.editor.track, self.editor.selected()));
            if let Some(preview) = self.editor.preview_segment() {
                sink.draw_preview(&preview);
            }
        } else {
            if let Some(track) = self.simulator.track() {
                sink.draw_track(&TrackView::new(track, None));
            }
            for car in self.simulator.cars() {
                sink.draw_car(&CarView::from(car));
            }
        }
        sink.end_frame();
    }
}
