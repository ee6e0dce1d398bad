#![deny(unsafe_code)]
//! Session host for flow-art.
//!
//! A [`Studio`] owns the settings, a [`RasterCanvas`] and at most one
//! in-flight [`GenerationTask`]. Hosts call [`Studio::frame`] once per frame:
//! it reports `Loading` while the background pass runs, installs the finished
//! [`CurveManager`] (clearing the canvas to the theme background), and then
//! draws either everything at once or `animation_speed` curves per frame.
//!
//! User actions (regenerate, randomize seed or palette, pointer moves,
//! parameter edits) cancel any in-flight pass and discard animated state
//! before starting a new one.

#[cfg(feature = "png")]
pub mod snapshot;
pub mod task;

use flow_art_core::{FlowError, Palette, RasterCanvas, Settings, Surface};
use flow_art_curves::CurveManager;
use glam::DVec2;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;

pub use task::GenerationTask;

/// Upper bound (exclusive) for randomized seeds.
pub const SEED_RANGE: u32 = 99_999;

/// What a call to [`Studio::frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// A generation pass is still running.
    Loading,
    /// Curves were drawn this frame.
    Drawing { rendered: usize, total: usize },
    /// Nothing left to do until the next action.
    Idle,
}

pub struct Studio {
    settings: Settings,
    canvas: RasterCanvas,
    task: Option<GenerationTask>,
    manager: Option<CurveManager>,
    pointer: Option<DVec2>,
}

impl Studio {
    /// Creates a studio and starts the first generation pass.
    pub fn new(width: u32, height: u32, settings: Settings) -> Result<Self, FlowError> {
        let canvas = RasterCanvas::new(width, height, settings.background())?;
        let mut studio = Self {
            settings,
            canvas,
            task: None,
            manager: None,
            pointer: None,
        };
        studio.regenerate()?;
        Ok(studio)
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn canvas(&self) -> &RasterCanvas {
        &self.canvas
    }

    /// The installed generation result, once loading has finished.
    pub fn manager(&self) -> Option<&CurveManager> {
        self.manager.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.task.is_some()
    }

    /// Cancels any running pass, clears the canvas and starts a new pass.
    pub fn regenerate(&mut self) -> Result<(), FlowError> {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        self.manager = None;
        self.canvas.clear(self.settings.background());
        self.task = Some(GenerationTask::spawn(
            self.canvas.width(),
            self.canvas.height(),
            self.settings.clone(),
            self.pointer,
        )?);
        log::debug!(
            "regenerating {}x{} with seed {}",
            self.canvas.width(),
            self.canvas.height(),
            self.settings.seed
        );
        Ok(())
    }

    /// Merges a JSON parameter object into the settings and regenerates.
    pub fn update_params(&mut self, params: &Value) -> Result<(), FlowError> {
        self.settings = self.settings.merged(params);
        self.regenerate()
    }

    /// Replaces the settings wholesale and regenerates.
    pub fn set_settings(&mut self, settings: Settings) -> Result<(), FlowError> {
        self.settings = settings;
        self.regenerate()
    }

    /// Picks a seed in `[0, SEED_RANGE)` and regenerates. Returns the seed.
    pub fn randomize_seed(&mut self) -> Result<u32, FlowError> {
        self.randomize_seed_with(&mut rand::thread_rng())
    }

    pub fn randomize_seed_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<u32, FlowError> {
        self.settings.seed = rng.gen_range(0..SEED_RANGE);
        self.regenerate()?;
        Ok(self.settings.seed)
    }

    /// Switches to a different built-in palette and regenerates. Returns the
    /// palette name.
    pub fn randomize_palette(&mut self) -> Result<String, FlowError> {
        self.randomize_palette_with(&mut rand::thread_rng())
    }

    pub fn randomize_palette_with<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<String, FlowError> {
        let others: Vec<&str> = Palette::list_names()
            .into_iter()
            .filter(|name| *name != self.settings.palette)
            .collect();
        if let Some(name) = others.choose(rng) {
            self.settings.palette = (*name).to_owned();
        }
        self.regenerate()?;
        Ok(self.settings.palette.clone())
    }

    /// Moves the pointer. Only regenerates when the field follows it.
    pub fn set_pointer(&mut self, pointer: Option<DVec2>) -> Result<(), FlowError> {
        self.pointer = pointer;
        if self.settings.follow_pointer {
            self.regenerate()?;
        }
        Ok(())
    }

    pub fn pointer(&self) -> Option<DVec2> {
        self.pointer
    }

    fn install(&mut self, manager: CurveManager) {
        self.canvas.clear(self.settings.background());
        log::debug!("installed {} curves", manager.total());
        self.manager = Some(manager);
    }

    /// Advances the session by one host frame.
    ///
    /// A failed or cancelled pass is returned as an error once and leaves
    /// the studio idle.
    pub fn frame(&mut self) -> Result<FrameStatus, FlowError> {
        if let Some(task) = self.task.as_mut() {
            match task.try_finish() {
                None => return Ok(FrameStatus::Loading),
                Some(outcome) => {
                    self.task = None;
                    self.install(outcome?);
                }
            }
        }

        let Some(manager) = self.manager.as_mut() else {
            return Ok(FrameStatus::Idle);
        };
        if manager.is_complete() {
            return Ok(FrameStatus::Idle);
        }
        if manager.settings().animate {
            let speed = manager.settings().animation_speed;
            manager.render_next_batch(&mut self.canvas, speed);
        } else {
            manager.render(&mut self.canvas);
        }
        Ok(FrameStatus::Drawing {
            rendered: manager.rendered_count(),
            total: manager.total(),
        })
    }

    /// Blocks until the running pass (if any) has been installed.
    pub fn wait(&mut self) -> Result<(), FlowError> {
        if let Some(task) = self.task.take() {
            let manager = task.wait()?;
            self.install(manager);
        }
        Ok(())
    }

    /// Waits for generation and draws everything that is left.
    pub fn finish(&mut self) -> Result<(), FlowError> {
        self.wait()?;
        if let Some(manager) = self.manager.as_mut() {
            manager.render(&mut self.canvas);
        }
        Ok(())
    }

    /// Draws the zone and obstacle outlines of the installed pass.
    pub fn draw_overlay(&mut self) {
        if let Some(manager) = &self.manager {
            manager.render_overlay(&mut self.canvas);
        }
    }

    /// Writes the canvas as it currently looks to a PNG file.
    #[cfg(feature = "png")]
    pub fn save_image(&self, path: &std::path::Path) -> Result<(), FlowError> {
        snapshot::write_png(&self.canvas, path)
    }
}
