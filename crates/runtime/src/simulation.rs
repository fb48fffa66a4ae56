//! Frame driver binding the encounter to a host.
//!
//! The host owns the world and calls [`Simulation::on_map_loaded`] once the map
//! is ready and [`Simulation::on_frame`] every tick. Each frame runs the
//! encounter, then the preview scene, then tells the host the frame is over.

use std::path::PathBuf;

use tracing::{debug, error, info};

use encounter_content::load_encounter;
use encounter_core::{
    Encounter, EncounterConfig, FrameHook, Host, PreviewScene, Tick,
};

use crate::error::{Result, RuntimeError};

/// Encounter plus optional preview scene driven by one host.
pub struct Simulation<H> {
    host: H,
    encounter: Encounter,
    preview: Option<PreviewScene>,
    loaded: bool,
    frames: Tick,
}

impl<H> Simulation<H>
where
    H: Host + FrameHook,
{
    /// Create a new simulation builder around `host`.
    pub fn builder(host: H) -> SimulationBuilder<H> {
        SimulationBuilder::new(host)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    pub fn preview(&self) -> Option<&PreviewScene> {
        self.preview.as_ref()
    }

    pub fn config(&self) -> &EncounterConfig {
        self.encounter.config()
    }

    /// Frames run since the last map load.
    pub fn frames(&self) -> Tick {
        self.frames
    }

    /// Map-load callback: resets the encounter and the preview.
    pub fn on_map_loaded(&mut self) -> Result<()> {
        self.loaded = false;
        self.encounter.reset(&mut self.host).inspect_err(|err| {
            error!(code = err.error_code(), %err, "encounter reset failed");
        })?;
        if let Some(preview) = &mut self.preview {
            preview.reset(&mut self.host, self.encounter.config())?;
        }
        self.loaded = true;
        self.frames = Tick::ZERO;
        info!(preview = self.preview.is_some(), "map loaded");
        Ok(())
    }

    /// Per-tick callback.
    pub fn on_frame(&mut self) -> Result<()> {
        if !self.loaded {
            return Err(RuntimeError::NotLoaded);
        }
        self.encounter.update(&mut self.host).inspect_err(|err| {
            error!(code = err.error_code(), frame = %self.frames, %err, "encounter update failed");
        })?;
        if let Some(preview) = &mut self.preview {
            preview.update(&mut self.host, self.encounter.config());
        }
        let dt = self.encounter.config().tick();
        self.host.end_frame(dt);
        self.frames = self.frames + 1;
        Ok(())
    }

    /// Runs `count` frames, stopping at the first error.
    pub fn run_frames(&mut self, count: u64) -> Result<()> {
        for _ in 0..count {
            self.on_frame()?;
        }
        debug!(count, phase = %self.encounter.phase(), "frames run");
        Ok(())
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

/// Builder for [`Simulation`].
pub struct SimulationBuilder<H> {
    host: H,
    config: Option<EncounterConfig>,
    content_dir: Option<PathBuf>,
    preview: bool,
}

impl<H> SimulationBuilder<H>
where
    H: Host + FrameHook,
{
    fn new(host: H) -> Self {
        Self {
            host,
            config: None,
            content_dir: None,
            preview: false,
        }
    }

    /// Use an explicit configuration.
    pub fn config(mut self, config: EncounterConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load `balance.toml` and `room.ron` from `dir`.
    ///
    /// Ignored when [`config`](Self::config) is also given.
    pub fn content_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.content_dir = Some(dir.into());
        self
    }

    /// Also run the antechamber preview scene.
    pub fn with_preview(mut self, enable: bool) -> Self {
        self.preview = enable;
        self
    }

    pub fn build(self) -> Result<Simulation<H>> {
        let config = match (self.config, self.content_dir) {
            (Some(config), _) => config,
            (None, Some(dir)) => {
                load_encounter(&dir).map_err(|err| RuntimeError::Content(err.into()))?
            }
            (None, None) => EncounterConfig::default(),
        };
        Ok(Simulation {
            host: self.host,
            encounter: Encounter::new(config),
            preview: self.preview.then(PreviewScene::new),
            loaded: false,
            frames: Tick::ZERO,
        })
    }
}
