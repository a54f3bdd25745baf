use gumdrop::Options;
use nanoserde::{DeJson, SerJson};

#[derive(Options, Debug, Default)]
pub struct AppOptions {
    /// Print this help message
    #[options()]
    help: bool,
    /// The demo to run: bgcolor, sine, controller or scroll
    #[options(default = "bgcolor")]
    pub demo: String,
    /// How many frames to run the demo for
    #[options(default = "120")]
    pub frames: u64,
    /// Directory with the scroll demo's .tilemap, .pattern and .palette files
    #[options(default = "assets/")]
    pub asset_dir: String,
    /// Background colour of the bgcolor demo, as RRGGBB
    #[options(default = "FF8000")]
    pub colour: String,
    /// Save the last committed frame as a PNG
    #[options()]
    pub screenshot: Option<String>,
    /// Log level: off, error, warn, info, debug or trace
    #[options(default = "info")]
    pub log_level: String,
    /// Remember demo, frames, asset-dir and colour for next time
    #[options()]
    pub save_config: bool,
    /// Run with the settings saved by --save-config
    #[options()]
    pub load_config: bool,
}

/// The persisted subset of [AppOptions].
#[derive(SerJson, DeJson, Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub demo: String,
    pub frames: u64,
    pub asset_dir: String,
    pub colour: String,
}

impl AppOptions {
    pub fn demo_config(&self) -> DemoConfig {
        DemoConfig {
            demo: self.demo.clone(),
            frames: self.frames,
            asset_dir: self.asset_dir.clone(),
            colour: self.colour.clone(),
        }
    }

    pub fn apply(&mut self, config: DemoConfig) {
        self.demo = config.demo;
        self.frames = config.frames;
        self.asset_dir = config.asset_dir;
        self.colour = config.colour;
    }
}
