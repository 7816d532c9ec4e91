mod settings;

pub use settings::{
    BrowserSettings, DownloadSettings, JanitorSettings, ServerSettings, Settings,
};
