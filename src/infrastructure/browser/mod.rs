mod chromium_driver;

pub use chromium_driver::{ChromiumDriver, ChromiumDriverConfig, ChromiumSession};
