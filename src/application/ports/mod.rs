mod browser_driver;
mod job_store;

pub use browser_driver::{
    BrowserDriver, BrowserSession, DebugCapture, DriverError, PageElement, TransferSignal,
};
pub use job_store::{JobMutator, JobStore, StoreError};
