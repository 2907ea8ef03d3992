use crate::models::AppData;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Explicitly passed application context: created once in `main`, threaded
/// through every handler, no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub week_start_day: u32,
    pub data: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, week_start_day: u32, data: AppData) -> Self {
        Self {
            data_path,
            week_start_day,
            data: Arc::new(Mutex::new(data)),
        }
    }
}
