use crate::errors::AppError;
use crate::models::AppData;
use crate::timezone::DEFAULT_WEEK_START;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{error, warn};

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/state.json"))
}

/// Week start weekday from `WEEK_START_DAY` (0=Sunday..6=Saturday); falls
/// back to Sunday on anything unparseable or out of range.
pub fn resolve_week_start_day() -> u32 {
    match env::var("WEEK_START_DAY") {
        Ok(raw) => match raw.parse::<u32>() {
            Ok(day) if day < 7 => day,
            _ => {
                warn!("ignoring invalid WEEK_START_DAY {raw:?}, using Sunday");
                DEFAULT_WEEK_START
            }
        },
        Err(_) => DEFAULT_WEEK_START,
    }
}

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
