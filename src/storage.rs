use crate::errors::Error;
use crate::models::AppData;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, warn};

/// A missing file is an empty document. An unreadable or unparsable one is
/// an error so it never gets overwritten by an empty save.
pub async fn load_data(path: &Path) -> Result<AppData, Error> {
    let mut data: AppData = match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
            error!("failed to parse data file {}: {err}", path.display());
            Error::StorageUnavailable(format!("{}: {err}", path.display()))
        })?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("no data file at {}, starting empty", path.display());
            AppData::default()
        }
        Err(err) => {
            error!("failed to read data file {}: {err}", path.display());
            return Err(Error::StorageUnavailable(err.to_string()));
        }
    };

    if data.migrate() {
        persist_data(path, &data).await?;
    }
    info!(
        doctors = data.doctors.len(),
        staff = data.staff.len(),
        "loaded data from {}",
        path.display()
    );
    Ok(data)
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), Error> {
    let payload = serde_json::to_vec_pretty(data)
        .map_err(|err| Error::StorageUnavailable(err.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    let write = async {
        fs::write(&tmp, payload).await?;
        fs::rename(&tmp, path).await
    };
    write.await.map_err(|err| {
        error!("failed to persist data to {}: {err}", path.display());
        Error::StorageUnavailable(err.to_string())
    })
}
