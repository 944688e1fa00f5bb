use crate::errors::Result;
use crate::models::AppData;
use crate::storage::persist_data;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub async fn read<T>(&self, f: impl FnOnce(&AppData) -> T) -> T {
        let data = self.data.lock().await;
        f(&data)
    }

    /// Apply `f` to a copy of the document and keep it only once it is on
    /// disk. Writers are serialized by the lock.
    pub async fn write<T>(&self, f: impl FnOnce(&mut AppData) -> Result<T>) -> Result<T> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        let output = f(&mut next)?;
        persist_data(&self.data_path, &next).await?;
        *data = next;
        Ok(output)
    }
}
