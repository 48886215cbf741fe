use crate::error::AssetError;

/// Fetches encoded icon bytes for a locator (URL or path)
pub trait IconSource: Send + Sync {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>, AssetError>;
}
