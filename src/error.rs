#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("scene configuration: {0}")]
    Configuration(String),
    #[error("step index {requested} is outside 0..{step_count}")]
    InvalidIndex { requested: isize, step_count: usize },
    #[error("failed to read glTF: {0}")]
    Import(#[from] gltf::Error),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
