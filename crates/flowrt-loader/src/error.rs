use flowrt_registry::RegistryError;
use flowrt_runtime::WireError;

#[derive(thiserror::Error, Debug)]
pub enum LoaderError {
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("unsupported macro {0:?}")]
    UnsupportedMacro(String),
    #[error("instance {instance:?} uses unknown node type {node_type:?}")]
    UnknownNodeType { instance: String, node_type: String },
    #[error("recursion depth exceeded while instantiating nested graphs (limit {0})")]
    DepthExceeded(usize),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Wiring(#[from] WireError),
}

impl From<serde_yaml::Error> for LoaderError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::InvalidDocument(e.to_string())
    }
}

impl From<serde_json::Error> for LoaderError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidDocument(e.to_string())
    }
}
