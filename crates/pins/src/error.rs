use postscriptum_shared::{ConfigError, UnknownPinType};

#[derive(Debug, thiserror::Error)]
pub enum PinError {
    #[error(transparent)]
    UnknownPinType(#[from] UnknownPinType),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
