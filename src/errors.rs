use thiserror::Error;

/// Errores de configuración (variables de entorno o flags de la CLI).
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Valor inválido para {key}: {value:?} ({reason})")]
    Invalid { key: String, value: String, reason: String },
    #[error("max_length fuera de rango [{min}, {max}]: {value}")]
    MaxLengthOutOfRange { value: usize, min: usize, max: usize },
    #[error("temperature fuera de rango (0, 1]: {0}")]
    TemperatureOutOfRange(f32),
}
