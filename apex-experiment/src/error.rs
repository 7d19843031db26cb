use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Fatal setup problem; block setup halts and the operator sees this.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Rejection-resampling retry cap exceeded.
    #[error("sampling exhausted after {attempts} attempts")]
    SamplingExhausted { attempts: u32 },
}
