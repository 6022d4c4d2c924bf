use derive_more::From;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, From)]
pub enum Error {
    #[from]
    Kube(kube::Error),

    #[from]
    Infer(kube::config::InferConfigError),

    /// Custom error message
    Custom(String),
}

impl Error {
    /// Build an ad-hoc error from anything printable
    #[must_use]
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        match self {
            Self::Custom(message) => write!(fmt, "{message}"),
            Self::Kube(e) => write!(fmt, "kubernetes api: {e}"),
            other => write!(fmt, "{other:?}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Kube(e) => Some(e),
            Self::Infer(e) => Some(e),
            Self::Custom(_) => None,
        }
    }
}
