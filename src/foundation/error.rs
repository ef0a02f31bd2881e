pub type FoldercutResult<T> = Result<T, FoldercutError>;

#[derive(thiserror::Error, Debug)]
pub enum FoldercutError {
    #[error("config error: {0}")]
    Config(String),

    #[error("scan error: {0}")]
    Scan(String),

    #[error("timeline error: {0}")]
    Timeline(String),

    #[error("xml error: {0}")]
    Xml(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FoldercutError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn scan(msg: impl Into<String>) -> Self {
        Self::Scan(msg.into())
    }

    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline(msg.into())
    }

    pub fn xml(msg: impl Into<String>) -> Self {
        Self::Xml(msg.into())
    }
}

impl From<quick_xml::Error> for FoldercutError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            FoldercutError::config("x")
                .to_string()
                .contains("config error:")
        );
        assert!(FoldercutError::scan("x").to_string().contains("scan error:"));
        assert!(
            FoldercutError::timeline("x")
                .to_string()
                .contains("timeline error:")
        );
        assert!(FoldercutError::xml("x").to_string().contains("xml error:"));
    }

    #[test]
    fn io_and_anyhow_preserve_source() {
        let err: FoldercutError = std::io::Error::other("boom").into();
        assert!(err.to_string().contains("boom"));

        let err = FoldercutError::Other(anyhow::anyhow!("bang"));
        assert!(err.to_string().contains("bang"));
    }
}
