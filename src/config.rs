use anyhow::Context;

// ============================================================================
// Repository Configuration
// ============================================================================
//
// Page sizes bound how many events move per store round trip:
// - read_page_size:  events fetched per forward read during replay
// - write_page_size: pending events at or above this count switch the save
//                    path from a single append to a paged transaction
//
// ============================================================================

pub const DEFAULT_READ_PAGE_SIZE: u64 = 500;
pub const DEFAULT_WRITE_PAGE_SIZE: u64 = 500;

/// Largest page the store accepts in one read or write.
pub const MAX_PAGE_SIZE: u64 = 4096;

pub const READ_PAGE_SIZE_ENV: &str = "REPOSITORY_READ_PAGE_SIZE";
pub const WRITE_PAGE_SIZE_ENV: &str = "REPOSITORY_WRITE_PAGE_SIZE";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be greater than zero")]
    ZeroPageSize { name: &'static str },

    #[error("{name} must be at most {max}, got {size}")]
    PageSizeTooLarge {
        name: &'static str,
        size: u64,
        max: u64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Events requested per forward read
    pub read_page_size: u64,
    /// Events per transaction page, and the single-append threshold
    pub write_page_size: u64,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            read_page_size: DEFAULT_READ_PAGE_SIZE,
            write_page_size: DEFAULT_WRITE_PAGE_SIZE,
        }
    }
}

impl RepositoryConfig {
    /// Small pages, for latency-sensitive callers with short streams
    pub fn low_latency() -> Self {
        Self {
            read_page_size: 100,
            write_page_size: 100,
        }
    }

    /// Largest pages the store accepts, for imports and long replays
    pub fn bulk() -> Self {
        Self {
            read_page_size: MAX_PAGE_SIZE,
            write_page_size: MAX_PAGE_SIZE,
        }
    }

    pub fn with_read_page_size(mut self, size: u64) -> Self {
        self.read_page_size = size;
        self
    }

    pub fn with_write_page_size(mut self, size: u64) -> Self {
        self.write_page_size = size;
        self
    }

    /// Both page sizes must lie in `1..=MAX_PAGE_SIZE`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, size) in [
            ("read_page_size", self.read_page_size),
            ("write_page_size", self.write_page_size),
        ] {
            if size == 0 {
                return Err(ConfigError::ZeroPageSize { name });
            }
            if size > MAX_PAGE_SIZE {
                return Err(ConfigError::PageSizeTooLarge {
                    name,
                    size,
                    max: MAX_PAGE_SIZE,
                });
            }
        }
        Ok(())
    }

    /// Defaults overridden by `REPOSITORY_READ_PAGE_SIZE` / `REPOSITORY_WRITE_PAGE_SIZE`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(READ_PAGE_SIZE_ENV) {
            config.read_page_size = parse_page_size(READ_PAGE_SIZE_ENV, &raw)?;
        }
        if let Some(raw) = lookup(WRITE_PAGE_SIZE_ENV) {
            config.write_page_size = parse_page_size(WRITE_PAGE_SIZE_ENV, &raw)?;
        }

        config.validate().context("invalid repository configuration")?;

        tracing::debug!(
            read_page_size = config.read_page_size,
            write_page_size = config.write_page_size,
            "Loaded repository configuration"
        );
        Ok(config)
    }
}

fn parse_page_size(key: &str, raw: &str) -> anyhow::Result<u64> {
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("{key} must be a positive integer, got `{raw}`"))
}
