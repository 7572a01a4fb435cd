use crate::embed::EmbedParameters;
use crate::uff::UffConfig;

/// Settings for every stage of [`forge`](super::forge).
#[derive(Debug, Clone, Default)]
pub struct ForgeConfig {
    pub embed: EmbedParameters,
    pub uff: UffConfig,
}

impl ForgeConfig {
    /// Default settings with a fixed embedding seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            embed: EmbedParameters::etkdg().with_seed(seed),
            ..Self::default()
        }
    }
}
