use crate::config::ProviderConfig;
use clap::ValueEnum;

/// 既定で用意しているプロバイダ
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AiProvider {
    Xai,
    #[value(name = "openai")]
    OpenAi,
}

impl AiProvider {
    pub fn display_name(&self) -> &'static str {
        match self {
            AiProvider::Xai => "xAI",
            AiProvider::OpenAi => "OpenAI",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            AiProvider::Xai => "https://api.x.ai/v1/chat/completions",
            AiProvider::OpenAi => "https://api.openai.com/v1/chat/completions",
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            AiProvider::Xai => "grok-1",
            AiProvider::OpenAi => "gpt-4o",
        }
    }

    /// APIキーを読む環境変数名
    pub fn api_key_env(&self) -> &'static str {
        match self {
            AiProvider::Xai => "XAI_API_KEY",
            AiProvider::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn user_agent(&self) -> Option<&'static str> {
        match self {
            AiProvider::Xai => Some("xAI-Client/1.0"),
            AiProvider::OpenAi => None,
        }
    }

    pub fn default_config(&self) -> ProviderConfig {
        ProviderConfig {
            name: self.display_name().into(),
            endpoint: self.endpoint().into(),
            model: self.model().into(),
            api_key_env: self.api_key_env().into(),
            user_agent: self.user_agent().map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_provider_values() {
        let config = AiProvider::Xai.default_config();
        assert_eq!(config.name, "xAI");
        assert_eq!(config.api_key_env, "XAI_API_KEY");
        assert_eq!(config.user_agent.as_deref(), Some("xAI-Client/1.0"));

        let config = AiProvider::OpenAi.default_config();
        assert_eq!(config.model, "gpt-4o");
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_value_enum_names() {
        assert_eq!(AiProvider::from_str("xai", true), Ok(AiProvider::Xai));
        assert_eq!(AiProvider::from_str("openai", true), Ok(AiProvider::OpenAi));
    }
}
