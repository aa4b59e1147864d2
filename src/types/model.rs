use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Represents an OpenAI chat model identifier.
///
/// This can be a predefined model or a custom string value for models that
/// were released after this list was written, fine-tunes, or private
/// deployments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Model {
    /// Known model identifiers.
    Known(KnownModel),

    /// Custom model identifier.
    Custom(String),
}

/// Known OpenAI chat models.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum KnownModel {
    /// GPT-4.5 preview (the default).
    Gpt45Preview,

    /// GPT-4.1
    Gpt41,

    /// GPT-4.1 mini
    Gpt41Mini,

    /// GPT-4o
    Gpt4o,

    /// GPT-4o mini
    Gpt4oMini,

    /// GPT-4 Turbo
    Gpt4Turbo,

    /// GPT-4
    Gpt4,

    /// GPT-3.5 Turbo
    Gpt35Turbo,
}

impl KnownModel {
    /// All known models; `FromStr` matches model names against this list.
    pub const ALL: [KnownModel; 8] = [
        KnownModel::Gpt45Preview,
        KnownModel::Gpt41,
        KnownModel::Gpt41Mini,
        KnownModel::Gpt4o,
        KnownModel::Gpt4oMini,
        KnownModel::Gpt4Turbo,
        KnownModel::Gpt4,
        KnownModel::Gpt35Turbo,
    ];

    /// The identifier the API expects.
    pub fn as_str(self) -> &'static str {
        match self {
            KnownModel::Gpt45Preview => "gpt-4.5-preview",
            KnownModel::Gpt41 => "gpt-4.1",
            KnownModel::Gpt41Mini => "gpt-4.1-mini",
            KnownModel::Gpt4o => "gpt-4o",
            KnownModel::Gpt4oMini => "gpt-4o-mini",
            KnownModel::Gpt4Turbo => "gpt-4-turbo",
            KnownModel::Gpt4 => "gpt-4",
            KnownModel::Gpt35Turbo => "gpt-3.5-turbo",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{}", known_model),
            Model::Custom(custom) => write!(f, "{}", custom),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KnownModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownModel::ALL
            .iter()
            .copied()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| format!("unknown model: {s}"))
    }
}

impl FromStr for Model {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<KnownModel>() {
            Ok(known) => Model::Known(known),
            Err(_) => Model::Custom(s.to_string()),
        })
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Known(KnownModel::Gpt45Preview)
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        match model.parse::<KnownModel>() {
            Ok(known) => Model::Known(known),
            Err(_) => Model::Custom(model),
        }
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Model::from(model.to_string())
    }
}

impl From<Model> for String {
    fn from(model: Model) -> Self {
        match model {
            Model::Known(known) => known.as_str().to_string(),
            Model::Custom(custom) => custom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_gpt_45_preview() {
        assert_eq!(Model::default(), Model::Known(KnownModel::Gpt45Preview));
        assert_eq!(Model::default().to_string(), "gpt-4.5-preview");
    }

    #[test]
    fn known_model_serialization() {
        let model = Model::Known(KnownModel::Gpt4oMini);
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""gpt-4o-mini""#);
    }

    #[test]
    fn custom_model_serialization() {
        let model = Model::Custom("ft:gpt-4o:acme:support:abc123".to_string());
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""ft:gpt-4o:acme:support:abc123""#);
    }

    #[test]
    fn deserialization_prefers_known_models() {
        let model: Model = serde_json::from_str(r#""gpt-4""#).unwrap();
        assert_eq!(model, Model::Known(KnownModel::Gpt4));

        let model: Model = serde_json::from_str(r#""gpt-9-experimental""#).unwrap();
        assert_eq!(model, Model::Custom("gpt-9-experimental".to_string()));
    }

    #[test]
    fn parse_never_fails() {
        let model: Model = "gpt-4.1".parse().unwrap();
        assert_eq!(model, Model::Known(KnownModel::Gpt41));
        let model: Model = "my-deployment".parse().unwrap();
        assert_eq!(model, Model::Custom("my-deployment".to_string()));
    }

    #[test]
    fn known_model_names_round_trip_through_display() {
        for model in KnownModel::ALL {
            assert_eq!(model.to_string().parse::<KnownModel>(), Ok(model));
        }
        assert!("claude-3-opus".parse::<KnownModel>().is_err());
    }
}
