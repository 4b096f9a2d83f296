use std::env;

use tracing_subscriber::filter::Directive;

const DEFAULT_DIRECTIVE: &str = "info";

#[derive(Clone, Debug)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

#[derive(Clone, Debug)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    /// Used only when `RUST_LOG` is unset or unparsable.
    pub(crate) default_directive: String,
    /// Collected while parsing so they can be logged once tracing is up.
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        let component = component.trim().to_string();

        let service_name = env_string("SERVICE_NAME")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| component.clone());

        let environment = env_string("STAGE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        let (default_directive, warnings) = default_directive_from_env();

        Self {
            service_context: ServiceContext {
                service_name,
                environment,
                component,
            },
            default_directive,
            warnings,
        }
    }
}

fn default_directive_from_env() -> (String, Vec<String>) {
    let mut warnings = Vec::new();

    let directive = match env_string("LOG_LEVEL").filter(|v| !v.is_empty()) {
        Some(raw) => match raw.parse::<Directive>() {
            Ok(_) => raw,
            Err(err) => {
                warnings.push(format!(
                    "LOG_LEVEL is set but invalid; using `{DEFAULT_DIRECTIVE}` (parse error: {err})"
                ));
                DEFAULT_DIRECTIVE.to_string()
            }
        },
        None => DEFAULT_DIRECTIVE.to_string(),
    };

    (directive, warnings)
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string())
}
