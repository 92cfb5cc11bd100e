//! Configuration validation functions.

use super::Config;

/// Validate configuration security and warn about weak settings.
pub fn validate_config_security(config: &Config) -> anyhow::Result<()> {
    let is_prod = is_production_mode();

    // Token verification secret
    let secret_present = config
        .security
        .jwt_secret
        .as_ref()
        .map(|s| !s.is_empty())
        .unwrap_or(false);

    if !secret_present {
        if is_prod {
            anyhow::bail!(
                "\nCRITICAL: No JWT secret is configured in production!\n\
                 ===================================================================\n\
                 Every WebSocket upgrade will be rejected without one. Configure:\n\
                 export PULSE_HUB__SECURITY__JWT_SECRET=\"$(openssl rand -hex 32)\"\n\
                 ===================================================================\n"
            );
        }
        eprintln!(
            "WARNING: No JWT secret configured; all WebSocket upgrade attempts will be rejected"
        );
    } else if let Some(secret) = &config.security.jwt_secret {
        if secret.len() < 32 {
            eprintln!(
                "\nWARNING: JWT secret is very short ({} chars).\n\
                 Recommended: At least 32 characters.\n\
                 Generate a strong secret: openssl rand -hex 32\n",
                secret.len()
            );
        }
    }

    // Metrics authentication
    if config.security.require_metrics_auth {
        let token_present = config
            .security
            .metrics_auth_token
            .as_ref()
            .map(|t| !t.is_empty())
            .unwrap_or(false);

        if !token_present {
            anyhow::bail!(
                "\nCRITICAL: Metrics authentication is enabled but no credentials are configured!\n\
                 ===================================================================\n\
                 Configure a shared bearer token:\n\
                 export PULSE_HUB__SECURITY__METRICS_AUTH_TOKEN=\"$(openssl rand -hex 32)\"\n\
                 \n\
                 To disable metrics auth (NOT recommended), set:\n\
                 export PULSE_HUB__SECURITY__REQUIRE_METRICS_AUTH=false\n\
                 ===================================================================\n"
            );
        }
    } else if is_prod {
        eprintln!(
            "SECURITY WARNING: /metrics is publicly accessible in production. \
             Set PULSE_HUB__SECURITY__REQUIRE_METRICS_AUTH=true to protect it."
        );
    }

    if config.server.heartbeat_interval_secs == 0 {
        anyhow::bail!("server.heartbeat_interval_secs must be at least 1 second");
    }

    config.websocket.validate()?;

    Ok(())
}

/// Detect if we're running in production mode.
///
/// Checks for `PULSE_HUB__ENVIRONMENT` or generic `PRODUCTION` / `PROD`
/// environment variables.
pub fn is_production_mode() -> bool {
    use std::env;

    if let Ok(mode) = env::var("PULSE_HUB__ENVIRONMENT") {
        return mode.to_lowercase() == "production" || mode.to_lowercase() == "prod";
    }

    env::var("PULSE_HUB_PRODUCTION").is_ok()
        || env::var("PRODUCTION").is_ok()
        || env::var("PROD").is_ok()
}
