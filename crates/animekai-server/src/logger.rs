use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, or `info` with quiet http internals, plus the
/// configured `directives`.
pub fn env_filter(directives: &[String]) -> anyhow::Result<EnvFilter> {
    let mut env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn,h2=warn"));

    for directive in directives {
        let directive = directive
            .parse()
            .with_context(|| format!("invalid logging directive \"{directive}\""))?;
        env_filter = env_filter.add_directive(directive);
    }

    Ok(env_filter)
}

pub fn init(directives: &[String]) -> anyhow::Result<()> {
    let env_filter = env_filter(directives)?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .try_init()
        .ok()
        .context("failed to install logger")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_directives() {
        assert!(env_filter(&[]).is_ok());
        assert!(env_filter(&["animekai_core=debug".to_string(), "tower_http=trace".to_string()]).is_ok());
        assert!(env_filter(&["animekai_core=loud".to_string()]).is_err());
    }
}
