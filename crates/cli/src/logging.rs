use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Crate targets that a plain level such as `debug` applies to.
const TARGETS: [&str; 2] = ["dtoforge", "dtoforge_core"];

pub fn init_tracing() {
    let filter = filter_spec(std::env::var("DTOFORGE_LOG").ok().as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

/// DTOFORGE_LOG is either a plain level ("trace", "debug", "info", "warn",
/// "error") or a full filter spec like "dtoforge_core=debug".
fn filter_spec(env: Option<&str>) -> String {
    match env {
        Some(level) if is_plain_level(level) => scoped(level),
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => scoped("info"),
    }
}

fn scoped(level: &str) -> String {
    TARGETS
        .iter()
        .map(|target| format!("{target}={}", level.to_ascii_lowercase()))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_spec() {
        assert_eq!(filter_spec(None), "dtoforge=info,dtoforge_core=info");
        assert_eq!(filter_spec(Some("DEBUG")), "dtoforge=debug,dtoforge_core=debug");
        assert_eq!(filter_spec(Some("dtoforge_core=trace")), "dtoforge_core=trace");
        assert_eq!(filter_spec(Some("  ")), "dtoforge=info,dtoforge_core=info");
    }
}
