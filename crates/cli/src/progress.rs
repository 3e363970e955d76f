use indicatif::{ProgressBar, ProgressStyle};

/// Detect if we're running in a CI environment
fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS", "JENKINS_URL"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// Create a spinner with a message
///
/// Returns a hidden spinner in CI environments.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = if is_ci() {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };

    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// A spinner only when progress output is wanted
pub fn maybe_spinner(show: bool, message: &str) -> Option<ProgressBar> {
    show.then(|| spinner(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ci_detects_ci_env() {
        let ci_orig = std::env::var("CI").ok();

        std::env::set_var("CI", "true");
        assert!(is_ci());

        if let Some(val) = ci_orig {
            std::env::set_var("CI", val);
        } else {
            std::env::remove_var("CI");
        }
    }

    #[test]
    fn test_maybe_spinner() {
        assert!(maybe_spinner(false, "Linting...").is_none());
        let pb = maybe_spinner(true, "Linting...").unwrap();
        assert_eq!(pb.message(), "Linting...");
        pb.finish_and_clear();
    }
}
