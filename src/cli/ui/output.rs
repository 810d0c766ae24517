use console::style;

use crate::types::Degradation;

/// Styled terminal output for CLI commands
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn header(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold().underlined());
        }
    }

    /// Aligned `label: value` line
    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        if !self.quiet {
            println!("  {:<12} {}", style(format!("{}:", label)).dim(), value);
        }
    }

    pub fn degradation(&self, degradation: &Degradation) {
        self.warning(&format!(
            "[{}] {} ({}): {}",
            degradation.stage, degradation.subject, degradation.kind, degradation.detail
        ));
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new(false)
    }
}
