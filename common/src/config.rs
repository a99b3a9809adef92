//! Output configuration shared by the tools

/// Output and logging configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Suppress per-file action reports
    pub quiet: bool,
    /// Verbosity level: 0=WARN, 1=INFO, 2=DEBUG, 3=TRACE
    pub verbose: u8,
    /// Print summary statistics at the end
    pub print_summary: bool,
}

impl OutputConfig {
    pub fn log_level(&self) -> tracing::level_filters::LevelFilter {
        use tracing::level_filters::LevelFilter;
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Summary is printed when asked for or implied by -v
    pub fn show_summary(&self) -> bool {
        self.print_summary || self.verbose > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_verbosity_levels() {
        let mut output = OutputConfig::default();
        assert_eq!(output.log_level(), LevelFilter::WARN);
        assert!(!output.show_summary());
        output.verbose = 2;
        assert_eq!(output.log_level(), LevelFilter::DEBUG);
        assert!(output.show_summary());
        output.verbose = 7;
        assert_eq!(output.log_level(), LevelFilter::TRACE);
    }
}
