use clap::{CommandFactory, Parser};

#[derive(Debug, Parser)]
#[command(name = "beyond_the_arc_cli", version, about = "Beyond the Arc dataset summary and SVG snapshots")]
pub struct CliArgs {
    /// Directory holding the seven dataset files
    #[arg(long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<String>,

    /// Where SVG snapshots are written
    #[arg(long = "out-dir", value_name = "PATH")]
    pub out_dir: Option<String>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Write an SVG snapshot of every chart
    #[arg(long)]
    pub render: bool,

    /// Chart width used for snapshots
    #[arg(long, value_name = "N")]
    pub width: Option<u32>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(dir) = &self.data_dir {
            std::env::set_var("DATA_DIR", dir);
        }
        if let Some(dir) = &self.out_dir {
            std::env::set_var("OUTPUT_DIR", dir);
        }
        if let Some(width) = self.width {
            std::env::set_var("CHART_WIDTH", width.to_string());
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }

    pub fn help_text() -> String {
        let mut command = Self::command();
        let mut buffer = Vec::new();
        command.write_help(&mut buffer).ok();
        String::from_utf8_lossy(&buffer).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let args = CliArgs::parse_from([
            "beyond_the_arc_cli",
            "--data-dir",
            "site/data",
            "--out-dir",
            "snapshots",
            "--json",
            "--render",
            "--width",
            "960",
        ]);
        assert_eq!(args.data_dir.as_deref(), Some("site/data"));
        assert_eq!(args.out_dir.as_deref(), Some("snapshots"));
        assert!(args.json && args.render && !args.debug);
        assert_eq!(args.width, Some(960));
    }

    #[test]
    fn help_lists_render_flag() {
        assert!(CliArgs::help_text().contains("--render"));
    }
}
