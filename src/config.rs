use crate::task_list::DEFAULT_STORAGE_KEY;
use clap::Parser;
use std::path::PathBuf;

/// Terminal task list with on-device storage.
#[derive(Debug, Clone, Parser)]
#[command(name = "tasklist", version, about)]
pub struct Config {
    /// Directory holding the stored task list
    #[arg(long, env = "TASKLIST_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Key the task list is stored under
    #[arg(long, default_value = DEFAULT_STORAGE_KEY)]
    pub storage_key: String,

    /// Directory for log files
    #[arg(long, env = "TASKLIST_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Keep tasks in memory only; nothing is written to disk
    #[arg(long)]
    pub in_memory: bool,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_dir)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| self.data_dir().join("logs"))
    }
}

fn default_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tasklist")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["tasklist"]).unwrap();
        assert_eq!(config.storage_key, "my-todo");
        assert!(!config.in_memory);
        assert!(!config.verbose);
        assert!(config.data_dir().ends_with("tasklist"));
    }

    #[test]
    fn explicit_paths_win() {
        let config = Config::try_parse_from([
            "tasklist",
            "--data-dir",
            "/tmp/tasks",
            "--storage-key",
            "work",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/tasks"));
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/tasks/logs"));
        assert_eq!(config.storage_key, "work");
        assert!(config.verbose);
    }
}
