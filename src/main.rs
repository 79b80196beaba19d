use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use tasklist::app::App;
use tasklist::config::Config;
use tasklist::storage::{FileStore, KeyValueStore, MemoryStore};
use tasklist::{logging, ui};

fn main() -> Result<()> {
    let config = Config::parse();
    logging::init(&config.log_dir(), config.verbose);

    // In-memory runs share one store so tasks survive going back to the
    // landing screen.
    let data_dir = config.data_dir();
    tracing::info!(data_dir = %data_dir.display(), in_memory = config.in_memory, "starting");
    let in_memory = config.in_memory;
    let memory = Rc::new(RefCell::new(MemoryStore::new()));
    let open_store = move || -> Box<dyn KeyValueStore> {
        if in_memory {
            Box::new(memory.clone())
        } else {
            Box::new(FileStore::new(data_dir.clone()))
        }
    };
    let mut app = App::new(open_store, config.storage_key.clone());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "terminal loop failed");
    }
    tracing::info!("exiting");
    Ok(result?)
}
