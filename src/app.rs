use crate::storage::KeyValueStore;
use crate::task::TaskId;
use crate::task_list::TaskList;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
    Searching,
}

/// State of the task list screen while it is mounted.
pub struct ListScreen<S: KeyValueStore> {
    pub tasks: TaskList<S>,
    pub mode: InputMode,
    pub selected: usize,
}

impl<S: KeyValueStore> ListScreen<S> {
    fn mount(store: S, key: &str) -> Self {
        Self {
            tasks: TaskList::load(store, key),
            mode: InputMode::Normal,
            selected: 0,
        }
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.tasks.visible().get(self.selected).map(|t| t.id)
    }

    fn clamp_selection(&mut self) {
        let len = self.tasks.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

pub enum Screen<S: KeyValueStore> {
    Landing,
    TaskList(ListScreen<S>),
}

/// What the event loop should do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Top-level state: which screen is showing, plus what is needed to mount
/// the task list again after navigating back.
pub struct App<S: KeyValueStore, F: FnMut() -> S> {
    pub screen: Screen<S>,
    open_store: F,
    key: String,
}

impl<S: KeyValueStore, F: FnMut() -> S> App<S, F> {
    pub fn new(open_store: F, key: impl Into<String>) -> Self {
        Self {
            screen: Screen::Landing,
            open_store,
            key: key.into(),
        }
    }

    pub fn start(&mut self) {
        let store = (self.open_store)();
        self.screen = Screen::TaskList(ListScreen::mount(store, &self.key));
        info!("task list opened");
    }

    pub fn back(&mut self) {
        self.screen = Screen::Landing;
        info!("returned to landing screen");
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.kind != KeyEventKind::Press {
            return Control::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }
        match &mut self.screen {
            Screen::Landing => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Control::Quit,
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.start();
                    Control::Continue
                }
                _ => Control::Continue,
            },
            Screen::TaskList(list) => {
                let control = match list.mode {
                    InputMode::Normal => normal_key(list, key.code),
                    InputMode::Editing => {
                        editing_key(list, key.code);
                        NormalOutcome::Stay
                    }
                    InputMode::Searching => {
                        search_key(list, key.code);
                        NormalOutcome::Stay
                    }
                };
                list.clamp_selection();
                match control {
                    NormalOutcome::Stay => Control::Continue,
                    NormalOutcome::Back => {
                        self.back();
                        Control::Continue
                    }
                    NormalOutcome::Quit => Control::Quit,
                }
            }
        }
    }
}

enum NormalOutcome {
    Stay,
    Back,
    Quit,
}

fn normal_key<S: KeyValueStore>(list: &mut ListScreen<S>, code: KeyCode) -> NormalOutcome {
    match code {
        KeyCode::Char('q') => return NormalOutcome::Quit,
        KeyCode::Esc => {
            if list.tasks.query().is_empty() {
                return NormalOutcome::Back;
            }
            list.tasks.search("");
        }
        KeyCode::Up | KeyCode::Char('k') => {
            list.selected = list.selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            list.selected += 1;
        }
        KeyCode::Char('a') | KeyCode::Char('i') => {
            list.mode = InputMode::Editing;
        }
        KeyCode::Char('/') => {
            list.mode = InputMode::Searching;
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some(id) = list.selected_id() {
                list.tasks.toggle_done(id);
            }
        }
        KeyCode::Char('e') => {
            if let Some(id) = list.selected_id() {
                if list.tasks.begin_edit(id) {
                    list.mode = InputMode::Editing;
                }
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(id) = list.selected_id() {
                list.tasks.delete(id);
            }
        }
        _ => {}
    }
    NormalOutcome::Stay
}

fn editing_key<S: KeyValueStore>(list: &mut ListScreen<S>, code: KeyCode) {
    match code {
        KeyCode::Enter => {
            let was_editing = list.tasks.editing().is_some();
            if list.tasks.submit() {
                if !was_editing {
                    list.selected = 0;
                }
                list.mode = InputMode::Normal;
            }
        }
        KeyCode::Esc => {
            // Escape on a fresh task keeps the draft; it is only discarded
            // when an existing task was being edited.
            if list.tasks.editing().is_some() {
                list.tasks.cancel_edit();
            }
            list.mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            list.tasks.input_mut().pop();
        }
        KeyCode::Char(c) => list.tasks.input_mut().push(c),
        _ => {}
    }
}

fn search_key<S: KeyValueStore>(list: &mut ListScreen<S>, code: KeyCode) {
    let mut query = list.tasks.query().to_string();
    match code {
        KeyCode::Enter => {
            list.mode = InputMode::Normal;
            return;
        }
        KeyCode::Esc => {
            query.clear();
            list.mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            query.pop();
        }
        KeyCode::Char(c) => query.push(c),
        _ => return,
    }
    debug!(query = %query, "search updated");
    list.tasks.search(&query);
    list.selected = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::task_list::DEFAULT_STORAGE_KEY;
    use std::cell::RefCell;
    use std::rc::Rc;

    type SharedStore = Rc<RefCell<MemoryStore>>;

    fn test_app() -> App<SharedStore, impl FnMut() -> SharedStore> {
        // Every mount reopens the same storage, like the device's store.
        let shared = SharedStore::default();
        App::new(move || shared.clone(), DEFAULT_STORAGE_KEY)
    }

    fn press<S: KeyValueStore, F: FnMut() -> S>(app: &mut App<S, F>, code: KeyCode) -> Control {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str<S: KeyValueStore, F: FnMut() -> S>(app: &mut App<S, F>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn list<S: KeyValueStore, F: FnMut() -> S>(app: &App<S, F>) -> &ListScreen<S> {
        match &app.screen {
            Screen::TaskList(list) => list,
            Screen::Landing => panic!("task list is not mounted"),
        }
    }

    fn titles<S: KeyValueStore, F: FnMut() -> S>(app: &App<S, F>) -> Vec<String> {
        list(app)
            .tasks
            .visible()
            .iter()
            .map(|t| t.title.clone())
            .collect()
    }

    fn add_task<S: KeyValueStore, F: FnMut() -> S>(app: &mut App<S, F>, title: &str) {
        press(app, KeyCode::Char('a'));
        type_str(app, title);
        press(app, KeyCode::Enter);
    }

    #[test]
    fn landing_starts_task_list_and_quits() {
        let mut app = test_app();
        assert!(matches!(app.screen, Screen::Landing));
        assert_eq!(press(&mut app, KeyCode::Enter), Control::Continue);
        assert!(matches!(app.screen, Screen::TaskList(_)));

        let mut app = test_app();
        assert_eq!(press(&mut app, KeyCode::Char('q')), Control::Quit);
    }

    #[test]
    fn adding_through_the_input_field() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        add_task(&mut app, "Buy milk");
        add_task(&mut app, "Walk dog");

        assert_eq!(titles(&app), vec!["Walk dog", "Buy milk"]);
        assert_eq!(list(&app).mode, InputMode::Normal);
        assert_eq!(list(&app).tasks.input(), "");
    }

    #[test]
    fn blank_submit_stays_in_editing_mode() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "  ");
        press(&mut app, KeyCode::Enter);
        assert_eq!(list(&app).mode, InputMode::Editing);
        assert!(list(&app).tasks.tasks().is_empty());
    }

    #[test]
    fn edit_selected_task() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        add_task(&mut app, "Buy milk");
        add_task(&mut app, "Walk dog");

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(list(&app).mode, InputMode::Editing);
        assert_eq!(list(&app).tasks.input(), "Buy milk");

        for _ in 0.."milk".len() {
            press(&mut app, KeyCode::Backspace);
        }
        type_str(&mut app, "bread");
        press(&mut app, KeyCode::Enter);

        assert_eq!(titles(&app), vec!["Walk dog", "Buy bread"]);
        assert_eq!(list(&app).tasks.editing(), None);
    }

    #[test]
    fn escape_cancels_edit() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        add_task(&mut app, "Buy milk");
        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, "!!!");
        press(&mut app, KeyCode::Esc);

        assert_eq!(titles(&app), vec!["Buy milk"]);
        assert_eq!(list(&app).tasks.input(), "");
        assert_eq!(list(&app).mode, InputMode::Normal);
    }

    #[test]
    fn toggle_and_delete_selected() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        add_task(&mut app, "Buy milk");
        add_task(&mut app, "Walk dog");

        press(&mut app, KeyCode::Char(' '));
        assert!(list(&app).tasks.visible()[0].is_done);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(titles(&app), vec!["Walk dog"]);
        assert_eq!(list(&app).selected, 0);
    }

    #[test]
    fn search_mode_filters_on_each_keystroke() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        add_task(&mut app, "Buy milk");
        add_task(&mut app, "Walk dog");

        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "MIL");
        assert_eq!(titles(&app), vec!["Buy milk"]);

        press(&mut app, KeyCode::Enter);
        assert_eq!(list(&app).mode, InputMode::Normal);
        assert_eq!(titles(&app), vec!["Buy milk"]);

        // First escape clears the filter, the second leaves the screen.
        press(&mut app, KeyCode::Esc);
        assert_eq!(titles(&app), vec!["Walk dog", "Buy milk"]);
        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.screen, Screen::Landing));
    }

    #[test]
    fn back_and_start_reloads_from_storage() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        add_task(&mut app, "Buy milk");
        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.screen, Screen::Landing));

        press(&mut app, KeyCode::Enter);
        assert_eq!(titles(&app), vec!["Buy milk"]);
    }

    #[test]
    fn actions_on_empty_list_do_nothing() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(list(&app).mode, InputMode::Normal);
        assert_eq!(list(&app).selected, 0);
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('a'));
        let quit = app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(quit, Control::Quit);
    }
}
