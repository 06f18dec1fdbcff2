//! Interactive TUI dashboard for browsing and editing contacts.

pub mod app;
mod ui;

use std::io;

use anyhow::Result;
use contacts_core::api::ContactApi;
use contacts_core::manager::ContactManager;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use app::{App, Mode};

/// Launch the interactive TUI dashboard over an already loaded manager.
pub async fn run_dashboard<A: ContactApi>(manager: ContactManager<A>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(manager);
    let result = run_event_loop(&mut terminal, &mut app).await;

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop<A: ContactApi>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<A>,
) -> Result<()> {
    let tick_rate = app.tick_rate;

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Requests are awaited inline, so a second submit cannot start
        // before the first one has been answered.
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key).await;
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Apply one keypress to the dashboard.
pub async fn handle_key<A: ContactApi>(app: &mut App<A>, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.awaiting_confirmation() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete().await,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.dismiss_delete(),
            _ => {}
        }
        return;
    }

    if app.showing_form() {
        match key.code {
            KeyCode::Esc => app.cancel(),
            KeyCode::Enter => app.submit().await,
            KeyCode::Tab | KeyCode::Down => app.focus_next(),
            KeyCode::BackTab | KeyCode::Up => app.focus_prev(),
            KeyCode::Backspace => app.input_backspace(),
            KeyCode::Char(c) => app.input_char(c),
            _ => {}
        }
        return;
    }

    if app.mode == Mode::Search {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => app.finish_search(),
            KeyCode::Backspace => app.search_pop(),
            KeyCode::Char(c) => app.search_push(c),
            _ => {}
        }
        return;
    }

    // Clear status message on any browse keypress.
    app.status_message = None;

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('/') => app.start_search(),
        KeyCode::Char('t') => app.cycle_tag(),
        KeyCode::Char('a') => app.add(),
        KeyCode::Char('e') | KeyCode::Enter => app.edit_selected(),
        KeyCode::Char('d') => app.request_delete_selected(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use contacts_core::contact::ContactId;
    use contacts_core::templates::Templates;
    use contacts_test_utils::{FakeContactApi, contact};

    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn app(api: &FakeContactApi) -> App<FakeContactApi> {
        let manager = ContactManager::load(api.clone(), Templates::builtin().unwrap())
            .await
            .unwrap();
        App::new(manager)
    }

    #[tokio::test]
    async fn q_quits_from_browse() {
        let mut app = app(&FakeContactApi::new()).await;
        handle_key(&mut app, press(KeyCode::Char('q'))).await;
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn ctrl_c_quits_from_form() {
        let mut app = app(&FakeContactApi::new()).await;
        handle_key(&mut app, press(KeyCode::Char('a'))).await;
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)).await;
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn letters_go_to_the_form_not_to_shortcuts() {
        let mut app = app(&FakeContactApi::new()).await;
        handle_key(&mut app, press(KeyCode::Char('a'))).await;
        for c in "qed".chars() {
            handle_key(&mut app, press(KeyCode::Char(c))).await;
        }
        assert!(!app.should_quit);
        assert_eq!(app.page().form.fields[0].value, "qed");
    }

    #[tokio::test]
    async fn slash_starts_search_and_enter_leaves_it() {
        let api = FakeContactApi::with_contacts(vec![contact(1, "Alice", ""), contact(2, "Bob", "")]);
        let mut app = app(&api).await;

        handle_key(&mut app, press(KeyCode::Char('/'))).await;
        handle_key(&mut app, press(KeyCode::Char('a'))).await;
        assert!(!app.showing_form());
        assert_eq!(app.page().rendered_ids(), [ContactId(1)]);

        handle_key(&mut app, press(KeyCode::Enter)).await;
        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.page().search, "a");
    }

    #[tokio::test]
    async fn delete_needs_confirmation() {
        let api = FakeContactApi::with_contacts(vec![contact(1, "Alice", "")]);
        let mut app = app(&api).await;

        handle_key(&mut app, press(KeyCode::Char('d'))).await;
        handle_key(&mut app, press(KeyCode::Char('n'))).await;
        assert_eq!(api.stored().len(), 1);

        handle_key(&mut app, press(KeyCode::Char('d'))).await;
        handle_key(&mut app, press(KeyCode::Char('y'))).await;
        assert!(api.stored().is_empty());
        assert!(app.page().empty_state_visible);
    }

    #[tokio::test]
    async fn esc_in_form_cancels_instead_of_quitting() {
        let api = FakeContactApi::with_contacts(vec![contact(1, "Alice", "")]);
        let mut app = app(&api).await;

        handle_key(&mut app, press(KeyCode::Char('e'))).await;
        assert!(app.showing_form());
        handle_key(&mut app, press(KeyCode::Esc)).await;
        assert!(!app.showing_form());
        assert!(!app.should_quit);
    }
}
