//! Task display formatting module
//!
//! Handles colored output for the list view, in a light and a dark
//! palette, plus the presenter the interactive shell subscribes to the
//! store.

use colored::*;

use ticklist_core::{FilterMode, StoreObserver, StoreView, Theme, VisibleTask};

/// Check if terminal supports colors
pub fn supports_color() -> bool {
    atty::is(atty::Stream::Stdout)
}

/// Palette selection for one render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub theme: Theme,
    pub use_color: bool,
}

impl Style {
    pub fn new(theme: Theme, use_color: bool) -> Self {
        Self { theme, use_color }
    }

    /// Uncolored light output
    #[cfg(test)]
    pub fn plain() -> Self {
        Self::new(Theme::Light, false)
    }

    fn accent(&self, s: &str) -> String {
        match (self.use_color, self.theme) {
            (false, _) => s.to_string(),
            (true, Theme::Light) => s.blue().to_string(),
            (true, Theme::Dark) => s.bright_cyan().to_string(),
        }
    }

    fn done(&self, s: &str) -> String {
        match (self.use_color, self.theme) {
            (false, _) => s.to_string(),
            (true, Theme::Light) => s.green().strikethrough().to_string(),
            (true, Theme::Dark) => s.bright_green().strikethrough().to_string(),
        }
    }

    fn muted(&self, s: &str) -> String {
        match (self.use_color, self.theme) {
            (false, _) => s.to_string(),
            (true, Theme::Light) => s.dimmed().to_string(),
            (true, Theme::Dark) => s.bright_black().to_string(),
        }
    }

    fn highlight(&self, s: &str) -> String {
        match (self.use_color, self.theme) {
            (false, _) => s.to_string(),
            (true, Theme::Light) => s.bold().to_string(),
            (true, Theme::Dark) => s.bold().bright_white().to_string(),
        }
    }
}

/// Format one row of the filtered view
///
/// `draft` replaces the task text while an edit session is open on it.
pub fn format_task(row: &VisibleTask, draft: Option<&str>, style: Style) -> String {
    let checkbox = if row.task.completed { "[✓]" } else { "[ ]" };
    let position = style.accent(&format!("{:>2}.", row.index + 1));

    let body = match draft {
        Some(draft) if row.editing => {
            format!("✎ {} {}", style.highlight(draft), style.muted("(editing)"))
        }
        _ if row.task.completed => style.done(&row.task.text),
        _ => row.task.text.clone(),
    };

    if row.removing {
        format!(
            "{} {} {} {}",
            checkbox,
            position,
            style.muted(&row.task.text),
            style.muted("(removing)")
        )
    } else {
        format!("{} {} {}", checkbox, position, body)
    }
}

/// Format the filter selector, bracketing the active mode
pub fn format_filter_bar(current: FilterMode, style: Style) -> String {
    let modes = [FilterMode::All, FilterMode::Active, FilterMode::Completed];
    let parts: Vec<String> = modes
        .iter()
        .map(|mode| {
            if *mode == current {
                style.highlight(&format!("[{}]", mode))
            } else {
                style.muted(mode.as_str())
            }
        })
        .collect();

    format!("Filter: {}", parts.join(" "))
}

/// Format the remaining-count line
pub fn format_summary(remaining: usize) -> String {
    let noun = if remaining == 1 { "task" } else { "tasks" };
    format!("{} {} remaining", remaining, noun)
}

/// Render a whole list view
pub fn render(view: &StoreView, style: Style) -> String {
    let icon = if view.theme.is_dark() { "☾" } else { "☀" };
    let mut lines = vec![
        format!("{} {}", icon, style.highlight("To-Do List")),
        format_filter_bar(view.filter, style),
        String::new(),
    ];

    if view.is_empty() {
        lines.push(style.muted("No tasks found"));
    } else {
        let draft = view.edit.as_ref().map(|session| session.draft.as_str());
        lines.extend(view.tasks.iter().map(|row| format_task(row, draft, style)));
    }

    lines.push(String::new());
    if !view.input.is_empty() {
        lines.push(format!("New task: {}", view.input));
    }
    lines.push(format_summary(view.remaining));

    lines.join("\n")
}

/// Redraws the list whenever the store changes
pub struct TerminalPresenter {
    use_color: bool,
}

impl TerminalPresenter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// The text drawn for one state change, in the view's own theme
    fn frame(&self, view: &StoreView) -> String {
        render(view, Style::new(view.theme, self.use_color))
    }
}

impl StoreObserver for TerminalPresenter {
    fn state_changed(&mut self, view: &StoreView) {
        println!("\n{}", self.frame(view));
    }

    fn theme_changed(&mut self, theme: Theme) {
        log::debug!("Applying {} theme", theme.as_str());
    }
}
