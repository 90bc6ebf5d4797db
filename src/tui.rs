//! The interactive builder screen.
//!
//! Three panes: the palette of field types on the left, the canvas
//! showing the current field order in the middle, and the inspector for
//! the selected field on the right. Tab cycles focus. Reordering is a
//! grab/move/drop gesture over the canvas that feeds the drag state
//! machine; nothing moves until the drop commits.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    cursor::{self, Show},
    event::{self, Event, KeyCode, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, size, Clear, ClearType},
    QueueableCommand,
};

use crate::builder::{Builder, SaveState};
use crate::inspector::{self, EditBuffer, InspectorState};
use crate::render::render_field;
use crate::repository::TemplateRepository;
use crate::schema::registry::{self, PropertyKind};
use crate::schema::FieldId;

const PALETTE_WIDTH: u16 = 18;
const INSPECTOR_WIDTH: u16 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Palette,
    Canvas,
    Inspector,
}

pub struct BuilderScreen {
    builder: Builder,
    repo: Option<Box<dyn TemplateRepository>>,
    draft_path: PathBuf,
    focus: Pane,
    palette_row: usize,
    inspector: InspectorState,
    title_edit: Option<EditBuffer>,
    status: Option<String>,
    discard_on_quit: bool,
}

impl BuilderScreen {
    pub fn new(
        builder: Builder,
        repo: Option<Box<dyn TemplateRepository>>,
        draft_path: PathBuf,
    ) -> Self {
        Self {
            builder,
            repo,
            draft_path,
            focus: Pane::Palette,
            palette_row: 0,
            inspector: InspectorState::default(),
            title_edit: None,
            status: None,
            discard_on_quit: false,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.queue(cursor::Hide)?;
        stdout.queue(Clear(ClearType::All))?;
        stdout.queue(cursor::MoveTo(0, 0))?;
        stdout.flush()?;

        self.draw()?;

        loop {
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if self.handle_key(key) {
                        break;
                    }
                    self.builder.tick();
                    self.draw()?;
                }
            } else {
                // Timed state only: the save feedback reverting to idle.
                let before = self.builder.save_state();
                self.builder.tick();
                if self.builder.save_state() != before {
                    self.draw()?;
                }
            }
        }

        disable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.queue(Clear(ClearType::All))?;
        stdout.queue(cursor::MoveTo(0, 0))?;
        stdout.queue(Show)?;
        stdout.flush()?;

        if self.builder.is_dirty() && !self.discard_on_quit {
            match self.builder.save_draft(&self.draft_path) {
                Ok(()) => println!("Draft saved to {}", self.draft_path.display()),
                Err(err) => eprintln!("Could not save draft: {}", err),
            }
        }
        Ok(())
    }

    // Key handling

    /// Returns true when the screen should close.
    fn handle_key(&mut self, key: event::KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => {
                    self.save();
                    return false;
                }
                KeyCode::Char('c') => {
                    self.discard_on_quit = true;
                    return true;
                }
                KeyCode::Char('d') => return true,
                _ => return false,
            }
        }

        if self.title_edit.is_some() {
            return self.handle_title_key(key);
        }
        if self.inspector.editing.is_some() {
            self.handle_inspector_edit_key(key);
            return false;
        }

        match key.code {
            KeyCode::Tab => {
                self.builder.cancel_drag();
                self.focus = match self.focus {
                    Pane::Palette => Pane::Canvas,
                    Pane::Canvas => Pane::Inspector,
                    Pane::Inspector => Pane::Palette,
                };
            }
            KeyCode::Char('t') => {
                self.title_edit = Some(EditBuffer::from_text(&self.builder.schema().title));
            }
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if self.builder.drag.is_active() {
                    self.builder.cancel_drag();
                } else {
                    return true;
                }
            }
            _ => match self.focus {
                Pane::Palette => self.handle_palette_key(key),
                Pane::Canvas => self.handle_canvas_key(key),
                Pane::Inspector => self.handle_inspector_key(key),
            },
        }
        false
    }

    fn handle_title_key(&mut self, key: event::KeyEvent) -> bool {
        let Some(buffer) = self.title_edit.as_mut() else {
            return false;
        };
        match key.code {
            KeyCode::Char(c) => buffer.insert(c),
            KeyCode::Backspace => buffer.backspace(),
            KeyCode::Delete => buffer.delete(),
            KeyCode::Left => buffer.move_left(),
            KeyCode::Right => buffer.move_right(),
            KeyCode::Home => buffer.move_to_start(),
            KeyCode::End => buffer.move_to_end(),
            KeyCode::Enter => {
                let title = buffer.as_string();
                self.builder.set_title(title);
                self.title_edit = None;
            }
            KeyCode::Esc => self.title_edit = None,
            _ => {}
        }
        false
    }

    fn handle_palette_key(&mut self, key: event::KeyEvent) {
        match key.code {
            KeyCode::Up => self.palette_row = self.palette_row.saturating_sub(1),
            KeyCode::Down => {
                if self.palette_row + 1 < registry::DEFINITIONS.len() {
                    self.palette_row += 1;
                }
            }
            // Dropping from the palette is an insertion, not a reorder:
            // the new field always lands at the end and gets selected.
            KeyCode::Enter | KeyCode::Char(' ') => {
                let name = registry::DEFINITIONS[self.palette_row].kind.wire_name();
                if self.builder.add_field_named(name).is_some() {
                    self.inspector.reset();
                }
            }
            _ => {}
        }
    }

    fn handle_canvas_key(&mut self, key: event::KeyEvent) {
        let count = self.builder.schema().fields.len();
        if count == 0 {
            return;
        }
        let current = self.selected_index().unwrap_or(0);

        match key.code {
            KeyCode::Up | KeyCode::Down => {
                let step = |i: usize| {
                    if key.code == KeyCode::Up {
                        i.saturating_sub(1)
                    } else {
                        (i + 1).min(count - 1)
                    }
                };
                if self.builder.drag.is_active() {
                    // The gesture entered the neighbouring drop zone.
                    let hovered = self.builder.drag.target().unwrap_or(current);
                    self.builder.hover_drag(step(hovered));
                } else {
                    self.select_index(step(current));
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.builder.drag.is_active() {
                    self.builder.drop_drag();
                    // Selection follows the moved field by id.
                } else {
                    self.builder.begin_drag(current);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete | KeyCode::Backspace => {
                if !self.builder.drag.is_active() {
                    if let Some(id) = self.builder.selected() {
                        self.builder.delete_field(id);
                        self.inspector.reset();
                        // Keep a neighbour selected so the inspector
                        // stays useful.
                        let remaining = self.builder.schema().fields.len();
                        if remaining > 0 {
                            self.select_index(current.min(remaining - 1));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_inspector_key(&mut self, key: event::KeyEvent) {
        let Some(field) = self.builder.selected_field() else {
            return;
        };
        let id = field.id;
        let props = inspector::visible_properties(field.kind);
        let row = self.inspector.row.min(props.len() - 1);
        let prop = props[row];

        match key.code {
            KeyCode::Up => self.inspector.row = row.saturating_sub(1),
            KeyCode::Down => self.inspector.row = (row + 1).min(props.len() - 1),
            KeyCode::Enter | KeyCode::Char(' ') => match prop {
                PropertyKind::Required => {
                    let required = field.required;
                    self.builder
                        .update_field(id, inspector::FieldPatch::Required(!required));
                }
                _ => {
                    self.inspector.row = row;
                    self.inspector.editing =
                        Some(EditBuffer::from_text(&inspector::property_text(field, prop)));
                }
            },
            _ => {}
        }
    }

    fn handle_inspector_edit_key(&mut self, key: event::KeyEvent) {
        let (Some(field), Some(buffer)) = (
            self.builder.selected_field(),
            self.inspector.editing.as_mut(),
        ) else {
            self.inspector.editing = None;
            return;
        };
        let id = field.id;
        let props = inspector::visible_properties(field.kind);
        let prop = props[self.inspector.row.min(props.len() - 1)];

        match key.code {
            KeyCode::Char(c) => buffer.insert(c),
            KeyCode::Backspace => buffer.backspace(),
            KeyCode::Delete => buffer.delete(),
            KeyCode::Left => buffer.move_left(),
            KeyCode::Right => buffer.move_right(),
            KeyCode::Home => buffer.move_to_start(),
            KeyCode::End => buffer.move_to_end(),
            KeyCode::Enter => {
                // Shift+Enter inserts a newline in the options editor;
                // plain Enter commits the edit.
                if key.modifiers.contains(KeyModifiers::SHIFT) && prop == PropertyKind::Options {
                    buffer.insert('\n');
                } else {
                    let text = buffer.as_string();
                    if let Some(patch) = inspector::patch_from_text(prop, text) {
                        self.builder.update_field(id, patch);
                    }
                    self.inspector.editing = None;
                }
            }
            KeyCode::Esc => self.inspector.editing = None,
            _ => {}
        }
    }

    fn save(&mut self) {
        match &self.repo {
            Some(repo) => {
                // Paint the in-flight state once; the request blocks.
                self.builder.mark_saving();
                self.draw().ok();
                self.builder.save(repo.as_ref());
                self.status = None;
            }
            None => {
                self.status = Some("No backend configured; draft is kept locally".to_string());
            }
        }
    }

    fn selected_index(&self) -> Option<usize> {
        self.builder
            .selected()
            .and_then(|id| self.builder.schema().index_of(id))
    }

    fn select_index(&mut self, index: usize) {
        let id: Option<FieldId> = self.builder.schema().fields.get(index).map(|f| f.id);
        let changed = id != self.builder.selected();
        self.builder.select_field(id);
        if changed {
            // Selecting a different field swaps the inspector wholesale.
            self.inspector.reset();
        }
    }

    // Drawing

    fn draw(&self) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.queue(cursor::Hide)?;

        let (cols, rows) = size()?;
        stdout.queue(cursor::MoveTo(0, 0))?;
        stdout.queue(Clear(ClearType::All))?;

        if cols < PALETTE_WIDTH + INSPECTOR_WIDTH + 24 || rows < 8 {
            write_at(&mut stdout, 0, 0, "Terminal too small for the builder")?;
            stdout.flush()?;
            return Ok(());
        }

        self.draw_header(&mut stdout, cols)?;
        write_at(&mut stdout, 0, 1, &"─".repeat(cols as usize))?;

        let body_top: u16 = 2;
        let body_bottom = rows - 2;
        let canvas_x = PALETTE_WIDTH + 2;
        let inspector_x = cols - INSPECTOR_WIDTH;

        for y in body_top..body_bottom {
            write_at(&mut stdout, PALETTE_WIDTH, y, "│")?;
            write_at(&mut stdout, inspector_x - 2, y, "│")?;
        }

        self.draw_palette(&mut stdout, body_top, body_bottom)?;
        let canvas_width = (inspector_x - 2 - canvas_x) as usize;
        self.draw_canvas(&mut stdout, canvas_x, canvas_width, body_top, body_bottom)?;
        self.draw_inspector(&mut stdout, inspector_x, body_top, body_bottom)?;

        write_at(&mut stdout, 0, rows - 2, &"─".repeat(cols as usize))?;
        self.draw_status(&mut stdout, rows - 1)?;

        stdout.flush()?;
        Ok(())
    }

    fn draw_header(&self, stdout: &mut io::Stdout, cols: u16) -> io::Result<()> {
        let title = match &self.title_edit {
            Some(buffer) => format!("Title: {}▏", buffer.as_string()),
            None => {
                let dirty = if self.builder.is_dirty() { " *" } else { "" };
                format!("{}{}  \x1b[90m(t to rename)\x1b[0m", self.builder.schema().title, dirty)
            }
        };
        write_at(stdout, 1, 0, &format!("\x1b[1m{}\x1b[0m", title))?;

        let state = match self.builder.save_state() {
            SaveState::Idle => "\x1b[90m^S save\x1b[0m".to_string(),
            SaveState::Saving => "\x1b[93msaving…\x1b[0m".to_string(),
            SaveState::Success => "\x1b[92msaved ✓\x1b[0m".to_string(),
            SaveState::Error => "\x1b[91msave failed ✗\x1b[0m".to_string(),
        };
        // Right-aligned; the ANSI codes take no cells.
        let visible = match self.builder.save_state() {
            SaveState::Idle => 7,
            SaveState::Saving => 7,
            SaveState::Success => 7,
            SaveState::Error => 13,
        };
        write_at(stdout, cols.saturating_sub(visible + 1), 0, &state)?;
        Ok(())
    }

    fn draw_palette(&self, stdout: &mut io::Stdout, top: u16, bottom: u16) -> io::Result<()> {
        let focused = self.focus == Pane::Palette;
        write_at(stdout, 1, top, &pane_title("Palette", focused))?;
        for (i, def) in registry::DEFINITIONS.iter().enumerate() {
            let y = top + 2 + i as u16;
            if y >= bottom {
                break;
            }
            let marker = if focused && i == self.palette_row {
                "❯"
            } else {
                " "
            };
            let line = format!("{} {} {}", marker, def.icon, def.label);
            if focused && i == self.palette_row {
                write_at(stdout, 1, y, &format!("\x1b[96m{}\x1b[0m", line))?;
            } else {
                write_at(stdout, 1, y, &line)?;
            }
        }
        Ok(())
    }

    fn draw_canvas(
        &self,
        stdout: &mut io::Stdout,
        x: u16,
        width: usize,
        top: u16,
        bottom: u16,
    ) -> io::Result<()> {
        let focused = self.focus == Pane::Canvas;
        write_at(stdout, x, top, &pane_title("Canvas", focused))?;

        let fields = &self.builder.schema().fields;
        if fields.is_empty() {
            write_at(stdout, x, top + 2, "\x1b[90mDrop fields here\x1b[0m")?;
            write_at(
                stdout,
                x,
                top + 3,
                &clip_ansi(
                    "\x1b[90m(pick a type in the palette and press Enter)\x1b[0m",
                    width,
                ),
            )?;
            return Ok(());
        }

        let selected = self.selected_index();
        let drag_source = self.builder.drag.source();
        let drag_target = self.builder.drag.target();

        // Lay every field out, then scroll so the selected one is visible.
        let mut lines: Vec<String> = Vec::new();
        let mut selected_line = 0usize;
        for (i, field) in fields.iter().enumerate() {
            let marker = if drag_source == Some(i) {
                "\x1b[93m↕\x1b[0m"
            } else if drag_target == Some(i) {
                "\x1b[93m▸\x1b[0m"
            } else if selected == Some(i) {
                "\x1b[96m❯\x1b[0m"
            } else {
                " "
            };
            if selected == Some(i) {
                selected_line = lines.len();
            }
            for (j, rendered) in render_field(field, false).iter().enumerate() {
                let prefix = if j == 0 { marker } else { " " };
                lines.push(format!("{} {}", prefix, rendered));
            }
            lines.push(String::new());
        }

        let height = (bottom - top - 2) as usize;
        let scroll = selected_line.saturating_sub(height.saturating_sub(4));
        for (row, line) in lines.iter().skip(scroll).take(height).enumerate() {
            // Long labels must not bleed into the inspector pane.
            write_at(stdout, x, top + 2 + row as u16, &clip_ansi(line, width))?;
        }
        Ok(())
    }

    fn draw_inspector(
        &self,
        stdout: &mut io::Stdout,
        x: u16,
        top: u16,
        bottom: u16,
    ) -> io::Result<()> {
        let focused = self.focus == Pane::Inspector;
        write_at(stdout, x, top, &pane_title("Inspector", focused))?;

        // No selection: the inspector has nothing to write to. Not an
        // error, just the empty state.
        let Some(field) = self.builder.selected_field() else {
            write_at(stdout, x, top + 2, "\x1b[90mNo field selected\x1b[0m")?;
            return Ok(());
        };

        let def = registry::definition(field.kind);
        write_at(
            stdout,
            x,
            top + 1,
            &format!("\x1b[90m{} {}\x1b[0m", def.icon, def.label),
        )?;

        let props = inspector::visible_properties(field.kind);
        let active_row = self.inspector.row.min(props.len() - 1);
        let mut y = top + 3;
        for (i, prop) in props.iter().enumerate() {
            if y >= bottom {
                break;
            }
            let marker = if focused && i == active_row { "❯" } else { " " };
            let header = format!("{} {}", marker, prop.display_name());
            if focused && i == active_row {
                write_at(stdout, x, y, &format!("\x1b[96m{}\x1b[0m", header))?;
            } else {
                write_at(stdout, x, y, &header)?;
            }
            y += 1;

            let editing_here = focused && i == active_row;
            let value_lines: Vec<String> = match (&self.inspector.editing, editing_here) {
                (Some(buffer), true) => format!("{}▏", buffer.as_string())
                    .split('\n')
                    .map(|s| s.to_string())
                    .collect(),
                _ => property_display(field, *prop),
            };
            for line in value_lines {
                if y >= bottom {
                    break;
                }
                write_at(stdout, x + 2, y, &format!("\x1b[37m{}\x1b[0m", line))?;
                y += 1;
            }
            y += 1;
        }
        Ok(())
    }

    fn draw_status(&self, stdout: &mut io::Stdout, y: u16) -> io::Result<()> {
        if self.builder.save_state() == SaveState::Error {
            if let Some(err) = self.builder.last_save_error() {
                write_at(stdout, 1, y, &format!("\x1b[91mSave failed: {}\x1b[0m", err))?;
                return Ok(());
            }
        }
        let hints = if let Some(status) = &self.status {
            status.clone()
        } else if self.title_edit.is_some() {
            "Enter confirm  Esc cancel".to_string()
        } else if self.inspector.editing.is_some() {
            "Enter commit  Shift+Enter newline (options)  Esc cancel".to_string()
        } else if self.builder.drag.is_active() {
            "↑/↓ move  Enter/Space drop  Esc cancel drag".to_string()
        } else {
            match self.focus {
                Pane::Palette => "↑/↓ pick type  Enter add  Tab canvas  ^S save  q quit",
                Pane::Canvas => "↑/↓ select  Space grab  d delete  Tab inspector  ^S save",
                Pane::Inspector => "↑/↓ property  Enter edit/toggle  Tab palette  ^S save",
            }
            .to_string()
        };
        write_at(stdout, 1, y, &format!("\x1b[90m{}\x1b[0m", hints))?;
        Ok(())
    }
}

fn pane_title(name: &str, focused: bool) -> String {
    if focused {
        format!("\x1b[1;97m{}\x1b[0m", name)
    } else {
        format!("\x1b[90m{}\x1b[0m", name)
    }
}

/// Inspector value lines for display (not editing).
fn property_display(field: &crate::schema::Field, prop: PropertyKind) -> Vec<String> {
    match prop {
        PropertyKind::Label => vec![field.label.clone()],
        PropertyKind::Placeholder => {
            if field.placeholder.is_empty() {
                vec!["(none)".to_string()]
            } else {
                vec![field.placeholder.clone()]
            }
        }
        PropertyKind::Required => {
            vec![if field.required { "[x] on" } else { "[ ] off" }.to_string()]
        }
        PropertyKind::Options => field.options.iter().map(|o| format!("• {}", o)).collect(),
    }
}

/// Truncate `text` to `width` visible columns. Escape sequences pass
/// through whole and take no cells; a cut mid-style gets a trailing
/// reset so the spill never restyles the neighbouring pane.
fn clip_ansi(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut visible = 0usize;
    let mut saw_escape = false;
    let mut truncated = false;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            saw_escape = true;
            out.push(c);
            for e in chars.by_ref() {
                out.push(e);
                if e.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        if visible >= width {
            truncated = true;
            break;
        }
        out.push(c);
        visible += 1;
    }
    if saw_escape && truncated {
        out.push_str("\x1b[0m");
    }
    out
}

fn write_at(stdout: &mut io::Stdout, x: u16, y: u16, text: &str) -> io::Result<()> {
    stdout.queue(cursor::MoveTo(x, y))?;
    stdout.write_all(text.as_bytes())?;
    Ok(())
}

/// Open the builder screen over `builder`, returning once it closes.
pub fn run_builder(
    builder: Builder,
    repo: Option<Box<dyn TemplateRepository>>,
    draft_path: PathBuf,
) -> io::Result<()> {
    let mut screen = BuilderScreen::new(builder, repo, draft_path);
    screen.run()
}
