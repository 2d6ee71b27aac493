use crate::client::CubeApi;
use crate::controller::{CatalogStatus, ResultView, SelectionController, SelectionSnapshot};
use crate::query::ResultSet;
use crate::selection::MemberGroup;
use log::{error, info};
use serde_json::Value;
use std::fmt::Write as _;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const HELP: &str = "\
Commands:
  cubes                 list cubes
  cube +NAME | -NAME    select or deselect a cube
  dim +NAME | -NAME     select or deselect a dimension
  measure +NAME | -NAME select or deselect a measure
  show                  print members, query and SQL
  run                   execute the query
  reset                 clear the selection
  reload                retry loading cube metadata
  help                  print this message
  quit                  exit";

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Expected +NAME or -NAME, got: {0}")]
    InvalidToggle(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Cubes,
    Cube { name: String, included: bool },
    Dimension { name: String, included: bool },
    Measure { name: String, included: bool },
    Show,
    Run,
    Reset,
    Reload,
    Help,
    Quit,
}

fn parse_toggle(arg: Option<&str>) -> Result<(String, bool), ConsoleError> {
    let arg = arg.unwrap_or_default();
    let (included, name) = if let Some(name) = arg.strip_prefix('+') {
        (true, name)
    } else if let Some(name) = arg.strip_prefix('-') {
        (false, name)
    } else {
        return Err(ConsoleError::InvalidToggle(arg.to_string()));
    };
    if name.is_empty() {
        return Err(ConsoleError::InvalidToggle(arg.to_string()));
    }
    Ok((name.to_string(), included))
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Command>, ConsoleError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };

        let command = match verb {
            "cubes" => Command::Cubes,
            "cube" => {
                let (name, included) = parse_toggle(words.next())?;
                Command::Cube { name, included }
            }
            "dim" | "dimension" => {
                let (name, included) = parse_toggle(words.next())?;
                Command::Dimension { name, included }
            }
            "measure" => {
                let (name, included) = parse_toggle(words.next())?;
                Command::Measure { name, included }
            }
            "show" => Command::Show,
            "run" => Command::Run,
            "reset" => Command::Reset,
            "reload" => Command::Reload,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ConsoleError::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Line-oriented front end over a [`SelectionController`].
pub struct Console<C> {
    controller: SelectionController<C>,
}

impl<C> Console<C>
where
    C: CubeApi,
{
    pub fn new(controller: SelectionController<C>) -> Self {
        Console { controller }
    }

    pub fn controller(&self) -> &SelectionController<C> {
        &self.controller
    }

    /// Loads the catalog and renders the opening screen.
    pub async fn start(&self) -> String {
        match self.controller.load_catalog().await {
            Ok(_) => render_cubes(&self.controller.snapshot().await, &self.controller.catalog()),
            Err(e) => format!("{}\nUse `reload` to try again.", e),
        }
    }

    /// Applies one command and returns what to print, `None` on quit.
    pub async fn execute(&self, command: Command) -> Option<String> {
        let output = match command {
            Command::Cubes => {
                render_cubes(&self.controller.snapshot().await, &self.controller.catalog())
            }
            Command::Cube { name, included } => {
                self.controller.toggle_cube(&name, included).await;
                render_selection(&self.controller.snapshot().await)
            }
            Command::Dimension { name, included } => {
                self.controller.toggle_dimension(&name, included).await;
                render_query(&self.controller.snapshot().await)
            }
            Command::Measure { name, included } => {
                self.controller.toggle_measure(&name, included).await;
                render_query(&self.controller.snapshot().await)
            }
            Command::Show => render_selection(&self.controller.snapshot().await),
            Command::Run => {
                // failures are rendered from the result view
                let _ = self.controller.refresh().await;
                let snapshot = self.controller.snapshot().await;
                format!("{}\n\n{}", render_query(&snapshot), render_result(&snapshot.result))
            }
            Command::Reset => {
                self.controller.reset().await;
                render_selection(&self.controller.snapshot().await)
            }
            Command::Reload => self.start().await,
            Command::Help => HELP.to_string(),
            Command::Quit => return None,
        };
        Some(output)
    }

    /// Reads commands from `input` until EOF or `quit`.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> Result<(), ConsoleError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Starting query builder console");
        let banner = self.start().await;
        output.write_all(format!("{}\n> ", banner).as_bytes()).await?;
        output.flush().await?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let text = match Command::parse(&line) {
                Ok(None) => String::new(),
                Ok(Some(command)) => match self.execute(command).await {
                    Some(text) => text,
                    None => break,
                },
                Err(e) => {
                    error!("{}", e);
                    format!("{}\n{}", e, HELP)
                }
            };
            output.write_all(format!("{}\n> ", text).as_bytes()).await?;
            output.flush().await?;
        }

        info!("Console closed");
        Ok(())
    }
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

pub fn render_cubes(snapshot: &SelectionSnapshot, catalog: &crate::catalog::Catalog) -> String {
    let mut out = String::new();
    if let CatalogStatus::Failed(e) = &snapshot.catalog_status {
        let _ = writeln!(out, "Failed to load cube metadata: {}", e);
    }
    let _ = write!(out, "Cubes ({})", catalog.cubes().len());
    for cube in catalog.cubes() {
        let selected = snapshot.cubes.contains(&cube.name);
        let _ = write!(out, "\n  {} {}", checkbox(selected), cube.name);
    }
    out
}

fn render_members(
    heading: &str,
    groups: &[MemberGroup],
    selected: &[String],
    with_type: bool,
) -> String {
    let count: usize = groups.iter().map(|g| g.members.len()).sum();
    let mut out = format!("{} ({})", heading, count);
    if groups.is_empty() {
        let _ = write!(
            out,
            "\n  Select cubes first to see relevant {}",
            heading.to_lowercase()
        );
        return out;
    }
    for group in groups {
        let _ = write!(out, "\n  {}", group.cube_name);
        for member in &group.members {
            let _ = write!(
                out,
                "\n    {} {} ({})",
                checkbox(selected.contains(&member.name)),
                member.title,
                member.name
            );
            if with_type {
                let _ = write!(out, " [{}]", member.member_type);
            }
        }
    }
    out
}

pub fn render_query(snapshot: &SelectionSnapshot) -> String {
    let sql = if snapshot.sql_preview.text().is_empty() {
        "Select cubes to see generated SQL".to_string()
    } else {
        snapshot.sql_preview.text().to_string()
    };
    format!(
        "Generated Query\n{}\n\nGenerated SQL\n{}",
        snapshot.query.to_pretty_json(),
        sql
    )
}

pub fn render_selection(snapshot: &SelectionSnapshot) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        render_members("Measures", &snapshot.relevant_measures, &snapshot.measures, false),
        render_members(
            "Dimensions",
            &snapshot.relevant_dimensions,
            &snapshot.dimensions,
            true
        ),
        render_query(snapshot)
    )
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn render_table(result: &ResultSet) -> String {
    let columns = result.table_columns();
    let rows: Vec<Vec<String>> = result
        .table_pivot()
        .iter()
        .map(|row| row.values.iter().map(display_value).collect())
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.title.chars().count()).collect();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = line(columns.iter().map(|c| c.title.as_str()).collect());
    let _ = write!(
        out,
        "\n{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for row in &rows {
        let _ = write!(out, "\n{}", line(row.iter().map(String::as_str).collect()));
    }
    let _ = write!(out, "\n{} rows", result.row_count());
    out
}

pub fn render_result(view: &ResultView) -> String {
    match view {
        ResultView::Idle => {
            "No Data: Please select measures or dimensions to see results".to_string()
        }
        ResultView::Loading => "Loading data...".to_string(),
        ResultView::Failed(message) => format!("Query Error: {}", message),
        ResultView::Ready(result) => render_table(result),
    }
}
