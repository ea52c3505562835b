use crate::{
    app::App,
    filtered_list::{Column, ListItem, MergeFilter, SortState},
    game::{Architecture, Game, OperatingSystem, OwnedGame, UnityScriptingBackend},
    installed_games::{
        self, FacetOption, InstalledColumn, InstalledGameFilterPatch, InstalledGamesPage,
        ARCHITECTURE_OPTIONS,
        OPERATING_SYSTEM_OPTIONS, SCRIPTING_BACKEND_OPTIONS,
    },
    log::{log_level_label, LogEntry, LogLevel},
    owned_games::{self, OwnedColumn, OwnedGameFilterPatch},
    page::ListPage,
};
use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "json" => Some(OutputFormat::Json),
            "text" => Some(OutputFormat::Text),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct GlobalOptions {
    format: OutputFormat,
    catalog: Option<PathBuf>,
}

#[derive(Debug)]
enum CliCommand {
    Installed(InstalledListOptions),
    Owned(OwnedListOptions),
    Paths,
    Help,
    Version,
}

#[derive(Debug, Default)]
struct ListWindow {
    sort: Vec<String>,
    reverse: bool,
    page: Option<usize>,
    select: Option<String>,
}

#[derive(Debug, Default)]
struct InstalledListOptions {
    text: Option<String>,
    operating_system: Option<Option<OperatingSystem>>,
    architecture: Option<Option<Architecture>>,
    scripting_backend: Option<Option<UnityScriptingBackend>>,
    window: ListWindow,
}

#[derive(Debug, Default)]
struct OwnedListOptions {
    text: Option<String>,
    hide_installed: bool,
    linux_only: bool,
    window: ListWindow,
}

pub fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (global, command) = parse_args(&args)?;
    match command {
        CliCommand::Help => {
            print_help();
            Ok(())
        }
        CliCommand::Version => {
            println!("gameshelf v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => {
            let mut app = App::initialize(global.catalog)?;
            let result = run_command(&mut app, command, global.format);
            for line in problem_lines(app.log.entries()) {
                eprintln!("{line}");
            }
            result
        }
    }
}

fn parse_args(args: &[String]) -> Result<(GlobalOptions, CliCommand)> {
    let (global, tokens) = parse_global_options(args)?;
    let command = match tokens.first().map(|s| s.as_str()) {
        None | Some("--help" | "-h" | "help") => CliCommand::Help,
        Some("--version" | "-V" | "version") => CliCommand::Version,
        Some("installed") => {
            CliCommand::Installed(parse_installed_list(tokens.get(1..).unwrap_or(&[]))?)
        }
        Some("owned") => CliCommand::Owned(parse_owned_list(tokens.get(1..).unwrap_or(&[]))?),
        Some("paths") => CliCommand::Paths,
        Some(other) => bail!("Unknown command: {other} (see --help)"),
    };
    Ok((global, command))
}

fn parse_global_options(args: &[String]) -> Result<(GlobalOptions, Vec<String>)> {
    let mut format = OutputFormat::Text;
    let mut catalog = None;
    let mut tokens = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(value) = arg.strip_prefix("--format=") {
            format = parse_format(value)?;
            continue;
        }
        if arg == "--format" {
            let value = iter.next().ok_or_else(|| anyhow!("--format requires a value"))?;
            format = parse_format(value)?;
            continue;
        }
        if let Some(value) = arg.strip_prefix("--catalog=") {
            catalog = Some(PathBuf::from(value));
            continue;
        }
        if arg == "--catalog" {
            let value = iter.next().ok_or_else(|| anyhow!("--catalog requires a path"))?;
            catalog = Some(PathBuf::from(value));
            continue;
        }
        tokens.push(arg.to_string());
    }

    Ok((GlobalOptions { format, catalog }, tokens))
}

fn parse_format(value: &str) -> Result<OutputFormat> {
    OutputFormat::parse(value).ok_or_else(|| anyhow!("Unknown format: {value} (use 'json' or 'text')"))
}

/// Splits `--flag=value` / `--flag value` forms.
fn take_value<'a>(
    arg: &'a str,
    flag: &str,
    iter: &mut impl Iterator<Item = &'a String>,
) -> Result<Option<&'a str>> {
    if arg == flag {
        return iter
            .next()
            .map(|value| Some(value.as_str()))
            .ok_or_else(|| anyhow!("{flag} requires a value"));
    }
    Ok(arg
        .strip_prefix(flag)
        .and_then(|rest| rest.strip_prefix('=')))
}

fn parse_window_arg<'a>(
    arg: &'a str,
    window: &mut ListWindow,
    iter: &mut impl Iterator<Item = &'a String>,
) -> Result<bool> {
    if let Some(value) = take_value(arg, "--sort", &mut *iter)? {
        window.sort.push(value.to_string());
        return Ok(true);
    }
    if let Some(value) = take_value(arg, "--page", &mut *iter)? {
        let page: usize = value
            .parse()
            .map_err(|_| anyhow!("--page expects a number, got {value}"))?;
        if page == 0 {
            bail!("--page starts at 1");
        }
        window.page = Some(page);
        return Ok(true);
    }
    if let Some(value) = take_value(arg, "--select", &mut *iter)? {
        window.select = Some(value.to_string());
        return Ok(true);
    }
    if matches!(arg, "--reverse" | "-r") {
        window.reverse = true;
        return Ok(true);
    }
    Ok(false)
}

fn parse_installed_list(args: &[String]) -> Result<InstalledListOptions> {
    let mut options = InstalledListOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let arg = arg.as_str();
        if arg == "list" || parse_window_arg(arg, &mut options.window, &mut iter)? {
            continue;
        }
        if let Some(value) = take_value(arg, "--filter", &mut iter)? {
            options.text = Some(value.to_string());
        } else if let Some(value) = take_value(arg, "--os", &mut iter)? {
            options.operating_system = Some(parse_facet(
                value,
                "--os",
                &OPERATING_SYSTEM_OPTIONS,
                OperatingSystem::parse,
            )?);
        } else if let Some(value) = take_value(arg, "--arch", &mut iter)? {
            options.architecture = Some(parse_facet(
                value,
                "--arch",
                &ARCHITECTURE_OPTIONS,
                Architecture::parse,
            )?);
        } else if let Some(value) = take_value(arg, "--backend", &mut iter)? {
            options.scripting_backend = Some(parse_facet(
                value,
                "--backend",
                &SCRIPTING_BACKEND_OPTIONS,
                UnityScriptingBackend::parse,
            )?);
        } else {
            bail!("Unknown option for installed: {arg}");
        }
    }
    Ok(options)
}

fn parse_owned_list(args: &[String]) -> Result<OwnedListOptions> {
    let mut options = OwnedListOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let arg = arg.as_str();
        if arg == "list" || parse_window_arg(arg, &mut options.window, &mut iter)? {
            continue;
        }
        match arg {
            "--hide-installed" => options.hide_installed = true,
            "--linux-only" => options.linux_only = true,
            _ => match take_value(arg, "--filter", &mut iter)? {
                Some(value) => options.text = Some(value.to_string()),
                None => bail!("Unknown option for owned: {arg}"),
            },
        }
    }
    Ok(options)
}

/// "any" clears the facet. Only values the option table offers are accepted.
fn parse_facet<V: PartialEq + Copy>(
    value: &str,
    flag: &str,
    options: &[FacetOption<V>],
    parse: fn(&str) -> Option<V>,
) -> Result<Option<V>> {
    if value.eq_ignore_ascii_case("any") {
        return Ok(None);
    }
    match parse(value) {
        Some(choice) if installed_games::is_offered(options, choice) => Ok(Some(choice)),
        _ => bail!("Unknown value for {flag}: {value}"),
    }
}

/// Warnings and errors recorded while running a command, for stderr.
fn problem_lines(entries: &[LogEntry]) -> Vec<String> {
    entries
        .iter()
        .filter(|entry| entry.level != LogLevel::Info)
        .map(|entry| format!("[{}] {}", log_level_label(entry.level), entry.message))
        .collect()
}

fn run_command(app: &mut App, command: CliCommand, format: OutputFormat) -> Result<()> {
    match command {
        CliCommand::Installed(options) => list_installed(app, options, format),
        CliCommand::Owned(options) => list_owned(app, options, format),
        CliCommand::Paths => list_paths(app, format),
        CliCommand::Help | CliCommand::Version => Ok(()),
    }
}

fn apply_window<T: ListItem, F: MergeFilter>(
    page: &mut ListPage<T, F>,
    window: &ListWindow,
    parse_column: fn(&str) -> Option<T::Column>,
) -> Result<()> {
    if !window.sort.is_empty() {
        page.clear_sort();
    }
    for value in &window.sort {
        let column = parse_column(value).ok_or_else(|| anyhow!("Unknown sort column: {value}"))?;
        page.set_sort(column);
    }
    if window.reverse {
        let column = page
            .sort()
            .map(|sort| sort.column)
            .ok_or_else(|| anyhow!("--reverse needs a sort column"))?;
        page.set_sort(column);
    }
    if let Some(id) = &window.select {
        page.select(id);
        page.focus(id);
    }
    if let Some(number) = window.page {
        page.jump_to_page(number - 1);
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SortOutput {
    column: &'static str,
    direction: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListOutput<'a, T> {
    total: usize,
    shown: usize,
    sort: Option<SortOutput>,
    items: Vec<&'a T>,
    selected: Option<&'a T>,
    error: Option<&'a str>,
}

fn collect_output<'a, T: ListItem + Serialize, F: MergeFilter>(
    page: &'a ListPage<T, F>,
    paged: bool,
    column_key: fn(T::Column) -> &'static str,
) -> ListOutput<'a, T> {
    let items: Vec<&T> = if paged {
        page.rows().collect()
    } else {
        page.list().visible().collect()
    };
    ListOutput {
        total: page.list().items().len(),
        shown: page.list().len(),
        sort: page.sort().map(|sort| SortOutput {
            column: column_key(sort.column),
            direction: sort.direction.label(),
        }),
        items,
        selected: page.selected(),
        error: page.error(),
    }
}

fn list_installed(app: &mut App, options: InstalledListOptions, format: OutputFormat) -> Result<()> {
    app.refresh_installed();
    app.installed.set_filter(InstalledGameFilterPatch {
        text: options.text,
        operating_system: options.operating_system,
        architecture: options.architecture,
        scripting_backend: options.scripting_backend,
    });
    apply_window(&mut app.installed, &options.window, InstalledColumn::parse)?;

    let page = &app.installed;
    let output = collect_output(page, options.window.page.is_some(), InstalledColumn::key);
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            if let Some(error) = output.error {
                println!("Error: {error}");
            }
            if let Some(line) = installed_filter_line(page) {
                println!("{line}");
            }
            print_table(
                page.list().columns(),
                page.sort(),
                &output.items,
                installed_games::cell_text,
            );
            println!("{} of {} installed games.", output.shown, output.total);
            print_selected_game(&options.window, output.selected);
        }
    }
    Ok(())
}

/// Describes the filter when there is anything to reset.
fn installed_filter_line(page: &InstalledGamesPage) -> Option<String> {
    if !page.can_reset_filter() {
        return None;
    }
    let filter = page.filter();
    let mut line = String::from("Filters:");
    if page.is_filter_active() {
        line.push_str(&format!(
            " {} / {} / {}",
            installed_games::facet_label(
                &OPERATING_SYSTEM_OPTIONS,
                filter.operating_system,
                OperatingSystem::as_str
            ),
            installed_games::facet_label(
                &ARCHITECTURE_OPTIONS,
                filter.architecture,
                Architecture::label
            ),
            installed_games::facet_label(
                &SCRIPTING_BACKEND_OPTIONS,
                filter.scripting_backend,
                UnityScriptingBackend::label
            ),
        ));
    }
    if !filter.text.trim().is_empty() {
        line.push_str(&format!(" \"{}\"", filter.text.trim()));
    }
    Some(line)
}

fn list_owned(app: &mut App, options: OwnedListOptions, format: OutputFormat) -> Result<()> {
    app.refresh_owned();
    app.owned.set_filter(OwnedGameFilterPatch {
        text: options.text,
        hide_installed: Some(options.hide_installed),
        linux_only: Some(options.linux_only),
    });
    apply_window(&mut app.owned, &options.window, OwnedColumn::parse)?;

    let page = &app.owned;
    let output = collect_output(page, options.window.page.is_some(), OwnedColumn::key);
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            if let Some(error) = output.error {
                println!("Error: {error}");
            }
            print_table(
                page.list().columns(),
                page.sort(),
                &output.items,
                owned_games::cell_text,
            );
            println!("{}", page.summary());
            print_selected_owned(&options.window, output.selected);
        }
    }
    Ok(())
}

fn print_selected_game(window: &ListWindow, selected: Option<&Game>) {
    let Some(id) = window.select.as_deref() else {
        return;
    };
    let Some(game) = selected else {
        println!("No installed game with id {id}");
        return;
    };
    println!();
    println!("{}", game.display_name());
    println!("  Id: {}", game.id);
    println!("  Path: {}", game.full_path.display());
    if let Some(engine) = &game.engine {
        println!("  Engine: {}", engine.label());
    }
    println!("  Installed mods: {}", game.installed_mods.len());
    for mod_id in &game.installed_mods {
        println!("    - {mod_id}");
    }
}

fn print_selected_owned(window: &ListWindow, selected: Option<&OwnedGame>) {
    let Some(id) = window.select.as_deref() else {
        return;
    };
    let Some(game) = selected else {
        println!("No owned game with id {id}");
        return;
    };
    let os_list: Vec<&str> = game.os_list.iter().map(|os| os.as_str()).collect();
    println!();
    println!("{} ({})", game.name, game.id);
    println!("  Engine: {}", game.engine.as_str());
    println!("  Platforms: {}", os_list.join(", "));
    println!("  Installed: {}", if game.installed { "yes" } else { "no" });
}

fn print_table<T: ListItem>(
    columns: &[Column<T>],
    sort: Option<SortState<T::Column>>,
    rows: &[&T],
    cell: fn(&T, T::Column) -> String,
) {
    let headers: Vec<String> = columns
        .iter()
        .map(|column| match sort {
            Some(sort) if sort.column == column.id => {
                format!("{} {}", column.label, sort.direction.arrow())
            }
            _ => column.label.to_string(),
        })
        .collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|column| cell(row, column.id)).collect())
        .collect();
    let widths = column_widths(columns, &headers, &cells);

    println!("{}", format_line(columns, &headers, &widths));
    for row in &cells {
        println!("{}", format_line(columns, row, &widths));
    }
}

/// Pixel widths from the column descriptors, in terminal cells.
const PIXELS_PER_CELL: usize = 10;

/// Each column fits its header and cells, and never drops below the width
/// its descriptor asks for.
fn column_widths<T: ListItem>(
    columns: &[Column<T>],
    headers: &[String],
    cells: &[Vec<String>],
) -> Vec<usize> {
    columns
        .iter()
        .zip(headers)
        .enumerate()
        .map(|(index, (column, header))| {
            let minimum = column
                .width
                .map_or(0, |pixels| usize::from(pixels) / PIXELS_PER_CELL);
            cells
                .iter()
                .map(|row| row[index].chars().count())
                .chain([header.chars().count(), minimum])
                .max()
                .unwrap_or(0)
        })
        .collect()
}

fn format_line<T: ListItem>(columns: &[Column<T>], values: &[String], widths: &[usize]) -> String {
    columns
        .iter()
        .zip(values)
        .zip(widths)
        .map(|((column, value), width)| {
            if column.center {
                format!("{value:^width$}")
            } else {
                format!("{value:<width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[derive(Serialize)]
struct PathsOutput {
    data_dir: String,
    catalog_dir: String,
    log_file: Option<String>,
}

fn list_paths(app: &App, format: OutputFormat) -> Result<()> {
    let output = PathsOutput {
        data_dir: app.data_dir.display().to_string(),
        catalog_dir: app.catalog_dir.display().to_string(),
        log_file: app.log.path().map(|path| path.display().to_string()),
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("Data dir: {}", output.data_dir);
            println!("Catalog dir: {}", output.catalog_dir);
            if let Some(log_file) = output.log_file {
                println!("Log file: {log_file}");
            }
        }
    }

    Ok(())
}

fn print_help() {
    println!("gameshelf v{}", env!("CARGO_PKG_VERSION"));
    println!("Usage:");
    println!("  gameshelf installed [list]        List installed games");
    println!("  gameshelf owned [list]            List owned games");
    println!("  gameshelf paths                   Show data and catalog paths");
    println!();
    println!("Global options:");
    println!("  --format <json|text>              Output format");
    println!("  --catalog <dir>                   Read catalog files from <dir>");
    println!("  -h, --help                        Show help");
    println!("  -V, --version                     Show version");
    println!();
    println!("List options:");
    println!("  --filter <text>                   Match names (and ids for owned games)");
    println!("  --sort <column>                   Click a column header; repeat to flip direction");
    println!("  -r, --reverse                     Flip the current sort direction");
    println!("  --page <n>                        Show one page of rows");
    println!("  --select <id>                     Show details for one game");
    println!();
    println!("Installed options:");
    println!("  --os <any|windows|linux>");
    println!("  --arch <any|x64|x86>");
    println!("  --backend <any|il2cpp|mono>");
    println!("  columns: name, os, arch, backend, engine");
    println!();
    println!("Owned options:");
    println!("  --hide-installed                  Hide installed games");
    println!("  --linux-only                      Hide games without native Linux support");
    println!("  columns: name, linux, installed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::EventLog;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn no_arguments_show_help() {
        let (global, command) = parse_args(&[]).unwrap();
        assert_eq!(global.format, OutputFormat::Text);
        assert!(matches!(command, CliCommand::Help));
    }

    #[test]
    fn global_options_apply_anywhere() {
        let (global, command) =
            parse_args(&args(&["installed", "--format=json", "--catalog", "/tmp/cat"])).unwrap();
        assert_eq!(global.format, OutputFormat::Json);
        assert_eq!(global.catalog, Some(PathBuf::from("/tmp/cat")));
        assert!(matches!(command, CliCommand::Installed(_)));
    }

    #[test]
    fn installed_options_parse_facets_and_sorts() {
        let (_, command) = parse_args(&args(&[
            "installed",
            "list",
            "--filter",
            "wild",
            "--os=linux",
            "--arch",
            "any",
            "--sort",
            "engine",
            "--sort=engine",
            "--page",
            "2",
            "--select",
            "abc",
        ]))
        .unwrap();
        let CliCommand::Installed(options) = command else {
            panic!("expected installed command");
        };
        assert_eq!(options.text.as_deref(), Some("wild"));
        assert_eq!(options.operating_system, Some(Some(OperatingSystem::Linux)));
        assert_eq!(options.architecture, Some(None));
        assert_eq!(options.scripting_backend, None);
        assert_eq!(options.window.sort, vec!["engine", "engine"]);
        assert_eq!(options.window.page, Some(2));
        assert_eq!(options.window.select.as_deref(), Some("abc"));
    }

    #[test]
    fn owned_options_parse_switches() {
        let (_, command) =
            parse_args(&args(&["owned", "--hide-installed", "--linux-only", "-r"])).unwrap();
        let CliCommand::Owned(options) = command else {
            panic!("expected owned command");
        };
        assert!(options.hide_installed);
        assert!(options.linux_only);
        assert!(options.window.reverse);
    }

    #[test]
    fn bad_input_is_rejected() {
        assert!(parse_args(&args(&["installed", "--os", "beos"])).is_err());
        assert!(parse_args(&args(&["installed", "--sort"])).is_err());
        assert!(parse_args(&args(&["owned", "--page", "0"])).is_err());
        assert!(parse_args(&args(&["owned", "--bogus"])).is_err());
        assert!(parse_args(&args(&["--format", "xml", "owned"])).is_err());
        assert!(parse_args(&args(&["frobnicate"])).is_err());
    }

    #[test]
    fn repeated_sort_flags_toggle_direction() {
        let mut page = installed_games::new_page();
        let window = ListWindow {
            sort: vec!["name".to_string(), "name".to_string()],
            ..Default::default()
        };
        apply_window(&mut page, &window, InstalledColumn::parse).unwrap();
        assert_eq!(
            page.sort().map(|sort| sort.direction.label()),
            Some("desc")
        );

        let window = ListWindow {
            sort: vec!["os".to_string()],
            reverse: true,
            ..Default::default()
        };
        apply_window(&mut page, &window, InstalledColumn::parse).unwrap();
        let sort = page.sort().unwrap();
        assert_eq!(sort.column, InstalledColumn::OperatingSystem);
        assert_eq!(sort.direction.label(), "desc");
    }

    #[test]
    fn table_lines_align_columns() {
        let columns = owned_games::columns();
        let line = format_line(
            &columns,
            &["Hades".to_string(), "No".to_string(), "Yes".to_string()],
            &[8, 6, 10],
        );
        assert_eq!(line, "Hades       No       Yes");
    }

    #[test]
    fn facet_values_outside_the_option_table_are_rejected() {
        let err = parse_args(&args(&["installed", "--os", "unknown"])).unwrap_err();
        assert!(err.to_string().contains("--os"));
        assert!(parse_args(&args(&["installed", "--arch=unknown"])).is_err());
        assert!(parse_args(&args(&["installed", "--backend", "Unknown"])).is_err());
        assert!(parse_args(&args(&["installed", "--backend", "IL2CPP"])).is_ok());
    }

    #[test]
    fn filter_line_names_every_chosen_value() {
        let mut page = installed_games::new_page();
        assert_eq!(installed_filter_line(&page), None);

        page.set_filter(InstalledGameFilterPatch::text("  wild "));
        assert_eq!(installed_filter_line(&page).as_deref(), Some("Filters: \"wild\""));

        page.set_filter(InstalledGameFilterPatch {
            operating_system: Some(Some(OperatingSystem::Unknown)),
            architecture: Some(Some(Architecture::X86)),
            ..Default::default()
        });
        assert_eq!(
            installed_filter_line(&page).as_deref(),
            Some("Filters: Unknown / x86 / Any backend \"wild\"")
        );
    }

    #[test]
    fn column_widths_respect_descriptor_minimums() {
        let columns = owned_games::columns();
        let headers = vec![
            "Game".to_string(),
            "Linux?".to_string(),
            "Installed? ↑".to_string(),
        ];
        let cells = vec![vec!["Hades".to_string(), "No".to_string(), "Yes".to_string()]];
        assert_eq!(column_widths(&columns, &headers, &cells), vec![5, 10, 12]);
    }

    #[test]
    fn only_warnings_and_errors_reach_stderr() {
        let mut log = EventLog::new(None);
        log.info("Installed games loaded: 2 game(s)".to_string());
        log.warn("Unknown owned games sort column: size".to_string());
        log.error("Owned games refresh failed: boom".to_string());
        assert_eq!(
            problem_lines(log.entries()),
            vec![
                "[WARN] Unknown owned games sort column: size".to_string(),
                "[ERROR] Owned games refresh failed: boom".to_string(),
            ]
        );
    }
}
