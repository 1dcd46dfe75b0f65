//! Line commands read from stdin by the terminal front end.

use forecast_periods_lib::app::AppController;
use forecast_periods_lib::period_selector::DetailedView;
use forecast_periods_lib::SelectionError;

pub const HELP: &str = "commands: click <lat> <lon> | key <name> | esc | offset <hours> | run <index> | view hide | runs | show | quit";

#[derive(Debug, PartialEq)]
pub enum Command {
    Click { lat: f64, lon: f64 },
    Key(String),
    Offset(u32),
    Run(usize),
    HideView,
    ListRuns,
    Show,
    Quit,
}

/// Parse one input line.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["click", lat, lon] => Ok(Command::Click {
            lat: parse_number(lat)?,
            lon: parse_number(lon)?,
        }),
        ["key", name] => Ok(Command::Key(name.to_string())),
        ["esc"] => Ok(Command::Key("Escape".to_string())),
        ["offset", hours] => Ok(Command::Offset(parse_number(hours)?)),
        ["run", index] => Ok(Command::Run(parse_number(index)?)),
        ["view", "hide"] => Ok(Command::HideView),
        ["runs"] => Ok(Command::ListRuns),
        ["show"] | [] => Ok(Command::Show),
        ["quit"] | ["exit"] => Ok(Command::Quit),
        _ => Err(format!("unknown command `{}`\n{HELP}", line.trim())),
    }
}

fn parse_number<T: std::str::FromStr>(word: &str) -> Result<T, String> {
    word.parse().map_err(|_| format!("not a number: `{word}`"))
}

/// Feed a command to the controller. `Show` and `Quit` are handled by the
/// caller.
pub fn apply<C>(app: &mut AppController<C>, command: Command) -> Result<(), SelectionError> {
    match command {
        Command::Click { lat, lon } => app.on_map_click(lat, lon),
        Command::Key(name) => app.on_key_down(&name),
        Command::Offset(hours) => {
            // The picker only offers candidates; typed input is checked first
            let offered = app
                .selector()
                .is_some_and(|selector| selector.candidates().get(hours).is_some());
            if !offered {
                return Err(SelectionError::OffsetNotCandidate {
                    hours,
                    init: app.active().init(),
                });
            }
            app.on_hour_offset_picked(hours)?
        }
        Command::Run(index) => app.on_run_selected(index)?,
        Command::HideView => app.on_view_toggled(DetailedView::Hidden),
        Command::ListRuns => {
            for (index, run) in app.runs().iter().enumerate() {
                let marker = if run == app.active() { '*' } else { ' ' };
                println!(
                    "{marker} {index}: {} (+{}h)",
                    run.init().format("%Y-%m-%d %H:%M UTC"),
                    run.latest()
                );
            }
        }
        Command::Show | Command::Quit => {}
    }
    Ok(())
}
