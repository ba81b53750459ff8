mod cli;
mod render;

use std::io::Write;

use anyhow::Result;
use clap::Parser;
use nimbus_core::{App, AppError, Config, FeatureConfig};
use nimbus_state::session::FETCH_ERROR_LABEL;
use nimbus_state::PreferenceEvent;
use nimbus_weather::DisplayModel;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use cli::{Cli, Command, HELP};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, validation) = Config::load_validated(cli.config.as_deref())?;
    nimbus_core::init(&config.logging.filter)?;

    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }
    if cli.reduced {
        config.features = FeatureConfig::reduced();
    }

    let mut app = App::new(config)?;
    tracing::info!("Nimbus started");

    if let Some(unit) = cli.unit {
        if let Err(e) = app.set_unit(unit.into()) {
            report(&app, &e);
        }
    }

    if let Some(city) = cli.city.as_deref() {
        let result = app.search(city).await;
        return one_shot(&app, result);
    }
    if cli.locate {
        let result = app.locate().await;
        return one_shot(&app, result);
    }

    interactive(&mut app).await
}

fn one_shot(app: &App, result: Result<DisplayModel, AppError>) -> Result<()> {
    match result {
        Ok(model) => {
            print_dashboard(app, &model);
            Ok(())
        }
        Err(e) => {
            report(app, &e);
            Err(e.into())
        }
    }
}

async fn interactive(app: &mut App) -> Result<()> {
    let mut events = app.subscribe();

    println!("Nimbus weather. Type a city name, or 'help'.");
    println!("{}", render::list("Favorites", app.favorites(), "none yet"));
    println!("{}", render::list("Recent searches", app.history(), "none yet"));

    if app.should_auto_locate() {
        println!("Locating you...");
        let result = app.auto_locate().await;
        show_result(app, result);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match command {
            Command::Search(city) => {
                let result = app.search(&city).await;
                show_result(app, result);
            }
            Command::Locate => {
                let result = app.locate().await;
                show_result(app, result);
            }
            Command::Unit(Some(unit)) => {
                if let Err(e) = app.set_unit(unit) {
                    report(app, &e);
                }
            }
            Command::Unit(None) => {
                app.cycle_unit();
            }
            Command::Theme => {
                app.cycle_theme();
            }
            Command::Favorite => match app.toggle_favorite() {
                Ok(toggle) if toggle.added => println!("Added to favorites"),
                Ok(_) => println!("Removed from favorites"),
                Err(e) => report(app, &e),
            },
            Command::Unfavorite(city) => {
                app.remove_favorite(&city);
                println!("{}", render::list("Favorites", app.favorites(), "none yet"));
            }
            Command::Favorites => {
                println!("{}", render::list("Favorites", app.favorites(), "none yet"));
            }
            Command::History => {
                println!("{}", render::list("Recent searches", app.history(), "none yet"));
            }
            Command::Show => match app.display() {
                Some(model) => print_dashboard(app, &model),
                None => println!("Nothing to show yet. Search for a city."),
            },
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }

        redraw_on_change(app, &mut events);
    }

    tracing::info!("Nimbus shutting down");
    Ok(())
}

/// Unit and theme changes redraw the stored payload; nothing is refetched.
fn redraw_on_change(app: &App, events: &mut broadcast::Receiver<PreferenceEvent>) {
    let mut changed = false;
    loop {
        match events.try_recv() {
            Ok(PreferenceEvent::UnitChanged(unit)) => {
                println!("Unit: {}", unit.as_str());
                changed = true;
            }
            Ok(PreferenceEvent::ThemeChanged(mode)) => {
                println!("Theme: {} {} ({})", mode.icon(), mode, app.resolved_theme().as_str());
                changed = true;
            }
            Err(broadcast::error::TryRecvError::Lagged(_)) => changed = true,
            Err(_) => break,
        }
    }

    if changed {
        if let Some(model) = app.display() {
            print_dashboard(app, &model);
        }
    }
}

fn show_result(app: &App, result: Result<DisplayModel, AppError>) {
    match result {
        Ok(model) => print_dashboard(app, &model),
        Err(e) => report(app, &e),
    }
}

/// Blocking errors get a notice; fetch errors only change the location line.
fn report(app: &App, err: &AppError) {
    if err.is_blocking() {
        println!("! {}", err.user_message());
        return;
    }
    println!("{}", app.location_label().unwrap_or(FETCH_ERROR_LABEL));
    eprintln!("  ({})", err.user_message());
}

fn print_dashboard(app: &App, model: &DisplayModel) {
    let view = render::View {
        model,
        scheme: app.resolved_theme(),
        mode: app.theme(),
        favorite: app.is_current_favorite(),
    };
    print!("{}", render::dashboard(&view));
}
