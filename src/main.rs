#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use clap::Parser;
use mapty::app::{App, State, SubmitError};
use mapty::config::AppConfig;
use mapty::form::Field;
use mapty::geo::FixedPosition;
use mapty::map::LeafletPage;
use mapty::storage::FileStore;
use mapty::{cli, render, utils};
use std::fs;

#[macro_use]
extern crate mapty;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let config = AppConfig::from(&cli);
    dlog!(
        "store={} position={:?} zoom={}",
        config.store.display(),
        config.position,
        config.zoom
    );

    let mut app = App::new(
        &config,
        FileStore::new(&config.store),
        LeafletPage::new(),
        FixedPosition(config.position),
    );
    app.start();
    utils::print_alerts(app.take_alerts());

    match cli.cmd {
        cli::Cmd::Add {
            kind,
            at,
            distance,
            duration,
            cadence,
            elevation,
        } => {
            if app.state() != State::MapReady {
                anyhow::bail!("The map is unavailable; pass --position LAT,LNG to record workouts.");
            }
            let Some(click) = at.or(config.position) else {
                anyhow::bail!("No location to place the workout at.");
            };

            app.click_map(click);
            app.select_type(kind.into());
            app.fill(Field::Distance, distance);
            app.fill(Field::Duration, duration);
            app.fill(Field::Cadence, cadence);
            app.fill(Field::Elevation, elevation);

            let result = app.submit_form().map(render::summary_line);
            utils::print_alerts(app.take_alerts());
            match result {
                Ok(line) => {
                    println!("{line}");
                    Ok(())
                }
                Err(SubmitError::NotSaved { id, source }) => Err(source)
                    .with_context(|| format!("saving workout {id} to {}", config.store.display())),
                Err(e) => Err(e.into()),
            }
        }
        cli::Cmd::List { html } => {
            if html {
                println!("{}", app.sidebar().to_html());
            } else {
                for w in app.workouts().iter().rev() {
                    println!("{}", render::summary_line(w));
                }
            }
            Ok(())
        }
        cli::Cmd::Map { out } => {
            let page = app
                .map()
                .widget()
                .to_html(&app.sidebar().to_html())
                .context("rendering map page")?;
            fs::write(&out, page).with_context(|| format!("writing {}", out.display()))?;
            tracing::info!(path = %out.display(), markers = app.workouts().len(), "map written");
            Ok(())
        }
    }
}
