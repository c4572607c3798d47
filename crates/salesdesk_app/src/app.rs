use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use desk_logging::{desk_debug, desk_info};
use salesdesk_core::{update, AppState, Moment, Msg};
use salesdesk_engine::EngineHandle;

use crate::commands::{self, Command, HELP};
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::render;

const TICK_INTERVAL: Duration = Duration::from_millis(100);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

enum Input {
    Line(String),
    Tick,
    Closed,
}

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let engine = EngineHandle::new(config.backend_settings()).context("failed to start engine")?;
    let mut console = Console {
        state: AppState::with_settings(config.view_settings()),
        runner: EffectRunner::new(engine),
    };

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    spawn_stdin_reader(input_tx.clone());

    // Drives debounced lookups and the call timer.
    thread::spawn(move || {
        while input_tx.send(Input::Tick).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    desk_info!("Console started");
    console.dispatch(Msg::RefreshRequested);
    console.render_if_dirty()?;

    loop {
        match input_rx.recv_timeout(POLL_INTERVAL) {
            Ok(Input::Line(line)) => match commands::parse(&line, Moment::now()) {
                Ok(Command::Quit) => break,
                Ok(Command::Help) => println!("{HELP}"),
                Ok(Command::Dispatch(msg)) => {
                    console.dispatch(msg);
                    console.render_if_dirty()?;
                }
                Err(err) => println!("{err}"),
            },
            // Ticks alone never trigger a redraw; the next command or
            // completion shows the updated timer.
            Ok(Input::Tick) => console.dispatch(Msg::Tick { at: Moment::now() }),
            Ok(Input::Closed) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }

        let completions = console.runner.drain();
        if !completions.is_empty() {
            for msg in completions {
                console.dispatch(msg);
            }
            console.render_if_dirty()?;
        }
    }

    console.runner.shutdown();
    desk_info!("Console stopped");
    Ok(())
}

struct Console {
    state: AppState,
    runner: EffectRunner,
}

impl Console {
    fn dispatch(&mut self, msg: Msg) {
        if !matches!(msg, Msg::Tick { .. }) {
            desk_debug!("dispatch {:?}", msg);
        }
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        if self.runner.enqueue(effects) {
            println!("Session expired: update `api_token` in the config and restart.");
        }
    }

    fn render_if_dirty(&mut self) -> anyhow::Result<()> {
        if !self.state.consume_dirty() {
            return Ok(());
        }
        let text = render::render(&self.state.view());
        let mut stdout = io::stdout().lock();
        write!(stdout, "{text}> ").context("failed to write to stdout")?;
        stdout.flush().context("failed to flush stdout")?;
        Ok(())
    }
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if input_tx.send(Input::Line(line)).is_err() {
                return;
            }
        }
        let _ = input_tx.send(Input::Closed);
    });
}
