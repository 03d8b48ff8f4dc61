//! The terminal front end: animates the cell store between steps.

use async_std::task;
use crossterm::{
    cursor::{Hide, MoveTo, MoveToNextLine, Show},
    event::{Event, EventStream, KeyCode, KeyEvent, KeyModifiers},
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand, QueueableCommand, Result as CrosstermResult,
};
use futures::{poll, task::Poll, TryStreamExt};
use rmaze_lib::{Maze, Phase, Solver, SolverKind};
use std::{
    io::{stdout, Write},
    time::Duration,
};

/// Solver steps per rendered frame.
const STEPS_PER_FRAME: u64 = 1;

struct App<'a, W: Write> {
    maze: &'a Maze,
    solver: Box<dyn Solver + 'a>,
    kind: SolverKind,
    phase: Phase,
    paused: bool,
    steps: u64,
    delay: Duration,
    output: &'a mut W,
    term_size: (u16, u16),
}

impl<'a, W: Write> App<'a, W> {
    fn new(maze: &'a Maze, kind: SolverKind, delay: Duration, output: &'a mut W) -> Self {
        App {
            maze,
            solver: kind.solver(maze),
            kind,
            phase: Phase::Searching,
            paused: true,
            steps: 0,
            delay,
            output,
            term_size: (80, 24),
        }
    }

    fn init(&mut self) -> CrosstermResult<()> {
        self.output.execute(EnterAlternateScreen)?.execute(Hide)?;
        terminal::enable_raw_mode()?;
        self.term_size = terminal::size()?;
        self.update()
    }

    fn quit(&mut self) -> CrosstermResult<()> {
        terminal::disable_raw_mode()?;
        self.output.execute(Show)?.execute(LeaveAlternateScreen)?;
        Ok(())
    }

    fn update_header(&mut self) -> CrosstermResult<()> {
        self.output
            .queue(MoveTo(0, 0))?
            .queue(SetBackgroundColor(Color::White))?
            .queue(SetForegroundColor(Color::Black))?
            .queue(Print(format!(
                "{:1$}",
                format!(
                    "Maze: {}x{}  Solver: {}  Steps: {}  Phase: {:?}",
                    self.maze.width(),
                    self.maze.height(),
                    self.kind,
                    self.steps,
                    self.phase,
                ),
                self.term_size.0 as usize
            )))?;
        Ok(())
    }

    fn update_main(&mut self) -> CrosstermResult<()> {
        self.output.queue(MoveTo(0, 1))?.queue(ResetColor)?;
        let max_lines = (self.term_size.1 as usize).saturating_sub(2);
        let max_cols = self.term_size.0 as usize;
        for line in self.maze.plaintext().lines().take(max_lines) {
            let mut line = line.to_string();
            line.truncate(max_cols);
            self.output.queue(Print(line))?.queue(MoveToNextLine(1))?;
        }
        Ok(())
    }

    fn update_footer(&mut self) -> CrosstermResult<()> {
        const FINISHED: &str = "Solved. Press [q] to quit.";
        const NO_SOLUTION: &str = "No solution. Press [q] to quit.";
        const RUNNING: &str = "Solving... Press [space] to pause.";
        const PAUSED: &str = "Paused. Press [space] to resume, [.] to single-step.";

        self.output
            .queue(MoveTo(0, self.term_size.1 - 1))?
            .queue(SetBackgroundColor(Color::White))?
            .queue(SetForegroundColor(Color::Black))?
            .queue(Print(format!(
                "{:1$}",
                match self.phase {
                    Phase::Finished => FINISHED,
                    Phase::NoSolution => NO_SOLUTION,
                    _ if self.paused => PAUSED,
                    _ => RUNNING,
                },
                self.term_size.0 as usize
            )))?;
        Ok(())
    }

    fn update(&mut self) -> CrosstermResult<()> {
        self.update_header()?;
        self.update_main()?;
        self.update_footer()?;
        self.output.flush()?;
        Ok(())
    }

    fn step(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        self.phase = self.solver.run(Some(STEPS_PER_FRAME));
        self.steps += STEPS_PER_FRAME;
        if self.phase.is_terminal() {
            self.paused = true;
        }
    }

    async fn confirm_quit(&mut self, reader: &mut EventStream) -> CrosstermResult<bool> {
        self.output
            .queue(MoveTo(0, self.term_size.1 - 1))?
            .queue(SetBackgroundColor(Color::White))?
            .queue(SetForegroundColor(Color::Black))?
            .queue(Print(format!(
                "{:1$}",
                "Are you sure to quit? [Y/n]", self.term_size.0 as usize
            )))?
            .flush()?;
        let confirmed = matches!(
            reader.try_next().await?,
            Some(Event::Key(KeyEvent {
                code: KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter,
                ..
            }))
        );
        Ok(confirmed)
    }

    async fn main_loop(&mut self) -> CrosstermResult<()> {
        macro_rules! const_key {
            ($($name:ident => $key:expr),* $(,)?) => {
                $(
                    const $name: Event = Event::Key(KeyEvent {
                        code: $key,
                        modifiers: KeyModifiers::empty(),
                    });
                )*
            };
        }
        const_key! {
            KEY_Q => KeyCode::Char('q'),
            KEY_ESC => KeyCode::Esc,
            KEY_SPACE => KeyCode::Char(' '),
            KEY_DOT => KeyCode::Char('.'),
            KEY_ENTER => KeyCode::Enter,
        };

        let mut reader = EventStream::new();
        loop {
            if self.paused {
                match reader.try_next().await? {
                    Some(KEY_Q) | Some(KEY_ESC) => {
                        if self.confirm_quit(&mut reader).await? {
                            break;
                        }
                        self.update()?;
                    }
                    Some(KEY_SPACE) | Some(KEY_ENTER) => {
                        if !self.phase.is_terminal() {
                            self.paused = false;
                        }
                        self.update()?;
                    }
                    Some(KEY_DOT) => {
                        self.step();
                        self.update()?;
                    }
                    Some(Event::Resize(width, height)) => {
                        self.term_size = (width, height);
                        self.output
                            .queue(ResetColor)?
                            .queue(Clear(ClearType::All))?;
                        self.update()?;
                    }
                    Some(_) => (),
                    None => break,
                }
            } else {
                if let Poll::Ready(maybe_event) = poll!(reader.try_next())? {
                    match maybe_event {
                        Some(KEY_Q) | Some(KEY_ESC) => {
                            self.paused = true;
                            self.update()?;
                            if self.confirm_quit(&mut reader).await? {
                                break;
                            }
                            self.update()?;
                        }
                        Some(KEY_SPACE) | Some(KEY_ENTER) => {
                            self.paused = true;
                            self.update()?;
                        }
                        Some(Event::Resize(width, height)) => {
                            self.term_size = (width, height);
                            self.output
                                .queue(ResetColor)?
                                .queue(Clear(ClearType::All))?;
                            self.update()?;
                        }
                        Some(_) => (),
                        None => break,
                    }
                }
                self.step();
                self.update()?;
                task::sleep(self.delay).await;
            }
        }
        Ok(())
    }
}

pub(crate) fn tui(maze: &Maze, kind: SolverKind, delay_ms: u64) -> CrosstermResult<()> {
    let mut stdout = stdout();
    let delay = Duration::from_millis(delay_ms);
    let mut app = App::new(maze, kind, delay, &mut stdout);
    app.init()?;
    task::block_on(async {
        let result = app.main_loop().await;
        app.quit()?;
        result
    })?;
    print!("{}", maze.plaintext());
    Ok(())
}
