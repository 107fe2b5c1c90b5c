//! Interactive client session.

use std::{
    io::Write,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    api::ChatApi,
    command::{ClientCommand, parse_command},
    error::ClientError,
    formatter::{
        JOIN_IN_ROOM_MESSAGE, LEAVE_NO_ROOM_MESSAGE, LOGIN_PROMPT, NOT_IN_ROOM_MESSAGE,
        StatusFormatter,
    },
    poller::{PollEnd, Poller},
};

const PROMPT: &str = "> ";

/// Destination of everything the session shows to the user
pub type Output = Arc<dyn Fn(&str) + Send + Sync>;

/// Print a line and redisplay the prompt
pub fn stdout_output() -> Output {
    Arc::new(|text: &str| {
        println!("{}", text);
        print!("{}", PROMPT);
        std::io::stdout().flush().ok();
    })
}

/// Whether the command loop should keep reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Per-user state of a logged-in session
pub struct ChatSession {
    api: ChatApi,
    poll_interval: Duration,
    output: Output,
    room: Option<String>,
    in_room: Arc<AtomicBool>,
    poller: Option<JoinHandle<PollEnd>>,
}

impl ChatSession {
    pub fn new(api: ChatApi, poll_interval: Duration, output: Output) -> Self {
        Self {
            api,
            poll_interval,
            output,
            room: None,
            in_room: Arc::new(AtomicBool::new(false)),
            poller: None,
        }
    }

    /// Room the user is in, as far as this client knows
    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    /// Try to log in; failures are shown and leave the session logged out
    pub async fn login(&mut self, username: &str) -> Result<bool, ClientError> {
        match self.api.login(username).await? {
            Ok(()) => {
                self.show(&StatusFormatter::format_welcome(username));
                self.show(&StatusFormatter::format_help());
                Ok(true)
            }
            Err(status) => {
                self.show(&StatusFormatter::format_status(status, username));
                Ok(false)
            }
        }
    }

    /// Execute one parsed command
    pub async fn handle(&mut self, command: ClientCommand) -> Result<Flow, ClientError> {
        self.reap_poller().await;

        match command {
            ClientCommand::ListRooms => match self.api.list_rooms().await? {
                Ok(text) => self.show(&text),
                Err(status) => self.show(&StatusFormatter::format_status(status, "")),
            },
            ClientCommand::ListUsers(room) => match self.api.list_room_users(&room).await? {
                Ok(text) => self.show(&text),
                Err(status) => self.show(&StatusFormatter::format_status(status, &room)),
            },
            ClientCommand::Join(room) => {
                if self.room.is_some() {
                    self.show(JOIN_IN_ROOM_MESSAGE);
                    return Ok(Flow::Continue);
                }
                match self.api.join(&room).await? {
                    Ok(()) => {
                        self.start_poller();
                        self.show(&StatusFormatter::format_room_welcome(&room));
                        self.room = Some(room);
                    }
                    Err(status) => self.show(&StatusFormatter::format_status(status, &room)),
                }
            }
            ClientCommand::Leave => {
                let Some(room) = self.room.take() else {
                    self.show(LEAVE_NO_ROOM_MESSAGE);
                    return Ok(Flow::Continue);
                };
                self.stop_poller();
                match self.api.leave().await? {
                    Ok(()) => self.show(&StatusFormatter::format_room_left(&room)),
                    Err(status) => self.show(&StatusFormatter::format_status(status, &room)),
                }
            }
            ClientCommand::Create(room) => match self.api.create_room(&room).await? {
                Ok(()) => self.show(&StatusFormatter::format_room_created(&room)),
                Err(status) => self.show(&StatusFormatter::format_status(status, &room)),
            },
            ClientCommand::Delete(room) => match self.api.delete_room(&room).await? {
                Ok(()) => self.show(&StatusFormatter::format_room_deleted(&room)),
                Err(status) => self.show(&StatusFormatter::format_status(status, &room)),
            },
            ClientCommand::Logout => {
                self.logout().await?;
                return Ok(Flow::Exit);
            }
            ClientCommand::Help => self.show(&StatusFormatter::format_help()),
            ClientCommand::Chat(text) => {
                if self.room.is_none() {
                    self.show(NOT_IN_ROOM_MESSAGE);
                    return Ok(Flow::Continue);
                }
                if let Err(status) = self.api.post(&text).await? {
                    let reason = StatusFormatter::format_status(status, "");
                    self.show(&format!("Couldn't post message: {}", reason));
                }
            }
            ClientCommand::Invalid(reason) => self.show(&reason),
        }

        Ok(Flow::Continue)
    }

    /// Stop polling and end the session on the server
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        self.stop_poller();
        self.room = None;
        if let Err(status) = self.api.logout().await? {
            tracing::warn!("Logout refused: {:?}", status);
        }
        Ok(())
    }

    fn start_poller(&mut self) {
        // Each poller gets its own flag; a stopped poller must never be revived
        self.in_room = Arc::new(AtomicBool::new(true));
        let poller = Poller::new(self.api.clone(), self.poll_interval, self.in_room.clone());
        let output = self.output.clone();
        self.poller = Some(tokio::spawn(poller.run(move |text| output(text))));
    }

    fn stop_poller(&mut self) {
        self.in_room.store(false, Ordering::Release);
        self.poller = None;
    }

    /// Forget the room if the poller was told by the server that we left it
    async fn reap_poller(&mut self) {
        let Some(handle) = self.poller.take_if(|handle| handle.is_finished()) else {
            return;
        };
        match handle.await {
            Ok(PollEnd::Rejected(status)) => {
                tracing::warn!("Stopped polling: {:?}", status);
                self.in_room.store(false, Ordering::Release);
                if let Some(room) = self.room.take() {
                    self.show(&StatusFormatter::format_room_left(&room));
                }
            }
            Ok(PollEnd::Stopped) => {}
            Err(e) => tracing::error!("Poller task failed: {}", e),
        }
    }

    fn show(&self, text: &str) {
        (self.output)(text);
    }
}

/// Run the interactive session until logout, Ctrl+C or Ctrl+D
pub async fn run_client_session(
    api: ChatApi,
    poll_interval: Duration,
) -> Result<(), ClientError> {
    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    let mut session = ChatSession::new(api, poll_interval, stdout_output());

    println!("{}", LOGIN_PROMPT);
    loop {
        let Some(username) = input_rx.recv().await else {
            return Ok(());
        };
        if session.login(&username).await? {
            break;
        }
        println!("{}", LOGIN_PROMPT);
    }

    while let Some(line) = input_rx.recv().await {
        match session.handle(parse_command(&line)).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => return Ok(()),
            Err(e) => {
                tracing::warn!("Request failed: {}", e);
                session.show(&format!("Request failed: {}", e));
            }
        }
    }

    // Input closed without \logout
    session.logout().await
}
