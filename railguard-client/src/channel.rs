//! Resilient WebSocket channel with fixed-delay reconnection.
//!
//! The channel is split in two: [`ChannelMachine`] is a pure state
//! machine encoding every transition, and [`ReconnectingChannel`] is
//! the tokio task that interprets its effects against a real
//! tungstenite socket. Consumers hold a cloneable [`ChannelHandle`]
//! and observe state through a watch receiver; they never set state
//! directly.
//!
//! Failure policy: reconnect-and-retry is universal. There is no
//! fatal channel error, only the transient Disconnected state, and
//! the retry delay is a fixed constant with no growth, jitter, or
//! attempt cap.

use futures_util::{SinkExt, StreamExt};
use std::fmt;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Connection state of one channel, owned exclusively by its task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Open,
    Closing,
}

impl ChannelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelState::Disconnected => "disconnected",
            ChannelState::Connecting => "connecting",
            ChannelState::Open => "open",
            ChannelState::Closing => "closing",
        }
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side effect requested by a machine transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Begin a connection attempt to the channel URL.
    StartConnect,
    /// Arm the single reconnect timer; a firing with any other
    /// generation is stale and must be ignored.
    ScheduleReconnect { generation: u64 },
    /// Close the underlying socket without acting on it further.
    CloseSocket,
}

/// Pure transition table for the channel lifecycle.
///
/// Teardown sets a permanent guard: every later input is absorbed, so
/// an in-flight completion (a socket that opens after teardown, a
/// timer that fires late) can never resurrect the connection.
#[derive(Debug)]
pub struct ChannelMachine {
    state: ChannelState,
    torn_down: bool,
    timer_generation: u64,
    pending_timer: Option<u64>,
}

impl ChannelMachine {
    pub fn new() -> Self {
        Self {
            state: ChannelState::Disconnected,
            torn_down: false,
            timer_generation: 0,
            pending_timer: None,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Generation of the armed reconnect timer, if one is pending.
    pub fn pending_timer(&self) -> Option<u64> {
        self.pending_timer
    }

    /// Consumer asked to open. A duplicate request while Connecting or
    /// Open is a no-op so a consumer calling open twice cannot create
    /// a second socket.
    pub fn open_requested(&mut self) -> Option<Effect> {
        if self.torn_down {
            return None;
        }
        match self.state {
            ChannelState::Disconnected => {
                self.pending_timer = None;
                self.state = ChannelState::Connecting;
                Some(Effect::StartConnect)
            }
            ChannelState::Connecting | ChannelState::Open | ChannelState::Closing => None,
        }
    }

    /// The underlying connection finished opening.
    pub fn connected(&mut self) -> Option<Effect> {
        if self.torn_down {
            // Late completion after teardown: discard the socket.
            return Some(Effect::CloseSocket);
        }
        match self.state {
            ChannelState::Connecting => {
                self.pending_timer = None;
                self.state = ChannelState::Open;
                None
            }
            // A socket we no longer expect (e.g. a superseded attempt).
            _ => Some(Effect::CloseSocket),
        }
    }

    /// The connection dropped, failed to establish, or errored.
    pub fn connection_lost(&mut self) -> Option<Effect> {
        if self.torn_down {
            return None;
        }
        match self.state {
            ChannelState::Open | ChannelState::Connecting => {
                self.state = ChannelState::Disconnected;
                self.timer_generation += 1;
                self.pending_timer = Some(self.timer_generation);
                Some(Effect::ScheduleReconnect {
                    generation: self.timer_generation,
                })
            }
            ChannelState::Disconnected | ChannelState::Closing => None,
        }
    }

    /// The reconnect timer of the given generation fired.
    pub fn timer_fired(&mut self, generation: u64) -> Option<Effect> {
        if self.torn_down || self.pending_timer != Some(generation) {
            return None;
        }
        self.pending_timer = None;
        self.state = ChannelState::Connecting;
        Some(Effect::StartConnect)
    }

    /// Terminal. Cancels the pending timer, closes a live socket, and
    /// arms the permanent guard.
    pub fn teardown(&mut self) -> Option<Effect> {
        if self.torn_down {
            return None;
        }
        self.torn_down = true;
        self.pending_timer = None;
        let close = matches!(self.state, ChannelState::Open);
        self.state = ChannelState::Closing;
        close.then_some(Effect::CloseSocket)
    }
}

impl Default for ChannelMachine {
    fn default() -> Self {
        Self::new()
    }
}

enum Command {
    Send(String),
    Teardown,
}

/// Cloneable consumer-side handle to a spawned channel.
#[derive(Clone)]
pub struct ChannelHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ChannelState>,
}

impl ChannelHandle {
    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ChannelState::Open
    }

    pub fn state_watch(&self) -> watch::Receiver<ChannelState> {
        self.state.clone()
    }

    /// Queue a text frame. Anywhere but Open this is a silent no-op;
    /// callers are expected to gate on observed state first.
    pub fn send(&self, payload: String) {
        if !self.is_open() {
            tracing::debug!(state = %self.state(), "dropping send on non-open channel");
            return;
        }
        let _ = self.commands.send(Command::Send(payload));
    }

    /// Tear the channel down. Terminal; the handle stays inert
    /// afterwards.
    pub fn teardown(&self) {
        let _ = self.commands.send(Command::Teardown);
    }
}

/// Spawns the channel task and returns the consumer handle plus the
/// stream of inbound text frames, in arrival order.
pub struct ReconnectingChannel;

impl ReconnectingChannel {
    pub fn spawn(
        url: String,
        reconnect_delay: Duration,
    ) -> (ChannelHandle, mpsc::UnboundedReceiver<String>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ChannelState::Disconnected);
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        tokio::spawn(run(url, reconnect_delay, state_tx, inbound_tx, command_rx));
        (
            ChannelHandle {
                commands: command_tx,
                state: state_rx,
            },
            inbound_rx,
        )
    }
}

async fn run(
    url: String,
    reconnect_delay: Duration,
    state_tx: watch::Sender<ChannelState>,
    inbound_tx: mpsc::UnboundedSender<String>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let mut machine = ChannelMachine::new();
    if machine.open_requested() != Some(Effect::StartConnect) {
        return;
    }
    state_tx.send_replace(machine.state());

    'reconnect: loop {
        // Connecting: poll the connect attempt while staying
        // responsive to teardown. Dropping the pinned future cancels
        // the attempt.
        let connect = connect_async(url.as_str());
        tokio::pin!(connect);
        let attempt = loop {
            tokio::select! {
                result = &mut connect => break result,
                command = commands.recv() => match command {
                    Some(Command::Teardown) | None => {
                        machine.teardown();
                        state_tx.send_replace(machine.state());
                        return;
                    }
                    // Not Open yet; the payload is dropped.
                    Some(Command::Send(_)) => {}
                }
            }
        };

        match attempt {
            Ok((mut socket, _)) => {
                if machine.connected() == Some(Effect::CloseSocket) {
                    let _ = socket.close(None).await;
                    state_tx.send_replace(machine.state());
                    return;
                }
                state_tx.send_replace(machine.state());
                tracing::info!(%url, "channel open");

                loop {
                    tokio::select! {
                        message = socket.next() => match message {
                            Some(Ok(Message::Text(text))) => {
                                let _ = inbound_tx.send(text);
                            }
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Ok(_)) => {}
                            Some(Err(err)) => {
                                tracing::warn!(%url, error = %err, "channel transport error");
                                break;
                            }
                        },
                        command = commands.recv() => match command {
                            Some(Command::Send(payload)) => {
                                if let Err(err) = socket.send(Message::Text(payload)).await {
                                    tracing::warn!(%url, error = %err, "send failed");
                                    break;
                                }
                            }
                            Some(Command::Teardown) | None => {
                                machine.teardown();
                                let _ = socket.close(None).await;
                                state_tx.send_replace(machine.state());
                                return;
                            }
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(%url, error = %err, "connect attempt failed");
            }
        }

        // Both the failed attempt and the dropped session land here.
        let generation = match machine.connection_lost() {
            Some(Effect::ScheduleReconnect { generation }) => generation,
            _ => {
                state_tx.send_replace(machine.state());
                return;
            }
        };
        state_tx.send_replace(machine.state());
        tracing::info!(
            %url,
            delay_ms = reconnect_delay.as_millis() as u64,
            "scheduling reconnect"
        );

        let sleep = tokio::time::sleep(reconnect_delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => {
                    if machine.timer_fired(generation) == Some(Effect::StartConnect) {
                        state_tx.send_replace(machine.state());
                        continue 'reconnect;
                    }
                    state_tx.send_replace(machine.state());
                    return;
                }
                command = commands.recv() => match command {
                    Some(Command::Teardown) | None => {
                        machine.teardown();
                        state_tx.send_replace(machine.state());
                        return;
                    }
                    Some(Command::Send(_)) => {}
                }
            }
        }
    }
}
