use proptest::prelude::*;
use railguard_client::channel::{ChannelMachine, ChannelState, Effect};
use railguard_client::chat::{apply_server_frame, prepare_submit};
use railguard_client::config::ClientConfig;
use railguard_core::{AgentRef, ConversationState, Phase};
use railguard_protocol::ChatServerFrame;

fn base_config() -> ClientConfig {
    toml::from_str(
        r#"
        updates_url = "ws://localhost:8000/ws/updates"
        chat_url = "ws://localhost:8000/ws/chat"
        reconnect_delay_ms = 3000
        "#,
    )
    .expect("base config parses")
}

#[test]
fn config_accepts_the_reference_file() {
    assert!(base_config().validate().is_ok());
}

#[test]
fn config_rejects_non_websocket_urls() {
    let mut config = base_config();
    config.updates_url = "http://localhost:8000/ws/updates".to_string();
    assert!(config.validate().is_err());

    let mut config = base_config();
    config.chat_url = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn config_rejects_zero_reconnect_delay() {
    let mut config = base_config();
    config.reconnect_delay_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn config_rejects_unknown_fields() {
    let parsed: Result<ClientConfig, _> = toml::from_str(
        r#"
        updates_url = "ws://localhost:8000/ws/updates"
        chat_url = "ws://localhost:8000/ws/chat"
        reconnect_delay_ms = 3000
        retry_jitter_ms = 100
        "#,
    );
    assert!(parsed.is_err());
}

#[derive(Debug, Clone, Copy)]
enum MachineEvent {
    Open,
    Connected,
    Lost,
    Timer(u64),
    Teardown,
}

fn machine_event() -> impl Strategy<Value = MachineEvent> {
    prop_oneof![
        Just(MachineEvent::Open),
        Just(MachineEvent::Connected),
        Just(MachineEvent::Lost),
        (0u64..6).prop_map(MachineEvent::Timer),
        Just(MachineEvent::Teardown),
    ]
}

proptest! {
    /// Over any event interleaving: at most one reconnect timer is
    /// ever armed, only the armed generation can restart a connect,
    /// and teardown is terminal.
    #[test]
    fn channel_machine_invariants_hold(events in proptest::collection::vec(machine_event(), 0..64)) {
        let mut machine = ChannelMachine::new();
        let mut torn_down = false;

        for event in events {
            let armed_before = machine.pending_timer();
            let effect = match event {
                MachineEvent::Open => machine.open_requested(),
                MachineEvent::Connected => machine.connected(),
                MachineEvent::Lost => machine.connection_lost(),
                MachineEvent::Timer(generation) => machine.timer_fired(generation),
                MachineEvent::Teardown => {
                    torn_down = true;
                    machine.teardown()
                }
            };

            if torn_down {
                prop_assert!(machine.is_torn_down());
                prop_assert_eq!(machine.state(), ChannelState::Closing);
                prop_assert_eq!(machine.pending_timer(), None);
                // The only effect a dead machine may request is
                // discarding a late socket.
                prop_assert!(matches!(effect, None | Some(Effect::CloseSocket)));
            }

            if let Some(Effect::ScheduleReconnect { generation }) = effect {
                // Arming replaces, never stacks.
                prop_assert_eq!(machine.pending_timer(), Some(generation));
            }
            if let MachineEvent::Timer(generation) = event {
                if armed_before != Some(generation) {
                    // Stale firings must be inert.
                    prop_assert_ne!(effect, Some(Effect::StartConnect));
                }
            }
            if machine.pending_timer().is_some() {
                prop_assert_eq!(machine.state(), ChannelState::Disconnected);
            }
        }
    }
}

#[derive(Debug, Clone)]
enum ConversationOp {
    Submit(String),
    Thinking(Vec<String>),
    Response(String, Option<f64>),
    Reset,
}

fn conversation_op() -> impl Strategy<Value = ConversationOp> {
    prop_oneof![
        "[ a-z?]{0,12}".prop_map(ConversationOp::Submit),
        proptest::collection::vec("A[1-9][0-9]?".prop_map(String::from), 0..4)
            .prop_map(ConversationOp::Thinking),
        ("[a-z .]{1,20}", proptest::option::of(0.0f64..=1.0))
            .prop_map(|(text, confidence)| ConversationOp::Response(text, confidence)),
        Just(ConversationOp::Reset),
    ]
}

proptest! {
    /// After any history, reset always yields exactly the initial
    /// value: one welcome message, Idle, empty active set.
    #[test]
    fn reset_restores_the_initial_conversation(ops in proptest::collection::vec(conversation_op(), 0..32)) {
        let mut conversation = ConversationState::new();
        for op in ops {
            match op {
                ConversationOp::Submit(query) => {
                    prepare_submit(&mut conversation, &query, true);
                }
                ConversationOp::Thinking(active_agents) => {
                    apply_server_frame(&mut conversation, ChatServerFrame::Thinking { active_agents });
                }
                ConversationOp::Response(text, confidence) => {
                    apply_server_frame(&mut conversation, ChatServerFrame::Response {
                        response: text,
                        active_agents: None,
                        confidence,
                    });
                }
                ConversationOp::Reset => conversation.reset(),
            }
        }

        conversation.reset();
        prop_assert_eq!(conversation.transcript.len(), 1);
        prop_assert_eq!(conversation.phase, Phase::Idle);
        prop_assert!(conversation.active_agents.is_empty());
    }

    /// Transcript ids stay strictly increasing whatever the operation
    /// mix, and messages are only ever appended.
    #[test]
    fn transcript_only_grows_and_ids_are_monotonic(ops in proptest::collection::vec(conversation_op(), 0..32)) {
        let mut conversation = ConversationState::new();
        let mut previous_len = conversation.transcript.len();
        for op in ops {
            match op {
                ConversationOp::Submit(query) => {
                    prepare_submit(&mut conversation, &query, true);
                }
                ConversationOp::Thinking(active_agents) => {
                    apply_server_frame(&mut conversation, ChatServerFrame::Thinking { active_agents });
                }
                ConversationOp::Response(text, confidence) => {
                    apply_server_frame(&mut conversation, ChatServerFrame::Response {
                        response: text,
                        active_agents: Some(vec![AgentRef { id: "A19".to_string(), name: String::new() }]),
                        confidence,
                    });
                }
                ConversationOp::Reset => {
                    conversation.reset();
                    previous_len = 1;
                    continue;
                }
            }
            prop_assert!(conversation.transcript.len() >= previous_len);
            previous_len = conversation.transcript.len();
            for pair in conversation.transcript.windows(2) {
                prop_assert!(pair[0].id < pair[1].id);
            }
        }
    }
}
