//! End-to-end game flow through the dispatcher, without sockets.

use hitwicket_rules::{Owner, Phase};
use hitwicket_server::{ClientId, Dispatcher, GameId};
use serde_json::{Value, json};
use tokio::sync::mpsc;

struct Peer {
    id: ClientId,
    rx: mpsc::Receiver<String>,
}

impl Peer {
    fn connect(dispatcher: &mut Dispatcher) -> Self {
        let (tx, mut rx) = mpsc::channel(32);
        let id = dispatcher.connect(tx);
        let greeting = next(&mut rx);
        assert_eq!(greeting, json!({"method": "connect", "clientId": id.as_str()}));
        Self { id, rx }
    }

    fn send(&self, dispatcher: &mut Dispatcher, message: Value) {
        dispatcher.receive(&self.id, &message.to_string());
    }

    fn next(&mut self) -> Value {
        next(&mut self.rx)
    }

    fn assert_idle(&mut self) {
        assert!(self.rx.try_recv().is_err(), "unexpected envelope");
    }
}

fn next(rx: &mut mpsc::Receiver<String>) -> Value {
    let text = rx.try_recv().expect("envelope queued");
    serde_json::from_str(&text).expect("valid json")
}

fn play(peer: &Peer, dispatcher: &mut Dispatcher, game_id: &str, token: &str) {
    peer.send(
        dispatcher,
        json!({"method": "play", "gameId": game_id, "move": token}),
    );
}

/// Creates a game with `a` and joins `a` then `b`, draining the join traffic.
fn start_game(dispatcher: &mut Dispatcher, a: &mut Peer, b: &mut Peer) -> String {
    a.send(dispatcher, json!({"method": "create", "clientId": a.id.as_str()}));
    let created = a.next();
    assert_eq!(created["method"], "create");
    assert_eq!(created["game"]["clients"], json!([]));
    let game_id = created["game"]["id"].as_str().expect("game id").to_string();
    b.assert_idle();

    a.send(
        dispatcher,
        json!({"method": "join", "clientId": a.id.as_str(), "gameId": game_id}),
    );
    let joined = a.next();
    assert_eq!(joined["method"], "join");
    assert_eq!(joined["game"]["clients"], json!([a.id.as_str()]));
    a.assert_idle();

    b.send(
        dispatcher,
        json!({"method": "join", "clientId": b.id.as_str(), "gameId": game_id}),
    );
    let seats = json!([a.id.as_str(), b.id.as_str()]);
    for peer in [&mut *a, &mut *b] {
        let joined = peer.next();
        assert_eq!(joined["method"], "join");
        assert_eq!(joined["game"]["clients"], seats);
        assert_eq!(peer.next(), json!({"method": "turn", "currentPlayer": "A"}));
        let update = peer.next();
        assert_eq!(update["method"], "update");
        assert_eq!(update["game"]["currentPlayer"], "A");
        assert_eq!(update["game"]["state"][0][0], "A-P1");
        assert_eq!(update["game"]["state"][4][0], "B-P1");
        peer.assert_idle();
    }
    game_id
}

#[test]
fn test_full_match_scenario() {
    let mut dispatcher = Dispatcher::new();
    let mut a = Peer::connect(&mut dispatcher);
    let mut b = Peer::connect(&mut dispatcher);
    let game_id = start_game(&mut dispatcher, &mut a, &mut b);
    let gid = GameId::from(game_id.clone());

    // A advances P1 from (0,0) to (1,0).
    play(&a, &mut dispatcher, &game_id, "P1:B");
    for peer in [&mut a, &mut b] {
        assert_eq!(peer.next(), json!({"method": "turn", "currentPlayer": "B"}));
        let update = peer.next();
        assert_eq!(update["game"]["state"][0][0], Value::Null);
        assert_eq!(update["game"]["state"][1][0], "A-P1");
        assert_eq!(update["game"]["currentPlayer"], "B");
    }

    // Malformed token: the notice goes to the first participant, nothing changes.
    let before = dispatcher.registry().game(&gid).expect("game").game().clone();
    play(&b, &mut dispatcher, &game_id, "H1:F:F");
    assert_eq!(a.next(), json!({"method": "invalidMove"}));
    a.assert_idle();
    b.assert_idle();
    assert_eq!(dispatcher.registry().game(&gid).expect("game").game(), &before);

    // B advances P1 from (4,0) to (3,0).
    play(&b, &mut dispatcher, &game_id, "P1:F");
    for peer in [&mut a, &mut b] {
        assert_eq!(peer.next(), json!({"method": "turn", "currentPlayer": "A"}));
        let update = peer.next();
        assert_eq!(update["game"]["state"][4][0], Value::Null);
        assert_eq!(update["game"]["state"][3][0], "B-P1");
    }

    // B's H1 and P3 take A's pieces one by one. Each entry is the mover,
    // its token, and how many A pieces remain afterwards.
    let rally = [
        (Owner::A, "P2:B", 5),  // (0,3) -> (1,3)
        (Owner::B, "H1:F", 5),  // (4,1) -> (2,1)
        (Owner::A, "P2:F", 5),  // (1,3) -> (0,3)
        (Owner::B, "H1:F", 4),  // (2,1) -> (0,1), takes A-H1
        (Owner::A, "H2:BR", 4), // (0,2) -> (2,4)
        (Owner::B, "H1:R", 3),  // (0,1) -> (0,3), takes A-P2
        (Owner::A, "P1:FR", 3), // (1,0) -> (0,1)
        (Owner::B, "H1:L", 2),  // (0,3) -> (0,1), takes A-P1
        (Owner::A, "P3:L", 2),  // (0,4) -> (0,3)
        (Owner::B, "P3:F", 2),  // (4,4) -> (3,4)
        (Owner::A, "P3:BR", 2), // (0,3) -> (1,4)
        (Owner::B, "P3:F", 1),  // (3,4) -> (2,4), takes A-H2
        (Owner::A, "P3:L", 1),  // (1,4) -> (1,3)
    ];
    for (mover, token, a_left) in rally {
        let sender = if mover == Owner::A { &a } else { &b };
        play(sender, &mut dispatcher, &game_id, token);

        let next = mover.opponent().to_string();
        for peer in [&mut a, &mut b] {
            assert_eq!(peer.next(), json!({"method": "turn", "currentPlayer": next}));
            let update = peer.next();
            assert_eq!(update["method"], "update", "after {mover} {token}");
            assert_eq!(update["game"]["currentPlayer"], next.as_str());
            peer.assert_idle();
        }
        let board = dispatcher.registry().game(&gid).expect("game").game().board().clone();
        assert_eq!(board.count_pieces(Owner::A), a_left, "after {mover} {token}");
        assert_eq!(board.count_pieces(Owner::B), 5);
    }

    // B's P3 takes the last A piece diagonally: (2,4) -> (1,3).
    play(&b, &mut dispatcher, &game_id, "P3:FL");
    for peer in [&mut a, &mut b] {
        assert_eq!(peer.next(), json!({"method": "win", "winner": "B"}));
        peer.assert_idle();
    }
    let session = dispatcher.registry().game(&gid).expect("game");
    assert_eq!(session.game().phase(), Phase::Won(Owner::B));
    assert_eq!(session.game().board().count_pieces(Owner::A), 0);

    // Finished games refuse further play.
    play(&a, &mut dispatcher, &game_id, "P3:F");
    assert_eq!(a.next()["error"], "gameNotActive");
    b.assert_idle();
}

#[test]
fn test_illegal_move_notice_goes_to_first_participant() {
    let mut dispatcher = Dispatcher::new();
    let mut a = Peer::connect(&mut dispatcher);
    let mut b = Peer::connect(&mut dispatcher);
    let game_id = start_game(&mut dispatcher, &mut a, &mut b);

    // Forward from A's home rank leaves the board.
    play(&b, &mut dispatcher, &game_id, "P1:F");
    assert_eq!(a.next(), json!({"method": "invalidMove"}));
    b.assert_idle();

    // H1 may not move diagonally.
    play(&a, &mut dispatcher, &game_id, "H1:FR");
    assert_eq!(a.next(), json!({"method": "invalidMove"}));

    // H2 jumps diagonally from (0,2) to the empty (2,4).
    play(&a, &mut dispatcher, &game_id, "H2:BR");
    for peer in [&mut a, &mut b] {
        assert_eq!(peer.next(), json!({"method": "turn", "currentPlayer": "B"}));
        let update = peer.next();
        assert_eq!(update["game"]["state"][2][4], "A-H2");
    }
}

#[test]
fn test_rejections_answered_to_sender() {
    let mut dispatcher = Dispatcher::new();
    let mut a = Peer::connect(&mut dispatcher);
    let mut b = Peer::connect(&mut dispatcher);
    let mut c = Peer::connect(&mut dispatcher);

    a.send(&mut dispatcher, json!({"method": "resign"}));
    assert_eq!(a.next()["error"], "malformedEnvelope");

    c.send(
        &mut dispatcher,
        json!({"method": "join", "clientId": c.id.as_str(), "gameId": "missing"}),
    );
    assert_eq!(c.next()["error"], "gameNotFound");

    play(&c, &mut dispatcher, "missing", "P1:F");
    assert_eq!(c.next()["error"], "gameNotFound");

    let game_id = start_game(&mut dispatcher, &mut a, &mut b);
    c.send(
        &mut dispatcher,
        json!({"method": "join", "clientId": c.id.as_str(), "gameId": game_id}),
    );
    let refused = c.next();
    assert_eq!(refused["method"], "error");
    assert_eq!(refused["error"], "gameFull");
    a.assert_idle();
    b.assert_idle();
}

#[test]
fn test_disconnected_client_cannot_join() {
    let mut dispatcher = Dispatcher::new();
    let mut a = Peer::connect(&mut dispatcher);
    let b = Peer::connect(&mut dispatcher);

    a.send(&mut dispatcher, json!({"method": "create", "clientId": a.id.as_str()}));
    let game_id = a.next()["game"]["id"].as_str().expect("game id").to_string();

    dispatcher.disconnect(&b.id);
    a.send(
        &mut dispatcher,
        json!({"method": "join", "clientId": b.id.as_str(), "gameId": game_id}),
    );
    assert_eq!(a.next()["error"], "clientNotFound");
    assert_eq!(
        dispatcher
            .registry()
            .game(&GameId::from(game_id))
            .expect("game kept")
            .clients()
            .len(),
        0
    );
}
