//! End-to-end tests: a real server on a loopback port, driven by the client
//! library over TCP.

use std::net::SocketAddr;

use minesweeper_client::{DigOutcome, HELP_MESSAGE, MinesweeperClient};
use minesweeper_server::{logic::Board, server};
use tokio::net::TcpListener;

/// 4x4 board with one bomb at (2, 1).
fn board() -> Board {
    let mut bombs = vec![vec![false; 4]; 4];
    bombs[1][2] = true;
    Board::new(bombs).unwrap()
}

async fn start(debug: bool) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    server::spawn(listener, board(), debug).unwrap()
}

fn rows(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|line| line.to_string()).collect()
}

#[tokio::test]
async fn full_game_in_debug_mode() {
    let addr = start(true).await;
    let mut client = MinesweeperClient::connect(addr).await.unwrap();
    assert_eq!(
        (client.players(), client.columns(), client.rows()),
        (1, 4, 4)
    );

    let untouched = rows(&["- - - -", "- - - -", "- - - -", "- - - -"]);
    assert_eq!(client.look().await.unwrap(), untouched);

    // Off-board coordinates leave the board alone but still get a reply.
    for (x, y) in [(-1, 1), (1, 5), (4, 1), (i64::MAX, 0)] {
        assert_eq!(
            client.dig(x, y).await.unwrap(),
            DigOutcome::Board(untouched.clone())
        );
    }

    assert_eq!(
        client.dig(3, 1).await.unwrap(),
        DigOutcome::Board(rows(&["- - - -", "- - - 1", "- - - -", "- - - -"]))
    );

    assert_eq!(
        client.dig(0, 3).await.unwrap(),
        DigOutcome::Board(rows(&["  1 - -", "  1 - 1", "  1 1 1", "       "]))
    );

    assert_eq!(
        client.flag(2, 0).await.unwrap(),
        rows(&["  1 F -", "  1 - 1", "  1 1 1", "       "])
    );
    // Flagging a dug cell changes nothing.
    assert_eq!(
        client.flag(0, 0).await.unwrap(),
        rows(&["  1 F -", "  1 - 1", "  1 1 1", "       "])
    );
    // Digging a flagged cell changes nothing.
    assert_eq!(
        client.dig(2, 0).await.unwrap(),
        DigOutcome::Board(rows(&["  1 F -", "  1 - 1", "  1 1 1", "       "]))
    );

    assert_eq!(client.dig(2, 1).await.unwrap(), DigOutcome::Boom);
    assert_eq!(
        client.look().await.unwrap(),
        rows(&["    F  ", "       ", "       ", "       "])
    );

    assert_eq!(
        client.deflag(2, 0).await.unwrap(),
        rows(&["    -  ", "       ", "       ", "       "])
    );

    client.bye().await.unwrap();
}

#[tokio::test]
async fn boom_disconnects_outside_debug_mode() {
    let addr = start(false).await;
    let mut client = MinesweeperClient::connect(addr).await.unwrap();

    assert_eq!(client.dig(2, 1).await.unwrap(), DigOutcome::Boom);
    assert_eq!(client.next_line().await.unwrap(), None);

    // The bomb is gone for everyone else.
    let mut other = MinesweeperClient::connect(addr).await.unwrap();
    assert_eq!(other.players(), 1);
    assert_eq!(
        other.look().await.unwrap(),
        rows(&["       ", "       ", "       ", "       "])
    );
}

#[tokio::test]
async fn concurrent_digs_are_applied_one_at_a_time() {
    let addr = start(false).await;
    let mut alice = MinesweeperClient::connect(addr).await.unwrap();
    let mut bob = MinesweeperClient::connect(addr).await.unwrap();
    assert_eq!(alice.players(), 1);
    assert_eq!(bob.players(), 2);

    // Both cells touch the bomb, so neither dig spreads.
    let (alice_dig, bob_dig) = tokio::join!(alice.dig(3, 1), bob.dig(1, 0));
    let alice_board = alice_dig.unwrap();
    let bob_board = bob_dig.unwrap();

    let only_alice = DigOutcome::Board(rows(&["- - - -", "- - - 1", "- - - -", "- - - -"]));
    let only_bob = DigOutcome::Board(rows(&["- 1 - -", "- - - -", "- - - -", "- - - -"]));
    let both = rows(&["- 1 - -", "- - - 1", "- - - -", "- - - -"]);
    let both_dug = DigOutcome::Board(both.clone());

    let alice_first = alice_board == only_alice && bob_board == both_dug;
    let bob_first = bob_board == only_bob && alice_board == both_dug;
    assert!(
        alice_first || bob_first,
        "no serial order explains alice={alice_board:?} bob={bob_board:?}"
    );

    assert_eq!(alice.look().await.unwrap(), both);
    assert_eq!(bob.look().await.unwrap(), both);
}

#[tokio::test]
async fn leaving_players_are_no_longer_counted() {
    let addr = start(false).await;
    let mut alice = MinesweeperClient::connect(addr).await.unwrap();
    let bob = MinesweeperClient::connect(addr).await.unwrap();
    let carol = MinesweeperClient::connect(addr).await.unwrap();
    assert_eq!(carol.players(), 3);

    bob.bye().await.unwrap();
    // Dropping the connection without saying bye counts as leaving too.
    drop(carol);

    // Alice keeps playing while the others go away.
    assert_eq!(alice.flag(0, 0).await.unwrap()[0], "F - - -");

    // The departures are processed eventually; poll until both are gone.
    let mut players = usize::MAX;
    for _ in 0..50 {
        let dave = MinesweeperClient::connect(addr).await.unwrap();
        players = dave.players();
        dave.bye().await.unwrap();
        if players == 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(players, 2);
}

#[tokio::test]
async fn malformed_lines_are_ignored() {
    let addr = start(false).await;
    let mut client = MinesweeperClient::connect(addr).await.unwrap();

    for line in ["", "dance", "dig 1", "dig 1 2 3", "look ", "DIG 1 1", "flag a b", "dig  1 1"] {
        client.send_raw(line).await.unwrap();
    }

    // The first reply after the junk belongs to help, so nothing else was sent.
    assert_eq!(client.help().await.unwrap(), HELP_MESSAGE);
    assert_eq!(client.look().await.unwrap()[0], "- - - -");
}
