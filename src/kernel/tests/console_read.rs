//! Blocking reads against interrupt-time input.

mod common;

use std::sync::Arc;
use std::thread;

use common::{console, feed, feed_codes};
use kiln_common::{keys, ConsoleError};
use kiln_kernel::dev::CharDevice;

#[test]
fn test_reader_blocks_until_line_committed() {
    let console = Arc::new(console());
    let reader = {
        let console = Arc::clone(&console);
        thread::spawn(move || {
            let mut buf = [0u8; 32];
            let n = console.read(&mut buf)?;
            Ok::<_, ConsoleError>(buf[..n].to_vec())
        })
    };

    console.scheduler().wait_for_sleepers(1);
    feed(&console, "hel");
    feed(&console, "lo");
    assert!(!reader.is_finished());
    feed(&console, "\n");

    assert_eq!(reader.join().unwrap(), Ok(b"hello\n".to_vec()));
}

#[test]
fn test_killed_reader_returns_error() {
    let console = Arc::new(console());
    let reader = {
        let console = Arc::clone(&console);
        thread::spawn(move || {
            let mut buf = [0u8; 8];
            console.read(&mut buf)
        })
    };

    console.scheduler().wait_for_sleepers(1);
    feed(&console, "unfinished");
    console.scheduler().kill();

    assert_eq!(reader.join().unwrap(), Err(ConsoleError::Killed));
    console.inspect(|s| assert_eq!(s.line().edit(), 10));
}

#[test]
fn test_eof_wakes_reader_with_zero() {
    let console = Arc::new(console());
    let reader = {
        let console = Arc::clone(&console);
        thread::spawn(move || {
            let mut buf = [0u8; 8];
            console.read(&mut buf)
        })
    };

    console.scheduler().wait_for_sleepers(1);
    feed_codes(&console, &[keys::EOF]);
    assert_eq!(reader.join().unwrap(), Ok(0));
}

#[test]
fn test_lines_read_in_order() {
    let console = console();
    feed(&console, "one\ntwo\n");
    let mut buf = [0u8; 16];
    assert_eq!(console.read(&mut buf), Ok(4));
    assert_eq!(&buf[..4], b"one\n");
    assert_eq!(console.read(&mut buf), Ok(4));
    assert_eq!(&buf[..4], b"two\n");
}

#[test]
fn test_full_buffer_is_delivered_without_newline() {
    let console = console();
    let text = "x".repeat(128);
    feed(&console, &text);
    let mut buf = [0u8; 128];
    assert_eq!(console.read(&mut buf), Ok(128));
    // Space is reclaimed once the reader has drained the ring.
    feed(&console, "y\n");
    assert_eq!(console.read(&mut buf), Ok(2));
    assert_eq!(&buf[..2], b"y\n");
}
